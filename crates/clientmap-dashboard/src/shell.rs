//! The dashboard screen
//!
//! Composes the identity client, the search controller, the live record
//! list and the record form. Every record mutation goes through the store
//! and comes back only through the live push; the dashboard never edits its
//! local list.

use clientmap_core::{
    AccessPolicy, AuthSession, ClientRecord, Coordinate, Error, Marker, RecordId, RecordQuery, RecordStore,
    Result, UserIdentity, project_all,
};
use clientmap_geocode::{SearchController, SuggestionSource};
use clientmap_store::LiveRecordList;
use clientmap_store::live::RecordList;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::{IdentityClient, MapCommand, RecordForm, filter_records};

/// Which screen is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Dashboard,
}

pub struct Dashboard<S> {
    identity: IdentityClient,
    session_changes: watch::Receiver<Option<AuthSession>>,
    store: Arc<dyn RecordStore>,
    access: AccessPolicy,
    search: SearchController<S>,
    /// Attached live list and the user it was opened for
    live: Option<(UserIdentity, LiveRecordList)>,
    filter: String,
    form: Option<RecordForm>,
    pending_delete: Option<RecordId>,
    status: Option<String>,
    commands: Vec<MapCommand>,
}

impl<S: SuggestionSource> Dashboard<S> {
    pub fn new(
        identity: IdentityClient,
        store: Arc<dyn RecordStore>,
        access: AccessPolicy,
        search: SearchController<S>,
    ) -> Self {
        let session_changes = identity.subscribe();
        Self {
            identity,
            session_changes,
            store,
            access,
            search,
            live: None,
            filter: String::new(),
            form: None,
            pending_delete: None,
            status: None,
            commands: Vec::new(),
        }
    }

    pub fn identity(&self) -> &IdentityClient {
        &self.identity
    }

    pub fn search(&self) -> &SearchController<S> {
        &self.search
    }

    pub fn view(&self) -> View {
        if self.identity.session().is_some() {
            View::Dashboard
        } else {
            View::Login
        }
    }

    /// Reconcile the live subscription with the current session.
    ///
    /// Signing in attaches a live list scoped to the user; signing out
    /// detaches it and resets the screen.
    pub async fn sync_session(&mut self) -> Result<()> {
        self.session_changes.mark_unchanged();
        let user = self.identity.current_user();
        if self.live.as_ref().map(|(owner, _)| owner) == user.as_ref() {
            return Ok(());
        }

        if let Some((owner, mut live)) = self.live.take() {
            debug!(uid = %owner.uid, "Detaching records for previous session");
            live.unsubscribe();
        }
        self.reset_screen();

        if let Some(user) = user {
            let query = RecordQuery::for_user(&user, &self.access);
            let live = LiveRecordList::subscribe(self.store.as_ref(), query).await?;
            self.live = Some((user, live));
        }
        Ok(())
    }

    /// Wait for the next session change and reconcile with it
    pub async fn next_session_change(&mut self) -> Result<()> {
        self.session_changes
            .changed()
            .await
            .map_err(|_| Error::Internal("identity client closed".to_string()))?;
        self.sync_session().await
    }

    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<()> {
        self.identity.sign_in(email, password).await?;
        self.sync_session().await
    }

    pub async fn sign_up(&mut self, email: &str, password: &str, confirm: &str) -> Result<()> {
        self.identity.sign_up(email, password, confirm).await?;
        self.sync_session().await
    }

    pub async fn sign_out(&mut self) -> Result<()> {
        let outcome = self.identity.sign_out().await;
        self.sync_session().await?;
        outcome
    }

    fn reset_screen(&mut self) {
        self.search.clear();
        self.filter.clear();
        self.form = None;
        self.pending_delete = None;
        self.status = None;
        self.commands.clear();
    }

    /// All records from the latest push
    pub fn records(&self) -> RecordList {
        self.live
            .as_ref()
            .map(|(_, live)| live.records())
            .unwrap_or_default()
    }

    /// Wait for the next push. `None` when signed out or the store closed.
    pub async fn next_records(&mut self) -> Option<RecordList> {
        let (_, live) = self.live.as_mut()?;
        live.next_snapshot().await
    }

    fn find_record(&self, id: &RecordId) -> Option<ClientRecord> {
        self.records().iter().find(|r| &r.id == id).cloned()
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Sidebar rows
    pub fn visible_records(&self) -> Vec<ClientRecord> {
        filter_records(&self.records(), &self.filter)
    }

    /// One marker per record
    pub fn markers(&self) -> Vec<Marker> {
        project_all(&self.records())
    }

    pub fn on_search_input(&self, text: impl Into<String>) {
        self.search.on_input(text);
    }

    /// Pick a search suggestion and recenter the map on it
    pub fn select_suggestion(&mut self, index: usize) -> bool {
        match self.search.select(index) {
            Some(selected) => {
                self.commands.push(MapCommand::fly_to(selected.coordinate));
                true
            }
            None => false,
        }
    }

    /// Select a sidebar row: fly to the record, then open its popup
    pub fn select_record(&mut self, id: &RecordId) -> bool {
        let Some(record) = self.find_record(id) else {
            return false;
        };
        self.commands.push(MapCommand::fly_to(record.coordinate));
        self.commands.push(MapCommand::open_popup(record.id));
        true
    }

    /// Clicking empty map opens a create form at the clicked spot
    pub fn map_click(&mut self, coordinate: Coordinate) {
        let Some(user) = self.identity.current_user() else {
            return;
        };
        self.form = Some(RecordForm::create_at(coordinate, user.email));
    }

    pub fn edit_record(&mut self, id: &RecordId) -> bool {
        match self.find_record(id) {
            Some(record) => {
                self.form = Some(RecordForm::edit(&record));
                true
            }
            None => false,
        }
    }

    pub fn form(&self) -> Option<&RecordForm> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut RecordForm> {
        self.form.as_mut()
    }

    pub fn close_form(&mut self) {
        self.form = None;
    }

    /// Submit the open form: update when editing, create otherwise.
    ///
    /// Non-admins are always recorded as the salesperson. The form closes
    /// on success. On failure it stays open and the error becomes the
    /// status message.
    pub async fn submit_form(&mut self) -> Result<Option<RecordId>> {
        let Some(mut form) = self.form.clone() else {
            return Ok(None);
        };
        if let Some(user) = self.identity.current_user() {
            // Non-admins always own what they write
            if !self.access.is_admin(&user) || form.draft.salesperson.trim().is_empty() {
                form.draft.salesperson = user.email;
            }
        }
        let outcome = match form.editing {
            Some(id) => self.store.update(&id, form.draft).await.map(|_| id),
            None => self.store.add(form.draft).await,
        };
        match outcome {
            Ok(id) => {
                debug!(record_id = %id, "Saved client record");
                self.form = None;
                self.status = None;
                Ok(Some(id))
            }
            Err(e) => Err(self.report(e)),
        }
    }

    /// Arm deletion of `id`; nothing is deleted until `confirm_delete`
    pub fn request_delete(&mut self, id: RecordId) {
        self.pending_delete = Some(id);
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    pub fn pending_delete(&self) -> Option<&RecordId> {
        self.pending_delete.as_ref()
    }

    /// Delete the armed record. Does nothing when no deletion is armed.
    pub async fn confirm_delete(&mut self) -> Result<()> {
        let Some(id) = self.pending_delete.take() else {
            return Ok(());
        };
        if let Err(e) = self.store.delete(&id).await {
            return Err(self.report(e));
        }
        debug!(record_id = %id, "Deleted client record");
        if self.form.as_ref().and_then(|f| f.editing.as_ref()) == Some(&id) {
            self.form = None;
        }
        Ok(())
    }

    fn report(&mut self, e: Error) -> Error {
        warn!("Record write failed: {}", e);
        self.status = Some(e.to_string());
        e
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn dismiss_status(&mut self) {
        self.status = None;
    }

    /// Take the map commands emitted since the last call
    pub fn drain_commands(&mut self) -> Vec<MapCommand> {
        std::mem::take(&mut self.commands)
    }
}
