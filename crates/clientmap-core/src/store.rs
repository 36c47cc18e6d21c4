//! Record store trait with live queries
//!
//! The store is the only writer of client records. Callers never mutate
//! their local lists directly: every add, update and delete becomes visible
//! through the next snapshot of a live query.

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::{AccessPolicy, ClientRecord, RecordDraft, RecordId, Result, UserIdentity};

/// A stream of full, authoritative snapshots for one query.
///
/// The first item is the current result set; each later item replaces the
/// previous one entirely. The stream ends when the store goes away.
pub type SnapshotStream = Box<dyn Stream<Item = Vec<ClientRecord>> + Send + Unpin>;

/// A filtered, ordered view of the record collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordQuery {
    /// Restrict to one salesperson; `None` returns every record
    pub owner: Option<String>,
}

impl RecordQuery {
    /// Every record, for administrators
    pub fn all() -> Self {
        Self { owner: None }
    }

    /// Records owned by one salesperson
    pub fn owned_by(owner: impl Into<String>) -> Self {
        Self {
            owner: Some(owner.into()),
        }
    }

    /// The query a signed-in user is allowed to run
    pub fn for_user(user: &UserIdentity, access: &AccessPolicy) -> Self {
        if access.is_admin(user) {
            Self::all()
        } else {
            Self::owned_by(user.email.clone())
        }
    }

    pub fn matches(&self, record: &ClientRecord) -> bool {
        match &self.owner {
            Some(owner) => record.salesperson.eq_ignore_ascii_case(owner),
            None => true,
        }
    }

    /// Filter and order records: newest first, ties broken by id
    pub fn apply<'a, I>(&self, records: I) -> Vec<ClientRecord>
    where
        I: IntoIterator<Item = &'a ClientRecord>,
    {
        let mut matched: Vec<ClientRecord> = records
            .into_iter()
            .filter(|record| self.matches(record))
            .cloned()
            .collect();
        matched.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        matched
    }
}

/// Record store trait
///
/// Implementations:
/// - `InMemoryRecordStore`: process-local collection with watch-channel push
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a new record, returning the store-assigned id
    ///
    /// # Errors
    /// - `Error::Validation` if the draft is invalid
    /// - `Error::Store` for write errors
    async fn add(&self, draft: RecordDraft) -> Result<RecordId>;

    /// Overwrite every writable field of an existing record
    ///
    /// # Errors
    /// - `Error::RecordNotFound` if no record has this id
    async fn update(&self, id: &RecordId, draft: RecordDraft) -> Result<()>;

    /// Delete a record by id
    ///
    /// # Errors
    /// - `Error::RecordNotFound` if no record has this id
    async fn delete(&self, id: &RecordId) -> Result<()>;

    /// Fetch one record
    async fn get(&self, id: &RecordId) -> Result<Option<ClientRecord>>;

    /// Subscribe to a live query
    async fn watch(&self, query: RecordQuery) -> Result<SnapshotStream>;

    /// Check that the store can serve requests
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Coordinate, Stage};
    use chrono::{TimeZone, Utc};

    fn record(id: &str, owner: &str, minute: u32) -> ClientRecord {
        ClientRecord {
            id: RecordId::from_string(id),
            name: format!("Client {}", id),
            description: String::new(),
            salesperson: owner.to_string(),
            stage: Stage::Pipeline,
            coordinate: Coordinate::new(0.0, 0.0),
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 9, minute, 0).unwrap(),
        }
    }

    fn user(email: &str) -> UserIdentity {
        UserIdentity {
            uid: email.to_string(),
            email: email.to_string(),
        }
    }

    #[test]
    fn test_query_for_regular_user_filters_by_owner() {
        let access = AccessPolicy::new(["boss@example.com"]);
        let query = RecordQuery::for_user(&user("jane@example.com"), &access);
        assert_eq!(query, RecordQuery::owned_by("jane@example.com"));
    }

    #[test]
    fn test_query_for_admin_sees_all() {
        let access = AccessPolicy::new(["boss@example.com"]);
        let query = RecordQuery::for_user(&user("boss@example.com"), &access);
        assert_eq!(query, RecordQuery::all());
    }

    #[test]
    fn test_apply_filters_and_orders_newest_first() {
        let records = vec![
            record("a", "jane@example.com", 1),
            record("b", "hank@example.com", 2),
            record("c", "jane@example.com", 3),
        ];

        let own = RecordQuery::owned_by("jane@example.com").apply(&records);
        let ids: Vec<_> = own.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a"]);

        let all = RecordQuery::all().apply(&records);
        let ids: Vec<_> = all.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_apply_breaks_timestamp_ties_by_id() {
        let records = vec![
            record("z", "jane@example.com", 5),
            record("m", "jane@example.com", 5),
        ];
        let ordered = RecordQuery::all().apply(&records);
        assert_eq!(ordered[0].id.as_str(), "m");
        assert_eq!(ordered[1].id.as_str(), "z");
    }
}
