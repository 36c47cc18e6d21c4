//! Client record CRUD, live push and markers
//!
//! The visible set is always derived from the caller's session: non-admins
//! see and change only their own records.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
};
use clientmap_core::{ClientRecord, Marker, RecordDraft, RecordId, project_all};
use futures::{Stream, StreamExt};
use serde::Serialize;
use tracing::{debug, info};

use crate::app::{AppState, CurrentUser};
use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct Created {
    pub id: RecordId,
}

/// First snapshot of the caller's live query
async fn snapshot(state: &AppState, caller: &CurrentUser) -> Result<Vec<ClientRecord>, ApiError> {
    let mut live = state.records.watch(state.query_for(&caller.user)).await?;
    live.next()
        .await
        .ok_or_else(|| ApiError::Internal("Record store closed the live query".to_string()))
}

/// Non-admins always own what they write
fn scope_draft(state: &AppState, caller: &CurrentUser, draft: &mut RecordDraft) {
    let is_admin = state.access.is_admin(&caller.user);
    if !is_admin || draft.salesperson.trim().is_empty() {
        draft.salesperson = caller.user.email.clone();
    }
}

/// Fail with 404 unless `id` exists and is visible to the caller
async fn ensure_visible(
    state: &AppState,
    caller: &CurrentUser,
    id: &RecordId,
) -> Result<(), ApiError> {
    let visible = state
        .records
        .get(id)
        .await?
        .is_some_and(|record| state.query_for(&caller.user).matches(&record));
    if visible {
        Ok(())
    } else {
        Err(ApiError::NotFound(format!("Record not found: {}", id)))
    }
}

pub async fn list(
    State(state): State<AppState>,
    caller: CurrentUser,
) -> Result<Json<Vec<ClientRecord>>, ApiError> {
    Ok(Json(snapshot(&state, &caller).await?))
}

pub async fn markers(
    State(state): State<AppState>,
    caller: CurrentUser,
) -> Result<Json<Vec<Marker>>, ApiError> {
    let records = snapshot(&state, &caller).await?;
    Ok(Json(project_all(&records)))
}

pub async fn create(
    State(state): State<AppState>,
    caller: CurrentUser,
    Json(mut draft): Json<RecordDraft>,
) -> Result<(StatusCode, Json<Created>), ApiError> {
    scope_draft(&state, &caller, &mut draft);
    let result = state.records.add(draft).await;
    state.metrics.record_write("create", result.is_ok());
    let id = result?;
    info!(record_id = %id, uid = %caller.user.uid, "Client record created");
    Ok((StatusCode::CREATED, Json(Created { id })))
}

pub async fn update(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<String>,
    Json(mut draft): Json<RecordDraft>,
) -> Result<StatusCode, ApiError> {
    let id = RecordId::from_string(id);
    ensure_visible(&state, &caller, &id).await?;
    scope_draft(&state, &caller, &mut draft);
    let result = state.records.update(&id, draft).await;
    state.metrics.record_write("update", result.is_ok());
    result?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(
    State(state): State<AppState>,
    caller: CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = RecordId::from_string(id);
    ensure_visible(&state, &caller, &id).await?;
    let result = state.records.delete(&id).await;
    state.metrics.record_write("delete", result.is_ok());
    result?;
    info!(record_id = %id, uid = %caller.user.uid, "Client record deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Server-sent events: one `snapshot` event per push, each the full list
pub async fn live(
    State(state): State<AppState>,
    caller: CurrentUser,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, ApiError> {
    let snapshots = state.records.watch(state.query_for(&caller.user)).await?;
    let guard = state.metrics.live_subscription();
    debug!(uid = %caller.user.uid, "Live record stream opened");

    let events = snapshots.map(move |records| {
        // Held for as long as the client stays connected
        let _subscription = &guard;
        Event::default().event("snapshot").json_data(records)
    });
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
