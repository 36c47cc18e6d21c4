//! Application state and router assembly
//!
//! `AppState` holds the record store and identity provider as trait objects,
//! so the same handlers run against any `RecordStore`/`IdentityProvider`
//! implementation.

use async_trait::async_trait;
use axum::{
    Router,
    extract::FromRequestParts,
    http::{header, request::Parts},
    routing::{get, post, put},
};
use clientmap_core::{
    AccessPolicy, IdentityProvider, RecordQuery, RecordStore, RegistrationPolicy, UserIdentity,
};
use clientmap_dashboard::MapConfig;
use clientmap_geocode::Geocoder;
use clientmap_observability::{
    ComponentStatus, HealthState, Metrics, ReadinessChecker, health_router,
};
use clientmap_store::{InMemoryIdentityProvider, InMemoryRecordStore};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::handlers;

#[derive(Clone)]
pub struct AppState {
    pub records: Arc<dyn RecordStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub geocoder: Arc<Geocoder>,
    pub metrics: Arc<Metrics>,
    pub registration: RegistrationPolicy,
    pub access: AccessPolicy,
    pub map: MapConfig,
}

impl AppState {
    /// Build the state with the in-process store and identity provider
    pub fn from_config(config: &ServerConfig) -> anyhow::Result<Self> {
        let records: Arc<dyn RecordStore> = match &config.storage.snapshot_path {
            Some(path) => Arc::new(InMemoryRecordStore::with_snapshot_file(path)?),
            None => {
                info!("No snapshot path configured, records live in memory only");
                Arc::new(InMemoryRecordStore::new())
            }
        };

        Ok(Self {
            records,
            identity: Arc::new(InMemoryIdentityProvider::new()),
            geocoder: Arc::new(Geocoder::new(config.geocoder_config())?),
            metrics: Arc::new(Metrics::new()?),
            registration: config.registration_policy(),
            access: config.access_policy(),
            map: config.map.clone(),
        })
    }

    /// Records visible to `user`. Never client-chosen.
    pub fn query_for(&self, user: &UserIdentity) -> RecordQuery {
        RecordQuery::for_user(user, &self.access)
    }
}

/// The authenticated caller, resolved from `Authorization: Bearer <token>`
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub token: String,
    pub user: UserIdentity,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;

        let user = state.identity.resolve(token).await?;
        Ok(CurrentUser {
            token: token.to_string(),
            user,
        })
    }
}

/// Ready while the record store answers pings
pub struct StoreReadiness {
    store: Arc<dyn RecordStore>,
}

impl StoreReadiness {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ReadinessChecker for StoreReadiness {
    async fn check(&self) -> Vec<ComponentStatus> {
        let status = match self.store.ping().await {
            Ok(()) => ComponentStatus::healthy("record_store"),
            Err(e) => ComponentStatus::unhealthy("record_store", e.to_string()),
        };
        vec![status]
    }
}

/// API routes plus health and metrics
pub fn build_router(state: AppState) -> Router {
    let health = health_router(HealthState::with_readiness_checker(
        state.metrics.clone(),
        Arc::new(StoreReadiness::new(state.records.clone())),
    ));

    let api = Router::new()
        .route("/api/auth/signup", post(handlers::auth::sign_up))
        .route("/api/auth/signin", post(handlers::auth::sign_in))
        .route("/api/auth/signout", post(handlers::auth::sign_out))
        .route(
            "/api/records",
            get(handlers::records::list).post(handlers::records::create),
        )
        .route("/api/records/live", get(handlers::records::live))
        .route(
            "/api/records/{id}",
            put(handlers::records::update).delete(handlers::records::delete),
        )
        .route("/api/markers", get(handlers::records::markers))
        .route("/api/geocode", get(handlers::geocode::search))
        .route("/api/map/config", get(handlers::map::config))
        .with_state(state);

    api.merge(health).layer(TraceLayer::new_for_http())
}
