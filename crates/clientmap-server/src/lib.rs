//! ClientMap Server
//!
//! axum service exposing the dashboard's operations:
//! - email/password auth with bearer sessions
//! - client record CRUD scoped to the caller, plus SSE live snapshots
//! - geocoding proxy, markers and map tile configuration
//! - health, readiness and Prometheus metrics

pub mod app;
pub mod config;
pub mod error;
pub mod handlers;

pub use app::{AppState, CurrentUser, build_router};
pub use config::ServerConfig;
pub use error::ApiError;
