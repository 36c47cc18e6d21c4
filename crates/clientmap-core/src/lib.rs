//! ClientMap Core Types and Traits
//!
//! This crate provides the fundamental types and traits used throughout ClientMap:
//! - Client records, pipeline stages and coordinates
//! - Record store and identity provider abstractions
//! - Marker projection for the map view
//! - Core error types

pub mod error;
pub mod geo;
pub mod identity;
pub mod marker;
pub mod record;
pub mod store;

pub use error::{Error, Result};
pub use geo::{Coordinate, SelectedLocation, Suggestion};
pub use identity::{AccessPolicy, AuthSession, IdentityProvider, RegistrationPolicy, UserIdentity};
pub use marker::{Marker, project, project_all};
pub use record::{ClientRecord, RecordDraft, RecordId, Stage};
pub use store::{RecordQuery, RecordStore, SnapshotStream};
