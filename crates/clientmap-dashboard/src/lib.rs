//! ClientMap Dashboard
//!
//! Headless model of the dashboard screen. It owns no pixels: it holds the
//! state a renderer draws and emits `MapCommand`s for the map widget.
//! - `IdentityClient`: sign-in/sign-up with session-changed notifications
//! - `Dashboard`: search, sidebar, markers and the create/edit form
//! - `filter_records`: the sidebar's local text filter

pub mod form;
pub mod identity_client;
pub mod map;
pub mod shell;
pub mod sidebar;

pub use form::RecordForm;
pub use identity_client::IdentityClient;
pub use map::{MapCommand, MapConfig};
pub use shell::{Dashboard, View};
pub use sidebar::filter_records;
