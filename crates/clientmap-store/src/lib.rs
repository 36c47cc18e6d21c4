//! ClientMap Stores
//!
//! In-process implementations of the hosted collaborators:
//! - `InMemoryRecordStore`: record collection with live snapshot push and
//!   optional JSON snapshot persistence
//! - `InMemoryIdentityProvider`: email/password users with argon2 hashes
//! - `LiveRecordList`: the client-side adapter that mirrors a live query

pub mod identity;
pub mod live;
pub mod memory_store;
pub mod snapshot_file;

pub use identity::InMemoryIdentityProvider;
pub use live::LiveRecordList;
pub use memory_store::InMemoryRecordStore;
pub use snapshot_file::SnapshotFile;
