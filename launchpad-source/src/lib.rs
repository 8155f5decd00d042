pub mod error;
pub mod rest;
pub mod snapshot;
pub mod store;

pub use error::SourceError;
pub use rest::RestSource;
pub use snapshot::{load_snapshot_json, save_snapshot_json};
pub use store::SnapshotStore;
