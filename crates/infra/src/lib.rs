//! Infrastructure layer: record storage, listing and session tracking.
//!
//! The stores are in-process and lock-guarded; they stand in for a relational
//! database behind the same trait seams.

pub mod listing;
pub mod sessions;
pub mod store;

pub use listing::{list_records, by_name, newest_first};
pub use sessions::{InMemorySessionStore, Session, SessionStore};
pub use store::{InMemoryRecordStore, RecordStore, StoreError};
