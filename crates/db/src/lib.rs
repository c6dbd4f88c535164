//! Volatile record storage for shelf.
//!
//! Records are filtered through [`Criteria`], an exact-match mapping from a
//! record's field names to required values. The in-memory [`MemoryStore`]
//! keeps insertion order and is safe to share between tasks.

pub mod criteria;
pub mod locks;
pub mod store;

pub use criteria::{matches, Criteria, Fields, Value};
pub use locks::{KeyedGuard, KeyedLocks};
pub use store::{MemoryStore, Record, Store, StoreError};
