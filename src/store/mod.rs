//! Store Module
//!
//! The document-store seam the handlers talk to, plus its backends.

mod firestore;
mod memory;


use async_trait::async_trait;

use crate::error::StoreResult;
use crate::models::{StudentFields, StudentRecord};

// Re-export public types
pub use firestore::FirestoreStore;
pub use memory::MemoryStore;

// == Student Store ==
/// A collection of student documents.
///
/// Each method is a single call against the backing store. Backends own
/// id generation, ordering and durability.
#[async_trait]
pub trait StudentStore: Send + Sync {
    /// Returns every document in the store's enumeration order.
    async fn list(&self) -> StoreResult<Vec<StudentRecord>>;

    /// Inserts a new document and returns its generated id.
    async fn insert(&self, fields: StudentFields) -> StoreResult<String>;

    /// Overwrites all fields of an existing document.
    ///
    /// Fails with [`StoreError::NotFound`](crate::error::StoreError::NotFound)
    /// when no document has this id.
    async fn update_by_id(&self, id: &str, fields: StudentFields) -> StoreResult<()>;

    /// Removes a document. Removing an unknown id succeeds.
    async fn delete_by_id(&self, id: &str) -> StoreResult<()>;
}
