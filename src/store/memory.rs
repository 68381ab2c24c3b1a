//! Memory Store Module
//!
//! In-process document collection. Used as the default backend and as the
//! store behind the test suites.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::models::{StudentFields, StudentRecord};
use crate::store::StudentStore;

/// Length of a generated document id.
pub const AUTO_ID_LENGTH: usize = 20;

const AUTO_ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

// == Memory Store ==
/// Student documents held in memory, keyed and ordered by id.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<BTreeMap<String, StudentFields>>,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // == Length ==
    /// Returns the number of stored documents.
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    // == Is Empty ==
    /// Returns true if no documents are stored.
    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

/// Generates a 20 character alphanumeric id from v4 uuid randomness.
fn auto_id() -> String {
    let mut bits = Uuid::new_v4().as_u128();
    let base = AUTO_ID_ALPHABET.len() as u128;

    (0..AUTO_ID_LENGTH)
        .map(|_| {
            let index = (bits % base) as usize;
            bits /= base;
            AUTO_ID_ALPHABET[index] as char
        })
        .collect()
}

#[async_trait]
impl StudentStore for MemoryStore {
    async fn list(&self) -> StoreResult<Vec<StudentRecord>> {
        let documents = self.documents.read().await;
        Ok(documents
            .iter()
            .map(|(id, fields)| StudentRecord::from_fields(id.clone(), fields.clone()))
            .collect())
    }

    async fn insert(&self, fields: StudentFields) -> StoreResult<String> {
        let mut documents = self.documents.write().await;

        let mut id = auto_id();
        while documents.contains_key(&id) {
            id = auto_id();
        }

        documents.insert(id.clone(), fields);
        debug!(id = %id, total = documents.len(), "document inserted");
        Ok(id)
    }

    async fn update_by_id(&self, id: &str, fields: StudentFields) -> StoreResult<()> {
        let mut documents = self.documents.write().await;
        match documents.get_mut(id) {
            Some(existing) => {
                *existing = fields;
                Ok(())
            }
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }

    async fn delete_by_id(&self, id: &str) -> StoreResult<()> {
        let removed = self.documents.write().await.remove(id).is_some();
        debug!(id = %id, removed, "document delete");
        Ok(())
    }
}
