//! In-memory address store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use address_api_core::RecordId;

use super::{AddressStore, RepositoryError};
use crate::models::Address;

/// Address store held entirely in process memory.
///
/// Mirrors the insert/update semantics of [`super::PgAddressStore`],
/// including conflict and not-found errors. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryAddressStore {
    records: RwLock<HashMap<RecordId, Address>>,
}

impl MemoryAddressStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl AddressStore for MemoryAddressStore {
    async fn save(&self, address: &mut Address) -> Result<(), RepositoryError> {
        let mut records = self.records.write().await;
        let now = Utc::now();

        if address.is_new() {
            let id = address.id().cloned().unwrap_or_else(RecordId::generate);
            if records.contains_key(&id) {
                return Err(RepositoryError::Conflict(
                    "address id already exists".to_owned(),
                ));
            }
            address.mark_persisted(id.clone(), now, now);
            records.insert(id, address.clone());
        } else {
            let id = address.id().cloned().ok_or_else(|| {
                RepositoryError::DataCorruption("persisted address without id".to_owned())
            })?;
            let created = records
                .get(&id)
                .and_then(Address::created)
                .ok_or(RepositoryError::NotFound)?;
            address.mark_persisted(id.clone(), created, now);
            records.insert(id, address.clone());
        }

        Ok(())
    }

    async fn find_by_id(&self, id: &RecordId) -> Result<Option<Address>, RepositoryError> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn id_exists(&self, id: &RecordId) -> Result<bool, RepositoryError> {
        Ok(self.records.read().await.contains_key(id))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
