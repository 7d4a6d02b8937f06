//! Resolves a client-supplied id to a live record.
//!
//! Every id-addressed operation goes through `resolve` first and works on the
//! record it hands back.

use crate::{
    models::record::Record,
    services::{
        record_service::{RecordError, RecordResult},
        store::RecordStore,
    },
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

#[derive(Clone)]
pub struct ExistenceGuard {
    store: Arc<dyn RecordStore>,
}

impl ExistenceGuard {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Look up `id`. Ids that are not valid UUIDs resolve to `NotFound`,
    /// the same as ids that were never issued.
    pub async fn resolve(&self, id: &str) -> RecordResult<Record> {
        let Ok(uuid) = Uuid::parse_str(id) else {
            debug!("id `{}` is not a valid record id", id);
            return Err(RecordError::NotFound(id.to_string()));
        };

        match self.store.find_by_id(uuid).await? {
            Some(record) => Ok(record),
            None => {
                debug!("record {} not found", uuid);
                Err(RecordError::NotFound(id.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::record::{Fields, NewRecord},
        services::{record_service::ErrorKind, store::memory::MemoryRecordStore},
    };

    #[tokio::test]
    async fn resolves_existing_record() {
        let store = Arc::new(MemoryRecordStore::new());
        let created = store
            .insert(NewRecord::new(Fields::new(), Fields::new(), None))
            .await
            .unwrap();

        let guard = ExistenceGuard::new(store);
        let resolved = guard.resolve(&created.id.to_string()).await.unwrap();
        assert_eq!(resolved, created);
    }

    #[tokio::test]
    async fn malformed_and_unknown_ids_are_both_not_found() {
        let guard = ExistenceGuard::new(Arc::new(MemoryRecordStore::new()));

        let unknown = Uuid::new_v4().to_string();
        for id in ["not-a-uuid", "", unknown.as_str()] {
            let err = guard.resolve(id).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::NotFound, "id {id:?}");
        }
    }
}
