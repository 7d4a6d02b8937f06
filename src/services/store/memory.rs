//! Process-local store. Records are lost on shutdown; used for tests and for
//! running the service without a database file.

use super::{RecordStore, StoreResult};
use crate::models::record::{NewRecord, Record};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    by_id: HashMap<Uuid, Record>,
    /// Insertion order, so listings are stable.
    order: Vec<Uuid>,
}

#[derive(Default)]
pub struct MemoryRecordStore {
    inner: RwLock<Inner>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert(&self, record: NewRecord) -> StoreResult<Record> {
        let created = record.into_record(Uuid::new_v4(), Utc::now());
        let mut inner = self.inner.write().await;
        inner.order.push(created.id);
        inner.by_id.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Record>> {
        Ok(self.inner.read().await.by_id.get(&id).cloned())
    }

    async fn save(&self, record: &Record) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        match inner.by_id.get_mut(&record.id) {
            Some(slot) => {
                *slot = record.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove(&self, id: Uuid) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        if inner.by_id.remove(&id).is_none() {
            return Ok(false);
        }
        inner.order.retain(|candidate| *candidate != id);
        Ok(true)
    }

    async fn find_all(&self) -> StoreResult<Vec<Record>> {
        let inner = self.inner.read().await;
        Ok(inner
            .order
            .iter()
            .filter_map(|id| inner.by_id.get(id).cloned())
            .collect())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
