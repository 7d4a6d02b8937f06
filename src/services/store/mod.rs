//! Persistence seam for records.
//!
//! `RecordService` only talks to a `RecordStore`; the concrete backend is
//! picked at startup from the database URL.

pub mod memory;
pub mod sqlite;

use crate::models::record::{NewRecord, Record};
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// Database URL that selects the in-memory store.
pub const MEMORY_URL: &str = "memory://";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error("stored record `{id}` could not be decoded: {source}")]
    Corrupt {
        id: Uuid,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not encode record `{id}`: {source}")]
    Encode {
        id: Uuid,
        #[source]
        source: serde_json::Error,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Durable per-id storage for records.
#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    /// Persist a new record, assigning its id and timestamps.
    async fn insert(&self, record: NewRecord) -> StoreResult<Record>;

    /// Returns `None` if no record has this id.
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Record>>;

    /// Overwrite the stored record with the same id.
    /// Returns `false` if there was nothing to overwrite.
    async fn save(&self, record: &Record) -> StoreResult<bool>;

    /// Returns `true` if the record existed and was removed.
    async fn remove(&self, id: Uuid) -> StoreResult<bool>;

    /// Every stored record, in the backend's natural order.
    async fn find_all(&self) -> StoreResult<Vec<Record>>;

    /// Cheap connectivity check used by readiness probes.
    async fn ping(&self) -> StoreResult<()>;
}
