//! src/services/record_service.rs
//!
//! RecordService — create/list/get/update/delete for pet registrations.
//! Id-addressed operations resolve the record through `ExistenceGuard`
//! before doing anything else; updates are folded in by `merge_policy`.

use crate::{
    models::record::{Fields, NewRecord, Record},
    services::{
        existence_guard::ExistenceGuard,
        merge_policy::{self, RecordPatch, UpdateMode},
        store::{RecordStore, StoreError},
    },
};
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("missing required field(s): {}", .missing.join(", "))]
    Validation { missing: Vec<&'static str> },
    #[error("register `{0}` not found")]
    NotFound(String),
    #[error(transparent)]
    Backend(#[from] StoreError),
}

/// Failure categories reported to callers alongside the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ValidationError,
    NotFound,
    BackendFailure,
}

impl RecordError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::ValidationError,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Backend(_) => ErrorKind::BackendFailure,
        }
    }
}

pub type RecordResult<T> = Result<T, RecordError>;

/// Orchestrates record operations over a `RecordStore`.
///
/// Holds no state of its own between calls; cloning is cheap and every clone
/// talks to the same store.
#[derive(Clone)]
pub struct RecordService {
    store: Arc<dyn RecordStore>,
    guard: ExistenceGuard,
}

impl RecordService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            guard: ExistenceGuard::new(store.clone()),
            store,
        }
    }

    /// Validate required fields, attach the photo and persist.
    pub async fn create(
        &self,
        owner_info: Fields,
        pet_info: Fields,
        pet_photo: Option<Vec<u8>>,
    ) -> RecordResult<Record> {
        let new_record = NewRecord::new(owner_info, pet_info, pet_photo);
        let missing = new_record.missing_fields();
        if !missing.is_empty() {
            return Err(RecordError::Validation { missing });
        }

        let record = self.store.insert(new_record).await?;
        info!("created record {}", record.id);
        Ok(record)
    }

    pub async fn list(&self) -> RecordResult<Vec<Record>> {
        Ok(self.store.find_all().await?)
    }

    pub async fn get(&self, id: &str) -> RecordResult<Record> {
        self.guard.resolve(id).await
    }

    /// Resolve, fold in `patch` according to `mode`, and write back under the
    /// same id. Required fields are not re-checked here.
    pub async fn update(
        &self,
        id: &str,
        mode: UpdateMode,
        patch: RecordPatch,
    ) -> RecordResult<Record> {
        let existing = self.guard.resolve(id).await?;
        self.update_resolved(existing, mode, patch).await
    }

    /// Second half of `update`, for callers that already hold the record
    /// returned by `get` and must not read the patch before it resolved.
    pub async fn update_resolved(
        &self,
        existing: Record,
        mode: UpdateMode,
        patch: RecordPatch,
    ) -> RecordResult<Record> {
        let id = existing.id;
        let mut updated = merge_policy::apply(mode, existing, patch);
        updated.updated_at = Utc::now();

        // The row can vanish between resolve and save if a delete races us.
        if !self.store.save(&updated).await? {
            return Err(RecordError::NotFound(id.to_string()));
        }

        info!("updated record {} ({:?})", updated.id, mode);
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> RecordResult<()> {
        let record = self.guard.resolve(id).await?;
        if !self.store.remove(record.id).await? {
            return Err(RecordError::NotFound(id.to_string()));
        }

        info!("deleted record {}", record.id);
        Ok(())
    }

    /// Store connectivity, for readiness checks.
    pub async fn ping(&self) -> RecordResult<()> {
        Ok(self.store.ping().await?)
    }
}
