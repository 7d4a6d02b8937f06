//! SQLite-backed record store.
//!
//! Each record is one row in `records`. The `ownerInfo` and `petInfo`
//! mappings are stored as JSON text; the photo goes in its own `BLOB` column
//! so it never round-trips through JSON.

use super::{RecordStore, StoreError, StoreResult};
use crate::models::record::{Fields, NewRecord, OwnerInfo, PetInfo, Record};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    FromRow, SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::{str::FromStr, sync::Arc};
use tracing::debug;
use uuid::Uuid;

const SCHEMA: &str = include_str!("../../../migrations/0001_init.sql");

const SELECT_COLUMNS: &str =
    "SELECT id, owner_info, pet_info, pet_photo, created_at, updated_at FROM records";

#[derive(Clone)]
pub struct SqliteRecordStore {
    /// Shared SQLite connection pool.
    pub db: Arc<SqlitePool>,
}

/// Raw row as stored; sections are still JSON text.
#[derive(FromRow, Debug)]
struct RecordRow {
    id: Uuid,
    owner_info: String,
    pet_info: String,
    pet_photo: Option<Vec<u8>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RecordRow> for Record {
    type Error = StoreError;

    fn try_from(row: RecordRow) -> StoreResult<Self> {
        let id = row.id;
        let corrupt = move |source| StoreError::Corrupt { id, source };
        let owner_fields: Fields = serde_json::from_str(&row.owner_info).map_err(corrupt)?;
        let pet_fields: Fields = serde_json::from_str(&row.pet_info).map_err(corrupt)?;

        Ok(Record {
            id: row.id,
            owner_info: OwnerInfo::new(owner_fields),
            pet_info: PetInfo::new(pet_fields).with_photo(row.pet_photo),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl SqliteRecordStore {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Open a pool for `database_url`, creating the database file if needed.
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        Ok(Self::new(Arc::new(pool)))
    }

    /// Apply the embedded schema. Every statement is idempotent, so this is
    /// safe to run on each startup.
    pub async fn migrate(&self) -> StoreResult<()> {
        let statements = SCHEMA
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        debug!("Running {} migration statements", statements.len());
        for stmt in statements {
            sqlx::query(stmt).execute(&*self.db).await?;
        }
        Ok(())
    }
}

fn encode_fields(id: Uuid, fields: &Fields) -> StoreResult<String> {
    serde_json::to_string(fields).map_err(|source| StoreError::Encode { id, source })
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn insert(&self, record: NewRecord) -> StoreResult<Record> {
        let created = record.into_record(Uuid::new_v4(), Utc::now());
        sqlx::query(
            "INSERT INTO records (id, owner_info, pet_info, pet_photo, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(created.id)
        .bind(encode_fields(created.id, &created.owner_info.fields)?)
        .bind(encode_fields(created.id, &created.pet_info.fields)?)
        .bind(created.pet_info.pet_photo.as_deref())
        .bind(created.created_at)
        .bind(created.updated_at)
        .execute(&*self.db)
        .await?;

        debug!("inserted record {}", created.id);
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Record>> {
        let row = sqlx::query_as::<_, RecordRow>(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&*self.db)
            .await?;
        row.map(Record::try_from).transpose()
    }

    async fn save(&self, record: &Record) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE records
             SET owner_info = ?, pet_info = ?, pet_photo = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(encode_fields(record.id, &record.owner_info.fields)?)
        .bind(encode_fields(record.id, &record.pet_info.fields)?)
        .bind(record.pet_info.pet_photo.as_deref())
        .bind(record.updated_at)
        .bind(record.id)
        .execute(&*self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM records WHERE id = ?")
            .bind(id)
            .execute(&*self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_all(&self) -> StoreResult<Vec<Record>> {
        // rowid follows insert order; created_at can tie or step backwards.
        let rows = sqlx::query_as::<_, RecordRow>(&format!("{SELECT_COLUMNS} ORDER BY rowid ASC"))
            .fetch_all(&*self.db)
            .await?;
        rows.into_iter().map(Record::try_from).collect()
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&*self.db)
            .await?;
        Ok(())
    }
}
