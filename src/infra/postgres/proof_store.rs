//! PostgreSQL proof record store.
//!
//! The `proof_records` table carries a UNIQUE constraint on
//! `commitment_hash`; that constraint is the only serialization point between
//! concurrent submissions of the same proof. A violation is mapped to
//! [`ProofError::DuplicateSubmission`], never surfaced as a database fault.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPool;
use sqlx::Row;
use tracing::instrument;
use uuid::Uuid;

use crate::domain::{NewProofRecord, OwnerRole, ProofRecord};
use crate::infra::{ProofError, ProofStore, Result};

/// Postgres unique-violation SQLSTATE.
const UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL-backed proof store.
pub struct PgProofStore {
    pool: PgPool,
}

impl PgProofStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_record(row: &sqlx::postgres::PgRow) -> Result<ProofRecord> {
        let role_str: String = row.try_get("owner_role")?;
        let owner_role = OwnerRole::parse(&role_str)
            .ok_or_else(|| ProofError::Internal(format!("unknown owner_role: {role_str}")))?;

        Ok(ProofRecord {
            id: row.try_get("id")?,
            owner_id: row.try_get("owner_id")?,
            owner_role,
            media_url: row.try_get("media_url")?,
            captured_at: row.try_get::<DateTime<Utc>, _>("captured_at")?,
            latitude: row.try_get("latitude")?,
            longitude: row.try_get("longitude")?,
            accuracy: row.try_get("accuracy")?,
            commitment_hash: row.try_get("commitment_hash")?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        })
    }
}

#[async_trait]
impl ProofStore for PgProofStore {
    #[instrument(skip(self, record), fields(commitment = %record.commitment_hash))]
    async fn insert(&self, record: NewProofRecord) -> Result<ProofRecord> {
        let id = Uuid::new_v4();

        let row = sqlx::query(
            r#"
            INSERT INTO proof_records
                (id, owner_id, owner_role, media_url, captured_at,
                 latitude, longitude, accuracy, commitment_hash, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW())
            RETURNING id, owner_id, owner_role, media_url, captured_at,
                      latitude, longitude, accuracy, commitment_hash, created_at
            "#,
        )
        .bind(id)
        .bind(record.owner_id)
        .bind(record.owner_role.as_str())
        .bind(&record.media_url)
        .bind(record.captured_at)
        .bind(record.latitude)
        .bind(record.longitude)
        .bind(record.accuracy)
        .bind(&record.commitment_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db)
                if db.code().as_deref() == Some(UNIQUE_VIOLATION) =>
            {
                ProofError::DuplicateSubmission(record.commitment_hash.clone())
            }
            _ => ProofError::Database(e),
        })?;

        Self::row_to_record(&row)
    }

    #[instrument(skip(self))]
    async fn list_for_owner(
        &self,
        owner_id: Uuid,
        role: OwnerRole,
        limit: u32,
    ) -> Result<Vec<ProofRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, owner_id, owner_role, media_url, captured_at,
                   latitude, longitude, accuracy, commitment_hash, created_at
            FROM proof_records
            WHERE owner_id = $1 AND owner_role = $2
            ORDER BY created_at DESC
            LIMIT $3
            "#,
        )
        .bind(owner_id)
        .bind(role.as_str())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_record).collect()
    }
}
