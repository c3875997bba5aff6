//! Store traits consumed by the suggestion engine, plus their Postgres
//! implementations. The engine only ever sees the traits, so tests swap in
//! in-memory fakes.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::profile::{CandidateRow, DeveloperProfile};

/// Read access to stored developer profiles and the candidate pool.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<DeveloperProfile>, AppError>;

    /// Every other user that has a profile document, with user columns joined.
    async fn candidate_pool(&self, excluding: Uuid) -> Result<Vec<CandidateRow>, AppError>;
}

/// Read access to a user's connection graph, split the way the exclusion
/// set is built: accepted rows plus pending requests in both directions.
#[async_trait]
pub trait ConnectionsStore: Send + Sync {
    async fn active_connection_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, AppError>;
    async fn sent_pending_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, AppError>;
    async fn received_pending_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Postgres implementations
// ────────────────────────────────────────────────────────────────────────────

pub struct PgProfileStore {
    db: PgPool,
}

impl PgProfileStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<DeveloperProfile>, AppError> {
        let document: Option<serde_json::Value> =
            sqlx::query_scalar("SELECT document FROM developer_profiles WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.db)
                .await?;

        let Some(document) = document else {
            return Ok(None);
        };

        // A document that no longer deserializes is treated as absent rather
        // than failing the request; the generation pipeline owns its shape.
        match serde_json::from_value::<DeveloperProfile>(document) {
            Ok(profile) => Ok(Some(profile)),
            Err(e) => {
                warn!("Unreadable profile document for user {user_id}: {e}");
                Ok(None)
            }
        }
    }

    async fn candidate_pool(&self, excluding: Uuid) -> Result<Vec<CandidateRow>, AppError> {
        let rows = sqlx::query_as::<_, CandidateRow>(
            r#"
            SELECT u.id AS user_id, u.username, u.avatar_url, u.profile_url, p.document
            FROM users u
            JOIN developer_profiles p ON p.user_id = u.id
            WHERE u.id <> $1
            "#,
        )
        .bind(excluding)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }
}

pub struct PgConnectionsStore {
    db: PgPool,
}

impl PgConnectionsStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ConnectionsStore for PgConnectionsStore {
    async fn active_connection_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let ids = sqlx::query_scalar(
            r#"
            SELECT CASE WHEN requester_id = $1 THEN addressee_id ELSE requester_id END
            FROM connections
            WHERE (requester_id = $1 OR addressee_id = $1) AND status = 'accepted'
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(ids)
    }

    async fn sent_pending_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let ids = sqlx::query_scalar(
            "SELECT addressee_id FROM connections WHERE requester_id = $1 AND status = 'pending'",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(ids)
    }

    async fn received_pending_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let ids = sqlx::query_scalar(
            "SELECT requester_id FROM connections WHERE addressee_id = $1 AND status = 'pending'",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(ids)
    }
}
