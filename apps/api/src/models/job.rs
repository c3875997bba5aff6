use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A job posting hit from the full-text index, with its `ts_rank` relevance.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobSearchRow {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub url: String,
    pub description: String,
    pub relevance: f32,
}

/// A user's CV. Owned 1:1; re-upload overwrites, no history retained.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CvRow {
    pub user_id: Uuid,
    pub content: String,
    pub updated_at: DateTime<Utc>,
}
