#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    /// GitHub account id as delivered by the OAuth callback.
    pub github_id: i64,
    pub username: String,
    pub avatar_url: Option<String>,
    pub profile_url: Option<String>,
    pub created_at: DateTime<Utc>,
}
