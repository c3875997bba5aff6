use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Connection lifecycle states. A declined or cancelled request is deleted,
/// so no third status exists.
pub const STATUS_PENDING: &str = "pending";
pub const STATUS_ACCEPTED: &str = "accepted";

/// Directional relationship row: the requester initiated, the addressee
/// accepts or declines. At most one row exists per unordered user pair.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ConnectionRow {
    pub id: Uuid,
    pub requester_id: Uuid,
    pub addressee_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
}
