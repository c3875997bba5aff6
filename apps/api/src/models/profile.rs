use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Outcome of the (external) repository analysis pipeline for a profile.
/// Anything other than `Success` disqualifies the profile from matching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    Success,
    Failed,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Developer profile document as produced by the AI generation pipeline.
///
/// Persisted as an opaque JSONB blob keyed by user; field names are the
/// document's own camelCase keys. All fields default so that partial or
/// older documents still deserialize; a missing `analysisStatus` simply
/// leaves the profile unusable for matching.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeveloperProfile {
    pub analysis_status: AnalysisStatus,
    pub key_strengths: Vec<String>,
    pub identified_technologies: Vec<String>,
    pub potential_roles: Vec<String>,
    pub architectural_concepts: Vec<String>,
    /// Language name → share of analyzed code, 0–100.
    pub language_stats: HashMap<String, f64>,
    pub estimated_experience: String,
    pub repo_count: u32,
    pub project_insights: Vec<String>,
}

impl DeveloperProfile {
    /// A profile is only a valid matching input when its AI analysis succeeded.
    pub fn is_usable(&self) -> bool {
        self.analysis_status == AnalysisStatus::Success
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProfileRow {
    pub user_id: Uuid,
    pub document: Value,
    pub updated_at: DateTime<Utc>,
}

/// One candidate from the pool query: user columns joined with the raw
/// profile document. The document is parsed lazily by the suggestion engine.
#[derive(Debug, Clone, FromRow)]
pub struct CandidateRow {
    pub user_id: Uuid,
    pub username: String,
    pub avatar_url: Option<String>,
    pub profile_url: Option<String>,
    pub document: Value,
}
