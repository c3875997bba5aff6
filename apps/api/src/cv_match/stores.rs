//! Collaborators consumed by the CV matcher: CV storage, the full-text job
//! index, and the LLM-backed relevance scorer.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::cv_match::matcher::{JobRelevance, RelevanceScorer};
use crate::cv_match::prompts::{JOB_RELEVANCE_PROMPT_TEMPLATE, JOB_RELEVANCE_SYSTEM};
use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::models::job::{CvRow, JobSearchRow};

/// Read access to stored CVs.
#[async_trait]
pub trait CvStore: Send + Sync {
    async fn get_cv(&self, user_id: Uuid) -> Result<Option<CvRow>, AppError>;
}

/// Ranked lexical search over the job index.
#[async_trait]
pub trait JobIndex: Send + Sync {
    /// `query` is an OR-joined `to_tsquery` input built by `query::build_search_query`.
    async fn search(&self, query: &str, limit: i64) -> Result<Vec<JobSearchRow>, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Postgres implementations
// ────────────────────────────────────────────────────────────────────────────

pub struct PgCvStore {
    db: PgPool,
}

impl PgCvStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CvStore for PgCvStore {
    async fn get_cv(&self, user_id: Uuid) -> Result<Option<CvRow>, AppError> {
        let row = sqlx::query_as::<_, CvRow>(
            "SELECT user_id, content, updated_at FROM cvs WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row)
    }
}

pub struct PgJobIndex {
    db: PgPool,
}

impl PgJobIndex {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl JobIndex for PgJobIndex {
    async fn search(&self, query: &str, limit: i64) -> Result<Vec<JobSearchRow>, AppError> {
        let rows = sqlx::query_as::<_, JobSearchRow>(
            r#"
            SELECT j.id, j.title, j.company, j.url, j.description,
                   ts_rank(j.search_vector, q.query) AS relevance
            FROM jobs j, to_tsquery('english', $1) AS q(query)
            WHERE j.search_vector @@ q.query
            ORDER BY relevance DESC
            LIMIT $2
            "#,
        )
        .bind(query)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// LLM-backed relevance scorer
// ────────────────────────────────────────────────────────────────────────────

/// Stage-2 scorer that asks the LLM for a 1–100 relevance verdict.
/// Failures (provider errors, unparseable output) surface as `AppError::Llm`;
/// the matcher absorbs them per-candidate into the neutral fallback.
pub struct LlmRelevanceScorer {
    llm: LlmClient,
}

impl LlmRelevanceScorer {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl RelevanceScorer for LlmRelevanceScorer {
    async fn score(&self, cv_text: &str, job_description: &str) -> Result<JobRelevance, AppError> {
        let prompt = JOB_RELEVANCE_PROMPT_TEMPLATE
            .replace("{cv_text}", cv_text)
            .replace("{job_description}", job_description);

        let relevance: JobRelevance = self
            .llm
            .call_json(&prompt, JOB_RELEVANCE_SYSTEM)
            .await
            .map_err(|e| AppError::Llm(format!("Job relevance scoring failed: {e}")))?;

        Ok(relevance.clamped())
    }
}
