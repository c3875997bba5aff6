//! CV-to-Job Matcher — the two-stage funnel.
//!
//! Stage 1 is cheap lexical recall from the full-text job index; stage 2
//! fans out one LLM scoring call per candidate and joins the batch. The two
//! scores are blended linearly, AI-dominant, and the batch is re-sorted.
//!
//! The matcher owns its collaborators as trait objects, so tests drive it
//! with in-memory fakes and a counting scorer.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::cv_match::query::build_search_query;
use crate::cv_match::stores::{CvStore, JobIndex};
use crate::errors::AppError;

// ────────────────────────────────────────────────────────────────────────────
// Tuning constants
// ────────────────────────────────────────────────────────────────────────────

/// Stage-1 candidate cap. Also the implicit bound on concurrent LLM calls.
pub const STAGE_ONE_LIMIT: i64 = 10;
/// Blend weights: AI judgment dominates, lexical relevance breaks near-ties.
pub const LEXICAL_BLEND_WEIGHT: f64 = 0.3;
pub const AI_BLEND_WEIGHT: f64 = 0.7;
/// Neutral fallback when a single scoring call fails or is unparseable.
pub const FALLBACK_SCORE: i32 = 50;
pub const FALLBACK_REASON: &str = "Automated relevance analysis was unavailable for this job.";

// ────────────────────────────────────────────────────────────────────────────
// Scorer trait and output shape
// ────────────────────────────────────────────────────────────────────────────

/// AI relevance verdict for one (CV, job description) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRelevance {
    pub score: i32,
    pub reason: String,
}

impl JobRelevance {
    /// The neutral stand-in for a failed or unparseable scoring call.
    pub fn fallback() -> Self {
        Self {
            score: FALLBACK_SCORE,
            reason: FALLBACK_REASON.to_string(),
        }
    }

    /// Clamps the score into the contractual 1–100 range. An out-of-range
    /// integer from the model is treated as sloppiness, not a failure.
    pub fn clamped(mut self) -> Self {
        self.score = self.score.clamp(1, 100);
        self
    }
}

/// The stage-2 scorer. Implement this to swap the LLM backend without
/// touching the funnel; tests use a deterministic fake.
#[async_trait]
pub trait RelevanceScorer: Send + Sync {
    async fn score(&self, cv_text: &str, job_description: &str) -> Result<JobRelevance, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedJob {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub url: String,
    pub description: String,
    pub ai_analysis: JobRelevance,
    pub final_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvMatchResponse {
    pub message: String,
    pub matched_jobs: Vec<MatchedJob>,
}

// ────────────────────────────────────────────────────────────────────────────
// Matcher
// ────────────────────────────────────────────────────────────────────────────

pub struct CvMatcher {
    cvs: Arc<dyn CvStore>,
    jobs: Arc<dyn JobIndex>,
    scorer: Arc<dyn RelevanceScorer>,
}

impl CvMatcher {
    pub fn new(
        cvs: Arc<dyn CvStore>,
        jobs: Arc<dyn JobIndex>,
        scorer: Arc<dyn RelevanceScorer>,
    ) -> Self {
        Self { cvs, jobs, scorer }
    }

    /// Runs the full funnel for `user_id`'s stored CV.
    ///
    /// A missing CV is a client error prompting upload. An empty keyword
    /// extraction short-circuits before the index or the LLM is touched.
    /// A single failed scoring call degrades to the neutral fallback; it
    /// never aborts the batch.
    pub async fn match_jobs(&self, user_id: Uuid) -> Result<CvMatchResponse, AppError> {
        let cv = self.cvs.get_cv(user_id).await?.ok_or_else(|| {
            AppError::NotFound("No CV on file. Upload a CV to get job matches.".to_string())
        })?;

        let Some(query) = build_search_query(&cv.content) else {
            return Ok(CvMatchResponse {
                message: "Could not extract searchable keywords from your CV.".to_string(),
                matched_jobs: Vec::new(),
            });
        };

        // Stage 1: lexical recall
        let candidates = self.jobs.search(&query, STAGE_ONE_LIMIT).await?;
        if candidates.is_empty() {
            return Ok(CvMatchResponse {
                message: "No matching jobs found for your CV.".to_string(),
                matched_jobs: Vec::new(),
            });
        }

        debug!(
            "Stage 1 returned {} candidates for user {user_id}",
            candidates.len()
        );

        // Stage 2: AI re-rank, fanned out and joined as one batch
        let cv_text = cv.content.as_str();
        let analyses = join_all(candidates.iter().map(|job| {
            let scorer = &self.scorer;
            async move {
                match scorer.score(cv_text, &job.description).await {
                    Ok(analysis) => analysis,
                    Err(e) => {
                        warn!("Relevance scoring failed for job {}: {e}", job.id);
                        JobRelevance::fallback()
                    }
                }
            }
        }))
        .await;

        // Blend: lexical score normalized by the batch maximum (1.0 stands in
        // for a zero maximum), AI score scaled from its 1–100 range.
        let max_relevance = candidates
            .iter()
            .map(|j| j.relevance as f64)
            .fold(0.0, f64::max);
        let denominator = if max_relevance > 0.0 { max_relevance } else { 1.0 };

        let mut matched: Vec<MatchedJob> = candidates
            .into_iter()
            .zip(analyses)
            .map(|(job, analysis)| {
                let lexical = job.relevance as f64 / denominator;
                let final_score = LEXICAL_BLEND_WEIGHT * lexical
                    + AI_BLEND_WEIGHT * (analysis.score as f64 / 100.0);
                MatchedJob {
                    id: job.id,
                    title: job.title,
                    company: job.company,
                    url: job.url,
                    description: job.description,
                    ai_analysis: analysis,
                    final_score,
                }
            })
            .collect();

        matched.sort_by(|a, b| {
            b.final_score
                .partial_cmp(&a.final_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(CvMatchResponse {
            message: format!("Found {} matching jobs.", matched.len()),
            matched_jobs: matched,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
