//! Profile Similarity Engine — scores every eligible candidate against the
//! caller's profile across eight weighted factors, then thresholds, bands,
//! ranks, and truncates.
//!
//! The engine owns its store handles (explicit dependency injection, no
//! shared database handle, no ambient request state), so tests drive it with
//! in-memory fakes.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::profile::DeveloperProfile;
use crate::similarity::{
    experience_level_similarity, jaccard_similarity, keyword_similarity,
    language_distribution_similarity, repo_activity_similarity,
};
use crate::suggestions::stores::{ConnectionsStore, ProfileStore};

// ────────────────────────────────────────────────────────────────────────────
// Tuning constants
// ────────────────────────────────────────────────────────────────────────────

// Factor weights. Tuned empirically; they must sum to 1.0 so the composite
// stays in [0, 1] without rescaling.
pub const WEIGHT_KEY_STRENGTHS: f64 = 0.25;
pub const WEIGHT_TECHNOLOGIES: f64 = 0.20;
pub const WEIGHT_LANGUAGES: f64 = 0.15;
pub const WEIGHT_ROLES: f64 = 0.15;
pub const WEIGHT_ARCHITECTURE: f64 = 0.10;
pub const WEIGHT_EXPERIENCE: f64 = 0.10;
pub const WEIGHT_REPO_ACTIVITY: f64 = 0.03;
pub const WEIGHT_PROJECT_INSIGHTS: f64 = 0.02;

/// Candidates scoring below this composite are dropped entirely.
pub const MIN_MATCH_SCORE: f64 = 0.15;
/// Upper bound on returned suggestions.
pub const MAX_SUGGESTIONS: usize = 20;
/// Shared-technology list cap per suggestion.
pub const MAX_SHARED_TECHNOLOGIES: usize = 5;
/// How many top contributing factors to surface per suggestion.
pub const TOP_FACTOR_COUNT: usize = 3;

// ────────────────────────────────────────────────────────────────────────────
// Factor scoring
// ────────────────────────────────────────────────────────────────────────────

/// Raw per-factor scores, each in [0, 1]. Ephemeral: computed per query,
/// never persisted.
#[derive(Debug, Clone, Copy)]
pub struct FactorScores {
    pub key_strengths: f64,
    pub technologies: f64,
    pub languages: f64,
    pub roles: f64,
    pub architecture: f64,
    pub experience: f64,
    pub repo_activity: f64,
    pub project_insights: f64,
}

impl FactorScores {
    pub fn compute(own: &DeveloperProfile, other: &DeveloperProfile) -> Self {
        Self {
            key_strengths: jaccard_similarity(&own.key_strengths, &other.key_strengths),
            technologies: jaccard_similarity(
                &own.identified_technologies,
                &other.identified_technologies,
            ),
            languages: language_distribution_similarity(&own.language_stats, &other.language_stats),
            roles: jaccard_similarity(&own.potential_roles, &other.potential_roles),
            architecture: jaccard_similarity(
                &own.architectural_concepts,
                &other.architectural_concepts,
            ),
            experience: experience_level_similarity(
                &own.estimated_experience,
                &other.estimated_experience,
            ),
            repo_activity: repo_activity_similarity(own.repo_count, other.repo_count),
            project_insights: keyword_similarity(
                &own.project_insights.join(" "),
                &other.project_insights.join(" "),
            ),
        }
    }

    /// Weighted composite. Each factor is already in [0, 1] and the weights
    /// sum to 1.0; the clamp only guards float drift.
    pub fn composite(&self) -> f64 {
        (WEIGHT_KEY_STRENGTHS * self.key_strengths
            + WEIGHT_TECHNOLOGIES * self.technologies
            + WEIGHT_LANGUAGES * self.languages
            + WEIGHT_ROLES * self.roles
            + WEIGHT_ARCHITECTURE * self.architecture
            + WEIGHT_EXPERIENCE * self.experience
            + WEIGHT_REPO_ACTIVITY * self.repo_activity
            + WEIGHT_PROJECT_INSIGHTS * self.project_insights)
            .clamp(0.0, 1.0)
    }

    /// Factor scores paired with their display names, in weight order.
    fn named(&self) -> [(&'static str, f64); 8] {
        [
            ("Technical skills", self.key_strengths),
            ("Technology stack", self.technologies),
            ("Programming languages", self.languages),
            ("Preferred roles", self.roles),
            ("Architectural concepts", self.architecture),
            ("Experience level", self.experience),
            ("Repository activity", self.repo_activity),
            ("Project focus", self.project_insights),
        ]
    }

    /// The display names of the highest-scoring raw factors.
    pub fn top_factors(&self, count: usize) -> Vec<String> {
        let mut named = self.named();
        named.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        named
            .iter()
            .take(count)
            .map(|(name, _)| name.to_string())
            .collect()
    }

    /// All eight factors scaled to percentages for UI display.
    pub fn breakdown(&self) -> ScoreBreakdown {
        let pct = |x: f64| (x * 100.0).round();
        ScoreBreakdown {
            key_strengths: pct(self.key_strengths),
            technologies: pct(self.technologies),
            languages: pct(self.languages),
            roles: pct(self.roles),
            architecture: pct(self.architecture),
            experience: pct(self.experience),
            repo_activity: pct(self.repo_activity),
            project_insights: pct(self.project_insights),
        }
    }
}

/// Qualitative band for a composite score.
pub fn match_band(score: f64) -> &'static str {
    if score >= 0.70 {
        "Excellent"
    } else if score >= 0.50 {
        "High"
    } else if score >= 0.30 {
        "Medium"
    } else {
        "Low"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

/// Percentage-scaled per-factor breakdown, 0–100 each.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub key_strengths: f64,
    pub technologies: f64,
    pub languages: f64,
    pub roles: f64,
    pub architecture: f64,
    pub experience: f64,
    pub repo_activity: f64,
    pub project_insights: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub user_id: Uuid,
    pub username: String,
    pub avatar_url: Option<String>,
    pub profile_url: Option<String>,
    pub match_score: f64,
    pub match_band: String,
    pub top_factors: Vec<String>,
    pub shared_technologies: Vec<String>,
    pub breakdown: ScoreBreakdown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionStats {
    pub candidates_considered: usize,
    pub above_threshold: usize,
    pub mean_score: f64,
    pub returned: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionResponse {
    pub suggestions: Vec<Suggestion>,
    pub stats: SuggestionStats,
    pub message: String,
}

impl SuggestionResponse {
    fn empty(message: &str) -> Self {
        Self {
            suggestions: Vec::new(),
            stats: SuggestionStats {
                candidates_considered: 0,
                above_threshold: 0,
                mean_score: 0.0,
                returned: 0,
            },
            message: message.to_string(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Engine
// ────────────────────────────────────────────────────────────────────────────

pub struct SuggestionEngine {
    profiles: Arc<dyn ProfileStore>,
    connections: Arc<dyn ConnectionsStore>,
}

impl SuggestionEngine {
    pub fn new(profiles: Arc<dyn ProfileStore>, connections: Arc<dyn ConnectionsStore>) -> Self {
        Self {
            profiles,
            connections,
        }
    }

    /// Computes ranked co-founder suggestions for `user_id`.
    ///
    /// A missing or failed-analysis profile is a steady state, reported as an
    /// empty result with a message. Store failures propagate as errors.
    pub async fn suggest(&self, user_id: Uuid) -> Result<SuggestionResponse, AppError> {
        let Some(own) = self.profiles.get_profile(user_id).await? else {
            return Ok(SuggestionResponse::empty(
                "Generate your developer profile to receive co-founder suggestions.",
            ));
        };

        if !own.is_usable() {
            return Ok(SuggestionResponse::empty(
                "Your profile analysis did not complete successfully. Regenerate it to receive suggestions.",
            ));
        }

        // Anyone already connected, or with a request pending in either
        // direction, is excluded from the pool.
        let mut excluded: HashSet<Uuid> = HashSet::new();
        excluded.extend(self.connections.active_connection_ids(user_id).await?);
        excluded.extend(self.connections.sent_pending_ids(user_id).await?);
        excluded.extend(self.connections.received_pending_ids(user_id).await?);

        let pool = self.profiles.candidate_pool(user_id).await?;

        let mut considered = 0usize;
        let mut survivors: Vec<Suggestion> = Vec::new();

        for candidate in pool {
            if excluded.contains(&candidate.user_id) {
                continue;
            }

            let Ok(profile) = serde_json::from_value::<DeveloperProfile>(candidate.document) else {
                continue;
            };
            if !profile.is_usable() {
                continue;
            }

            let factors = FactorScores::compute(&own, &profile);
            let score = factors.composite();
            considered += 1;

            if score < MIN_MATCH_SCORE {
                continue;
            }

            survivors.push(Suggestion {
                user_id: candidate.user_id,
                username: candidate.username,
                avatar_url: candidate.avatar_url,
                profile_url: candidate.profile_url,
                match_score: score,
                match_band: match_band(score).to_string(),
                top_factors: factors.top_factors(TOP_FACTOR_COUNT),
                shared_technologies: shared_technologies(&own, &profile),
                breakdown: factors.breakdown(),
            });
        }

        let above_threshold = survivors.len();
        let mean_score = if above_threshold > 0 {
            survivors.iter().map(|s| s.match_score).sum::<f64>() / above_threshold as f64
        } else {
            0.0
        };

        // Stable sort: equal scores keep pool order, so output is deterministic.
        survivors.sort_by(|a, b| {
            b.match_score
                .partial_cmp(&a.match_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        survivors.truncate(MAX_SUGGESTIONS);

        debug!(
            "Suggestions for {user_id}: {considered} considered, {above_threshold} above threshold, {} returned",
            survivors.len()
        );

        let message = if survivors.is_empty() {
            "No strong matches yet. Check back as more developers join.".to_string()
        } else {
            format!("Found {} suggested co-founders.", survivors.len())
        };

        let returned = survivors.len();
        Ok(SuggestionResponse {
            suggestions: survivors,
            stats: SuggestionStats {
                candidates_considered: considered,
                above_threshold,
                mean_score,
                returned,
            },
            message,
        })
    }
}

/// Technologies both profiles list, preserving the caller's casing, capped.
fn shared_technologies(own: &DeveloperProfile, other: &DeveloperProfile) -> Vec<String> {
    let theirs: HashSet<String> = other
        .identified_technologies
        .iter()
        .map(|t| t.trim().to_lowercase())
        .collect();

    own.identified_technologies
        .iter()
        .filter(|t| theirs.contains(&t.trim().to_lowercase()))
        .take(MAX_SHARED_TECHNOLOGIES)
        .cloned()
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::{AnalysisStatus, CandidateRow};
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct FakeProfileStore {
        own: Option<DeveloperProfile>,
        pool: Vec<CandidateRow>,
    }

    #[async_trait]
    impl ProfileStore for FakeProfileStore {
        async fn get_profile(&self, _user_id: Uuid) -> Result<Option<DeveloperProfile>, AppError> {
            Ok(self.own.clone())
        }

        async fn candidate_pool(&self, _excluding: Uuid) -> Result<Vec<CandidateRow>, AppError> {
            Ok(self.pool.clone())
        }
    }

    #[derive(Default)]
    struct FakeConnectionsStore {
        active: Vec<Uuid>,
        sent: Vec<Uuid>,
        received: Vec<Uuid>,
    }

    #[async_trait]
    impl ConnectionsStore for FakeConnectionsStore {
        async fn active_connection_ids(&self, _user_id: Uuid) -> Result<Vec<Uuid>, AppError> {
            Ok(self.active.clone())
        }

        async fn sent_pending_ids(&self, _user_id: Uuid) -> Result<Vec<Uuid>, AppError> {
            Ok(self.sent.clone())
        }

        async fn received_pending_ids(&self, _user_id: Uuid) -> Result<Vec<Uuid>, AppError> {
            Ok(self.received.clone())
        }
    }

    fn profile(
        strengths: &[&str],
        technologies: &[&str],
        languages: &[(&str, f64)],
        experience: &str,
        repo_count: u32,
    ) -> DeveloperProfile {
        DeveloperProfile {
            analysis_status: AnalysisStatus::Success,
            key_strengths: strengths.iter().map(|s| s.to_string()).collect(),
            identified_technologies: technologies.iter().map(|s| s.to_string()).collect(),
            potential_roles: vec!["CTO".to_string()],
            architectural_concepts: vec!["microservices".to_string()],
            language_stats: languages
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect::<HashMap<_, _>>(),
            estimated_experience: experience.to_string(),
            repo_count,
            project_insights: vec!["Builds backend infrastructure tooling".to_string()],
        }
    }

    fn candidate(user_id: Uuid, username: &str, p: &DeveloperProfile) -> CandidateRow {
        CandidateRow {
            user_id,
            username: username.to_string(),
            avatar_url: None,
            profile_url: None,
            document: serde_json::to_value(p).unwrap(),
        }
    }

    fn engine(profiles: FakeProfileStore, connections: FakeConnectionsStore) -> SuggestionEngine {
        SuggestionEngine::new(Arc::new(profiles), Arc::new(connections))
    }

    fn own_profile() -> DeveloperProfile {
        profile(
            &["distributed systems", "API design"],
            &["Rust", "PostgreSQL", "Kafka"],
            &[("Rust", 70.0), ("TypeScript", 30.0)],
            "senior",
            20,
        )
    }

    #[test]
    fn test_weights_sum_to_one() {
        let sum = WEIGHT_KEY_STRENGTHS
            + WEIGHT_TECHNOLOGIES
            + WEIGHT_LANGUAGES
            + WEIGHT_ROLES
            + WEIGHT_ARCHITECTURE
            + WEIGHT_EXPERIENCE
            + WEIGHT_REPO_ACTIVITY
            + WEIGHT_PROJECT_INSIGHTS;
        assert!((sum - 1.0).abs() < 1e-9, "weights sum to {sum}");
    }

    #[test]
    fn test_identical_profiles_score_one() {
        let own = own_profile();
        let factors = FactorScores::compute(&own, &own);
        assert!((factors.composite() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_composite_is_bounded() {
        let own = own_profile();
        let other = profile(&["ml research"], &["Python"], &[("Python", 100.0)], "", 0);
        let score = FactorScores::compute(&own, &other).composite();
        assert!((0.0..=1.0).contains(&score), "got {score}");
    }

    #[test]
    fn test_band_classification() {
        assert_eq!(match_band(0.85), "Excellent");
        assert_eq!(match_band(0.70), "Excellent");
        assert_eq!(match_band(0.60), "High");
        assert_eq!(match_band(0.35), "Medium");
        assert_eq!(match_band(0.16), "Low");
    }

    #[test]
    fn test_top_factors_ranked_by_raw_score() {
        let factors = FactorScores {
            key_strengths: 0.1,
            technologies: 0.9,
            languages: 0.8,
            roles: 0.2,
            architecture: 0.3,
            experience: 0.7,
            repo_activity: 0.0,
            project_insights: 0.0,
        };
        assert_eq!(
            factors.top_factors(3),
            vec!["Technology stack", "Programming languages", "Experience level"]
        );
    }

    #[test]
    fn test_breakdown_is_percentage_scaled() {
        let own = own_profile();
        let breakdown = FactorScores::compute(&own, &own).breakdown();
        assert_eq!(breakdown.technologies, 100.0);
        assert_eq!(breakdown.languages, 100.0);
    }

    #[test]
    fn test_shared_technologies_capped_and_cased() {
        let own = profile(
            &[],
            &["Rust", "PostgreSQL", "Kafka", "Redis", "Docker", "Kubernetes", "gRPC"],
            &[],
            "",
            1,
        );
        let other = profile(
            &[],
            &["rust", "postgresql", "kafka", "redis", "docker", "kubernetes", "grpc"],
            &[],
            "",
            1,
        );
        let shared = shared_technologies(&own, &other);
        assert_eq!(shared.len(), MAX_SHARED_TECHNOLOGIES);
        assert_eq!(shared[0], "Rust"); // caller's casing preserved
    }

    #[tokio::test]
    async fn test_no_profile_returns_empty_with_message() {
        let engine = engine(
            FakeProfileStore {
                own: None,
                pool: vec![],
            },
            FakeConnectionsStore::default(),
        );
        let response = engine.suggest(Uuid::new_v4()).await.unwrap();
        assert!(response.suggestions.is_empty());
        assert!(response.message.contains("Generate your developer profile"));
    }

    #[tokio::test]
    async fn test_failed_analysis_returns_empty_with_message() {
        let mut own = own_profile();
        own.analysis_status = AnalysisStatus::Failed;
        let engine = engine(
            FakeProfileStore {
                own: Some(own),
                pool: vec![],
            },
            FakeConnectionsStore::default(),
        );
        let response = engine.suggest(Uuid::new_v4()).await.unwrap();
        assert!(response.suggestions.is_empty());
        assert!(response.message.contains("did not complete successfully"));
    }

    #[tokio::test]
    async fn test_end_to_end_three_candidate_pool() {
        let own = own_profile();

        // Twin: identical profile → composite ~1.0, band Excellent.
        let twin_id = Uuid::new_v4();
        // Stranger: nothing in common → below threshold, omitted.
        let mut stranger = profile(
            &["frontend animation"],
            &["Figma"],
            &[("CSS", 100.0)],
            "entry level",
            0,
        );
        stranger.potential_roles = vec!["Designer".to_string()];
        stranger.architectural_concepts = vec!["atomic design".to_string()];
        stranger.project_insights = vec!["Ships marketing sites".to_string()];
        // Friend: identical profile but already connected → omitted.
        let friend_id = Uuid::new_v4();

        let pool = vec![
            candidate(twin_id, "twin", &own),
            candidate(Uuid::new_v4(), "stranger", &stranger),
            candidate(friend_id, "friend", &own),
        ];

        let engine = engine(
            FakeProfileStore {
                own: Some(own),
                pool,
            },
            FakeConnectionsStore {
                active: vec![friend_id],
                ..Default::default()
            },
        );

        let response = engine.suggest(Uuid::new_v4()).await.unwrap();

        assert_eq!(response.suggestions.len(), 1);
        let top = &response.suggestions[0];
        assert_eq!(top.user_id, twin_id);
        assert!(top.match_score > 0.99, "got {}", top.match_score);
        assert_eq!(top.match_band, "Excellent");
        // Twin scored, stranger scored (then thresholded out), friend skipped.
        assert_eq!(response.stats.candidates_considered, 2);
        assert_eq!(response.stats.above_threshold, 1);
        assert_eq!(response.stats.returned, 1);
    }

    #[tokio::test]
    async fn test_pending_requests_excluded_both_directions() {
        let own = own_profile();
        let sent_to = Uuid::new_v4();
        let received_from = Uuid::new_v4();
        let pool = vec![
            candidate(sent_to, "outgoing", &own),
            candidate(received_from, "incoming", &own),
        ];

        let engine = engine(
            FakeProfileStore {
                own: Some(own),
                pool,
            },
            FakeConnectionsStore {
                sent: vec![sent_to],
                received: vec![received_from],
                ..Default::default()
            },
        );

        let response = engine.suggest(Uuid::new_v4()).await.unwrap();
        assert!(response.suggestions.is_empty());
        assert_eq!(response.stats.candidates_considered, 0);
    }

    #[tokio::test]
    async fn test_failed_candidate_profiles_are_skipped() {
        let own = own_profile();
        let mut failed = own.clone();
        failed.analysis_status = AnalysisStatus::Failed;

        let engine = engine(
            FakeProfileStore {
                own: Some(own),
                pool: vec![candidate(Uuid::new_v4(), "broken", &failed)],
            },
            FakeConnectionsStore::default(),
        );

        let response = engine.suggest(Uuid::new_v4()).await.unwrap();
        assert!(response.suggestions.is_empty());
        assert_eq!(response.stats.candidates_considered, 0);
    }

    #[tokio::test]
    async fn test_output_capped_and_sorted_descending() {
        // 25 candidates with decreasing technology overlap out of 6 techs.
        let all_techs = ["Rust", "PostgreSQL", "Kafka", "Redis", "Docker", "Kubernetes"];
        let own_wide = profile(
            &["distributed systems", "API design"],
            &all_techs,
            &[("Rust", 70.0), ("TypeScript", 30.0)],
            "senior",
            20,
        );

        let pool: Vec<CandidateRow> = (0..25)
            .map(|i| {
                let overlap = 6 - (i % 6); // cycle 6..1 shared technologies
                let mut p = own_wide.clone();
                p.identified_technologies = all_techs[..overlap]
                    .iter()
                    .map(|s| s.to_string())
                    .collect();
                candidate(Uuid::new_v4(), &format!("dev{i}"), &p)
            })
            .collect();

        let engine = engine(
            FakeProfileStore {
                own: Some(own_wide),
                pool,
            },
            FakeConnectionsStore::default(),
        );

        let response = engine.suggest(Uuid::new_v4()).await.unwrap();
        assert_eq!(response.suggestions.len(), MAX_SUGGESTIONS);
        for pair in response.suggestions.windows(2) {
            assert!(pair[0].match_score >= pair[1].match_score);
        }
        assert!(response.stats.above_threshold >= MAX_SUGGESTIONS);
        assert!(response.stats.mean_score > 0.0);
    }

    #[tokio::test]
    async fn test_candidates_below_threshold_are_dropped() {
        let own = own_profile();
        // Shares nothing; only the entry-vs-senior experience distance
        // contributes, which stays well under the threshold.
        let mut weak = profile(&["game design"], &["Unity"], &[("C#", 100.0)], "entry", 0);
        weak.potential_roles = vec!["Designer".to_string()];
        weak.architectural_concepts = vec!["entity component system".to_string()];
        weak.project_insights = vec!["Ships mobile puzzle games".to_string()];

        let engine = engine(
            FakeProfileStore {
                own: Some(own),
                pool: vec![candidate(Uuid::new_v4(), "weak", &weak)],
            },
            FakeConnectionsStore::default(),
        );

        let response = engine.suggest(Uuid::new_v4()).await.unwrap();
        assert!(response.suggestions.is_empty());
        assert_eq!(response.stats.candidates_considered, 1);
        assert_eq!(response.stats.above_threshold, 0);
    }
}
