use std::sync::Arc;

use sqlx::PgPool;

use crate::cv_match::matcher::CvMatcher;
use crate::suggestions::engine::SuggestionEngine;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Profile similarity engine. Holds its own store handles; handlers never
    /// query profile/connection tables directly for suggestions.
    pub suggestions: Arc<SuggestionEngine>,
    /// Two-stage CV-to-job matcher (full-text recall + LLM re-rank).
    pub cv_matcher: Arc<CvMatcher>,
}
