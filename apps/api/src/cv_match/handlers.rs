//! Axum route handlers for the CV API.

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::cv_match::matcher::CvMatchResponse;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpsertCvRequest {
    pub user_id: Uuid,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct CvMatchRequest {
    pub user_id: Uuid,
}

/// PUT /api/v1/cv
///
/// Stores or replaces the user's CV text. One CV per user; re-upload
/// overwrites, no history kept.
pub async fn handle_upsert_cv(
    State(state): State<AppState>,
    Json(request): Json<UpsertCvRequest>,
) -> Result<StatusCode, AppError> {
    if request.content.trim().is_empty() {
        return Err(AppError::Validation("CV content cannot be empty".to_string()));
    }

    sqlx::query(
        r#"
        INSERT INTO cvs (user_id, content, updated_at)
        VALUES ($1, $2, now())
        ON CONFLICT (user_id)
        DO UPDATE SET content = EXCLUDED.content, updated_at = now()
        "#,
    )
    .bind(request.user_id)
    .bind(&request.content)
    .execute(&state.db)
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/cv/match
///
/// Runs the two-stage matcher against the user's stored CV.
pub async fn handle_cv_match(
    State(state): State<AppState>,
    Json(request): Json<CvMatchRequest>,
) -> Result<Json<CvMatchResponse>, AppError> {
    let response = state.cv_matcher.match_jobs(request.user_id).await?;
    Ok(Json(response))
}
