//! Axum route handlers for the Suggestions API.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::profile::ProfileRow;
use crate::state::AppState;
use crate::suggestions::engine::SuggestionResponse;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

/// GET /api/v1/suggestions?user_id=
///
/// Returns ranked co-founder suggestions with per-candidate breakdowns.
pub async fn handle_get_suggestions(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<SuggestionResponse>, AppError> {
    let response = state.suggestions.suggest(params.user_id).await?;
    Ok(Json(response))
}

/// GET /api/v1/profiles/:user_id
///
/// Returns the stored developer profile document as-is.
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ProfileRow>, AppError> {
    let row = sqlx::query_as::<_, ProfileRow>(
        "SELECT user_id, document, updated_at FROM developer_profiles WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("No profile found for user {user_id}")))?;

    Ok(Json(row))
}
