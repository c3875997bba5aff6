//! Axum route handlers for the Connections API.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::connection::{ConnectionRow, STATUS_ACCEPTED, STATUS_PENDING};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateConnectionRequest {
    pub requester_id: Uuid,
    pub addressee_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ActingUser {
    pub user_id: Uuid,
}

/// POST /api/v1/connections
///
/// Creates a pending connection request. Rejects self-connections and any
/// pair that already has a row in either direction.
pub async fn handle_create_connection(
    State(state): State<AppState>,
    Json(request): Json<CreateConnectionRequest>,
) -> Result<(StatusCode, Json<ConnectionRow>), AppError> {
    if request.requester_id == request.addressee_id {
        return Err(AppError::Validation(
            "Cannot send a connection request to yourself".to_string(),
        ));
    }

    let existing: Option<ConnectionRow> = sqlx::query_as(
        r#"
        SELECT * FROM connections
        WHERE (requester_id = $1 AND addressee_id = $2)
           OR (requester_id = $2 AND addressee_id = $1)
        "#,
    )
    .bind(request.requester_id)
    .bind(request.addressee_id)
    .fetch_optional(&state.db)
    .await?;

    if existing.is_some() {
        return Err(AppError::Conflict(
            "A connection already exists between these users".to_string(),
        ));
    }

    let row: ConnectionRow = sqlx::query_as(
        r#"
        INSERT INTO connections (id, requester_id, addressee_id, status, created_at)
        VALUES (gen_random_uuid(), $1, $2, $3, now())
        RETURNING *
        "#,
    )
    .bind(request.requester_id)
    .bind(request.addressee_id)
    .bind(STATUS_PENDING)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(row)))
}

/// POST /api/v1/connections/:id/accept
///
/// Accepts a pending request. Only the addressee may accept.
pub async fn handle_accept_connection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(acting): Json<ActingUser>,
) -> Result<Json<ConnectionRow>, AppError> {
    let row: ConnectionRow = sqlx::query_as("SELECT * FROM connections WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Connection {id} not found")))?;

    if row.addressee_id != acting.user_id {
        return Err(AppError::Forbidden);
    }
    if row.status != STATUS_PENDING {
        return Err(AppError::Conflict("Connection is not pending".to_string()));
    }

    let updated: ConnectionRow =
        sqlx::query_as("UPDATE connections SET status = $1 WHERE id = $2 RETURNING *")
            .bind(STATUS_ACCEPTED)
            .bind(id)
            .fetch_one(&state.db)
            .await?;

    Ok(Json(updated))
}

/// DELETE /api/v1/connections/:id?user_id=
///
/// Declines, cancels, or severs a connection. Either participant may delete.
pub async fn handle_delete_connection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(acting): Query<ActingUser>,
) -> Result<StatusCode, AppError> {
    let row: ConnectionRow = sqlx::query_as("SELECT * FROM connections WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Connection {id} not found")))?;

    if row.requester_id != acting.user_id && row.addressee_id != acting.user_id {
        return Err(AppError::Forbidden);
    }

    sqlx::query("DELETE FROM connections WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/connections?user_id=
///
/// Lists every connection row the user participates in, newest first.
pub async fn handle_list_connections(
    State(state): State<AppState>,
    Query(acting): Query<ActingUser>,
) -> Result<Json<Vec<ConnectionRow>>, AppError> {
    let rows: Vec<ConnectionRow> = sqlx::query_as(
        r#"
        SELECT * FROM connections
        WHERE requester_id = $1 OR addressee_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(acting.user_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(rows))
}
