//! HTTP handlers for tote resources.
//!
//! Handlers own HTTP-level validation only and delegate store work to
//! `ToteService`.

use crate::{
    errors::AppError,
    models::tote::{NewTote, Tote, TotePatch},
    services::tote_service::ToteService,
};
use axum::{
    Json,
    extract::{Path, State},
};

/// GET `/api/totes` — all totes, most recently updated first.
pub async fn list_totes(
    State(service): State<ToteService>,
) -> Result<Json<Vec<Tote>>, AppError> {
    Ok(Json(service.list_totes().await?))
}

/// GET `/api/totes/{id}`
pub async fn get_tote(
    State(service): State<ToteService>,
    Path(id): Path<String>,
) -> Result<Json<Tote>, AppError> {
    Ok(Json(service.get_tote(&id).await?))
}

/// POST `/api/totes` — create a tote. The caller must identify the owner.
pub async fn create_tote(
    State(service): State<ToteService>,
    Json(body): Json<NewTote>,
) -> Result<Json<Tote>, AppError> {
    let Some(owner) = body.user_id.clone() else {
        return Err(AppError::unauthorized("missing user_id"));
    };
    Ok(Json(service.create_tote(&owner, body).await?))
}

/// PATCH `/api/totes/{id}` — partial update over name, description,
/// category, and icon.
pub async fn update_tote(
    State(service): State<ToteService>,
    Path(id): Path<String>,
    Json(patch): Json<TotePatch>,
) -> Result<Json<Tote>, AppError> {
    Ok(Json(service.update_tote(&id, patch).await?))
}
