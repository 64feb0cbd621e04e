//! HTTP handlers for checklist items.

use crate::{
    errors::AppError,
    models::item::{Item, ItemPatch, NewItem},
    services::tote_service::ToteService,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

/// GET `/api/totes/{id}/items` — a tote's items in insertion order.
pub async fn list_items(
    State(service): State<ToteService>,
    Path(tote_id): Path<String>,
) -> Result<Json<Vec<Item>>, AppError> {
    Ok(Json(service.list_items(&tote_id).await?))
}

/// POST `/api/totes/{id}/items` — create an item. The name is required and
/// must be non-empty.
pub async fn create_item(
    State(service): State<ToteService>,
    Path(tote_id): Path<String>,
    Json(body): Json<NewItem>,
) -> Result<Json<Item>, AppError> {
    let name = body.name.unwrap_or_default();
    if name.is_empty() {
        return Err(AppError::bad_request("missing item name"));
    }
    Ok(Json(service.create_item(&tote_id, &name).await?))
}

/// PATCH `/api/items/{id}` — partial update over name, quantity, checked.
pub async fn update_item(
    State(service): State<ToteService>,
    Path(id): Path<String>,
    Json(patch): Json<ItemPatch>,
) -> Result<Json<Item>, AppError> {
    Ok(Json(service.update_item(&id, patch).await?))
}

/// DELETE `/api/items/{id}` — hard delete, idempotent.
pub async fn delete_item(
    State(service): State<ToteService>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    service.delete_item(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
