//! Defines routes for the Totelink API.
//!
//! ## Structure
//! - **Totes**
//!   - `GET    /api/totes` — list totes, newest-updated first
//!   - `POST   /api/totes` — create tote
//!   - `GET    /api/totes/{id}` — fetch one tote
//!   - `PATCH  /api/totes/{id}` — partial update
//! - **Tote images**
//!   - `GET    /api/totes/{id}/images` — list images
//!   - `POST   /api/totes/{id}/images` — multipart upload
//!   - `DELETE /api/images/{id}` — delete image and blob
//!   - `GET    /api/images/file/{*path}` — raw bytes with ETag
//! - **Items**
//!   - `GET    /api/totes/{id}/items` — list items, insertion order
//!   - `POST   /api/totes/{id}/items` — create item
//!   - `PATCH  /api/items/{id}` — partial update
//!   - `DELETE /api/items/{id}` — hard delete
//! - **Item images**
//!   - `GET    /api/items/{id}/images` — list images
//!   - `POST   /api/items/{id}/images` — multipart upload
//!   - `DELETE /api/item-images/{id}` — delete image and blob
//!
//! A permissive CORS layer wraps every route; there is no other middleware.

use crate::{
    handlers::{
        health_handlers::{healthz, readyz},
        image_handlers::{
            delete_item_image, delete_tote_image, fetch_image_file, list_item_images,
            list_tote_images, upload_item_image, upload_tote_image,
        },
        item_handlers::{create_item, delete_item, list_items, update_item},
        tote_handlers::{create_tote, get_tote, list_totes, update_tote},
    },
    services::tote_service::ToteService,
};
use axum::{
    Router,
    routing::{delete, get, patch},
};
use tower_http::cors::{Any, CorsLayer};

/// Build and return the router for all API routes.
///
/// The router carries shared state (`ToteService`) to all handlers.
pub fn routes() -> Router<ToteService> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Totes
        .route("/api/totes", get(list_totes).post(create_tote))
        .route("/api/totes/{id}", get(get_tote).patch(update_tote))
        // Tote images
        .route(
            "/api/totes/{id}/images",
            get(list_tote_images).post(upload_tote_image),
        )
        .route("/api/images/{id}", delete(delete_tote_image))
        .route("/api/images/file/{*path}", get(fetch_image_file))
        // Items
        .route(
            "/api/totes/{id}/items",
            get(list_items).post(create_item),
        )
        .route("/api/items/{id}", patch(update_item).delete(delete_item))
        // Item images
        .route(
            "/api/items/{id}/images",
            get(list_item_images).post(upload_item_image),
        )
        .route("/api/item-images/{id}", delete(delete_item_image))
        .layer(cors)
}
