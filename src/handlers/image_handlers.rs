//! HTTP handlers for tote and item images: multipart upload, listing,
//! deletion, and raw byte fetch with a content-derived ETag.

use crate::{
    errors::AppError,
    models::image::{ItemImage, ToteImage},
    services::tote_service::ToteService,
};
use axum::{
    Json,
    body::Body,
    extract::{Multipart, Path, State},
    http::{HeaderValue, StatusCode, header},
    response::Response,
};
use bytes::Bytes;

/// Decoded multipart upload: one file field plus the owner identity.
struct ImageUpload {
    user_id: String,
    filename: String,
    bytes: Bytes,
}

/// Pull the `file` and `user_id` fields out of a multipart payload.
/// Either one missing is a client error.
async fn read_image_upload(mut multipart: Multipart) -> Result<ImageUpload, AppError> {
    let mut user_id: Option<String> = None;
    let mut file: Option<(String, Bytes)> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().map(str::to_owned);
                let bytes = field.bytes().await?;
                if let Some(filename) = filename {
                    file = Some((filename, bytes));
                }
            }
            Some("user_id") => user_id = Some(field.text().await?),
            _ => {}
        }
    }

    match (file, user_id) {
        (Some((filename, bytes)), Some(user_id)) => Ok(ImageUpload {
            user_id,
            filename,
            bytes,
        }),
        _ => Err(AppError::bad_request("missing file or user_id")),
    }
}

/// GET `/api/totes/{id}/images`
pub async fn list_tote_images(
    State(service): State<ToteService>,
    Path(tote_id): Path<String>,
) -> Result<Json<Vec<ToteImage>>, AppError> {
    Ok(Json(service.list_tote_images(&tote_id).await?))
}

/// POST `/api/totes/{id}/images` — multipart upload of one image.
pub async fn upload_tote_image(
    State(service): State<ToteService>,
    Path(tote_id): Path<String>,
    multipart: Multipart,
) -> Result<Json<ToteImage>, AppError> {
    let upload = read_image_upload(multipart).await?;
    Ok(Json(
        service
            .upload_tote_image(&tote_id, &upload.user_id, &upload.filename, upload.bytes)
            .await?,
    ))
}

/// DELETE `/api/images/{id}` — remove blob and record.
pub async fn delete_tote_image(
    State(service): State<ToteService>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    service.delete_tote_image(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET `/api/images/file/{*path}` — raw image bytes.
///
/// The ETag is derived from the content itself (quoted md5 hex), matching
/// what a blob-store front end would hand back.
pub async fn fetch_image_file(
    State(service): State<ToteService>,
    Path(path): Path<String>,
) -> Result<Response, AppError> {
    let bytes = service.fetch_image(&path).await?;
    let etag = format!("\"{:x}\"", md5::compute(&bytes));

    let mut response = Response::new(Body::from(bytes));
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(content_type_for(&path)),
    );
    if let Ok(value) = HeaderValue::from_str(&etag) {
        headers.insert(header::ETAG, value);
    }
    Ok(response)
}

/// GET `/api/items/{id}/images`
pub async fn list_item_images(
    State(service): State<ToteService>,
    Path(item_id): Path<String>,
) -> Result<Json<Vec<ItemImage>>, AppError> {
    Ok(Json(service.list_item_images(&item_id).await?))
}

/// POST `/api/items/{id}/images` — multipart upload of one image.
pub async fn upload_item_image(
    State(service): State<ToteService>,
    Path(item_id): Path<String>,
    multipart: Multipart,
) -> Result<Json<ItemImage>, AppError> {
    let upload = read_image_upload(multipart).await?;
    Ok(Json(
        service
            .upload_item_image(&item_id, &upload.user_id, &upload.filename, upload.bytes)
            .await?,
    ))
}

/// DELETE `/api/item-images/{id}` — remove blob and record.
pub async fn delete_item_image(
    State(service): State<ToteService>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    service.delete_item_image(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Content type inferred from the stored path's extension.
fn content_type_for(path: &str) -> &'static str {
    let extension = path.rsplit('.').next().map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}
