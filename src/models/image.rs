//! Image records attached to totes and items.
//!
//! A record row points at a blob in the image store through its `file_path`;
//! the bytes themselves never enter the database.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A photograph associated with a tote.
///
/// `file_path` is `{tote_id}/{image_id}.{original_extension}` and uniquely
/// identifies the blob.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct ToteImage {
    pub id: String,
    pub tote_id: String,
    pub user_id: String,
    pub file_path: String,
    pub created_at: DateTime<Utc>,
}

/// A photograph associated with an item. Identical lifecycle to
/// [`ToteImage`] but scoped to an item and stored under an `items/` prefix.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct ItemImage {
    pub id: String,
    pub item_id: String,
    pub user_id: String,
    pub file_path: String,
    pub created_at: DateTime<Utc>,
}
