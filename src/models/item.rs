//! Represents a checklist entry belonging to a tote.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A single checklist entry.
///
/// `checked` is a logical boolean stored as integer 0/1 at the storage
/// boundary; SQLite rows decode it back into `bool`.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct Item {
    pub id: String,

    /// Owning tote.
    pub tote_id: String,

    pub name: String,

    /// Defaults to 1 at creation.
    pub quantity: i64,

    /// Defaults to false at creation.
    pub checked: bool,

    pub created_at: DateTime<Utc>,

    /// Refreshed whenever a partial update supplies at least one field.
    pub updated_at: DateTime<Utc>,
}

/// Body accepted when creating an item. The name is required and must be
/// non-empty; the handler enforces that.
#[derive(Deserialize, Debug)]
pub struct NewItem {
    pub name: Option<String>,
}

/// Partial update for an item. None of these columns are nullable, so a
/// plain `Option` per field is enough to mark presence.
#[derive(Deserialize, Debug, Default)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub quantity: Option<i64>,
    pub checked: Option<bool>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.quantity.is_none() && self.checked.is_none()
    }
}
