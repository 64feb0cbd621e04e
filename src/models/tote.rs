//! Represents a tote — a user-owned storage container record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

/// A storage container owned by a single user.
///
/// Totes carry free-form descriptive metadata plus a derived cover image
/// path, resolved at read time from the earliest associated image.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct Tote {
    /// Server-generated identifier, immutable once created.
    pub id: String,

    /// Owning user. Set once at creation and never altered by the API.
    pub user_id: String,

    /// Display name shown on the tote label.
    pub name: Option<String>,

    /// Longer free-form description of the contents.
    pub description: Option<String>,

    /// Category used for filtering ("Outdoor", "Holiday", ...).
    pub category: Option<String>,

    /// Icon name rendered by the UI. Defaults to "Package".
    pub icon: String,

    /// When this tote was created.
    pub created_on: DateTime<Utc>,

    /// Refreshed on every successful mutation.
    pub updated_on: DateTime<Utc>,

    /// File path of the earliest associated image, if any.
    pub cover_image_path: Option<String>,
}

/// Fields accepted when creating a tote. Everything except the owner is
/// optional.
#[derive(Deserialize, Debug)]
pub struct NewTote {
    pub user_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub icon: Option<String>,
}

/// Partial update for a tote.
///
/// The nullable columns distinguish "absent from the request" (outer `None`,
/// column untouched) from "explicitly set to null" (`Some(None)`, column
/// cleared). `icon` is never null, so a plain `Option` marks presence.
#[derive(Deserialize, Debug, Default)]
pub struct TotePatch {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Option<String>>,

    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,

    #[serde(default, deserialize_with = "present")]
    pub category: Option<Option<String>>,

    pub icon: Option<String>,
}

impl TotePatch {
    /// True when the request supplied no fields at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.icon.is_none()
    }
}

/// Wraps a deserialized value in `Some` so a present-but-null field is
/// `Some(None)` rather than collapsing into the absent case.
fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}
