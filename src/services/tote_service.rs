//! ToteService — resource operations backed by SQLite for entity metadata
//! and a disk blob store for image payloads.
//!
//! Every statement binds its values as parameters; dynamic update sets are
//! assembled with `QueryBuilder`, never by splicing values into SQL text.
//! Failures propagate immediately to the caller; no retries.

use crate::models::{
    image::{ItemImage, ToteImage},
    item::{Item, ItemPatch},
    tote::{NewTote, Tote, TotePatch},
};
use crate::services::blob_store::{BlobError, BlobStore};
use bytes::Bytes;
use chrono::Utc;
use sqlx::{QueryBuilder, SqlitePool, sqlite::Sqlite};
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("tote `{0}` not found")]
    ToteNotFound(String),
    #[error("item `{0}` not found")]
    ItemNotFound(String),
    #[error("image `{0}` not found")]
    ImageNotFound(String),
    #[error("no fields to update")]
    EmptyUpdate,
    #[error(transparent)]
    Blob(#[from] BlobError),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Icon assigned to totes created without one.
const DEFAULT_ICON: &str = "Package";

/// Tote projection shared by every tote read. The correlated subquery
/// resolves the cover image as the earliest-created image for the tote,
/// tie-broken by insertion order.
const TOTE_SELECT: &str = "SELECT id, user_id, name, description, category, icon, \
     created_on, updated_on, \
     (SELECT file_path FROM tote_images WHERE tote_images.tote_id = totes.id \
      ORDER BY created_at ASC, rowid ASC LIMIT 1) AS cover_image_path \
     FROM totes";

const ITEM_SELECT: &str =
    "SELECT id, tote_id, name, quantity, checked, created_at, updated_at FROM items";

/// ToteService provides the resource operations behind the HTTP handlers:
/// - Tote list/get/create/partial-update
/// - Image upload/list/delete and raw fetch, for totes and items
/// - Item list/create/partial-update/delete
///
/// Each invocation is a stateless unit of work; the SQLite pool and the
/// blob directory are the only shared resources.
#[derive(Clone)]
pub struct ToteService {
    /// Shared SQLite connection pool used for metadata operations.
    pub db: Arc<SqlitePool>,

    /// Disk-backed store holding image payloads.
    pub blobs: BlobStore,
}

impl ToteService {
    pub fn new(db: Arc<SqlitePool>, base_path: impl Into<std::path::PathBuf>) -> Self {
        Self {
            db,
            blobs: BlobStore::new(base_path),
        }
    }

    // --- Totes ---

    /// List all totes, most recently updated first. No pagination.
    pub async fn list_totes(&self) -> ServiceResult<Vec<Tote>> {
        let query = format!("{TOTE_SELECT} ORDER BY updated_on DESC");
        Ok(sqlx::query_as::<Sqlite, Tote>(&query)
            .fetch_all(&*self.db)
            .await?)
    }

    pub async fn get_tote(&self, id: &str) -> ServiceResult<Tote> {
        let query = format!("{TOTE_SELECT} WHERE id = ?");
        sqlx::query_as::<Sqlite, Tote>(&query)
            .bind(id)
            .fetch_optional(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::ToteNotFound(id.to_string()))
    }

    /// Create a tote for `owner`. The server generates the id and sets both
    /// timestamps to the same instant; the created row is returned via a
    /// fresh read rather than INSERT..RETURNING.
    pub async fn create_tote(&self, owner: &str, new: NewTote) -> ServiceResult<Tote> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO totes (id, user_id, name, description, category, icon, created_on, updated_on)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(owner)
        .bind(&new.name)
        .bind(&new.description)
        .bind(&new.category)
        .bind(new.icon.as_deref().unwrap_or(DEFAULT_ICON))
        .bind(now)
        .bind(now)
        .execute(&*self.db)
        .await?;

        self.get_tote(&id).await
    }

    /// Apply a partial update. Only supplied fields enter the SET clause;
    /// `updated_on` is stamped on every successful update regardless of
    /// which fields changed. An empty patch is rejected before any write.
    pub async fn update_tote(&self, id: &str, patch: TotePatch) -> ServiceResult<Tote> {
        if patch.is_empty() {
            return Err(ServiceError::EmptyUpdate);
        }

        let mut builder = QueryBuilder::<Sqlite>::new("UPDATE totes SET ");
        {
            let mut assignments = builder.separated(", ");
            if let Some(name) = patch.name {
                assignments.push("name = ");
                assignments.push_bind_unseparated(name);
            }
            if let Some(description) = patch.description {
                assignments.push("description = ");
                assignments.push_bind_unseparated(description);
            }
            if let Some(category) = patch.category {
                assignments.push("category = ");
                assignments.push_bind_unseparated(category);
            }
            if let Some(icon) = patch.icon {
                assignments.push("icon = ");
                assignments.push_bind_unseparated(icon);
            }
            assignments.push("updated_on = ");
            assignments.push_bind_unseparated(Utc::now());
        }
        builder.push(" WHERE id = ");
        builder.push_bind(id);

        let result = builder.build().execute(&*self.db).await?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::ToteNotFound(id.to_string()));
        }

        self.get_tote(id).await
    }

    // --- Tote images ---

    /// List all images for a tote, newest first.
    pub async fn list_tote_images(&self, tote_id: &str) -> ServiceResult<Vec<ToteImage>> {
        Ok(sqlx::query_as::<Sqlite, ToteImage>(
            "SELECT id, tote_id, user_id, file_path, created_at
             FROM tote_images WHERE tote_id = ?
             ORDER BY created_at DESC, rowid DESC",
        )
        .bind(tote_id)
        .fetch_all(&*self.db)
        .await?)
    }

    /// Store an uploaded tote image.
    ///
    /// Two-phase: the blob is written first, then the metadata row. If the
    /// insert fails the blob write is rolled back so no orphan survives.
    pub async fn upload_tote_image(
        &self,
        tote_id: &str,
        user_id: &str,
        filename: &str,
        bytes: Bytes,
    ) -> ServiceResult<ToteImage> {
        let id = Uuid::new_v4().to_string();
        let file_path = format!("{}/{}.{}", tote_id, id, file_extension(filename));

        self.blobs.put(&file_path, &bytes).await?;

        let created_at = Utc::now();
        let insert = sqlx::query(
            "INSERT INTO tote_images (id, tote_id, user_id, file_path, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(tote_id)
        .bind(user_id)
        .bind(&file_path)
        .bind(created_at)
        .execute(&*self.db)
        .await;

        if let Err(err) = insert {
            if let Err(cleanup) = self.blobs.delete(&file_path).await {
                warn!(
                    "could not roll back blob {} after failed insert: {}",
                    file_path, cleanup
                );
            }
            return Err(err.into());
        }

        Ok(ToteImage {
            id,
            tote_id: tote_id.to_string(),
            user_id: user_id.to_string(),
            file_path,
            created_at,
        })
    }

    /// Delete a tote image and its blob.
    ///
    /// The blob goes first: a crash between the two deletes then leaves a
    /// record without a blob, never a blob no record points to.
    pub async fn delete_tote_image(&self, id: &str) -> ServiceResult<()> {
        let file_path: Option<String> =
            sqlx::query_scalar("SELECT file_path FROM tote_images WHERE id = ?")
                .bind(id)
                .fetch_optional(&*self.db)
                .await?;
        let Some(file_path) = file_path else {
            return Err(ServiceError::ImageNotFound(id.to_string()));
        };

        self.blobs.delete(&file_path).await?;

        sqlx::query("DELETE FROM tote_images WHERE id = ?")
            .bind(id)
            .execute(&*self.db)
            .await?;
        Ok(())
    }

    /// Fetch raw image bytes by stored path.
    pub async fn fetch_image(&self, path: &str) -> ServiceResult<Bytes> {
        Ok(self.blobs.get(path).await?)
    }

    // --- Items ---

    /// List a tote's items in insertion order, oldest first.
    pub async fn list_items(&self, tote_id: &str) -> ServiceResult<Vec<Item>> {
        let query = format!("{ITEM_SELECT} WHERE tote_id = ? ORDER BY created_at ASC, rowid ASC");
        Ok(sqlx::query_as::<Sqlite, Item>(&query)
            .bind(tote_id)
            .fetch_all(&*self.db)
            .await?)
    }

    pub async fn get_item(&self, id: &str) -> ServiceResult<Item> {
        let query = format!("{ITEM_SELECT} WHERE id = ?");
        sqlx::query_as::<Sqlite, Item>(&query)
            .bind(id)
            .fetch_optional(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::ItemNotFound(id.to_string()))
    }

    /// Create an item with quantity 1, unchecked, both timestamps now.
    pub async fn create_item(&self, tote_id: &str, name: &str) -> ServiceResult<Item> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO items (id, tote_id, name, quantity, checked, created_at, updated_at)
             VALUES (?, ?, ?, 1, 0, ?, ?)",
        )
        .bind(&id)
        .bind(tote_id)
        .bind(name)
        .bind(now)
        .bind(now)
        .execute(&*self.db)
        .await?;

        self.get_item(&id).await
    }

    /// Apply a partial update to an item. Same policy as totes: an empty
    /// patch is rejected, `updated_at` is stamped on any successful update.
    pub async fn update_item(&self, id: &str, patch: ItemPatch) -> ServiceResult<Item> {
        if patch.is_empty() {
            return Err(ServiceError::EmptyUpdate);
        }

        let mut builder = QueryBuilder::<Sqlite>::new("UPDATE items SET ");
        {
            let mut assignments = builder.separated(", ");
            if let Some(name) = patch.name {
                assignments.push("name = ");
                assignments.push_bind_unseparated(name);
            }
            if let Some(quantity) = patch.quantity {
                assignments.push("quantity = ");
                assignments.push_bind_unseparated(quantity);
            }
            if let Some(checked) = patch.checked {
                assignments.push("checked = ");
                assignments.push_bind_unseparated(checked);
            }
            assignments.push("updated_at = ");
            assignments.push_bind_unseparated(Utc::now());
        }
        builder.push(" WHERE id = ");
        builder.push_bind(id);

        let result = builder.build().execute(&*self.db).await?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::ItemNotFound(id.to_string()));
        }

        self.get_item(id).await
    }

    /// Hard-delete an item. No existence check; deleting a missing id is a
    /// no-op, which makes the operation idempotent for clients.
    pub async fn delete_item(&self, id: &str) -> ServiceResult<()> {
        sqlx::query("DELETE FROM items WHERE id = ?")
            .bind(id)
            .execute(&*self.db)
            .await?;
        Ok(())
    }

    // --- Item images ---

    /// List all images for an item, newest first.
    pub async fn list_item_images(&self, item_id: &str) -> ServiceResult<Vec<ItemImage>> {
        Ok(sqlx::query_as::<Sqlite, ItemImage>(
            "SELECT id, item_id, user_id, file_path, created_at
             FROM item_images WHERE item_id = ?
             ORDER BY created_at DESC, rowid DESC",
        )
        .bind(item_id)
        .fetch_all(&*self.db)
        .await?)
    }

    /// Store an uploaded item image. Same two-phase contract as tote
    /// images; item blobs live under the `items/` path prefix.
    pub async fn upload_item_image(
        &self,
        item_id: &str,
        user_id: &str,
        filename: &str,
        bytes: Bytes,
    ) -> ServiceResult<ItemImage> {
        let id = Uuid::new_v4().to_string();
        let file_path = format!("items/{}/{}.{}", item_id, id, file_extension(filename));

        self.blobs.put(&file_path, &bytes).await?;

        let created_at = Utc::now();
        let insert = sqlx::query(
            "INSERT INTO item_images (id, item_id, user_id, file_path, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(item_id)
        .bind(user_id)
        .bind(&file_path)
        .bind(created_at)
        .execute(&*self.db)
        .await;

        if let Err(err) = insert {
            if let Err(cleanup) = self.blobs.delete(&file_path).await {
                warn!(
                    "could not roll back blob {} after failed insert: {}",
                    file_path, cleanup
                );
            }
            return Err(err.into());
        }

        Ok(ItemImage {
            id,
            item_id: item_id.to_string(),
            user_id: user_id.to_string(),
            file_path,
            created_at,
        })
    }

    /// Delete an item image and its blob, blob first.
    pub async fn delete_item_image(&self, id: &str) -> ServiceResult<()> {
        let file_path: Option<String> =
            sqlx::query_scalar("SELECT file_path FROM item_images WHERE id = ?")
                .bind(id)
                .fetch_optional(&*self.db)
                .await?;
        let Some(file_path) = file_path else {
            return Err(ServiceError::ImageNotFound(id.to_string()));
        };

        self.blobs.delete(&file_path).await?;

        sqlx::query("DELETE FROM item_images WHERE id = ?")
            .bind(id)
            .execute(&*self.db)
            .await?;
        Ok(())
    }
}

/// Last dot-separated segment of a filename; a name without a dot is
/// returned whole.
fn file_extension(filename: &str) -> &str {
    filename.rsplit('.').next().unwrap_or(filename)
}

#[cfg(test)]
mod tests {
    use super::file_extension;

    #[test]
    fn extension_is_last_segment() {
        assert_eq!(file_extension("photo.png"), "png");
        assert_eq!(file_extension("archive.tar.gz"), "gz");
        assert_eq!(file_extension("noext"), "noext");
    }
}
