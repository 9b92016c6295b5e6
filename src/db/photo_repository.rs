//! Photo galleries for venues, event classes and suites

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::parse_id;
use crate::models::{Photo, PhotoOwner};
use crate::utils::time::{db_now, parse_db_timestamp};

#[derive(Debug, sqlx::FromRow)]
struct PhotoRow {
    id: String,
    owner_id: String,
    path: String,
    caption: String,
    uploaded_at: String,
}

/// Result of attaching a photo to its owner
#[derive(Debug)]
pub enum PhotoInsert {
    Inserted(Photo),
    OwnerNotFound,
    /// The owner already carries its maximum number of photos
    LimitReached(i64),
}

pub struct PhotoRepository<'a> {
    pool: &'a SqlitePool,
    owner: PhotoOwner,
}

impl<'a> PhotoRepository<'a> {
    pub fn new(pool: &'a SqlitePool, owner: PhotoOwner) -> Self {
        Self { pool, owner }
    }

    pub async fn list(&self, owner_id: Uuid) -> Result<Vec<Photo>> {
        let rows = sqlx::query_as::<_, PhotoRow>(&format!(
            "SELECT id, {col} AS owner_id, path, caption, uploaded_at FROM {table} \
             WHERE {col} = ? ORDER BY uploaded_at, id",
            col = self.owner.owner_column(),
            table = self.owner.table(),
        ))
        .bind(owner_id.to_string())
        .fetch_all(self.pool)
        .await
        .context("Failed to list photos")?;

        Ok(rows.into_iter().map(row_to_photo).collect())
    }

    pub async fn get(&self, owner_id: Uuid, photo_id: Uuid) -> Result<Option<Photo>> {
        let row = sqlx::query_as::<_, PhotoRow>(&format!(
            "SELECT id, {col} AS owner_id, path, caption, uploaded_at FROM {table} \
             WHERE id = ? AND {col} = ?",
            col = self.owner.owner_column(),
            table = self.owner.table(),
        ))
        .bind(photo_id.to_string())
        .bind(owner_id.to_string())
        .fetch_optional(self.pool)
        .await
        .context("Failed to get photo")?;

        Ok(row.map(row_to_photo))
    }

    /// Attach a stored file, refusing once the owner's limit is reached
    ///
    /// The count check and the insert are one statement, so concurrent
    /// uploads cannot exceed the limit.
    pub async fn insert(&self, owner_id: Uuid, path: &str, caption: &str) -> Result<PhotoInsert> {
        let (owner_exists,): (i64,) = sqlx::query_as(&format!(
            "SELECT COUNT(*) FROM {} WHERE id = ?",
            self.owner.owner_table()
        ))
        .bind(owner_id.to_string())
        .fetch_one(self.pool)
        .await
        .context("Failed to look up photo owner")?;

        if owner_exists == 0 {
            return Ok(PhotoInsert::OwnerNotFound);
        }

        let id = Uuid::new_v4();
        let limit = self.owner.max_photos().unwrap_or(i64::MAX);
        let result = sqlx::query(&format!(
            "INSERT INTO {table} (id, {col}, path, caption, uploaded_at) \
             SELECT ?, ?, ?, ?, ? \
             WHERE (SELECT COUNT(*) FROM {table} WHERE {col} = ?) < ?",
            col = self.owner.owner_column(),
            table = self.owner.table(),
        ))
        .bind(id.to_string())
        .bind(owner_id.to_string())
        .bind(path)
        .bind(caption)
        .bind(db_now())
        .bind(owner_id.to_string())
        .bind(limit)
        .execute(self.pool)
        .await
        .context("Failed to insert photo")?;

        if result.rows_affected() == 0 {
            return Ok(PhotoInsert::LimitReached(limit));
        }

        let photo = self
            .get(owner_id, id)
            .await?
            .context("Failed to retrieve inserted photo")?;
        Ok(PhotoInsert::Inserted(photo))
    }

    pub async fn delete(&self, owner_id: Uuid, photo_id: Uuid) -> Result<Option<Photo>> {
        let Some(photo) = self.get(owner_id, photo_id).await? else {
            return Ok(None);
        };

        sqlx::query(&format!("DELETE FROM {} WHERE id = ?", self.owner.table()))
            .bind(photo_id.to_string())
            .execute(self.pool)
            .await
            .context("Failed to delete photo")?;

        Ok(Some(photo))
    }

    pub async fn count(&self, owner_id: Uuid) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as(&format!(
            "SELECT COUNT(*) FROM {table} WHERE {col} = ?",
            col = self.owner.owner_column(),
            table = self.owner.table(),
        ))
        .bind(owner_id.to_string())
        .fetch_one(self.pool)
        .await
        .context("Failed to count photos")?;
        Ok(count)
    }
}

fn row_to_photo(row: PhotoRow) -> Photo {
    Photo {
        id: parse_id(&row.id),
        owner_id: parse_id(&row.owner_id),
        path: row.path,
        caption: row.caption,
        uploaded_at: parse_db_timestamp(&row.uploaded_at),
    }
}
