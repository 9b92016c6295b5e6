//! Venue repository

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{parse_id, parse_id_opt};
use crate::models::{Venue, VenueOption, VenueRequest, VenueSummary};
use crate::utils::time::{db_now, parse_db_timestamp};

#[derive(Debug, sqlx::FromRow)]
struct VenueRow {
    id: String,
    name: String,
    address: String,
    capacity: i64,
    contact_email: Option<String>,
    responsible_individual_id: Option<String>,
    created_at: String,
    updated_at: String,
}

#[derive(Debug, sqlx::FromRow)]
struct VenueSummaryRow {
    id: String,
    name: String,
    address: String,
    capacity: i64,
    contact_email: Option<String>,
    responsible_person: Option<String>,
    photo_count: i64,
    reservation_count: i64,
}

const VENUE_COLUMNS: &str =
    "id, name, address, capacity, contact_email, responsible_individual_id, created_at, updated_at";

pub struct VenueRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> VenueRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Venue>> {
        let rows = sqlx::query_as::<_, VenueRow>(&format!(
            "SELECT {VENUE_COLUMNS} FROM venues ORDER BY name"
        ))
        .fetch_all(self.pool)
        .await
        .context("Failed to list venues")?;

        Ok(rows.into_iter().map(row_to_venue).collect())
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Venue>> {
        let row = sqlx::query_as::<_, VenueRow>(&format!(
            "SELECT {VENUE_COLUMNS} FROM venues WHERE id = ?"
        ))
        .bind(id.to_string())
        .fetch_optional(self.pool)
        .await
        .context("Failed to get venue")?;

        Ok(row.map(row_to_venue))
    }

    /// Dashboard listing with the responsible person's name and usage counts
    pub async fn list_summaries(&self) -> Result<Vec<VenueSummary>> {
        let rows = sqlx::query_as::<_, VenueSummaryRow>(
            r#"
            SELECT v.id, v.name, v.address, v.capacity, v.contact_email,
                   CASE WHEN i.id IS NULL THEN NULL
                        ELSE i.name_first || ' ' || i.name_last END AS responsible_person,
                   (SELECT COUNT(*) FROM venue_photos p WHERE p.venue_id = v.id) AS photo_count,
                   (SELECT COUNT(*) FROM reservations r WHERE r.venue_id = v.id) AS reservation_count
            FROM venues v
            LEFT JOIN individuals i ON i.id = v.responsible_individual_id
            ORDER BY v.name
            "#,
        )
        .fetch_all(self.pool)
        .await
        .context("Failed to list venue summaries")?;

        Ok(rows
            .into_iter()
            .map(|row| VenueSummary {
                id: parse_id(&row.id),
                name: row.name,
                address: row.address,
                capacity: row.capacity,
                contact_email: row.contact_email,
                responsible_person: row.responsible_person,
                photo_count: row.photo_count,
                reservation_count: row.reservation_count,
            })
            .collect())
    }

    /// Compact list for public pickers
    pub async fn list_options(&self) -> Result<Vec<VenueOption>> {
        let rows: Vec<(String, String, i64)> =
            sqlx::query_as("SELECT id, name, capacity FROM venues ORDER BY name")
                .fetch_all(self.pool)
                .await
                .context("Failed to list venue options")?;

        Ok(rows
            .into_iter()
            .map(|(id, name, capacity)| VenueOption {
                id: parse_id(&id),
                name,
                capacity,
            })
            .collect())
    }

    pub async fn create(&self, req: &VenueRequest) -> Result<Venue> {
        let id = Uuid::new_v4();
        let now = db_now();

        sqlx::query(
            r#"
            INSERT INTO venues (id, name, address, capacity, contact_email,
                responsible_individual_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&req.name)
        .bind(&req.address)
        .bind(req.capacity)
        .bind(&req.contact_email)
        .bind(req.responsible_individual_id.map(|id| id.to_string()))
        .bind(&now)
        .bind(&now)
        .execute(self.pool)
        .await
        .context("Failed to create venue")?;

        self.get_by_id(id)
            .await?
            .context("Failed to retrieve created venue")
    }

    pub async fn update(&self, id: Uuid, req: &VenueRequest) -> Result<Option<Venue>> {
        let result = sqlx::query(
            r#"
            UPDATE venues
            SET name = ?, address = ?, capacity = ?, contact_email = ?,
                responsible_individual_id = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&req.name)
        .bind(&req.address)
        .bind(req.capacity)
        .bind(&req.contact_email)
        .bind(req.responsible_individual_id.map(|id| id.to_string()))
        .bind(db_now())
        .bind(id.to_string())
        .execute(self.pool)
        .await
        .context("Failed to update venue")?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_by_id(id).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM venues WHERE id = ?")
            .bind(id.to_string())
            .execute(self.pool)
            .await
            .context("Failed to delete venue")?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn name_of(&self, id: Uuid) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT name FROM venues WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(self.pool)
            .await
            .context("Failed to get venue name")?;
        Ok(row.map(|(name,)| name))
    }
}

fn row_to_venue(row: VenueRow) -> Venue {
    Venue {
        id: parse_id(&row.id),
        name: row.name,
        address: row.address,
        capacity: row.capacity,
        contact_email: row.contact_email,
        responsible_individual_id: parse_id_opt(row.responsible_individual_id.as_deref()),
        created_at: parse_db_timestamp(&row.created_at),
        updated_at: parse_db_timestamp(&row.updated_at),
    }
}
