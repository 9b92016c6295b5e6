//! Reservation repository

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{parse_id, parse_id_opt};
use crate::models::{NewReservation, Reservation, ReservationStatus, ReservationSummary};
use crate::utils::time::{db_now, format_db_timestamp, parse_db_timestamp};

#[derive(Debug, sqlx::FromRow)]
struct ReservationRow {
    id: String,
    organization: String,
    event_type: String,
    venue_id: Option<String>,
    start_datetime: String,
    duration_hours: f64,
    area: String,
    min_people: i64,
    max_people: i64,
    special_requests: String,
    status: String,
    created_at: String,
    updated_at: String,
    venue_name: Option<String>,
}

const RESERVATION_SELECT: &str = r#"
    SELECT r.id, r.organization, r.event_type, r.venue_id, r.start_datetime, r.duration_hours,
           r.area, r.min_people, r.max_people, r.special_requests, r.status,
           r.created_at, r.updated_at, v.name AS venue_name
    FROM reservations r
    LEFT JOIN venues v ON v.id = r.venue_id
"#;

pub struct ReservationRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ReservationRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a validated request in `pending` status
    pub async fn create(&self, new: &NewReservation) -> Result<Reservation> {
        let id = Uuid::new_v4();
        let now = db_now();

        sqlx::query(
            r#"
            INSERT INTO reservations (id, organization, event_type, venue_id, start_datetime,
                duration_hours, area, min_people, max_people, special_requests, status,
                created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&new.organization)
        .bind(&new.event_type)
        .bind(new.venue_id.map(|v| v.to_string()))
        .bind(format_db_timestamp(new.start_datetime))
        .bind(new.duration_hours)
        .bind(&new.area)
        .bind(new.min_people)
        .bind(new.max_people)
        .bind(&new.special_requests)
        .bind(ReservationStatus::Pending.as_str())
        .bind(&now)
        .bind(&now)
        .execute(self.pool)
        .await
        .context("Failed to create reservation")?;

        self.get_by_id(id)
            .await?
            .map(|(reservation, _)| reservation)
            .context("Failed to retrieve created reservation")
    }

    /// Reservation and its venue name
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<(Reservation, Option<String>)>> {
        let row = sqlx::query_as::<_, ReservationRow>(&format!(
            "{RESERVATION_SELECT} WHERE r.id = ?"
        ))
        .bind(id.to_string())
        .fetch_optional(self.pool)
        .await
        .context("Failed to get reservation")?;

        Ok(row.map(row_to_reservation))
    }

    /// Approved reservations starting at or after `now`, soonest first
    pub async fn list_public(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<(Reservation, Option<String>)>> {
        let rows = sqlx::query_as::<_, ReservationRow>(&format!(
            "{RESERVATION_SELECT} WHERE r.status = 'approved' AND r.start_datetime >= ? \
             ORDER BY r.start_datetime"
        ))
        .bind(format_db_timestamp(now))
        .fetch_all(self.pool)
        .await
        .context("Failed to list public reservations")?;

        Ok(rows.into_iter().map(row_to_reservation).collect())
    }

    /// An approved, not yet started reservation
    pub async fn get_public(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<(Reservation, Option<String>)>> {
        let row = sqlx::query_as::<_, ReservationRow>(&format!(
            "{RESERVATION_SELECT} WHERE r.id = ? AND r.status = 'approved' AND r.start_datetime >= ?"
        ))
        .bind(id.to_string())
        .bind(format_db_timestamp(now))
        .fetch_optional(self.pool)
        .await
        .context("Failed to get reservation")?;

        Ok(row.map(row_to_reservation))
    }

    /// Most recently created reservations for the dashboard
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<ReservationSummary>> {
        let rows = sqlx::query_as::<_, ReservationRow>(&format!(
            "{RESERVATION_SELECT} ORDER BY r.created_at DESC LIMIT ?"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await
        .context("Failed to list reservations")?;

        Ok(rows
            .into_iter()
            .map(row_to_reservation)
            .map(|(r, venue_name)| ReservationSummary {
                id: r.id,
                end_datetime: r.end_datetime(),
                organization: r.organization,
                event_type: r.event_type,
                venue: venue_name.unwrap_or_else(|| "N/A".to_string()),
                start_datetime: r.start_datetime,
                duration_hours: r.duration_hours,
                min_people: r.min_people,
                max_people: r.max_people,
                status: r.status,
                created_at: r.created_at,
            })
            .collect())
    }

    /// Overwrite the status; `false` when the reservation does not exist
    pub async fn set_status(&self, id: Uuid, status: ReservationStatus) -> Result<bool> {
        let result =
            sqlx::query("UPDATE reservations SET status = ?, updated_at = ? WHERE id = ?")
                .bind(status.as_str())
                .bind(db_now())
                .bind(id.to_string())
                .execute(self.pool)
                .await
                .context("Failed to update reservation status")?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_reservation(row: ReservationRow) -> (Reservation, Option<String>) {
    let reservation = Reservation {
        id: parse_id(&row.id),
        organization: row.organization,
        event_type: row.event_type,
        venue_id: parse_id_opt(row.venue_id.as_deref()),
        start_datetime: parse_db_timestamp(&row.start_datetime),
        duration_hours: row.duration_hours,
        area: row.area,
        min_people: row.min_people,
        max_people: row.max_people,
        special_requests: row.special_requests,
        status: row.status.parse().unwrap_or_default(),
        created_at: parse_db_timestamp(&row.created_at),
        updated_at: parse_db_timestamp(&row.updated_at),
    };
    (reservation, row.venue_name)
}
