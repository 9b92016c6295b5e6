//! Event class, event and registration repositories

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{parse_id, parse_id_opt};
use crate::models::{
    Event, EventClass, EventClassRequest, EventRegistration, EventRequest, EventStatus,
    EventSummary, MyEventEntry,
};
use crate::utils::time::{db_now, format_db_timestamp, parse_db_timestamp, parse_db_timestamp_opt};

#[derive(Debug, sqlx::FromRow)]
struct EventClassRow {
    id: String,
    name: String,
    description: String,
    is_active: bool,
    created_at: String,
    updated_at: String,
}

pub struct EventClassRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> EventClassRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, active_only: bool) -> Result<Vec<EventClass>> {
        let rows = sqlx::query_as::<_, EventClassRow>(
            r#"
            SELECT id, name, description, is_active, created_at, updated_at
            FROM event_classes
            WHERE (? = 0 OR is_active = 1)
            ORDER BY name
            "#,
        )
        .bind(active_only)
        .fetch_all(self.pool)
        .await
        .context("Failed to list event classes")?;

        Ok(rows.into_iter().map(row_to_class).collect())
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<EventClass>> {
        let row = sqlx::query_as::<_, EventClassRow>(
            r#"
            SELECT id, name, description, is_active, created_at, updated_at
            FROM event_classes
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(self.pool)
        .await
        .context("Failed to get event class")?;

        Ok(row.map(row_to_class))
    }

    /// Resolve by id, falling back to a case-insensitive name match
    pub async fn resolve(&self, ident: &str) -> Result<Option<EventClass>> {
        let ident = ident.trim();
        if let Ok(id) = Uuid::parse_str(ident) {
            if let Some(class) = self.get_by_id(id).await? {
                return Ok(Some(class));
            }
        }

        let row = sqlx::query_as::<_, EventClassRow>(
            r#"
            SELECT id, name, description, is_active, created_at, updated_at
            FROM event_classes
            WHERE lower(name) = lower(?)
            ORDER BY is_active DESC, created_at
            LIMIT 1
            "#,
        )
        .bind(ident)
        .fetch_optional(self.pool)
        .await
        .context("Failed to resolve event class")?;

        Ok(row.map(row_to_class))
    }

    pub async fn create(&self, req: &EventClassRequest) -> Result<EventClass> {
        let id = Uuid::new_v4();
        let now = db_now();

        sqlx::query(
            r#"
            INSERT INTO event_classes (id, name, description, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&req.name)
        .bind(&req.description)
        .bind(req.is_active)
        .bind(&now)
        .bind(&now)
        .execute(self.pool)
        .await
        .context("Failed to create event class")?;

        self.get_by_id(id)
            .await?
            .context("Failed to retrieve created event class")
    }

    pub async fn update(&self, id: Uuid, req: &EventClassRequest) -> Result<Option<EventClass>> {
        let result = sqlx::query(
            r#"
            UPDATE event_classes
            SET name = ?, description = ?, is_active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&req.name)
        .bind(&req.description)
        .bind(req.is_active)
        .bind(db_now())
        .bind(id.to_string())
        .execute(self.pool)
        .await
        .context("Failed to update event class")?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_by_id(id).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM event_classes WHERE id = ?")
            .bind(id.to_string())
            .execute(self.pool)
            .await
            .context("Failed to delete event class")?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_class(row: EventClassRow) -> EventClass {
    EventClass {
        id: parse_id(&row.id),
        name: row.name,
        description: row.description,
        is_active: row.is_active,
        created_at: parse_db_timestamp(&row.created_at),
        updated_at: parse_db_timestamp(&row.updated_at),
    }
}

#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    id: String,
    title: String,
    description: String,
    date: String,
    venue_id: Option<String>,
    event_class_id: Option<String>,
    location: String,
    organizer_id: Option<String>,
    min_participants: Option<i64>,
    max_participants: Option<i64>,
    registration_deadline: Option<String>,
    is_active: bool,
    special_requests: String,
    status: String,
    created_at: String,
    updated_at: String,
}

#[derive(Debug, sqlx::FromRow)]
struct EventSummaryRow {
    id: String,
    title: String,
    description: String,
    date: String,
    location: String,
    venue_name: Option<String>,
    event_class_name: Option<String>,
    max_participants: Option<i64>,
    registration_count: i64,
    status: String,
    is_active: bool,
    created_at: String,
}

#[derive(Debug, sqlx::FromRow)]
struct MyEventRow {
    registration_id: String,
    event_id: String,
    title: String,
    date: String,
    location: String,
    status: String,
    notes: String,
    registered_at: String,
}

const EVENT_COLUMNS: &str = "id, title, description, date, venue_id, event_class_id, location, \
    organizer_id, min_participants, max_participants, registration_deadline, is_active, \
    special_requests, status, created_at, updated_at";

const SUMMARY_SELECT: &str = r#"
    SELECT e.id, e.title, e.description, e.date, e.location,
           v.name AS venue_name, c.name AS event_class_name,
           e.max_participants,
           (SELECT COUNT(*) FROM event_registrations r WHERE r.event_id = e.id) AS registration_count,
           e.status, e.is_active, e.created_at
    FROM events e
    LEFT JOIN venues v ON v.id = e.venue_id
    LEFT JOIN event_classes c ON c.id = e.event_class_id
"#;

/// Result of a self-registration attempt
#[derive(Debug)]
pub enum RegistrationOutcome {
    Registered(EventRegistration),
    AlreadyRegistered,
    Full,
}

pub struct EventRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> EventRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Event>> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = ?"
        ))
        .bind(id.to_string())
        .fetch_optional(self.pool)
        .await
        .context("Failed to get event")?;

        Ok(row.map(row_to_event))
    }

    /// Approved, active events starting at or after `now`, soonest first
    pub async fn list_upcoming(
        &self,
        now: DateTime<Utc>,
        search: Option<&str>,
    ) -> Result<Vec<EventSummary>> {
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s.to_lowercase()));

        let rows = sqlx::query_as::<_, EventSummaryRow>(&format!(
            r#"{SUMMARY_SELECT}
            WHERE e.date >= ? AND e.is_active = 1 AND e.status = 'approved'
              AND (? IS NULL OR lower(e.title) LIKE ? OR lower(e.description) LIKE ?
                   OR lower(e.location) LIKE ?)
            ORDER BY e.date
            "#
        ))
        .bind(format_db_timestamp(now))
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(self.pool)
        .await
        .context("Failed to list upcoming events")?;

        Ok(rows.into_iter().map(row_to_summary).collect())
    }

    /// Most recently created events regardless of status
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<EventSummary>> {
        let rows = sqlx::query_as::<_, EventSummaryRow>(&format!(
            "{SUMMARY_SELECT} ORDER BY e.created_at DESC LIMIT ?"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await
        .context("Failed to list events")?;

        Ok(rows.into_iter().map(row_to_summary).collect())
    }

    pub async fn create(&self, req: &EventRequest, organizer_id: Option<Uuid>) -> Result<Event> {
        let id = Uuid::new_v4();
        let now = db_now();

        sqlx::query(
            r#"
            INSERT INTO events (id, title, description, date, venue_id, event_class_id, location,
                organizer_id, min_participants, max_participants, registration_deadline,
                is_active, special_requests, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&req.title)
        .bind(&req.description)
        .bind(format_db_timestamp(req.date))
        .bind(req.venue_id.map(|v| v.to_string()))
        .bind(req.event_class_id.map(|c| c.to_string()))
        .bind(&req.location)
        .bind(organizer_id.map(|o| o.to_string()))
        .bind(req.min_participants)
        .bind(req.max_participants)
        .bind(req.registration_deadline.map(format_db_timestamp))
        .bind(req.is_active)
        .bind(&req.special_requests)
        .bind(req.status.as_str())
        .bind(&now)
        .bind(&now)
        .execute(self.pool)
        .await
        .context("Failed to create event")?;

        self.get_by_id(id)
            .await?
            .context("Failed to retrieve created event")
    }

    /// Replace all editable fields; the organizer is kept
    pub async fn update(&self, id: Uuid, req: &EventRequest) -> Result<Option<Event>> {
        let result = sqlx::query(
            r#"
            UPDATE events
            SET title = ?, description = ?, date = ?, venue_id = ?, event_class_id = ?,
                location = ?, min_participants = ?, max_participants = ?,
                registration_deadline = ?, is_active = ?, special_requests = ?, status = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&req.title)
        .bind(&req.description)
        .bind(format_db_timestamp(req.date))
        .bind(req.venue_id.map(|v| v.to_string()))
        .bind(req.event_class_id.map(|c| c.to_string()))
        .bind(&req.location)
        .bind(req.min_participants)
        .bind(req.max_participants)
        .bind(req.registration_deadline.map(format_db_timestamp))
        .bind(req.is_active)
        .bind(&req.special_requests)
        .bind(req.status.as_str())
        .bind(db_now())
        .bind(id.to_string())
        .execute(self.pool)
        .await
        .context("Failed to update event")?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_by_id(id).await
    }

    pub async fn set_status(&self, id: Uuid, status: EventStatus) -> Result<bool> {
        let result = sqlx::query("UPDATE events SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(db_now())
            .bind(id.to_string())
            .execute(self.pool)
            .await
            .context("Failed to update event status")?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = ?")
            .bind(id.to_string())
            .execute(self.pool)
            .await
            .context("Failed to delete event")?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn registration_count(&self, event_id: Uuid) -> Result<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM event_registrations WHERE event_id = ?")
                .bind(event_id.to_string())
                .fetch_one(self.pool)
                .await
                .context("Failed to count registrations")?;
        Ok(count)
    }

    pub async fn is_registered(&self, event_id: Uuid, user_id: Uuid) -> Result<bool> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM event_registrations WHERE event_id = ? AND user_id = ?",
        )
        .bind(event_id.to_string())
        .bind(user_id.to_string())
        .fetch_one(self.pool)
        .await
        .context("Failed to check registration")?;
        Ok(count > 0)
    }

    /// Register a user in one conditional insert
    ///
    /// The row is only written while the registration count is below
    /// `max_participants`; the unique index rejects a second registration by
    /// the same user. An existing registration wins over a full event.
    /// Eligibility (`can_register`) is checked by the caller.
    pub async fn register(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        notes: &str,
    ) -> Result<RegistrationOutcome> {
        let id = Uuid::new_v4();
        let now = db_now();

        let result = sqlx::query(
            r#"
            INSERT INTO event_registrations (id, event_id, user_id, notes, registered_at)
            SELECT ?, e.id, ?, ?, ?
            FROM events e
            WHERE e.id = ?
              AND (e.max_participants IS NULL
                   OR (SELECT COUNT(*) FROM event_registrations r WHERE r.event_id = e.id)
                      < e.max_participants)
            "#,
        )
        .bind(id.to_string())
        .bind(user_id.to_string())
        .bind(notes)
        .bind(&now)
        .bind(event_id.to_string())
        .execute(self.pool)
        .await;

        match result {
            Ok(done) if done.rows_affected() == 0 => {
                if self.is_registered(event_id, user_id).await? {
                    Ok(RegistrationOutcome::AlreadyRegistered)
                } else {
                    Ok(RegistrationOutcome::Full)
                }
            }
            Ok(_) => Ok(RegistrationOutcome::Registered(EventRegistration {
                id,
                event_id,
                user_id,
                notes: notes.to_string(),
                registered_at: parse_db_timestamp(&now),
            })),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Ok(RegistrationOutcome::AlreadyRegistered)
            }
            Err(e) => Err(e).context("Failed to register for event"),
        }
    }

    pub async fn unregister(&self, event_id: Uuid, user_id: Uuid) -> Result<bool> {
        let result =
            sqlx::query("DELETE FROM event_registrations WHERE event_id = ? AND user_id = ?")
                .bind(event_id.to_string())
                .bind(user_id.to_string())
                .execute(self.pool)
                .await
                .context("Failed to unregister from event")?;

        Ok(result.rows_affected() > 0)
    }

    /// The user's registrations ordered by event date
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<MyEventEntry>> {
        let rows = sqlx::query_as::<_, MyEventRow>(
            r#"
            SELECT r.id AS registration_id, e.id AS event_id, e.title, e.date, e.location,
                   e.status, r.notes, r.registered_at
            FROM event_registrations r
            JOIN events e ON e.id = r.event_id
            WHERE r.user_id = ?
            ORDER BY e.date
            "#,
        )
        .bind(user_id.to_string())
        .fetch_all(self.pool)
        .await
        .context("Failed to list user registrations")?;

        Ok(rows
            .into_iter()
            .map(|row| MyEventEntry {
                registration_id: parse_id(&row.registration_id),
                event_id: parse_id(&row.event_id),
                title: row.title,
                date: parse_db_timestamp(&row.date),
                location: row.location,
                status: row.status.parse().unwrap_or_default(),
                notes: row.notes,
                registered_at: parse_db_timestamp(&row.registered_at),
            })
            .collect())
    }

    /// Venue and class names for an event's detail view
    pub async fn related_names(&self, event: &Event) -> Result<(Option<String>, Option<String>)> {
        let row: Option<(Option<String>, Option<String>)> = sqlx::query_as(
            r#"
            SELECT v.name, c.name
            FROM events e
            LEFT JOIN venues v ON v.id = e.venue_id
            LEFT JOIN event_classes c ON c.id = e.event_class_id
            WHERE e.id = ?
            "#,
        )
        .bind(event.id.to_string())
        .fetch_optional(self.pool)
        .await
        .context("Failed to load event relations")?;

        Ok(row.unwrap_or((None, None)))
    }
}

fn row_to_event(row: EventRow) -> Event {
    Event {
        id: parse_id(&row.id),
        title: row.title,
        description: row.description,
        date: parse_db_timestamp(&row.date),
        venue_id: parse_id_opt(row.venue_id.as_deref()),
        event_class_id: parse_id_opt(row.event_class_id.as_deref()),
        location: row.location,
        organizer_id: parse_id_opt(row.organizer_id.as_deref()),
        min_participants: row.min_participants,
        max_participants: row.max_participants,
        registration_deadline: parse_db_timestamp_opt(row.registration_deadline.as_deref()),
        is_active: row.is_active,
        special_requests: row.special_requests,
        status: row.status.parse().unwrap_or_default(),
        created_at: parse_db_timestamp(&row.created_at),
        updated_at: parse_db_timestamp(&row.updated_at),
    }
}

fn row_to_summary(row: EventSummaryRow) -> EventSummary {
    EventSummary {
        id: parse_id(&row.id),
        title: row.title,
        description: row.description,
        date: parse_db_timestamp(&row.date),
        location: row.location,
        venue_name: row.venue_name,
        event_class_name: row.event_class_name,
        max_participants: row.max_participants,
        registration_count: row.registration_count,
        status: row.status.parse().unwrap_or_default(),
        is_active: row.is_active,
        created_at: parse_db_timestamp(&row.created_at),
    }
}
