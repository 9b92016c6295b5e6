//! Public venue reservations

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::utils::time::parse_datetime_input;

/// Reservation review status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl ReservationStatus {
    pub const ALL: [ReservationStatus; 4] = [
        ReservationStatus::Pending,
        ReservationStatus::Approved,
        ReservationStatus::Rejected,
        ReservationStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Approved => "approved",
            ReservationStatus::Rejected => "rejected",
            ReservationStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReservationStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Invalid reservation status: {}", s))
    }
}

/// A booking request for venue space
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    pub organization: String,
    pub event_type: String,
    pub venue_id: Option<Uuid>,
    pub start_datetime: DateTime<Utc>,
    pub duration_hours: f64,
    pub area: String,
    pub min_people: i64,
    pub max_people: i64,
    pub special_requests: String,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    /// Derived end time; never stored. `None` when out of calendar range.
    pub fn end_datetime(&self) -> Option<DateTime<Utc>> {
        end_of(self.start_datetime, self.duration_hours)
    }

    pub fn is_public(&self, now: DateTime<Utc>) -> bool {
        self.status == ReservationStatus::Approved && self.start_datetime >= now
    }
}

/// Longest bookable span: one leap year
pub const MAX_DURATION_HOURS: f64 = 24.0 * 366.0;

fn end_of(start: DateTime<Utc>, duration_hours: f64) -> Option<DateTime<Utc>> {
    if !duration_hours.is_finite() || duration_hours.abs() > MAX_DURATION_HOURS {
        return None;
    }
    let span = TimeDelta::try_milliseconds((duration_hours * 3_600_000.0).round() as i64)?;
    start.checked_add_signed(span)
}

/// Reservation as sent to clients, including the derived end time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationView {
    #[serde(flatten)]
    pub reservation: Reservation,
    pub end_datetime: Option<DateTime<Utc>>,
    pub venue_name: Option<String>,
}

impl ReservationView {
    pub fn new(reservation: Reservation, venue_name: Option<String>) -> Self {
        Self {
            end_datetime: reservation.end_datetime(),
            reservation,
            venue_name,
        }
    }
}

/// Raw public request form; every field arrives as free text
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReservationForm {
    #[serde(default, deserialize_with = "free_text")]
    pub organization: Option<String>,
    #[serde(default, deserialize_with = "free_text")]
    pub event_type: Option<String>,
    #[serde(default, deserialize_with = "free_text")]
    pub venue_id: Option<String>,
    #[serde(default, deserialize_with = "free_text")]
    pub start_datetime: Option<String>,
    #[serde(default, deserialize_with = "free_text")]
    pub duration_hours: Option<String>,
    #[serde(default, deserialize_with = "free_text")]
    pub area: Option<String>,
    #[serde(default, deserialize_with = "free_text")]
    pub min_people: Option<String>,
    #[serde(default, deserialize_with = "free_text")]
    pub max_people: Option<String>,
    #[serde(default, deserialize_with = "free_text")]
    pub special_requests: Option<String>,
}

/// Validated reservation ready to insert
#[derive(Debug, Clone, PartialEq)]
pub struct NewReservation {
    pub organization: String,
    pub event_type: String,
    pub venue_id: Option<Uuid>,
    pub start_datetime: DateTime<Utc>,
    pub duration_hours: f64,
    pub area: String,
    pub min_people: i64,
    pub max_people: i64,
    pub special_requests: String,
}

impl NewReservation {
    pub fn end_datetime(&self) -> Option<DateTime<Utc>> {
        end_of(self.start_datetime, self.duration_hours)
    }
}

impl ReservationForm {
    /// Parse and validate the form; errors are user-facing messages
    pub fn parse(&self) -> Result<NewReservation, String> {
        let organization = required(&self.organization, "organization")?;
        let event_type = required(&self.event_type, "event_type")?;

        let start_raw = required(&self.start_datetime, "start_datetime")?;
        let start_datetime = parse_datetime_input(&start_raw)
            .ok_or_else(|| format!("Invalid start date/time: {}", start_raw))?;

        let duration_raw = required(&self.duration_hours, "duration_hours")?;
        let duration_hours: f64 = duration_raw
            .parse()
            .map_err(|_| format!("Invalid duration: {}", duration_raw))?;
        if !duration_hours.is_finite() || duration_hours <= 0.0 {
            return Err("Duration must be a positive number of hours".to_string());
        }
        if duration_hours > MAX_DURATION_HOURS {
            return Err(format!(
                "Duration cannot exceed {} hours",
                MAX_DURATION_HOURS
            ));
        }
        if end_of(start_datetime, duration_hours).is_none() {
            return Err(format!("Invalid duration: {}", duration_raw));
        }

        let min_people = parse_headcount(&self.min_people, "min_people")?;
        let max_people = parse_headcount(&self.max_people, "max_people")?;
        if min_people > max_people {
            return Err("Minimum people cannot exceed maximum people".to_string());
        }

        let venue_id = match trimmed(&self.venue_id) {
            Some(raw) => Some(
                Uuid::parse_str(&raw).map_err(|_| format!("Invalid venue id: {}", raw))?,
            ),
            None => None,
        };

        Ok(NewReservation {
            organization,
            event_type,
            venue_id,
            start_datetime,
            duration_hours,
            area: trimmed(&self.area).unwrap_or_default(),
            min_people,
            max_people,
            special_requests: trimmed(&self.special_requests).unwrap_or_default(),
        })
    }
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn required(value: &Option<String>, field: &str) -> Result<String, String> {
    trimmed(value).ok_or_else(|| format!("Missing required field: {}", field))
}

fn parse_headcount(value: &Option<String>, field: &str) -> Result<i64, String> {
    let raw = required(value, field)?;
    let count: i64 = raw
        .parse()
        .map_err(|_| format!("Invalid number for {}: {}", field, raw))?;
    if count < 0 {
        return Err(format!("{} cannot be negative", field));
    }
    Ok(count)
}

/// Accept strings, numbers or null for a free-text field
fn free_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Staff status change payload
#[derive(Debug, Clone, Deserialize)]
pub struct ReservationStatusUpdate {
    #[serde(default)]
    pub reservation_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Dashboard row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationSummary {
    pub id: Uuid,
    pub organization: String,
    pub event_type: String,
    /// Venue name, or `"N/A"` when unassigned
    pub venue: String,
    pub start_datetime: DateTime<Utc>,
    pub end_datetime: Option<DateTime<Utc>>,
    pub duration_hours: f64,
    pub min_people: i64,
    pub max_people: i64,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
}
