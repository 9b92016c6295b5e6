//! Event classes, events and registrations

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::Photo;

/// Classification applied to events ("Workshop", "Gala", ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventClass {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventClassDetail {
    #[serde(flatten)]
    pub event_class: EventClass,
    pub photos: Vec<Photo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EventClassRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// Event approval status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Pending,
    Approved,
    Canceled,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Pending => "pending",
            EventStatus::Approved => "approved",
            EventStatus::Canceled => "canceled",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(EventStatus::Pending),
            "approved" => Ok(EventStatus::Approved),
            "canceled" => Ok(EventStatus::Canceled),
            other => Err(format!("Invalid event status: {}", other)),
        }
    }
}

/// Coarse audience label mapped to a participant range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrowdSize {
    Intimate,
    Small,
    Medium,
    Large,
    XLarge,
    Massive,
    Unknown,
}

impl CrowdSize {
    /// Resolve a label; anything unrecognised is [`CrowdSize::Unknown`]
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "intimate" => CrowdSize::Intimate,
            "small" => CrowdSize::Small,
            "medium" => CrowdSize::Medium,
            "large" => CrowdSize::Large,
            "xlarge" => CrowdSize::XLarge,
            "massive" => CrowdSize::Massive,
            _ => CrowdSize::Unknown,
        }
    }

    /// Inclusive `(min, max)` participant bounds
    pub fn bounds(self) -> (i64, i64) {
        match self {
            CrowdSize::Intimate => (1, 10),
            CrowdSize::Small => (11, 20),
            CrowdSize::Medium => (21, 30),
            CrowdSize::Large => (31, 60),
            CrowdSize::XLarge => (61, 120),
            CrowdSize::Massive => (121, 500),
            CrowdSize::Unknown => (1, 1),
        }
    }
}

/// An internal event users can register for
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub venue_id: Option<Uuid>,
    pub event_class_id: Option<Uuid>,
    pub location: String,
    pub organizer_id: Option<Uuid>,
    pub min_participants: Option<i64>,
    /// `None` means unlimited
    pub max_participants: Option<i64>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub special_requests: String,
    pub status: EventStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.date > now
    }

    /// Whether self-registration is open at `now`
    pub fn can_register(&self, now: DateTime<Utc>) -> bool {
        if !self.is_active || self.status != EventStatus::Approved {
            return false;
        }
        if let Some(deadline) = self.registration_deadline {
            if deadline < now {
                return false;
            }
        }
        self.is_upcoming(now)
    }
}

/// Staff form payload for creating or replacing an event
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EventRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub venue_id: Option<Uuid>,
    #[serde(default)]
    pub event_class_id: Option<Uuid>,
    #[serde(default)]
    #[validate(length(max = 300))]
    pub location: String,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub min_participants: Option<i64>,
    #[serde(default)]
    #[validate(range(min = 1))]
    pub max_participants: Option<i64>,
    #[serde(default)]
    pub registration_deadline: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub special_requests: String,
    #[serde(default)]
    pub status: EventStatus,
}

impl EventRequest {
    pub fn check_bounds(&self) -> Result<(), String> {
        match (self.min_participants, self.max_participants) {
            (Some(min), Some(max)) if min > max => Err(
                "Minimum participants cannot exceed maximum participants".to_string(),
            ),
            _ => Ok(()),
        }
    }
}

/// JSON API payload; field names follow the public booking widget
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventApiRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub datetime_start: Option<String>,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub crowd_size: Option<String>,
    #[serde(default)]
    pub special_requests: Option<String>,
}

/// Public listing row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSummary {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub venue_name: Option<String>,
    pub event_class_name: Option<String>,
    pub max_participants: Option<i64>,
    pub registration_count: i64,
    pub status: EventStatus,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Public detail view, personalised for the caller when known
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDetail {
    #[serde(flatten)]
    pub event: Event,
    pub venue_name: Option<String>,
    pub event_class_name: Option<String>,
    pub registration_count: i64,
    pub spots_remaining: Option<i64>,
    pub can_register: bool,
    pub user_registered: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRegistration {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub notes: String,
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub notes: String,
}

/// A caller's registration joined with its event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MyEventEntry {
    pub registration_id: Uuid,
    pub event_id: Uuid,
    pub title: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub status: EventStatus,
    pub notes: String,
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventStatusUpdate {
    pub event_id: Option<Uuid>,
    pub status: Option<String>,
}
