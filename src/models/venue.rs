//! Venue models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::Photo;

/// A bookable space
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Venue {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub capacity: i64,
    pub contact_email: Option<String>,
    pub responsible_individual_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Venue with its gallery, as returned by the detail endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueDetail {
    #[serde(flatten)]
    pub venue: Venue,
    pub photos: Vec<Photo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VenueRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub capacity: i64,
    #[serde(default)]
    #[validate(email)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub responsible_individual_id: Option<Uuid>,
}

/// Dashboard row for a venue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueSummary {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub capacity: i64,
    pub contact_email: Option<String>,
    /// Full name of the responsible individual, if any
    pub responsible_person: Option<String>,
    pub photo_count: i64,
    pub reservation_count: i64,
}

/// Compact venue reference for public pickers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueOption {
    pub id: Uuid,
    pub name: String,
    pub capacity: i64,
}
