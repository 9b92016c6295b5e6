//! Uploaded photos and files attached to records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of photos a venue may carry
pub const MAX_VENUE_PHOTOS: i64 = 6;
/// Maximum number of photos an event class may carry
pub const MAX_EVENT_CLASS_PHOTOS: i64 = 2;

/// Record kinds that own a photo gallery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoOwner {
    Venue,
    EventClass,
    Suite,
}

impl PhotoOwner {
    pub fn table(self) -> &'static str {
        match self {
            PhotoOwner::Venue => "venue_photos",
            PhotoOwner::EventClass => "event_class_photos",
            PhotoOwner::Suite => "suite_photos",
        }
    }

    pub fn owner_column(self) -> &'static str {
        match self {
            PhotoOwner::Venue => "venue_id",
            PhotoOwner::EventClass => "event_class_id",
            PhotoOwner::Suite => "suite_id",
        }
    }

    pub fn owner_table(self) -> &'static str {
        match self {
            PhotoOwner::Venue => "venues",
            PhotoOwner::EventClass => "event_classes",
            PhotoOwner::Suite => "suites",
        }
    }

    pub fn upload_prefix(self) -> UploadPrefix {
        match self {
            PhotoOwner::Venue => UploadPrefix::VenuePhotos,
            PhotoOwner::EventClass => UploadPrefix::EventClassPhotos,
            PhotoOwner::Suite => UploadPrefix::SuitePhotos,
        }
    }

    /// `None` means unlimited
    pub fn max_photos(self) -> Option<i64> {
        match self {
            PhotoOwner::Venue => Some(MAX_VENUE_PHOTOS),
            PhotoOwner::EventClass => Some(MAX_EVENT_CLASS_PHOTOS),
            PhotoOwner::Suite => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PhotoOwner::Venue => "Venue",
            PhotoOwner::EventClass => "Event class",
            PhotoOwner::Suite => "Suite",
        }
    }
}

/// Storage directories for uploads, relative to the media root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPrefix {
    IndividualPhotos,
    OrganizationLogos,
    VenuePhotos,
    EventClassPhotos,
    SuitePhotos,
    SuiteFloorPlans,
}

impl UploadPrefix {
    pub fn as_str(self) -> &'static str {
        match self {
            UploadPrefix::IndividualPhotos => "individual_photos",
            UploadPrefix::OrganizationLogos => "organization_logos",
            UploadPrefix::VenuePhotos => "venue_photos",
            UploadPrefix::EventClassPhotos => "event_class_photos",
            UploadPrefix::SuitePhotos => "suite_photos",
            UploadPrefix::SuiteFloorPlans => "suite_floorplans",
        }
    }
}

/// A stored photo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Photo {
    pub id: Uuid,
    pub owner_id: Uuid,
    /// Path relative to the media root
    pub path: String,
    pub caption: String,
    pub uploaded_at: DateTime<Utc>,
}
