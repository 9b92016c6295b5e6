//! Entity pool: individuals and organizations renting space

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::utils::validation::{ein_validator, phone_validator};

/// A person who can hold a contract or be responsible for a venue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Individual {
    pub id: Uuid,
    pub name_first: String,
    pub name_last: String,
    pub dob: Option<NaiveDate>,
    pub address: Option<String>,
    pub phone_number1: Option<String>,
    pub phone_number2: Option<String>,
    pub email: Option<String>,
    pub photo: Option<String>,
    /// Access credentials
    pub rf_id: Option<String>,
    pub key_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Individual {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name_first, self.name_last)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct IndividualRequest {
    #[validate(length(min = 1, max = 100))]
    pub name_first: String,
    #[validate(length(min = 1, max = 100))]
    pub name_last: String,
    #[serde(default)]
    pub dob: Option<NaiveDate>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "phone_validator"))]
    pub phone_number1: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "phone_validator"))]
    pub phone_number2: Option<String>,
    #[serde(default)]
    #[validate(email)]
    pub email: Option<String>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub rf_id: Option<String>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub key_id: Option<String>,
}

/// A company or non-profit renting space
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    /// Employer identification number
    pub ein: String,
    pub info: String,
    pub logo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrganizationRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(custom(function = "ein_validator"))]
    pub ein: String,
    #[serde(default)]
    pub info: String,
}

/// Dashboard view of the entity pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitiesOverview {
    pub individuals: Vec<IndividualSummary>,
    pub organizations: Vec<OrganizationSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndividualSummary {
    pub id: Uuid,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub has_photo: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Individual> for IndividualSummary {
    fn from(individual: &Individual) -> Self {
        Self {
            id: individual.id,
            full_name: individual.full_name(),
            email: individual.email.clone(),
            phone: individual.phone_number1.clone(),
            has_photo: individual.photo.is_some(),
            created_at: individual.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationSummary {
    pub id: Uuid,
    pub name: String,
    pub ein: String,
    pub has_logo: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Organization> for OrganizationSummary {
    fn from(org: &Organization) -> Self {
        Self {
            id: org.id,
            name: org.name.clone(),
            ein: org.ein.clone(),
            has_logo: org.logo.is_some(),
            created_at: org.created_at,
        }
    }
}
