//! Suites, operating models and suite contracts

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::Photo;

/// An office suite
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suite {
    pub id: Uuid,
    pub suite_number: String,
    /// Floor plan path relative to the media root
    pub floor_plan: Option<String>,
    pub whiteboard: bool,
    pub filing_cabinet: bool,
    pub height_adjustable_desks: i64,
    pub office_chairs: i64,
    pub corner_unit: bool,
    pub minifridge: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteDetail {
    #[serde(flatten)]
    pub suite: Suite,
    pub photos: Vec<Photo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SuiteRequest {
    #[validate(length(min = 1, max = 20))]
    pub suite_number: String,
    #[serde(default)]
    pub whiteboard: bool,
    #[serde(default)]
    pub filing_cabinet: bool,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub height_adjustable_desks: i64,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub office_chairs: i64,
    #[serde(default)]
    pub corner_unit: bool,
    #[serde(default)]
    pub minifridge: bool,
}

/// Dashboard row for a suite
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteSummary {
    pub id: Uuid,
    pub suite_number: String,
    pub has_floor_plan: bool,
    pub whiteboard: bool,
    pub filing_cabinet: bool,
    pub height_adjustable_desks: i64,
    pub office_chairs: i64,
    pub corner_unit: bool,
    pub minifridge: bool,
    pub photo_count: i64,
    pub contracts_count: i64,
}

pub const DEFAULT_PRICE_CENTS: i64 = 300_000;
pub const DEFAULT_PERIOD_DAYS: i64 = 180;

/// Pricing model applied to a contract
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteOperatingModel {
    pub id: Uuid,
    pub name: String,
    pub is_shared: bool,
    pub price_cents: i64,
    /// Billing period in days
    pub period_days: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OperatingModelRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    pub is_shared: bool,
    #[serde(default = "default_price_cents")]
    #[validate(range(min = 0))]
    pub price_cents: i64,
    #[serde(default = "default_period_days")]
    #[validate(range(min = 1))]
    pub period_days: i64,
}

fn default_price_cents() -> i64 {
    DEFAULT_PRICE_CENTS
}

fn default_period_days() -> i64 {
    DEFAULT_PERIOD_DAYS
}

/// The single entity bound by a contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum ContractHolder {
    Individual(Uuid),
    Organization(Uuid),
}

impl ContractHolder {
    /// Build from the two nullable storage columns
    pub fn from_columns(individual: Option<Uuid>, organization: Option<Uuid>) -> Option<Self> {
        match (individual, organization) {
            (Some(id), None) => Some(ContractHolder::Individual(id)),
            (None, Some(id)) => Some(ContractHolder::Organization(id)),
            _ => None,
        }
    }

    /// `(individual_id, organization_id)` for storage
    pub fn columns(&self) -> (Option<Uuid>, Option<Uuid>) {
        match *self {
            ContractHolder::Individual(id) => (Some(id), None),
            ContractHolder::Organization(id) => (None, Some(id)),
        }
    }
}

/// A lease of a suite to one entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteContract {
    pub id: Uuid,
    pub suite_id: Uuid,
    pub holder: ContractHolder,
    pub model_id: Uuid,
    pub begin_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub on_going: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SuiteContract {
    pub fn is_active_on(&self, day: NaiveDate) -> bool {
        if self.begin_date > day {
            return false;
        }
        self.on_going || self.end_date.is_none_or(|end| end >= day)
    }
}

/// Contract form payload, holder given as two optional references
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractRequest {
    pub suite_id: Uuid,
    #[serde(default)]
    pub individual_id: Option<Uuid>,
    #[serde(default)]
    pub organization_id: Option<Uuid>,
    pub model_id: Uuid,
    pub begin_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub on_going: bool,
}

/// Contract that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidContract {
    pub suite_id: Uuid,
    pub holder: ContractHolder,
    pub model_id: Uuid,
    pub begin_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub on_going: bool,
}

impl ContractRequest {
    /// Check holder exclusivity and the date rules
    pub fn validate(&self) -> Result<ValidContract, String> {
        let holder = match (self.individual_id, self.organization_id) {
            (None, None) => {
                return Err(
                    "You must select either an individual or an organization.".to_string(),
                )
            }
            (Some(_), Some(_)) => {
                return Err(
                    "You cannot select both an individual and an organization. Choose one."
                        .to_string(),
                )
            }
            (individual, organization) => ContractHolder::from_columns(individual, organization)
                .ok_or_else(|| "Invalid contract holder".to_string())?,
        };

        if !self.on_going && self.end_date.is_none() {
            return Err("End date is required unless the contract is ongoing.".to_string());
        }

        if let Some(end) = self.end_date {
            if end <= self.begin_date {
                return Err("End date must be after start date.".to_string());
            }
        }

        Ok(ValidContract {
            suite_id: self.suite_id,
            holder,
            model_id: self.model_id,
            begin_date: self.begin_date,
            end_date: self.end_date,
            on_going: self.on_going,
        })
    }
}

/// Dashboard row for a contract with display names resolved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractSummary {
    pub id: Uuid,
    pub suite_id: Uuid,
    pub suite_number: String,
    pub holder: ContractHolder,
    pub holder_name: String,
    pub model_name: String,
    pub begin_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub on_going: bool,
    pub is_active: bool,
}
