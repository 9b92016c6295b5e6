//! Dashboard statistics

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardStats {
    pub events: EventStats,
    pub reservations: ReservationStats,
    pub venues: VenueStats,
    pub suites: SuiteStats,
    pub entities: EntityStats,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventStats {
    pub total: i64,
    pub active: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReservationStats {
    pub total: i64,
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
    pub cancelled: i64,
    /// Created within the configured recent window
    pub recent: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VenueStats {
    pub total: i64,
    pub with_reservations: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuiteStats {
    pub total: i64,
    pub contracts: i64,
    pub active_contracts: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityStats {
    pub individuals: i64,
    pub organizations: i64,
}
