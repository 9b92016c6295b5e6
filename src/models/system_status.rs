//! Host and database status report

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder reported for a metric that could not be read
pub const UNAVAILABLE: &str = "N/A";

/// A metric value, or `"N/A"` when collection failed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Metric<T> {
    Value(T),
    Unavailable(String),
}

impl<T> Metric<T> {
    pub fn unavailable() -> Self {
        Metric::Unavailable(UNAVAILABLE.to_string())
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Metric::Value(_))
    }
}

impl<T> From<Option<T>> for Metric<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Metric::Value(v),
            None => Metric::unavailable(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemStatus {
    pub timestamp: DateTime<Utc>,
    pub hostname: Metric<String>,
    pub metrics: HostMetrics,
    pub database: DatabaseStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostMetrics {
    pub cpu_percent: Metric<f32>,
    pub memory: Metric<MemoryUsage>,
    pub disk: Metric<DiskUsage>,
    pub load_average: Metric<LoadAverage>,
    pub uptime_seconds: Metric<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryUsage {
    pub total: u64,
    pub available: u64,
    pub used: u64,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskUsage {
    pub mount_point: String,
    pub total: u64,
    pub free: u64,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadAverage {
    pub one: f64,
    pub five: f64,
    pub fifteen: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseStats {
    pub responsive: bool,
    pub total_reservations: Metric<i64>,
    pub total_venues: Metric<i64>,
    pub total_suite_contracts: Metric<i64>,
    pub total_users: Metric<i64>,
    pub table_count: Metric<i64>,
}

/// Static platform description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformInfo {
    pub os: Metric<String>,
    pub os_version: Metric<String>,
    pub kernel_version: Metric<String>,
    pub architecture: String,
    pub cpu_count: usize,
    pub hostname: Metric<String>,
    pub app_version: String,
}
