//! Host and database status collection
//!
//! Each metric is collected independently; a failure degrades that field to
//! `"N/A"` and never fails the report.

use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use sqlx::SqlitePool;
use sysinfo::{Disks, System};
use tracing::warn;

use crate::db::{check_health, CountedTable, StatsRepository};
use crate::models::{
    DatabaseStats, DiskUsage, HostMetrics, LoadAverage, MemoryUsage, Metric, PlatformInfo,
    SystemStatus,
};

fn percent(used: u64, total: u64) -> Option<f64> {
    if total == 0 {
        return None;
    }
    Some(((used as f64 / total as f64) * 100.0).clamp(0.0, 100.0))
}

/// Keeps one `System` alive so CPU usage is measured between polls
pub struct SystemMonitor {
    system: Mutex<System>,
}

impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemMonitor {
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu_usage();
        system.refresh_memory();
        Self {
            system: Mutex::new(system),
        }
    }

    /// Host metrics plus database counts
    pub async fn status(&self, pool: &SqlitePool) -> SystemStatus {
        SystemStatus {
            timestamp: Utc::now(),
            hostname: System::host_name().into(),
            metrics: self.host_metrics(),
            database: database_stats(pool).await,
        }
    }

    pub fn host_metrics(&self) -> HostMetrics {
        let (cpu_percent, memory) = match self.system.lock() {
            Ok(mut sys) => {
                sys.refresh_cpu_usage();
                sys.refresh_memory();
                let cpu = sys.global_cpu_usage();
                let cpu = if cpu.is_finite() {
                    Metric::Value(cpu)
                } else {
                    Metric::unavailable()
                };
                (cpu, memory_usage(&sys).into())
            }
            Err(e) => {
                warn!(error = %e, "System monitor lock poisoned");
                (Metric::unavailable(), Metric::unavailable())
            }
        };

        HostMetrics {
            cpu_percent,
            memory,
            disk: root_disk_usage().into(),
            load_average: load_average().into(),
            uptime_seconds: Some(System::uptime()).filter(|s| *s > 0).into(),
        }
    }

    pub fn platform_info(&self) -> PlatformInfo {
        let cpu_count = self
            .system
            .lock()
            .map(|sys| sys.cpus().len())
            .ok()
            .filter(|n| *n > 0)
            .unwrap_or_else(num_cpus::get);

        PlatformInfo {
            os: System::name().into(),
            os_version: System::os_version().into(),
            kernel_version: System::kernel_version().into(),
            architecture: std::env::consts::ARCH.to_string(),
            cpu_count,
            hostname: System::host_name().into(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

fn memory_usage(sys: &System) -> Option<MemoryUsage> {
    let total = sys.total_memory();
    let used = sys.used_memory();
    Some(MemoryUsage {
        total,
        available: sys.available_memory(),
        used,
        percent: percent(used, total)?,
    })
}

fn root_disk_usage() -> Option<DiskUsage> {
    let disks = Disks::new_with_refreshed_list();
    let root = Path::new("/");
    let disk = disks
        .list()
        .iter()
        .find(|d| d.mount_point() == root)
        .or_else(|| {
            disks
                .list()
                .iter()
                .min_by_key(|d| d.mount_point().as_os_str().len())
        })?;

    let total = disk.total_space();
    let free = disk.available_space();
    Some(DiskUsage {
        mount_point: disk.mount_point().display().to_string(),
        total,
        free,
        percent: percent(total.saturating_sub(free), total)?,
    })
}

fn load_average() -> Option<LoadAverage> {
    if cfg!(windows) {
        return None;
    }
    let load = System::load_average();
    Some(LoadAverage {
        one: load.one,
        five: load.five,
        fifteen: load.fifteen,
    })
}

async fn database_stats(pool: &SqlitePool) -> DatabaseStats {
    let stats = StatsRepository::new(pool);

    async fn metric(
        stats: &StatsRepository<'_>,
        table: CountedTable,
    ) -> Metric<i64> {
        match stats.count(table).await {
            Ok(n) => Metric::Value(n),
            Err(e) => {
                warn!(error = %e, ?table, "Row count unavailable");
                Metric::unavailable()
            }
        }
    }

    let table_count = match stats.table_count().await {
        Ok(n) => Metric::Value(n),
        Err(e) => {
            warn!(error = %e, "Table count unavailable");
            Metric::unavailable()
        }
    };

    DatabaseStats {
        responsive: check_health(pool).await,
        total_reservations: metric(&stats, CountedTable::Reservations).await,
        total_venues: metric(&stats, CountedTable::Venues).await,
        total_suite_contracts: metric(&stats, CountedTable::SuiteContracts).await,
        total_users: metric(&stats, CountedTable::Users).await,
        table_count,
    }
}
