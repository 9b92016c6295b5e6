//! Aggregate counts for the dashboard and the status page

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;

use crate::models::{
    DashboardStats, EntityStats, EventStats, ReservationStats, SuiteStats, VenueStats,
};
use crate::utils::time::{format_db_date, format_db_timestamp};

/// Tables whose row counts appear on the status page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountedTable {
    Reservations,
    Venues,
    SuiteContracts,
    Users,
}

impl CountedTable {
    fn table(self) -> &'static str {
        match self {
            CountedTable::Reservations => "reservations",
            CountedTable::Venues => "venues",
            CountedTable::SuiteContracts => "suite_contracts",
            CountedTable::Users => "users",
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ReservationCounts {
    total: i64,
    pending: i64,
    approved: i64,
    rejected: i64,
    cancelled: i64,
    recent: i64,
}

pub struct StatsRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> StatsRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Compute dashboard counts from current table state
    ///
    /// `recent_since` bounds the recent-reservations window; `today` decides
    /// which contracts are active.
    pub async fn dashboard(
        &self,
        recent_since: DateTime<Utc>,
        today: NaiveDate,
    ) -> Result<DashboardStats> {
        let (events_total, events_active): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(CASE WHEN is_active = 1 THEN 1 ELSE 0 END), 0) FROM events",
        )
        .fetch_one(self.pool)
        .await
        .context("Failed to count events")?;

        let reservations = sqlx::query_as::<_, ReservationCounts>(
            r#"
            SELECT COUNT(*) AS total,
                   COALESCE(SUM(CASE WHEN status = 'pending' THEN 1 ELSE 0 END), 0) AS pending,
                   COALESCE(SUM(CASE WHEN status = 'approved' THEN 1 ELSE 0 END), 0) AS approved,
                   COALESCE(SUM(CASE WHEN status = 'rejected' THEN 1 ELSE 0 END), 0) AS rejected,
                   COALESCE(SUM(CASE WHEN status = 'cancelled' THEN 1 ELSE 0 END), 0) AS cancelled,
                   COALESCE(SUM(CASE WHEN created_at >= ? THEN 1 ELSE 0 END), 0) AS recent
            FROM reservations
            "#,
        )
        .bind(format_db_timestamp(recent_since))
        .fetch_one(self.pool)
        .await
        .context("Failed to count reservations")?;

        let (venues_total, venues_used): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COALESCE(SUM(CASE WHEN EXISTS (
                       SELECT 1 FROM reservations r WHERE r.venue_id = v.id
                   ) THEN 1 ELSE 0 END), 0)
            FROM venues v
            "#,
        )
        .fetch_one(self.pool)
        .await
        .context("Failed to count venues")?;

        let today = format_db_date(today);
        let (suites, contracts, active_contracts): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT (SELECT COUNT(*) FROM suites),
                   (SELECT COUNT(*) FROM suite_contracts),
                   (SELECT COUNT(*) FROM suite_contracts
                    WHERE begin_date <= ?
                      AND (on_going = 1 OR end_date IS NULL OR end_date >= ?))
            "#,
        )
        .bind(&today)
        .bind(&today)
        .fetch_one(self.pool)
        .await
        .context("Failed to count suites")?;

        let (individuals, organizations): (i64, i64) = sqlx::query_as(
            "SELECT (SELECT COUNT(*) FROM individuals), (SELECT COUNT(*) FROM organizations)",
        )
        .fetch_one(self.pool)
        .await
        .context("Failed to count entities")?;

        Ok(DashboardStats {
            events: EventStats {
                total: events_total,
                active: events_active,
            },
            reservations: ReservationStats {
                total: reservations.total,
                pending: reservations.pending,
                approved: reservations.approved,
                rejected: reservations.rejected,
                cancelled: reservations.cancelled,
                recent: reservations.recent,
            },
            venues: VenueStats {
                total: venues_total,
                with_reservations: venues_used,
            },
            suites: SuiteStats {
                total: suites,
                contracts,
                active_contracts,
            },
            entities: EntityStats {
                individuals,
                organizations,
            },
        })
    }

    pub async fn count(&self, table: CountedTable) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", table.table()))
            .fetch_one(self.pool)
            .await
            .with_context(|| format!("Failed to count {}", table.table()))?;
        Ok(count)
    }

    /// Number of application tables
    pub async fn table_count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name NOT LIKE '_sqlx_%'",
        )
        .fetch_one(self.pool)
        .await
        .context("Failed to count tables")?;
        Ok(count)
    }
}
