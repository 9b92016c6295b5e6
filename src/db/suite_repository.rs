//! Suite, operating model and contract repositories

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{parse_id, parse_id_opt};
use crate::models::{
    ContractHolder, ContractSummary, OperatingModelRequest, Suite, SuiteContract,
    SuiteOperatingModel, SuiteRequest, SuiteSummary, ValidContract,
};
use crate::utils::time::{db_now, format_db_date, parse_db_date, parse_db_timestamp};

#[derive(Debug, sqlx::FromRow)]
struct SuiteRow {
    id: String,
    suite_number: String,
    floor_plan: Option<String>,
    whiteboard: bool,
    filing_cabinet: bool,
    height_adjustable_desks: i64,
    office_chairs: i64,
    corner_unit: bool,
    minifridge: bool,
    created_at: String,
    updated_at: String,
}

#[derive(Debug, sqlx::FromRow)]
struct SuiteSummaryRow {
    id: String,
    suite_number: String,
    floor_plan: Option<String>,
    whiteboard: bool,
    filing_cabinet: bool,
    height_adjustable_desks: i64,
    office_chairs: i64,
    corner_unit: bool,
    minifridge: bool,
    photo_count: i64,
    contracts_count: i64,
}

const SUITE_COLUMNS: &str = "id, suite_number, floor_plan, whiteboard, filing_cabinet, \
    height_adjustable_desks, office_chairs, corner_unit, minifridge, created_at, updated_at";

pub struct SuiteRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SuiteRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Suite>> {
        let rows = sqlx::query_as::<_, SuiteRow>(&format!(
            "SELECT {SUITE_COLUMNS} FROM suites ORDER BY suite_number"
        ))
        .fetch_all(self.pool)
        .await
        .context("Failed to list suites")?;

        Ok(rows.into_iter().map(row_to_suite).collect())
    }

    pub async fn list_summaries(&self) -> Result<Vec<SuiteSummary>> {
        let rows = sqlx::query_as::<_, SuiteSummaryRow>(
            r#"
            SELECT s.id, s.suite_number, s.floor_plan, s.whiteboard, s.filing_cabinet,
                   s.height_adjustable_desks, s.office_chairs, s.corner_unit, s.minifridge,
                   (SELECT COUNT(*) FROM suite_photos p WHERE p.suite_id = s.id) AS photo_count,
                   (SELECT COUNT(*) FROM suite_contracts c WHERE c.suite_id = s.id) AS contracts_count
            FROM suites s
            ORDER BY s.suite_number
            "#,
        )
        .fetch_all(self.pool)
        .await
        .context("Failed to list suite summaries")?;

        Ok(rows
            .into_iter()
            .map(|row| SuiteSummary {
                id: parse_id(&row.id),
                suite_number: row.suite_number,
                has_floor_plan: row.floor_plan.is_some(),
                whiteboard: row.whiteboard,
                filing_cabinet: row.filing_cabinet,
                height_adjustable_desks: row.height_adjustable_desks,
                office_chairs: row.office_chairs,
                corner_unit: row.corner_unit,
                minifridge: row.minifridge,
                photo_count: row.photo_count,
                contracts_count: row.contracts_count,
            })
            .collect())
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Suite>> {
        let row = sqlx::query_as::<_, SuiteRow>(&format!(
            "SELECT {SUITE_COLUMNS} FROM suites WHERE id = ?"
        ))
        .bind(id.to_string())
        .fetch_optional(self.pool)
        .await
        .context("Failed to get suite")?;

        Ok(row.map(row_to_suite))
    }

    pub async fn create(&self, req: &SuiteRequest) -> Result<Suite> {
        let id = Uuid::new_v4();
        let now = db_now();

        sqlx::query(
            r#"
            INSERT INTO suites (id, suite_number, whiteboard, filing_cabinet,
                height_adjustable_desks, office_chairs, corner_unit, minifridge,
                created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&req.suite_number)
        .bind(req.whiteboard)
        .bind(req.filing_cabinet)
        .bind(req.height_adjustable_desks)
        .bind(req.office_chairs)
        .bind(req.corner_unit)
        .bind(req.minifridge)
        .bind(&now)
        .bind(&now)
        .execute(self.pool)
        .await
        .context("Failed to create suite")?;

        self.get_by_id(id)
            .await?
            .context("Failed to retrieve created suite")
    }

    /// Replace the amenity fields; the floor plan is kept
    pub async fn update(&self, id: Uuid, req: &SuiteRequest) -> Result<Option<Suite>> {
        let result = sqlx::query(
            r#"
            UPDATE suites
            SET suite_number = ?, whiteboard = ?, filing_cabinet = ?,
                height_adjustable_desks = ?, office_chairs = ?, corner_unit = ?,
                minifridge = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&req.suite_number)
        .bind(req.whiteboard)
        .bind(req.filing_cabinet)
        .bind(req.height_adjustable_desks)
        .bind(req.office_chairs)
        .bind(req.corner_unit)
        .bind(req.minifridge)
        .bind(db_now())
        .bind(id.to_string())
        .execute(self.pool)
        .await
        .context("Failed to update suite")?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_by_id(id).await
    }

    /// Point the suite at a stored floor plan, returning the previous path
    pub async fn set_floor_plan(&self, id: Uuid, path: &str) -> Result<Option<Option<String>>> {
        let Some(existing) = self.get_by_id(id).await? else {
            return Ok(None);
        };

        sqlx::query("UPDATE suites SET floor_plan = ?, updated_at = ? WHERE id = ?")
            .bind(path)
            .bind(db_now())
            .bind(id.to_string())
            .execute(self.pool)
            .await
            .context("Failed to set suite floor plan")?;

        Ok(Some(existing.floor_plan))
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM suites WHERE id = ?")
            .bind(id.to_string())
            .execute(self.pool)
            .await
            .context("Failed to delete suite")?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_suite(row: SuiteRow) -> Suite {
    Suite {
        id: parse_id(&row.id),
        suite_number: row.suite_number,
        floor_plan: row.floor_plan,
        whiteboard: row.whiteboard,
        filing_cabinet: row.filing_cabinet,
        height_adjustable_desks: row.height_adjustable_desks,
        office_chairs: row.office_chairs,
        corner_unit: row.corner_unit,
        minifridge: row.minifridge,
        created_at: parse_db_timestamp(&row.created_at),
        updated_at: parse_db_timestamp(&row.updated_at),
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OperatingModelRow {
    id: String,
    name: String,
    is_shared: bool,
    price_cents: i64,
    period_days: i64,
    created_at: String,
    updated_at: String,
}

pub struct OperatingModelRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OperatingModelRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<SuiteOperatingModel>> {
        let rows = sqlx::query_as::<_, OperatingModelRow>(
            r#"
            SELECT id, name, is_shared, price_cents, period_days, created_at, updated_at
            FROM suite_operating_models
            ORDER BY name
            "#,
        )
        .fetch_all(self.pool)
        .await
        .context("Failed to list operating models")?;

        Ok(rows.into_iter().map(row_to_model).collect())
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<SuiteOperatingModel>> {
        let row = sqlx::query_as::<_, OperatingModelRow>(
            r#"
            SELECT id, name, is_shared, price_cents, period_days, created_at, updated_at
            FROM suite_operating_models
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(self.pool)
        .await
        .context("Failed to get operating model")?;

        Ok(row.map(row_to_model))
    }

    pub async fn create(&self, req: &OperatingModelRequest) -> Result<SuiteOperatingModel> {
        let id = Uuid::new_v4();
        let now = db_now();

        sqlx::query(
            r#"
            INSERT INTO suite_operating_models (id, name, is_shared, price_cents, period_days,
                created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&req.name)
        .bind(req.is_shared)
        .bind(req.price_cents)
        .bind(req.period_days)
        .bind(&now)
        .bind(&now)
        .execute(self.pool)
        .await
        .context("Failed to create operating model")?;

        self.get_by_id(id)
            .await?
            .context("Failed to retrieve created operating model")
    }

    pub async fn update(
        &self,
        id: Uuid,
        req: &OperatingModelRequest,
    ) -> Result<Option<SuiteOperatingModel>> {
        let result = sqlx::query(
            r#"
            UPDATE suite_operating_models
            SET name = ?, is_shared = ?, price_cents = ?, period_days = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&req.name)
        .bind(req.is_shared)
        .bind(req.price_cents)
        .bind(req.period_days)
        .bind(db_now())
        .bind(id.to_string())
        .execute(self.pool)
        .await
        .context("Failed to update operating model")?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_by_id(id).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM suite_operating_models WHERE id = ?")
            .bind(id.to_string())
            .execute(self.pool)
            .await
            .context("Failed to delete operating model")?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_model(row: OperatingModelRow) -> SuiteOperatingModel {
    SuiteOperatingModel {
        id: parse_id(&row.id),
        name: row.name,
        is_shared: row.is_shared,
        price_cents: row.price_cents,
        period_days: row.period_days,
        created_at: parse_db_timestamp(&row.created_at),
        updated_at: parse_db_timestamp(&row.updated_at),
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ContractRow {
    id: String,
    suite_id: String,
    individual_id: Option<String>,
    organization_id: Option<String>,
    model_id: String,
    begin_date: String,
    end_date: Option<String>,
    on_going: bool,
    created_at: String,
    updated_at: String,
}

#[derive(Debug, sqlx::FromRow)]
struct ContractSummaryRow {
    #[sqlx(flatten)]
    contract: ContractRow,
    suite_number: String,
    holder_name: Option<String>,
    model_name: String,
}

const CONTRACT_COLUMNS: &str = "id, suite_id, individual_id, organization_id, model_id, \
    begin_date, end_date, on_going, created_at, updated_at";

pub struct ContractRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ContractRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<SuiteContract>> {
        let row = sqlx::query_as::<_, ContractRow>(&format!(
            "SELECT {CONTRACT_COLUMNS} FROM suite_contracts WHERE id = ?"
        ))
        .bind(id.to_string())
        .fetch_optional(self.pool)
        .await
        .context("Failed to get contract")?;

        row.map(row_to_contract).transpose()
    }

    /// Contracts with suite, holder and model names, newest first
    pub async fn list_summaries(&self, today: NaiveDate) -> Result<Vec<ContractSummary>> {
        let rows = sqlx::query_as::<_, ContractSummaryRow>(
            r#"
            SELECT c.id, c.suite_id, c.individual_id, c.organization_id, c.model_id,
                   c.begin_date, c.end_date, c.on_going, c.created_at, c.updated_at,
                   s.suite_number,
                   COALESCE(i.name_first || ' ' || i.name_last, o.name) AS holder_name,
                   m.name AS model_name
            FROM suite_contracts c
            JOIN suites s ON s.id = c.suite_id
            JOIN suite_operating_models m ON m.id = c.model_id
            LEFT JOIN individuals i ON i.id = c.individual_id
            LEFT JOIN organizations o ON o.id = c.organization_id
            ORDER BY c.created_at DESC
            "#,
        )
        .fetch_all(self.pool)
        .await
        .context("Failed to list contracts")?;

        rows.into_iter()
            .map(|row| {
                let contract = row_to_contract(row.contract)?;
                Ok(ContractSummary {
                    id: contract.id,
                    suite_id: contract.suite_id,
                    suite_number: row.suite_number,
                    holder: contract.holder,
                    holder_name: row.holder_name.unwrap_or_default(),
                    model_name: row.model_name,
                    begin_date: contract.begin_date,
                    end_date: contract.end_date,
                    on_going: contract.on_going,
                    is_active: contract.is_active_on(today),
                })
            })
            .collect()
    }

    pub async fn create(&self, contract: &ValidContract) -> Result<SuiteContract> {
        let id = Uuid::new_v4();
        let now = db_now();
        let (individual_id, organization_id) = contract.holder.columns();

        sqlx::query(
            r#"
            INSERT INTO suite_contracts (id, suite_id, individual_id, organization_id, model_id,
                begin_date, end_date, on_going, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(contract.suite_id.to_string())
        .bind(individual_id.map(|i| i.to_string()))
        .bind(organization_id.map(|o| o.to_string()))
        .bind(contract.model_id.to_string())
        .bind(format_db_date(contract.begin_date))
        .bind(contract.end_date.map(format_db_date))
        .bind(contract.on_going)
        .bind(&now)
        .bind(&now)
        .execute(self.pool)
        .await
        .context("Failed to create contract")?;

        self.get_by_id(id)
            .await?
            .context("Failed to retrieve created contract")
    }

    pub async fn update(&self, id: Uuid, contract: &ValidContract) -> Result<Option<SuiteContract>> {
        let (individual_id, organization_id) = contract.holder.columns();

        let result = sqlx::query(
            r#"
            UPDATE suite_contracts
            SET suite_id = ?, individual_id = ?, organization_id = ?, model_id = ?,
                begin_date = ?, end_date = ?, on_going = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(contract.suite_id.to_string())
        .bind(individual_id.map(|i| i.to_string()))
        .bind(organization_id.map(|o| o.to_string()))
        .bind(contract.model_id.to_string())
        .bind(format_db_date(contract.begin_date))
        .bind(contract.end_date.map(format_db_date))
        .bind(contract.on_going)
        .bind(db_now())
        .bind(id.to_string())
        .execute(self.pool)
        .await
        .context("Failed to update contract")?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_by_id(id).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM suite_contracts WHERE id = ?")
            .bind(id.to_string())
            .execute(self.pool)
            .await
            .context("Failed to delete contract")?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_contract(row: ContractRow) -> Result<SuiteContract> {
    let holder = ContractHolder::from_columns(
        parse_id_opt(row.individual_id.as_deref()),
        parse_id_opt(row.organization_id.as_deref()),
    )
    .with_context(|| format!("Contract {} has no single holder", row.id))?;

    let begin_date = parse_db_date(&row.begin_date)
        .with_context(|| format!("Contract {} has an invalid begin date", row.id))?;

    Ok(SuiteContract {
        id: parse_id(&row.id),
        suite_id: parse_id(&row.suite_id),
        holder,
        model_id: parse_id(&row.model_id),
        begin_date,
        end_date: row.end_date.as_deref().and_then(parse_db_date),
        on_going: row.on_going,
        created_at: parse_db_timestamp(&row.created_at),
        updated_at: parse_db_timestamp(&row.updated_at),
    })
}
