//! Individual and organization repositories

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::parse_id;
use crate::models::{Individual, IndividualRequest, Organization, OrganizationRequest};
use crate::utils::time::{db_now, format_db_date, parse_db_date, parse_db_timestamp};

#[derive(Debug, sqlx::FromRow)]
struct IndividualRow {
    id: String,
    name_first: String,
    name_last: String,
    dob: Option<String>,
    address: Option<String>,
    phone_number1: Option<String>,
    phone_number2: Option<String>,
    email: Option<String>,
    photo: Option<String>,
    rf_id: Option<String>,
    key_id: Option<String>,
    created_at: String,
    updated_at: String,
}

const INDIVIDUAL_COLUMNS: &str = "id, name_first, name_last, dob, address, phone_number1, \
    phone_number2, email, photo, rf_id, key_id, created_at, updated_at";

pub struct IndividualRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> IndividualRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Most recently created first; `limit` of `None` returns everyone
    pub async fn list(&self, limit: Option<i64>) -> Result<Vec<Individual>> {
        let rows = sqlx::query_as::<_, IndividualRow>(&format!(
            "SELECT {INDIVIDUAL_COLUMNS} FROM individuals ORDER BY created_at DESC LIMIT ?"
        ))
        .bind(limit.unwrap_or(-1))
        .fetch_all(self.pool)
        .await
        .context("Failed to list individuals")?;

        Ok(rows.into_iter().map(row_to_individual).collect())
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Individual>> {
        let row = sqlx::query_as::<_, IndividualRow>(&format!(
            "SELECT {INDIVIDUAL_COLUMNS} FROM individuals WHERE id = ?"
        ))
        .bind(id.to_string())
        .fetch_optional(self.pool)
        .await
        .context("Failed to get individual")?;

        Ok(row.map(row_to_individual))
    }

    pub async fn create(&self, req: &IndividualRequest) -> Result<Individual> {
        let id = Uuid::new_v4();
        let now = db_now();

        sqlx::query(
            r#"
            INSERT INTO individuals (id, name_first, name_last, dob, address, phone_number1,
                phone_number2, email, rf_id, key_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&req.name_first)
        .bind(&req.name_last)
        .bind(req.dob.map(format_db_date))
        .bind(&req.address)
        .bind(&req.phone_number1)
        .bind(&req.phone_number2)
        .bind(&req.email)
        .bind(&req.rf_id)
        .bind(&req.key_id)
        .bind(&now)
        .bind(&now)
        .execute(self.pool)
        .await
        .context("Failed to create individual")?;

        self.get_by_id(id)
            .await?
            .context("Failed to retrieve created individual")
    }

    /// Replace all editable fields; the stored photo is kept
    pub async fn update(&self, id: Uuid, req: &IndividualRequest) -> Result<Option<Individual>> {
        let now = db_now();

        let result = sqlx::query(
            r#"
            UPDATE individuals
            SET name_first = ?, name_last = ?, dob = ?, address = ?, phone_number1 = ?,
                phone_number2 = ?, email = ?, rf_id = ?, key_id = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&req.name_first)
        .bind(&req.name_last)
        .bind(req.dob.map(format_db_date))
        .bind(&req.address)
        .bind(&req.phone_number1)
        .bind(&req.phone_number2)
        .bind(&req.email)
        .bind(&req.rf_id)
        .bind(&req.key_id)
        .bind(&now)
        .bind(id.to_string())
        .execute(self.pool)
        .await
        .context("Failed to update individual")?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_by_id(id).await
    }

    /// Point the individual at a stored photo, returning the previous path
    pub async fn set_photo(&self, id: Uuid, path: &str) -> Result<Option<Option<String>>> {
        let Some(existing) = self.get_by_id(id).await? else {
            return Ok(None);
        };

        sqlx::query("UPDATE individuals SET photo = ?, updated_at = ? WHERE id = ?")
            .bind(path)
            .bind(db_now())
            .bind(id.to_string())
            .execute(self.pool)
            .await
            .context("Failed to set individual photo")?;

        Ok(Some(existing.photo))
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM individuals WHERE id = ?")
            .bind(id.to_string())
            .execute(self.pool)
            .await
            .context("Failed to delete individual")?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_individual(row: IndividualRow) -> Individual {
    Individual {
        id: parse_id(&row.id),
        name_first: row.name_first,
        name_last: row.name_last,
        dob: row.dob.as_deref().and_then(parse_db_date),
        address: row.address,
        phone_number1: row.phone_number1,
        phone_number2: row.phone_number2,
        email: row.email,
        photo: row.photo,
        rf_id: row.rf_id,
        key_id: row.key_id,
        created_at: parse_db_timestamp(&row.created_at),
        updated_at: parse_db_timestamp(&row.updated_at),
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrganizationRow {
    id: String,
    name: String,
    ein: String,
    info: String,
    logo: Option<String>,
    created_at: String,
    updated_at: String,
}

pub struct OrganizationRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OrganizationRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, limit: Option<i64>) -> Result<Vec<Organization>> {
        let rows = sqlx::query_as::<_, OrganizationRow>(
            r#"
            SELECT id, name, ein, info, logo, created_at, updated_at
            FROM organizations
            ORDER BY created_at DESC
            LIMIT ?
            "#,
        )
        .bind(limit.unwrap_or(-1))
        .fetch_all(self.pool)
        .await
        .context("Failed to list organizations")?;

        Ok(rows.into_iter().map(row_to_org).collect())
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Organization>> {
        let row = sqlx::query_as::<_, OrganizationRow>(
            r#"
            SELECT id, name, ein, info, logo, created_at, updated_at
            FROM organizations
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(self.pool)
        .await
        .context("Failed to get organization")?;

        Ok(row.map(row_to_org))
    }

    pub async fn create(&self, req: &OrganizationRequest) -> Result<Organization> {
        let id = Uuid::new_v4();
        let now = db_now();

        sqlx::query(
            r#"
            INSERT INTO organizations (id, name, ein, info, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&req.name)
        .bind(req.ein.trim())
        .bind(&req.info)
        .bind(&now)
        .bind(&now)
        .execute(self.pool)
        .await
        .context("Failed to create organization")?;

        self.get_by_id(id)
            .await?
            .context("Failed to retrieve created organization")
    }

    pub async fn update(
        &self,
        id: Uuid,
        req: &OrganizationRequest,
    ) -> Result<Option<Organization>> {
        let now = db_now();

        let result = sqlx::query(
            r#"
            UPDATE organizations
            SET name = ?, ein = ?, info = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&req.name)
        .bind(req.ein.trim())
        .bind(&req.info)
        .bind(&now)
        .bind(id.to_string())
        .execute(self.pool)
        .await
        .context("Failed to update organization")?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_by_id(id).await
    }

    /// Point the organization at a stored logo, returning the previous path
    pub async fn set_logo(&self, id: Uuid, path: &str) -> Result<Option<Option<String>>> {
        let Some(existing) = self.get_by_id(id).await? else {
            return Ok(None);
        };

        sqlx::query("UPDATE organizations SET logo = ?, updated_at = ? WHERE id = ?")
            .bind(path)
            .bind(db_now())
            .bind(id.to_string())
            .execute(self.pool)
            .await
            .context("Failed to set organization logo")?;

        Ok(Some(existing.logo))
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM organizations WHERE id = ?")
            .bind(id.to_string())
            .execute(self.pool)
            .await
            .context("Failed to delete organization")?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_org(row: OrganizationRow) -> Organization {
    Organization {
        id: parse_id(&row.id),
        name: row.name,
        ein: row.ein,
        info: row.info,
        logo: row.logo,
        created_at: parse_db_timestamp(&row.created_at),
        updated_at: parse_db_timestamp(&row.updated_at),
    }
}
