/// Driver database operations
use super::{map_identity_insert_error, IdentityStore};
use crate::error::Result;
use crate::models::DriverAccount;
use crate::roles::{Driver, UniqueField};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct PgDriverStore {
    pool: PgPool,
}

impl PgDriverStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore<Driver> for PgDriverStore {
    async fn is_taken(&self, field: UniqueField, value: &str) -> Result<bool> {
        let query = match field {
            UniqueField::Email => "SELECT EXISTS(SELECT 1 FROM drivers WHERE email = $1)",
            UniqueField::LicenseNumber => {
                "SELECT EXISTS(SELECT 1 FROM drivers WHERE license_number = $1)"
            }
            UniqueField::VehicleNumber => {
                "SELECT EXISTS(SELECT 1 FROM drivers WHERE vehicle_number = $1)"
            }
        };

        let exists = sqlx::query_scalar::<_, bool>(query)
            .bind(value)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn insert(&self, driver: &DriverAccount) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO drivers (
                id, email, password_hash, phone_number, first_name, last_name,
                license_number, license_expiry_date, vehicle_brand, vehicle_model,
                vehicle_number, vehicle_year, status, rating, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(driver.id)
        .bind(&driver.email)
        .bind(&driver.password_hash)
        .bind(&driver.phone_number)
        .bind(&driver.first_name)
        .bind(&driver.last_name)
        .bind(&driver.license_number)
        .bind(driver.license_expiry_date)
        .bind(&driver.vehicle_brand)
        .bind(&driver.vehicle_model)
        .bind(&driver.vehicle_number)
        .bind(driver.vehicle_year)
        .bind(driver.status)
        .bind(driver.rating)
        .bind(driver.created_at)
        .bind(driver.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_identity_insert_error)?;

        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<DriverAccount>> {
        let driver = sqlx::query_as::<_, DriverAccount>("SELECT * FROM drivers WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(driver)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<DriverAccount>> {
        let driver = sqlx::query_as::<_, DriverAccount>("SELECT * FROM drivers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(driver)
    }

    async fn list(&self) -> Result<Vec<DriverAccount>> {
        let drivers =
            sqlx::query_as::<_, DriverAccount>("SELECT * FROM drivers ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;

        Ok(drivers)
    }
}
