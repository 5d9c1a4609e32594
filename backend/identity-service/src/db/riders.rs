/// Rider database operations
use super::{map_identity_insert_error, IdentityStore};
use crate::error::Result;
use crate::models::RiderAccount;
use crate::roles::{Rider, UniqueField};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct PgRiderStore {
    pool: PgPool,
}

impl PgRiderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore<Rider> for PgRiderStore {
    async fn is_taken(&self, field: UniqueField, value: &str) -> Result<bool> {
        match field {
            UniqueField::Email => {
                let exists = sqlx::query_scalar::<_, bool>(
                    "SELECT EXISTS(SELECT 1 FROM riders WHERE email = $1)",
                )
                .bind(value)
                .fetch_one(&self.pool)
                .await?;
                Ok(exists)
            }
            // Riders carry no license or vehicle
            UniqueField::LicenseNumber | UniqueField::VehicleNumber => Ok(false),
        }
    }

    async fn insert(&self, rider: &RiderAccount) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO riders (
                id, email, password_hash, phone_number, first_name, last_name,
                status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(rider.id)
        .bind(&rider.email)
        .bind(&rider.password_hash)
        .bind(&rider.phone_number)
        .bind(&rider.first_name)
        .bind(&rider.last_name)
        .bind(rider.status)
        .bind(rider.created_at)
        .bind(rider.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_identity_insert_error)?;

        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<RiderAccount>> {
        let rider = sqlx::query_as::<_, RiderAccount>("SELECT * FROM riders WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(rider)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<RiderAccount>> {
        let rider = sqlx::query_as::<_, RiderAccount>("SELECT * FROM riders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(rider)
    }

    async fn list(&self) -> Result<Vec<RiderAccount>> {
        let riders =
            sqlx::query_as::<_, RiderAccount>("SELECT * FROM riders ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;

        Ok(riders)
    }
}
