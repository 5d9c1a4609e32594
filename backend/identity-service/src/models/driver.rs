use super::AccountStatus;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Driver row in the `drivers` table
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DriverAccount {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub phone_number: String,
    pub first_name: String,
    pub last_name: String,
    pub license_number: String,
    pub license_expiry_date: NaiveDate,
    pub vehicle_brand: Option<String>,
    pub vehicle_model: String,
    pub vehicle_number: String,
    pub vehicle_year: i32,
    pub status: AccountStatus,
    pub rating: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DriverRegistration {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "phone number is required"))]
    pub phone_number: String,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(length(min = 1, max = 64))]
    pub license_number: String,
    /// `YYYY-MM-DD`
    pub license_expiry_date: String,
    pub vehicle_brand: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub vehicle_model: String,
    #[validate(length(min = 1, max = 32))]
    pub vehicle_number: String,
    #[validate(range(min = 1900, max = 2100))]
    pub vehicle_year: i32,
}

/// Outward view of a driver
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverProfile {
    pub id: Uuid,
    pub email: String,
    pub phone_number: String,
    pub first_name: String,
    pub last_name: String,
    pub license_number: String,
    /// `YYYY-MM-DD`
    pub license_expiry_date: String,
    pub vehicle_brand: Option<String>,
    pub vehicle_model: String,
    pub vehicle_number: String,
    pub vehicle_year: i32,
    pub status: AccountStatus,
    pub rating: f64,
}
