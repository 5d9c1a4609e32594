/// Data models for riders, drivers and refresh-token rows
pub mod driver;
pub mod refresh_token;
pub mod rider;

pub use driver::{DriverAccount, DriverProfile, DriverRegistration};
pub use refresh_token::{NewRefreshToken, RefreshToken};
pub use rider::{RiderAccount, RiderProfile, RiderRegistration};

use serde::{Deserialize, Serialize};
use sqlx::Type;

/// Account status matching database account_status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "account_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Pending,
    Active,
    Suspended,
    Inactive,
}

