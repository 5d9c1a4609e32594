/// Storage seams for identity-service
///
/// - `IdentityStore<R>`: rider/driver records (Postgres in production)
/// - `SessionRegistry`: refresh-token rows with revocation state
/// - `OtpStore`: TTL-bound one-time codes (Redis in production)
///
/// `memory` holds in-process implementations of all three.
use crate::error::{IdentityError, Result};
use crate::models::NewRefreshToken;
use crate::roles::{Role, RoleTag, UniqueField};
use async_trait::async_trait;
use sqlx::migrate::Migrator;
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

pub mod drivers;
pub mod memory;
pub mod otp_codes;
pub mod refresh_tokens;
pub mod riders;

pub use drivers::PgDriverStore;
pub use memory::{MemoryIdentityStore, MemoryOtpStore, MemorySessionRegistry};
pub use otp_codes::RedisOtpStore;
pub use refresh_tokens::PgSessionRegistry;
pub use riders::PgRiderStore;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Apply pending schema migrations
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    MIGRATOR.run(pool).await?;
    Ok(())
}

#[async_trait]
pub trait IdentityStore<R: Role>: Send + Sync {
    /// Fast-path uniqueness pre-check; the insert constraint is authoritative
    async fn is_taken(&self, field: UniqueField, value: &str) -> Result<bool>;

    /// Insert a new identity. Constraint violations surface as `Conflict(field)`.
    async fn insert(&self, identity: &R::Identity) -> Result<()>;

    async fn find_by_email(&self, email: &str) -> Result<Option<R::Identity>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<R::Identity>>;

    /// All identities, newest first
    async fn list(&self) -> Result<Vec<R::Identity>>;
}

#[async_trait]
pub trait SessionRegistry: Send + Sync {
    /// Insert an unrevoked row. A duplicate token string is `IssuanceConflict`.
    async fn persist(&self, token: NewRefreshToken) -> Result<()>;

    /// Atomically revoke a live (unrevoked, unexpired) token of `role` and
    /// return its owner. `None` covers unknown, revoked and expired alike.
    async fn consume_for_refresh(&self, token: &str, role: RoleTag) -> Result<Option<Uuid>>;

    /// Idempotent: unknown or already-revoked tokens are not an error
    async fn revoke_one(&self, token: &str, role: RoleTag) -> Result<()>;

    /// Revoke every token of the owner; returns rows newly revoked
    async fn revoke_all_for_owner(&self, owner_id: Uuid, role: RoleTag) -> Result<u64>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OtpStore: Send + Sync {
    /// Store `code` for `phone`, replacing any previous code
    async fn put(&self, phone: &str, code: &str, ttl: Duration) -> Result<()>;

    async fn get(&self, phone: &str) -> Result<Option<String>>;

    /// Remove the code; `true` only if this call removed a live entry
    async fn delete(&self, phone: &str) -> Result<bool>;
}

/// Unique constraint names from the migrations
fn field_for_constraint(constraint: &str) -> Option<UniqueField> {
    match constraint {
        "riders_email_key" | "drivers_email_key" => Some(UniqueField::Email),
        "drivers_license_number_key" => Some(UniqueField::LicenseNumber),
        "drivers_vehicle_number_key" => Some(UniqueField::VehicleNumber),
        _ => None,
    }
}

fn unique_violation(err: &sqlx::Error) -> Option<Option<&str>> {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            Some(db_err.constraint())
        }
        _ => None,
    }
}

/// Map an identity insert failure, turning constraint violations into `Conflict`
pub(crate) fn map_identity_insert_error(err: sqlx::Error) -> IdentityError {
    if let Some(constraint) = unique_violation(&err) {
        if let Some(field) = constraint.and_then(field_for_constraint) {
            tracing::warn!(field = %field, "Unique constraint rejected identity insert");
            return IdentityError::Conflict(field);
        }
    }
    err.into()
}

pub(crate) fn map_token_insert_error(err: sqlx::Error) -> IdentityError {
    if unique_violation(&err).is_some() {
        tracing::warn!("Refresh token collided with an existing row");
        return IdentityError::IssuanceConflict;
    }
    err.into()
}
