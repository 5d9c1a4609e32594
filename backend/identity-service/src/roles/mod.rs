/// Role descriptors
///
/// Riders and drivers share one session/token core. Everything that differs
/// between them lives behind the [`Role`] trait:
///
/// - which registration fields must be unique, and in which order they are checked
/// - how a registration payload becomes a stored identity
/// - the outward projection of an identity (never carries the password hash)
/// - the `role` claim stamped into access tokens
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::Validate;

pub mod driver;
pub mod rider;

pub use driver::Driver;
pub use rider::Rider;

/// Actor role carried in access-token claims and refresh-token rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleTag {
    Rider,
    Driver,
}

impl RoleTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleTag::Rider => "rider",
            RoleTag::Driver => "driver",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "rider" => Some(RoleTag::Rider),
            "driver" => Some(RoleTag::Driver),
            _ => None,
        }
    }
}

impl fmt::Display for RoleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registration field guarded by a uniqueness constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniqueField {
    Email,
    LicenseNumber,
    VehicleNumber,
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UniqueField::Email => "email",
            UniqueField::LicenseNumber => "license number",
            UniqueField::VehicleNumber => "vehicle number",
        })
    }
}

/// Stored identity, as seen by the role-agnostic core
pub trait IdentityRecord: Clone + Send + Sync + 'static {
    fn id(&self) -> Uuid;
    fn email(&self) -> &str;
    fn password_hash(&self) -> &str;
    fn created_at(&self) -> DateTime<Utc>;
    /// Value of a uniqueness-bearing field, `None` if the role has no such field
    fn unique_value(&self, field: UniqueField) -> Option<&str>;
}

pub trait Role: Send + Sync + 'static {
    const TAG: RoleTag;

    type Identity: IdentityRecord;
    type Registration: Validate + Send + Sync;
    type Profile: Serialize + Clone + fmt::Debug + Send + Sync;

    /// Structural validation beyond the derived `Validate` rules
    fn validate(registration: &Self::Registration) -> Result<()> {
        registration.validate()?;
        Ok(())
    }

    fn password(registration: &Self::Registration) -> &str;

    /// Uniqueness-bearing fields in the order they are checked
    fn unique_fields(registration: &Self::Registration) -> Vec<(UniqueField, String)>;

    fn build(
        registration: Self::Registration,
        id: Uuid,
        password_hash: String,
        now: DateTime<Utc>,
    ) -> Result<Self::Identity>;

    fn project(identity: &Self::Identity) -> Self::Profile;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_tag_roundtrip_str() {
        for tag in [RoleTag::Rider, RoleTag::Driver] {
            assert_eq!(RoleTag::from_str(tag.as_str()), Some(tag));
        }
        assert_eq!(RoleTag::from_str("admin"), None);
    }

    #[test]
    fn test_role_tag_serializes_lowercase() {
        let json = serde_json::to_string(&RoleTag::Driver).expect("serialize role");
        assert_eq!(json, "\"driver\"");
    }
}
