use super::{IdentityRecord, Role, RoleTag, UniqueField};
use crate::error::Result;
use crate::models::{AccountStatus, RiderAccount, RiderProfile, RiderRegistration};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Rider role: unique by email only, starts `active`
pub struct Rider;

impl IdentityRecord for RiderAccount {
    fn id(&self) -> Uuid {
        self.id
    }

    fn email(&self) -> &str {
        &self.email
    }

    fn password_hash(&self) -> &str {
        &self.password_hash
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn unique_value(&self, field: UniqueField) -> Option<&str> {
        match field {
            UniqueField::Email => Some(&self.email),
            UniqueField::LicenseNumber | UniqueField::VehicleNumber => None,
        }
    }
}

impl Role for Rider {
    const TAG: RoleTag = RoleTag::Rider;

    type Identity = RiderAccount;
    type Registration = RiderRegistration;
    type Profile = RiderProfile;

    fn password(registration: &RiderRegistration) -> &str {
        &registration.password
    }

    fn unique_fields(registration: &RiderRegistration) -> Vec<(UniqueField, String)> {
        vec![(UniqueField::Email, registration.email.clone())]
    }

    fn build(
        registration: RiderRegistration,
        id: Uuid,
        password_hash: String,
        now: DateTime<Utc>,
    ) -> Result<RiderAccount> {
        Ok(RiderAccount {
            id,
            email: registration.email,
            password_hash,
            phone_number: registration.phone_number,
            first_name: registration.first_name,
            last_name: registration.last_name,
            status: AccountStatus::Active,
            created_at: now,
            updated_at: now,
        })
    }

    fn project(identity: &RiderAccount) -> RiderProfile {
        RiderProfile {
            id: identity.id,
            email: identity.email.clone(),
            phone_number: identity.phone_number.clone(),
            first_name: identity.first_name.clone(),
            last_name: identity.last_name.clone(),
            status: identity.status,
        }
    }
}
