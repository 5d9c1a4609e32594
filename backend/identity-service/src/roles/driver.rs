use super::{IdentityRecord, Role, RoleTag, UniqueField};
use crate::error::Result;
use crate::models::{AccountStatus, DriverAccount, DriverProfile, DriverRegistration};
use crate::validators::{format_date, parse_date};
use chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

const LICENSE_EXPIRY_FIELD: &str = "license_expiry_date";

/// Driver role: unique by email, license number and vehicle number;
/// starts `pending` with a zero rating until approved
pub struct Driver;

impl IdentityRecord for DriverAccount {
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
            UniqueField::LicenseNumber => Some(&self.license_number),
            UniqueField::VehicleNumber => Some(&self.vehicle_number),
        }
    }
}

impl Role for Driver {
    const TAG: RoleTag = RoleTag::Driver;

    type Identity = DriverAccount;
    type Registration = DriverRegistration;
    type Profile = DriverProfile;

    fn validate(registration: &DriverRegistration) -> Result<()> {
        registration.validate()?;
        parse_date(LICENSE_EXPIRY_FIELD, &registration.license_expiry_date)?;
        Ok(())
    }

    fn password(registration: &DriverRegistration) -> &str {
        &registration.password
    }

    fn unique_fields(registration: &DriverRegistration) -> Vec<(UniqueField, String)> {
        vec![
            (UniqueField::Email, registration.email.clone()),
            (UniqueField::LicenseNumber, registration.license_number.clone()),
            (UniqueField::VehicleNumber, registration.vehicle_number.clone()),
        ]
    }

    fn build(
        registration: DriverRegistration,
        id: Uuid,
        password_hash: String,
        now: DateTime<Utc>,
    ) -> Result<DriverAccount> {
        let license_expiry_date =
            parse_date(LICENSE_EXPIRY_FIELD, &registration.license_expiry_date)?;

        Ok(DriverAccount {
            id,
            email: registration.email,
            password_hash,
            phone_number: registration.phone_number,
            first_name: registration.first_name,
            last_name: registration.last_name,
            license_number: registration.license_number,
            license_expiry_date,
            vehicle_brand: registration.vehicle_brand,
            vehicle_model: registration.vehicle_model,
            vehicle_number: registration.vehicle_number,
            vehicle_year: registration.vehicle_year,
            status: AccountStatus::Pending,
            rating: 0.0,
            created_at: now,
            updated_at: now,
        })
    }

    fn project(identity: &DriverAccount) -> DriverProfile {
        DriverProfile {
            id: identity.id,
            email: identity.email.clone(),
            phone_number: identity.phone_number.clone(),
            first_name: identity.first_name.clone(),
            last_name: identity.last_name.clone(),
            license_number: identity.license_number.clone(),
            license_expiry_date: format_date(identity.license_expiry_date),
            vehicle_brand: identity.vehicle_brand.clone(),
            vehicle_model: identity.vehicle_model.clone(),
            vehicle_number: identity.vehicle_number.clone(),
            vehicle_year: identity.vehicle_year,
            status: identity.status,
            rating: identity.rating,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IdentityError;

    fn registration() -> DriverRegistration {
        DriverRegistration {
            email: "driver@example.com".to_string(),
            password: "password123".to_string(),
            phone_number: "+15557654321".to_string(),
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            license_number: "DL-0042".to_string(),
            license_expiry_date: "2031-01-31".to_string(),
            vehicle_brand: Some("Toyota".to_string()),
            vehicle_model: "Prius".to_string(),
            vehicle_number: "A123BC".to_string(),
            vehicle_year: 2019,
        }
    }

    #[test]
    fn test_driver_unique_fields_fixed_order() {
        let fields: Vec<UniqueField> = Driver::unique_fields(&registration())
            .into_iter()
            .map(|(field, _)| field)
            .collect();
        assert_eq!(
            fields,
            vec![
                UniqueField::Email,
                UniqueField::LicenseNumber,
                UniqueField::VehicleNumber
            ]
        );
    }

    #[test]
    fn test_driver_malformed_expiry_is_invalid_field() {
        let mut reg = registration();
        reg.license_expiry_date = "31.01.2031".to_string();
        assert!(matches!(
            Driver::validate(&reg),
            Err(IdentityError::InvalidField(_))
        ));
        assert!(matches!(
            Driver::build(reg, Uuid::new_v4(), "hash".to_string(), Utc::now()),
            Err(IdentityError::InvalidField(_))
        ));
    }

    #[test]
    fn test_driver_starts_pending_with_zero_rating() {
        let driver = Driver::build(registration(), Uuid::new_v4(), "hash".to_string(), Utc::now())
            .expect("build driver");
        assert_eq!(driver.status, AccountStatus::Pending);
        assert_eq!(driver.rating, 0.0);
    }

    #[test]
    fn test_driver_projection_renders_date() {
        let driver = Driver::build(registration(), Uuid::new_v4(), "hash".to_string(), Utc::now())
            .expect("build driver");
        let profile = Driver::project(&driver);
        assert_eq!(profile.license_expiry_date, "2031-01-31");
        assert_eq!(profile.vehicle_number, "A123BC");
    }
}
