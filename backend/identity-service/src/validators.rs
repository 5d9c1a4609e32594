//! Input validation utilities for identity service

use crate::error::{IdentityError, Result};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

// Hardcoded pattern, compile-time constant in practice
static E164_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+[0-9]{7,15}$").expect("hardcoded E.164 regex is invalid - fix source code")
});

/// Literal date format used by registration payloads and profiles
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Validate E.164 phone number format (`+` followed by 7-15 digits)
pub fn validate_phone_number(phone: &str) -> bool {
    E164_REGEX.is_match(phone)
}

/// Parse a strict `YYYY-MM-DD` date literal
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    // chrono accepts unpadded components, the wire format does not
    if value.len() != 10 {
        return Err(IdentityError::InvalidField(format!(
            "{field} must be formatted as YYYY-MM-DD"
        )));
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|e| {
        IdentityError::InvalidField(format!("{field} must be formatted as YYYY-MM-DD: {e}"))
    })
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Mask phone number for logging
pub fn mask_phone(phone: &str) -> String {
    let chars: Vec<char> = phone.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", visible)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_phone_number() {
        assert!(validate_phone_number("+15551234567"));
        assert!(validate_phone_number("+79991234567"));
        assert!(!validate_phone_number("15551234567"));
        assert!(!validate_phone_number("+1555"));
        assert!(!validate_phone_number("+1555-123-4567"));
        assert!(!validate_phone_number(""));
    }

    #[test]
    fn test_parse_date() {
        let date = parse_date("license_expiry_date", "2030-06-15").expect("valid date");
        assert_eq!(format_date(date), "2030-06-15");

        for bad in ["2030-6-15", "15-06-2030", "2030/06/15", "2030-02-30", "", "tomorrow"] {
            assert!(
                matches!(
                    parse_date("license_expiry_date", bad),
                    Err(IdentityError::InvalidField(_))
                ),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_mask_phone() {
        assert_eq!(mask_phone("+15551234567"), "****4567");
        assert_eq!(mask_phone("123"), "****");
    }
}
