//! Configuration management for Identity Service
//!
//! Loads settings from:
//! 1. Environment variables
//! 2. .env file (local development)
//!
//! # Example
//!
//! ```no_run
//! use identity_service::config::Settings;
//!
//! fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     println!("Twilio sender: {}", settings.sms.from_phone);
//!     Ok(())
//! }
//! ```

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use tracing::info;

pub const DEFAULT_TWILIO_API_BASE: &str = "https://api.twilio.com";

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub redis: RedisSettings,
    pub jwt: JwtSettings,
    pub sms: SmsSettings,
}

impl Settings {
    /// Load settings from environment variables (and `.env` in debug builds)
    pub fn load() -> Result<Self> {
        if cfg!(debug_assertions) {
            dotenvy::dotenv().ok();
            info!("Loaded .env file for development");
        }

        Ok(Settings {
            database: DatabaseSettings::from_env()?,
            redis: RedisSettings::from_env()?,
            jwt: JwtSettings::from_env()?,
            sms: SmsSettings::from_env()?,
        })
    }
}

/// Database connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: u64,
}

impl DatabaseSettings {
    fn from_env() -> Result<Self> {
        Ok(Self {
            url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .context("Invalid DATABASE_MAX_CONNECTIONS")?,
            min_connections: env::var("DATABASE_MIN_CONNECTIONS")
                .unwrap_or_else(|_| "2".to_string())
                .parse()
                .context("Invalid DATABASE_MIN_CONNECTIONS")?,
            acquire_timeout: env::var("DATABASE_ACQUIRE_TIMEOUT")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("Invalid DATABASE_ACQUIRE_TIMEOUT")?,
        })
    }
}

/// Redis (OTP store) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisSettings {
    pub url: String,
    pub response_timeout: u64,
}

impl RedisSettings {
    fn from_env() -> Result<Self> {
        Ok(Self {
            url: env::var("REDIS_URL").context("REDIS_URL must be set")?,
            response_timeout: env::var("REDIS_RESPONSE_TIMEOUT")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .context("Invalid REDIS_RESPONSE_TIMEOUT")?,
        })
    }
}

/// Access-token signing settings
#[derive(Clone, Serialize, Deserialize)]
pub struct JwtSettings {
    pub secret: String,
}

impl JwtSettings {
    fn from_env() -> Result<Self> {
        let secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        if secret.trim().is_empty() {
            bail!("JWT_SECRET must not be empty");
        }
        Ok(Self { secret })
    }
}

impl std::fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSettings")
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Twilio SMS delivery settings
#[derive(Clone, Serialize, Deserialize)]
pub struct SmsSettings {
    pub account_sid: String,
    pub auth_token: String,
    pub from_phone: String,
    pub api_base: String,
}

impl SmsSettings {
    fn from_env() -> Result<Self> {
        Ok(Self {
            account_sid: env::var("TWILIO_ACCOUNT_SID").context("TWILIO_ACCOUNT_SID must be set")?,
            auth_token: env::var("TWILIO_AUTH_TOKEN").context("TWILIO_AUTH_TOKEN must be set")?,
            from_phone: env::var("TWILIO_FROM_PHONE").context("TWILIO_FROM_PHONE must be set")?,
            api_base: env::var("TWILIO_API_BASE")
                .unwrap_or_else(|_| DEFAULT_TWILIO_API_BASE.to_string()),
        })
    }
}

impl std::fmt::Debug for SmsSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmsSettings")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"<redacted>")
            .field("from_phone", &self.from_phone)
            .field("api_base", &self.api_base)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_jwt_settings_from_env() {
        env::set_var("JWT_SECRET", "test-secret-key");

        let settings = JwtSettings::from_env().unwrap();
        assert_eq!(settings.secret, "test-secret-key");
        assert!(!format!("{:?}", settings).contains("test-secret-key"));

        env::remove_var("JWT_SECRET");
    }

    #[test]
    #[serial]
    fn test_jwt_secret_required() {
        env::remove_var("JWT_SECRET");
        assert!(JwtSettings::from_env().is_err());

        env::set_var("JWT_SECRET", "   ");
        assert!(JwtSettings::from_env().is_err());

        env::remove_var("JWT_SECRET");
    }

    #[test]
    #[serial]
    fn test_database_settings_from_env() {
        env::set_var("DATABASE_URL", "postgres://localhost/test");
        env::set_var("DATABASE_MAX_CONNECTIONS", "100");

        let settings = DatabaseSettings::from_env().unwrap();

        assert_eq!(settings.url, "postgres://localhost/test");
        assert_eq!(settings.max_connections, 100);
        assert_eq!(settings.min_connections, 2); // Default
        assert_eq!(settings.acquire_timeout, 10); // Default

        env::remove_var("DATABASE_URL");
        env::remove_var("DATABASE_MAX_CONNECTIONS");
    }

    #[test]
    #[serial]
    fn test_invalid_number_rejected() {
        env::set_var("REDIS_URL", "redis://localhost:6379");
        env::set_var("REDIS_RESPONSE_TIMEOUT", "soon");

        assert!(RedisSettings::from_env().is_err());

        env::remove_var("REDIS_URL");
        env::remove_var("REDIS_RESPONSE_TIMEOUT");
    }

    #[test]
    #[serial]
    fn test_sms_settings_default_api_base() {
        env::set_var("TWILIO_ACCOUNT_SID", "AC123");
        env::set_var("TWILIO_AUTH_TOKEN", "auth-token");
        env::set_var("TWILIO_FROM_PHONE", "+15550001111");
        env::remove_var("TWILIO_API_BASE");

        let settings = SmsSettings::from_env().unwrap();
        assert_eq!(settings.api_base, DEFAULT_TWILIO_API_BASE);
        assert_eq!(settings.from_phone, "+15550001111");
        assert!(!format!("{:?}", settings).contains("auth-token"));

        env::remove_var("TWILIO_ACCOUNT_SID");
        env::remove_var("TWILIO_AUTH_TOKEN");
        env::remove_var("TWILIO_FROM_PHONE");
    }
}
