/// Identity Service Library
///
/// Credential and session lifecycle for riders and drivers, plus phone
/// verification by one-time code.
///
/// ## Modules
///
/// - `config`: Service configuration
/// - `db`: Store traits with Postgres, Redis and in-memory implementations
/// - `error`: Error types
/// - `models`: Data models
/// - `roles`: Rider/driver role descriptors
/// - `security`: Password hashing, access tokens, refresh token generation
/// - `services`: Auth, token issuance, OTP, SMS delivery
/// - `state`: Service wiring
/// - `telemetry`: Tracing subscriber setup
/// - `validators`: Input validation
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod roles;
pub mod security;
pub mod services;
pub mod state;
pub mod telemetry;
pub mod validators;

// Re-export commonly used types
pub use error::{ErrorKind, IdentityError, Result};
pub use roles::{Driver, Rider, RoleTag, UniqueField};
pub use services::{AuthService, AuthSession, OtpService, TokenPair};
pub use state::IdentityCore;
