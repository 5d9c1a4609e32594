/// Service layer for identity-service
///
/// - `auth`: register / login / refresh / validate / logout, generic over role
/// - `tokens`: access + refresh token pair issuance
/// - `otp`: phone verification codes
/// - `sms`: SMS delivery channel (Twilio)
pub mod auth;
pub mod otp;
pub mod sms;
pub mod tokens;

pub use auth::{AuthService, AuthSession};
pub use otp::{OtpService, OTP_TTL};
pub use sms::{SmsChannel, TwilioSmsChannel};
pub use tokens::{TokenIssuer, TokenPair};
