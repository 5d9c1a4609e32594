/// Phone verification by one-time code
///
/// - 6-digit codes drawn uniformly from 100000..=999999 (OS CSPRNG)
/// - 5 minute TTL, one live code per phone (a new send overwrites)
/// - failed SMS delivery deletes the stored code before reporting the error
/// - a matching verification consumes the code; a mismatch leaves it in place
///
/// There is no attempt counter; brute-force protection would sit in front
/// of `verify_otp`.
use crate::db::OtpStore;
use crate::error::{IdentityError, Result};
use crate::services::sms::SmsChannel;
use crate::validators::{mask_phone, validate_phone_number};
use rand::{rngs::OsRng, Rng};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// OTP expiration time (5 minutes)
pub const OTP_TTL: Duration = Duration::from_secs(300);

const OTP_MIN: u32 = 100_000;
const OTP_MAX: u32 = 999_999;

#[derive(Clone)]
pub struct OtpService {
    store: Arc<dyn OtpStore>,
    sms: Arc<dyn SmsChannel>,
    from_number: String,
}

impl OtpService {
    pub fn new(store: Arc<dyn OtpStore>, sms: Arc<dyn SmsChannel>, from_number: String) -> Self {
        Self {
            store,
            sms,
            from_number,
        }
    }

    /// Generate, store and deliver a fresh code for `phone`
    pub async fn send_otp(&self, phone: &str) -> Result<()> {
        if !validate_phone_number(phone) {
            return Err(IdentityError::InvalidField(
                "phone number must be in E.164 format (e.g. +14155551234)".to_string(),
            ));
        }

        let code = generate_code();
        self.store.put(phone, &code, OTP_TTL).await?;

        let body = format!("Your verification code is: {code}");
        if let Err(send_err) = self.sms.send(phone, &self.from_number, &body).await {
            error!(
                phone = %mask_phone(phone),
                error = %send_err,
                "OTP delivery failed, discarding code"
            );
            if let Err(cleanup_err) = self.store.delete(phone).await {
                error!(
                    phone = %mask_phone(phone),
                    error = %cleanup_err,
                    "Failed to discard undelivered OTP"
                );
                return Err(cleanup_err);
            }
            return Err(match send_err {
                IdentityError::DeliveryFailed(_) => send_err,
                other => IdentityError::DeliveryFailed(other.to_string()),
            });
        }

        info!(phone = %mask_phone(phone), "OTP sent");
        Ok(())
    }

    /// `Ok(true)` consumes the code. Absent, expired and mismatched codes
    /// are all `Ok(false)`; only store failures are errors.
    pub async fn verify_otp(&self, phone: &str, code: &str) -> Result<bool> {
        if phone.is_empty() || code.is_empty() {
            return Err(IdentityError::InvalidField(
                "phone number and code are required".to_string(),
            ));
        }

        match self.store.get(phone).await? {
            Some(stored) if stored == code => {
                // Only the caller whose delete removed the entry wins
                if self.store.delete(phone).await? {
                    info!(phone = %mask_phone(phone), "OTP verified");
                    Ok(true)
                } else {
                    warn!(phone = %mask_phone(phone), "OTP already consumed");
                    Ok(false)
                }
            }
            Some(_) => {
                warn!(phone = %mask_phone(phone), "OTP mismatch");
                Ok(false)
            }
            None => {
                warn!(phone = %mask_phone(phone), "OTP expired or not found");
                Ok(false)
            }
        }
    }
}

fn generate_code() -> String {
    OsRng.gen_range(OTP_MIN..=OTP_MAX).to_string()
}
