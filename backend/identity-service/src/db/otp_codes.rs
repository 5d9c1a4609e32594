/// Redis-backed OTP storage
use super::OtpStore;
use crate::error::{IdentityError, Result};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::error;

/// Shared Redis connection manager guarded by a Tokio mutex.
pub type SharedConnectionManager = Arc<Mutex<ConnectionManager>>;

/// Redis key prefix, one key per phone number
const REDIS_OTP_PREFIX: &str = "otp:";

#[derive(Clone)]
pub struct RedisOtpStore {
    redis: SharedConnectionManager,
    response_timeout: Duration,
}

impl RedisOtpStore {
    pub fn new(redis: SharedConnectionManager, response_timeout: Duration) -> Self {
        Self {
            redis,
            response_timeout,
        }
    }

    fn key(phone: &str) -> String {
        format!("{}{}", REDIS_OTP_PREFIX, phone)
    }

    async fn with_timeout<T, F>(&self, op: &str, fut: F) -> Result<T>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        match tokio::time::timeout(self.response_timeout, fut).await {
            Ok(result) => result.map_err(|e| {
                error!(error = %e, op, "Redis OTP command failed");
                IdentityError::StoreUnavailable(e.to_string())
            }),
            Err(_) => {
                error!(op, "Redis OTP command timed out");
                Err(IdentityError::StoreUnavailable(format!(
                    "redis {op} timed out"
                )))
            }
        }
    }
}

#[async_trait]
impl OtpStore for RedisOtpStore {
    async fn put(&self, phone: &str, code: &str, ttl: Duration) -> Result<()> {
        let key = Self::key(phone);
        let mut conn = self.redis.lock().await.clone();

        // SET ... EX overwrites any previous code together with its TTL
        self.with_timeout(
            "SET",
            redis::cmd("SET")
                .arg(&key)
                .arg(code)
                .arg("EX")
                .arg(ttl.as_secs())
                .query_async::<_, ()>(&mut conn),
        )
        .await
    }

    async fn get(&self, phone: &str) -> Result<Option<String>> {
        let key = Self::key(phone);
        let mut conn = self.redis.lock().await.clone();

        self.with_timeout(
            "GET",
            redis::cmd("GET")
                .arg(&key)
                .query_async::<_, Option<String>>(&mut conn),
        )
        .await
    }

    async fn delete(&self, phone: &str) -> Result<bool> {
        let key = Self::key(phone);
        let mut conn = self.redis.lock().await.clone();

        // DEL reports how many keys it removed; concurrent deleters see 1 at most once
        let removed: u64 = self
            .with_timeout(
                "DEL",
                redis::cmd("DEL")
                    .arg(&key)
                    .query_async::<_, u64>(&mut conn),
            )
            .await?;

        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        assert_eq!(RedisOtpStore::key("+15551234567"), "otp:+15551234567");
    }
}
