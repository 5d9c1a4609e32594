/// Service wiring
///
/// `IdentityCore` owns one `AuthService` per role plus the OTP service, all
/// sharing a single token issuer (one signing key, one session registry).
use crate::config::Settings;
use crate::db::{
    run_migrations, MemoryIdentityStore, MemoryOtpStore, MemorySessionRegistry, PgDriverStore,
    PgRiderStore, PgSessionRegistry, RedisOtpStore,
};
use crate::roles::{Driver, Rider};
use crate::security::JwtKeys;
use crate::services::{AuthService, OtpService, SmsChannel, TokenIssuer, TwilioSmsChannel};
use anyhow::{Context, Result};
use redis::aio::ConnectionManager;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::info;

#[derive(Clone)]
pub struct IdentityCore {
    pub riders: AuthService<Rider>,
    pub drivers: AuthService<Driver>,
    pub otp: OtpService,
}

impl IdentityCore {
    /// Connect to Postgres and Redis, run migrations and build the services
    pub async fn connect(settings: &Settings) -> Result<Self> {
        let keys = JwtKeys::from_secret(&settings.jwt.secret)
            .context("Failed to initialize JWT keys")?;

        let db_pool = PgPoolOptions::new()
            .max_connections(settings.database.max_connections)
            .min_connections(settings.database.min_connections)
            .acquire_timeout(Duration::from_secs(settings.database.acquire_timeout))
            .connect(&settings.database.url)
            .await
            .context("Failed to connect to PostgreSQL")?;
        info!(
            max_connections = settings.database.max_connections,
            "Database pool initialized"
        );

        run_migrations(&db_pool)
            .await
            .context("Failed to run database migrations")?;
        info!("Database migrations completed");

        let redis_client =
            redis::Client::open(settings.redis.url.as_str()).context("Invalid REDIS_URL")?;
        let redis = ConnectionManager::new(redis_client)
            .await
            .context("Failed to connect to Redis")?;
        info!("Redis connection manager initialized");

        let sms = TwilioSmsChannel::new(&settings.sms).context("Failed to build Twilio client")?;

        let issuer = TokenIssuer::new(keys, Arc::new(PgSessionRegistry::new(db_pool.clone())));
        let otp_store = RedisOtpStore::new(
            Arc::new(Mutex::new(redis)),
            Duration::from_secs(settings.redis.response_timeout),
        );

        Ok(Self {
            riders: AuthService::new(Arc::new(PgRiderStore::new(db_pool.clone())), issuer.clone()),
            drivers: AuthService::new(Arc::new(PgDriverStore::new(db_pool)), issuer),
            otp: OtpService::new(
                Arc::new(otp_store),
                Arc::new(sms),
                settings.sms.from_phone.clone(),
            ),
        })
    }

    /// Fully in-process wiring for local development
    pub fn in_memory(
        jwt_secret: &str,
        sms: Arc<dyn SmsChannel>,
        from_number: impl Into<String>,
    ) -> Result<Self> {
        let keys = JwtKeys::from_secret(jwt_secret).context("Failed to initialize JWT keys")?;
        let issuer = TokenIssuer::new(keys, Arc::new(MemorySessionRegistry::new()));

        Ok(Self {
            riders: AuthService::new(Arc::new(MemoryIdentityStore::<Rider>::new()), issuer.clone()),
            drivers: AuthService::new(Arc::new(MemoryIdentityStore::<Driver>::new()), issuer),
            otp: OtpService::new(Arc::new(MemoryOtpStore::new()), sms, from_number.into()),
        })
    }
}
