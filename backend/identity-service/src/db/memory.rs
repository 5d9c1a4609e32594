/// In-process stores for local development and tests
///
/// Each store mirrors the guarantees of its production counterpart: unique
/// constraints on insert, atomic compare-and-revoke on refresh, TTL expiry
/// on OTP entries (driven by the Tokio clock, so paused-time tests work).
use super::{IdentityStore, OtpStore, SessionRegistry};
use crate::error::{IdentityError, Result};
use crate::models::{NewRefreshToken, RefreshToken};
use crate::roles::{IdentityRecord, Role, RoleTag, UniqueField};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use uuid::Uuid;

const ALL_UNIQUE_FIELDS: [UniqueField; 3] = [
    UniqueField::Email,
    UniqueField::LicenseNumber,
    UniqueField::VehicleNumber,
];

// ============================================================================
// Identities
// ============================================================================

pub struct MemoryIdentityStore<R: Role> {
    rows: Mutex<Vec<R::Identity>>,
}

impl<R: Role> MemoryIdentityStore<R> {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
        }
    }
}

impl<R: Role> Default for MemoryIdentityStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: Role> IdentityStore<R> for MemoryIdentityStore<R> {
    async fn is_taken(&self, field: UniqueField, value: &str) -> Result<bool> {
        let rows = self.rows.lock().await;
        Ok(rows.iter().any(|row| row.unique_value(field) == Some(value)))
    }

    async fn insert(&self, identity: &R::Identity) -> Result<()> {
        let mut rows = self.rows.lock().await;

        for field in ALL_UNIQUE_FIELDS {
            let Some(value) = identity.unique_value(field) else {
                continue;
            };
            if rows.iter().any(|row| row.unique_value(field) == Some(value)) {
                return Err(IdentityError::Conflict(field));
            }
        }

        rows.push(identity.clone());
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<R::Identity>> {
        let rows = self.rows.lock().await;
        Ok(rows.iter().find(|row| row.email() == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<R::Identity>> {
        let rows = self.rows.lock().await;
        Ok(rows.iter().find(|row| row.id() == id).cloned())
    }

    async fn list(&self) -> Result<Vec<R::Identity>> {
        let mut rows = self.rows.lock().await.clone();
        rows.sort_by_key(|row| std::cmp::Reverse(row.created_at()));
        Ok(rows)
    }
}

// ============================================================================
// Refresh tokens
// ============================================================================

#[derive(Default)]
pub struct MemorySessionRegistry {
    rows: Mutex<HashMap<String, RefreshToken>>,
}

impl MemorySessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Row for a token string, including revoked ones
    pub async fn find(&self, token: &str) -> Option<RefreshToken> {
        self.rows.lock().await.get(token).cloned()
    }

    /// Every row ever issued to the owner
    pub async fn rows_for_owner(&self, owner_id: Uuid) -> Vec<RefreshToken> {
        self.rows
            .lock()
            .await
            .values()
            .filter(|row| row.owner_id == owner_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl SessionRegistry for MemorySessionRegistry {
    async fn persist(&self, token: NewRefreshToken) -> Result<()> {
        let mut rows = self.rows.lock().await;
        if rows.contains_key(&token.token) {
            return Err(IdentityError::IssuanceConflict);
        }
        rows.insert(token.token.clone(), token.into_row());
        Ok(())
    }

    async fn consume_for_refresh(&self, token: &str, role: RoleTag) -> Result<Option<Uuid>> {
        let mut rows = self.rows.lock().await;
        match rows.get_mut(token) {
            Some(row) if row.role_tag() == Some(role) && row.is_live() => {
                row.revoked = true;
                row.revoked_at = Some(Utc::now());
                Ok(Some(row.owner_id))
            }
            _ => Ok(None),
        }
    }

    async fn revoke_one(&self, token: &str, role: RoleTag) -> Result<()> {
        let mut rows = self.rows.lock().await;
        if let Some(row) = rows.get_mut(token) {
            if row.role_tag() == Some(role) && !row.revoked {
                row.revoked = true;
                row.revoked_at = Some(Utc::now());
            }
        }
        Ok(())
    }

    async fn revoke_all_for_owner(&self, owner_id: Uuid, role: RoleTag) -> Result<u64> {
        let mut rows = self.rows.lock().await;
        let now = Utc::now();
        let mut revoked = 0;
        for row in rows.values_mut() {
            if row.owner_id == owner_id && row.role_tag() == Some(role) && !row.revoked {
                row.revoked = true;
                row.revoked_at = Some(now);
                revoked += 1;
            }
        }
        Ok(revoked)
    }
}

// ============================================================================
// OTP codes
// ============================================================================

#[derive(Default)]
pub struct MemoryOtpStore {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl MemoryOtpStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OtpStore for MemoryOtpStore {
    async fn put(&self, phone: &str, code: &str, ttl: Duration) -> Result<()> {
        let expires_at = Instant::now() + ttl;
        self.entries
            .lock()
            .await
            .insert(phone.to_string(), (code.to_string(), expires_at));
        Ok(())
    }

    async fn get(&self, phone: &str) -> Result<Option<String>> {
        let mut entries = self.entries.lock().await;
        match entries.get(phone) {
            Some((_, expires_at)) if *expires_at <= Instant::now() => {
                entries.remove(phone);
                Ok(None)
            }
            Some((code, _)) => Ok(Some(code.clone())),
            None => Ok(None),
        }
    }

    async fn delete(&self, phone: &str) -> Result<bool> {
        let mut entries = self.entries.lock().await;
        match entries.remove(phone) {
            Some((_, expires_at)) => Ok(expires_at > Instant::now()),
            None => Ok(false),
        }
    }
}
