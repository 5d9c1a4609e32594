/// Token pair issuance
///
/// A pair is only returned once its refresh token is registered; a failed
/// persist (including a token collision) fails the whole issuance.
use crate::db::SessionRegistry;
use crate::error::Result;
use crate::models::NewRefreshToken;
use crate::roles::RoleTag;
use crate::security::jwt::REFRESH_TOKEN_EXPIRY_DAYS;
use crate::security::{generate_refresh_token, JwtKeys};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

pub const TOKEN_TYPE_BEARER: &str = "Bearer";

#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access-token lifetime in seconds
    pub expires_in: i64,
    /// Access-token expiry
    pub expires_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub refresh_expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct TokenIssuer {
    keys: JwtKeys,
    sessions: Arc<dyn SessionRegistry>,
}

impl TokenIssuer {
    pub fn new(keys: JwtKeys, sessions: Arc<dyn SessionRegistry>) -> Self {
        Self { keys, sessions }
    }

    pub fn keys(&self) -> &JwtKeys {
        &self.keys
    }

    pub fn sessions(&self) -> &Arc<dyn SessionRegistry> {
        &self.sessions
    }

    pub async fn issue_pair(&self, id: Uuid, email: &str, role: RoleTag) -> Result<TokenPair> {
        let access = self.keys.issue_access_token(id, email, role)?;

        let now = Utc::now();
        let refresh_token = generate_refresh_token();
        let refresh_expires_at = now + Duration::days(REFRESH_TOKEN_EXPIRY_DAYS);

        self.sessions
            .persist(NewRefreshToken {
                owner_id: id,
                role,
                token: refresh_token.clone(),
                expires_at: refresh_expires_at,
                created_at: now,
            })
            .await?;

        Ok(TokenPair {
            access_token: access.token,
            refresh_token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: access.expires_in,
            expires_at: access.expires_at,
            refresh_expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemorySessionRegistry;
    use crate::error::IdentityError;
    use crate::models::RefreshToken;
    use async_trait::async_trait;

    struct CollidingRegistry;

    #[async_trait]
    impl SessionRegistry for CollidingRegistry {
        async fn persist(&self, _token: NewRefreshToken) -> Result<()> {
            Err(IdentityError::IssuanceConflict)
        }
        async fn consume_for_refresh(&self, _token: &str, _role: RoleTag) -> Result<Option<Uuid>> {
            Ok(None)
        }
        async fn revoke_one(&self, _token: &str, _role: RoleTag) -> Result<()> {
            Ok(())
        }
        async fn revoke_all_for_owner(&self, _owner_id: Uuid, _role: RoleTag) -> Result<u64> {
            Ok(0)
        }
    }

    fn keys() -> JwtKeys {
        JwtKeys::from_secret("issuer-test-secret").unwrap()
    }

    #[tokio::test]
    async fn test_issue_pair_registers_refresh_token() {
        let registry = Arc::new(MemorySessionRegistry::new());
        let issuer = TokenIssuer::new(keys(), registry.clone());
        let id = Uuid::new_v4();

        let pair = issuer
            .issue_pair(id, "driver@example.com", RoleTag::Driver)
            .await
            .unwrap();

        assert_eq!(pair.token_type, "Bearer");
        assert_eq!(pair.expires_in, 1800);
        assert_eq!(pair.refresh_token.len(), 64);

        let row: RefreshToken = registry.find(&pair.refresh_token).await.unwrap();
        assert_eq!(row.owner_id, id);
        assert_eq!(row.role, "driver");
        assert!(row.is_live());
        assert_eq!(row.expires_at, pair.refresh_expires_at);
        assert!(pair.refresh_expires_at - Utc::now() > Duration::days(29));

        let claims = issuer
            .keys()
            .validate_access_token(&pair.access_token, Some(RoleTag::Driver))
            .unwrap();
        assert_eq!(claims.sub, id);
    }

    #[tokio::test]
    async fn test_failed_persist_returns_no_pair() {
        let issuer = TokenIssuer::new(keys(), Arc::new(CollidingRegistry));
        let result = issuer
            .issue_pair(Uuid::new_v4(), "rider@example.com", RoleTag::Rider)
            .await;
        assert!(matches!(result, Err(IdentityError::IssuanceConflict)));
    }
}
