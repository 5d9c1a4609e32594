/// Credential and session lifecycle, shared by riders and drivers
///
/// `AuthService<R>` is the only place that combines the credential store,
/// the password verifier and the token issuer. Per-role behavior comes from
/// the [`Role`] descriptor.
///
/// Unknown email and wrong password are reported as `UserNotFound` and
/// `InvalidCredentials` respectively; collapsing them is the transport's call.
use crate::db::{IdentityStore, SessionRegistry};
use crate::error::{IdentityError, Result};
use crate::roles::{IdentityRecord, Role};
use crate::security::{hash_password, verify_password};
use crate::services::tokens::{TokenIssuer, TokenPair};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Token pair plus the outward profile of its owner
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession<P> {
    #[serde(flatten)]
    pub tokens: TokenPair,
    #[serde(rename = "user")]
    pub profile: P,
}

pub struct AuthService<R: Role> {
    identities: Arc<dyn IdentityStore<R>>,
    issuer: TokenIssuer,
}

impl<R: Role> Clone for AuthService<R> {
    fn clone(&self) -> Self {
        Self {
            identities: Arc::clone(&self.identities),
            issuer: self.issuer.clone(),
        }
    }
}

impl<R: Role> AuthService<R> {
    pub fn new(identities: Arc<dyn IdentityStore<R>>, issuer: TokenIssuer) -> Self {
        Self { identities, issuer }
    }

    fn sessions(&self) -> &Arc<dyn SessionRegistry> {
        self.issuer.sessions()
    }

    async fn open_session(&self, identity: &R::Identity) -> Result<AuthSession<R::Profile>> {
        let tokens = self
            .issuer
            .issue_pair(identity.id(), identity.email(), R::TAG)
            .await?;
        Ok(AuthSession {
            tokens,
            profile: R::project(identity),
        })
    }

    /// Validate, check uniqueness, hash, insert, then issue a token pair.
    ///
    /// The pre-check reports the first taken field in the role's fixed order;
    /// a constraint violation at insert time is reported the same way.
    pub async fn register(&self, registration: R::Registration) -> Result<AuthSession<R::Profile>> {
        R::validate(&registration)?;

        for (field, value) in R::unique_fields(&registration) {
            if self.identities.is_taken(field, &value).await? {
                warn!(role = %R::TAG, field = %field, "Registration rejected: already registered");
                return Err(IdentityError::Conflict(field));
            }
        }

        let password_hash = hash_password(R::password(&registration))?;
        let identity = R::build(registration, Uuid::new_v4(), password_hash, Utc::now())?;

        self.identities.insert(&identity).await?;
        info!(role = %R::TAG, user_id = %identity.id(), "Identity registered");

        self.open_session(&identity).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession<R::Profile>> {
        let identity = self
            .identities
            .find_by_email(email)
            .await?
            .ok_or_else(|| {
                warn!(role = %R::TAG, "Login for unknown email");
                IdentityError::UserNotFound
            })?;

        if !verify_password(password, identity.password_hash())? {
            warn!(role = %R::TAG, user_id = %identity.id(), "Login with wrong password");
            return Err(IdentityError::InvalidCredentials);
        }

        info!(role = %R::TAG, user_id = %identity.id(), "Login succeeded");
        self.open_session(&identity).await
    }

    /// Exchange a refresh token for a new pair. The old token is revoked
    /// atomically before the new pair is issued.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthSession<R::Profile>> {
        let owner_id = self
            .sessions()
            .consume_for_refresh(refresh_token, R::TAG)
            .await?
            .ok_or_else(|| {
                warn!(role = %R::TAG, "Refresh rejected");
                IdentityError::RefreshInvalid
            })?;

        let identity = self
            .identities
            .find_by_id(owner_id)
            .await?
            .ok_or(IdentityError::UserNotFound)?;

        info!(role = %R::TAG, user_id = %owner_id, "Refresh token rotated");
        self.open_session(&identity).await
    }

    /// Resolve an access token to the identity it names, as currently stored
    pub async fn validate_token(&self, access_token: &str) -> Result<R::Identity> {
        let claims = self
            .issuer
            .keys()
            .validate_access_token(access_token, Some(R::TAG))?;

        self.identities
            .find_by_id(claims.sub)
            .await?
            .ok_or(IdentityError::UserNotFound)
    }

    pub async fn profile(&self, access_token: &str) -> Result<R::Profile> {
        let identity = self.validate_token(access_token).await?;
        Ok(R::project(&identity))
    }

    /// Revoke one refresh token. Unknown and already-revoked tokens are fine.
    pub async fn logout(&self, refresh_token: &str) -> Result<()> {
        self.sessions().revoke_one(refresh_token, R::TAG).await?;
        info!(role = %R::TAG, "Logged out");
        Ok(())
    }

    /// Revoke every refresh token issued to `owner_id`
    pub async fn logout_all(&self, owner_id: Uuid) -> Result<u64> {
        let revoked = self.sessions().revoke_all_for_owner(owner_id, R::TAG).await?;
        info!(role = %R::TAG, user_id = %owner_id, revoked, "Logged out everywhere");
        Ok(revoked)
    }

    pub async fn list_identities(&self) -> Result<Vec<R::Profile>> {
        let identities = self.identities.list().await?;
        Ok(identities.iter().map(R::project).collect())
    }
}
