/// Access token signing and validation
///
/// Access tokens are HS256 JWTs signed with a single shared secret. The
/// secret is handed to [`JwtKeys::from_secret`] at construction; there is no
/// process-wide key storage, so independent instances never share keys.
///
/// ## Security Design
///
/// - **HS256 ONLY**: tokens whose header names any other algorithm (including
///   `none` and asymmetric algorithms) are rejected before signature checks
/// - **Typed claims**: claims decode into [`AccessClaims`] in one step; a
///   missing or mistyped field fails closed as `InvalidToken`
/// - **No leeway**: expiry is checked to the second
use crate::error::{IdentityError, Result};
use crate::roles::RoleTag;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Constants
// ============================================================================

pub const ACCESS_TOKEN_EXPIRY_MINUTES: i64 = 30;
pub const REFRESH_TOKEN_EXPIRY_DAYS: i64 = 30;

/// Raw refresh token length before hex encoding
const REFRESH_TOKEN_BYTES: usize = 32;

const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

// ============================================================================
// Data Structures
// ============================================================================

/// Only access tokens are JWTs; refresh tokens are opaque
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (identity ID)
    pub sub: Uuid,
    pub email: String,
    pub role: RoleTag,
    #[serde(rename = "type")]
    pub token_type: TokenType,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

#[derive(Debug, Clone)]
pub struct IssuedAccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub expires_in: i64,
}

// ============================================================================
// Keys
// ============================================================================

#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtKeys {
    pub fn from_secret(secret: &str) -> Result<Self> {
        if secret.is_empty() {
            return Err(IdentityError::Internal(
                "JWT signing secret must not be empty".to_string(),
            ));
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        })
    }

    /// Sign a 30-minute access token for the given identity
    pub fn issue_access_token(
        &self,
        id: Uuid,
        email: &str,
        role: RoleTag,
    ) -> Result<IssuedAccessToken> {
        let now = Utc::now();
        let expires_at = now + Duration::minutes(ACCESS_TOKEN_EXPIRY_MINUTES);

        let claims = AccessClaims {
            sub: id,
            email: email.to_string(),
            role,
            token_type: TokenType::Access,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = self.sign(&claims)?;

        Ok(IssuedAccessToken {
            token,
            expires_at,
            expires_in: ACCESS_TOKEN_EXPIRY_MINUTES * 60,
        })
    }

    fn sign(&self, claims: &AccessClaims) -> Result<String> {
        encode(&Header::new(JWT_ALGORITHM), claims, &self.encoding)
            .map_err(|e| IdentityError::Internal(format!("Failed to sign access token: {e}")))
    }

    /// Verify signature, algorithm, expiry and claim shape.
    ///
    /// With `expected_role` set, a token minted for another role is rejected.
    pub fn validate_access_token(
        &self,
        token: &str,
        expected_role: Option<RoleTag>,
    ) -> Result<AccessClaims> {
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<AccessClaims>(token, &self.decoding, &validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "Access token rejected");
                IdentityError::InvalidToken
            })?
            .claims;

        if claims.token_type != TokenType::Access {
            return Err(IdentityError::InvalidToken);
        }

        if let Some(role) = expected_role {
            if claims.role != role {
                tracing::debug!(
                    expected = %role,
                    actual = %claims.role,
                    "Access token role mismatch"
                );
                return Err(IdentityError::InvalidToken);
            }
        }

        Ok(claims)
    }
}

/// 32 bytes from the OS CSPRNG, hex-encoded (64 characters)
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

// ============================================================================
// Tests
// ============================================================================
