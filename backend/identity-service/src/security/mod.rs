/// Security primitives for identity-service:
/// - Password hashing and verification (Argon2id)
/// - Access token signing and validation (HS256, shared secret)
/// - Opaque refresh token generation
pub mod jwt;
pub mod password;

pub use jwt::{generate_refresh_token, AccessClaims, IssuedAccessToken, JwtKeys, TokenType};
pub use password::{hash_password, verify_password};
