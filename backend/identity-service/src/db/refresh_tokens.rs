/// Refresh token persistence (session registry)
use super::{map_token_insert_error, SessionRegistry};
use crate::error::Result;
use crate::models::NewRefreshToken;
use crate::roles::RoleTag;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct PgSessionRegistry {
    pool: PgPool,
}

impl PgSessionRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRegistry for PgSessionRegistry {
    async fn persist(&self, token: NewRefreshToken) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (id, owner_id, role, token, expires_at, created_at, revoked)
            VALUES ($1, $2, $3, $4, $5, $6, FALSE)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(token.owner_id)
        .bind(token.role.as_str())
        .bind(&token.token)
        .bind(token.expires_at)
        .bind(token.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_token_insert_error)?;

        Ok(())
    }

    async fn consume_for_refresh(&self, token: &str, role: RoleTag) -> Result<Option<Uuid>> {
        // Single conditional UPDATE: concurrent callers race on the row lock and
        // only the first sees `revoked = FALSE`.
        let owner_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE refresh_tokens
            SET revoked = TRUE, revoked_at = NOW()
            WHERE token = $1 AND role = $2 AND revoked = FALSE AND expires_at > NOW()
            RETURNING owner_id
            "#,
        )
        .bind(token)
        .bind(role.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(owner_id)
    }

    async fn revoke_one(&self, token: &str, role: RoleTag) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked = TRUE, revoked_at = NOW()
            WHERE token = $1 AND role = $2 AND revoked = FALSE
            "#,
        )
        .bind(token)
        .bind(role.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn revoke_all_for_owner(&self, owner_id: Uuid, role: RoleTag) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked = TRUE, revoked_at = NOW()
            WHERE owner_id = $1 AND role = $2 AND revoked = FALSE
            "#,
        )
        .bind(owner_id)
        .bind(role.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
