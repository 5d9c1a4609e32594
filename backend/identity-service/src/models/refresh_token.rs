use crate::roles::RoleTag;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Refresh token row. Rows are revoked, never deleted.
#[derive(Debug, Clone, FromRow)]
pub struct RefreshToken {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub role: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub revoked: bool,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshToken {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    /// Unrevoked and unexpired
    pub fn is_live(&self) -> bool {
        !self.revoked && !self.is_expired()
    }

    /// Role column parsed back into a tag; `None` for unrecognized values
    pub fn role_tag(&self) -> Option<RoleTag> {
        RoleTag::from_str(&self.role)
    }
}

/// Insert payload for a freshly issued refresh token
#[derive(Debug, Clone)]
pub struct NewRefreshToken {
    pub owner_id: Uuid,
    pub role: RoleTag,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl NewRefreshToken {
    pub fn into_row(self) -> RefreshToken {
        RefreshToken {
            id: Uuid::new_v4(),
            owner_id: self.owner_id,
            role: self.role.as_str().to_string(),
            token: self.token,
            expires_at: self.expires_at,
            created_at: self.created_at,
            revoked: false,
            revoked_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_row_role_parses_back_to_tag() {
        let now = Utc::now();
        let mut row = NewRefreshToken {
            owner_id: Uuid::new_v4(),
            role: RoleTag::Driver,
            token: "abc".to_string(),
            expires_at: now + Duration::days(1),
            created_at: now,
        }
        .into_row();
        assert_eq!(row.role_tag(), Some(RoleTag::Driver));
        assert!(row.is_live());

        row.role = "admin".to_string();
        assert_eq!(row.role_tag(), None);
    }
}
