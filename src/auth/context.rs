use super::Claims;
use uuid::Uuid;

/// Authenticated user extracted from a verified JWT
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
}

impl AuthContext {
    pub fn from_claims(claims: &Claims) -> Result<Self, &'static str> {
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| "Invalid user ID in token")?;
        Ok(Self { user_id })
    }
}
