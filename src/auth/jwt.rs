use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use std::env;

use super::model::{Claims, Session};

const DEFAULT_JWT_SECRET: &str = "sitalaris-jwt-secret-change-in-production";
const ACCESS_TOKEN_EXPIRY_SECONDS: i64 = 15 * 60; // 15 minutes

pub(super) fn get_jwt_secret() -> String {
    env::var("JWT_SECRET").unwrap_or_else(|_| {
        log::warn!("JWT_SECRET not set, using default secret. SET THIS IN PRODUCTION!");
        DEFAULT_JWT_SECRET.to_string()
    })
}

/// Generate an access token for a session.
///
/// Production tokens come from the identity provider; this is used by local
/// tooling and tests that share the same secret.
pub fn generate_access_token(session: &Session) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: session.user_id.clone(),
        name: session.name.clone(),
        email: session.email.clone(),
        role: session.role,
        exp: now + ACCESS_TOKEN_EXPIRY_SECONDS as usize,
        iat: now,
        token_type: "access".to_string(),
    };

    let secret = get_jwt_secret();
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Validate and decode a token
pub fn validate_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let secret = get_jwt_secret();
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;

    #[test]
    fn test_token_roundtrip() {
        let session = Session {
            user_id: "user-1".to_string(),
            name: "Siti".to_string(),
            email: "siti@example.com".to_string(),
            role: Role::Warga,
        };
        let token = generate_access_token(&session).unwrap();
        let claims = validate_token(&token).unwrap();
        assert_eq!(claims.token_type, "access");
        assert_eq!(Session::from(claims), session);
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        assert!(validate_token("not-a-token").is_err());
    }
}
