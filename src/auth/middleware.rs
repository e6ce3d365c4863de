use actix_web::dev::Payload;
use actix_web::error::ErrorUnauthorized;
use actix_web::{Error, FromRequest, HttpRequest};
use std::future::{ready, Ready};

use super::jwt::validate_token;
use super::model::Session;

/// Extract token from Authorization header
fn extract_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer ").map(str::to_string))
}

/// Validate token from HttpRequest and return the caller's session
pub fn validate_request_token(req: &HttpRequest) -> Result<Session, Error> {
    let token =
        extract_token(req).ok_or_else(|| ErrorUnauthorized("Missing authorization token"))?;

    let claims = validate_token(&token).map_err(|e| {
        log::warn!("Token validation failed: {:?}", e);
        ErrorUnauthorized("Invalid or expired token")
    })?;

    if claims.token_type != "access" {
        return Err(ErrorUnauthorized("Invalid token type"));
    }

    Ok(Session::from(claims))
}

impl FromRequest for Session {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(validate_request_token(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{generate_access_token, get_jwt_secret};
    use crate::auth::model::{Claims, Role};
    use actix_web::test::TestRequest;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn session() -> Session {
        Session {
            user_id: "user-1".to_string(),
            name: "Siti".to_string(),
            email: "siti@example.com".to_string(),
            role: Role::Warga,
        }
    }

    #[test]
    fn test_access_token_is_accepted() {
        let token = generate_access_token(&session()).unwrap();
        let req = TestRequest::default()
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_http_request();
        assert_eq!(validate_request_token(&req).unwrap(), session());
    }

    #[test]
    fn test_non_access_token_is_rejected() {
        let now = chrono::Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: "user-1".to_string(),
            name: "Siti".to_string(),
            email: "siti@example.com".to_string(),
            role: Role::Warga,
            exp: now + 600,
            iat: now,
            token_type: "refresh".to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(get_jwt_secret().as_bytes()),
        )
        .unwrap();
        let req = TestRequest::default()
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_http_request();
        assert!(validate_request_token(&req).is_err());
    }

    #[test]
    fn test_missing_header_is_rejected() {
        let req = TestRequest::default().to_http_request();
        assert!(validate_request_token(&req).is_err());
    }
}
