//! Bearer-token identity.
//!
//! Handlers take an [`AuthenticatedUser`] argument; extraction fails with 401
//! before the handler body runs when the token is missing or invalid.

use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::web::Data;
use actix_web::{FromRequest, HttpRequest};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use log::{debug, error};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{BEARER_SCHEME, TOKEN_TTL_SECS};
use crate::error::ApiError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    pub exp: i64,
}

/// Signs and verifies HS256 tokens with the configured secret.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
        }
    }

    pub fn issue(
        &self,
        id: Uuid,
        email: &str,
        role: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            id,
            email: email.to_string(),
            role: role.to_string(),
            exp: Utc::now().timestamp() + TOKEN_TTL_SECS,
        };
        encode(&Header::default(), &claims, &self.encoding_key)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding_key, &self.validation).map(|data| data.claims)
    }
}

/// Caller identity resolved from the `Authorization` header.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub email: String,
    pub role: String,
}

impl From<Claims> for AuthenticatedUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.id,
            email: claims.email,
            role: claims.role,
        }
    }
}

/// Accepts both `Bearer <token>` and a bare token. A scheme with no token
/// after it counts as no token at all.
fn bearer_token(header: &str) -> Option<&str> {
    let header = header.trim();
    let token = match header.split_once(' ') {
        Some((_, rest)) => rest.trim(),
        None if header.eq_ignore_ascii_case(BEARER_SCHEME) => "",
        None => header,
    };
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, ApiError> {
    let tokens = req.app_data::<Data<TokenService>>().ok_or_else(|| {
        error!("TokenService missing from app data");
        ApiError::Internal("token service not configured".to_string())
    })?;

    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
        .ok_or(ApiError::Unauthenticated("No token provided"))?;

    let claims = tokens.verify(token).map_err(|err| {
        debug!("rejected token: {}", err);
        ApiError::Unauthenticated("Invalid or expired token")
    })?;

    Ok(claims.into())
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    const SECRET: &str = "test-secret";

    #[test]
    fn bearer_prefix_is_optional() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("bearer"), None);
        assert_eq!(bearer_token(""), None);
    }

    #[test]
    fn scheme_without_token_is_no_token() {
        let req = TestRequest::default()
            .app_data(Data::new(TokenService::new(SECRET)))
            .insert_header((AUTHORIZATION, "Bearer"))
            .to_http_request();

        assert!(matches!(
            authenticate(&req),
            Err(ApiError::Unauthenticated("No token provided"))
        ));
    }

    #[test]
    fn issued_token_verifies() {
        let tokens = TokenService::new(SECRET);
        let id = Uuid::new_v4();
        let token = tokens.issue(id, "ana@example.com", "MEMBER").unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.id, id);
        assert_eq!(claims.role, "MEMBER");
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = TokenService::new("other")
            .issue(Uuid::new_v4(), "ana@example.com", "MEMBER")
            .unwrap();

        assert!(TokenService::new(SECRET).verify(&token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let claims = Claims {
            id: Uuid::new_v4(),
            email: "ana@example.com".to_string(),
            role: "MEMBER".to_string(),
            exp: Utc::now().timestamp() - 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(TokenService::new(SECRET).verify(&token).is_err());
    }

    #[test]
    fn request_without_header_is_unauthenticated() {
        let req = TestRequest::default()
            .app_data(Data::new(TokenService::new(SECRET)))
            .to_http_request();

        assert!(matches!(
            authenticate(&req),
            Err(ApiError::Unauthenticated("No token provided"))
        ));
    }

    #[test]
    fn request_with_valid_token_resolves_user() {
        let tokens = TokenService::new(SECRET);
        let id = Uuid::new_v4();
        let token = tokens.issue(id, "ana@example.com", "ADMIN").unwrap();
        let req = TestRequest::default()
            .app_data(Data::new(tokens))
            .insert_header((AUTHORIZATION, format!("Bearer {}", token)))
            .to_http_request();

        let user = authenticate(&req).unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.role, "ADMIN");
    }
}
