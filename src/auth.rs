// src/auth.rs
//! Bearer-token session authentication.
//!
//! Credential checking is delegated to the upstream auth webhook at login;
//! on success the service mints a short-lived HS256 session token. Every
//! protected route runs through the [`SessionUser`] request guard, and a
//! missing or invalid token is an explicit 401 — there is no fallback
//! credential path.

use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::{Request, State};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub secret: String,
    pub ttl_hours: i64,
}

impl SessionConfig {
    pub fn new(secret: String, ttl_hours: i64) -> Self {
        Self { secret, ttl_hours }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user email
    pub name: String,
    pub role: String,
    pub iat: usize,
    pub exp: usize,
}

/// Verified session identity attached to a request.
#[derive(Debug, Clone, Serialize)]
pub struct SessionUser {
    pub email: String,
    pub name: String,
    pub role: String,
}

impl From<Claims> for SessionUser {
    fn from(claims: Claims) -> Self {
        Self {
            email: claims.sub,
            name: claims.name,
            role: claims.role,
        }
    }
}

pub fn issue_token(user: &SessionUser, config: &SessionConfig) -> Result<String> {
    let now = Utc::now();
    let expires = now + chrono::Duration::hours(config.ttl_hours);

    let claims = Claims {
        sub: user.email.clone(),
        name: user.name.clone(),
        role: user.role.clone(),
        iat: now.timestamp() as usize,
        exp: expires.timestamp() as usize,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .context("Failed to sign session token")
}

pub fn verify_token(token: &str, config: &SessionConfig) -> Result<SessionUser> {
    let validation = Validation::new(Algorithm::HS256);
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .context("Session token verification failed")?;

    Ok(token_data.claims.into())
}

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    TokenVerificationFailed,
}

impl AuthError {
    pub fn message(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "Authorization token required",
            AuthError::InvalidToken => "Invalid authorization header format",
            AuthError::TokenVerificationFailed => "Session token verification failed",
        }
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for SessionUser {
    type Error = AuthError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let session_config = match req.guard::<&State<SessionConfig>>().await {
            Outcome::Success(config) => config,
            Outcome::Error((status, _)) => {
                return Outcome::Error((status, AuthError::TokenVerificationFailed))
            }
            Outcome::Forward(f) => return Outcome::Forward(f),
        };

        let token = match req.headers().get_one("Authorization") {
            Some(header) if header.starts_with("Bearer ") => &header[7..],
            Some(_) => {
                warn!("Invalid Authorization header format");
                return Outcome::Error((Status::Unauthorized, AuthError::InvalidToken));
            }
            None => {
                warn!("Missing Authorization header");
                return Outcome::Error((Status::Unauthorized, AuthError::MissingToken));
            }
        };

        match verify_token(token, session_config) {
            Ok(user) => Outcome::Success(user),
            Err(e) => {
                warn!("Token verification failed: {}", e);
                Outcome::Error((Status::Unauthorized, AuthError::TokenVerificationFailed))
            }
        }
    }
}

// Optional auth guard that doesn't fail if no auth is provided
pub struct OptionalAuth {
    pub user: Option<SessionUser>,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for OptionalAuth {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match SessionUser::from_request(req).await {
            Outcome::Success(user) => Outcome::Success(OptionalAuth { user: Some(user) }),
            _ => Outcome::Success(OptionalAuth { user: None }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_user() -> SessionUser {
        SessionUser {
            email: "hr@example.com".to_string(),
            name: "Sarah Johnson".to_string(),
            role: "manager".to_string(),
        }
    }

    #[test]
    fn token_round_trip_preserves_identity() {
        let config = SessionConfig::new("test-secret".to_string(), 24);
        let token = issue_token(&session_user(), &config).unwrap();
        let verified = verify_token(&token, &config).unwrap();

        assert_eq!(verified.email, "hr@example.com");
        assert_eq!(verified.name, "Sarah Johnson");
        assert_eq!(verified.role, "manager");
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let config = SessionConfig::new("test-secret".to_string(), 24);
        let other = SessionConfig::new("other-secret".to_string(), 24);
        let token = issue_token(&session_user(), &config).unwrap();
        assert!(verify_token(&token, &other).is_err());
    }
}
