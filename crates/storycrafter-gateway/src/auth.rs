//! Authentication: password hashing, bearer tokens and the `CurrentUser`
//! extractor for protected routes.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use storycrafter_core::storage::User;

use crate::config::AuthSettings;
use crate::gateway::GatewayState;
use crate::{GatewayError, Result};

/// Hashes a password into an Argon2id PHC string with a fresh salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| GatewayError::Internal(format!("password hashing failed: {}", e)))
}

/// Checks a password against a stored PHC string. Malformed hashes never verify.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Access token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User email
    pub sub: String,
    /// User id
    pub uid: i64,
    /// Expiry, seconds since the epoch
    pub exp: i64,
}

/// Issues and verifies HS256 access tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl_minutes", &self.ttl.num_minutes())
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    pub fn new(settings: &AuthSettings) -> Self {
        let secret = settings.secret_key.as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl: Duration::minutes(settings.token_ttl_minutes),
        }
    }

    pub fn issue(&self, user: &User) -> Result<String> {
        let claims = Claims {
            sub: user.email.clone(),
            uid: user.id,
            exp: (Utc::now() + self.ttl).timestamp(),
        };
        self.sign(&claims)
    }

    pub fn sign(&self, claims: &Claims) -> Result<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| GatewayError::Internal(format!("token signing failed: {}", e)))
    }

    pub fn verify(&self, token: &str) -> Result<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected access token");
                credentials_error()
            })
    }
}

fn credentials_error() -> GatewayError {
    GatewayError::AuthenticationFailed("Could not validate credentials".to_string())
}

/// The authenticated user behind a request's bearer token.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[async_trait::async_trait]
impl FromRequestParts<Arc<GatewayState>> for CurrentUser {
    type Rejection = GatewayError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<GatewayState>) -> Result<Self> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(credentials_error)?;

        let claims = state.tokens.verify(token.trim())?;
        let user = state.store.lock().find_user(claims.uid)?;

        match user {
            Some(user) if user.email == claims.sub => Ok(CurrentUser(user)),
            _ => Err(credentials_error()),
        }
    }
}
