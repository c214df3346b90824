//! JWT token utilities for inspecting access tokens issued by the backend.
//!
//! The console never holds the signing secret, so tokens are decoded without
//! signature verification. The only question answered here is whether a
//! stored token is still worth presenting to the backend at all.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::errors::{ServiceError, ServiceResult};

/// JWT Claims structure as issued by the game-operations backend
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User ID
    #[serde(default)]
    pub sub: Option<String>,
    /// User role
    #[serde(default)]
    pub role: Option<String>,
    /// Token expiration timestamp
    pub exp: usize,
    /// Token issued at timestamp
    #[serde(default)]
    pub iat: Option<usize>,
}

impl Claims {
    /// Check if token has expired
    pub fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp() as usize;
        now > self.exp
    }
}

/// Decodes token claims without checking the signature.
pub struct TokenInspector {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenInspector {
    pub fn new() -> Self {
        // The key is never consulted once signature validation is off, but
        // the decode API still wants one.
        let decoding_key = DecodingKey::from_secret(&[]);

        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        // Expiry is checked by the caller via Claims::is_expired so that a
        // stale token can be told apart from a malformed one.
        validation.validate_exp = false;

        TokenInspector {
            decoding_key,
            validation,
        }
    }

    /// Decode a token's claims without verifying its signature.
    pub fn peek(&self, token: &str) -> ServiceResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|token_data| token_data.claims)
            .map_err(|e| ServiceError::authentication(format!("Token could not be decoded: {}", e)))
    }
}

impl Default for TokenInspector {
    fn default() -> Self {
        Self::new()
    }
}
