//! JWT utilities for token generation and verification
//!
//! Provides JWT creation and verification using the HS512 algorithm.
//! Access tokens are short-lived (30 minutes) and carry the holder's
//! authorities as a claim; refresh tokens are long-lived (5 days) and
//! carry no authorities.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Token issuer claim, also pinned during verification
pub const ISSUER: &str = "custodia";

/// Token audience claim, also pinned during verification
pub const AUDIENCE: &str = "custodia-web";

/// Access token lifetime (30 minutes)
const ACCESS_TOKEN_EXPIRATION_MS: i64 = 1_800_000;

/// Refresh token lifetime (5 days)
const REFRESH_TOKEN_EXPIRATION_MS: i64 = 432_000_000;

/// JWT errors
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Token encoding failed: {0}")]
    EncodingError(String),

    #[error("Token decoding failed: {0}")]
    DecodingError(String),

    #[error("Token expired")]
    Expired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has no authorities claim")]
    MissingAuthorities,
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => JwtError::Expired,
            ErrorKind::InvalidToken
            | ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidIssuer
            | ErrorKind::InvalidAudience => JwtError::InvalidToken,
            _ => JwtError::DecodingError(err.to_string()),
        }
    }
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
    /// Subject (user email)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Authority strings; present on access tokens only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorities: Option<Vec<String>>,
}

/// JWT service for token operations
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    /// Create a new JWT service from the shared signing secret
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Generate an access token carrying the subject's authorities
    pub fn create_access_token(
        &self,
        email: &str,
        authorities: &[String],
    ) -> Result<String, JwtError> {
        self.create_token(email, Some(authorities.to_vec()), ACCESS_TOKEN_EXPIRATION_MS)
    }

    /// Generate a refresh token (same shape, no authorities claim)
    pub fn create_refresh_token(&self, email: &str) -> Result<String, JwtError> {
        self.create_token(email, None, REFRESH_TOKEN_EXPIRATION_MS)
    }

    fn create_token(
        &self,
        email: &str,
        authorities: Option<Vec<String>>,
        expiration_ms: i64,
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let exp = now + Duration::milliseconds(expiration_ms);

        let claims = Claims {
            iss: ISSUER.to_string(),
            aud: AUDIENCE.to_string(),
            sub: email.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            authorities,
        };

        encode(&Header::new(Algorithm::HS512), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))
    }

    /// Fully verify a token (signature, issuer, audience, expiry)
    pub fn verify_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS512);
        validation.set_issuer(&[ISSUER]);
        validation.set_audience(&[AUDIENCE]);
        // Set leeway to 0 for strict expiration checking
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)?;

        Ok(token_data.claims)
    }

    /// Fully verify a token and return its subject (the user email)
    pub fn verify_and_get_subject(&self, token: &str) -> Result<String, JwtError> {
        Ok(self.verify_token(token)?.sub)
    }

    /// Authorities carried by a verified token.
    ///
    /// The claim is required: a token minted without one (a refresh
    /// token) fails here, so it never authenticates a request.
    pub fn extract_authorities(&self, token: &str) -> Result<Vec<String>, JwtError> {
        self.verify_token(token)?
            .authorities
            .ok_or(JwtError::MissingAuthorities)
    }

    /// Expiry-only check used once a token's signature has already been
    /// verified upstream: true iff `email` is non-empty and the token has
    /// not expired. The signature is deliberately not re-checked here.
    pub fn is_token_valid(&self, email: &str, token: &str) -> bool {
        if email.trim().is_empty() {
            return false;
        }

        let mut validation = Validation::new(Algorithm::HS512);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        match decode::<Claims>(token, &self.decoding_key, &validation) {
            Ok(data) => data.claims.exp > Utc::now().timestamp(),
            Err(_) => false,
        }
    }
}
