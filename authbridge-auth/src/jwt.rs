//! Session token signing and validation

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use authbridge_common::error::{Error, Result};
use authbridge_common::types::TokenClaims;

/// Signs and validates session tokens with the process-wide secret.
///
/// The secret is supplied once at startup (explicit or derived) and is
/// immutable afterwards.
pub struct TokenSigner {
    secret: Vec<u8>,
    issuer: String,
    token_expiry: i64,
    algorithm: Algorithm,
}

impl TokenSigner {
    pub fn new(secret: &str, issuer: &str, token_expiry: u64) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
            issuer: issuer.to_string(),
            token_expiry: token_expiry as i64,
            algorithm: Algorithm::HS256,
        }
    }

    /// Sign the claims, stamping issuer, issue time and expiry.
    pub fn sign(&self, claims: &TokenClaims) -> Result<String> {
        let now = Utc::now();
        let mut claims = claims.clone();
        claims.iss = Some(self.issuer.clone());
        claims.iat = Some(now.timestamp());
        claims.exp = Some((now + Duration::seconds(self.token_expiry)).timestamp());

        let header = Header::new(self.algorithm);
        encode(&header, &claims, &EncodingKey::from_secret(&self.secret))
            .map_err(|e| Error::InternalError(format!("Failed to encode token: {e}")))
    }

    /// Validate and decode a session token
    pub fn verify(&self, token: &str) -> Result<TokenClaims> {
        let mut validation = Validation::new(self.algorithm);
        validation.set_issuer(&[&self.issuer]);

        let token_data =
            decode::<TokenClaims>(token, &DecodingKey::from_secret(&self.secret), &validation)
                .map_err(|e| match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => Error::TokenExpired,
                    _ => Error::InvalidToken,
                })?;

        Ok(token_data.claims)
    }

    /// Decode a token whose expiry has passed (for the refresh cycle).
    /// The signature is still checked.
    pub fn decode_expired(&self, token: &str) -> Result<TokenClaims> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = false;

        let token_data =
            decode::<TokenClaims>(token, &DecodingKey::from_secret(&self.secret), &validation)
                .map_err(|_| Error::InvalidToken)?;

        Ok(token_data.claims)
    }

    pub fn token_expiry(&self) -> u64 {
        self.token_expiry as u64
    }
}
