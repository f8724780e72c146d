//! Common types for the AuthBridge identity layer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Identity Types
// ============================================================================

/// The (provider, provider-assigned id, email, display name) tuple produced
/// by any login method. Never persisted directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalIdentity {
    pub external_id: String,
    pub provider: String,
    pub email: String,
    pub name: Option<String>,
}

/// Canonical internal user record, keyed by (external_id, provider).
///
/// The id is a string rather than a UUID: profiles created through the
/// credentials provider carry an id derived from the normalized email,
/// every other provider gets a store-assigned UUID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub external_id: String,
    pub provider: String,
    pub email: String,
    pub name: String,
    pub admin: bool,
    pub created_at: DateTime<Utc>,
}

/// Password credential owned one-to-one by a credentials-provider profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    pub user_id: String,
    pub password_hash: String,
    pub change_at_next_login: bool,
}

// ============================================================================
// Token & Session Types
// ============================================================================

/// Claims carried by the signed session token. Rebuilt on every refresh
/// from the canonical profile plus the previous token's claims.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (external id)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Issuer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Expiration time (as UTC timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Issued at (as UTC timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Provider-specific passthrough claims, carried over verbatim
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// The reduced, client-visible projection of the session token.
/// Rebuilt on every session read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionView {
    pub internal_id: Option<String>,
    pub provider: Option<String>,
    pub external_id: Option<String>,
    pub external_username: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub expires_at: Option<i64>,
}

/// Slice of the provider account data consumed on token refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderAccount {
    pub provider: String,
}

/// Slice of the provider profile data consumed on token refresh
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderProfile {
    /// Provider-side login handle (e.g. a GitHub username)
    pub login: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

// ============================================================================
// Response Types
// ============================================================================

/// Standard API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}
