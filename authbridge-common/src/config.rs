//! Configuration for the AuthBridge identity layer
//!
//! The configuration is built exactly once at process start, either from a
//! TOML file or from the environment, and passed by reference into the auth
//! components. Nothing here is consulted through ambient global lookups.

use serde::{Deserialize, Serialize};

use crate::env;

/// Authentication service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Host to bind to
    pub host: String,
    /// Port for the auth service (default: 8080)
    pub port: u16,
    /// Signing secret for HS256 (derived from the deployment fingerprint
    /// when not set)
    pub token_secret: Option<String>,
    /// Token expiration in seconds (default: 3600)
    pub token_expiry: u64,
    /// Token issuer URL
    pub issuer: String,
    /// Refuse to create profiles for unknown identities
    pub signup_disabled: bool,
    /// Bootstrap administrator credentials, honored only while the user
    /// store is empty
    pub seed_admin: Option<SeedAdmin>,
    /// Backing store connection string; also a fingerprint component for
    /// secret derivation
    pub database_url: Option<String>,
    /// Enabled login providers
    pub providers: Vec<ProviderConfig>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            token_secret: None,
            token_expiry: 3600,
            issuer: "http://localhost:8080".to_string(),
            signup_disabled: false,
            seed_admin: None,
            database_url: None,
            providers: vec![ProviderConfig::Credentials],
        }
    }
}

/// Seed administrator credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedAdmin {
    pub email: String,
    pub password: String,
}

/// Tagged login-provider configuration.
///
/// A provider is enabled by being present in this list; the list is built
/// by explicit construction from configuration, never by probing at call
/// sites.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProviderConfig {
    OAuth(OAuthProviderConfig),
    Sso(SsoProviderConfig),
    Credentials,
}

impl ProviderConfig {
    pub fn id(&self) -> &str {
        match self {
            Self::OAuth(config) => &config.id,
            Self::Sso(config) => &config.id,
            Self::Credentials => "credentials",
        }
    }
}

/// Third-party OAuth provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthProviderConfig {
    pub id: String,
    pub client_id: String,
    pub client_secret: String,
}

/// Enterprise SSO provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SsoProviderConfig {
    pub id: String,
    pub issuer_url: String,
    pub client_id: String,
    pub client_secret: String,
}

impl AuthConfig {
    /// Build the configuration from environment variables.
    ///
    /// Providers are enabled by the presence of their credentials; the
    /// credentials provider is always available.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let seed_admin = match (
            env::var_opt("AUTHBRIDGE_SEED_EMAIL"),
            env::var_opt("AUTHBRIDGE_SEED_PASSWORD"),
        ) {
            (Some(email), Some(password)) => Some(SeedAdmin { email, password }),
            _ => None,
        };

        let mut providers = vec![ProviderConfig::Credentials];
        for id in ["github", "google"] {
            let prefix = format!("AUTHBRIDGE_{}", id.to_uppercase());
            if let (Some(client_id), Some(client_secret)) = (
                env::var_opt(&format!("{prefix}_ID")),
                env::var_opt(&format!("{prefix}_SECRET")),
            ) {
                providers.push(ProviderConfig::OAuth(OAuthProviderConfig {
                    id: id.to_string(),
                    client_id,
                    client_secret,
                }));
            }
        }
        if let Some(sso) = env::json_value("AUTHBRIDGE_SSO_CONFIG")
            .and_then(|value| serde_json::from_value::<SsoProviderConfig>(value).ok())
        {
            providers.push(ProviderConfig::Sso(sso));
        }

        Self {
            host: env::var_opt("AUTHBRIDGE_HOST").unwrap_or(defaults.host),
            port: env::var_opt("AUTHBRIDGE_PORT")
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(defaults.port),
            token_secret: env::var_opt("AUTHBRIDGE_TOKEN_SECRET"),
            token_expiry: env::var_opt("AUTHBRIDGE_TOKEN_EXPIRY")
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(defaults.token_expiry),
            issuer: env::var_opt("AUTHBRIDGE_ISSUER").unwrap_or(defaults.issuer),
            signup_disabled: env::var_opt("AUTHBRIDGE_SIGNUP_DISABLED")
                .is_some_and(|raw| raw == "1" || raw.eq_ignore_ascii_case("true")),
            seed_admin,
            database_url: env::var_opt("DATABASE_URL"),
            providers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AuthConfig::default();
        assert_eq!(config.port, 8080);
        assert!(!config.signup_disabled);
        assert!(matches!(
            config.providers.as_slice(),
            [ProviderConfig::Credentials]
        ));
    }

    #[test]
    fn test_config_serialization() {
        let mut config = AuthConfig::default();
        config.providers.push(ProviderConfig::OAuth(OAuthProviderConfig {
            id: "github".to_string(),
            client_id: "abc".to_string(),
            client_secret: "shh".to_string(),
        }));

        let json = serde_json::to_string(&config).unwrap();
        let parsed: AuthConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.providers.len(), 2);
        assert_eq!(parsed.providers[1].id(), "github");
    }

    #[test]
    fn test_provider_ids() {
        assert_eq!(ProviderConfig::Credentials.id(), "credentials");
        let sso = ProviderConfig::Sso(SsoProviderConfig {
            id: "corp".to_string(),
            issuer_url: "https://sso.corp.example".to_string(),
            client_id: "abc".to_string(),
            client_secret: "shh".to_string(),
        });
        assert_eq!(sso.id(), "corp");
    }
}
