//! Enabled-provider registry
//!
//! The registry is built once at startup from the tagged provider
//! configuration and passed by reference wherever the enabled set is
//! needed. The actual OAuth/SSO redirect and consent flows belong to the
//! configured providers themselves, not to this service.

use serde::Serialize;

use authbridge_common::config::{AuthConfig, ProviderConfig};

/// A login method the deployment has enabled
#[derive(Debug, Clone, Serialize)]
pub struct Provider {
    pub id: String,
    pub kind: ProviderKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OAuth,
    Sso,
    Credentials,
}

/// Build the enabled provider set by explicit construction from
/// configuration.
pub fn enabled_providers(config: &AuthConfig) -> Vec<Provider> {
    config
        .providers
        .iter()
        .map(|provider| Provider {
            id: provider.id().to_string(),
            kind: match provider {
                ProviderConfig::OAuth(_) => ProviderKind::OAuth,
                ProviderConfig::Sso(_) => ProviderKind::Sso,
                ProviderConfig::Credentials => ProviderKind::Credentials,
            },
        })
        .collect()
}
