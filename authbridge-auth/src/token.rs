//! Token refresh enrichment and session projection

use std::sync::Arc;

use authbridge_common::error::{Error, Result};
use authbridge_common::types::{
    ExternalIdentity, ProviderAccount, ProviderProfile, SessionView, TokenClaims,
};

use crate::credentials::CREDENTIALS_PROVIDER;
use crate::events::AuthEvent;
use crate::reconciler::IdentityReconciler;

/// Folds the canonical profile back into the token on every refresh
/// cycle, and projects the client-visible session on every read.
pub struct TokenEnricher {
    reconciler: Arc<IdentityReconciler>,
}

impl TokenEnricher {
    pub fn new(reconciler: Arc<IdentityReconciler>) -> Self {
        Self { reconciler }
    }

    /// Rebuild the token's identity claims from the reconciled profile.
    ///
    /// `sub` and `email` are required; a token without them indicates a
    /// misconfigured provider and fails with [`Error::MissingClaim`].
    /// All other previous claims are carried over verbatim.
    pub async fn refresh(
        &self,
        previous: TokenClaims,
        account: Option<&ProviderAccount>,
        profile: Option<&ProviderProfile>,
    ) -> Result<(TokenClaims, Vec<AuthEvent>)> {
        let provider = account
            .map(|account| account.provider.clone())
            .or_else(|| previous.provider.clone())
            .unwrap_or_else(|| CREDENTIALS_PROVIDER.to_string());

        let sub = previous.sub.clone().ok_or(Error::MissingClaim("sub"))?;
        let email = previous.email.clone().ok_or(Error::MissingClaim("email"))?;
        let name = previous.name.clone().unwrap_or_else(|| email.clone());

        let identity = ExternalIdentity {
            external_id: sub.clone(),
            provider: provider.clone(),
            email,
            name: Some(name),
        };
        let (user, events) = self.reconciler.get_or_create(&identity).await?;

        let mut claims = previous;
        claims.internal_id = Some(user.id);
        claims.external_id = Some(sub);
        // The provider profile is only present on a fresh sign-in; later
        // refreshes keep the handle already in the token.
        if let Some(login) = profile.and_then(|profile| profile.login.clone()) {
            claims.external_username = Some(login);
        }
        claims.provider = Some(provider);

        Ok((claims, events))
    }
}

/// Overwrite the session's identity fields from the token. Purely a field
/// projection, executed on every session read; no storage access.
pub fn project(mut session: SessionView, token: &TokenClaims) -> SessionView {
    session.internal_id = token.internal_id.clone();
    session.provider = token.provider.clone();
    session.external_id = token.external_id.clone();
    session.external_username = token.external_username.clone();
    session
}

/// Materialize the base session from the token's standard fields before
/// projection.
pub fn materialize(token: &TokenClaims) -> SessionView {
    let base = SessionView {
        email: token.email.clone(),
        name: token.name.clone(),
        expires_at: token.exp,
        ..SessionView::default()
    };
    project(base, token)
}
