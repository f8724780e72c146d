//! Get-or-create mapping from external identities to canonical profiles

use std::sync::Arc;
use tracing::{info, warn};

use authbridge_common::error::{Error, Result};
use authbridge_common::types::{ExternalIdentity, UserProfile};

use crate::credentials::CREDENTIALS_PROVIDER;
use crate::events::AuthEvent;
use crate::store::{NewUserProfile, ProfileUpdate, UserStore};

/// Maps an external identity to its canonical user record, creating the
/// record on first sight.
///
/// Idempotent with respect to identity: two calls with the same
/// (external_id, provider) return the same internal id.
pub struct IdentityReconciler {
    store: Arc<dyn UserStore>,
    signup_disabled: bool,
}

impl IdentityReconciler {
    pub fn new(store: Arc<dyn UserStore>, signup_disabled: bool) -> Self {
        Self {
            store,
            signup_disabled,
        }
    }

    /// Return the canonical profile for the identity, creating it when
    /// absent. A fresh creation is reported through the returned event
    /// list; the caller hands those to the dispatcher.
    pub async fn get_or_create(
        &self,
        identity: &ExternalIdentity,
    ) -> Result<(UserProfile, Vec<AuthEvent>)> {
        if let Some(existing) = self
            .store
            .find_by_identity(&identity.external_id, &identity.provider)
            .await?
        {
            let synced = self.sync_profile(existing, identity).await?;
            return Ok((synced, Vec::new()));
        }

        if self.signup_disabled {
            warn!(provider = %identity.provider, "Refusing to create profile: signups disabled");
            return Err(Error::SignupDisabled);
        }

        // The very first reconciled user in the system becomes
        // administrator.
        let admin = self.store.count_users().await? == 0;

        // Credential users arrive with an id already derived from their
        // email; reusing it as the internal id keeps the verifier and the
        // reconciler in agreement. Every other provider gets a
        // store-assigned id.
        let id = (identity.provider == CREDENTIALS_PROVIDER)
            .then(|| identity.external_id.clone());
        let name = identity
            .name
            .clone()
            .unwrap_or_else(|| identity.email.clone());

        match self
            .store
            .create_user(NewUserProfile {
                id,
                external_id: identity.external_id.clone(),
                provider: identity.provider.clone(),
                email: identity.email.clone(),
                name,
                admin,
            })
            .await
        {
            Ok(user) => {
                info!(user = %user.id, provider = %user.provider, admin, "User created");
                let events = vec![AuthEvent::UserCreated {
                    email: user.email.clone(),
                    name: user.name.clone(),
                }];
                Ok((user, events))
            }
            // A concurrent first login for the same identity won the
            // uniqueness constraint; its row is canonical.
            Err(Error::DuplicateIdentity) => {
                let existing = self
                    .store
                    .find_by_identity(&identity.external_id, &identity.provider)
                    .await?
                    .ok_or_else(|| {
                        Error::StorageError(
                            "identity vanished after duplicate-key create".to_string(),
                        )
                    })?;
                Ok((existing, Vec::new()))
            }
            Err(err) => Err(err),
        }
    }

    /// Providers are the source of truth for display name and email; the
    /// internal id and admin flag are never altered here.
    async fn sync_profile(
        &self,
        existing: UserProfile,
        identity: &ExternalIdentity,
    ) -> Result<UserProfile> {
        let name = identity
            .name
            .clone()
            .unwrap_or_else(|| identity.email.clone());
        if existing.email == identity.email && existing.name == name {
            return Ok(existing);
        }

        self.store
            .update_user(
                &existing.id,
                ProfileUpdate {
                    email: Some(identity.email.clone()),
                    name: Some(name),
                },
            )
            .await
    }
}
