//! Username/password verification and seed-administrator bootstrap

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{debug, info, warn};

use authbridge_common::config::SeedAdmin;
use authbridge_common::error::{Error, Result};
use authbridge_common::types::{Credential, ExternalIdentity, UserProfile};

use crate::store::{NewUserProfile, UserStore};

/// Provider id for the local username/password path
pub const CREDENTIALS_PROVIDER: &str = "credentials";

/// Login form submitted on the credentials path
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Stable internal id for credential users: a one-way digest of the
/// lower-cased, trimmed email. The same email yields the same id even
/// before the profile row exists.
pub fn derived_user_id(email: &str) -> String {
    hex::encode(Sha256::digest(email.trim().to_lowercase().as_bytes()))
}

/// Validates local logins against stored password hashes.
///
/// The return value never distinguishes "no such user" from "wrong
/// password"; diagnostic logs do.
pub struct CredentialVerifier {
    store: Arc<dyn UserStore>,
    seed_admin: Option<SeedAdmin>,
}

impl CredentialVerifier {
    pub fn new(store: Arc<dyn UserStore>, seed_admin: Option<SeedAdmin>) -> Self {
        Self { store, seed_admin }
    }

    /// Verify a login attempt. `Ok(None)` is the only caller-visible
    /// signal for every ordinary rejection; an empty username is a
    /// caller-contract violation, not a login failure.
    pub async fn authorize(
        &self,
        credentials: Option<&LoginRequest>,
    ) -> Result<Option<ExternalIdentity>> {
        let Some(login) = credentials else {
            warn!("Credentials login attempted without a request body");
            return Ok(None);
        };
        if login.username.is_empty() {
            return Err(Error::ValidationError(
                "username must not be empty".to_string(),
            ));
        }

        match self.store.find_by_email(&login.username).await? {
            None => self.bootstrap_seed_admin(login).await,
            Some((user, Some(credential))) => {
                if verify_password(&login.password, &credential.password_hash)? {
                    debug!(user = %user.id, "Password login succeeded");
                    Ok(Some(identity_for(&user)))
                } else {
                    warn!(user = %user.id, "Password login failed: wrong password");
                    Ok(None)
                }
            }
            Some((user, None)) => {
                warn!(user = %user.id, "Password login failed: no credential on file");
                Ok(None)
            }
        }
    }

    /// Create the configured seed administrator, but only while the user
    /// store is empty. Once the first user exists the zero-count guard
    /// closes this path for the lifetime of the deployment.
    async fn bootstrap_seed_admin(
        &self,
        login: &LoginRequest,
    ) -> Result<Option<ExternalIdentity>> {
        let Some(seed) = &self.seed_admin else {
            warn!("Password login failed: unknown user");
            return Ok(None);
        };
        if self.store.count_users().await? != 0 {
            warn!("Password login failed: unknown user");
            return Ok(None);
        }
        if login.username != seed.email || login.password != seed.password {
            warn!("Password login failed: seed administrator mismatch");
            return Ok(None);
        }

        let id = derived_user_id(&seed.email);
        let user = match self
            .store
            .create_user(NewUserProfile {
                id: Some(id.clone()),
                external_id: id.clone(),
                provider: CREDENTIALS_PROVIDER.to_string(),
                email: seed.email.clone(),
                name: seed.email.clone(),
                admin: true,
            })
            .await
        {
            Ok(user) => user,
            // A concurrent bootstrap won the uniqueness race; its row is
            // canonical.
            Err(Error::DuplicateIdentity) => {
                return Ok(self
                    .store
                    .find_by_identity(&id, CREDENTIALS_PROVIDER)
                    .await?
                    .map(|user| identity_for(&user)));
            }
            Err(err) => return Err(err),
        };

        self.store
            .set_credential(Credential {
                user_id: user.id.clone(),
                password_hash: hash_password(&login.password)?,
                change_at_next_login: true,
            })
            .await?;

        info!(user = %user.id, "Seed administrator bootstrapped");
        Ok(Some(identity_for(&user)))
    }
}

fn identity_for(user: &UserProfile) -> ExternalIdentity {
    ExternalIdentity {
        external_id: user.external_id.clone(),
        provider: user.provider.clone(),
        email: user.email.clone(),
        name: Some(user.name.clone()),
    }
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::InternalError(format!("Password hashing failed: {e}")))
}

fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| Error::InternalError("Invalid password hash".to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn seeded_verifier(store: Arc<MemoryStore>) -> CredentialVerifier {
        CredentialVerifier::new(
            store,
            Some(SeedAdmin {
                email: "admin@x.com".to_string(),
                password: "pw".to_string(),
            }),
        )
    }

    fn login(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_derived_user_id_normalizes_email() {
        assert_eq!(
            derived_user_id("Admin@X.com "),
            derived_user_id("admin@x.com")
        );
        assert_ne!(derived_user_id("a@x.com"), derived_user_id("b@x.com"));
    }

    #[tokio::test]
    async fn test_missing_credentials_object() {
        let verifier = seeded_verifier(Arc::new(MemoryStore::new()));
        assert!(verifier.authorize(None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_username_is_contract_violation() {
        let verifier = seeded_verifier(Arc::new(MemoryStore::new()));
        let result = verifier.authorize(Some(&login("", "pw"))).await;
        assert!(matches!(result, Err(Error::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_seed_bootstrap_creates_one_admin() {
        let store = Arc::new(MemoryStore::new());
        let verifier = seeded_verifier(store.clone());

        let identity = verifier
            .authorize(Some(&login("admin@x.com", "pw")))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(identity.provider, CREDENTIALS_PROVIDER);
        assert_eq!(identity.external_id, derived_user_id("admin@x.com"));
        assert_eq!(store.count_users().await.unwrap(), 1);

        let (user, credential) = store
            .find_by_email("admin@x.com")
            .await
            .unwrap()
            .unwrap();
        assert!(user.admin);
        assert_eq!(user.id, derived_user_id("admin@x.com"));
        assert!(credential.unwrap().change_at_next_login);
    }

    #[tokio::test]
    async fn test_second_login_does_not_recreate() {
        let store = Arc::new(MemoryStore::new());
        let verifier = seeded_verifier(store.clone());

        let first = verifier
            .authorize(Some(&login("admin@x.com", "pw")))
            .await
            .unwrap()
            .unwrap();
        let second = verifier
            .authorize(Some(&login("admin@x.com", "pw")))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(first.external_id, second.external_id);
        assert_eq!(store.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_wrong_password_returns_none_and_mutates_nothing() {
        let store = Arc::new(MemoryStore::new());
        let verifier = seeded_verifier(store.clone());

        verifier
            .authorize(Some(&login("admin@x.com", "pw")))
            .await
            .unwrap()
            .unwrap();
        let before = store.find_by_email("admin@x.com").await.unwrap().unwrap();

        let rejected = verifier
            .authorize(Some(&login("admin@x.com", "nope")))
            .await
            .unwrap();
        assert!(rejected.is_none());

        let after = store.find_by_email("admin@x.com").await.unwrap().unwrap();
        assert_eq!(before.0, after.0);
        assert_eq!(store.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_zero_count_guard_blocks_seed_after_first_user() {
        let store = Arc::new(MemoryStore::new());
        store
            .create_user(NewUserProfile {
                id: None,
                external_id: "ext-1".to_string(),
                provider: "github".to_string(),
                email: "someone@example.com".to_string(),
                name: "Someone".to_string(),
                admin: true,
            })
            .await
            .unwrap();

        let verifier = seeded_verifier(store.clone());
        let result = verifier
            .authorize(Some(&login("admin@x.com", "pw")))
            .await
            .unwrap();

        assert!(result.is_none());
        assert_eq!(store.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_no_seed_configured() {
        let verifier = CredentialVerifier::new(Arc::new(MemoryStore::new()), None);
        let result = verifier
            .authorize(Some(&login("admin@x.com", "pw")))
            .await
            .unwrap();
        assert!(result.is_none());
    }
}
