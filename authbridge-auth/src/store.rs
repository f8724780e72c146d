//! User storage contract and the bundled in-memory implementation

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use authbridge_common::error::{Error, Result};
use authbridge_common::types::{Credential, UserProfile};

/// Fields for a profile about to be created. A `None` id lets the store
/// assign a fresh one.
#[derive(Debug, Clone)]
pub struct NewUserProfile {
    pub id: Option<String>,
    pub external_id: String,
    pub provider: String,
    pub email: String,
    pub name: String,
    pub admin: bool,
}

/// Provider-sourced fields updatable on an existing profile
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub name: Option<String>,
}

/// Backing store for canonical user records.
///
/// Every call is atomic. `create_user` must enforce uniqueness on
/// (external_id, provider) and signal a violation as
/// [`Error::DuplicateIdentity`], distinctly from other failures — the
/// reconciler relies on this to resolve concurrent first-login races.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_identity(
        &self,
        external_id: &str,
        provider: &str,
    ) -> Result<Option<UserProfile>>;

    async fn find_by_email(&self, email: &str)
        -> Result<Option<(UserProfile, Option<Credential>)>>;

    async fn count_users(&self) -> Result<usize>;

    async fn create_user(&self, new: NewUserProfile) -> Result<UserProfile>;

    async fn update_user(&self, id: &str, update: ProfileUpdate) -> Result<UserProfile>;

    async fn set_credential(&self, credential: Credential) -> Result<()>;
}

/// In-memory user store
/// In production, this would be backed by the database
pub struct MemoryStore {
    inner: Arc<RwLock<StoreInner>>,
}

/// All maps live behind one lock so every store call is atomic.
#[derive(Default)]
struct StoreInner {
    users: HashMap<String, UserProfile>,
    identity_index: HashMap<(String, String), String>,
    email_index: HashMap<String, String>,
    credentials: HashMap<String, Credential>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(StoreInner::default())),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_identity(
        &self,
        external_id: &str,
        provider: &str,
    ) -> Result<Option<UserProfile>> {
        let key = (external_id.to_string(), provider.to_string());
        let inner = self.inner.read();
        Ok(inner
            .identity_index
            .get(&key)
            .and_then(|id| inner.users.get(id))
            .cloned())
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<(UserProfile, Option<Credential>)>> {
        let inner = self.inner.read();
        let user = match inner
            .email_index
            .get(email)
            .and_then(|id| inner.users.get(id))
        {
            Some(user) => user.clone(),
            None => return Ok(None),
        };
        let credential = inner.credentials.get(&user.id).cloned();
        Ok(Some((user, credential)))
    }

    async fn count_users(&self) -> Result<usize> {
        Ok(self.inner.read().users.len())
    }

    async fn create_user(&self, new: NewUserProfile) -> Result<UserProfile> {
        let key = (new.external_id.clone(), new.provider.clone());

        // The write lock is held across the check and the insert; this is
        // the uniqueness constraint concurrent first logins race against.
        let mut inner = self.inner.write();
        if inner.identity_index.contains_key(&key) {
            return Err(Error::DuplicateIdentity);
        }

        let user = UserProfile {
            id: new.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            external_id: new.external_id,
            provider: new.provider,
            email: new.email,
            name: new.name,
            admin: new.admin,
            created_at: Utc::now(),
        };

        inner.identity_index.insert(key, user.id.clone());
        inner.email_index.insert(user.email.clone(), user.id.clone());
        inner.users.insert(user.id.clone(), user.clone());

        Ok(user)
    }

    async fn update_user(&self, id: &str, update: ProfileUpdate) -> Result<UserProfile> {
        let mut inner = self.inner.write();

        if let Some(new_email) = update.email {
            let user = inner.users.get(id).ok_or(Error::UserNotFound)?;
            if user.email != new_email {
                let old_email = user.email.clone();
                inner.email_index.remove(&old_email);
                inner.email_index.insert(new_email.clone(), id.to_string());
                if let Some(user) = inner.users.get_mut(id) {
                    user.email = new_email;
                }
            }
        }

        let user = inner.users.get_mut(id).ok_or(Error::UserNotFound)?;
        if let Some(new_name) = update.name {
            user.name = new_name;
        }

        Ok(user.clone())
    }

    async fn set_credential(&self, credential: Credential) -> Result<()> {
        self.inner
            .write()
            .credentials
            .insert(credential.user_id.clone(), credential);
        Ok(())
    }
}
