//! Integration tests for the identity reconciliation flow

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use authbridge::auth::credentials::{derived_user_id, LoginRequest};
use authbridge::auth::events::{EventDispatcher, NotificationHook};
use authbridge::auth::store::MemoryStore;
use authbridge::auth::token;
use authbridge::auth::AuthServer;
use authbridge::common::config::{AuthConfig, SeedAdmin};
use authbridge::common::types::{ExternalIdentity, ProviderAccount, TokenClaims};

fn seeded_config() -> AuthConfig {
    AuthConfig {
        token_secret: Some("integration-secret".to_string()),
        seed_admin: Some(SeedAdmin {
            email: "admin@x.com".to_string(),
            password: "pw".to_string(),
        }),
        ..AuthConfig::default()
    }
}

#[derive(Default)]
struct WelcomeRecorder {
    seen: Mutex<Vec<String>>,
}

#[async_trait]
impl NotificationHook for WelcomeRecorder {
    async fn on_user_created(&self, email: &str, _name: &str) {
        self.seen.lock().push(email.to_string());
    }
}

#[tokio::test]
async fn test_credentials_login_to_session_flow() {
    let server = AuthServer::new(&seeded_config()).unwrap();
    let state = server.state();

    // Seed login bootstraps the administrator.
    let login = LoginRequest {
        username: "admin@x.com".to_string(),
        password: "pw".to_string(),
    };
    let identity = state
        .verifier
        .authorize(Some(&login))
        .await
        .unwrap()
        .expect("seed login must succeed");
    assert_eq!(identity.external_id, derived_user_id("admin@x.com"));

    // The bootstrap already created the profile, so reconciliation finds
    // it and reports nothing to dispatch.
    let (user, events) = state.reconciler.get_or_create(&identity).await.unwrap();
    assert!(events.is_empty());
    assert!(user.admin);
    assert_eq!(user.id, identity.external_id);

    // Sign, refresh, and project.
    let claims = TokenClaims {
        sub: Some(identity.external_id.clone()),
        email: Some(user.email.clone()),
        name: Some(user.name.clone()),
        ..TokenClaims::default()
    };
    let signed = state.signer.sign(&claims).unwrap();
    let decoded = state.signer.verify(&signed).unwrap();

    let (refreshed, events) = state.enricher.refresh(decoded, None, None).await.unwrap();
    assert!(events.is_empty(), "refresh must not re-create the user");
    assert_eq!(refreshed.internal_id.as_deref(), Some(user.id.as_str()));
    assert_eq!(refreshed.provider.as_deref(), Some("credentials"));

    let view = token::materialize(&refreshed);
    assert_eq!(view.internal_id.as_deref(), Some(user.id.as_str()));
    assert_eq!(view.external_id.as_deref(), Some(user.id.as_str()));
}

#[tokio::test]
async fn test_provider_login_reconciles_once() {
    let recorder = Arc::new(WelcomeRecorder::default());
    let server = AuthServer::with_parts(
        &seeded_config(),
        Arc::new(MemoryStore::new()),
        EventDispatcher::new().with_hook(recorder.clone()),
    )
    .unwrap();
    let state = server.state();

    let identity = ExternalIdentity {
        external_id: "98765".to_string(),
        provider: "github".to_string(),
        email: "dev@example.com".to_string(),
        name: Some("Dev".to_string()),
    };
    let (user, events) = state.reconciler.get_or_create(&identity).await.unwrap();
    state.dispatcher.dispatch(&events).await;
    assert_eq!(*recorder.seen.lock(), vec!["dev@example.com"]);

    // Refreshing a provider token maps onto the same internal user.
    let previous = TokenClaims {
        sub: Some("98765".to_string()),
        email: Some("dev@example.com".to_string()),
        name: Some("Dev".to_string()),
        ..TokenClaims::default()
    };
    let account = ProviderAccount {
        provider: "github".to_string(),
    };
    let (refreshed, events) = state
        .enricher
        .refresh(previous, Some(&account), None)
        .await
        .unwrap();

    assert!(events.is_empty());
    assert_eq!(refreshed.internal_id.as_deref(), Some(user.id.as_str()));
}

#[tokio::test]
async fn test_signup_disabled_rejects_unknown_identity() {
    let config = AuthConfig {
        signup_disabled: true,
        ..seeded_config()
    };
    let server = AuthServer::new(&config).unwrap();
    let state = server.state();

    let previous = TokenClaims {
        sub: Some("98765".to_string()),
        email: Some("dev@example.com".to_string()),
        ..TokenClaims::default()
    };
    let result = state.enricher.refresh(previous, None, None).await;
    assert!(matches!(
        result,
        Err(authbridge::common::Error::SignupDisabled)
    ));
}
