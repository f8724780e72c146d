//! Auth server implementation

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;
use tracing::info;

use authbridge_common::config::AuthConfig;
use authbridge_common::error::Result;
use authbridge_common::types::ApiError;

use crate::credentials::CredentialVerifier;
use crate::events::EventDispatcher;
use crate::handlers::{self, AuthState};
use crate::jwt::TokenSigner;
use crate::providers::enabled_providers;
use crate::reconciler::IdentityReconciler;
use crate::secret;
use crate::store::{MemoryStore, UserStore};
use crate::token::TokenEnricher;

/// Identity reconciliation and session token server
pub struct AuthServer {
    config: AuthConfig,
    state: Arc<AuthState>,
}

impl AuthServer {
    /// Create a new auth server with the bundled in-memory store and no
    /// notification hooks.
    pub fn new(config: &AuthConfig) -> Result<Self> {
        Self::with_parts(config, Arc::new(MemoryStore::new()), EventDispatcher::new())
    }

    /// Create a new auth server around an existing store and dispatcher.
    pub fn with_parts(
        config: &AuthConfig,
        store: Arc<dyn UserStore>,
        dispatcher: EventDispatcher,
    ) -> Result<Self> {
        // Computed once here; immutable for the life of the process.
        let signing_secret = secret::derive_or_configured(
            config.token_secret.as_deref(),
            &[config.database_url.as_deref(), Some(config.issuer.as_str())],
        );
        let signer = Arc::new(TokenSigner::new(
            &signing_secret,
            &config.issuer,
            config.token_expiry,
        ));

        let reconciler = Arc::new(IdentityReconciler::new(
            store.clone(),
            config.signup_disabled,
        ));
        let verifier = CredentialVerifier::new(store, config.seed_admin.clone());
        let enricher = TokenEnricher::new(reconciler.clone());

        let state = Arc::new(AuthState {
            verifier,
            reconciler,
            enricher,
            signer,
            dispatcher: Arc::new(dispatcher),
            providers: enabled_providers(config),
        });

        Ok(Self {
            config: config.clone(),
            state,
        })
    }

    /// Get auth state for sharing with other services
    pub fn state(&self) -> Arc<AuthState> {
        self.state.clone()
    }

    /// Run the auth server
    pub async fn run(&self) -> Result<()> {
        let state = self.state.clone();
        let host = self.config.host.clone();
        let port = self.config.port;

        info!("Starting auth server on {}:{}", host, port);

        HttpServer::new(move || {
            let cors = Cors::permissive();

            App::new()
                .app_data(web::Data::new(state.clone()))
                .wrap(cors)
                .wrap(middleware::Compress::default())
                .wrap(middleware::Logger::default())
                .service(
                    web::scope("/auth/v1")
                        // Health check
                        .route("/health", web::get().to(health_check))
                        // Token endpoint (login + refresh)
                        .route("/token", web::post().to(token_handler))
                        // Client-visible session projection
                        .route("/session", web::get().to(handlers::session))
                        // Enabled login providers
                        .route("/providers", web::get().to(handlers::providers)),
                )
        })
        .workers(4)
        .bind(format!("{}:{}", host, port))?
        .run()
        .await?;

        Ok(())
    }
}

/// Health check endpoint
async fn health_check() -> actix_web::HttpResponse {
    actix_web::HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "auth",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Token handler that routes based on grant_type
async fn token_handler(
    state: web::Data<Arc<AuthState>>,
    query: web::Query<TokenQuery>,
    body: web::Json<serde_json::Value>,
) -> actix_web::HttpResponse {
    match query.grant_type.as_deref() {
        Some("password") => {
            let request: crate::credentials::LoginRequest =
                match serde_json::from_value(body.into_inner()) {
                    Ok(r) => r,
                    Err(e) => {
                        return actix_web::HttpResponse::BadRequest()
                            .json(ApiError::new("invalid_request", e.to_string()));
                    }
                };
            handlers::token_password(state, web::Json(request)).await
        }
        Some("refresh_token") => {
            let request: handlers::RefreshTokenRequest =
                match serde_json::from_value(body.into_inner()) {
                    Ok(r) => r,
                    Err(e) => {
                        return actix_web::HttpResponse::BadRequest()
                            .json(ApiError::new("invalid_request", e.to_string()));
                    }
                };
            handlers::token_refresh(state, web::Json(request)).await
        }
        _ => actix_web::HttpResponse::BadRequest().json(ApiError::new(
            "unsupported_grant_type",
            "Supported grant types: password, refresh_token",
        )),
    }
}

#[derive(serde::Deserialize)]
struct TokenQuery {
    grant_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_server_creation() {
        let config = AuthConfig::default();
        let server = AuthServer::new(&config);
        assert!(server.is_ok());
    }

    #[test]
    fn test_explicit_secret_is_used() {
        let config = AuthConfig {
            token_secret: Some("configured-secret".to_string()),
            ..AuthConfig::default()
        };
        let server = AuthServer::new(&config).unwrap();

        let claims = authbridge_common::types::TokenClaims {
            sub: Some("ext-1".to_string()),
            ..authbridge_common::types::TokenClaims::default()
        };
        let token = server.state().signer.sign(&claims).unwrap();

        let signer = TokenSigner::new("configured-secret", &config.issuer, config.token_expiry);
        assert!(signer.verify(&token).is_ok());
    }
}
