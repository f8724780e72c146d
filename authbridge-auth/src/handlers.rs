//! HTTP handlers for authentication endpoints

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use authbridge_common::error::Error;
use authbridge_common::types::{ApiError, TokenClaims, UserProfile};

use crate::credentials::{CredentialVerifier, LoginRequest};
use crate::events::EventDispatcher;
use crate::jwt::TokenSigner;
use crate::providers::Provider;
use crate::reconciler::IdentityReconciler;
use crate::token::{self, TokenEnricher};

/// Shared auth state
pub struct AuthState {
    pub verifier: CredentialVerifier,
    pub reconciler: Arc<IdentityReconciler>,
    pub enricher: TokenEnricher,
    pub signer: Arc<TokenSigner>,
    pub dispatcher: Arc<EventDispatcher>,
    pub providers: Vec<Provider>,
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/v1/token?grant_type=password
pub async fn token_password(
    state: web::Data<Arc<AuthState>>,
    request: web::Json<LoginRequest>,
) -> HttpResponse {
    let login = request.into_inner();
    let identity = match state.verifier.authorize(Some(&login)).await {
        Ok(Some(identity)) => identity,
        // "no such user" and "wrong password" are deliberately the same
        // response.
        Ok(None) => return error_response(&Error::InvalidCredentials),
        Err(e) => return error_response(&e),
    };

    let (user, events) = match state.reconciler.get_or_create(&identity).await {
        Ok(result) => result,
        Err(e) => return error_response(&e),
    };
    state.dispatcher.dispatch(&events).await;

    info!("User logged in: {}", user.id);

    let claims = TokenClaims {
        sub: Some(identity.external_id.clone()),
        email: Some(user.email.clone()),
        name: Some(user.name.clone()),
        internal_id: Some(user.id.clone()),
        external_id: Some(identity.external_id),
        provider: Some(user.provider.clone()),
        ..TokenClaims::default()
    };

    match state.signer.sign(&claims) {
        Ok(access_token) => HttpResponse::Ok().json(TokenResponse {
            access_token,
            token_type: "bearer".to_string(),
            expires_in: state.signer.token_expiry(),
            user,
        }),
        Err(e) => error_response(&e),
    }
}

/// POST /auth/v1/token?grant_type=refresh_token
pub async fn token_refresh(
    state: web::Data<Arc<AuthState>>,
    request: web::Json<RefreshTokenRequest>,
) -> HttpResponse {
    // The previous token may already be past its expiry; its signature
    // must still hold.
    let previous = match state.signer.decode_expired(&request.token) {
        Ok(claims) => claims,
        Err(e) => return error_response(&e),
    };

    let (claims, events) = match state.enricher.refresh(previous, None, None).await {
        Ok(result) => result,
        Err(e) => return error_response(&e),
    };
    state.dispatcher.dispatch(&events).await;

    match state.signer.sign(&claims) {
        Ok(access_token) => HttpResponse::Ok().json(RefreshResponse {
            access_token,
            token_type: "bearer".to_string(),
            expires_in: state.signer.token_expiry(),
        }),
        Err(e) => error_response(&e),
    }
}

/// GET /auth/v1/session
pub async fn session(state: web::Data<Arc<AuthState>>, http_req: HttpRequest) -> HttpResponse {
    let token = match extract_bearer_token(&http_req) {
        Some(token) => token,
        None => return error_response(&Error::Unauthorized),
    };

    let claims = match state.signer.verify(&token) {
        Ok(claims) => claims,
        Err(e) => return error_response(&e),
    };

    HttpResponse::Ok().json(token::materialize(&claims))
}

/// GET /auth/v1/providers
pub async fn providers(state: web::Data<Arc<AuthState>>) -> HttpResponse {
    HttpResponse::Ok().json(&state.providers)
}

// ============================================================================
// Helpers
// ============================================================================

fn extract_bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.to_string())
}

fn error_response(error: &Error) -> HttpResponse {
    let status = error.status_code();
    let api_error = ApiError::new(error.error_code(), error.to_string());

    match status {
        400 => HttpResponse::BadRequest().json(api_error),
        401 => HttpResponse::Unauthorized().json(api_error),
        403 => HttpResponse::Forbidden().json(api_error),
        404 => HttpResponse::NotFound().json(api_error),
        409 => HttpResponse::Conflict().json(api_error),
        _ => HttpResponse::InternalServerError().json(api_error),
    }
}
