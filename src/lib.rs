//! AuthBridge
//!
//! Authenticates end users through third-party OAuth, enterprise SSO, and
//! a local username/password path, reconciles every external identity
//! into one canonical internal user record, and embeds that record into a
//! signed session token.
//!
//! # Features
//!
//! - **Credential verification** - Argon2-hashed passwords with a
//!   one-time seed-administrator bootstrap
//! - **Identity reconciliation** - stable internal ids per
//!   (external id, provider) pair, first user becomes administrator
//! - **Token enrichment** - canonical profile folded into the token on
//!   every refresh, reduced session view on every read
//! - **Deterministic signing secret** - derived from the deployment
//!   fingerprint when none is configured

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub use authbridge_auth as auth;
pub use authbridge_common as common;

pub use authbridge_auth::AuthServer;
pub use authbridge_common::config::AuthConfig;
