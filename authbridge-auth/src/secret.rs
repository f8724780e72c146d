//! Signing-secret derivation

use sha2::{Digest, Sha256};
use tracing::warn;

const FINGERPRINT_SEPARATOR: &str = "|";
const MISSING_COMPONENT: &str = "unset";

/// Return the explicitly configured secret unchanged, or derive a stable
/// one from the ordered deployment fingerprint.
///
/// The derived value is reproducible across restarts of the same
/// deployment, and is only as secret as the fingerprint inputs — the
/// fingerprint must therefore include deployment-private values such as
/// the database connection string. Called once at startup; the derived
/// key is logged at that point.
pub fn derive_or_configured(explicit: Option<&str>, fingerprint: &[Option<&str>]) -> String {
    if let Some(secret) = explicit {
        if !secret.is_empty() {
            return secret.to_string();
        }
    }

    let joined = fingerprint
        .iter()
        .map(|component| component.unwrap_or(MISSING_COMPONENT))
        .collect::<Vec<_>>()
        .join(FINGERPRINT_SEPARATOR);
    let derived = hex::encode(Sha256::digest(joined.as_bytes()));

    warn!("No signing secret configured; using autogenerated key {derived}");
    derived
}
