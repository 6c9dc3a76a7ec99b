//! Join-token claim structures and validation helpers.
//!
//! The conferencing platform authorizes a join with a compact signed token
//! (`header.payload.signature`, base64url segments). Signing lives in the
//! session-controller crate; this module owns the pieces both sides of a
//! test need:
//!
//! - Size limits applied before any parsing
//! - The platform claim set (`app_key`, `tpc`, `role_type`, `version`,
//!   `iat`, `exp`)
//! - An unverified payload decode for expiry backstops and tests
//! - Deterministic expiry validation
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing (resource-exhaustion prevention)
//! - Error messages are generic; details go to debug logs only
//! - `app_key` is redacted in Debug output

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Maximum allowed join-token size in bytes (8KB).
///
/// Typical tokens are 200-500 bytes; anything larger is rejected before
/// base64 decode or JSON parsing so oversized input cannot waste CPU or
/// memory.
pub const MAX_JOIN_TOKEN_SIZE_BYTES: usize = 8192;

/// Claim-set version the platform currently expects.
pub const JOIN_TOKEN_VERSION: i32 = 1;

/// Errors that can occur while inspecting a join token.
///
/// Messages are intentionally generic to avoid leaking which check failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Token size exceeds [`MAX_JOIN_TOKEN_SIZE_BYTES`].
    #[error("The join token is invalid or expired")]
    TokenTooLarge,

    /// Token is not a three-segment compact encoding with a JSON payload.
    #[error("The join token is invalid or expired")]
    MalformedToken,

    /// Token `exp` claim is in the past.
    #[error("The join token is invalid or expired")]
    Expired,
}

/// Claim set carried by a join token.
///
/// Field names follow the platform's wire format: `tpc` is the session
/// name, `role_type` the numeric role value.
#[derive(Clone, Serialize, Deserialize)]
pub struct JoinTokenClaims {
    /// SDK application key - redacted in Debug output.
    pub app_key: String,

    /// Session (topic) name the token authorizes.
    pub tpc: String,

    /// Numeric role value (0 = attendee, 1 = host).
    pub role_type: i32,

    /// Claim-set version, always [`JOIN_TOKEN_VERSION`].
    pub version: i32,

    /// Issued-at timestamp (Unix epoch seconds).
    pub iat: i64,

    /// Expiration timestamp (Unix epoch seconds).
    pub exp: i64,
}

impl fmt::Debug for JoinTokenClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JoinTokenClaims")
            .field("app_key", &"[REDACTED]")
            .field("tpc", &self.tpc)
            .field("role_type", &self.role_type)
            .field("version", &self.version)
            .field("iat", &self.iat)
            .field("exp", &self.exp)
            .finish()
    }
}

/// Decode the claim set from a join token WITHOUT verifying the signature.
///
/// The platform's join operation is the authoritative verifier; this helper
/// exists so a client can inspect its own freshly generated token (expiry
/// backstop) and so tests can assert on claim contents.
///
/// # Errors
///
/// - [`TokenError::TokenTooLarge`] - token exceeds the size limit
/// - [`TokenError::MalformedToken`] - not `header.payload.signature`, bad
///   base64url, or payload is not the expected JSON shape
pub fn decode_claims(token: &str) -> Result<JoinTokenClaims, TokenError> {
    // Size check first, before any decoding work.
    if token.len() > MAX_JOIN_TOKEN_SIZE_BYTES {
        tracing::debug!(
            target: "common.jwt",
            token_size = token.len(),
            max_size = MAX_JOIN_TOKEN_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(TokenError::TokenTooLarge);
    }

    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        tracing::debug!(
            target: "common.jwt",
            parts = parts.len(),
            "Token rejected: invalid compact encoding"
        );
        return Err(TokenError::MalformedToken);
    }

    let payload_part = parts.get(1).ok_or(TokenError::MalformedToken)?;
    let payload_bytes = URL_SAFE_NO_PAD.decode(payload_part).map_err(|e| {
        tracing::debug!(target: "common.jwt", error = %e, "Failed to decode token payload base64");
        TokenError::MalformedToken
    })?;

    serde_json::from_slice(&payload_bytes).map_err(|e| {
        tracing::debug!(target: "common.jwt", error = %e, "Failed to parse token payload JSON");
        TokenError::MalformedToken
    })
}

/// Validate the `exp` (expiration) claim against the current wall clock.
///
/// # Errors
///
/// Returns [`TokenError::Expired`] if `exp` is not strictly in the future.
pub fn validate_exp(exp: i64) -> Result<(), TokenError> {
    validate_exp_at(exp, chrono::Utc::now().timestamp())
}

/// Deterministic `exp` validation against an explicit `now` timestamp.
///
/// Prefer [`validate_exp`] in production code; this variant exists so that
/// boundary conditions can be unit-tested without wall-clock dependence.
pub fn validate_exp_at(exp: i64, now: i64) -> Result<(), TokenError> {
    if exp <= now {
        tracing::debug!(
            target: "common.jwt",
            exp = exp,
            now = now,
            "Token rejected: expired"
        );
        return Err(TokenError::Expired);
    }
    Ok(())
}
