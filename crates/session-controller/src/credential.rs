//! Join credential generator.
//!
//! Produces the signed, time-bound token that authorizes a client to join a
//! named session with a chosen role. The claim set and compact encoding
//! follow the platform's wire format ([`common::jwt::JoinTokenClaims`],
//! `header.payload.signature` with base64url segments, HS256 signature over
//! the application secret).
//!
//! Generation is pure with respect to external state: for fixed inputs and a
//! fixed `now_fn` the output is fully deterministic. The secret is only ever
//! borrowed for the signing call and never logged.

use common::jwt::{JoinTokenClaims, JOIN_TOKEN_VERSION};
use common::secret::{ExposeSecret, SecretString};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Maximum credential lifetime (48 hours).
///
/// A validity window above this is a configuration mistake, not a longer
/// session.
pub const MAX_CREDENTIAL_LIFETIME: Duration = Duration::from_secs(48 * 60 * 60);

/// Role a credential authorizes within the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Regular participant.
    Attendee,
    /// Session host.
    Host,
}

impl Role {
    /// Numeric role value used in the platform claim set.
    #[must_use]
    pub fn wire_value(self) -> i32 {
        match self {
            Role::Attendee => 0,
            Role::Host => 1,
        }
    }

    /// Parse a role from its configuration spelling.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "host" => Some(Role::Host),
            "attendee" => Some(Role::Attendee),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Attendee => write!(f, "attendee"),
            Role::Host => write!(f, "host"),
        }
    }
}

/// Identity a join credential is issued for.
///
/// Immutable once a join is in flight; a fresh credential is generated per
/// join attempt and never reused across sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    /// Session (topic) name.
    pub session_name: String,
    /// Display identity of the joining user.
    pub user_identity: String,
    /// Requested role.
    pub role: Role,
}

/// A signed, time-bound join credential.
///
/// The token itself is bearer material and is redacted in Debug output.
#[derive(Clone)]
pub struct Credential {
    /// Compact encoded signed token.
    pub token: String,
    /// Issued-at timestamp (Unix epoch seconds).
    pub issued_at: i64,
    /// Expiration timestamp (Unix epoch seconds).
    pub expires_at: i64,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"[REDACTED]")
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl Credential {
    /// Whether the credential is already expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at <= now
    }

    /// Whether the credential expires within `margin` of `now`.
    ///
    /// A join should not be attempted with a credential this close to
    /// expiry; the join operation's own rejection remains the authoritative
    /// backstop.
    #[must_use]
    pub fn expires_within(&self, margin: Duration, now: i64) -> bool {
        let margin_secs = i64::try_from(margin.as_secs()).unwrap_or(i64::MAX);
        self.expires_at <= now.saturating_add(margin_secs)
    }
}

/// Errors from credential generation.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Session name or user identity is empty.
    #[error("session name and user identity must be non-empty")]
    InvalidIdentity,

    /// Validity window is zero or exceeds [`MAX_CREDENTIAL_LIFETIME`].
    #[error("credential validity window out of range")]
    InvalidValidity,

    /// The signing secret is unusable.
    #[error("malformed signing key")]
    MalformedKey,

    /// The signing operation itself failed.
    #[error("credential signing failed: {0}")]
    Signing(String),
}

/// Generate a signed join credential.
///
/// The claim set contains the application key, session name, role, issue
/// time, and expiry time (`issued_at + validity`). `now_fn` supplies the
/// issue timestamp so generation stays deterministic under test.
///
/// # Errors
///
/// - [`CredentialError::InvalidIdentity`] for an empty session name or user
///   identity
/// - [`CredentialError::InvalidValidity`] for a zero or oversized validity
///   window
/// - [`CredentialError::MalformedKey`] for an empty signing secret
/// - [`CredentialError::Signing`] when the signing operation fails; no
///   partially-signed token is ever returned
pub fn generate(
    identity: &SessionIdentity,
    sdk_key: &str,
    sdk_secret: &SecretString,
    validity: Duration,
    now_fn: impl Fn() -> i64,
) -> Result<Credential, CredentialError> {
    if identity.session_name.trim().is_empty() || identity.user_identity.trim().is_empty() {
        return Err(CredentialError::InvalidIdentity);
    }
    if validity.is_zero() || validity > MAX_CREDENTIAL_LIFETIME {
        return Err(CredentialError::InvalidValidity);
    }
    if sdk_secret.expose_secret().is_empty() {
        return Err(CredentialError::MalformedKey);
    }

    // Bounded by MAX_CREDENTIAL_LIFETIME, so the cast cannot fail.
    let validity_secs =
        i64::try_from(validity.as_secs()).map_err(|_| CredentialError::InvalidValidity)?;

    let issued_at = now_fn();
    let expires_at = issued_at + validity_secs;

    let claims = JoinTokenClaims {
        app_key: sdk_key.to_string(),
        tpc: identity.session_name.clone(),
        role_type: identity.role.wire_value(),
        version: JOIN_TOKEN_VERSION,
        iat: issued_at,
        exp: expires_at,
    };

    let encoding_key = EncodingKey::from_secret(sdk_secret.expose_secret().as_bytes());
    let token = encode(&Header::new(Algorithm::HS256), &claims, &encoding_key)
        .map_err(|e| CredentialError::Signing(e.to_string()))?;

    tracing::debug!(
        target: "sc.credential",
        session = %identity.session_name,
        role = %identity.role,
        issued_at = issued_at,
        expires_at = expires_at,
        "Join credential generated"
    );

    Ok(Credential {
        token,
        issued_at,
        expires_at,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use common::jwt::decode_claims;

    const NOW: i64 = 1_700_000_000;
    const VALIDITY: Duration = Duration::from_secs(7200);

    fn identity() -> SessionIdentity {
        SessionIdentity {
            session_name: "standup".to_string(),
            user_identity: "alice".to_string(),
            role: Role::Host,
        }
    }

    fn secret() -> SecretString {
        SecretString::from("test-signing-secret")
    }

    #[test]
    fn test_generated_claims_match_inputs() {
        let credential =
            generate(&identity(), "key-abc", &secret(), VALIDITY, || NOW).unwrap();

        assert_eq!(credential.issued_at, NOW);
        assert_eq!(credential.expires_at, NOW + 7200);

        let claims = decode_claims(&credential.token).unwrap();
        assert_eq!(claims.app_key, "key-abc");
        assert_eq!(claims.tpc, "standup");
        assert_eq!(claims.role_type, 1);
        assert_eq!(claims.version, JOIN_TOKEN_VERSION);
        assert_eq!(claims.iat, NOW);
        assert_eq!(claims.exp, NOW + 7200);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let first = generate(&identity(), "key-abc", &secret(), VALIDITY, || NOW).unwrap();
        let second = generate(&identity(), "key-abc", &secret(), VALIDITY, || NOW).unwrap();

        // HS256 is deterministic, so the full encoded token matches.
        assert_eq!(first.token, second.token);
    }

    #[test]
    fn test_different_now_changes_only_timestamps() {
        let first = generate(&identity(), "key-abc", &secret(), VALIDITY, || NOW).unwrap();
        let second =
            generate(&identity(), "key-abc", &secret(), VALIDITY, || NOW + 60).unwrap();

        let a = decode_claims(&first.token).unwrap();
        let b = decode_claims(&second.token).unwrap();

        assert_ne!(a.iat, b.iat);
        assert_ne!(a.exp, b.exp);
        assert_eq!(a.app_key, b.app_key);
        assert_eq!(a.tpc, b.tpc);
        assert_eq!(a.role_type, b.role_type);
        assert_eq!(a.version, b.version);
    }

    #[test]
    fn test_empty_session_name_rejected() {
        let mut id = identity();
        id.session_name = "  ".to_string();

        let result = generate(&id, "key-abc", &secret(), VALIDITY, || NOW);
        assert!(matches!(result, Err(CredentialError::InvalidIdentity)));
    }

    #[test]
    fn test_empty_user_identity_rejected() {
        let mut id = identity();
        id.user_identity = String::new();

        let result = generate(&id, "key-abc", &secret(), VALIDITY, || NOW);
        assert!(matches!(result, Err(CredentialError::InvalidIdentity)));
    }

    #[test]
    fn test_zero_validity_rejected() {
        let result = generate(&identity(), "key-abc", &secret(), Duration::ZERO, || NOW);
        assert!(matches!(result, Err(CredentialError::InvalidValidity)));
    }

    #[test]
    fn test_oversized_validity_rejected() {
        let too_long = MAX_CREDENTIAL_LIFETIME + Duration::from_secs(1);
        let result = generate(&identity(), "key-abc", &secret(), too_long, || NOW);
        assert!(matches!(result, Err(CredentialError::InvalidValidity)));
    }

    #[test]
    fn test_empty_secret_rejected() {
        let result = generate(
            &identity(),
            "key-abc",
            &SecretString::from(""),
            VALIDITY,
            || NOW,
        );
        assert!(matches!(result, Err(CredentialError::MalformedKey)));
    }

    #[test]
    fn test_expiry_helpers() {
        let credential =
            generate(&identity(), "key-abc", &secret(), VALIDITY, || NOW).unwrap();

        assert!(!credential.is_expired_at(NOW));
        assert!(!credential.is_expired_at(NOW + 7199));
        assert!(credential.is_expired_at(NOW + 7200));

        assert!(!credential.expires_within(Duration::from_secs(60), NOW));
        assert!(credential.expires_within(Duration::from_secs(60), NOW + 7150));
    }

    #[test]
    fn test_attendee_wire_value() {
        let mut id = identity();
        id.role = Role::Attendee;

        let credential = generate(&id, "key-abc", &secret(), VALIDITY, || NOW).unwrap();
        let claims = decode_claims(&credential.token).unwrap();
        assert_eq!(claims.role_type, 0);
    }

    #[test]
    fn test_debug_redacts_token() {
        let credential =
            generate(&identity(), "key-abc", &secret(), VALIDITY, || NOW).unwrap();

        let debug_str = format!("{credential:?}");
        assert!(debug_str.contains("[REDACTED]"));
        assert!(!debug_str.contains(&credential.token));
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("host"), Some(Role::Host));
        assert_eq!(Role::parse("HOST"), Some(Role::Host));
        assert_eq!(Role::parse("attendee"), Some(Role::Attendee));
        assert_eq!(Role::parse("moderator"), None);
    }
}
