//! Secret types for protecting sensitive values from accidental logging.
//!
//! This module re-exports types from the [`secrecy`] crate with
//! floor-control-specific guidance. Use these types for all sensitive values
//! like the SDK application secret, session passwords, and join tokens held
//! longer than a single call.
//!
//! # Compile-Time Safety
//!
//! `SecretBox<T>` and `SecretString` implement `Debug` with redaction, so any
//! struct that derives `Debug` while holding a secret gets safe logging
//! behavior for free. Accessing the actual value always requires an explicit
//! `expose_secret()` call at the use site.
//!
//! # Memory Safety
//!
//! Secrets are zeroized when dropped, so key material does not linger in
//! memory after the session ends.
//!
//! # Example
//!
//! ```rust
//! use common::secret::SecretString;
//! use secrecy::ExposeSecret;
//!
//! #[derive(Debug)]
//! struct SdkCredentials {
//!     app_key: String,
//!     app_secret: SecretString,  // Debug shows "[REDACTED]"
//! }
//!
//! let creds = SdkCredentials {
//!     app_key: "abc123".to_string(),
//!     app_secret: SecretString::from("do-not-log-me"),
//! };
//!
//! println!("{:?}", creds); // app_secret is redacted
//! let secret: &str = creds.app_secret.expose_secret();
//! # let _ = secret;
//! ```
//!
//! # Usage Guidelines
//!
//! Use `SecretString` for:
//! - The SDK application secret (token signing key)
//! - Session passwords
//!
//! Use `SecretBox<T>` for custom secret types (e.g., raw key bytes).

// Re-export the main types from secrecy
pub use secrecy::{ExposeSecret, SecretBox, SecretString};
