//! Session controller configuration.
//!
//! Configuration is loaded from environment variables. The SDK application
//! key and secret are required; their absence is a fatal startup error, never
//! a runtime retry case. Sensitive fields are redacted in Debug output.

use crate::credential::Role;
use common::secret::SecretString;
use std::collections::HashMap;
use std::env;
use std::fmt;
use thiserror::Error;

/// Default join credential validity window in seconds (2 hours).
pub const DEFAULT_CREDENTIAL_TTL_SECONDS: u64 = 7200;

/// Maximum allowed join credential lifetime in seconds (48 hours).
pub const MAX_CREDENTIAL_TTL_SECONDS: u64 = 172_800;

/// Default dependency asset path handed to the SDK's init capability.
pub const DEFAULT_DEPENDENCY_ASSET_PATH: &str = "Global";

/// Default UI language handed to the SDK's init capability.
pub const DEFAULT_LANGUAGE: &str = "en-US";

/// Prefix for generated display identities.
pub const DEFAULT_IDENTITY_PREFIX: &str = "user";

/// Session controller configuration.
///
/// Loaded from environment variables; the key, secret, and session name are
/// required. Sensitive fields are redacted in Debug output.
#[derive(Clone)]
pub struct Config {
    /// SDK application key (embedded in join credential claims).
    pub sdk_key: String,

    /// SDK application secret used to sign join credentials.
    /// Protected by `SecretString` to prevent accidental logging.
    pub sdk_secret: SecretString,

    /// Session (topic) name to join.
    pub session_name: String,

    /// Display identity presented to other participants.
    pub display_name: String,

    /// Optional session password.
    /// Protected by `SecretString` to prevent accidental logging.
    pub session_password: Option<SecretString>,

    /// Role requested for the join credential.
    pub role: Role,

    /// Join credential validity window in seconds.
    pub credential_ttl_seconds: u64,

    /// Dependency asset path for SDK initialization.
    pub dependency_asset_path: String,

    /// Language for SDK initialization.
    pub language: String,
}

/// Custom Debug implementation that redacts sensitive fields.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("sdk_key", &self.sdk_key)
            .field("sdk_secret", &"[REDACTED]")
            .field("session_name", &self.session_name)
            .field("display_name", &self.display_name)
            .field(
                "session_password",
                &self.session_password.as_ref().map(|_| "[REDACTED]"),
            )
            .field("role", &self.role)
            .field("credential_ttl_seconds", &self.credential_ttl_seconds)
            .field("dependency_asset_path", &self.dependency_asset_path)
            .field("language", &self.language)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when the SDK key, SDK secret,
    /// or session name is absent, and [`ConfigError::InvalidValue`] when a
    /// provided value cannot be parsed or is out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a `HashMap` (for testing).
    ///
    /// # Errors
    ///
    /// See [`Config::from_env`].
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let sdk_key = vars
            .get("VIDEO_SDK_KEY")
            .ok_or_else(|| ConfigError::MissingEnvVar("VIDEO_SDK_KEY".to_string()))?
            .clone();

        let sdk_secret = SecretString::from(
            vars.get("VIDEO_SDK_SECRET")
                .ok_or_else(|| ConfigError::MissingEnvVar("VIDEO_SDK_SECRET".to_string()))?
                .clone(),
        );

        let session_name = vars
            .get("SESSION_NAME")
            .ok_or_else(|| ConfigError::MissingEnvVar("SESSION_NAME".to_string()))?
            .clone();

        // Generate a display identity when none is configured.
        let display_name = vars.get("SESSION_DISPLAY_NAME").cloned().unwrap_or_else(|| {
            let uuid_suffix = uuid::Uuid::new_v4().to_string();
            let short_suffix = uuid_suffix.get(..8).unwrap_or("00000000");
            format!("{DEFAULT_IDENTITY_PREFIX}-{short_suffix}")
        });

        let session_password = vars
            .get("SESSION_PASSWORD")
            .cloned()
            .map(SecretString::from);

        let role = match vars.get("SESSION_ROLE") {
            Some(value) => Role::parse(value).ok_or_else(|| {
                ConfigError::InvalidValue(format!(
                    "SESSION_ROLE must be 'host' or 'attendee', got '{value}'"
                ))
            })?,
            None => Role::Host,
        };

        let credential_ttl_seconds = match vars.get("CREDENTIAL_TTL_SECONDS") {
            Some(value) => {
                let parsed: u64 = value.parse().map_err(|_| {
                    ConfigError::InvalidValue(format!(
                        "CREDENTIAL_TTL_SECONDS must be an integer, got '{value}'"
                    ))
                })?;
                if parsed == 0 || parsed > MAX_CREDENTIAL_TTL_SECONDS {
                    return Err(ConfigError::InvalidValue(format!(
                        "CREDENTIAL_TTL_SECONDS must be in 1..={MAX_CREDENTIAL_TTL_SECONDS}, got {parsed}"
                    )));
                }
                parsed
            }
            None => DEFAULT_CREDENTIAL_TTL_SECONDS,
        };

        let dependency_asset_path = vars
            .get("SDK_DEPENDENCY_ASSET_PATH")
            .cloned()
            .unwrap_or_else(|| DEFAULT_DEPENDENCY_ASSET_PATH.to_string());

        let language = vars
            .get("SDK_LANGUAGE")
            .cloned()
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

        Ok(Config {
            sdk_key,
            sdk_secret,
            session_name,
            display_name,
            session_password,
            role,
            credential_ttl_seconds,
            dependency_asset_path,
            language,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use common::secret::ExposeSecret;

    fn base_vars() -> HashMap<String, String> {
        HashMap::from([
            ("VIDEO_SDK_KEY".to_string(), "key-abc".to_string()),
            ("VIDEO_SDK_SECRET".to_string(), "secret-0123456789".to_string()),
            ("SESSION_NAME".to_string(), "standup".to_string()),
        ])
    }

    #[test]
    fn test_from_vars_success_with_defaults() {
        let config = Config::from_vars(&base_vars()).expect("Config should load successfully");

        assert_eq!(config.sdk_key, "key-abc");
        assert_eq!(config.sdk_secret.expose_secret(), "secret-0123456789");
        assert_eq!(config.session_name, "standup");
        assert_eq!(config.role, Role::Host);
        assert_eq!(config.credential_ttl_seconds, DEFAULT_CREDENTIAL_TTL_SECONDS);
        assert_eq!(config.dependency_asset_path, DEFAULT_DEPENDENCY_ASSET_PATH);
        assert_eq!(config.language, DEFAULT_LANGUAGE);
        assert!(config.session_password.is_none());
        // Display identity should be auto-generated
        assert!(config.display_name.starts_with("user-"));
    }

    #[test]
    fn test_from_vars_success_with_custom_values() {
        let mut vars = base_vars();
        vars.insert("SESSION_DISPLAY_NAME".to_string(), "alice".to_string());
        vars.insert("SESSION_PASSWORD".to_string(), "hunter2".to_string());
        vars.insert("SESSION_ROLE".to_string(), "attendee".to_string());
        vars.insert("CREDENTIAL_TTL_SECONDS".to_string(), "3600".to_string());
        vars.insert("SDK_DEPENDENCY_ASSET_PATH".to_string(), "CDN".to_string());
        vars.insert("SDK_LANGUAGE".to_string(), "de-DE".to_string());

        let config = Config::from_vars(&vars).expect("Config should load successfully");

        assert_eq!(config.display_name, "alice");
        assert_eq!(
            config.session_password.as_ref().unwrap().expose_secret(),
            "hunter2"
        );
        assert_eq!(config.role, Role::Attendee);
        assert_eq!(config.credential_ttl_seconds, 3600);
        assert_eq!(config.dependency_asset_path, "CDN");
        assert_eq!(config.language, "de-DE");
    }

    #[test]
    fn test_from_vars_missing_sdk_key() {
        let mut vars = base_vars();
        vars.remove("VIDEO_SDK_KEY");

        let result = Config::from_vars(&vars);
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(v)) if v == "VIDEO_SDK_KEY"));
    }

    #[test]
    fn test_from_vars_missing_sdk_secret() {
        let mut vars = base_vars();
        vars.remove("VIDEO_SDK_SECRET");

        let result = Config::from_vars(&vars);
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(v)) if v == "VIDEO_SDK_SECRET"));
    }

    #[test]
    fn test_from_vars_missing_session_name() {
        let mut vars = base_vars();
        vars.remove("SESSION_NAME");

        let result = Config::from_vars(&vars);
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(v)) if v == "SESSION_NAME"));
    }

    #[test]
    fn test_invalid_role_rejected() {
        let mut vars = base_vars();
        vars.insert("SESSION_ROLE".to_string(), "moderator".to_string());

        let result = Config::from_vars(&vars);
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_ttl_bounds() {
        let mut vars = base_vars();
        vars.insert("CREDENTIAL_TTL_SECONDS".to_string(), "0".to_string());
        assert!(matches!(
            Config::from_vars(&vars),
            Err(ConfigError::InvalidValue(_))
        ));

        vars.insert(
            "CREDENTIAL_TTL_SECONDS".to_string(),
            (MAX_CREDENTIAL_TTL_SECONDS + 1).to_string(),
        );
        assert!(matches!(
            Config::from_vars(&vars),
            Err(ConfigError::InvalidValue(_))
        ));

        vars.insert(
            "CREDENTIAL_TTL_SECONDS".to_string(),
            MAX_CREDENTIAL_TTL_SECONDS.to_string(),
        );
        assert!(Config::from_vars(&vars).is_ok());
    }

    #[test]
    fn test_ttl_not_numeric_rejected() {
        let mut vars = base_vars();
        vars.insert("CREDENTIAL_TTL_SECONDS".to_string(), "later".to_string());
        assert!(matches!(
            Config::from_vars(&vars),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_debug_redacts_sensitive_fields() {
        let mut vars = base_vars();
        vars.insert("SESSION_PASSWORD".to_string(), "hunter2".to_string());
        let config = Config::from_vars(&vars).expect("Config should load successfully");

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("secret-0123456789"));
        assert!(!debug_output.contains("hunter2"));
    }
}
