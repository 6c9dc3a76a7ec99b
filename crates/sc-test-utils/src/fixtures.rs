//! Pre-configured fixtures for controller tests.

use session_controller::config::Config;
use std::collections::HashMap;

/// SDK application key used throughout the test suite.
pub const TEST_SDK_KEY: &str = "test-sdk-key";

/// SDK application secret used throughout the test suite.
pub const TEST_SDK_SECRET: &str = "test-sdk-secret-0123456789";

/// Session name used throughout the test suite.
pub const TEST_SESSION_NAME: &str = "test-session";

/// Display name of the local test user.
pub const TEST_DISPLAY_NAME: &str = "alice";

/// Environment map with the required variables set.
#[must_use]
pub fn test_vars() -> HashMap<String, String> {
    HashMap::from([
        ("VIDEO_SDK_KEY".to_string(), TEST_SDK_KEY.to_string()),
        ("VIDEO_SDK_SECRET".to_string(), TEST_SDK_SECRET.to_string()),
        ("SESSION_NAME".to_string(), TEST_SESSION_NAME.to_string()),
        (
            "SESSION_DISPLAY_NAME".to_string(),
            TEST_DISPLAY_NAME.to_string(),
        ),
    ])
}

/// A ready-to-use configuration for controller tests.
///
/// # Panics
///
/// Panics if the fixture variables are inconsistent; that is a bug in the
/// test suite, not in the controller.
#[must_use]
pub fn test_config() -> Config {
    Config::from_vars(&test_vars()).expect("test fixture config must load")
}

/// A configuration with extra variables merged over [`test_vars`].
///
/// # Panics
///
/// Panics if the resulting variables do not form a valid configuration.
#[must_use]
pub fn test_config_with(extra: &[(&str, &str)]) -> Config {
    let mut vars = test_vars();
    for (key, value) in extra {
        vars.insert((*key).to_string(), (*value).to_string());
    }
    Config::from_vars(&vars).expect("test fixture config must load")
}
