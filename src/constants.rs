//! Application constants
//!
//! Centralized location for magic strings and configuration defaults.

/// Content type sent when the operation declares no request media type
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Outbound call timeout when the configuration does not set one
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Directory under the user's home holding config and logs
pub const CONFIG_DIR_NAME: &str = ".tryit";

/// Configuration file name inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Log file name inside the config directory
pub const LOG_FILE_NAME: &str = "tryit.log";

/// Application name
pub const APP_NAME: &str = "tryit";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
