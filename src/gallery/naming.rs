//! Gallery file names

use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};
use chrono::{DateTime, Utc};

/// `Receipt_<unix millis>.png` for the given instant
pub fn default_file_name(config: &BridgeConfig, now: DateTime<Utc>) -> String {
    format!(
        "{}{}.{}",
        config.default_file_prefix,
        now.timestamp_millis(),
        config.default_file_extension
    )
}

/// Reject names that are empty or would resolve outside the album directory
pub fn validate_file_name(name: &str) -> Result<&str> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
        return Err(BridgeError::InvalidFileName(name.to_string()));
    }
    Ok(name)
}
