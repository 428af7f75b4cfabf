//! Bridge configuration
//!
//! All values default to what the receipt app ships with, so a host can install the
//! bridge without any configuration at all. Partial JSON documents are accepted;
//! missing fields keep their defaults.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Channel names, messaging target, and gallery layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Name of the sharing channel
    pub sharing_channel: String,

    /// Name of the gallery channel
    pub gallery_channel: String,

    /// Package identifier of the messaging app that receives shares
    pub messenger_package: String,

    /// Deep-link base used by the contact fallback; the contact is appended as a path segment
    pub contact_link_base: String,

    /// Descriptive text attached to the share action
    pub share_text: String,

    /// MIME type for shared and saved images
    pub image_mime_type: String,

    /// Album folder under the public pictures collection
    pub album_name: String,

    /// Public pictures collection, relative to external storage
    pub pictures_relative_dir: String,

    /// Appended to the app package to form the file-provider authority
    pub file_provider_suffix: String,

    /// Prefix of generated file names
    pub default_file_prefix: String,

    /// Extension of generated file names (without dot)
    pub default_file_extension: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            sharing_channel: "com.example.cheez_admin_app/whatsapp".to_string(),
            gallery_channel: "com.example.cheez_admin_app/gallery".to_string(),
            messenger_package: "com.whatsapp".to_string(),
            contact_link_base: "https://wa.me/".to_string(),
            share_text: "Receipt for your order".to_string(),
            image_mime_type: "image/png".to_string(),
            album_name: "CheezReceipts".to_string(),
            pictures_relative_dir: "Pictures".to_string(),
            file_provider_suffix: ".fileprovider".to_string(),
            default_file_prefix: "Receipt_".to_string(),
            default_file_extension: "png".to_string(),
        }
    }
}

impl BridgeConfig {
    /// Parse a (possibly partial) JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Media-index relative path of the album, e.g. `Pictures/CheezReceipts`
    pub fn album_relative_path(&self) -> String {
        format!(
            "{}/{}",
            self.pictures_relative_dir.trim_end_matches('/'),
            self.album_name
        )
    }

    /// File-provider authority for an application package
    pub fn file_provider_authority(&self, app_package: &str) -> String {
        format!("{app_package}{}", self.file_provider_suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.messenger_package, "com.whatsapp");
        assert_eq!(config.album_relative_path(), "Pictures/CheezReceipts");
        assert_eq!(
            config.file_provider_authority("com.example.cheez_admin_app"),
            "com.example.cheez_admin_app.fileprovider"
        );
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = BridgeConfig::from_json(r#"{"album_name": "Invoices"}"#).unwrap();
        assert_eq!(config.album_name, "Invoices");
        assert_eq!(config.image_mime_type, "image/png");
        assert_eq!(config.album_relative_path(), "Pictures/Invoices");
    }

    #[test]
    fn test_invalid_json_is_serialization_error() {
        let err = BridgeConfig::from_json("{not json").unwrap_err();
        assert_eq!(err.code(), "SERIALIZATION_ERROR");
    }
}
