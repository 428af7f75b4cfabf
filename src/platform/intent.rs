//! Platform-neutral description of an Android intent
//!
//! The bridge builds these values and hands them to a [`HostPlatform`](super::HostPlatform);
//! only the host turns them into real `android.content.Intent` objects.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const ACTION_SEND: &str = "android.intent.action.SEND";
pub const ACTION_VIEW: &str = "android.intent.action.VIEW";
pub const ACTION_MEDIA_SCANNER_SCAN_FILE: &str = "android.intent.action.MEDIA_SCANNER_SCAN_FILE";

pub const EXTRA_STREAM: &str = "android.intent.extra.STREAM";
pub const EXTRA_TEXT: &str = "android.intent.extra.TEXT";

pub const FLAG_GRANT_READ_URI_PERMISSION: i32 = 0x0000_0001;
pub const FLAG_ACTIVITY_NEW_TASK: i32 = 0x1000_0000;

/// Value attached to an intent extra
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntentExtra {
    /// Plain string extra (`putExtra(String, String)`)
    Text(String),
    /// URI extra (`putExtra(String, Parcelable)` with a `Uri`)
    Stream(String),
}

/// An action to dispatch or broadcast
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    pub action: String,
    pub data: Option<String>,
    pub mime_type: Option<String>,
    pub package: Option<String>,
    pub extras: BTreeMap<String, IntentExtra>,
    pub flags: i32,
}

impl Intent {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            ..Default::default()
        }
    }

    pub fn with_data(mut self, uri: impl Into<String>) -> Self {
        self.data = Some(uri.into());
        self
    }

    pub fn with_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: IntentExtra) -> Self {
        self.extras.insert(key.into(), value);
        self
    }

    pub fn add_flags(mut self, flags: i32) -> Self {
        self.flags |= flags;
        self
    }

    pub fn has_flag(&self, flag: i32) -> bool {
        self.flags & flag == flag
    }

    /// URI attached as `EXTRA_STREAM`, if any
    pub fn stream(&self) -> Option<&str> {
        match self.extras.get(EXTRA_STREAM) {
            Some(IntentExtra::Stream(uri)) => Some(uri),
            _ => None,
        }
    }

    /// Package name used in error messages and logs
    pub fn package_or_any(&self) -> &str {
        self.package.as_deref().unwrap_or("*")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_accumulate() {
        let intent = Intent::new(ACTION_SEND)
            .add_flags(FLAG_GRANT_READ_URI_PERMISSION)
            .add_flags(FLAG_ACTIVITY_NEW_TASK);
        assert!(intent.has_flag(FLAG_GRANT_READ_URI_PERMISSION));
        assert!(intent.has_flag(FLAG_ACTIVITY_NEW_TASK));
        assert_eq!(intent.flags, 0x1000_0001);
    }

    #[test]
    fn test_stream_extra_lookup() {
        let intent = Intent::new(ACTION_SEND)
            .with_extra(EXTRA_TEXT, IntentExtra::Text("hi".into()))
            .with_extra(EXTRA_STREAM, IntentExtra::Stream("content://a/b".into()));
        assert_eq!(intent.stream(), Some("content://a/b"));
        assert_eq!(Intent::new(ACTION_VIEW).stream(), None);
    }
}
