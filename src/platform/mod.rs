//! Host platform capabilities
//!
//! The bridge never touches the operating system directly. Everything it needs from
//! the host (file-provider URIs, activity dispatch, broadcasts, the media index) goes
//! through [`HostPlatform`], which keeps the sharing and gallery logic testable off
//! device.
//!
//! # Implementations
//! - [`android::AndroidHost`] - JNI calls into the hosting Activity (Android only)
//! - [`directory::DirectoryHost`] - a directory tree standing in for external storage

pub mod directory;
pub mod intent;

#[cfg(target_os = "android")]
pub mod android;

pub use directory::DirectoryHost;
pub use intent::{Intent, IntentExtra};

use crate::error::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// First Android API level with a unified media index (`RELATIVE_PATH` support)
pub const MODERN_MEDIA_API_LEVEL: i32 = 29;

/// Which media persistence scheme the host supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaCapability {
    /// Records are inserted into the media index and written through its streams
    Modern,
    /// Files are written directly and the background scanner is asked to pick them up
    Legacy,
}

impl MediaCapability {
    pub fn from_api_level(api_level: i32) -> Self {
        if api_level >= MODERN_MEDIA_API_LEVEL {
            MediaCapability::Modern
        } else {
            MediaCapability::Legacy
        }
    }
}

/// Column values for a new media-index record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRecord {
    pub display_name: String,
    pub mime_type: String,
    /// Path relative to external storage, e.g. `Pictures/CheezReceipts`
    pub relative_path: String,
}

/// Handle to a record created by the media index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaHandle {
    pub uri: String,
}

/// Capabilities the bridge needs from the operating system
///
/// Implementations must be shareable across threads; every method is called on the
/// caller's thread and must not retain per-call state.
pub trait HostPlatform: Send + Sync {
    /// Short name for logs
    fn platform_name(&self) -> &str;

    /// Media persistence scheme, read once when the gallery service is built
    fn media_capability(&self) -> MediaCapability;

    /// Package identifier of the hosting app
    fn app_package(&self) -> Result<String>;

    /// Shareable `content://` URI for a file owned by the app, issued by the file
    /// provider registered under `authority`
    fn resolve_shareable_uri(&self, path: &Path, authority: &str) -> Result<String>;

    /// Start an activity for the intent
    fn dispatch_intent(&self, intent: &Intent) -> Result<()>;

    /// Send the intent as a broadcast
    fn send_broadcast(&self, intent: &Intent) -> Result<()>;

    /// Insert a record into the media index; `Ok(None)` when the index refuses it
    fn insert_media_record(&self, record: &MediaRecord) -> Result<Option<MediaHandle>>;

    /// Output stream for a record; `Ok(None)` when the index has no stream for it.
    /// The stream is closed when dropped.
    fn open_output_stream(&self, handle: &MediaHandle) -> Result<Option<Box<dyn Write + '_>>>;

    /// Absolute path of the public pictures directory
    fn public_pictures_dir(&self) -> Result<PathBuf>;
}

/// `file://` URI for a path, as produced by `Uri.fromFile`
pub fn file_uri(path: &Path) -> Result<String> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    url::Url::from_file_path(&absolute)
        .map(|u| u.to_string())
        .map_err(|_| BridgeError::platform("file_uri", absolute.display()))
}
