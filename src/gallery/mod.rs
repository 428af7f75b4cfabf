//! Saving receipts into the shared photo gallery
//!
//! Two operations:
//! - **scan**: make an existing file visible in the gallery
//! - **save**: persist raw image bytes as a new gallery entry
//!
//! Both land in the `CheezReceipts` album under the public pictures collection. How
//! they get there depends on the [`MediaStrategy`] picked once from the host's media
//! capability:
//!
//! | Strategy | scan | save |
//! |---|---|---|
//! | `MediaIndex` | insert record, copy file bytes into it | insert record, stream bytes into it |
//! | `DirectFile` | scanner broadcast for the path | write file into the album, scanner broadcast |
//!
//! Failures never reach the channel caller. Scans are fire-and-forget; saves answer
//! with a boolean.

pub mod legacy;
pub mod media_index;
pub mod naming;

use crate::channel::{MethodCall, MethodHandler, MethodResponse};
use crate::config::BridgeConfig;
use crate::error::Result;
use crate::platform::{HostPlatform, MediaCapability, MediaRecord};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const METHOD_SCAN_FILE: &str = "scanFile";
pub const METHOD_SAVE_IMAGE_TO_GALLERY: &str = "saveImageToGallery";

/// How images are persisted, chosen once per service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaStrategy {
    /// Insert records into the unified media index
    MediaIndex,
    /// Write files directly and ask the scanner to index them
    DirectFile,
}

impl From<MediaCapability> for MediaStrategy {
    fn from(capability: MediaCapability) -> Self {
        match capability {
            MediaCapability::Modern => MediaStrategy::MediaIndex,
            MediaCapability::Legacy => MediaStrategy::DirectFile,
        }
    }
}

/// Result of a scan request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The file was copied into a new media record
    Indexed { uri: String },
    /// The scanner was asked to index the file in place
    Broadcast { uri: String },
    /// The path does not name an existing file
    Skipped,
}

/// Where a saved image ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SavedImage {
    Indexed { uri: String },
    Written { path: PathBuf, uri: String },
}

pub struct GalleryService {
    host: Arc<dyn HostPlatform>,
    config: Arc<BridgeConfig>,
    strategy: MediaStrategy,
}

impl GalleryService {
    /// Build a service, reading the host's media capability once
    pub fn new(host: Arc<dyn HostPlatform>, config: Arc<BridgeConfig>) -> Self {
        let strategy = MediaStrategy::from(host.media_capability());
        tracing::info!(platform = host.platform_name(), ?strategy, "Gallery strategy selected");
        Self {
            host,
            config,
            strategy,
        }
    }

    pub fn strategy(&self) -> MediaStrategy {
        self.strategy
    }

    /// Make an existing file visible in the gallery
    pub fn scan_into_gallery(&self, path: &Path) -> Result<ScanOutcome> {
        if !path.exists() {
            return Ok(ScanOutcome::Skipped);
        }

        match self.strategy {
            MediaStrategy::MediaIndex => {
                let record = self.record_for(&path.file_name().unwrap_or_default().to_string_lossy());
                let mut file = File::open(path)?;
                let handle = media_index::insert_and_copy(self.host.as_ref(), &record, &mut file)?;
                Ok(ScanOutcome::Indexed { uri: handle.uri })
            }
            MediaStrategy::DirectFile => {
                let uri = legacy::request_scan(self.host.as_ref(), path)?;
                Ok(ScanOutcome::Broadcast { uri })
            }
        }
    }

    /// Persist `bytes` as a new gallery entry named `file_name`
    pub fn save_bytes(&self, bytes: &[u8], file_name: &str) -> Result<SavedImage> {
        let file_name = naming::validate_file_name(file_name)?;

        match self.strategy {
            MediaStrategy::MediaIndex => {
                let record = self.record_for(file_name);
                let mut content = bytes;
                let handle = media_index::insert_and_copy(self.host.as_ref(), &record, &mut content)?;
                Ok(SavedImage::Indexed { uri: handle.uri })
            }
            MediaStrategy::DirectFile => {
                let path = legacy::write_to_album(self.host.as_ref(), &self.config, bytes, file_name)?;
                let uri = legacy::request_scan(self.host.as_ref(), &path)?;
                Ok(SavedImage::Written { path, uri })
            }
        }
    }

    /// Scan, logging instead of returning failures
    pub fn scan_file(&self, path: &str) {
        match self.scan_into_gallery(Path::new(path)) {
            Ok(ScanOutcome::Skipped) => tracing::debug!(path, "Scan skipped, file does not exist"),
            Ok(outcome) => tracing::info!(path, ?outcome, "File scanned into gallery"),
            Err(e) => tracing::error!(path, error = %e, "Failed to scan file into gallery"),
        }
    }

    /// Save, collapsing every failure to `false`
    pub fn save_image(&self, bytes: &[u8], file_name: &str) -> bool {
        match self.save_bytes(bytes, file_name) {
            Ok(saved) => {
                tracing::info!(file_name, bytes = bytes.len(), ?saved, "Image saved to gallery");
                true
            }
            Err(e) => {
                tracing::error!(file_name, error = %e, "Failed to save image to gallery");
                false
            }
        }
    }

    fn record_for(&self, display_name: &str) -> MediaRecord {
        MediaRecord {
            display_name: display_name.to_string(),
            mime_type: self.config.image_mime_type.clone(),
            relative_path: self.config.album_relative_path(),
        }
    }
}

/// Channel exposing [`GalleryService`]
pub struct GalleryChannel {
    name: String,
    config: Arc<BridgeConfig>,
    service: GalleryService,
}

impl GalleryChannel {
    pub fn new(host: Arc<dyn HostPlatform>, config: Arc<BridgeConfig>) -> Self {
        Self {
            name: config.gallery_channel.clone(),
            service: GalleryService::new(host, Arc::clone(&config)),
            config,
        }
    }

    pub fn service(&self) -> &GalleryService {
        &self.service
    }

    fn scan_file(&self, call: &MethodCall) -> MethodResponse {
        let Some(path) = call.argument_str("path") else {
            return MethodResponse::invalid_argument("File path is null");
        };

        self.service.scan_file(path);
        MethodResponse::success(true)
    }

    fn save_image_to_gallery(&self, call: &MethodCall) -> MethodResponse {
        let bytes = match call.argument_bytes("imageBytes") {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return MethodResponse::invalid_argument("Image bytes is null"),
            Err(e) => return MethodResponse::from_error(&e),
        };

        let file_name = match call.argument_str("fileName") {
            Some(name) => name.to_string(),
            None => naming::default_file_name(&self.config, chrono::Utc::now()),
        };

        MethodResponse::success(self.service.save_image(&bytes, &file_name))
    }
}

impl MethodHandler for GalleryChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn handle(&self, call: &MethodCall) -> MethodResponse {
        match call.method.as_str() {
            METHOD_SCAN_FILE => self.scan_file(call),
            METHOD_SAVE_IMAGE_TO_GALLERY => self.save_image_to_gallery(call),
            other => {
                tracing::warn!(channel = %self.name, method = other, "Method not implemented");
                MethodResponse::NotImplemented
            }
        }
    }
}
