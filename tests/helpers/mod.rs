//! Test helpers for channel integration tests
//!
//! [`RecordingHost`] wraps a [`DirectoryHost`] in a temp dir and lets a test break
//! individual platform capabilities.

#![allow(dead_code)]

use cheez_bridge::error::{BridgeError, Result};
use cheez_bridge::platform::{HostPlatform, Intent, MediaHandle, MediaRecord};
use cheez_bridge::{Bridge, BridgeConfig, DirectoryHost, MediaCapability};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Platform failures a test can switch on
#[derive(Default)]
pub struct Faults {
    pub resolve_uri: AtomicBool,
    pub dispatch: AtomicBool,
    pub refuse_insert: AtomicBool,
    pub no_stream: AtomicBool,
    pub write: AtomicBool,
}

pub struct RecordingHost {
    pub inner: DirectoryHost,
    pub faults: Faults,
    pub inserts: AtomicUsize,
}

impl RecordingHost {
    pub fn new(root: &Path, capability: MediaCapability) -> Self {
        Self {
            inner: DirectoryHost::new(root).with_capability(capability),
            faults: Faults::default(),
            inserts: AtomicUsize::new(0),
        }
    }

    pub fn fail(flag: &AtomicBool) {
        flag.store(true, Ordering::SeqCst);
    }

    pub fn dispatched(&self) -> Vec<Intent> {
        self.inner.dispatched_intents()
    }

    pub fn broadcasts(&self) -> Vec<Intent> {
        self.inner.broadcasts()
    }

    pub fn insert_count(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }
}

impl HostPlatform for RecordingHost {
    fn platform_name(&self) -> &str {
        "Recording"
    }

    fn media_capability(&self) -> MediaCapability {
        self.inner.media_capability()
    }

    fn app_package(&self) -> Result<String> {
        self.inner.app_package()
    }

    fn resolve_shareable_uri(&self, path: &Path, authority: &str) -> Result<String> {
        if self.faults.resolve_uri.load(Ordering::SeqCst) {
            return Err(BridgeError::Platform(
                "Failed to find configured root".to_string(),
            ));
        }
        self.inner.resolve_shareable_uri(path, authority)
    }

    fn dispatch_intent(&self, intent: &Intent) -> Result<()> {
        if self.faults.dispatch.load(Ordering::SeqCst) {
            return Err(BridgeError::Platform("ActivityNotFoundException".to_string()));
        }
        self.inner.dispatch_intent(intent)
    }

    fn send_broadcast(&self, intent: &Intent) -> Result<()> {
        self.inner.send_broadcast(intent)
    }

    fn insert_media_record(&self, record: &MediaRecord) -> Result<Option<MediaHandle>> {
        if self.faults.refuse_insert.load(Ordering::SeqCst) {
            return Ok(None);
        }
        let handle = self.inner.insert_media_record(record)?;
        if handle.is_some() {
            self.inserts.fetch_add(1, Ordering::SeqCst);
        }
        Ok(handle)
    }

    fn open_output_stream(&self, handle: &MediaHandle) -> Result<Option<Box<dyn Write + '_>>> {
        if self.faults.no_stream.load(Ordering::SeqCst) {
            return Ok(None);
        }
        if self.faults.write.load(Ordering::SeqCst) {
            return Ok(Some(Box::new(FailingWriter)));
        }
        self.inner.open_output_stream(handle)
    }

    fn public_pictures_dir(&self) -> Result<PathBuf> {
        self.inner.public_pictures_dir()
    }
}

struct FailingWriter;

impl Write for FailingWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "EACCES"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A bridge over a fresh [`RecordingHost`]
pub struct TestBridge {
    pub dir: TempDir,
    pub host: Arc<RecordingHost>,
    pub bridge: Bridge,
}

impl TestBridge {
    pub fn new(capability: MediaCapability) -> Self {
        Self::with_config(capability, BridgeConfig::default())
    }

    pub fn with_config(capability: MediaCapability, config: BridgeConfig) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let host = Arc::new(RecordingHost::new(dir.path(), capability));
        let bridge = Bridge::new(host.clone(), config);
        Self { dir, host, bridge }
    }

    pub fn sharing_channel(&self) -> String {
        self.bridge.config().sharing_channel.clone()
    }

    pub fn gallery_channel(&self) -> String {
        self.bridge.config().gallery_channel.clone()
    }

    /// `<root>/Pictures/CheezReceipts`
    pub fn album_dir(&self) -> PathBuf {
        self.dir.path().join("Pictures").join("CheezReceipts")
    }

    /// Files in the album, sorted by name
    pub fn album_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = match std::fs::read_dir(self.album_dir()) {
            Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
            Err(_) => Vec::new(),
        };
        files.sort();
        files
    }

    /// Write an image outside the album and return its path
    pub fn write_image(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.dir.path().join("cache").join(name);
        std::fs::create_dir_all(path.parent().expect("path has a parent"))
            .expect("Failed to create cache dir");
        std::fs::write(&path, bytes).expect("Failed to write image");
        path
    }
}

