//! Directory-backed host for desktop builds, the CLI, and tests
//!
//! A directory tree stands in for external storage:
//!
//! ```text
//! <root>/
//!   Pictures/
//!     CheezReceipts/
//!       Receipt_1718000000000.png
//! ```
//!
//! Media records become files under `<root>/<relative_path>` and get
//! `content://media/external/images/media/<n>` URIs. Dispatched activities and
//! broadcasts are recorded (and logged) instead of being delivered; an activity
//! aimed at a package that is not in the "installed" set fails the way a missing app
//! does on a device.

use super::{HostPlatform, Intent, MediaCapability, MediaHandle, MediaRecord};
use crate::error::{BridgeError, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

/// `Environment.DIRECTORY_PICTURES`
pub const PICTURES_DIR: &str = "Pictures";

const MEDIA_URI_PREFIX: &str = "content://media/external/images/media/";

pub struct DirectoryHost {
    root: PathBuf,
    app_package: String,
    capability: MediaCapability,
    installed: BTreeSet<String>,
    activities: Mutex<Vec<Intent>>,
    broadcasts: Mutex<Vec<Intent>>,
    records: Mutex<BTreeMap<u64, PathBuf>>,
    next_id: AtomicU64,
}

impl DirectoryHost {
    /// Host rooted at `root` with modern media capability and the messenger installed
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            app_package: "com.example.cheez_admin_app".to_string(),
            capability: MediaCapability::Modern,
            installed: ["com.whatsapp".to_string()].into_iter().collect(),
            activities: Mutex::new(Vec::new()),
            broadcasts: Mutex::new(Vec::new()),
            records: Mutex::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn with_capability(mut self, capability: MediaCapability) -> Self {
        self.capability = capability;
        self
    }

    pub fn with_app_package(mut self, package: impl Into<String>) -> Self {
        self.app_package = package.into();
        self
    }

    /// Replace the set of packages that can receive activities
    pub fn with_installed_packages<I, S>(mut self, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.installed = packages.into_iter().map(Into::into).collect();
        self
    }


    /// Activities dispatched so far, oldest first
    pub fn dispatched_intents(&self) -> Vec<Intent> {
        lock(&self.activities).clone()
    }

    /// Broadcasts sent so far, oldest first
    pub fn broadcasts(&self) -> Vec<Intent> {
        lock(&self.broadcasts).clone()
    }

    /// File backing a media record
    pub fn media_path(&self, handle: &MediaHandle) -> Option<PathBuf> {
        let id = record_id(&handle.uri)?;
        lock(&self.records).get(&id).cloned()
    }

    /// Pick `name`, or `stem (n).ext` when taken, the way the media index de-duplicates
    fn unique_path(dir: &Path, name: &str) -> PathBuf {
        let candidate = dir.join(name);
        if !candidate.exists() {
            return candidate;
        }

        let (stem, ext) = match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
            _ => (name, None),
        };

        (1u32..)
            .map(|n| match ext {
                Some(ext) => dir.join(format!("{stem} ({n}).{ext}")),
                None => dir.join(format!("{stem} ({n})")),
            })
            .find(|p| !p.exists())
            .unwrap_or(candidate)
    }
}

impl HostPlatform for DirectoryHost {
    fn platform_name(&self) -> &str {
        "Directory"
    }

    fn media_capability(&self) -> MediaCapability {
        self.capability
    }

    fn app_package(&self) -> Result<String> {
        Ok(self.app_package.clone())
    }

    fn resolve_shareable_uri(&self, path: &Path, authority: &str) -> Result<String> {
        if !path.is_file() {
            return Err(BridgeError::FileNotFound(path.display().to_string()));
        }
        let absolute = fs::canonicalize(path)?;

        let mut uri = url::Url::parse(&format!("content://{authority}/root"))
            .map_err(|e| BridgeError::platform("resolve_shareable_uri", e))?;
        {
            let mut segments = uri
                .path_segments_mut()
                .map_err(|_| BridgeError::platform("resolve_shareable_uri", "opaque uri"))?;
            for component in absolute.components().skip(1) {
                segments.push(&component.as_os_str().to_string_lossy());
            }
        }
        Ok(uri.to_string())
    }

    fn dispatch_intent(&self, intent: &Intent) -> Result<()> {
        if let Some(package) = &intent.package {
            if !self.installed.contains(package) {
                return Err(BridgeError::NotInstalled {
                    action: intent.action.clone(),
                    package: package.clone(),
                });
            }
        }

        tracing::info!(
            action = %intent.action,
            package = intent.package_or_any(),
            data = intent.data.as_deref().unwrap_or(""),
            "Directory host: activity dispatched"
        );
        lock(&self.activities).push(intent.clone());
        Ok(())
    }

    fn send_broadcast(&self, intent: &Intent) -> Result<()> {
        tracing::info!(
            action = %intent.action,
            data = intent.data.as_deref().unwrap_or(""),
            "Directory host: broadcast sent"
        );
        lock(&self.broadcasts).push(intent.clone());
        Ok(())
    }

    fn insert_media_record(&self, record: &MediaRecord) -> Result<Option<MediaHandle>> {
        if record.display_name.is_empty() || record.display_name.contains(['/', '\\']) {
            return Ok(None);
        }

        let dir = self.root.join(&record.relative_path);
        fs::create_dir_all(&dir)?;

        let path = Self::unique_path(&dir, &record.display_name);
        OpenOptions::new().write(true).create_new(true).open(&path)?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        lock(&self.records).insert(id, path.clone());

        tracing::debug!(id, path = %path.display(), mime = %record.mime_type, "Directory host: media record inserted");
        Ok(Some(MediaHandle {
            uri: format!("{MEDIA_URI_PREFIX}{id}"),
        }))
    }

    fn open_output_stream(&self, handle: &MediaHandle) -> Result<Option<Box<dyn Write + '_>>> {
        let Some(path) = self.media_path(handle) else {
            return Ok(None);
        };
        let file = OpenOptions::new().write(true).truncate(true).open(path)?;
        Ok(Some(Box::new(file)))
    }

    fn public_pictures_dir(&self) -> Result<PathBuf> {
        Ok(self.root.join(PICTURES_DIR))
    }
}

fn record_id(uri: &str) -> Option<u64> {
    uri.strip_prefix(MEDIA_URI_PREFIX)?.parse().ok()
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::intent::ACTION_VIEW;

    const AUTHORITY: &str = "com.example.cheez_admin_app.fileprovider";

    fn record(name: &str) -> MediaRecord {
        MediaRecord {
            display_name: name.to_string(),
            mime_type: "image/png".to_string(),
            relative_path: "Pictures/CheezReceipts".to_string(),
        }
    }

    #[test]
    fn test_insert_and_write_record() {
        let dir = tempfile::tempdir().unwrap();
        let host = DirectoryHost::new(dir.path());

        let handle = host.insert_media_record(&record("a.png")).unwrap().unwrap();
        assert!(handle.uri.starts_with(MEDIA_URI_PREFIX));
        {
            let mut out = host.open_output_stream(&handle).unwrap().unwrap();
            out.write_all(b"png").unwrap();
        }

        let path = host.media_path(&handle).unwrap();
        assert_eq!(path, dir.path().join("Pictures/CheezReceipts/a.png"));
        assert_eq!(fs::read(path).unwrap(), b"png");
    }

    #[test]
    fn test_duplicate_names_are_suffixed() {
        let dir = tempfile::tempdir().unwrap();
        let host = DirectoryHost::new(dir.path());

        let first = host.insert_media_record(&record("a.png")).unwrap().unwrap();
        let second = host.insert_media_record(&record("a.png")).unwrap().unwrap();

        assert_ne!(first, second);
        let second_path = host.media_path(&second).unwrap();
        assert_eq!(second_path.file_name().unwrap(), "a (1).png");
    }

    #[test]
    fn test_insert_refuses_path_like_names() {
        let dir = tempfile::tempdir().unwrap();
        let host = DirectoryHost::new(dir.path());
        assert!(host.insert_media_record(&record("../x.png")).unwrap().is_none());
        assert!(host.insert_media_record(&record("")).unwrap().is_none());
    }

    #[test]
    fn test_unknown_record_has_no_stream() {
        let dir = tempfile::tempdir().unwrap();
        let host = DirectoryHost::new(dir.path());
        let handle = MediaHandle {
            uri: format!("{MEDIA_URI_PREFIX}99"),
        };
        assert!(host.open_output_stream(&handle).unwrap().is_none());
    }

    #[test]
    fn test_dispatch_to_missing_package_fails() {
        let dir = tempfile::tempdir().unwrap();
        let host = DirectoryHost::new(dir.path()).with_installed_packages(Vec::<String>::new());

        let intent = Intent::new(ACTION_VIEW).with_package("com.whatsapp");
        let err = host.dispatch_intent(&intent).unwrap_err();
        assert_eq!(err.code(), "NOT_INSTALLED");
        assert!(host.dispatched_intents().is_empty());
    }

    #[test]
    fn test_shareable_uri_requires_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let host = DirectoryHost::new(dir.path());

        let missing = dir.path().join("missing.png");
        assert_eq!(
            host.resolve_shareable_uri(&missing, AUTHORITY).unwrap_err().code(),
            "FILE_NOT_FOUND"
        );

        let image = dir.path().join("r.png");
        fs::write(&image, b"x").unwrap();
        let uri = host.resolve_shareable_uri(&image, AUTHORITY).unwrap();
        assert!(uri.starts_with("content://com.example.cheez_admin_app.fileprovider/root/"));
        assert!(uri.ends_with("/r.png"));
    }

    #[test]
    fn test_app_package_override() {
        let dir = tempfile::tempdir().unwrap();
        let host = DirectoryHost::new(dir.path()).with_app_package("com.example.pos");
        assert_eq!(host.app_package().unwrap(), "com.example.pos");
    }
}
