//! Direct-file persistence for hosts without a unified media index
//!
//! Files go straight into `<public pictures>/<album>`, and the background media
//! scanner is asked to index them with a broadcast.

use crate::config::BridgeConfig;
use crate::error::Result;
use crate::platform::intent::ACTION_MEDIA_SCANNER_SCAN_FILE;
use crate::platform::{file_uri, HostPlatform, Intent};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Write `bytes` to `<album>/<file_name>`, creating the album directory if needed
pub fn write_to_album(
    host: &dyn HostPlatform,
    config: &BridgeConfig,
    bytes: &[u8],
    file_name: &str,
) -> Result<PathBuf> {
    let album = host.public_pictures_dir()?.join(&config.album_name);
    if !album.exists() {
        fs::create_dir_all(&album)?;
    }

    let path = album.join(file_name);
    let mut file = File::create(&path)?;
    file.write_all(bytes)?;
    file.flush()?;

    Ok(path)
}

/// Ask the media scanner to index `path`; returns the broadcast URI
pub fn request_scan(host: &dyn HostPlatform, path: &Path) -> Result<String> {
    let uri = file_uri(path)?;
    let intent = Intent::new(ACTION_MEDIA_SCANNER_SCAN_FILE).with_data(uri.clone());
    host.send_broadcast(&intent)?;
    Ok(uri)
}
