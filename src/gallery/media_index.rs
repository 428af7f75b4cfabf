//! Media-index persistence (Android 10 and later)
//!
//! A record is inserted with its display name, MIME type, and album-relative path;
//! the content is then streamed into the output stream the index hands back. When the
//! index has no stream for the new record the copy is skipped and the record stands.

use crate::error::{BridgeError, Result};
use crate::platform::{HostPlatform, MediaHandle, MediaRecord};
use std::io::{self, Read, Write};

/// Insert `record` and copy everything from `content` into it
pub fn insert_and_copy(
    host: &dyn HostPlatform,
    record: &MediaRecord,
    content: &mut dyn Read,
) -> Result<MediaHandle> {
    let handle = host
        .insert_media_record(record)?
        .ok_or_else(|| BridgeError::InsertRefused {
            display_name: record.display_name.clone(),
        })?;

    let Some(mut output) = host.open_output_stream(&handle)? else {
        tracing::warn!(uri = %handle.uri, "No output stream for media record, nothing copied");
        return Ok(handle);
    };

    let copied = io::copy(content, &mut output)?;
    output.flush()?;

    tracing::debug!(uri = %handle.uri, bytes = copied, "Media record written");
    Ok(handle)
}
