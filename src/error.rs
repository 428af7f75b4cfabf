//! Error types for the bridge
//!
//! Channel handlers only ever surface [`BridgeError::InvalidArgument`] (and
//! [`BridgeError::InvalidCall`] for malformed envelopes) to the caller. Every other
//! variant describes a platform failure that is logged and collapsed into a
//! fallback action, a silent no-op, or a `false` result at the channel boundary.

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Errors produced by the bridge and its host platforms
#[derive(Debug, Error, uniffi::Error)]
#[uniffi(flat_error)]
pub enum BridgeError {
    /// A required argument was absent, null, or of the wrong type
    #[error("{0}")]
    InvalidArgument(String),

    /// The call envelope itself could not be decoded
    #[error("Invalid method call: {0}")]
    InvalidCall(String),

    /// The referenced local file does not exist
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// The media index refused to create a record
    #[error("Media index refused to insert {display_name}")]
    InsertRefused { display_name: String },

    /// A destination file name that would escape the album directory
    #[error("Invalid file name: {0:?}")]
    InvalidFileName(String),

    /// No installed application can handle the dispatched action
    #[error("No activity found to handle {action} (package {package})")]
    NotInstalled { action: String, package: String },

    /// File system or stream failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure reported by the host platform (JNI call, Java exception, ...)
    #[error("Platform error: {0}")]
    Platform(String),

    /// JSON encoding/decoding failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The bridge was used before a host was installed
    #[error("Bridge not initialised: call an install function first")]
    NotInitialised,
}

impl BridgeError {
    /// Machine-readable code sent back over a channel
    pub fn code(&self) -> &'static str {
        match self {
            BridgeError::InvalidArgument(_) => "INVALID_ARGUMENT",
            BridgeError::InvalidCall(_) => "INVALID_CALL",
            BridgeError::FileNotFound(_) => "FILE_NOT_FOUND",
            BridgeError::InsertRefused { .. } => "INSERT_REFUSED",
            BridgeError::InvalidFileName(_) => "INVALID_FILE_NAME",
            BridgeError::NotInstalled { .. } => "NOT_INSTALLED",
            BridgeError::Io(_) => "IO_ERROR",
            BridgeError::Platform(_) => "PLATFORM_ERROR",
            BridgeError::Serialization(_) => "SERIALIZATION_ERROR",
            BridgeError::NotInitialised => "BRIDGE_UNAVAILABLE",
        }
    }

    pub fn platform(context: &str, detail: impl std::fmt::Display) -> Self {
        BridgeError::Platform(format!("{context}: {detail}"))
    }
}

impl From<base64::DecodeError> for BridgeError {
    fn from(e: base64::DecodeError) -> Self {
        BridgeError::InvalidArgument(format!("Invalid base64 payload: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            BridgeError::InvalidArgument("x".into()).code(),
            "INVALID_ARGUMENT"
        );
        assert_eq!(BridgeError::NotInitialised.code(), "BRIDGE_UNAVAILABLE");
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(BridgeError::from(io).code(), "IO_ERROR");
    }

    #[test]
    fn test_invalid_argument_displays_message_verbatim() {
        let err = BridgeError::InvalidArgument("File path is null".into());
        assert_eq!(err.to_string(), "File path is null");
    }
}
