uniffi::setup_scaffolding!();

// JNI bridge for Android
#[cfg(target_os = "android")]
mod jni_bridge;

// Core modules
pub mod error;
pub mod config;
pub mod logging;
pub mod channel;
pub mod platform;
pub mod share;
pub mod gallery;
pub mod bridge;

// Re-export commonly used types for convenience
pub use bridge::Bridge;
pub use channel::{MethodCall, MethodHandler, MethodResponse};
pub use config::BridgeConfig;
pub use error::{BridgeError, Result};
pub use platform::{DirectoryHost, HostPlatform, MediaCapability};

use lazy_static::lazy_static;
use std::sync::{Arc, RwLock};

lazy_static! {
    /// Bridge installed by the host at startup
    static ref BRIDGE: RwLock<Option<Arc<Bridge>>> = RwLock::new(None);
}

/// Install `bridge` as the process-wide bridge, replacing any previous one
pub fn install(bridge: Bridge) {
    let mut slot = BRIDGE.write().unwrap_or_else(|poisoned| poisoned.into_inner());
    *slot = Some(Arc::new(bridge));
}

/// The installed bridge
pub fn installed() -> Result<Arc<Bridge>> {
    BRIDGE
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
        .ok_or(BridgeError::NotInitialised)
}

/// Install a bridge over a directory-backed host rooted at `root`
#[uniffi::export]
pub fn install_directory_host(root: String, legacy: bool) {
    let capability = if legacy {
        MediaCapability::Legacy
    } else {
        MediaCapability::Modern
    };
    let host = DirectoryHost::new(root).with_capability(capability);
    install(Bridge::new(Arc::new(host), BridgeConfig::default()));
}

/// Route a JSON-encoded method call to `channel`; always returns a response envelope
#[uniffi::export]
pub fn handle_method_call(channel: String, call_json: String) -> String {
    match installed() {
        Ok(bridge) => bridge.handle_json(&channel, &call_json),
        Err(e) => channel::codec::encode_response(&MethodResponse::from_error(&e)),
    }
}

#[uniffi::export]
pub fn share_to_whatsapp(phone: String, image_path: String) -> Result<bool> {
    let bridge = installed()?;
    let call = MethodCall::new(share::METHOD_SHARE_TO_WHATSAPP)
        .with_argument("phone", phone)
        .with_argument("imagePath", image_path);
    bool_response(bridge.sharing().handle(&call))
}

#[uniffi::export]
pub fn scan_file(path: String) -> Result<bool> {
    let bridge = installed()?;
    let call = MethodCall::new(gallery::METHOD_SCAN_FILE).with_argument("path", path);
    bool_response(bridge.gallery().handle(&call))
}

#[uniffi::export]
pub fn save_image_to_gallery(image_bytes: Vec<u8>, file_name: Option<String>) -> Result<bool> {
    let bridge = installed()?;
    let mut call = MethodCall::new(gallery::METHOD_SAVE_IMAGE_TO_GALLERY)
        .with_argument("imageBytes", image_bytes);
    if let Some(name) = file_name {
        call = call.with_argument("fileName", name);
    }
    bool_response(bridge.gallery().handle(&call))
}

/// Send `tracing` output to stderr; `filter` overrides `RUST_LOG`
#[uniffi::export]
pub fn init_logging(filter: Option<String>) -> bool {
    logging::init_logging(filter.as_deref())
}

fn bool_response(response: MethodResponse) -> Result<bool> {
    match response {
        MethodResponse::Success { result } => Ok(result.as_bool().unwrap_or(false)),
        MethodResponse::Error { code, message, .. } if code == "INVALID_ARGUMENT" => {
            Err(BridgeError::InvalidArgument(message))
        }
        MethodResponse::Error { code, message, .. } => {
            Err(BridgeError::Platform(format!("{code}: {message}")))
        }
        MethodResponse::NotImplemented => {
            Err(BridgeError::Platform("method not implemented".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_response() {
        assert!(bool_response(MethodResponse::success(true)).unwrap());
        assert!(!bool_response(MethodResponse::success(false)).unwrap());

        let err = bool_response(MethodResponse::invalid_argument("File path is null")).unwrap_err();
        assert_eq!(err.code(), "INVALID_ARGUMENT");
        assert_eq!(err.to_string(), "File path is null");
    }
}
