//! JSON envelope for string-based transports (uniffi, JNI)
//!
//! ```json
//! {"method": "scanFile", "arguments": {"path": "/sdcard/r.png"}}
//! {"status": "success", "result": true}
//! {"status": "error", "code": "INVALID_ARGUMENT", "message": "File path is null", "details": null}
//! {"status": "notImplemented"}
//! ```

use super::{MethodCall, MethodResponse};
use crate::error::{BridgeError, Result};

/// Decode a call envelope. Anything that is not a JSON object with a string
/// `method` is an [`BridgeError::InvalidCall`].
pub fn decode_call(json: &str) -> Result<MethodCall> {
    serde_json::from_str(json).map_err(|e| BridgeError::InvalidCall(e.to_string()))
}

pub fn decode_response(json: &str) -> Result<MethodResponse> {
    Ok(serde_json::from_str(json)?)
}

/// Encode a response; never fails so it can sit at the FFI boundary
pub fn encode_response(response: &MethodResponse) -> String {
    match serde_json::to_string(response) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode method response");
            r#"{"status":"error","code":"SERIALIZATION_ERROR","message":"response encoding failed","details":null}"#
                .to_string()
        }
    }
}
