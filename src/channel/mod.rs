//! Method channels
//!
//! A channel receives a [`MethodCall`] (method name plus a key/value argument map) and
//! answers with a [`MethodResponse`]: a success value, a structured error with a
//! machine-readable code, or "not implemented".

pub mod codec;

use crate::error::{BridgeError, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single request on a channel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,

    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl MethodCall {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            arguments: Map::new(),
        }
    }

    pub fn with_argument(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    /// String argument; `None` when absent, null, or not a string
    pub fn argument_str(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(Value::as_str)
    }

    /// Binary argument, sent either as base64 text or as an array of byte values.
    ///
    /// Absent, null, and values of any other shape yield `Ok(None)`. Malformed base64
    /// or array elements outside `0..=255` are an [`BridgeError::InvalidArgument`].
    pub fn argument_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match self.arguments.get(key) {
            Some(Value::String(encoded)) => {
                let bytes = base64::engine::general_purpose::STANDARD.decode(encoded)?;
                Ok(Some(bytes))
            }
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_u64()
                        .and_then(|n| u8::try_from(n).ok())
                        .ok_or_else(|| {
                            BridgeError::InvalidArgument(format!(
                                "{key} must contain byte values, found {item}"
                            ))
                        })
                })
                .collect::<Result<Vec<u8>>>()
                .map(Some),
            _ => Ok(None),
        }
    }
}

/// Answer to a [`MethodCall`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum MethodResponse {
    Success {
        result: Value,
    },
    Error {
        code: String,
        message: String,
        #[serde(default)]
        details: Option<Value>,
    },
    NotImplemented,
}

impl MethodResponse {
    pub fn success(result: impl Into<Value>) -> Self {
        MethodResponse::Success {
            result: result.into(),
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        MethodResponse::Error {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::from_error(&BridgeError::InvalidArgument(message.into()))
    }

    pub fn from_error(err: &BridgeError) -> Self {
        Self::error(err.code(), err.to_string())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, MethodResponse::Success { .. })
    }

    /// Boolean success value, if this is a boolean success
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MethodResponse::Success { result } => result.as_bool(),
            _ => None,
        }
    }

    /// Error code, if this is an error
    pub fn error_code(&self) -> Option<&str> {
        match self {
            MethodResponse::Error { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// A named channel with a fixed set of methods
pub trait MethodHandler: Send + Sync {
    /// Channel name the framework layer addresses
    fn name(&self) -> &str;

    /// Handle one call synchronously on the caller's thread
    fn handle(&self, call: &MethodCall) -> MethodResponse;
}
