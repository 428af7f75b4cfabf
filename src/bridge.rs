//! Channel routing
//!
//! A [`Bridge`] owns both channels over one host and routes calls by channel name.

use crate::channel::{codec, MethodCall, MethodHandler, MethodResponse};
use crate::config::BridgeConfig;
use crate::gallery::GalleryChannel;
use crate::platform::HostPlatform;
use crate::share::SharingChannel;
use std::sync::Arc;

pub struct Bridge {
    config: Arc<BridgeConfig>,
    sharing: SharingChannel,
    gallery: GalleryChannel,
}

impl Bridge {
    pub fn new(host: Arc<dyn HostPlatform>, config: BridgeConfig) -> Self {
        let config = Arc::new(config);
        Self {
            sharing: SharingChannel::new(Arc::clone(&host), Arc::clone(&config)),
            gallery: GalleryChannel::new(host, Arc::clone(&config)),
            config,
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn sharing(&self) -> &SharingChannel {
        &self.sharing
    }

    pub fn gallery(&self) -> &GalleryChannel {
        &self.gallery
    }

    /// Look up a channel by name
    pub fn channel(&self, name: &str) -> Option<&dyn MethodHandler> {
        if name == self.sharing.name() {
            Some(&self.sharing as &dyn MethodHandler)
        } else if name == self.gallery.name() {
            Some(&self.gallery as &dyn MethodHandler)
        } else {
            None
        }
    }

    /// Route a call; unknown channels answer "not implemented"
    pub fn handle(&self, channel: &str, call: &MethodCall) -> MethodResponse {
        match self.channel(channel) {
            Some(handler) => handler.handle(call),
            None => {
                tracing::warn!(channel, method = %call.method, "No handler registered for channel");
                MethodResponse::NotImplemented
            }
        }
    }

    /// Decode a JSON call envelope, route it, and encode the response
    pub fn handle_json(&self, channel: &str, call_json: &str) -> String {
        let response = match codec::decode_call(call_json) {
            Ok(call) => self.handle(channel, &call),
            Err(e) => {
                tracing::warn!(channel, error = %e, "Rejected malformed method call");
                MethodResponse::from_error(&e)
            }
        };
        codec::encode_response(&response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::DirectoryHost;

    fn bridge() -> (tempfile::TempDir, Bridge) {
        let dir = tempfile::tempdir().unwrap();
        let host = Arc::new(DirectoryHost::new(dir.path()));
        (dir, Bridge::new(host, BridgeConfig::default()))
    }

    #[test]
    fn test_routes_by_channel_name() {
        let (_dir, bridge) = bridge();
        assert!(bridge.channel("com.example.cheez_admin_app/whatsapp").is_some());
        assert!(bridge.channel("com.example.cheez_admin_app/gallery").is_some());
        assert!(bridge.channel("com.example.cheez_admin_app/other").is_none());
    }

    #[test]
    fn test_unknown_channel_is_not_implemented() {
        let (_dir, bridge) = bridge();
        let response = bridge.handle("nope", &MethodCall::new("scanFile"));
        assert_eq!(response, MethodResponse::NotImplemented);
    }

    #[test]
    fn test_handle_json_rejects_malformed_call() {
        let (_dir, bridge) = bridge();
        let json = bridge.handle_json("com.example.cheez_admin_app/gallery", "{");
        let response = codec::decode_response(&json).unwrap();
        assert_eq!(response.error_code(), Some("INVALID_CALL"));
    }
}
