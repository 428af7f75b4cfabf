//! Sharing receipts to a messaging contact
//!
//! The messenger offers no way to attach an image to a specific chat, so the primary
//! path opens the messenger with the image attached and leaves the recipient choice
//! to the user. When the image is missing or the share action cannot be dispatched,
//! the bridge falls back to opening the contact's chat through a deep link.
//!
//! Nothing in this module reports failure to the caller: every error is logged and
//! turned into the fallback.

use crate::channel::{MethodCall, MethodHandler, MethodResponse};
use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};
use crate::platform::intent::{
    ACTION_SEND, ACTION_VIEW, EXTRA_STREAM, EXTRA_TEXT, FLAG_ACTIVITY_NEW_TASK,
    FLAG_GRANT_READ_URI_PERMISSION,
};
use crate::platform::{HostPlatform, Intent, IntentExtra};
use std::path::Path;
use std::sync::Arc;

pub const METHOD_SHARE_TO_WHATSAPP: &str = "shareToWhatsApp";

/// Which action a share request ended up dispatching
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    /// The image was handed to the messenger
    ImageShared,
    /// The image share was not possible; the contact's chat was opened instead
    ContactOpened { reason: String },
    /// Neither action could be dispatched
    NothingDispatched { reason: String },
}

pub struct SharingService {
    host: Arc<dyn HostPlatform>,
    config: Arc<BridgeConfig>,
}

impl SharingService {
    pub fn new(host: Arc<dyn HostPlatform>, config: Arc<BridgeConfig>) -> Self {
        Self { host, config }
    }

    /// Share `image_path` with the messenger, falling back to the contact's chat
    pub fn share_image(&self, contact: &str, image_path: &str) -> ShareOutcome {
        let reason = match self.try_share_image(Path::new(image_path)) {
            Ok(()) => return ShareOutcome::ImageShared,
            Err(e) => {
                tracing::warn!(image_path, error = %e, "Image share failed, opening contact instead");
                e.to_string()
            }
        };

        match self.open_contact(contact) {
            Ok(()) => ShareOutcome::ContactOpened { reason },
            Err(e) => {
                tracing::error!(contact, error = %e, "Failed to open messenger for contact");
                ShareOutcome::NothingDispatched {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Primary path: SEND action carrying a file-provider URI for the image
    pub fn try_share_image(&self, image_path: &Path) -> Result<()> {
        if !image_path.is_file() {
            return Err(BridgeError::FileNotFound(image_path.display().to_string()));
        }

        let authority = self.config.file_provider_authority(&self.host.app_package()?);
        let uri = self.host.resolve_shareable_uri(image_path, &authority)?;

        let intent = Intent::new(ACTION_SEND)
            .with_type(&self.config.image_mime_type)
            .with_package(&self.config.messenger_package)
            .with_extra(EXTRA_STREAM, IntentExtra::Stream(uri))
            .with_extra(EXTRA_TEXT, IntentExtra::Text(self.config.share_text.clone()))
            .add_flags(FLAG_GRANT_READ_URI_PERMISSION)
            .add_flags(FLAG_ACTIVITY_NEW_TASK);

        self.host.dispatch_intent(&intent)?;
        tracing::info!(path = %image_path.display(), "Image share dispatched");
        Ok(())
    }

    /// Fallback: VIEW action on the contact's deep link, restricted to the messenger
    pub fn open_contact(&self, contact: &str) -> Result<()> {
        let intent = Intent::new(ACTION_VIEW)
            .with_data(self.contact_link(contact)?)
            .with_package(&self.config.messenger_package);

        self.host.dispatch_intent(&intent)?;
        tracing::info!(contact, "Contact chat opened");
        Ok(())
    }

    /// `https://wa.me/<contact>`, with the contact pushed as a single path segment
    pub fn contact_link(&self, contact: &str) -> Result<String> {
        let mut link = url::Url::parse(&self.config.contact_link_base)
            .map_err(|e| BridgeError::platform("contact_link_base", e))?;
        link.path_segments_mut()
            .map_err(|_| BridgeError::platform("contact_link_base", "cannot be a base"))?
            .pop_if_empty()
            .push(contact);
        Ok(link.to_string())
    }
}

/// Channel exposing [`SharingService`]
pub struct SharingChannel {
    name: String,
    service: SharingService,
}

impl SharingChannel {
    pub fn new(host: Arc<dyn HostPlatform>, config: Arc<BridgeConfig>) -> Self {
        Self {
            name: config.sharing_channel.clone(),
            service: SharingService::new(host, config),
        }
    }

    pub fn service(&self) -> &SharingService {
        &self.service
    }

    fn share_to_whatsapp(&self, call: &MethodCall) -> MethodResponse {
        let (Some(phone), Some(image_path)) =
            (call.argument_str("phone"), call.argument_str("imagePath"))
        else {
            return MethodResponse::invalid_argument("Phone number or image path is null");
        };

        let outcome = self.service.share_image(phone, image_path);
        tracing::debug!(?outcome, "shareToWhatsApp finished");
        MethodResponse::success(true)
    }
}

impl MethodHandler for SharingChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn handle(&self, call: &MethodCall) -> MethodResponse {
        match call.method.as_str() {
            METHOD_SHARE_TO_WHATSAPP => self.share_to_whatsapp(call),
            other => {
                tracing::warn!(channel = %self.name, method = other, "Method not implemented");
                MethodResponse::NotImplemented
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::DirectoryHost;

    fn service() -> SharingService {
        let host = Arc::new(DirectoryHost::new(std::env::temp_dir()));
        SharingService::new(host, Arc::new(BridgeConfig::default()))
    }

    #[test]
    fn test_contact_link() {
        let service = service();
        assert_eq!(
            service.contact_link("923001234567").unwrap(),
            "https://wa.me/923001234567"
        );
    }

    #[test]
    fn test_contact_link_escapes_segment() {
        let service = service();
        assert_eq!(
            service.contact_link("92 300/1").unwrap(),
            "https://wa.me/92%20300%2F1"
        );
    }
}
