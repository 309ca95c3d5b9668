use crate::domain::model::{ParticipantEmail, UnregisterResponse};
use crate::utils::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait UnregisterApi: Send + Sync {
    async fn unregister(&self, email: &ParticipantEmail) -> Result<UnregisterResponse>;
}

/// Blocking user-visible dialog.
pub trait Notifier: Send + Sync {
    fn alert(&self, message: &str);
}

pub trait SettingsProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn timeout_seconds(&self) -> u64;
    fn handler_settings(&self) -> HandlerSettings;
}

/// DOM contract and dialog texts used by the delete-click handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerSettings {
    pub marker_class: String,
    pub email_attribute: String,
    pub list_item_tag: String,
    pub unregister_failed_message: String,
    pub transport_failed_message: String,
}

pub const DEFAULT_MARKER_CLASS: &str = "delete-btn";
pub const DEFAULT_EMAIL_ATTRIBUTE: &str = "data-email";
pub const DEFAULT_LIST_ITEM_TAG: &str = "li";
pub const DEFAULT_UNREGISTER_FAILED_MESSAGE: &str = "Failed to unregister participant.";
pub const DEFAULT_TRANSPORT_FAILED_MESSAGE: &str = "Could not reach the server. Please try again.";

impl Default for HandlerSettings {
    fn default() -> Self {
        Self {
            marker_class: DEFAULT_MARKER_CLASS.to_string(),
            email_attribute: DEFAULT_EMAIL_ATTRIBUTE.to_string(),
            list_item_tag: DEFAULT_LIST_ITEM_TAG.to_string(),
            unregister_failed_message: DEFAULT_UNREGISTER_FAILED_MESSAGE.to_string(),
            transport_failed_message: DEFAULT_TRANSPORT_FAILED_MESSAGE.to_string(),
        }
    }
}
