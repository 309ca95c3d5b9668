pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;
pub use crate::config::HandlerConfig;

pub use crate::adapters::http::HttpUnregisterApi;
pub use crate::adapters::notifier::{ConsoleNotifier, RecordingNotifier};
pub use crate::core::document::{render_participant_list, Document, NodeId, SharedDocument};
pub use crate::core::events::{ClickEvent, EventDispatcher, Subscription};
pub use crate::core::handler::{ClickDisposition, DeleteClickHandler};
pub use crate::domain::model::{ParticipantEmail, UnregisterOutcome, UnregisterResponse};
pub use crate::domain::ports::{HandlerSettings, Notifier, SettingsProvider, UnregisterApi};
pub use crate::utils::error::{Result, UnregisterError};
