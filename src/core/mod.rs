pub mod document;
pub mod events;
pub mod handler;

pub use crate::domain::model::{ParticipantEmail, UnregisterOutcome, UnregisterResponse};
pub use crate::domain::ports::{HandlerSettings, Notifier, SettingsProvider, UnregisterApi};
pub use crate::utils::error::Result;
