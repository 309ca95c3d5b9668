use thiserror::Error;

#[derive(Error, Debug)]
pub enum UnregisterError {
    #[error("Request to unregister endpoint failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unregister response could not be parsed: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Document error: {message}")]
    DocumentError { message: String },

    #[error("Unknown document node: {0}")]
    UnknownNode(usize),

    #[error("Delete-click handler is already attached to this document")]
    AlreadyAttached,

    #[error("No tokio runtime available to run unregister requests")]
    RuntimeUnavailable,
}

impl UnregisterError {
    /// 給終端使用者看的訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::Transport(_) | Self::MalformedResponse(_) => {
                "Could not talk to the registration server.".to_string()
            }
            Self::InvalidUrl(_) => "The server URL is not valid.".to_string(),
            Self::IoError(e) => format!("Could not read a file: {}", e),
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. } => {
                format!("Configuration problem: {}", self)
            }
            Self::DocumentError { .. }
            | Self::UnknownNode(_)
            | Self::AlreadyAttached
            | Self::RuntimeUnavailable => {
                format!("Internal error: {}", self)
            }
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::InvalidUrl(_) => 2,
            Self::Transport(_) | Self::MalformedResponse(_) => 3,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, UnregisterError>;
