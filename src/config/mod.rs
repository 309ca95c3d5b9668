pub mod toml_config;

pub use toml_config::HandlerConfig;

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "participant-unregister")]
#[command(about = "Render a participant list, click its delete controls and unregister participants")]
pub struct CliConfig {
    #[arg(long, help = "Server base URL [default: http://127.0.0.1:8000]")]
    pub base_url: Option<String>,

    #[arg(long, help = "TOML configuration file")]
    pub config: Option<String>,

    #[arg(long = "participant", help = "Participant email to render (repeatable)")]
    pub participants: Vec<String>,

    #[arg(long = "click", help = "Click the delete control of this participant (repeatable)")]
    pub clicks: Vec<String>,

    #[arg(long, help = "Click every rendered delete control")]
    pub click_all: bool,

    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit structured JSON logs")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Loads the TOML file (if any) and lets command-line flags override it.
    pub fn resolve(&self) -> Result<HandlerConfig> {
        let mut config = match &self.config {
            Some(path) => HandlerConfig::from_file(path)?,
            None => HandlerConfig::default(),
        };

        if let Some(base_url) = &self.base_url {
            config.server.base_url = base_url.clone();
        }
        if let Some(timeout) = self.timeout_seconds {
            config.server.timeout_seconds = Some(timeout);
        }

        Ok(config)
    }

    /// Emails whose delete control should be clicked, in click order.
    pub fn click_targets(&self) -> Vec<String> {
        if self.click_all {
            self.participants.clone()
        } else {
            self.clicks.clone()
        }
    }
}
