use crate::domain::ports::Notifier;
use std::sync::Mutex;

/// Prints the dialog text to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn alert(&self, message: &str) {
        tracing::warn!("Alert shown: {}", message);
        eprintln!("⚠️  {}", message);
    }
}

/// Keeps every alert in memory, in the order shown.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    alerts: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn alerts(&self) -> Vec<String> {
        self.alerts
            .lock()
            .map(|alerts| alerts.clone())
            .unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn alert(&self, message: &str) {
        tracing::debug!("Recording alert: {}", message);
        if let Ok(mut alerts) = self.alerts.lock() {
            alerts.push(message.to_string());
        }
    }
}
