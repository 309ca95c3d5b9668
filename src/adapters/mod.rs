// Adapters layer: concrete implementations for the ports (http client, dialogs).

pub mod http;
pub mod notifier;
