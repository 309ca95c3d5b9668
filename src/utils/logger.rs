use tracing_subscriber::{
    fmt, layer::SubscriberExt, registry::Registry, util::SubscriberInitExt, EnvFilter,
};

fn env_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

fn base_layer<S>() -> fmt::Layer<S> {
    fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
}

pub fn init_cli_logger(verbose: bool) {
    let filter = if verbose {
        env_filter("participant_unregister=debug,info")
    } else {
        env_filter("participant_unregister=info")
    };

    Registry::default()
        .with(filter)
        .with(base_layer().compact())
        .init();
}

pub fn init_json_logger() {
    Registry::default()
        .with(env_filter("participant_unregister=info"))
        .with(base_layer().json()) // one JSON object per line for log collectors
        .init();
}
