use clap::Parser;
use participant_unregister::core::document::lock_document;
use participant_unregister::utils::{logger, validation::Validate};
use participant_unregister::{
    render_participant_list, CliConfig, ClickEvent, ConsoleNotifier, DeleteClickHandler,
    Document, EventDispatcher, HttpUnregisterApi, SettingsProvider, UnregisterError,
    UnregisterOutcome,
};
use std::sync::Arc;

fn fail(e: UnregisterError) -> ! {
    tracing::error!("❌ {} (exit code {})", e, e.exit_code());
    eprintln!("❌ {}", e.user_friendly_message());
    std::process::exit(e.exit_code());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::info!("Starting participant-unregister");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = cli.resolve().unwrap_or_else(|e| fail(e));
    if let Err(e) = config.validate() {
        fail(e);
    }
    let settings = config.handler_settings();

    // 產生參與者清單
    let mut doc = Document::new();
    let root = doc.root();
    render_participant_list(&mut doc, root, &cli.participants, &settings)?;
    let document = doc.into_shared();

    let api = HttpUnregisterApi::from_settings(&config).unwrap_or_else(|e| fail(e));
    let handler = Arc::new(DeleteClickHandler::new(
        document.clone(),
        Arc::new(api),
        Arc::new(ConsoleNotifier),
        settings,
    )?);

    let settings = handler.settings();
    let dispatcher = EventDispatcher::new();
    let subscription = handler.attach(&dispatcher)?;

    for email in cli.click_targets() {
        let target = lock_document(&document).find_by_attribute(&settings.email_attribute, &email);
        match target {
            Some(button) => dispatcher.dispatch(&ClickEvent::on(button)),
            None => tracing::warn!("No delete control rendered for {}", email),
        }
    }

    let outcomes = handler.settle().await;
    handler.detach(&dispatcher, subscription);

    for outcome in &outcomes {
        let email = outcome.email();
        match outcome {
            UnregisterOutcome::Unregistered { .. } => println!("✅ {} unregistered", email),
            UnregisterOutcome::Rejected { detail, .. } => println!(
                "🚫 {} not unregistered: {}",
                email,
                detail.as_deref().unwrap_or(&settings.unregister_failed_message)
            ),
            UnregisterOutcome::TransportFailed { reason, .. } => {
                println!("❌ {} not unregistered: {}", email, reason)
            }
        }
    }

    let doc = lock_document(&document);
    let remaining: Vec<&str> = doc
        .elements_by_tag(&settings.list_item_tag)
        .into_iter()
        .filter_map(|item| doc.children(item).first().and_then(|label| doc.text(*label)))
        .collect();
    println!("📋 Remaining participants ({}):", remaining.len());
    for email in remaining {
        println!("  - {}", email);
    }

    Ok(())
}
