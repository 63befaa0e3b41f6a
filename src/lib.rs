pub mod agent_engine;
pub mod config;
pub mod errors;
pub mod executor;
pub mod llm;
pub mod record;
pub mod visual;
pub mod widget;

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::agent_engine::event_bus::TranscriptEvent;
use crate::agent_engine::state::{AgentMode, Role};
use crate::config::AppConfig;
use crate::llm::registry::ProviderRegistry;
use crate::llm::session::ModelSession;
use crate::record::context::read_context_or_placeholder;
use crate::record::source::{JsonRecordSource, RecordSource, StaticRecordSource};
use crate::visual::locator::LabelBoard;
use crate::widget::{AssistantWidget, WidgetOptions};

/// Terminal front end: one line per request, `/agent`, `/chat`, `/mode` and
/// `/quit` as commands.
pub async fn run() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Load .env file if present (ignore error if not found)
    let _ = dotenvy::dotenv();

    let (registry, options, source): (ProviderRegistry, WidgetOptions, Box<dyn RecordSource>) =
        match config::load_config() {
            Ok(cfg) => (
                ProviderRegistry::from_config(&cfg),
                WidgetOptions::from(&cfg),
                record_source(&cfg),
            ),
            Err(e) => {
                tracing::error!(error = %e, "Failed to load config; starting with empty LLM registry");
                (
                    ProviderRegistry::new(String::new()),
                    WidgetOptions::default(),
                    Box::new(StaticRecordSource::empty()),
                )
            }
        };

    tracing::info!(providers = ?registry.list_names(), "LLM providers registered");

    let context = read_context_or_placeholder(source.as_ref());
    let board = Arc::new(match &context.snapshot {
        Some(snapshot) => LabelBoard::from_snapshot(snapshot),
        None => LabelBoard::empty(),
    });
    tracing::info!(fields = context.index.len(), "record context ready");

    let session = ModelSession::open(&registry).await;
    let (widget, mut events) = AssistantWidget::create(session, context, board, options);

    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(TranscriptEvent::TurnSettled { turn, .. }) if turn.role == Role::Assistant => {
                    if turn.flagged {
                        println!("!! {}", turn.text);
                    } else {
                        println!("<< {}", turn.text);
                    }
                }
                Ok(TranscriptEvent::ModeChanged { mode }) => println!("-- mode: {}", mode.label()),
                Ok(_) => {}
                Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "transcript printer lagged");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "stdin read failed");
                break;
            }
        };
        let sent = match line.trim() {
            "/quit" | "/exit" => break,
            "/agent" => widget.set_mode(AgentMode::Agent).await,
            "/chat" => widget.set_mode(AgentMode::Chat).await,
            "/mode" => widget.toggle_mode().await,
            _ => widget.submit(line.clone()).await,
        };
        if let Err(e) = sent {
            tracing::warn!(error = %e, "input not delivered");
        }
    }

    match widget.destroy().await {
        Ok(transcript) => tracing::info!(turns = transcript.len(), "session ended"),
        Err(e) => tracing::error!(error = %e, "session ended with error"),
    }
    // Every sender is gone once the widget is destroyed, which closes the printer.
    let _ = printer.await;
}

fn record_source(cfg: &AppConfig) -> Box<dyn RecordSource> {
    match &cfg.record.snapshot_path {
        Some(path) => Box::new(JsonRecordSource::new(path)),
        None => Box::new(StaticRecordSource::empty()),
    }
}
