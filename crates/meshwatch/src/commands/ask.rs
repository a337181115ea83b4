//! Spoken-style questions, answered from live data and the event log.

use std::sync::Arc;

use meshwatch_core::{Assistant, EventStore, Intent};

use crate::cli::{AskArgs, GlobalOpts};
use crate::config::retention;
use crate::error::CliError;
use crate::output;

use super::Session;

pub async fn handle(session: Session, args: AskArgs, global: &GlobalOpts) -> Result<(), CliError> {
    // Unrecognized questions get the fallback answer.
    let intent = args.intent.parse().unwrap_or_else(|_| {
        tracing::debug!(input = %args.intent, "unrecognized intent");
        Intent::Fallback
    });

    let cfg = meshwatch_config::load_config_or_default();
    let store: Arc<dyn EventStore> = Arc::new(session.state.open_store(retention(&cfg))?);
    let monitor = &session.resolved.monitor;
    let assistant = Assistant::new(Arc::clone(&session.source), store)
        .with_recent(monitor.recent_window, monitor.recent_limit);

    let response = assistant.answer(intent).await;
    let out = output::render_single(
        &global.output,
        &response,
        |r| r.speech.clone(),
        |r| r.speech.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
