//! Continuous polling; events are printed as they are detected.

use std::sync::Arc;

use meshwatch_core::{Event, EventStore, Monitor};
use tokio::sync::broadcast::error::RecvError;

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::config::retention;
use crate::error::CliError;
use crate::output;

use super::{Session, util};

fn render_event(event: &Event, format: &OutputFormat, color: bool) -> String {
    match format {
        OutputFormat::Json | OutputFormat::JsonCompact => {
            serde_json::to_string(event).unwrap_or_default()
        }
        OutputFormat::Yaml => serde_yaml::to_string(event).unwrap_or_default(),
        OutputFormat::Plain => format!("{}\t{}", event.kind(), event),
        OutputFormat::Table => format!(
            "{}  {}",
            output::dim(&util::format_time(event.timestamp()), color),
            event
        ),
    }
}

pub async fn handle(session: Session, args: WatchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = meshwatch_config::load_config_or_default();
    let store: Arc<dyn EventStore> = Arc::new(session.state.open_store(retention(&cfg))?);

    let mut config = session.resolved.monitor.clone();
    if let Some(interval) = args.interval {
        if interval.is_zero() {
            return Err(CliError::Validation {
                field: "interval".into(),
                reason: "must be greater than zero".into(),
            });
        }
        config.poll_interval = interval;
    }
    let interval = config.poll_interval;

    let monitor = Monitor::new(config, Arc::clone(&session.source), store);
    if let Some(baseline) = session.state.load_baseline()? {
        monitor.set_baseline(baseline).await;
    }

    let mut events = monitor.events();
    monitor.start().await;
    output::note(
        &format!(
            "Watching {} network(s) every {}. Press Ctrl-C to stop.",
            session.resolved.monitor.networks.len(),
            humantime::format_duration(interval)
        ),
        global.quiet,
    );

    let color = output::should_color(&global.color);
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            received = events.recv() => match received {
                Ok(event) => {
                    output::print_output(&render_event(&event, &global.output, color), global.quiet);
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event output fell behind");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    monitor.stop().await;
    if let Some(baseline) = monitor.baseline().await {
        session.state.save_baseline(&baseline)?;
    }
    output::note("Stopped.", global.quiet);
    Ok(())
}
