//! Event log handlers. These work offline against the local store.

use chrono::Utc;
use meshwatch_core::{EventKind, EventQuery, EventStore, EventSummary, NetworkId, StoredEvent};
use tabled::Tabled;

use crate::cli::{EventsArgs, EventsCommand, GlobalOpts};
use crate::config::{load_config_or_default, retention};
use crate::error::CliError;
use crate::output;
use crate::state::StateDir;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct StoredEventRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Network")]
    network: String,
    #[tabled(rename = "Details")]
    details: String,
}

impl From<&StoredEvent> for StoredEventRow {
    fn from(s: &StoredEvent) -> Self {
        Self {
            time: util::format_time(s.event.timestamp()),
            kind: s.event.kind().to_string(),
            network: s.event.network_name().to_owned(),
            details: s.event.to_string(),
        }
    }
}

fn summary_detail(s: &EventSummary) -> String {
    format!(
        "Total events:        {}\n\
         Device connections:  {}\n\
         Disconnections:      {}\n\
         New devices:         {}\n\
         Performance alerts:  {}\n\
         Access point events: {}",
        s.total_events,
        s.device_connections,
        s.device_disconnections,
        s.new_devices,
        s.performance_alerts,
        s.ap_events
    )
}

fn parse_kind(raw: &str) -> Result<EventKind, CliError> {
    raw.parse().map_err(|_| CliError::Validation {
        field: "kind".into(),
        reason: format!(
            "unknown event type '{raw}'; expected device_connected, device_disconnected, \
             significant_device_change, ap_load_imbalance, or ap_device_change"
        ),
    })
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: EventsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = load_config_or_default();
    let ttl = retention(&cfg);
    let store = StateDir::resolve(global).open_store(ttl)?;
    let now = Utc::now();

    match args.command {
        EventsCommand::List {
            limit,
            within,
            kind,
            network,
        } => {
            let mut query = EventQuery::within(util::window(within, "within")?, now).limit(limit);
            if let Some(ref kind) = kind {
                query = query.kind(parse_kind(kind)?);
            }
            if let Some(network) = network {
                query = query.network(NetworkId::new(network));
            }

            let events = store.recent(&query)?;
            let out = output::render_list(
                &global.output,
                &events,
                |s| StoredEventRow::from(s),
                |s| s.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        EventsCommand::Summary { within } => {
            let query = EventQuery::within(util::window(within, "within")?, now).limit(usize::MAX);
            let events = store.recent(&query)?;
            let summary = EventSummary::from_events(events.iter().map(|s| &s.event));
            let out = output::render_single(
                &global.output,
                &summary,
                summary_detail,
                |s| s.total_events.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        EventsCommand::Purge { older_than } => {
            let cutoff_age = match older_than {
                Some(d) => util::window(d, "older-than")?,
                None => ttl,
            };
            let prompt = format!(
                "Delete events older than {}?",
                humantime::format_duration(cutoff_age.to_std().unwrap_or_default())
            );
            if !util::confirm(&prompt, global.yes)? {
                return Ok(());
            }
            let removed = store.purge_older_than(now - cutoff_age)?;
            output::note(
                &format!("Purged {removed} event(s) from {}", store.path().display()),
                global.quiet,
            );
            Ok(())
        }
    }
}
