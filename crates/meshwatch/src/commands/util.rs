//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::time::Duration;

use chrono::TimeDelta;
use indicatif::{ProgressBar, ProgressStyle};
use meshwatch_core::{FetchReport, MonitorConfig, NetworkFailure, NetworkSnapshot, SnapshotSource};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Fetch every network, with a spinner on interactive terminals.
///
/// Partial failures are reported on stderr; total failure is an error.
pub async fn fetch<S: SnapshotSource>(source: &S, global: &GlobalOpts) -> Result<FetchReport, CliError> {
    let spinner = (!global.quiet && std::io::stderr().is_terminal()).then(|| {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message("Fetching networks...");
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    });

    let report = source.fetch_snapshots().await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    if report.is_total_failure() {
        return Err(CliError::AllNetworksFailed {
            details: failure_details(&report),
        });
    }
    if !global.quiet {
        for failure in &report.failures {
            eprintln!("{}", failure_warning(failure));
        }
    }
    Ok(report)
}

/// One stderr line for a network that did not answer.
pub fn failure_warning(failure: &NetworkFailure) -> String {
    let hint = if failure.transient {
        " (will retry next poll)"
    } else {
        ""
    };
    format!(
        "warning: {} ({}) unavailable: {}{hint}",
        failure.network_name, failure.network_id, failure.error
    )
}

fn failure_details(report: &FetchReport) -> String {
    report
        .failures
        .iter()
        .map(|f| format!("{}: {}", f.network_name, f.error))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Keep only the snapshot for `network` (id or name), when given.
pub fn filter_network(
    config: &MonitorConfig,
    snapshots: Vec<NetworkSnapshot>,
    network: Option<&str>,
) -> Result<Vec<NetworkSnapshot>, CliError> {
    let Some(key) = network else {
        return Ok(snapshots);
    };
    let target = config.find_network(key).ok_or_else(|| CliError::NotFound {
        resource_type: "network".into(),
        identifier: key.into(),
        list_command: "status".into(),
    })?;
    Ok(snapshots.into_iter().filter(|s| s.id == target.id).collect())
}

/// Convert a CLI duration into a chrono window.
pub fn window(duration: Duration, field: &str) -> Result<TimeDelta, CliError> {
    TimeDelta::from_std(duration).map_err(|_| CliError::Validation {
        field: field.into(),
        reason: "duration is too large".into(),
    })
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::Validation {
            field: "--yes".into(),
            reason: format!("'{message}' needs confirmation; pass --yes in non-interactive use"),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))
}

/// Short local timestamp for tables.
pub fn format_time(ts: chrono::DateTime<chrono::Utc>) -> String {
    ts.with_timezone(&chrono::Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

#[cfg(test)]
mod tests {
    use meshwatch_core::NetworkId;

    use super::*;

    fn failure(transient: bool) -> NetworkFailure {
        NetworkFailure {
            network_id: NetworkId::from("n1"),
            network_name: "Home".into(),
            error: "boom".into(),
            transient,
        }
    }

    #[test]
    fn transient_failures_say_they_will_retry() {
        assert_eq!(
            failure_warning(&failure(true)),
            "warning: Home (n1) unavailable: boom (will retry next poll)"
        );
        assert_eq!(
            failure_warning(&failure(false)),
            "warning: Home (n1) unavailable: boom"
        );
    }
}
