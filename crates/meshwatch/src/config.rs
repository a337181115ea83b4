//! CLI-aware configuration: applies global flag overrides on top of a
//! `meshwatch_config::Profile` and builds the live snapshot source.

use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use meshwatch_api::{MeshClient, TokenCache, TransportConfig};
use meshwatch_config::{Config, Profile, ProfileTokenSource};
use meshwatch_core::{CoreError, MeshSnapshotSource, MonitorConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Tokens are re-resolved after this long.
const TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

pub use meshwatch_config::{config_path, load_config_or_default};

/// A profile resolved against the command line.
pub struct Resolved {
    pub profile_name: String,
    pub profile: Profile,
    pub monitor: MonitorConfig,
    pub transport: TransportConfig,
}

// ── Profile resolution ───────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Look up the active profile, listing the alternatives if it is missing.
pub fn active_profile(global: &GlobalOpts, config: &Config) -> Result<(String, Profile), CliError> {
    let name = active_profile_name(global, config);
    match config.profiles.get(&name) {
        Some(profile) => Ok((name, profile.clone())),
        None => {
            let mut available: Vec<_> = config.profiles.keys().cloned().collect();
            available.sort();
            Err(CliError::ProfileNotFound {
                name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            })
        }
    }
}

/// Apply flag overrides (flag > env > profile) and translate to core types.
pub fn resolve(global: &GlobalOpts, config: &Config) -> Result<Resolved, CliError> {
    let (profile_name, mut profile) = active_profile(global, config)?;

    if let Some(ref host) = global.api_host {
        profile.api_host = Some(host.clone());
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
    if global.insecure {
        profile.insecure = Some(true);
    }

    let monitor =
        meshwatch_config::profile_to_monitor_config(&profile, &profile_name, &config.defaults)?;
    let transport = meshwatch_config::profile_transport(&profile, &config.defaults);

    Ok(Resolved {
        profile_name,
        profile,
        monitor,
        transport,
    })
}

/// Event retention from global defaults; usable without any profile.
pub fn retention(config: &Config) -> TimeDelta {
    TimeDelta::days(i64::from(config.defaults.retention_days))
}

impl Resolved {
    /// Build the live, token-authenticated snapshot source.
    pub fn snapshot_source(&self) -> Result<MeshSnapshotSource, CliError> {
        let tokens = TokenCache::new(
            Arc::new(ProfileTokenSource::new(&self.profile, &self.profile_name)),
            TOKEN_TTL,
        );
        let client = MeshClient::new(self.monitor.api_url.clone(), tokens, &self.transport)
            .map_err(CoreError::from)?;
        Ok(MeshSnapshotSource::new(
            Arc::new(client),
            self.monitor.networks.clone(),
            self.monitor.request_timeout,
        ))
    }
}
