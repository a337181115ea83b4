//! Shared configuration for meshwatch.
//!
//! TOML profiles, per-network token resolution (env + keyring + plaintext),
//! and translation to `meshwatch_core::MonitorConfig`. The CLI adds
//! flag-aware overrides on top.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::TimeDelta;
use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use meshwatch_api::{MeshClient, TlsMode, TokenSource, TransportConfig};
use meshwatch_core::{DetectionThresholds, MonitorConfig, NetworkTarget};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Keyring service name; entries are keyed `"{profile}/{network_id}"`.
pub const KEYRING_SERVICE: &str = "meshwatch";

/// Overrides the config file location when set.
pub const CONFIG_PATH_ENV: &str = "MESHWATCH_CONFIG";

/// Default controller API host.
pub const DEFAULT_API_HOST: &str = meshwatch_api::client::DEFAULT_API_HOST;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{profile}' not found")]
    UnknownProfile { profile: String },

    #[error("no token configured for network '{network_id}' in profile '{profile}'")]
    NoCredentials { profile: String, network_id: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named account profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Resolve a profile by explicit name, else the default profile.
    pub fn profile(&self, name: Option<&str>) -> Result<(&str, &Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or("default");
        self.profiles
            .get_key_value(name)
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| ConfigError::UnknownProfile {
                profile: name.into(),
            })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    #[serde(default = "default_retention_days")]
    pub retention_days: u32,

    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            poll_interval_secs: default_poll_interval(),
            retention_days: default_retention_days(),
            recent_limit: default_recent_limit(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    10
}
fn default_poll_interval() -> u64 {
    300
}
fn default_retention_days() -> u32 {
    30
}
fn default_recent_limit() -> usize {
    50
}

/// A named account profile: one API host and the networks it can read.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// API host (e.g., "api-user.e2ro.com"); scheme optional.
    pub api_host: Option<String>,

    #[serde(default)]
    pub networks: Vec<NetworkEntry>,

    /// Accept invalid TLS certificates.
    pub insecure: Option<bool>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override timeout.
    pub timeout: Option<u64>,

    /// Override poll interval.
    pub poll_interval_secs: Option<u64>,

    /// Override detection thresholds.
    pub thresholds: Option<DetectionThresholds>,
}

/// One network and where its user token comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct NetworkEntry {
    pub id: String,

    /// Display name; defaults to the id.
    pub name: Option<String>,

    /// User token (plaintext; prefer keyring or env var).
    pub token: Option<String>,

    /// Environment variable name containing the token.
    pub token_env: Option<String>,
}

impl NetworkEntry {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.id)
    }
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "meshwatch", "meshwatch")
}

/// Resolve the config file path: `MESHWATCH_CONFIG`, else platform
/// conventions.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    project_dirs().map_or_else(
        || home_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Directory for persisted state (baseline snapshot, event log).
pub fn state_dir() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(".local/share"),
        |dirs| dirs.data_dir().to_path_buf(),
    )
}

fn home_fallback(sub: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(sub);
    p.push("meshwatch");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Layer defaults, then the TOML file at `path` (if any), then
/// `MESHWATCH_*` variables (`__` separates nested keys).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("MESHWATCH_").split("__"));

    Ok(figment.extract()?)
}

/// Load config, returning a default if it can't be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Token resolution ────────────────────────────────────────────────

fn keyring_user(profile_name: &str, network_id: &str) -> String {
    format!("{profile_name}/{network_id}")
}

/// Store a network token in the system keyring.
pub fn store_token(profile_name: &str, network_id: &str, token: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &keyring_user(profile_name, network_id))?;
    entry.set_password(token)?;
    Ok(())
}

/// Resolve one network's token: `token_env` → keyring → plaintext.
pub fn resolve_token(
    entry: &NetworkEntry,
    profile_name: &str,
    use_keyring: bool,
) -> Result<SecretString, ConfigError> {
    // 1. Entry's token_env → env var lookup
    if let Some(ref env_name) = entry.token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if use_keyring {
        if let Ok(kr) = keyring::Entry::new(KEYRING_SERVICE, &keyring_user(profile_name, &entry.id))
        {
            if let Ok(secret) = kr.get_password() {
                return Ok(SecretString::from(secret));
            }
        }
    }

    // 3. Plaintext in config
    if let Some(ref token) = entry.token {
        return Ok(SecretString::from(token.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
        network_id: entry.id.clone(),
    })
}

/// [`TokenSource`] over a profile's network entries.
pub struct ProfileTokenSource {
    profile_name: String,
    entries: HashMap<String, NetworkEntry>,
    use_keyring: bool,
}

impl ProfileTokenSource {
    pub fn new(profile: &Profile, profile_name: &str) -> Self {
        Self {
            profile_name: profile_name.into(),
            entries: profile
                .networks
                .iter()
                .map(|n| (n.id.clone(), n.clone()))
                .collect(),
            use_keyring: true,
        }
    }

    /// Skip the system keyring (headless hosts, tests).
    #[must_use]
    pub fn without_keyring(mut self) -> Self {
        self.use_keyring = false;
        self
    }
}

impl TokenSource for ProfileTokenSource {
    fn fetch_token(&self, network_id: &str) -> Result<SecretString, meshwatch_api::Error> {
        let entry = self
            .entries
            .get(network_id)
            .ok_or_else(|| meshwatch_api::Error::MissingToken {
                network_id: network_id.into(),
            })?;
        resolve_token(entry, &self.profile_name, self.use_keyring).map_err(|_| {
            meshwatch_api::Error::MissingToken {
                network_id: network_id.into(),
            }
        })
    }
}

// ── Translation ─────────────────────────────────────────────────────

fn validate_networks(profile: &Profile, profile_name: &str) -> Result<(), ConfigError> {
    if profile.networks.is_empty() {
        return Err(ConfigError::Validation {
            field: format!("profiles.{profile_name}.networks"),
            reason: "at least one network is required".into(),
        });
    }
    let mut seen = HashSet::new();
    for network in &profile.networks {
        if network.id.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: format!("profiles.{profile_name}.networks.id"),
                reason: "network id must not be empty".into(),
            });
        }
        if !seen.insert(network.id.as_str()) {
            return Err(ConfigError::Validation {
                field: format!("profiles.{profile_name}.networks.id"),
                reason: format!("duplicate network id '{}'", network.id),
            });
        }
    }
    Ok(())
}

/// Build a `MonitorConfig` from a profile, with global defaults filling
/// whatever the profile leaves unset.
pub fn profile_to_monitor_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<MonitorConfig, ConfigError> {
    validate_networks(profile, profile_name)?;

    let host = profile.api_host.as_deref().unwrap_or(DEFAULT_API_HOST);
    let api_url = MeshClient::base_url_for_host(host).map_err(|e| ConfigError::Validation {
        field: "api_host".into(),
        reason: format!("{host}: {e}"),
    })?;

    let networks = profile
        .networks
        .iter()
        .map(|n| NetworkTarget::new(n.id.as_str(), n.display_name()))
        .collect();

    let mut config = MonitorConfig::new(api_url, networks);
    config.request_timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.poll_interval = Duration::from_secs(
        profile
            .poll_interval_secs
            .unwrap_or(defaults.poll_interval_secs),
    );
    config.thresholds = profile.thresholds.unwrap_or_default();
    config.retention = TimeDelta::days(i64::from(defaults.retention_days));
    config.recent_limit = defaults.recent_limit;
    Ok(config)
}

/// HTTP transport settings for a profile.
pub fn profile_transport(profile: &Profile, defaults: &Defaults) -> TransportConfig {
    let tls = if profile.insecure.unwrap_or(false) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    };
    TransportConfig {
        tls,
        ..TransportConfig::default()
    }
    .with_timeout(Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)))
}
