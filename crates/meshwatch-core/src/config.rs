// ── Runtime monitor configuration ──
//
// These types describe *what* to watch and how often. They never touch
// disk: the CLI resolves a profile from meshwatch-config, builds a
// `MonitorConfig`, and hands it in.

use std::time::Duration;

use chrono::TimeDelta;
use url::Url;

use crate::detect::DetectionThresholds;
use crate::model::NetworkId;

/// Default poll interval (5 minutes).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(300);

/// Default per-network fetch timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Default event retention (30 days).
pub const DEFAULT_RETENTION: TimeDelta = TimeDelta::days(30);

/// Default recent-events window (24 hours).
pub const DEFAULT_RECENT_WINDOW: TimeDelta = TimeDelta::hours(24);

/// Default cap on recent-event queries.
pub const DEFAULT_RECENT_LIMIT: usize = 50;

/// One logical network to poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkTarget {
    pub id: NetworkId,
    pub name: String,
}

impl NetworkTarget {
    pub fn new(id: impl Into<NetworkId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Configuration for one monitor instance.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Versioned API base URL, e.g. `https://api-user.e2ro.com/2.2`.
    pub api_url: Url,
    pub networks: Vec<NetworkTarget>,
    pub poll_interval: Duration,
    /// Per-network fetch timeout.
    pub request_timeout: Duration,
    pub thresholds: DetectionThresholds,
    /// How long stored events live.
    pub retention: TimeDelta,
    pub recent_window: TimeDelta,
    pub recent_limit: usize,
}

impl MonitorConfig {
    pub fn new(api_url: Url, networks: Vec<NetworkTarget>) -> Self {
        Self {
            api_url,
            networks,
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            thresholds: DetectionThresholds::default(),
            retention: DEFAULT_RETENTION,
            recent_window: DEFAULT_RECENT_WINDOW,
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }

    /// Look up a configured network by id or (case-insensitive) name.
    pub fn find_network(&self, key: &str) -> Option<&NetworkTarget> {
        self.networks
            .iter()
            .find(|n| n.id.as_str() == key || n.name.eq_ignore_ascii_case(key))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn find_network_matches_id_or_name() {
        let config = MonitorConfig::new(
            Url::parse("https://example.com/2.2").unwrap(),
            vec![
                NetworkTarget::new("111", "Home"),
                NetworkTarget::new("222", "Cabin"),
            ],
        );
        assert_eq!(config.find_network("222").unwrap().name, "Cabin");
        assert_eq!(config.find_network("home").unwrap().id.as_str(), "111");
        assert!(config.find_network("office").is_none());
        assert_eq!(config.recent_limit, 50);
    }
}
