// ── Voice queries ──
//
// Answers spoken-style questions from the latest snapshots and the event
// store. Snapshots are cached briefly so a burst of questions costs one
// fetch; if a refresh fails the last good view is served instead.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use meshwatch_api::TtlCache;
use serde::Serialize;
use strum::{Display, EnumIter, EnumString};
use tracing::{debug, warn};

use crate::config::{DEFAULT_RECENT_LIMIT, DEFAULT_RECENT_WINDOW};
use crate::error::CoreError;
use crate::model::{AccessPoint, Event, NetworkSnapshot};
use crate::provider::SnapshotSource;
use crate::speech;
use crate::store::{EventQuery, EventStore};

/// How long a fetched view answers questions before it is refreshed.
pub const RESPONSE_CACHE_TTL: Duration = Duration::from_secs(30);

const TROUBLE: &str =
    "Sorry, I had trouble connecting to your network. Please make sure it's online and try again.";

/// A question the assistant understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, EnumIter)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Intent {
    Launch,
    #[strum(to_string = "device-count", serialize = "devices")]
    DeviceCount,
    #[strum(to_string = "network-status", serialize = "status")]
    NetworkStatus,
    #[strum(to_string = "device-types", serialize = "types")]
    DeviceTypes,
    #[strum(to_string = "ap-performance", serialize = "aps")]
    ApPerformance,
    #[strum(to_string = "recent-events", serialize = "events")]
    RecentEvents,
    Help,
    Stop,
    Fallback,
}

/// A spoken answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response {
    pub speech: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reprompt: Option<String>,
    pub end_session: bool,
}

impl Response {
    fn say(speech: impl Into<String>) -> Self {
        Self {
            speech: speech.into(),
            reprompt: None,
            end_session: true,
        }
    }

    fn ask(speech: impl Into<String>, reprompt: impl Into<String>) -> Self {
        Self {
            speech: speech.into(),
            reprompt: Some(reprompt.into()),
            end_session: false,
        }
    }
}

/// Snapshots of the networks that answered, plus how many were asked.
#[derive(Debug, Clone)]
struct NetworkView {
    snapshots: Vec<NetworkSnapshot>,
    network_count: usize,
}

impl NetworkView {
    fn access_points(&self) -> Vec<AccessPoint> {
        self.snapshots
            .iter()
            .flat_map(|s| s.access_points.iter().cloned())
            .collect()
    }
}

// ── Assistant ────────────────────────────────────────────────────────

pub struct Assistant<S> {
    source: S,
    store: Arc<dyn EventStore>,
    cache: TtlCache<(), NetworkView>,
    recent_window: TimeDelta,
    recent_limit: usize,
}

impl<S: SnapshotSource> Assistant<S> {
    pub fn new(source: S, store: Arc<dyn EventStore>) -> Self {
        Self {
            source,
            store,
            cache: TtlCache::new(RESPONSE_CACHE_TTL),
            recent_window: DEFAULT_RECENT_WINDOW,
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }

    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache = TtlCache::new(ttl);
        self
    }

    #[must_use]
    pub fn with_recent(mut self, window: TimeDelta, limit: usize) -> Self {
        self.recent_window = window;
        self.recent_limit = limit;
        self
    }

    /// Drop the cached view so the next question fetches fresh data.
    pub fn invalidate(&self) {
        self.cache.invalidate(&());
    }

    pub async fn answer(&self, intent: Intent) -> Response {
        debug!(%intent, "answering");
        match intent {
            Intent::Launch => {
                let text = match self.view().await {
                    Ok(view) => speech::welcome(
                        view.snapshots.iter().map(|s| s.total_devices).sum(),
                        view.network_count,
                        view.snapshots.len(),
                    ),
                    Err(_) => speech::welcome(0, 0, 0),
                };
                Response::ask(text, speech::REPROMPT)
            }
            Intent::DeviceCount => self.from_view(|v| speech::device_count(&v.snapshots)).await,
            Intent::NetworkStatus => self.from_view(|v| speech::network_status(&v.snapshots)).await,
            Intent::DeviceTypes => self.from_view(|v| speech::device_types(&v.snapshots)).await,
            Intent::ApPerformance => {
                self.from_view(|v| speech::ap_performance(&v.access_points()))
                    .await
            }
            Intent::RecentEvents => match self.recent_events() {
                Ok(events) => Response::say(speech::recent_events(&events, Utc::now())),
                Err(e) => {
                    warn!(error = %e, "event lookup failed");
                    Response::say(TROUBLE)
                }
            },
            Intent::Help => Response::ask(speech::help(), speech::help()),
            Intent::Stop => Response::say(speech::goodbye()),
            Intent::Fallback => Response::ask(speech::fallback(), speech::REPROMPT),
        }
    }

    async fn from_view(&self, render: impl FnOnce(&NetworkView) -> String) -> Response {
        match self.view().await {
            Ok(view) => Response::say(render(&view)),
            Err(e) => {
                warn!(error = %e, "no network data to answer from");
                Response::say(TROUBLE)
            }
        }
    }

    fn recent_events(&self) -> Result<Vec<Event>, CoreError> {
        let query = EventQuery::within(self.recent_window, Utc::now()).limit(self.recent_limit);
        Ok(self
            .store
            .recent(&query)?
            .into_iter()
            .map(|stored| stored.event)
            .collect())
    }

    /// Fresh cached view, else a new fetch, else the stale view.
    async fn view(&self) -> Result<NetworkView, CoreError> {
        if let Some(view) = self.cache.get(&()) {
            return Ok(view);
        }

        let report = self.source.fetch_snapshots().await;
        if report.snapshots.is_empty() {
            if let Some(stale) = self.cache.get_stale(&()) {
                warn!(
                    failures = report.failures.len(),
                    "refresh failed; serving cached network data"
                );
                return Ok(stale);
            }
            return Err(report.failures.first().map_or(CoreError::NoData, |f| {
                CoreError::Api {
                    message: format!("{}: {}", f.network_name, f.error),
                    status: None,
                }
            }));
        }

        let view = NetworkView {
            network_count: report.network_count(),
            snapshots: report.snapshots,
        };
        self.cache.insert((), view.clone());
        Ok(view)
    }
}
