//! Persisted CLI state: the last polled snapshot (baseline) and the event log.
//!
//! One-shot `poll` runs diff against the baseline written by the previous
//! run, so detection works across process restarts.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, TimeDelta, Utc};
use meshwatch_core::{NetworkSnapshot, SqliteEventStore};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cli::GlobalOpts;
use crate::error::CliError;

const BASELINE_FILE: &str = "snapshot.json";
const EVENTS_FILE: &str = "events.db";

#[derive(Debug, Serialize, Deserialize)]
struct Baseline {
    saved_at: DateTime<Utc>,
    snapshots: Vec<NetworkSnapshot>,
}

pub struct StateDir {
    root: PathBuf,
}

impl StateDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `--state-dir`, else the platform data directory.
    pub fn resolve(global: &GlobalOpts) -> Self {
        Self::new(
            global
                .state_dir
                .clone()
                .unwrap_or_else(meshwatch_config::state_dir),
        )
    }

    pub fn events_path(&self) -> PathBuf {
        self.root.join(EVENTS_FILE)
    }

    fn baseline_path(&self) -> PathBuf {
        self.root.join(BASELINE_FILE)
    }

    pub fn open_store(&self, ttl: TimeDelta) -> Result<SqliteEventStore, CliError> {
        Ok(SqliteEventStore::open_with_ttl(self.events_path(), ttl)?)
    }

    /// The snapshot saved by the last poll, if any.
    pub fn load_baseline(&self) -> Result<Option<Vec<NetworkSnapshot>>, CliError> {
        let path = self.baseline_path();
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&path)?;
        let baseline: Baseline = serde_json::from_str(&raw)?;
        debug!(
            path = %path.display(),
            saved_at = %baseline.saved_at,
            networks = baseline.snapshots.len(),
            "loaded baseline"
        );
        Ok(Some(baseline.snapshots))
    }

    /// Replace the baseline (temp file + rename).
    pub fn save_baseline(&self, snapshots: &[NetworkSnapshot]) -> Result<(), CliError> {
        fs::create_dir_all(&self.root)?;
        let body = serde_json::to_vec_pretty(&Baseline {
            saved_at: Utc::now(),
            snapshots: snapshots.to_vec(),
        })?;
        let path = self.baseline_path();
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, body)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}
