//! Command dispatch: bridges CLI args -> core services -> output formatting.

pub mod aps;
pub mod ask;
pub mod config_cmd;
pub mod devices;
pub mod events;
pub mod poll;
pub mod status;
pub mod util;
pub mod watch;

use std::sync::Arc;

use meshwatch_core::MeshSnapshotSource;

use crate::cli::{Command, GlobalOpts};
use crate::config::{self, Resolved};
use crate::error::CliError;
use crate::state::StateDir;

/// Everything a network-bound command needs.
pub struct Session {
    pub resolved: Resolved,
    pub source: Arc<MeshSnapshotSource>,
    pub state: StateDir,
}

impl Session {
    pub fn open(global: &GlobalOpts) -> Result<Self, CliError> {
        let cfg = meshwatch_config::load_config()?;
        let resolved = config::resolve(global, &cfg)?;
        let source = Arc::new(resolved.snapshot_source()?);
        tracing::debug!(
            profile = %resolved.profile_name,
            api_url = %resolved.monitor.api_url,
            networks = resolved.monitor.networks.len(),
            "session opened"
        );
        Ok(Self {
            resolved,
            source,
            state: StateDir::resolve(global),
        })
    }
}

/// Dispatch a command to the appropriate handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        // The event log is local; no profile needed
        Command::Events(args) => events::handle(args, global),

        Command::Status => status::handle(&Session::open(global)?, global).await,
        Command::Devices(args) => devices::handle(&Session::open(global)?, args, global).await,
        Command::Aps(args) => aps::handle(&Session::open(global)?, args, global).await,
        Command::Poll => poll::handle(Session::open(global)?, global).await,
        Command::Watch(args) => watch::handle(Session::open(global)?, args, global).await,
        Command::Ask(args) => ask::handle(Session::open(global)?, args, global).await,

        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
