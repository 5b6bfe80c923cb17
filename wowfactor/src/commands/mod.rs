//! Command handlers.
//!
//!   launch: bootstrap-then-delegate wrapper around the benchmark commands
//!   bench:  single and batch runs, plus their interactive questions
//!   scores: leaderboards and invalid score cleanup
//!   env:    status and removal of the isolated environment
//!   menu:   the interactive benchmark interface

pub mod bench;
pub mod env;
pub mod launch;
pub mod menu;
pub mod scores;

use wowfactor_bench::ScoreStore;
use wowfactor_core::config::{BootstrapConfig, WorkspaceConfig};

/// Configuration shared by every command.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub workspace: WorkspaceConfig,
    pub boot: BootstrapConfig,
}

impl AppContext {
    pub fn store(&self) -> ScoreStore {
        ScoreStore::new(&self.workspace.results_dir)
    }
}
