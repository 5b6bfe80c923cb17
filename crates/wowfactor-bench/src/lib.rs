//! WowFactor benchmark engine.
//!
//! - `workload`: the timed counting loop, duration and batch input rules
//! - `system`: CPU model / frequency / platform probing
//! - `record`: one run's score as stored on disk
//! - `store`: the results directory
//! - `scoreboard`: leaderboard queries and cell formatting

pub mod error;
pub mod record;
pub mod scoreboard;
pub mod store;
pub mod system;
pub mod workload;

pub use error::BenchError;
pub use record::{ScoreRecord, SystemInfo};
pub use store::ScoreStore;
pub use workload::{RunMode, RunStats, Workload};
