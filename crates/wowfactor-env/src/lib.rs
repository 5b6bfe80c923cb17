//! Isolated runtime environment for the benchmark's probe helpers.
//!
//! The launcher creates (or reuses) a Python virtual environment, installs the
//! configured requirements, and re-launches the current executable inside it.
//! All process spawning goes through [`runner::CommandRunner`].

pub mod builder;
pub mod error;
pub mod launcher;
pub mod requirement;
pub mod runner;

pub use builder::{EnvLayout, EnvReport, EnvironmentBuilder};
pub use error::EnvError;
pub use launcher::{detect_stage, handoff, prepare, Prepared, Relaunch, Stage};
pub use requirement::Requirement;
pub use runner::{CommandOutput, CommandRunner, CommandSpec, SystemRunner};
