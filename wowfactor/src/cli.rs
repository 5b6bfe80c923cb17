use clap::{Parser, Subcommand};

use wowfactor_bench::workload::{BATCH_MAX_RUNS, BATCH_MIN_RUNS};

/// WowFactor - retro CPU benchmark with local leaderboards
#[derive(Parser, Debug)]
#[command(name = "wowfactor")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run without creating or entering the isolated environment
    #[arg(long, global = true)]
    pub no_bootstrap: bool,

    /// Reinstall environment packages even if they look current
    #[arg(long, global = true)]
    pub upgrade_deps: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open the interactive benchmark interface (default)
    Menu,

    /// Run one benchmark and save the score
    Run {
        /// Test duration in seconds (default: 15)
        #[arg(long, short, value_name = "SECS", conflicts_with = "infinite")]
        duration: Option<f64>,

        /// Run until Ctrl+C
        #[arg(long)]
        infinite: bool,
    },

    /// Run several consecutive benchmarks with a cooldown in between
    Batch {
        /// Number of runs (2-100)
        #[arg(long, short, value_parser = clap::value_parser!(u32).range(BATCH_MIN_RUNS as i64..=BATCH_MAX_RUNS as i64))]
        runs: u32,

        /// Duration of each run in seconds
        #[arg(long, short, value_name = "SECS", default_value = "15", value_parser = clap::value_parser!(u64).range(1..))]
        duration: u64,
    },

    /// Show the leaderboard
    Scores {
        /// Only the best score of each machine
        #[arg(long, conflicts_with = "cpu")]
        best_per_machine: bool,

        /// Only scores of this CPU model
        #[arg(long, value_name = "MODEL")]
        cpu: Option<String>,
    },

    /// Delete score files that cannot be read or lack required fields
    #[command(name = "clean-scores")]
    CleanScores {
        /// List the files without deleting them
        #[arg(long)]
        dry_run: bool,

        /// Delete without asking
        #[arg(long, short)]
        yes: bool,
    },

    /// Create the isolated environment and install packages, then exit
    Bootstrap,

    /// Inspect or remove the isolated environment
    Env {
        #[command(subcommand)]
        action: EnvAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum EnvAction {
    /// Show where the environment lives and whether it is current
    Status,

    /// Remove the environment directory
    Clean {
        /// Show what would be removed without deleting
        #[arg(long)]
        dry_run: bool,

        /// Remove without confirmation
        #[arg(long, short)]
        force: bool,
    },
}
