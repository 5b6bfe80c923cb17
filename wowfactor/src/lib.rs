//! WowFactor CLI library: argument parsing, bootstrap handoff, command dispatch.

mod cli;
mod commands;
mod ui;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands, EnvAction};
use commands::launch::launch;
use commands::{bench, env, menu, scores, AppContext};
use ui::prompt::StdinPrompt;
use wowfactor_bench::workload::DEFAULT_DURATION_SECS;
use wowfactor_bench::RunMode;
use wowfactor_core::config::{BootstrapConfig, WorkspaceConfig};
use wowfactor_core::observability::init_tracing;
use wowfactor_core::signal::install_interrupt_handler;

/// Run the CLI. Returns the process exit code.
pub fn run_cli() -> Result<i32> {
    let cli = Cli::parse();
    let workspace = WorkspaceConfig::from_env();
    init_tracing(Some(&workspace.log_file()));
    install_interrupt_handler()?;

    let mut boot = BootstrapConfig::from_env();
    if cli.no_bootstrap {
        boot.enabled = false;
    }
    if cli.upgrade_deps {
        boot.upgrade = true;
    }
    let ctx = AppContext { workspace, boot };

    match cli.command.unwrap_or(Commands::Menu) {
        Commands::Menu => launch(&ctx, |env| menu::run_menu(&ctx, env)),
        Commands::Run { duration, infinite } => {
            let mode = match duration {
                _ if infinite => RunMode::Infinite,
                Some(secs) if !(secs.is_finite() && secs > 0.0) => {
                    anyhow::bail!("Duration must be positive (use --infinite for an endless run)")
                }
                secs => RunMode::timed_secs(secs.unwrap_or(DEFAULT_DURATION_SECS)),
            };
            launch(&ctx, |env| bench::cmd_run(&ctx, env, mode))
        }
        Commands::Batch { runs, duration } => {
            launch(&ctx, |env| bench::cmd_batch(&ctx, env, runs, duration))
        }
        Commands::Scores {
            best_per_machine,
            cpu,
        } => scores::cmd_scores(&ctx.store(), best_per_machine, cpu),
        Commands::CleanScores { dry_run, yes } => {
            scores::clean_invalid(&ctx.store(), &mut StdinPrompt, dry_run, yes)?;
            Ok(0)
        }
        Commands::Bootstrap => commands::launch::cmd_bootstrap(&ctx),
        Commands::Env { action } => match action {
            EnvAction::Status => env::cmd_status(&ctx),
            EnvAction::Clean { dry_run, force } => {
                env::cmd_clean(&ctx, &mut StdinPrompt, dry_run, force)
            }
        },
    }
}
