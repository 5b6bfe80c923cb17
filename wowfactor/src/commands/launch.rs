//! Bootstrap-then-delegate for the commands that run the benchmark.

use anyhow::{Context, Result};
use wowfactor_core::signal::StopSignal;
use wowfactor_env::launcher::builder_for;
use wowfactor_env::{
    detect_stage, handoff, prepare, EnvLayout, EnvReport, Prepared, Relaunch, Stage, SystemRunner,
};

use super::AppContext;
use crate::ui::{green, yellow};

/// Run `body` inside the isolated environment.
///
/// Outside the environment this creates or refreshes it, re-launches the
/// program inside it with the same arguments, and returns the child's exit
/// code; `body` then runs in the child only.
pub fn launch<F>(ctx: &AppContext, body: F) -> Result<i32>
where
    F: FnOnce(Option<&EnvLayout>) -> Result<i32>,
{
    let runner = SystemRunner;
    let relaunch = Relaunch::current(std::env::args_os().skip(1).collect())?;
    match prepare(&runner, &ctx.boot, &ctx.workspace, &relaunch)? {
        Prepared::RunHere { env } => body(env.as_ref()),
        Prepared::Handoff { report, command } => {
            print_setup_complete(&report);
            let stop = StopSignal::global();
            stop.reset();
            let code = handoff(&runner, &command)?;
            Ok(exit_code_after_handoff(code, stop.is_set()))
        }
    }
}

/// The child handles Ctrl+C itself and exits 0 when the user ends it, so its
/// code passes through. Only a child that died from the interrupt (killed by
/// the signal, or exit 130) counts as a clean stop; any other death is 1.
fn exit_code_after_handoff(child_code: Option<i32>, interrupted: bool) -> i32 {
    match child_code {
        Some(130) | None if interrupted => {
            tracing::warn!(?child_code, "Launch interrupted by user");
            0
        }
        Some(code) => code,
        None => 1,
    }
}

fn print_setup_complete(report: &EnvReport) {
    if report.created {
        println!("{}", green().apply_to("Virtual environment created."));
    }
    if report.installed {
        println!("{}", green().apply_to("Dependencies installed."));
    }
    println!(
        "\n{}\n",
        green().apply_to("SETUP COMPLETE. LAUNCHING APPLICATION...")
    );
}

/// `wowfactor bootstrap`
pub fn cmd_bootstrap(ctx: &AppContext) -> Result<i32> {
    let runner = SystemRunner;
    match detect_stage(&ctx.boot) {
        Stage::Disabled => {
            println!(
                "{}",
                yellow().apply_to("Bootstrap is disabled; nothing to set up.")
            );
        }
        Stage::Inside(layout) => {
            builder_for(&runner, &ctx.boot, &ctx.workspace, layout.clone())
                .verify()
                .context("Environment check failed")?;
            println!(
                "{} {}",
                green().apply_to("Already running inside"),
                layout.env_dir().display()
            );
        }
        Stage::Outside => {
            let layout = EnvLayout::new(&ctx.workspace.venv_dir);
            let builder = builder_for(&runner, &ctx.boot, &ctx.workspace, layout);
            let report = builder.ensure()?;
            builder.verify()?;
            println!(
                "{} {}",
                green().apply_to(if report.created {
                    "Created environment at"
                } else {
                    "Environment ready at"
                }),
                report.env_dir.display()
            );
            println!("  Interpreter: {}", report.python.display());
            println!(
                "  Packages:    {}",
                if report.installed {
                    "installed"
                } else {
                    "up to date"
                }
            );
        }
    }
    Ok(0)
}
