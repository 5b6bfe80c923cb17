//! Leaderboard screens and cleanup of invalid score files.

use anyhow::{bail, Context, Result};
use wowfactor_bench::scoreboard::{self, rows};
use wowfactor_bench::{ScoreRecord, ScoreStore};

use crate::ui::header::print_header;
use crate::ui::prompt::{choose, confirm, Prompt};
use crate::ui::table::leaderboard;
use crate::ui::{centered, green, red, separator, yellow};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    All,
    BestPerMachine,
    Cpu(String),
}

impl View {
    pub fn title(&self) -> String {
        match self {
            View::All => "ALL SCORES (FULL LIST)".to_string(),
            View::BestPerMachine => "BEST SCORE PER MACHINE".to_string(),
            View::Cpu(model) => format!("COMPARISON: {}", model),
        }
    }

    pub fn select(&self, scores: Vec<ScoreRecord>) -> Vec<ScoreRecord> {
        match self {
            View::All => scoreboard::all_scores(scores),
            View::BestPerMachine => scoreboard::best_per_machine(scores),
            View::Cpu(model) => scoreboard::for_cpu(scores, model),
        }
    }
}

pub fn render(scores: &[ScoreRecord], title: &str) {
    print_header(title);
    if scores.is_empty() {
        println!(
            "{}",
            yellow().apply_to(centered(
                "No benchmark results found. Run a benchmark to create one!"
            ))
        );
        separator();
        return;
    }
    println!("{}", leaderboard(&rows(scores)).render());
    separator();
}

pub fn show(store: &ScoreStore, view: &View) -> Result<()> {
    let scores = store.load_valid().context("Failed to load scores")?;
    render(&view.select(scores), &view.title());
    Ok(())
}

/// `wowfactor scores`
pub fn cmd_scores(store: &ScoreStore, best_per_machine: bool, cpu: Option<String>) -> Result<i32> {
    let view = match (best_per_machine, cpu) {
        (_, Some(model)) => {
            let known = scoreboard::cpu_models(&store.load_valid()?);
            if !known.contains(&model) {
                if known.is_empty() {
                    bail!("No benchmark results found to compare.");
                }
                bail!(
                    "No scores for CPU '{}'. Known models: {}",
                    model,
                    known.join(", ")
                );
            }
            View::Cpu(model)
        }
        (true, None) => View::BestPerMachine,
        (false, None) => View::All,
    };
    show(store, &view)?;
    Ok(0)
}

/// Let the user pick one CPU model and show its scores.
pub fn compare_cpu(store: &ScoreStore, prompt: &mut dyn Prompt) -> Result<()> {
    let scores = store.load_valid()?;
    print_header("COMPARE CPUs");
    if scores.is_empty() {
        println!(
            "{}",
            yellow().apply_to(centered("No benchmark results found to compare."))
        );
        separator();
        return Ok(());
    }
    let models = scoreboard::cpu_models(&scores);
    if let Some(i) = choose(prompt, &models, "CPU to compare")? {
        let view = View::Cpu(models[i].clone());
        render(&view.select(scores), &view.title());
    }
    Ok(())
}

/// List invalid score files and delete them after confirmation. Returns the
/// number deleted.
pub fn clean_invalid(
    store: &ScoreStore,
    prompt: &mut dyn Prompt,
    dry_run: bool,
    assume_yes: bool,
) -> Result<usize> {
    print_header("CLEAR INVALID SCORES");
    if !store.exists() {
        println!(
            "{}",
            yellow().apply_to("Benchmark directory not found. Nothing to do.")
        );
        return Ok(0);
    }
    if store.json_files()?.is_empty() {
        println!(
            "{}",
            yellow().apply_to("No benchmark files found. Nothing to do.")
        );
        return Ok(0);
    }
    let invalid = store.find_invalid()?;
    if invalid.is_empty() {
        println!(
            "{}",
            green().apply_to("No invalid or outdated score files found.")
        );
        return Ok(0);
    }

    println!(
        "{}",
        yellow().apply_to("The following invalid/outdated score files were found:")
    );
    for name in &invalid {
        println!("  - {}", name);
    }
    if dry_run {
        println!("\n(Dry run, no files removed. Remove --dry-run to delete.)");
        return Ok(0);
    }
    if !assume_yes && !confirm(prompt, "\nDo you want to delete these files?")? {
        tracing::info!("User cancelled invalid score cleanup");
        println!("{}", yellow().apply_to("Cleanup cancelled."));
        return Ok(0);
    }

    let report = store.delete(&invalid);
    for name in &report.deleted {
        println!("{}", green().apply_to(format!("Deleted: {}", name)));
    }
    for (name, err) in &report.failed {
        println!("{}", red().apply_to(format!("Error deleting {}: {}", name, err)));
    }
    println!(
        "\n{}",
        green().apply_to(format!(
            "Cleanup complete. {} files deleted.",
            report.deleted.len()
        ))
    );
    Ok(report.deleted.len())
}
