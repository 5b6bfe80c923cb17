//! Benchmark runs: single, batch, and the questions the menu asks first.

use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Local;
use console::Alignment;
use wowfactor_bench::scoreboard::{format_decimal, group_thousands};
use wowfactor_bench::system::{collect_system_info, InterpreterProbe, NativeProbe};
use wowfactor_bench::workload::{
    parse_batch_duration, parse_batch_runs, DurationInput, FeedSample, BATCH_COOLDOWN,
};
use wowfactor_bench::{RunMode, RunStats, ScoreRecord, ScoreStore, SystemInfo, Workload};
use wowfactor_core::signal::StopSignal;
use wowfactor_env::{EnvLayout, SystemRunner};

use super::AppContext;
use crate::ui::header::print_header;
use crate::ui::prompt::{confirm, Prompt};
use crate::ui::table::Table;
use crate::ui::{centered, cyan, green, red, separator, yellow};

/// System description for a score: the environment's interpreter when one is
/// active, the native probe otherwise.
pub fn probe_system(env: Option<&EnvLayout>) -> SystemInfo {
    let native = NativeProbe;
    match env {
        Some(layout) => {
            let runner = SystemRunner;
            collect_system_info(&InterpreterProbe::new(&runner, layout.python()), &native)
        }
        None => collect_system_info(&native, &native),
    }
}

fn print_feed(sample: FeedSample) {
    let line = format!(
        "OP: {:<12} | OPS: {} ",
        group_thousands(sample.ops),
        format_decimal(sample.ops_per_second(), 0)
    );
    print!("\r{}", cyan().apply_to(line));
    let _ = std::io::stdout().flush();
}

/// Run once, save the score, and show the result screen. A failed save is
/// logged; the run still counts.
pub fn execute_run(
    store: &ScoreStore,
    env: Option<&EnvLayout>,
    mode: RunMode,
    stop: &StopSignal,
) -> RunStats {
    println!(
        "\n{}",
        green().apply_to(format!(
            "Starting benchmark for {}... (Press Ctrl+C to stop early)",
            mode.label()
        ))
    );
    let stats = Workload::new(mode, stop).run(print_feed);
    println!();
    if stats.stopped_by_user {
        println!("\n{}", yellow().apply_to("Benchmark stopped by user."));
    }

    let now = Local::now();
    let record = ScoreRecord::from_run(&stats, probe_system(env), now);
    let saved = match store.save(&record, now) {
        Ok(path) => Some(path),
        Err(e) => {
            tracing::error!("Failed to save benchmark JSON results: {}", e);
            None
        }
    };
    print_results(&stats, &record, saved.as_deref());
    stats
}

fn print_results(stats: &RunStats, record: &ScoreRecord, saved: Option<&Path>) {
    print_header("BENCHMARK COMPLETE");
    println!(
        "\n{} {}",
        cyan().apply_to("Run Timestamp:"),
        yellow().apply_to(&record.timestamp)
    );
    separator();
    println!(
        "{} {}",
        cyan().apply_to("CPU:"),
        green().apply_to(&record.system.processor_model)
    );
    println!(
        "{} {}",
        cyan().apply_to("Live Frequency:"),
        green().apply_to(&record.system.processor_frequency)
    );
    separator();
    println!("{}", summary_table(stats).render());
    match saved {
        Some(path) => println!(
            "\n{}",
            green().apply_to(format!("Results file saved: {}", path.display()))
        ),
        None => println!("\n{}", red().apply_to("Results could not be saved; see the log.")),
    }
}

pub fn summary_table(stats: &RunStats) -> Table {
    let mut table = Table::new(&["Metric", "Value"]).align_all(Alignment::Left);
    table.add_row(vec![
        yellow().apply_to("Total Operations").to_string(),
        green().apply_to(group_thousands(stats.total_ops)).to_string(),
    ]);
    table.add_row(vec![
        yellow().apply_to("Test Duration").to_string(),
        green()
            .apply_to(format!("{:.2} s", stats.elapsed.as_secs_f64()))
            .to_string(),
    ]);
    let gold = yellow().bold();
    table.add_row(vec![
        gold.apply_to("Operations Per Second").to_string(),
        gold.apply_to(format_decimal(stats.ops_per_second(), 2)).to_string(),
    ]);
    table
}

/// `wowfactor run`
pub fn cmd_run(ctx: &AppContext, env: Option<&EnvLayout>, mode: RunMode) -> Result<i32> {
    print_header("RUN NEW BENCHMARK");
    execute_run(&ctx.store(), env, mode, StopSignal::global());
    Ok(0)
}

/// Sleep through the cooldown; false if Ctrl+C arrived meanwhile.
fn cooldown(stop: &StopSignal, length: Duration) -> bool {
    let start = Instant::now();
    while start.elapsed() < length {
        if stop.is_set() {
            return false;
        }
        std::thread::sleep(Duration::from_millis(100).min(length));
    }
    !stop.is_set()
}

/// Consecutive timed runs with a cooldown between them. Ctrl+C ends the
/// current run (which is still saved) and the batch. Returns the runs done.
pub fn run_batch(
    store: &ScoreStore,
    env: Option<&EnvLayout>,
    runs: u32,
    secs_per_run: u64,
    stop: &StopSignal,
) -> u32 {
    tracing::info!(runs, secs_per_run, "Starting batch benchmark");
    let mode = RunMode::Timed(Duration::from_secs(secs_per_run));
    let mut completed = 0;
    for i in 1..=runs {
        print_header(&format!("BATCH RUN {} OF {}", i, runs));
        let stats = execute_run(store, env, mode, stop);
        completed = i;
        if stats.stopped_by_user {
            break;
        }
        if i < runs {
            println!(
                "\n{}",
                yellow().apply_to(format!(
                    "Cooldown... Next run starts in {} seconds.",
                    BATCH_COOLDOWN.as_secs()
                ))
            );
            if !cooldown(stop, BATCH_COOLDOWN) {
                break;
            }
        }
    }

    print_header("BATCH COMPLETE");
    if completed == runs && !stop.is_set() {
        println!(
            "\n{}",
            green().apply_to(format!("All {} benchmark runs have finished.", runs))
        );
    } else {
        tracing::warn!(completed, runs, "Batch stopped by user");
        println!(
            "\n{}",
            yellow().apply_to(format!(
                "Batch stopped by user after {} of {} runs.",
                completed, runs
            ))
        );
    }
    completed
}

/// `wowfactor batch`
pub fn cmd_batch(ctx: &AppContext, env: Option<&EnvLayout>, runs: u32, secs: u64) -> Result<i32> {
    run_batch(&ctx.store(), env, runs, secs, StopSignal::global());
    Ok(0)
}

/// Ask for the duration of a single run. `None` means the run was called off.
pub fn ask_run_mode(prompt: &mut dyn Prompt) -> Result<Option<RunMode>> {
    let question = yellow()
        .apply_to("Enter test duration in seconds (e.g., 15, or 0/infinite for endless): ")
        .to_string();
    let Some(input) = prompt.ask(&question)? else {
        return Ok(None);
    };
    match DurationInput::parse(&input) {
        DurationInput::Infinite => {
            separator();
            println!(
                "{}",
                yellow().apply_to(centered(
                    "WARNING: Infinite mode will run until you manually stop it (Ctrl+C)."
                ))
            );
            separator();
            if confirm(prompt, "Proceed with infinite benchmark?")? {
                Ok(Some(RunMode::Infinite))
            } else {
                println!("{}", yellow().apply_to("Infinite run cancelled."));
                Ok(None)
            }
        }
        DurationInput::Seconds(secs) => Ok(Some(RunMode::timed_secs(secs))),
        DurationInput::Fallback { seconds, reason } => {
            println!("{}", red().apply_to(reason));
            Ok(Some(RunMode::timed_secs(seconds)))
        }
    }
}

/// Ask for run count and per-run duration. `None` cancels the batch.
pub fn ask_batch(prompt: &mut dyn Prompt) -> Result<Option<(u32, u64)>> {
    let Some(runs_input) = prompt.ask("Enter number of batch runs (2-100): ")? else {
        return Ok(None);
    };
    let Some(runs) = parse_batch_runs(&runs_input) else {
        println!(
            "{}",
            red().apply_to("Invalid number of runs. Batch run cancelled.")
        );
        return Ok(None);
    };
    let Some(duration_input) =
        prompt.ask("Enter duration in seconds for each run (default: 15): ")?
    else {
        return Ok(None);
    };
    Ok(Some((runs, parse_batch_duration(&duration_input))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::prompt::tests::ScriptedPrompt;

    // ---- questions ----

    #[test]
    fn test_ask_run_mode_seconds_and_fallback() {
        let mut p = ScriptedPrompt::new(&["2.5"]);
        assert_eq!(ask_run_mode(&mut p).unwrap(), Some(RunMode::timed_secs(2.5)));

        let mut p = ScriptedPrompt::new(&["soon"]);
        assert_eq!(ask_run_mode(&mut p).unwrap(), Some(RunMode::timed_secs(15.0)));

        let mut p = ScriptedPrompt::new(&[]);
        assert_eq!(ask_run_mode(&mut p).unwrap(), None);
    }

    #[test]
    fn test_ask_run_mode_infinite_needs_confirmation() {
        let mut p = ScriptedPrompt::new(&["infinite", "y"]);
        assert_eq!(ask_run_mode(&mut p).unwrap(), Some(RunMode::Infinite));

        let mut p = ScriptedPrompt::new(&["0", "n"]);
        assert_eq!(ask_run_mode(&mut p).unwrap(), None);
        assert_eq!(p.asked.len(), 2);
    }

    #[test]
    fn test_ask_batch() {
        let mut p = ScriptedPrompt::new(&["5", ""]);
        assert_eq!(ask_batch(&mut p).unwrap(), Some((5, 15)));

        let mut p = ScriptedPrompt::new(&["3", "20"]);
        assert_eq!(ask_batch(&mut p).unwrap(), Some((3, 20)));

        let mut p = ScriptedPrompt::new(&["1", "20"]);
        assert_eq!(ask_batch(&mut p).unwrap(), None);
        assert_eq!(p.asked.len(), 1);
    }

    // ---- runs ----

    #[test]
    fn test_summary_table_values() {
        let stats = RunStats {
            total_ops: 3_000_000,
            elapsed: Duration::from_secs(2),
            stopped_by_user: false,
        };
        let out = console::strip_ansi_codes(&summary_table(&stats).render()).into_owned();
        assert!(out.contains("3,000,000"));
        assert!(out.contains("2.00 s"));
        assert!(out.contains("1,500,000.00"));
    }

    #[test]
    fn test_cooldown_cut_short_by_stop() {
        let stop = StopSignal::new();
        assert!(cooldown(&stop, Duration::from_millis(20)));
        stop.set();
        let start = Instant::now();
        assert!(!cooldown(&stop, Duration::from_secs(5)));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    fn stop_after(stop: &StopSignal, delay: Duration) -> std::thread::JoinHandle<()> {
        let stop = stop.clone();
        std::thread::spawn(move || {
            std::thread::sleep(delay);
            stop.set();
        })
    }

    #[test]
    fn test_interrupted_run_is_still_saved() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScoreStore::new(dir.path());
        let stop = StopSignal::new();
        let stopper = stop_after(&stop, Duration::from_millis(300));
        let stats = execute_run(&store, None, RunMode::Infinite, &stop);
        stopper.join().unwrap();
        assert!(stats.stopped_by_user);
        let saved = store.load_valid().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].total_operations, stats.total_ops);
    }

    #[test]
    fn test_interrupt_ends_batch_after_saving_current_run() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScoreStore::new(dir.path());
        let stop = StopSignal::new();
        let stopper = stop_after(&stop, Duration::from_millis(300));
        let start = Instant::now();
        let done = run_batch(&store, None, 3, 30, &stop);
        stopper.join().unwrap();
        assert_eq!(done, 1);
        assert!(start.elapsed() < Duration::from_secs(10));
        assert_eq!(store.load_valid().unwrap().len(), 1);
    }

    #[test]
    fn test_batch_saves_every_run() {
        let dir = tempfile::tempdir().unwrap();
        let store = ScoreStore::new(dir.path());
        let stop = StopSignal::new();
        let done = run_batch(&store, None, 2, 1, &stop);
        assert_eq!(done, 2);
        let saved = store.load_valid().unwrap();
        assert_eq!(saved.len(), 2);
        assert!(saved.iter().all(|r| r.total_operations > 0));
    }
}
