//! The timed counting workload.
//!
//! One operation is one pass of `check stop / check deadline / increment`.
//! The score is how many passes fit into the wall-clock time actually spent.

use std::hint::black_box;
use std::time::{Duration, Instant};

use wowfactor_core::signal::StopSignal;

/// Duration used when interactive input is unusable.
pub const DEFAULT_DURATION_SECS: f64 = 15.0;
/// A live feed sample is emitted every this many operations.
pub const FEED_INTERVAL_OPS: u64 = 1_000_000;
pub const BATCH_MIN_RUNS: u32 = 2;
pub const BATCH_MAX_RUNS: u32 = 100;
pub const BATCH_COOLDOWN: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RunMode {
    Timed(Duration),
    /// Runs until the stop signal fires.
    Infinite,
}

impl RunMode {
    /// Negative or NaN becomes zero; values too large for a `Duration` saturate.
    pub fn timed_secs(secs: f64) -> Self {
        RunMode::Timed(Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::MAX))
    }

    pub fn label(&self) -> String {
        match self {
            RunMode::Timed(d) => format!("{} seconds", d.as_secs_f64()),
            RunMode::Infinite => "INFINITE".to_string(),
        }
    }
}

/// Progress reported while a run is in flight.
#[derive(Debug, Clone, Copy)]
pub struct FeedSample {
    pub ops: u64,
    pub elapsed: Duration,
}

impl FeedSample {
    pub fn ops_per_second(&self) -> f64 {
        ops_per_second(self.ops, self.elapsed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunStats {
    pub total_ops: u64,
    pub elapsed: Duration,
    pub stopped_by_user: bool,
}

impl RunStats {
    pub fn ops_per_second(&self) -> f64 {
        ops_per_second(self.total_ops, self.elapsed)
    }
}

fn ops_per_second(ops: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        ops as f64 / secs
    } else {
        0.0
    }
}

pub struct Workload<'a> {
    mode: RunMode,
    stop: &'a StopSignal,
    feed_every: u64,
}

impl<'a> Workload<'a> {
    pub fn new(mode: RunMode, stop: &'a StopSignal) -> Self {
        Self {
            mode,
            stop,
            feed_every: FEED_INTERVAL_OPS,
        }
    }

    pub fn feed_every(mut self, ops: u64) -> Self {
        self.feed_every = ops.max(1);
        self
    }

    /// Run to the deadline or until the stop signal. The signal is cleared
    /// first so an earlier Ctrl+C does not end this run immediately.
    pub fn run<F>(&self, mut on_feed: F) -> RunStats
    where
        F: FnMut(FeedSample),
    {
        self.stop.reset();
        let deadline = match self.mode {
            RunMode::Timed(d) => Some(d),
            RunMode::Infinite => None,
        };
        tracing::info!(mode = %self.mode.label(), "Starting benchmark");

        let start = Instant::now();
        let mut ops: u64 = 0;
        let mut stopped_by_user = false;
        loop {
            if self.stop.is_set() {
                stopped_by_user = true;
                break;
            }
            if let Some(d) = deadline {
                if start.elapsed() >= d {
                    break;
                }
            }
            ops = black_box(ops + 1);
            if ops % self.feed_every == 0 {
                on_feed(FeedSample {
                    ops,
                    elapsed: start.elapsed(),
                });
            }
        }
        let elapsed = start.elapsed();

        if stopped_by_user {
            tracing::warn!("Benchmark stopped by user");
        }
        tracing::info!(
            total_ops = ops,
            elapsed_s = %format!("{:.2}", elapsed.as_secs_f64()),
            "Benchmark finished"
        );
        RunStats {
            total_ops: ops,
            elapsed,
            stopped_by_user,
        }
    }
}

/// Interpretation of the interactive duration prompt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DurationInput {
    /// `0` or `infinite`; needs confirmation before running.
    Infinite,
    Seconds(f64),
    /// Unusable input; run for `seconds` and tell the user why.
    Fallback { seconds: f64, reason: &'static str },
}

impl DurationInput {
    pub fn parse(input: &str) -> Self {
        let input = input.trim().to_lowercase();
        if input == "infinite" || input == "0" {
            return DurationInput::Infinite;
        }
        match input.parse::<f64>() {
            Ok(secs) if !secs.is_finite() => DurationInput::Fallback {
                seconds: DEFAULT_DURATION_SECS,
                reason: "Invalid input. Defaulting to 15 seconds.",
            },
            Ok(secs) if secs <= 0.0 => DurationInput::Fallback {
                seconds: DEFAULT_DURATION_SECS,
                reason: "Duration must be positive. Defaulting to 15 seconds.",
            },
            Ok(secs) => DurationInput::Seconds(secs),
            Err(_) => DurationInput::Fallback {
                seconds: DEFAULT_DURATION_SECS,
                reason: "Invalid input. Defaulting to 15 seconds.",
            },
        }
    }
}

/// Number of batch runs; `None` cancels the batch.
pub fn parse_batch_runs(input: &str) -> Option<u32> {
    let input = input.trim();
    if input.is_empty() || !input.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    input
        .parse::<u32>()
        .ok()
        .filter(|n| (BATCH_MIN_RUNS..=BATCH_MAX_RUNS).contains(n))
}

/// Per-run batch duration in whole seconds; anything but a positive integer
/// means the default.
pub fn parse_batch_duration(input: &str) -> u64 {
    let input = input.trim();
    if !input.is_empty() && input.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(n) = input.parse::<u64>() {
            if n > 0 {
                return n;
            }
        }
    }
    DEFAULT_DURATION_SECS as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---- workload ----

    #[test]
    fn test_timed_run_counts_and_stops_at_deadline() {
        let stop = StopSignal::new();
        let stats = Workload::new(RunMode::Timed(Duration::from_millis(50)), &stop).run(|_| {});
        assert!(stats.total_ops > 0);
        assert!(stats.elapsed >= Duration::from_millis(50));
        assert!(!stats.stopped_by_user);
        assert!(stats.ops_per_second() > 0.0);
    }

    #[test]
    fn test_stop_signal_ends_infinite_run() {
        let stop = StopSignal::new();
        let trigger = stop.clone();
        let mut samples = 0;
        let stats = Workload::new(RunMode::Infinite, &stop)
            .feed_every(1_000)
            .run(|sample| {
                samples += 1;
                assert_eq!(sample.ops % 1_000, 0);
                if samples == 3 {
                    trigger.set();
                }
            });
        assert!(stats.stopped_by_user);
        assert_eq!(stats.total_ops, 3_000);
        assert_eq!(samples, 3);
    }

    #[test]
    fn test_stale_stop_signal_is_cleared() {
        let stop = StopSignal::new();
        stop.set();
        let stats = Workload::new(RunMode::Timed(Duration::from_millis(10)), &stop).run(|_| {});
        assert!(!stats.stopped_by_user);
        assert!(stats.total_ops > 0);
    }

    #[test]
    fn test_ops_per_second_zero_elapsed() {
        let stats = RunStats {
            total_ops: 10,
            elapsed: Duration::ZERO,
            stopped_by_user: false,
        };
        assert_eq!(stats.ops_per_second(), 0.0);
    }

    #[test]
    fn test_mode_label() {
        assert_eq!(RunMode::timed_secs(15.0).label(), "15 seconds");
        assert_eq!(RunMode::timed_secs(2.5).label(), "2.5 seconds");
        assert_eq!(RunMode::Infinite.label(), "INFINITE");
    }

    #[test]
    fn test_timed_secs_never_panics() {
        assert_eq!(RunMode::timed_secs(-1.0), RunMode::Timed(Duration::ZERO));
        assert_eq!(RunMode::timed_secs(f64::NAN), RunMode::Timed(Duration::ZERO));
        assert_eq!(RunMode::timed_secs(1e300), RunMode::Timed(Duration::MAX));
    }

    // ---- input parsing ----

    #[test]
    fn test_duration_input() {
        assert_eq!(DurationInput::parse("infinite"), DurationInput::Infinite);
        assert_eq!(DurationInput::parse(" 0 "), DurationInput::Infinite);
        assert_eq!(DurationInput::parse("INFINITE"), DurationInput::Infinite);
        assert_eq!(DurationInput::parse("30"), DurationInput::Seconds(30.0));
        assert_eq!(DurationInput::parse("2.5"), DurationInput::Seconds(2.5));
        assert!(matches!(
            DurationInput::parse("abc"),
            DurationInput::Fallback { seconds, .. } if seconds == 15.0
        ));
        assert!(matches!(
            DurationInput::parse("-3"),
            DurationInput::Fallback { reason, .. } if reason.starts_with("Duration must be positive")
        ));
        assert!(matches!(DurationInput::parse("nan"), DurationInput::Fallback { .. }));
    }

    #[test]
    fn test_batch_runs_bounds() {
        assert_eq!(parse_batch_runs("2"), Some(2));
        assert_eq!(parse_batch_runs("100"), Some(100));
        assert_eq!(parse_batch_runs("1"), None);
        assert_eq!(parse_batch_runs("101"), None);
        assert_eq!(parse_batch_runs("-5"), None);
        assert_eq!(parse_batch_runs("ten"), None);
        assert_eq!(parse_batch_runs(""), None);
    }

    #[test]
    fn test_batch_duration_default() {
        assert_eq!(parse_batch_duration("20"), 20);
        assert_eq!(parse_batch_duration(""), 15);
        assert_eq!(parse_batch_duration("0"), 15);
        assert_eq!(parse_batch_duration("1.5"), 15);
    }
}
