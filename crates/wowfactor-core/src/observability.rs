//! Observability: tracing init.
//!
//! Uses config::ObservabilityConfig for WOWFACTOR_QUIET, WOWFACTOR_LOG_LEVEL,
//! WOWFACTOR_LOG_JSON. Console output goes to stderr so it never interleaves
//! with tables on stdout; the session log file always records at info.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::ObservabilityConfig;

const FILE_LEVEL: &str = "wowfactor=info";

/// Initialize tracing. Call once at process startup.
/// When WOWFACTOR_QUIET=1, only WARN and above reach the console.
pub fn init_tracing(log_file: Option<&Path>) {
    let cfg = ObservabilityConfig::from_env();
    let level = console_level(cfg);
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    let file_layer = log_file.and_then(open_log_file).map(|file| {
        fmt::layer()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_target(true)
            .with_filter(EnvFilter::new(FILE_LEVEL))
    });

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false);

    let _ = if cfg.log_json {
        tracing_subscriber::registry()
            .with(file_layer)
            .with(console.json().with_filter(console_filter))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(file_layer)
            .with(console.with_filter(console_filter))
            .try_init()
    };
}

fn console_level(cfg: &ObservabilityConfig) -> String {
    if cfg.quiet {
        "wowfactor=warn".to_string()
    } else {
        cfg.log_level.clone()
    }
}

fn open_log_file(path: &Path) -> Option<File> {
    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            eprintln!("warning: cannot create log dir {}: {}", parent.display(), e);
            return None;
        }
    }
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(f) => Some(f),
        Err(e) => {
            eprintln!("warning: cannot open log file {}: {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_overrides_level() {
        let cfg = ObservabilityConfig {
            quiet: true,
            log_level: "wowfactor=debug".into(),
            log_json: false,
        };
        assert_eq!(console_level(&cfg), "wowfactor=warn");
    }

    #[test]
    fn test_open_log_file_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("wowfactor.log");
        assert!(open_log_file(&path).is_some());
        assert!(path.exists());
    }
}
