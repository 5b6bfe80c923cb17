//! Process-wide stop flag driven by Ctrl+C.
//!
//! The handler only flips the flag; whoever is looping (a benchmark run, the
//! launcher waiting on its child) decides what stopping means.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use anyhow::{Context, Result};

#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// The signal wired to Ctrl+C.
    pub fn global() -> &'static StopSignal {
        static GLOBAL: OnceLock<StopSignal> = OnceLock::new();
        GLOBAL.get_or_init(StopSignal::new)
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn set(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Install the Ctrl+C handler for [`StopSignal::global`]. Safe to call twice.
pub fn install_interrupt_handler() -> Result<()> {
    static INSTALLED: AtomicBool = AtomicBool::new(false);
    if INSTALLED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }
    let signal = StopSignal::global().clone();
    ctrlc::set_handler(move || {
        tracing::debug!("Received Ctrl+C");
        signal.set();
    })
    .context("Failed to set Ctrl+C handler")
}
