//! Environment management: status and removal of the isolated environment.
//!
//! The environment lives in `<home>/.venv` (or `$WOWFACTOR_VENV_DIR`). It is
//! never removed by the launcher itself; `env clean` is the only way.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use wowfactor_env::requirement::fingerprint;
use wowfactor_env::{EnvLayout, Requirement};

use super::AppContext;
use crate::ui::prompt::{confirm, Prompt};

/// Install state of the environment relative to the configured packages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageState {
    Current,
    Stale,
    NeverInstalled,
}

pub fn package_state(layout: &EnvLayout, packages: &[String]) -> PackageState {
    match layout.read_stamp() {
        None => PackageState::NeverInstalled,
        Some(stamp) if stamp == fingerprint(&Requirement::parse_list(packages)) => {
            PackageState::Current
        }
        Some(_) => PackageState::Stale,
    }
}

/// `wowfactor env status`
pub fn cmd_status(ctx: &AppContext) -> Result<i32> {
    let layout = EnvLayout::new(&ctx.workspace.venv_dir);
    eprintln!("Environment: {}", layout.env_dir().display());
    if !layout.exists() {
        eprintln!("  State:     not created (it is set up on the next benchmark run)");
        return Ok(0);
    }
    eprintln!("  Python:    {}", layout.python().display());
    eprintln!("  Size:      {}", format_size(dir_size(layout.env_dir())));
    let state = match package_state(&layout, &ctx.boot.packages) {
        PackageState::Current => "up to date",
        PackageState::Stale => "outdated (reinstalled on the next run)",
        PackageState::NeverInstalled => "not installed",
    };
    eprintln!("  Packages:  {} [{}]", state, ctx.boot.packages.join(", "));
    if let Some(ref active) = ctx.boot.active_env {
        eprintln!("  Active:    {}", active.display());
    }
    Ok(0)
}

/// `wowfactor env clean`
pub fn cmd_clean(
    ctx: &AppContext,
    prompt: &mut dyn Prompt,
    dry_run: bool,
    force: bool,
) -> Result<i32> {
    let env_dir = &ctx.workspace.venv_dir;
    if !env_dir.exists() {
        eprintln!("No environment found at {}", env_dir.display());
        return Ok(0);
    }

    let size = dir_size(env_dir);
    eprintln!("🗂  Environment at {} ({})", env_dir.display(), format_size(size));

    if dry_run {
        eprintln!();
        eprintln!("(Dry run, nothing removed. Remove --dry-run to delete.)");
        return Ok(0);
    }

    if !force && !confirm(prompt, "\nRemove the environment?")? {
        eprintln!("Cancelled.");
        return Ok(0);
    }

    fs::remove_dir_all(env_dir)
        .with_context(|| format!("Failed to remove {}", env_dir.display()))?;
    tracing::info!(path = %env_dir.display(), "Removed virtual environment");
    eprintln!("✓ Removed environment, freed {}", format_size(size));
    Ok(0)
}

/// Compute total size of a directory recursively.
/// Bytes in regular files under `path`. Symlinks are not followed, so a venv's
/// `lib64 -> lib` is counted once.
fn dir_size(path: &Path) -> u64 {
    let mut total: u64 = 0;
    if let Ok(entries) = fs::read_dir(path) {
        for entry in entries.flatten() {
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            if file_type.is_dir() {
                total += dir_size(&entry.path());
            } else if file_type.is_file() {
                if let Ok(meta) = entry.metadata() {
                    total += meta.len();
                }
            }
        }
    }
    total
}

/// Format byte size to human-readable string.
fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}
