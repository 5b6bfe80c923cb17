//! Describe the machine a score was produced on.
//!
//! The preferred source is the interpreter inside the isolated environment
//! (`py-cpuinfo` for the brand string, `psutil` for live frequency). When no
//! environment is active, or the probe fails, `sysinfo` answers instead.

use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use sysinfo::System;
use wowfactor_env::{CommandRunner, CommandSpec};

use crate::error::BenchError;
use crate::record::SystemInfo;

const NOT_AVAILABLE: &str = "N/A";

const PROBE_SCRIPT: &str = r#"
import json
out = {}
try:
    import cpuinfo
    info = cpuinfo.get_cpu_info()
    out["brand_raw"] = info.get("brand_raw")
    out["hz_advertised_friendly"] = info.get("hz_advertised_friendly")
except Exception:
    pass
try:
    import psutil
    freq = psutil.cpu_freq()
    out["freq_current_mhz"] = freq.current if freq else None
except Exception:
    pass
print(json.dumps(out))
"#;

/// What a probe found; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawCpuInfo {
    #[serde(rename = "brand_raw")]
    pub brand: Option<String>,
    #[serde(rename = "freq_current_mhz")]
    pub live_mhz: Option<f64>,
    #[serde(rename = "hz_advertised_friendly")]
    pub advertised: Option<String>,
}

pub trait CpuProbe {
    fn probe(&self) -> Result<RawCpuInfo, BenchError>;
}

/// In-process probe via `sysinfo`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeProbe;

impl CpuProbe for NativeProbe {
    fn probe(&self) -> Result<RawCpuInfo, BenchError> {
        let mut sys = System::new();
        sys.refresh_cpu_all();
        let cpu = sys
            .cpus()
            .first()
            .ok_or_else(|| BenchError::Probe("no CPUs reported".into()))?;
        let brand = Some(cpu.brand().trim().to_string()).filter(|b| !b.is_empty());
        let mhz = cpu.frequency();
        Ok(RawCpuInfo {
            brand,
            live_mhz: (mhz > 0).then_some(mhz as f64),
            advertised: None,
        })
    }
}

/// Probe that runs a short script with the environment's interpreter.
pub struct InterpreterProbe<'a, R: CommandRunner> {
    runner: &'a R,
    python: PathBuf,
}

impl<'a, R: CommandRunner> InterpreterProbe<'a, R> {
    pub fn new(runner: &'a R, python: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            python: python.into(),
        }
    }
}

impl<R: CommandRunner> CpuProbe for InterpreterProbe<'_, R> {
    fn probe(&self) -> Result<RawCpuInfo, BenchError> {
        let spec = CommandSpec::new(&self.python).arg("-c").arg(PROBE_SCRIPT);
        let out = self
            .runner
            .output(&spec)
            .map_err(|e| BenchError::Probe(format!("{}: {}", self.python.display(), e)))?;
        if !out.success() {
            return Err(BenchError::Probe(out.failure_detail()));
        }
        serde_json::from_str(out.stdout.trim()).map_err(|e| BenchError::Probe(e.to_string()))
    }
}

/// Gather system info: the primary probe first, gaps filled from `fallback`.
pub fn collect_system_info(primary: &dyn CpuProbe, fallback: &dyn CpuProbe) -> SystemInfo {
    let mut raw = primary.probe().unwrap_or_else(|e| {
        tracing::warn!("Could not get detailed CPU info: {}", e);
        RawCpuInfo::default()
    });
    if raw.brand.is_none() || (raw.live_mhz.is_none() && raw.advertised.is_none()) {
        match fallback.probe() {
            Ok(extra) => {
                raw.brand = raw.brand.or(extra.brand);
                raw.live_mhz = raw.live_mhz.or(extra.live_mhz);
                raw.advertised = raw.advertised.or(extra.advertised);
            }
            Err(e) => tracing::warn!("Fallback CPU probe failed: {}", e),
        }
    }

    let processor_model = raw
        .brand
        .as_deref()
        .map(clean_cpu_model_name)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| std::env::consts::ARCH.to_string());

    SystemInfo {
        platform: host_platform_name(),
        processor_model,
        processor_frequency: format_frequency(raw.live_mhz, raw.advertised.as_deref()),
    }
}

fn cpu_name_patterns() -> &'static [(Regex, &'static str)] {
    static PATTERNS: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"(?i)\s+\d+-Core Processor",
            r"(?i)\s+with Radeon Graphics",
            r"\s*\(R\)|\(TM\)|@.*",
        ]
        .iter()
        .filter_map(|p| Regex::new(p).ok().map(|re| (re, "")))
        .collect()
    })
}

/// Strip marketing noise from a CPU brand string.
pub fn clean_cpu_model_name(model: &str) -> String {
    let mut name = model.to_string();
    for (re, rep) in cpu_name_patterns() {
        name = re.replace_all(&name, *rep).into_owned();
    }
    name.trim().to_string()
}

/// Live MHz as GHz, else the advertised string, else N/A.
pub fn format_frequency(live_mhz: Option<f64>, advertised: Option<&str>) -> String {
    match (live_mhz, advertised) {
        (Some(mhz), _) if mhz > 0.0 => format!("{:.2}GHz", mhz / 1000.0),
        (_, Some(adv)) if !adv.trim().is_empty() => adv.trim().to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Short platform label: `Win 11 (22631)`, `Lin 6.8.0`, `Mac 23.1.0`.
pub fn platform_name(os: &str, kernel: Option<&str>, os_version: Option<&str>) -> String {
    let kernel = kernel.unwrap_or(NOT_AVAILABLE);
    match os {
        "windows" => {
            let release = os_version
                .and_then(|v| v.split_whitespace().next())
                .unwrap_or(NOT_AVAILABLE);
            format!("Win {} ({})", release, kernel)
        }
        "linux" => format!("Lin {}", kernel.split('-').next().unwrap_or(kernel)),
        "macos" => format!("Mac {}", kernel),
        other => System::name().unwrap_or_else(|| other.to_string()),
    }
}

pub fn host_platform_name() -> String {
    platform_name(
        std::env::consts::OS,
        System::kernel_version().as_deref(),
        System::os_version().as_deref(),
    )
}
