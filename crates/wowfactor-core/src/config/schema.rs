//! Structured configuration built from environment variables.

use std::path::{Path, PathBuf};

use super::env_keys::{bootstrap as boot_keys, observability as obv_keys, paths as path_keys};
use super::loader::{load_dotenv, lookup_bool, lookup_optional, lookup_or, process_env, Lookup};

/// Packages the probe helpers need inside the isolated environment.
pub const DEFAULT_PACKAGES: &[&str] = &["psutil", "py-cpuinfo"];

/// Where everything lives on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceConfig {
    pub home: PathBuf,
    pub venv_dir: PathBuf,
    pub results_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl WorkspaceConfig {
    pub const LOG_FILE_NAME: &'static str = "wowfactor.log";
    pub const REQUIREMENTS_FILE_NAME: &'static str = "requirements.txt";

    pub fn from_env() -> Self {
        load_dotenv();
        Self::from_lookup(&process_env)
    }

    pub fn from_lookup(lookup: &Lookup<'_>) -> Self {
        let home = lookup_optional(lookup, path_keys::WOWFACTOR_HOME, &[])
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
        let under_home = |key: &str, default: &str| {
            let p = PathBuf::from(lookup_or(lookup, key, &[], || default.to_string()));
            if p.is_absolute() {
                p
            } else {
                home.join(p)
            }
        };
        let venv_dir = under_home(path_keys::WOWFACTOR_VENV_DIR, ".venv");
        let results_dir = under_home(path_keys::WOWFACTOR_RESULTS_DIR, "benchmark_results");
        let log_dir = under_home(path_keys::WOWFACTOR_LOG_DIR, "logs");
        Self {
            home,
            venv_dir,
            results_dir,
            log_dir,
        }
    }

    /// Default layout rooted at `home`.
    pub fn with_home(home: impl AsRef<Path>) -> Self {
        let home = home.as_ref().to_path_buf();
        Self {
            venv_dir: home.join(".venv"),
            results_dir: home.join("benchmark_results"),
            log_dir: home.join("logs"),
            home,
        }
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_dir.join(Self::LOG_FILE_NAME)
    }

    pub fn requirements_file(&self) -> PathBuf {
        self.home.join(Self::REQUIREMENTS_FILE_NAME)
    }
}

/// How the launcher prepares the isolated environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapConfig {
    /// False when `WOWFACTOR_SKIP_BOOTSTRAP` is set.
    pub enabled: bool,
    pub packages: Vec<String>,
    /// Base interpreter override; discovered on PATH when `None`.
    pub python: Option<PathBuf>,
    /// Reinstall even if the stamp matches.
    pub upgrade: bool,
    /// Set when this process was re-launched inside the environment.
    pub active_env: Option<PathBuf>,
}

impl BootstrapConfig {
    pub fn from_env() -> Self {
        load_dotenv();
        Self::from_lookup(&process_env)
    }

    pub fn from_lookup(lookup: &Lookup<'_>) -> Self {
        let packages = lookup_optional(lookup, boot_keys::WOWFACTOR_PACKAGES, &[])
            .map(|raw| parse_package_list(&raw))
            .unwrap_or_else(|| DEFAULT_PACKAGES.iter().map(|s| s.to_string()).collect());
        Self {
            enabled: !lookup_bool(lookup, boot_keys::WOWFACTOR_SKIP_BOOTSTRAP, &[], false),
            packages,
            python: lookup_optional(
                lookup,
                boot_keys::WOWFACTOR_PYTHON,
                boot_keys::PYTHON_ALIASES,
            )
            .map(PathBuf::from),
            upgrade: lookup_bool(lookup, boot_keys::WOWFACTOR_UPGRADE_DEPS, &[], false),
            active_env: lookup_optional(lookup, boot_keys::WOWFACTOR_ACTIVE_ENV, &[])
                .map(PathBuf::from),
        }
    }
}

/// Comma or newline separated requirement list; blanks dropped. Spaces stay
/// inside an entry so markers like `tomli; python_version < '3.11'` survive.
fn parse_package_list(raw: &str) -> Vec<String> {
    raw.split([',', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub quiet: bool,
    pub log_level: String,
    pub log_json: bool,
}

impl ObservabilityConfig {
    pub fn from_env() -> &'static Self {
        use std::sync::OnceLock;
        static CACHE: OnceLock<ObservabilityConfig> = OnceLock::new();
        CACHE.get_or_init(|| {
            load_dotenv();
            Self::from_lookup(&process_env)
        })
    }

    pub fn from_lookup(lookup: &Lookup<'_>) -> Self {
        Self {
            quiet: lookup_bool(lookup, obv_keys::WOWFACTOR_QUIET, &[], false),
            log_level: lookup_or(lookup, obv_keys::WOWFACTOR_LOG_LEVEL, &[], || {
                "wowfactor=info".to_string()
            }),
            log_json: lookup_bool(lookup, obv_keys::WOWFACTOR_LOG_JSON, &[], false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k: &str| vars.get(k).cloned()
    }

    #[test]
    fn test_workspace_defaults_under_home() {
        let lookup = lookup_from(&[("WOWFACTOR_HOME", "/srv/wow")]);
        let cfg = WorkspaceConfig::from_lookup(&lookup);
        assert_eq!(cfg, WorkspaceConfig::with_home("/srv/wow"));
        assert_eq!(cfg.log_file(), PathBuf::from("/srv/wow/logs/wowfactor.log"));
        assert_eq!(
            cfg.requirements_file(),
            PathBuf::from("/srv/wow/requirements.txt")
        );
    }

    #[test]
    fn test_workspace_absolute_override_kept() {
        let lookup = lookup_from(&[
            ("WOWFACTOR_HOME", "/srv/wow"),
            ("WOWFACTOR_VENV_DIR", "/opt/env"),
            ("WOWFACTOR_RESULTS_DIR", "scores"),
        ]);
        let cfg = WorkspaceConfig::from_lookup(&lookup);
        assert_eq!(cfg.venv_dir, PathBuf::from("/opt/env"));
        assert_eq!(cfg.results_dir, PathBuf::from("/srv/wow/scores"));
    }

    #[test]
    fn test_bootstrap_defaults() {
        let cfg = BootstrapConfig::from_lookup(&lookup_from(&[]));
        assert!(cfg.enabled);
        assert_eq!(cfg.packages, vec!["psutil", "py-cpuinfo"]);
        assert!(cfg.python.is_none());
        assert!(!cfg.upgrade);
        assert!(cfg.active_env.is_none());
    }

    #[test]
    fn test_bootstrap_overrides() {
        let lookup = lookup_from(&[
            ("WOWFACTOR_PACKAGES", "psutil==5.9.8, py-cpuinfo\nrich"),
            ("WOWFACTOR_SKIP_BOOTSTRAP", "1"),
            ("PYTHON", "/usr/bin/python3.12"),
            ("WOWFACTOR_ACTIVE_ENV", "/srv/wow/.venv"),
        ]);
        let cfg = BootstrapConfig::from_lookup(&lookup);
        assert!(!cfg.enabled);
        assert_eq!(cfg.packages, vec!["psutil==5.9.8", "py-cpuinfo", "rich"]);
        assert_eq!(cfg.python, Some(PathBuf::from("/usr/bin/python3.12")));
        assert_eq!(cfg.active_env, Some(PathBuf::from("/srv/wow/.venv")));
    }

    #[test]
    fn test_package_list_keeps_markers_whole() {
        assert_eq!(
            parse_package_list("psutil,  tomli; python_version < '3.11'\r\n rich >= 13 ,"),
            vec!["psutil", "tomli; python_version < '3.11'", "rich >= 13"]
        );
    }

    #[test]
    fn test_observability_defaults() {
        let cfg = ObservabilityConfig::from_lookup(&lookup_from(&[]));
        assert!(!cfg.quiet);
        assert!(!cfg.log_json);
        assert_eq!(cfg.log_level, "wowfactor=info");
    }
}
