//! Bootstrap-then-delegate: decide whether this process runs the benchmark
//! itself or prepares the environment and re-launches inside it.

use std::ffi::OsString;
use std::path::PathBuf;

use wowfactor_core::config::env_keys::bootstrap as keys;
use wowfactor_core::config::{BootstrapConfig, WorkspaceConfig};

use crate::builder::{EnvLayout, EnvReport, EnvironmentBuilder};
use crate::error::EnvError;
use crate::requirement::Requirement;
use crate::runner::{CommandRunner, CommandSpec};

/// Where this process stands relative to the isolated environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    /// Re-launched by the launcher; the marker points at an existing environment.
    Inside(EnvLayout),
    /// Plain invocation; the environment must be ensured and entered.
    Outside,
    /// Bootstrap switched off; run with whatever is on the host.
    Disabled,
}

pub fn detect_stage(boot: &BootstrapConfig) -> Stage {
    if let Some(ref active) = boot.active_env {
        let layout = EnvLayout::new(active);
        if layout.exists() {
            return Stage::Inside(layout);
        }
        tracing::warn!(
            path = %active.display(),
            "Active environment marker points at a missing environment"
        );
    }
    if !boot.enabled {
        return Stage::Disabled;
    }
    Stage::Outside
}

/// How to start this program again: executable, arguments, and the PATH it
/// inherited.
#[derive(Debug, Clone)]
pub struct Relaunch {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub inherited_path: Option<OsString>,
}

impl Relaunch {
    /// The running executable with the given arguments (without argv[0]).
    pub fn current(args: Vec<OsString>) -> Result<Self, EnvError> {
        let program =
            std::env::current_exe().map_err(|e| EnvError::io("Locate current executable", e))?;
        Ok(Self {
            program,
            args,
            inherited_path: std::env::var_os("PATH"),
        })
    }

    /// Command that runs the program inside `layout`: VIRTUAL_ENV set, the
    /// environment's bin dir first on PATH, and the active-environment marker.
    pub fn command(&self, layout: &EnvLayout) -> Result<CommandSpec, EnvError> {
        let mut dirs = vec![layout.bin_dir()];
        if let Some(ref path) = self.inherited_path {
            dirs.extend(std::env::split_paths(path));
        }
        let path = std::env::join_paths(dirs).map_err(|e| {
            EnvError::io(
                "Build PATH",
                std::io::Error::new(std::io::ErrorKind::InvalidInput, e),
            )
        })?;
        Ok(CommandSpec::new(&self.program)
            .args(&self.args)
            .env(keys::VIRTUAL_ENV, layout.env_dir())
            .env("PATH", path)
            .env(keys::WOWFACTOR_ACTIVE_ENV, layout.env_dir()))
    }
}

/// Outcome of [`prepare`].
#[derive(Debug)]
pub enum Prepared {
    /// Run the benchmark in this process; `env` is the active environment, if any.
    RunHere { env: Option<EnvLayout> },
    /// Environment is ready; run `command` via [`handoff`] and exit with its code.
    Handoff {
        report: EnvReport,
        command: CommandSpec,
    },
}

pub fn builder_for<'a, R: CommandRunner>(
    runner: &'a R,
    boot: &BootstrapConfig,
    workspace: &WorkspaceConfig,
    layout: EnvLayout,
) -> EnvironmentBuilder<'a, R> {
    EnvironmentBuilder::new(
        runner,
        layout,
        Requirement::parse_list(&boot.packages),
        workspace.requirements_file(),
    )
    .base_python(boot.python.clone())
    .upgrade(boot.upgrade)
}

/// Decide and do the setup half of the launch. Never runs benchmark logic.
pub fn prepare<R: CommandRunner>(
    runner: &R,
    boot: &BootstrapConfig,
    workspace: &WorkspaceConfig,
    relaunch: &Relaunch,
) -> Result<Prepared, EnvError> {
    match detect_stage(boot) {
        Stage::Inside(layout) => {
            builder_for(runner, boot, workspace, layout.clone()).verify()?;
            Ok(Prepared::RunHere { env: Some(layout) })
        }
        Stage::Disabled => {
            tracing::info!("Bootstrap disabled; running without isolated environment");
            Ok(Prepared::RunHere { env: None })
        }
        Stage::Outside => {
            tracing::info!("Not running in a virtual environment. Starting setup...");
            let layout = EnvLayout::new(&workspace.venv_dir);
            let report = builder_for(runner, boot, workspace, layout.clone()).ensure()?;
            let command = relaunch.command(&layout)?;
            Ok(Prepared::Handoff { report, command })
        }
    }
}

/// Run the re-launched child with inherited stdio; returns its exit code,
/// or `None` when it was killed by a signal.
pub fn handoff<R: CommandRunner>(
    runner: &R,
    command: &CommandSpec,
) -> Result<Option<i32>, EnvError> {
    tracing::info!(cmd = %command.display(), "Re-launching inside the virtual environment");
    let code = runner.status(command).map_err(|source| EnvError::Spawn {
        program: command.program.display().to_string(),
        source,
    })?;
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::tests::FakeRunner;
    use std::ffi::OsStr;
    use std::path::Path;

    fn configs(home: &Path) -> (BootstrapConfig, WorkspaceConfig) {
        let boot = BootstrapConfig {
            enabled: true,
            packages: vec!["psutil".into(), "py-cpuinfo".into()],
            python: Some(PathBuf::from("python3")),
            upgrade: false,
            active_env: None,
        };
        (boot, WorkspaceConfig::with_home(home))
    }

    fn relaunch() -> Relaunch {
        Relaunch {
            program: PathBuf::from("/usr/local/bin/wowfactor"),
            args: vec![OsString::from("run"), OsString::from("--duration=5")],
            inherited_path: Some(OsString::from("/usr/bin")),
        }
    }

    fn make_env(dir: &Path) {
        std::fs::create_dir_all(dir.join("bin")).unwrap();
        std::fs::write(dir.join("bin").join("python"), "").unwrap();
    }

    #[test]
    fn test_detect_stage() {
        let dir = tempfile::tempdir().unwrap();
        let (mut boot, _) = configs(dir.path());
        assert_eq!(detect_stage(&boot), Stage::Outside);

        boot.enabled = false;
        assert_eq!(detect_stage(&boot), Stage::Disabled);

        let env = dir.path().join(".venv");
        boot.active_env = Some(env.clone());
        assert_eq!(detect_stage(&boot), Stage::Disabled);
        make_env(&env);
        assert_eq!(detect_stage(&boot), Stage::Inside(EnvLayout::new(&env)));
    }

    #[test]
    fn test_relaunch_command_enters_environment() {
        let layout = EnvLayout::new("/srv/wow/.venv");
        let spec = relaunch().command(&layout).unwrap();
        assert_eq!(spec.program, PathBuf::from("/usr/local/bin/wowfactor"));
        assert_eq!(spec.args, vec![OsString::from("run"), OsString::from("--duration=5")]);
        assert_eq!(spec.env_value("VIRTUAL_ENV"), Some(OsStr::new("/srv/wow/.venv")));
        assert_eq!(
            spec.env_value("WOWFACTOR_ACTIVE_ENV"),
            Some(OsStr::new("/srv/wow/.venv"))
        );
        let path: Vec<PathBuf> = std::env::split_paths(spec.env_value("PATH").unwrap()).collect();
        assert_eq!(path[0], layout.bin_dir());
        assert_eq!(path.last(), Some(&PathBuf::from("/usr/bin")));
    }

    #[cfg(unix)]
    #[test]
    fn test_clean_machine_sets_up_then_delegates_once() {
        let dir = tempfile::tempdir().unwrap();
        let (boot, ws) = configs(dir.path());
        let runner = FakeRunner::default();

        let prepared = prepare(&runner, &boot, &ws, &relaunch()).unwrap();
        let Prepared::Handoff { report, command } = prepared else {
            panic!("expected handoff on a clean machine");
        };
        assert!(report.created);
        assert!(ws.venv_dir.join("bin/python").exists());
        assert_eq!(runner.count("-m venv"), 1);
        assert_eq!(runner.count("pip install"), 1);
        assert_eq!(runner.count("wowfactor"), 0);

        let code = handoff(&runner, &command).unwrap();
        assert_eq!(code, Some(0));
        assert_eq!(runner.count("/usr/local/bin/wowfactor run"), 1);

        // The child sees the marker and runs the benchmark itself.
        let mut child_boot = boot.clone();
        child_boot.active_env = command.env_value("WOWFACTOR_ACTIVE_ENV").map(PathBuf::from);
        let child = prepare(&runner, &child_boot, &ws, &relaunch()).unwrap();
        assert!(matches!(child, Prepared::RunHere { env: Some(_) }));
        assert_eq!(runner.count("-m venv"), 1);
        assert_eq!(runner.count("pip install"), 1);
        assert_eq!(runner.count("/usr/local/bin/wowfactor run"), 1);
    }

    #[test]
    fn test_disabled_runs_here_without_setup() {
        let dir = tempfile::tempdir().unwrap();
        let (mut boot, ws) = configs(dir.path());
        boot.enabled = false;
        let runner = FakeRunner::default();
        let prepared = prepare(&runner, &boot, &ws, &relaunch()).unwrap();
        assert!(matches!(prepared, Prepared::RunHere { env: None }));
        assert!(runner.calls.borrow().is_empty());
        assert!(!ws.requirements_file().exists());
    }

    #[test]
    fn test_inside_with_missing_package_fails() {
        let dir = tempfile::tempdir().unwrap();
        let (mut boot, ws) = configs(dir.path());
        make_env(&ws.venv_dir);
        boot.active_env = Some(ws.venv_dir.clone());
        let runner = FakeRunner::failing(vec!["import psutil"]);
        let err = prepare(&runner, &boot, &ws, &relaunch()).unwrap_err();
        assert!(matches!(err, EnvError::MissingPackage { .. }));
    }

    #[test]
    fn test_handoff_propagates_exit_code() {
        let runner = FakeRunner {
            exit_code: Some(3),
            ..Default::default()
        };
        let spec = CommandSpec::new("/usr/local/bin/wowfactor");
        assert_eq!(handoff(&runner, &spec).unwrap(), Some(3));
    }
}
