//! Build the isolated Python environment and keep its packages current.

use std::path::{Path, PathBuf};

use crate::error::EnvError;
use crate::requirement::{fingerprint, requirements_file_contents, Requirement};
use crate::runner::{CommandRunner, CommandSpec};

const STAMP_FILE: &str = ".wowfactor-stamp";

/// Paths inside one environment directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvLayout {
    env_dir: PathBuf,
}

impl EnvLayout {
    pub fn new(env_dir: impl Into<PathBuf>) -> Self {
        Self {
            env_dir: env_dir.into(),
        }
    }

    pub fn env_dir(&self) -> &Path {
        &self.env_dir
    }

    fn unix_python(&self) -> PathBuf {
        self.env_dir.join("bin").join("python")
    }

    fn windows_python(&self) -> PathBuf {
        self.env_dir.join("Scripts").join("python.exe")
    }

    /// Interpreter inside the environment. Prefers whichever layout exists on
    /// disk, else the layout native to this platform.
    pub fn python(&self) -> PathBuf {
        let unix = self.unix_python();
        let windows = self.windows_python();
        if unix.exists() {
            unix
        } else if windows.exists() || cfg!(windows) {
            windows
        } else {
            unix
        }
    }

    /// Directory of executables to prepend to PATH.
    pub fn bin_dir(&self) -> PathBuf {
        self.python()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.env_dir.clone())
    }

    /// The environment counts as present once its interpreter exists.
    pub fn exists(&self) -> bool {
        self.unix_python().exists() || self.windows_python().exists()
    }

    pub fn stamp_path(&self) -> PathBuf {
        self.env_dir.join(STAMP_FILE)
    }

    /// Fingerprint of the last successful install, if any.
    pub fn read_stamp(&self) -> Option<String> {
        std::fs::read_to_string(self.stamp_path())
            .ok()
            .map(|s| s.trim().to_string())
    }
}

/// What `ensure` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvReport {
    pub env_dir: PathBuf,
    pub python: PathBuf,
    /// The environment did not exist and was created on this run.
    pub created: bool,
    /// pip ran on this run.
    pub installed: bool,
}

pub struct EnvironmentBuilder<'a, R: CommandRunner> {
    runner: &'a R,
    layout: EnvLayout,
    requirements: Vec<Requirement>,
    requirements_file: PathBuf,
    base_python: Option<PathBuf>,
    upgrade: bool,
}

impl<'a, R: CommandRunner> EnvironmentBuilder<'a, R> {
    pub fn new(
        runner: &'a R,
        layout: EnvLayout,
        requirements: Vec<Requirement>,
        requirements_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            runner,
            layout,
            requirements,
            requirements_file: requirements_file.into(),
            base_python: None,
            upgrade: false,
        }
    }

    /// Interpreter used for `-m venv`; discovered on PATH when unset.
    pub fn base_python(mut self, python: Option<PathBuf>) -> Self {
        self.base_python = python;
        self
    }

    /// Reinstall even when the stamp matches.
    pub fn upgrade(mut self, upgrade: bool) -> Self {
        self.upgrade = upgrade;
        self
    }

    pub fn layout(&self) -> &EnvLayout {
        &self.layout
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    /// Make sure the environment exists and holds the requirements.
    /// An existing environment is reused, never recreated.
    pub fn ensure(&self) -> Result<EnvReport, EnvError> {
        self.write_requirements_file()?;

        let env_dir = self.layout.env_dir().to_path_buf();
        let created = if self.layout.exists() {
            tracing::info!(path = %env_dir.display(), "Virtual environment already exists");
            false
        } else {
            tracing::info!(path = %env_dir.display(), "Creating virtual environment");
            self.create_venv()?;
            tracing::info!("Virtual environment created successfully");
            true
        };

        let wanted = fingerprint(&self.requirements);
        let up_to_date = self.layout.read_stamp().as_deref() == Some(wanted.as_str());
        let installed = if self.requirements.is_empty() {
            false
        } else if created || self.upgrade || !up_to_date {
            self.install()?;
            std::fs::write(self.layout.stamp_path(), &wanted)
                .map_err(|e| EnvError::io("Write install stamp", e))?;
            true
        } else {
            tracing::info!("Dependencies up to date, skipping install");
            false
        };

        Ok(EnvReport {
            env_dir,
            python: self.layout.python(),
            created,
            installed,
        })
    }

    /// Import every requirement with the environment's interpreter.
    pub fn verify(&self) -> Result<(), EnvError> {
        let python = self.layout.python();
        for req in &self.requirements {
            let module = req.module_name();
            let spec = CommandSpec::new(&python)
                .arg("-c")
                .arg(format!("import {}", module));
            let out = self.runner.output(&spec).map_err(|source| EnvError::Spawn {
                program: python.display().to_string(),
                source,
            })?;
            if !out.success() {
                tracing::debug!(module = %module, detail = %out.failure_detail(), "Import failed");
                return Err(EnvError::MissingPackage {
                    package: req.name().to_string(),
                    module,
                    env_dir: self.layout.env_dir().to_path_buf(),
                });
            }
        }
        Ok(())
    }

    fn write_requirements_file(&self) -> Result<(), EnvError> {
        if let Some(parent) = self.requirements_file.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| EnvError::io("Create workspace dir", e))?;
        }
        std::fs::write(
            &self.requirements_file,
            requirements_file_contents(&self.requirements),
        )
        .map_err(|e| EnvError::io(format!("Write {}", self.requirements_file.display()), e))
    }

    fn create_venv(&self) -> Result<(), EnvError> {
        let env_dir = self.layout.env_dir();
        std::fs::create_dir_all(env_dir).map_err(|e| EnvError::CreateVenv {
            path: env_dir.to_path_buf(),
            detail: e.to_string(),
        })?;

        let python = resolve_base_python(self.base_python.as_deref())?;
        let spec = CommandSpec::new(&python).arg("-m").arg("venv").arg(env_dir);
        let out = self.runner.output(&spec).map_err(|source| EnvError::Spawn {
            program: python.display().to_string(),
            source,
        })?;
        if !out.success() {
            return Err(EnvError::CreateVenv {
                path: env_dir.to_path_buf(),
                detail: out.failure_detail(),
            });
        }
        Ok(())
    }

    fn install(&self) -> Result<(), EnvError> {
        tracing::info!(
            file = %self.requirements_file.display(),
            "Installing/Updating dependencies"
        );
        let python = self.layout.python();
        let spec = CommandSpec::new(&python)
            .args(["-m", "pip", "install", "--upgrade", "-r"])
            .arg(&self.requirements_file);
        let out = self.runner.output(&spec).map_err(|source| EnvError::Spawn {
            program: python.display().to_string(),
            source,
        })?;
        if !out.success() {
            return Err(EnvError::Install {
                detail: out.failure_detail(),
            });
        }
        tracing::info!("Dependencies installed successfully");
        Ok(())
    }
}

/// Base interpreter: explicit override, else `python3` / `python` on PATH.
pub fn resolve_base_python(override_path: Option<&Path>) -> Result<PathBuf, EnvError> {
    if let Some(p) = override_path {
        return Ok(p.to_path_buf());
    }
    ["python3", "python"]
        .iter()
        .find_map(|name| which::which(name).ok())
        .ok_or(EnvError::PythonNotFound)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::runner::CommandOutput;
    use std::cell::RefCell;
    use std::io;

    /// Records every spec. `-m venv <dir>` creates `<dir>/bin/python` so the
    /// environment looks real; other commands succeed unless listed in `fail`.
    #[derive(Default)]
    pub(crate) struct FakeRunner {
        pub calls: RefCell<Vec<CommandSpec>>,
        pub fail: Vec<&'static str>,
        pub exit_code: Option<i32>,
    }

    impl FakeRunner {
        pub fn failing(fail: Vec<&'static str>) -> Self {
            Self {
                fail,
                ..Default::default()
            }
        }

        pub fn count(&self, needle: &str) -> usize {
            self.calls
                .borrow()
                .iter()
                .filter(|c| c.display().contains(needle))
                .count()
        }
    }

    impl CommandRunner for FakeRunner {
        fn output(&self, spec: &CommandSpec) -> io::Result<CommandOutput> {
            self.calls.borrow_mut().push(spec.clone());
            let line = spec.display();
            if self.fail.iter().any(|f| line.contains(f)) {
                return Ok(CommandOutput {
                    code: Some(1),
                    stdout: String::new(),
                    stderr: format!("fake failure: {}", line),
                });
            }
            if spec.args.len() == 3 && spec.args[1] == "venv" {
                let bin = PathBuf::from(&spec.args[2]).join("bin");
                std::fs::create_dir_all(&bin)?;
                std::fs::write(bin.join("python"), "")?;
            }
            Ok(CommandOutput {
                code: Some(0),
                ..Default::default()
            })
        }

        fn status(&self, spec: &CommandSpec) -> io::Result<Option<i32>> {
            self.calls.borrow_mut().push(spec.clone());
            Ok(Some(self.exit_code.unwrap_or(0)))
        }
    }

    fn builder<'a>(runner: &'a FakeRunner, home: &Path) -> EnvironmentBuilder<'a, FakeRunner> {
        EnvironmentBuilder::new(
            runner,
            EnvLayout::new(home.join(".venv")),
            Requirement::parse_list(&["psutil", "py-cpuinfo"]),
            home.join("requirements.txt"),
        )
        .base_python(Some(PathBuf::from("python3")))
    }

    // ---- ensure ----

    #[test]
    fn test_creates_environment_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::default();
        let report = builder(&runner, dir.path()).ensure().unwrap();

        assert!(report.created);
        assert!(report.installed);
        assert_eq!(runner.count("-m venv"), 1);
        assert_eq!(runner.count("-m pip install --upgrade -r"), 1);
        assert_eq!(report.python, dir.path().join(".venv/bin/python"));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("requirements.txt")).unwrap(),
            "psutil\npy-cpuinfo\n"
        );
        assert!(dir.path().join(".venv").join(STAMP_FILE).exists());
    }

    #[test]
    fn test_existing_environment_is_not_recreated() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::default();
        builder(&runner, dir.path()).ensure().unwrap();
        let second = builder(&runner, dir.path()).ensure().unwrap();

        assert!(!second.created);
        assert!(!second.installed);
        assert_eq!(runner.count("-m venv"), 1);
        assert_eq!(runner.count("pip install"), 1);
    }

    #[test]
    fn test_changed_requirements_reinstall_without_recreate() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::default();
        builder(&runner, dir.path()).ensure().unwrap();

        let changed = EnvironmentBuilder::new(
            &runner,
            EnvLayout::new(dir.path().join(".venv")),
            Requirement::parse_list(&["psutil", "py-cpuinfo", "rich"]),
            dir.path().join("requirements.txt"),
        );
        let report = changed.ensure().unwrap();
        assert!(!report.created);
        assert!(report.installed);
        assert_eq!(runner.count("-m venv"), 1);
        assert_eq!(runner.count("pip install"), 2);
    }

    #[test]
    fn test_upgrade_forces_install() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::default();
        builder(&runner, dir.path()).ensure().unwrap();
        let report = builder(&runner, dir.path()).upgrade(true).ensure().unwrap();
        assert!(report.installed);
        assert_eq!(runner.count("pip install"), 2);
    }

    #[test]
    fn test_venv_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::failing(vec!["-m venv"]);
        let err = builder(&runner, dir.path()).ensure().unwrap_err();
        assert!(matches!(err, EnvError::CreateVenv { .. }));
        assert_eq!(runner.count("pip"), 0);
    }

    #[test]
    fn test_install_failure_leaves_no_stamp() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::failing(vec!["pip install"]);
        let err = builder(&runner, dir.path()).ensure().unwrap_err();
        assert!(matches!(err, EnvError::Install { .. }));
        assert!(!dir.path().join(".venv").join(STAMP_FILE).exists());
    }

    // ---- verify ----

    #[test]
    fn test_verify_imports_mapped_modules() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::default();
        builder(&runner, dir.path()).verify().unwrap();
        assert_eq!(runner.count("import psutil"), 1);
        assert_eq!(runner.count("import cpuinfo"), 1);
    }

    #[test]
    fn test_verify_reports_missing_package() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::failing(vec!["import cpuinfo"]);
        let err = builder(&runner, dir.path()).verify().unwrap_err();
        match err {
            EnvError::MissingPackage { package, module, .. } => {
                assert_eq!(package, "py-cpuinfo");
                assert_eq!(module, "cpuinfo");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    // ---- layout ----

    #[test]
    fn test_layout_detects_windows_interpreter() {
        let dir = tempfile::tempdir().unwrap();
        let layout = EnvLayout::new(dir.path());
        assert!(!layout.exists());
        std::fs::create_dir_all(dir.path().join("Scripts")).unwrap();
        std::fs::write(dir.path().join("Scripts/python.exe"), "").unwrap();
        assert!(layout.exists());
        assert_eq!(layout.python(), dir.path().join("Scripts/python.exe"));
        assert_eq!(layout.bin_dir(), dir.path().join("Scripts"));
    }

    #[test]
    fn test_resolve_base_python_override() {
        let p = resolve_base_python(Some(Path::new("/opt/py/bin/python3.12"))).unwrap();
        assert_eq!(p, PathBuf::from("/opt/py/bin/python3.12"));
    }
}
