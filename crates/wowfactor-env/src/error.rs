use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while preparing or entering the isolated environment.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("python3 or python not found in PATH (set WOWFACTOR_PYTHON to choose an interpreter)")]
    PythonNotFound,

    #[error("Error creating virtual environment at {}: {detail}", .path.display())]
    CreateVenv { path: PathBuf, detail: String },

    #[error("Dependency installation failed: {detail}")]
    Install { detail: String },

    #[error(
        "A required package is missing even after setup: {package} (import {module} failed). \
         Try deleting '{}' and running again.",
        .env_dir.display()
    )]
    MissingPackage {
        package: String,
        module: String,
        env_dir: PathBuf,
    },

    #[error("Failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl EnvError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        EnvError::Io {
            context: context.into(),
            source,
        }
    }
}
