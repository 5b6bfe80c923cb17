//! Environment variable keys and their aliases.

/// Workspace layout
pub mod paths {
    pub const WOWFACTOR_HOME: &str = "WOWFACTOR_HOME";

    pub const WOWFACTOR_VENV_DIR: &str = "WOWFACTOR_VENV_DIR";

    pub const WOWFACTOR_RESULTS_DIR: &str = "WOWFACTOR_RESULTS_DIR";

    pub const WOWFACTOR_LOG_DIR: &str = "WOWFACTOR_LOG_DIR";
}

/// Isolated environment bootstrap
pub mod bootstrap {
    pub const WOWFACTOR_PACKAGES: &str = "WOWFACTOR_PACKAGES";

    /// Base interpreter used to create the environment
    pub const WOWFACTOR_PYTHON: &str = "WOWFACTOR_PYTHON";
    pub const PYTHON_ALIASES: &[&str] = &["PYTHON"];

    pub const WOWFACTOR_SKIP_BOOTSTRAP: &str = "WOWFACTOR_SKIP_BOOTSTRAP";

    pub const WOWFACTOR_UPGRADE_DEPS: &str = "WOWFACTOR_UPGRADE_DEPS";

    /// Set by the launcher on the re-launched child; points at the active environment.
    pub const WOWFACTOR_ACTIVE_ENV: &str = "WOWFACTOR_ACTIVE_ENV";

    /// Standard virtualenv marker, exported to the child alongside the PATH change.
    pub const VIRTUAL_ENV: &str = "VIRTUAL_ENV";
}

/// Observability and logging
pub mod observability {
    pub const WOWFACTOR_QUIET: &str = "WOWFACTOR_QUIET";

    pub const WOWFACTOR_LOG_LEVEL: &str = "WOWFACTOR_LOG_LEVEL";

    pub const WOWFACTOR_LOG_JSON: &str = "WOWFACTOR_LOG_JSON";
}
