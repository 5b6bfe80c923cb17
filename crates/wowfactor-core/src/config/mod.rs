//! WowFactor configuration layer.
//!
//! All environment variable reads go through this module; the rest of the
//! workspace consumes structured config instead of calling `std::env::var`.
//!
//! - `loader`: `lookup_or`, `lookup_optional`, `lookup_bool` helpers and `.env` loading
//! - `schema`: `WorkspaceConfig`, `BootstrapConfig`, `ObservabilityConfig`
//! - `env_keys`: key constants (with aliases)

pub mod env_keys;
pub mod loader;
pub mod schema;

pub use loader::{load_dotenv, Lookup};
pub use schema::{BootstrapConfig, ObservabilityConfig, WorkspaceConfig};
