//! File-based configuration for PoolRoute
//!
//! Loads the endpoint pool and its settings from a YAML or TOML file and turns
//! them into the runtime pieces the rest of the workspace consumes.
//!
//! # Features
//! - YAML (default) and TOML (`.toml` extension) support
//! - `~` expansion for config paths
//! - Credentials inline or read from environment variables
//! - Environment overrides for logging and cooldown settings
//!
//! # Example
//! ```no_run
//! # use poolroute_config_file::PoolConfig;
//! # fn example() -> poolroute_core::Result<()> {
//! let mut config = PoolConfig::from_file("~/.poolroute/config.yaml")?;
//! config.merge_env();
//! config.validate()?;
//! let registry = config.build_registry()?;
//! # Ok(())
//! # }
//! ```

mod pool_config;

pub use pool_config::{EndpointConfig, HttpSettings, LoggingConfig, PoolConfig, expand_tilde};
