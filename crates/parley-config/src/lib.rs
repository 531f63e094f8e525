//! Configuration system for Parley.
//!
//! Provides TOML-based configuration with:
//! - `[memory]`, `[recall]` and `[logging]` sections, all optional
//! - Config file layering (user config + project-local overrides)
//! - Platform defaults for the snapshot file and log directory

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    CONFIG_DIR_VAR, ConfigSource, Layer, LoadedConfig, load_layered, load_layered_from,
    read_config, user_config_dir, user_config_path,
};
pub use error::{ConfigError, Result};
pub use types::*;
