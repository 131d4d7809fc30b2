//! Shared error model and configuration for anyload.
//!
//! This crate is the foundation depended on by all other anyload crates.
//! It provides:
//! - [`AnyloadError`] — the unified error type
//! - Configuration ([`AppConfig`], [`FetchConfig`], [`FetchPolicy`], config loading)

pub mod config;
pub mod error;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, FetchConfig, FetchPolicy, config_dir, config_file_path, init_config, load_config,
    load_config_from,
};
pub use error::{AnyloadError, Result};
