//! Configuration module for imap-dedup.
//!
//! This module handles:
//! - Loading configuration from TOML files
//! - CLI argument merging
//! - Configuration validation

pub mod loader;
pub mod modes;
pub mod validation;

pub use loader::{AuthConfig, Config, OptionsConfig, ServerConfig};
pub use modes::FingerprintMode;
pub use validation::{parse_sent_before, validate_config};
