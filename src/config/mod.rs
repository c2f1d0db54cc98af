//! Configuration Module
//!
//! Runtime configuration loaded from TOML.
//!
//! ## Loading Order
//!
//! 1. `IDEAL_FIT_CONFIG` environment variable (path to TOML file)
//! 2. `ideal_fit.toml` in the current working directory
//! 3. Built-in defaults
//!
//! The loaded `AppConfig` is passed explicitly to whatever needs it; there is
//! no process-wide config instance.

mod app_config;
pub mod defaults;
pub mod validation;

pub use app_config::*;
