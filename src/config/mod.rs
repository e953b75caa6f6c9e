//! Configuration loading and management for the Payroll Engine.
//!
//! This module provides functionality to load engine configuration from YAML
//! files, including engine metadata, the night window, the holiday calendar,
//! seed policies, and leave entitlement defaults.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Loaded engine: {}", config.engine().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    EngineConfig, EngineMetadata, EngineSettings, LeaveSettings, PoliciesConfig, PolicySeed,
};
