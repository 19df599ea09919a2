//! # Core Engine Module
//!
//! Shared engine-level abstractions. Currently the unified configuration
//! tree every subsystem reads its settings from.

pub mod config;

pub use config::{Config, ConfigError, EngineConfig, PhysicsConfig};
