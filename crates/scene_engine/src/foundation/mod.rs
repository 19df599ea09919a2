//! Foundation module - Core utilities and types
//!
//! - Math types and degenerate-safe helpers
//! - Tick timing
//! - Logging utilities

pub mod logging;
pub mod math;
pub mod time;
