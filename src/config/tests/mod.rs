//! Unit tests for configuration loading and precedence.
//!
//! - `helpers`: Shared test utilities
//! - `precedence`: Layer precedence tests
//! - `operation_mode`: Operation selection tests
//! - `field_resolution`: API key, limits, and export resolution tests

mod field_resolution;
mod helpers;
