//! stepramp Common Library
//!
//! Shared constants and configuration loading utilities for all stepramp
//! workspace crates.
//!
//! # Module Structure
//!
//! - [`consts`] - Fixed-point scaling constants and parameter bounds
//! - [`axis`] - Per-axis configuration (timing + geometry)
//! - [`config`] - Configuration loading traits and types
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use stepramp_common::consts::SPEED_SCALE;
//! use stepramp_common::config::{ConfigLoader, SharedConfig};
//! ```

pub mod axis;
pub mod config;
pub mod consts;
pub mod prelude;
