//! Prelude module for common re-exports.
//!
//! ```rust
//! use stepramp_common::prelude::*;
//! ```

// ─── Logging ────────────────────────────────────────────────────────
pub use crate::config::LogLevel;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::axis::AxisConfig;
pub use crate::config::{ConfigError, ConfigLoader, SharedConfig};

// ─── Fixed-Point Constants ──────────────────────────────────────────
pub use crate::consts::{MAX_SPEED, MAX_SPEED_INTERVAL_US, SPEED_SCALE, TICK_INTERVAL_US};
