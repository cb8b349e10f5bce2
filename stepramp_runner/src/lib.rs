//! # stepramp Runner Library
//!
//! Host-side stand-in for the timer interrupt that drives a
//! [`stepramp_axis::VelocityRamp`].
//!
//! - [`sim`]: virtual time, ticks back to back (dry runs, tests)
//! - [`cycle`]: wall-clock pacing, optional PREEMPT_RT setup (`rt` feature)
//! - [`config`]: the runner TOML file
//!
//! Either driver is the sole caller of `tick` for its axis.

pub mod config;
pub mod cycle;
pub mod sim;
