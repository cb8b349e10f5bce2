//! Per-axis configuration.
//!
//! All fields use `#[serde(default)]` so a bare `[axis]` table yields the
//! reference axis (10 kHz tick, 200-step motor at 1/16 microstepping).
//! Timing bounds are enforced by the ramp parameters at construction; this
//! module validates only the motor geometry.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::consts::{
    MAX_SPEED, MAX_SPEED_INTERVAL_US, MICROSTEPS, MICROSTEPS_MAX, SPEED_SCALE,
    STEPS_PER_REVOLUTION, TICK_INTERVAL_US,
};

/// Timing and geometry of one stepper axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AxisConfig {
    /// Period of the external tick [µs]. Must match the scheduler.
    #[serde(default = "default_tick_interval_us")]
    pub tick_interval_us: u32,

    /// Speed ceiling [microsteps/s].
    #[serde(default = "default_max_speed")]
    pub max_speed: i32,

    /// Fixed-point scale of speed values.
    #[serde(default = "default_speed_scale")]
    pub speed_scale: u32,

    /// Longest allowed time between speed recomputations [µs].
    #[serde(default = "default_max_speed_interval_us")]
    pub max_speed_interval_us: u32,

    /// Physical steps per revolution.
    #[serde(default = "default_steps_per_revolution")]
    pub steps_per_revolution: u16,

    /// Microsteps per physical step (power of two).
    #[serde(default = "default_microsteps")]
    pub microsteps: u16,
}

fn default_tick_interval_us() -> u32 {
    TICK_INTERVAL_US
}
fn default_max_speed() -> i32 {
    MAX_SPEED
}
fn default_speed_scale() -> u32 {
    SPEED_SCALE
}
fn default_max_speed_interval_us() -> u32 {
    MAX_SPEED_INTERVAL_US
}
fn default_steps_per_revolution() -> u16 {
    STEPS_PER_REVOLUTION
}
fn default_microsteps() -> u16 {
    MICROSTEPS
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            tick_interval_us: TICK_INTERVAL_US,
            max_speed: MAX_SPEED,
            speed_scale: SPEED_SCALE,
            max_speed_interval_us: MAX_SPEED_INTERVAL_US,
            steps_per_revolution: STEPS_PER_REVOLUTION,
            microsteps: MICROSTEPS,
        }
    }
}

impl AxisConfig {
    /// Validate motor geometry.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.steps_per_revolution == 0 {
            return Err(ConfigError::ValidationError(
                "steps_per_revolution must be > 0".to_string(),
            ));
        }
        if self.microsteps == 0
            || self.microsteps > MICROSTEPS_MAX
            || !self.microsteps.is_power_of_two()
        {
            return Err(ConfigError::ValidationError(format!(
                "microsteps {} must be a power of two in [1, {}]",
                self.microsteps, MICROSTEPS_MAX
            )));
        }
        Ok(())
    }

    /// Microsteps per full revolution.
    #[inline]
    pub fn microsteps_per_revolution(&self) -> u32 {
        self.steps_per_revolution as u32 * self.microsteps as u32
    }

    /// Angle of one microstep [rad].
    pub fn step_angle(&self) -> f32 {
        core::f32::consts::TAU / self.microsteps_per_revolution() as f32
    }
}
