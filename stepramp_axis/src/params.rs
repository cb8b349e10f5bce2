//! Validated integer parameters of a velocity ramp.
//!
//! All divisors and products used by the tick path are derived once here.
//! Construction rejects any combination whose intermediates could overflow,
//! so the tick itself never checks.

use stepramp_common::axis::AxisConfig;
use stepramp_common::consts::{
    MAX_SPEED, MAX_SPEED_INTERVAL_US, MAX_SPEED_INTERVAL_US_MAX, MAX_SPEED_INTERVAL_US_MIN,
    SPEED_SCALE, SPEED_SCALE_MAX, SPEED_SCALE_MIN, TICK_INTERVAL_US, TICK_INTERVAL_US_MAX,
    TICK_INTERVAL_US_MIN, US_PER_SECOND,
};
use static_assertions::const_assert;
use thiserror::Error;

/// Rejected ramp parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParamError {
    #[error(
        "tick_interval_us {0} out of range [{min}, {max}]",
        min = TICK_INTERVAL_US_MIN,
        max = TICK_INTERVAL_US_MAX
    )]
    TickInterval(u32),

    #[error(
        "speed_scale {0} out of range [{min}, {max}]",
        min = SPEED_SCALE_MIN,
        max = SPEED_SCALE_MAX
    )]
    SpeedScale(u32),

    #[error("max_speed {max_speed} × speed_scale {speed_scale} must be in [1, i32::MAX]")]
    MaxSpeed { max_speed: i32, speed_scale: u32 },

    #[error(
        "max_speed_interval_us {0} out of range [{min}, {max}]",
        min = MAX_SPEED_INTERVAL_US_MIN,
        max = MAX_SPEED_INTERVAL_US_MAX
    )]
    RefreshInterval(u32),

    /// The axis would need more than one pulse per tick at full speed.
    #[error("max_speed {max_speed} steps/s exceeds one step per {tick_interval_us} µs tick")]
    StepRateExceedsTick { max_speed: i32, tick_interval_us: u32 },
}

/// Fixed timing parameters of one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RampParams {
    tick_interval_us: u32,
    max_speed_interval_us: u32,
    speed_scale: u32,
    /// `max_speed * speed_scale`, the bound on |speed|.
    speed_limit: i32,
    /// `US_PER_SECOND / speed_scale` (≥ 1).
    delta_divisor: u32,
    /// `US_PER_SECOND * speed_scale`, divided by |speed| to get the period.
    period_numerator: u32,
}

impl RampParams {
    /// Reference parameters from `stepramp_common::consts`.
    ///
    /// Valid by construction: the same bounds are asserted at compile time.
    pub const REFERENCE: Self = Self {
        tick_interval_us: TICK_INTERVAL_US,
        max_speed_interval_us: MAX_SPEED_INTERVAL_US,
        speed_scale: SPEED_SCALE,
        speed_limit: MAX_SPEED * SPEED_SCALE as i32,
        delta_divisor: US_PER_SECOND / SPEED_SCALE,
        period_numerator: US_PER_SECOND * SPEED_SCALE,
    };

    /// Validate and derive parameters.
    ///
    /// - `tick_interval_us`: period of the external tick [µs]
    /// - `max_speed`: speed ceiling [microsteps/s]
    /// - `speed_scale`: fixed-point scale of speed values
    /// - `max_speed_interval_us`: longest time between speed recomputations [µs]
    pub fn new(
        tick_interval_us: u32,
        max_speed: i32,
        speed_scale: u32,
        max_speed_interval_us: u32,
    ) -> Result<Self, ParamError> {
        if !(TICK_INTERVAL_US_MIN..=TICK_INTERVAL_US_MAX).contains(&tick_interval_us) {
            return Err(ParamError::TickInterval(tick_interval_us));
        }
        if !(SPEED_SCALE_MIN..=SPEED_SCALE_MAX).contains(&speed_scale) {
            return Err(ParamError::SpeedScale(speed_scale));
        }
        if !(MAX_SPEED_INTERVAL_US_MIN..=MAX_SPEED_INTERVAL_US_MAX).contains(&max_speed_interval_us)
        {
            return Err(ParamError::RefreshInterval(max_speed_interval_us));
        }

        let limit = max_speed as i64 * speed_scale as i64;
        if max_speed < 1 || limit > i32::MAX as i64 {
            return Err(ParamError::MaxSpeed {
                max_speed,
                speed_scale,
            });
        }
        if max_speed as u64 * tick_interval_us as u64 > US_PER_SECOND as u64 {
            return Err(ParamError::StepRateExceedsTick {
                max_speed,
                tick_interval_us,
            });
        }

        Ok(Self {
            tick_interval_us,
            max_speed_interval_us,
            speed_scale,
            speed_limit: limit as i32,
            delta_divisor: US_PER_SECOND / speed_scale,
            period_numerator: US_PER_SECOND * speed_scale,
        })
    }

    /// Reference parameters with a different tick interval.
    pub fn with_tick_interval(tick_interval_us: u32) -> Result<Self, ParamError> {
        Self::new(tick_interval_us, MAX_SPEED, SPEED_SCALE, MAX_SPEED_INTERVAL_US)
    }

    #[inline]
    pub const fn tick_interval_us(&self) -> u32 {
        self.tick_interval_us
    }

    #[inline]
    pub const fn max_speed_interval_us(&self) -> u32 {
        self.max_speed_interval_us
    }

    #[inline]
    pub const fn speed_scale(&self) -> u32 {
        self.speed_scale
    }

    /// Speed ceiling in scaled units (`max_speed * speed_scale`).
    #[inline]
    pub const fn speed_limit(&self) -> i32 {
        self.speed_limit
    }

    /// Speed ceiling [microsteps/s].
    #[inline]
    pub const fn max_speed(&self) -> i32 {
        self.speed_limit / self.speed_scale as i32
    }

    #[inline]
    pub const fn delta_divisor(&self) -> u32 {
        self.delta_divisor
    }

    #[inline]
    pub const fn period_numerator(&self) -> u32 {
        self.period_numerator
    }
}

const_assert!(RampParams::REFERENCE.delta_divisor() >= 1);
const_assert!(RampParams::REFERENCE.speed_limit() > 0);

impl Default for RampParams {
    fn default() -> Self {
        Self::REFERENCE
    }
}

impl TryFrom<&AxisConfig> for RampParams {
    type Error = ParamError;

    fn try_from(cfg: &AxisConfig) -> Result<Self, Self::Error> {
        Self::new(
            cfg.tick_interval_us,
            cfg.max_speed,
            cfg.speed_scale,
            cfg.max_speed_interval_us,
        )
    }
}
