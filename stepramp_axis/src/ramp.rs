//! Velocity ramp generator.
//!
//! One [`VelocityRamp`] owns the timing and position state of one axis. An
//! external scheduler calls [`VelocityRamp::tick`] every `tick_interval_us`;
//! each tick accumulates time, emits at most one step pulse, and ramps the
//! speed toward the target under the acceleration limit.
//!
//! ## Tick sequence
//!
//! 1. `speed_timer += tick`.
//! 2. Idle (`step_period == 0`): `step_timer = 0`.
//!    Stepping: `step_timer += tick`; when it exceeds `step_period`,
//!    raise STEP, roll the timer back by one period, update speed, set DIR
//!    from the new speed, move the position by one, drop STEP.
//! 3. If `speed_timer` passed the refresh ceiling, update speed.
//!
//! ## Real-time constraints
//!
//! `tick` uses only integer arithmetic, never allocates, never logs and runs
//! in constant time. All divisors come from [`RampParams`], whose
//! constructor bounds every intermediate.

use tracing::debug;

use crate::output::{Direction, StepOutput};
use crate::params::RampParams;
use crate::snapshot::{AxisSnapshot, RampState};

/// Integer velocity ramp for one stepper axis.
#[derive(Debug, Clone)]
pub struct VelocityRamp<O> {
    params: RampParams,
    output: O,
    /// Microsteps taken, wrapping at the `i32` range.
    position: i32,
    /// Current speed [microsteps / speed_scale s]. |speed| ≤ speed_limit.
    speed: i32,
    target_speed: i32,
    acceleration: i32,
    /// µs between pulses; 0 = idle.
    step_period: u32,
    /// µs since the last pulse, rolled back (not cleared) on each pulse.
    step_timer: u32,
    /// µs since the last speed update.
    speed_timer: u32,
}

impl<O: StepOutput> VelocityRamp<O> {
    /// Create an idle axis at position 0.
    pub fn new(params: RampParams, output: O) -> Self {
        debug!(
            tick_interval_us = params.tick_interval_us(),
            speed_limit = params.speed_limit(),
            max_speed_interval_us = params.max_speed_interval_us(),
            "velocity ramp created"
        );
        Self {
            params,
            output,
            position: 0,
            speed: 0,
            target_speed: 0,
            acceleration: 0,
            step_period: 0,
            step_timer: 0,
            speed_timer: 0,
        }
    }

    /// Advance by one tick interval. Call exactly every `tick_interval_us`.
    #[inline]
    pub fn tick(&mut self) {
        let dt = self.params.tick_interval_us();
        self.speed_timer += dt;

        if self.step_period == 0 {
            self.step_timer = 0;
        } else {
            self.step_timer += dt;
            if self.step_timer > self.step_period {
                self.output.set_step(true);
                self.step_timer -= self.step_period;
                self.update_speed();
                let direction = Direction::from_speed(self.speed);
                self.output.set_direction(direction);
                self.position = self.position.wrapping_add(direction.increment());
                self.output.set_step(false);
            }
        }

        if self.speed_timer > self.params.max_speed_interval_us() {
            self.update_speed();
        }
    }

    /// Ramp `speed` toward `target_speed` over the elapsed `speed_timer`
    /// and derive the new step period.
    #[inline]
    fn update_speed(&mut self) {
        self.acceleration = self.acceleration.saturating_abs();

        // acceleration ≤ i32::MAX, speed_timer ≤ 2e6: fits i64.
        let delta = self.acceleration as i64 * self.speed_timer as i64
            / self.params.delta_divisor() as i64;
        let speed = self.speed as i64;
        let target = self.target_speed as i64;
        let limit = self.params.speed_limit() as i64;

        let next = if speed < target {
            (speed + delta).min(target).min(limit)
        } else {
            (speed - delta).max(target).max(-limit)
        };
        // Bounded by [-limit, limit] ⊂ i32.
        self.speed = next as i32;
        self.speed_timer = 0;

        self.step_period = if self.speed == 0 {
            0
        } else {
            self.params.period_numerator() / self.speed.unsigned_abs()
        };
    }

    // ─── Setters (RT-safe) ──────────────────────────────────────────

    /// Acceleration [microsteps/s²]. The sign is ignored.
    #[inline]
    pub fn set_acceleration(&mut self, acceleration: i32) {
        self.acceleration = acceleration;
    }

    /// Requested speed [microsteps / speed_scale s]. Values beyond the
    /// speed limit are accepted; the ramp saturates at the limit.
    #[inline]
    pub fn set_target_speed(&mut self, target_speed: i32) {
        self.target_speed = target_speed;
    }

    /// Redefine the current position (re-homing). Speed and timers are untouched.
    #[inline]
    pub fn set_position(&mut self, position: i32) {
        self.position = position;
    }

    // ─── Getters (RT-safe) ──────────────────────────────────────────

    #[inline]
    pub fn position(&self) -> i32 {
        self.position
    }

    #[inline]
    pub fn speed(&self) -> i32 {
        self.speed
    }

    #[inline]
    pub fn target_speed(&self) -> i32 {
        self.target_speed
    }

    /// Acceleration as last set, or its magnitude once a speed update ran.
    #[inline]
    pub fn acceleration(&self) -> i32 {
        self.acceleration
    }

    #[inline]
    pub fn step_period(&self) -> u32 {
        self.step_period
    }

    #[inline]
    pub fn state(&self) -> RampState {
        if self.step_period == 0 {
            RampState::Idle
        } else {
            RampState::Stepping
        }
    }

    #[inline]
    pub fn params(&self) -> &RampParams {
        &self.params
    }

    pub fn snapshot(&self) -> AxisSnapshot {
        AxisSnapshot {
            position: self.position,
            speed: self.speed,
            target_speed: self.target_speed,
            acceleration: self.acceleration,
            step_period_us: self.step_period,
            state: self.state(),
        }
    }

    // ─── Output access ──────────────────────────────────────────────

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    pub fn into_output(self) -> O {
        self.output
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
