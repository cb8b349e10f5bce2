//! Angular-unit façade over a [`VelocityRamp`].
//!
//! Converts radians, rad/s and rad/s² to and from the integer ramp units.
//! Every method here uses `f32` and is **not** for the tick context: call
//! these from the main loop only, never while `tick` may be running.
//! `tick` itself is forwarded untouched.

use stepramp_common::axis::AxisConfig;
use tracing::trace;

use crate::output::StepOutput;
use crate::params::{ParamError, RampParams};
use crate::ramp::VelocityRamp;

/// Ramp plus the microstep angle needed for unit conversion.
#[derive(Debug, Clone)]
pub struct AngularAxis<O> {
    ramp: VelocityRamp<O>,
    /// Radians per microstep.
    step_angle: f32,
}

impl<O: StepOutput> AngularAxis<O> {
    /// Wrap an existing ramp. `step_angle` is radians per microstep.
    pub fn new(ramp: VelocityRamp<O>, step_angle: f32) -> Self {
        Self { ramp, step_angle }
    }

    /// Build ramp and façade from an axis configuration.
    pub fn from_config(cfg: &AxisConfig, output: O) -> Result<Self, ParamError> {
        let params = RampParams::try_from(cfg)?;
        Ok(Self::new(VelocityRamp::new(params, output), cfg.step_angle()))
    }

    /// Forwarded to [`VelocityRamp::tick`]; integer only.
    #[inline]
    pub fn tick(&mut self) {
        self.ramp.tick();
    }

    /// Radians per microstep.
    pub fn step_angle(&self) -> f32 {
        self.step_angle
    }

    fn scale(&self) -> f32 {
        self.ramp.params().speed_scale() as f32
    }

    /// Set acceleration in rad/s². Float-to-int conversion saturates; NaN gives 0.
    pub fn set_acceleration_rad(&mut self, acceleration: f32) {
        let value = (acceleration / self.step_angle) as i32;
        trace!(rad_per_s2 = acceleration, units = value, "acceleration set");
        self.ramp.set_acceleration(value);
    }

    /// Set target speed in rad/s. Float-to-int conversion saturates; NaN gives 0.
    pub fn set_target_speed_rad(&mut self, speed: f32) {
        let value = (speed * self.scale() / self.step_angle) as i32;
        trace!(rad_per_s = speed, units = value, "target speed set");
        self.ramp.set_target_speed(value);
    }

    /// Position in radians.
    pub fn position_rad(&self) -> f32 {
        self.ramp.position() as f32 * self.step_angle
    }

    /// Current speed in rad/s.
    pub fn speed_rad(&self) -> f32 {
        self.ramp.speed() as f32 * self.step_angle / self.scale()
    }

    pub fn ramp(&self) -> &VelocityRamp<O> {
        &self.ramp
    }

    pub fn ramp_mut(&mut self) -> &mut VelocityRamp<O> {
        &mut self.ramp
    }

    pub fn into_ramp(self) -> VelocityRamp<O> {
        self.ramp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::NullOutput;
    use core::f32::consts::TAU;

    fn reference_axis() -> AngularAxis<NullOutput> {
        AngularAxis::from_config(&AxisConfig::default(), NullOutput).unwrap()
    }

    #[test]
    fn one_revolution_per_second() {
        let mut axis = reference_axis();
        axis.set_target_speed_rad(TAU);
        // 3200 microsteps/s × 2000 scale; f32 rounding may move the last units.
        let target = axis.ramp().target_speed();
        assert!((6_399_990..=6_400_010).contains(&target), "{target}");
    }

    #[test]
    fn acceleration_conversion() {
        let mut axis = reference_axis();
        axis.set_acceleration_rad(TAU);
        let accel = axis.ramp().acceleration();
        assert!((3199..=3200).contains(&accel), "{accel}");
    }

    #[test]
    fn negative_speed_keeps_sign() {
        let mut axis = reference_axis();
        axis.set_target_speed_rad(-TAU / 2.0);
        assert!(axis.ramp().target_speed() < -3_199_000);
    }

    #[test]
    fn non_finite_inputs_saturate() {
        let mut axis = reference_axis();
        axis.set_target_speed_rad(f32::INFINITY);
        assert_eq!(axis.ramp().target_speed(), i32::MAX);
        axis.set_target_speed_rad(f32::NAN);
        assert_eq!(axis.ramp().target_speed(), 0);
        axis.set_acceleration_rad(f32::NEG_INFINITY);
        assert_eq!(axis.ramp().acceleration(), i32::MIN);
    }

    #[test]
    fn position_and_speed_read_back() {
        let mut axis = reference_axis();
        axis.ramp_mut().set_position(1600);
        assert!((axis.position_rad() - TAU / 2.0).abs() < 1e-4);

        axis.ramp_mut().set_acceleration(i32::MAX);
        axis.ramp_mut().set_target_speed(6_400_000);
        for _ in 0..11 {
            axis.tick();
        }
        assert_eq!(axis.ramp().speed(), 6_400_000);
        assert!((axis.speed_rad() - TAU).abs() < 1e-3);
    }

    #[test]
    fn invalid_config_rejected() {
        let cfg = AxisConfig {
            tick_interval_us: 0,
            ..Default::default()
        };
        assert!(matches!(
            AngularAxis::from_config(&cfg, NullOutput),
            Err(ParamError::TickInterval(0))
        ));
    }
}
