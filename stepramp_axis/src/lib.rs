//! # stepramp Axis Library
//!
//! Integer-only velocity ramp generator for one stepper motor axis. An
//! external scheduler calls [`VelocityRamp::tick`] at a fixed interval; the
//! ramp emits STEP/DIR pulses through a [`StepOutput`] and ramps the speed
//! toward a target under an acceleration limit.
//!
//! ## Units
//!
//! - position: microsteps
//! - speed: microsteps per `speed_scale` seconds
//! - acceleration: microsteps/s² (speed changes by `acceleration * speed_scale` per second)
//! - time: microseconds
//!
//! ## RT Path
//!
//! `tick`, the integer setters and getters never allocate, block, log or
//! use floating point. [`AngularAxis`] adds radian conversions for the
//! non-RT side only.

pub mod angular;
pub mod output;
pub mod params;
pub mod ramp;
pub mod recorder;
pub mod snapshot;

pub use angular::AngularAxis;
pub use output::{Direction, NullOutput, PinOutput, StepOutput};
pub use params::{ParamError, RampParams};
pub use ramp::VelocityRamp;
pub use recorder::{Edge, PulseRecorder};
pub use snapshot::{AxisSnapshot, RampState};
