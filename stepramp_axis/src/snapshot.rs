//! Telemetry snapshot of one axis.

use serde::Serialize;

/// Logical state of the ramp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RampState {
    /// `step_period == 0`: no pulses are emitted.
    #[default]
    Idle,
    /// `step_period > 0`: pulses at the derived rate.
    Stepping,
}

/// Copy of the integer state at one instant.
///
/// Cheap to take from the tick context; serialize it elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AxisSnapshot {
    /// Microsteps taken (forward positive).
    pub position: i32,
    /// Current speed [microsteps / speed_scale s].
    pub speed: i32,
    /// Requested speed, same units.
    pub target_speed: i32,
    /// Acceleration [microsteps/s²].
    pub acceleration: i32,
    /// Microseconds between pulses, 0 when idle.
    pub step_period_us: u32,
    pub state: RampState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_snapshot_is_idle_at_origin() {
        let snap = AxisSnapshot::default();
        assert_eq!(snap.state, RampState::Idle);
        assert_eq!(snap.position, 0);
        assert_eq!(snap.step_period_us, 0);
    }
}
