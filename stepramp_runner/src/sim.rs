//! Virtual-time driver.
//!
//! Calls `tick` back to back without sleeping: axis time advances by one
//! tick interval per call regardless of wall-clock time. Used for dry runs
//! of a motion profile and for tests.

use serde::Serialize;

use stepramp_axis::{AngularAxis, AxisSnapshot, PulseRecorder};

use crate::config::LoadedConfig;
use stepramp_common::config::ConfigError;

/// Outcome of a run, printable as JSON.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunSummary {
    /// Ticks executed since the axis was created.
    pub ticks: u64,
    /// Axis time covered by those ticks [µs].
    pub elapsed_us: u64,
    pub pulses: u64,
    pub forward_pulses: u64,
    pub reverse_pulses: u64,
    pub position_rad: f32,
    pub speed_rad: f32,
    pub snapshot: AxisSnapshot,
}

impl RunSummary {
    /// Summarize an axis after `ticks` ticks.
    pub fn capture(axis: &AngularAxis<PulseRecorder>, ticks: u64) -> Self {
        let ramp = axis.ramp();
        let recorder = ramp.output();
        Self {
            ticks,
            elapsed_us: ticks.saturating_mul(ramp.params().tick_interval_us() as u64),
            pulses: recorder.pulses(),
            forward_pulses: recorder.forward_pulses(),
            reverse_pulses: recorder.reverse_pulses(),
            position_rad: axis.position_rad(),
            speed_rad: axis.speed_rad(),
            snapshot: ramp.snapshot(),
        }
    }
}

/// One axis driven in virtual time.
#[derive(Debug, Clone)]
pub struct Simulation {
    axis: AngularAxis<PulseRecorder>,
    ticks: u64,
}

impl Simulation {
    pub fn new(axis: AngularAxis<PulseRecorder>) -> Self {
        Self { axis, ticks: 0 }
    }

    /// Axis built from the configuration with its profile applied.
    pub fn from_config(config: &LoadedConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.build_axis(PulseRecorder::new())?))
    }

    pub fn axis(&self) -> &AngularAxis<PulseRecorder> {
        &self.axis
    }

    /// Mutable access for changing commands between runs.
    pub fn axis_mut(&mut self) -> &mut AngularAxis<PulseRecorder> {
        &mut self.axis
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary::capture(&self.axis, self.ticks)
    }

    /// Run `n` ticks.
    pub fn run_ticks(&mut self, n: u64) -> RunSummary {
        for _ in 0..n {
            self.axis.tick();
        }
        self.ticks += n;
        self.summary()
    }

    /// Run whole ticks covering `duration_us`; a partial last tick is dropped.
    pub fn run_for_us(&mut self, duration_us: u64) -> RunSummary {
        let tick = self.axis.ramp().params().tick_interval_us() as u64;
        self.run_ticks(duration_us / tick)
    }

    /// Run `n` ticks, calling `on_report(tick_count, snapshot)` after every
    /// `every` ticks. `every == 0` never reports.
    pub fn run_ticks_with<F>(&mut self, n: u64, every: u64, mut on_report: F) -> RunSummary
    where
        F: FnMut(u64, &AxisSnapshot),
    {
        for _ in 0..n {
            self.axis.tick();
            self.ticks += 1;
            if every != 0 && self.ticks % every == 0 {
                on_report(self.ticks, &self.axis.ramp().snapshot());
            }
        }
        self.summary()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;
    use stepramp_axis::RampState;

    fn sim(profile: &str) -> Simulation {
        let text = format!("[shared]\nservice_name = \"sim\"\n[profile]\n{profile}");
        Simulation::from_config(&load_config_from_str(&text).unwrap()).unwrap()
    }

    #[test]
    fn run_ticks_accumulates() {
        let mut s = sim("acceleration = 2000\ntarget_speed = 4000\n");
        s.run_ticks(500);
        let summary = s.run_ticks(500);
        assert_eq!(summary.ticks, 1000);
        assert_eq!(summary.elapsed_us, 100_000);
        assert_eq!(summary.snapshot.speed, 4000);
        assert_eq!(summary.snapshot.step_period_us, 500_000);
        assert_eq!(summary.pulses, 0);
    }

    #[test]
    fn run_for_us_drops_partial_tick() {
        let mut s = sim("");
        let summary = s.run_for_us(1_050);
        assert_eq!(summary.ticks, 10);
        assert_eq!(summary.snapshot.state, RampState::Idle);
    }

    #[test]
    fn reports_at_interval() {
        let mut s = sim("acceleration = 10000000\ntarget_speed = 2000000\n");
        let mut seen = Vec::new();
        let summary = s.run_ticks_with(1000, 250, |tick, snap| seen.push((tick, snap.speed)));
        assert_eq!(
            seen,
            vec![
                (250, 2_000_000),
                (500, 2_000_000),
                (750, 2_000_000),
                (1000, 2_000_000)
            ]
        );
        assert_eq!(summary.pulses as i64, summary.snapshot.position as i64);
    }

    #[test]
    fn zero_report_interval_never_calls_back() {
        let mut s = sim("");
        let mut calls = 0;
        s.run_ticks_with(100, 0, |_, _| calls += 1);
        assert_eq!(calls, 0);
    }

    #[test]
    fn summary_serializes() {
        let mut s = sim("acceleration = 2000\ntarget_speed = 4000\n");
        let json = serde_json::to_value(s.run_ticks(11)).unwrap();
        assert_eq!(json["ticks"], 11);
        assert_eq!(json["snapshot"]["speed"], 4000);
        assert_eq!(json["snapshot"]["state"], "stepping");
    }
}
