//! Runner configuration: one TOML file with `[shared]`, `[axis]`,
//! `[profile]` and `[report]` tables.
//!
//! ```toml
//! [shared]
//! service_name = "stepramp-bench"
//!
//! [axis]
//! tick_interval_us = 100
//!
//! [profile]
//! acceleration = 2000
//! target_speed = 4000
//! duration_ms = 100
//!
//! [report]
//! interval_ms = 10
//! ```

use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

use stepramp_axis::{AngularAxis, RampParams, StepOutput};
use stepramp_common::axis::AxisConfig;
use stepramp_common::config::{ConfigError, ConfigLoader, SharedConfig};

/// Default run length [ms].
pub const DURATION_MS_DEFAULT: u64 = 1000;

/// Default progress report interval [ms].
pub const REPORT_INTERVAL_MS_DEFAULT: u64 = 100;

// ─── File Layout ────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunnerConfig {
    pub shared: SharedConfig,
    #[serde(default)]
    pub axis: AxisConfig,
    #[serde(default)]
    pub profile: ProfileConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

/// Motion command applied before the first tick.
///
/// Integer values are in ramp units. The `_rad` variants, when present,
/// replace their integer counterpart and go through the angular conversion.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileConfig {
    /// [microsteps/s²]; sign ignored.
    #[serde(default)]
    pub acceleration: i32,

    /// [microsteps / speed_scale s].
    #[serde(default)]
    pub target_speed: i32,

    /// [rad/s²]
    #[serde(default)]
    pub acceleration_rad: Option<f32>,

    /// [rad/s]
    #[serde(default)]
    pub target_speed_rad: Option<f32>,

    /// Run length [ms] of axis time.
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u64,
}

fn default_duration_ms() -> u64 {
    DURATION_MS_DEFAULT
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            acceleration: 0,
            target_speed: 0,
            acceleration_rad: None,
            target_speed_rad: None,
            duration_ms: DURATION_MS_DEFAULT,
        }
    }
}

impl ProfileConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.duration_ms == 0 {
            return Err(ConfigError::ValidationError(
                "profile.duration_ms must be > 0".to_string(),
            ));
        }
        for (name, value) in [
            ("acceleration_rad", self.acceleration_rad),
            ("target_speed_rad", self.target_speed_rad),
        ] {
            match value {
                Some(v) if !v.is_finite() => {
                    return Err(ConfigError::ValidationError(format!(
                        "profile.{name} must be finite, got {v}"
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Command the axis. Angular values win over integer ones.
    pub fn apply<O: StepOutput>(&self, axis: &mut AngularAxis<O>) {
        match self.acceleration_rad {
            Some(rad) => axis.set_acceleration_rad(rad),
            None => axis.ramp_mut().set_acceleration(self.acceleration),
        }
        match self.target_speed_rad {
            Some(rad) => axis.set_target_speed_rad(rad),
            None => axis.ramp_mut().set_target_speed(self.target_speed),
        }
    }

    /// Number of ticks covering `duration_ms` at the given tick interval.
    pub fn ticks(&self, tick_interval_us: u32) -> u64 {
        self.duration_ms.saturating_mul(1000) / tick_interval_us.max(1) as u64
    }
}

/// Progress reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    /// Snapshot interval [ms] of axis time. 0 disables progress reports.
    #[serde(default = "default_report_interval_ms")]
    pub interval_ms: u64,
}

fn default_report_interval_ms() -> u64 {
    REPORT_INTERVAL_MS_DEFAULT
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            interval_ms: REPORT_INTERVAL_MS_DEFAULT,
        }
    }
}

impl ReportConfig {
    /// Report interval in ticks, `None` when disabled.
    pub fn every_ticks(&self, tick_interval_us: u32) -> Option<u64> {
        if self.interval_ms == 0 {
            return None;
        }
        let ticks = self.interval_ms.saturating_mul(1000) / tick_interval_us.max(1) as u64;
        Some(ticks.max(1))
    }
}

// ─── Loaded Config Bundle ───────────────────────────────────────────

/// Validated configuration plus the derived ramp parameters.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub runner: RunnerConfig,
    pub params: RampParams,
}

impl LoadedConfig {
    /// Total ticks of the configured profile.
    pub fn ticks(&self) -> u64 {
        self.runner.profile.ticks(self.params.tick_interval_us())
    }

    /// Report interval in ticks, `None` when disabled.
    pub fn report_every(&self) -> Option<u64> {
        self.runner.report.every_ticks(self.params.tick_interval_us())
    }

    /// Build an angular axis on `output` with the profile applied.
    pub fn build_axis<O: StepOutput>(&self, output: O) -> Result<AngularAxis<O>, ConfigError> {
        let mut axis = AngularAxis::from_config(&self.runner.axis, output)
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        self.runner.profile.apply(&mut axis);
        debug!(
            acceleration = axis.ramp().acceleration(),
            target_speed = axis.ramp().target_speed(),
            "profile applied"
        );
        Ok(axis)
    }
}

// ─── Loading Functions ──────────────────────────────────────────────

/// Load and validate the runner configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<LoadedConfig, ConfigError> {
    let runner = RunnerConfig::load(path)?;
    let loaded = validate(runner)?;
    info!(
        path = %path.display(),
        service = %loaded.runner.shared.service_name,
        tick_interval_us = loaded.params.tick_interval_us(),
        "configuration loaded"
    );
    Ok(loaded)
}

/// Load config from a TOML string (for testing).
pub fn load_config_from_str(content: &str) -> Result<LoadedConfig, ConfigError> {
    validate(RunnerConfig::load_str(content)?)
}

fn validate(runner: RunnerConfig) -> Result<LoadedConfig, ConfigError> {
    runner.shared.validate()?;
    runner.axis.validate()?;
    runner.profile.validate()?;
    let params = RampParams::try_from(&runner.axis)
        .map_err(|e| ConfigError::ValidationError(format!("axis: {e}")))?;
    Ok(LoadedConfig { runner, params })
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use stepramp_axis::NullOutput;

    const MINIMAL: &str = "[shared]\nservice_name = \"test\"\n";

    #[test]
    fn minimal_file_uses_defaults() {
        let loaded = load_config_from_str(MINIMAL).unwrap();
        assert_eq!(loaded.runner.axis, AxisConfig::default());
        assert_eq!(loaded.runner.profile, ProfileConfig::default());
        assert_eq!(loaded.params, RampParams::REFERENCE);
        // 1000 ms at 100 µs.
        assert_eq!(loaded.ticks(), 10_000);
        assert_eq!(loaded.report_every(), Some(1000));
    }

    #[test]
    fn report_can_be_disabled() {
        let loaded =
            load_config_from_str(&format!("{MINIMAL}[report]\ninterval_ms = 0\n")).unwrap();
        assert_eq!(loaded.report_every(), None);
    }

    #[test]
    fn short_report_interval_is_at_least_one_tick() {
        let report = ReportConfig { interval_ms: 1 };
        assert_eq!(report.every_ticks(100), Some(10));
        assert_eq!(report.every_ticks(5000), Some(1));
    }

    #[test]
    fn zero_duration_rejected() {
        let err = load_config_from_str(&format!("{MINIMAL}[profile]\nduration_ms = 0\n"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn timing_bounds_surface_as_validation_errors() {
        let err = load_config_from_str(&format!("{MINIMAL}[axis]\nspeed_scale = 5000\n"))
            .unwrap_err();
        match err {
            ConfigError::ValidationError(msg) => assert!(msg.contains("speed_scale 5000")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn blank_service_name_rejected() {
        let err = load_config_from_str("[shared]\nservice_name = \"\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn unknown_profile_key_rejected() {
        let err =
            load_config_from_str(&format!("{MINIMAL}[profile]\nvelocity = 3\n")).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn angular_profile_overrides_integer_values() {
        let loaded = load_config_from_str(&format!(
            "{MINIMAL}[profile]\nacceleration = 5\ntarget_speed = 7\ntarget_speed_rad = -1.0\n"
        ))
        .unwrap();
        let axis = loaded.build_axis(NullOutput).unwrap();
        assert_eq!(axis.ramp().acceleration(), 5);
        // -1 rad/s ≈ -509.3 microsteps/s × 2000.
        let target = axis.ramp().target_speed();
        assert!((-1_018_600..=-1_018_590).contains(&target), "{target}");
    }
}
