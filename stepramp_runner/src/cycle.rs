//! Wall-clock paced tick loop.
//!
//! Stands in for the timer interrupt on a host: calls `tick` once per
//! `tick_interval_us` of real time.
//!
//! ## RT Setup Sequence
//! 1. `mlockall(MCL_CURRENT | MCL_FUTURE)`: lock all pages.
//! 2. Prefault stack pages.
//! 3. `sched_setaffinity`: pin to an isolated CPU core.
//! 4. `sched_setscheduler(SCHED_FIFO, prio)`: RT priority.
//!
//! ## Cycle Loop
//! With the `rt` feature: absolute-time `clock_nanosleep` on
//! `CLOCK_MONOTONIC` for drift-free pacing; an overrun ends the run.
//! Without it: `std::thread::sleep` for the remaining time; overruns are
//! counted and the loop continues.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tracing::{info, warn};

use stepramp_axis::{AngularAxis, StepOutput};

// ─── Cycle Statistics ───────────────────────────────────────────────

/// O(1) per-cycle timing statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleStats {
    /// Total cycles executed.
    pub cycle_count: u64,
    /// Last cycle duration [ns].
    pub last_cycle_ns: i64,
    /// Minimum cycle duration [ns].
    pub min_cycle_ns: i64,
    /// Maximum cycle duration [ns].
    pub max_cycle_ns: i64,
    /// Running sum for average computation.
    pub sum_cycle_ns: i64,
    /// Number of cycles that exceeded the budget.
    pub overruns: u64,
    /// Maximum wake-up latency [ns].
    pub max_latency_ns: i64,
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleStats {
    pub const fn new() -> Self {
        Self {
            cycle_count: 0,
            last_cycle_ns: 0,
            min_cycle_ns: i64::MAX,
            max_cycle_ns: 0,
            sum_cycle_ns: 0,
            overruns: 0,
            max_latency_ns: 0,
        }
    }

    /// Record a cycle duration. O(1), no allocation.
    #[inline]
    pub fn record(&mut self, duration_ns: i64, latency_ns: i64) {
        self.cycle_count += 1;
        self.last_cycle_ns = duration_ns;
        self.min_cycle_ns = self.min_cycle_ns.min(duration_ns);
        self.max_cycle_ns = self.max_cycle_ns.max(duration_ns);
        self.sum_cycle_ns = self.sum_cycle_ns.saturating_add(duration_ns);
        self.max_latency_ns = self.max_latency_ns.max(latency_ns);
    }

    /// Average cycle time [ns] (0 if no cycles).
    #[inline]
    pub fn avg_cycle_ns(&self) -> i64 {
        if self.cycle_count == 0 {
            0
        } else {
            self.sum_cycle_ns / self.cycle_count as i64
        }
    }
}

// ─── Errors ─────────────────────────────────────────────────────────

/// Errors during RT setup or cycle execution.
#[derive(Debug, Error)]
pub enum CycleError {
    /// RT system call failed.
    #[error("RT setup error: {0}")]
    RtSetup(String),

    /// A tick took longer than its interval (`rt` feature only).
    #[error("cycle overrun: {actual_ns}ns > {budget_ns}ns budget")]
    CycleOverrun { actual_ns: i64, budget_ns: i64 },
}

// ─── RT Setup ───────────────────────────────────────────────────────

/// Lock all current and future memory pages.
#[cfg(feature = "rt")]
fn rt_mlockall() -> Result<(), CycleError> {
    use nix::sys::mman::{MlockallFlags, mlockall};
    mlockall(MlockallFlags::MCL_CURRENT | MlockallFlags::MCL_FUTURE)
        .map_err(|e| CycleError::RtSetup(format!("mlockall failed: {e}")))
}

#[cfg(not(feature = "rt"))]
fn rt_mlockall() -> Result<(), CycleError> {
    Ok(())
}

/// Touch 256 KB of stack so the loop never takes a page fault on it.
fn prefault_stack() {
    let mut buf = [0u8; 256 * 1024];
    for byte in buf.iter_mut() {
        // SAFETY: `byte` is a valid, aligned, exclusive reference.
        unsafe { core::ptr::write_volatile(byte, 0xFF) };
    }
    core::hint::black_box(&buf);
}

#[cfg(feature = "rt")]
fn rt_set_affinity(cpu: usize) -> Result<(), CycleError> {
    use nix::sched::{CpuSet, sched_setaffinity};
    use nix::unistd::Pid;

    let mut cpuset = CpuSet::new();
    cpuset
        .set(cpu)
        .map_err(|e| CycleError::RtSetup(format!("CpuSet::set({cpu}) failed: {e}")))?;
    sched_setaffinity(Pid::from_raw(0), &cpuset)
        .map_err(|e| CycleError::RtSetup(format!("sched_setaffinity failed: {e}")))
}

#[cfg(not(feature = "rt"))]
fn rt_set_affinity(_cpu: usize) -> Result<(), CycleError> {
    Ok(())
}

#[cfg(feature = "rt")]
fn rt_set_scheduler(priority: i32) -> Result<(), CycleError> {
    let param = libc::sched_param {
        sched_priority: priority,
    };
    // SAFETY: `param` outlives the call; pid 0 is the calling thread.
    let ret = unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) };
    if ret != 0 {
        let err = std::io::Error::last_os_error();
        return Err(CycleError::RtSetup(format!(
            "sched_setscheduler(SCHED_FIFO, {priority}) failed: {err}"
        )));
    }
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn rt_set_scheduler(_priority: i32) -> Result<(), CycleError> {
    Ok(())
}

/// Full RT setup sequence. Call before [`CycleRunner::run`].
///
/// Without the `rt` feature only the stack prefault runs.
pub fn rt_setup(cpu_core: usize, rt_priority: i32) -> Result<(), CycleError> {
    rt_mlockall()?;
    prefault_stack();
    rt_set_affinity(cpu_core)?;
    rt_set_scheduler(rt_priority)?;
    Ok(())
}

// ─── Cycle Runner ───────────────────────────────────────────────────

/// Real-time tick scheduler for one axis.
pub struct CycleRunner<O> {
    axis: AngularAxis<O>,
    stats: CycleStats,
    running: Arc<AtomicBool>,
    /// Tick interval [ns].
    cycle_time_ns: i64,
    /// Ticks executed.
    ticks: u64,
}

impl<O: StepOutput> CycleRunner<O> {
    pub fn new(axis: AngularAxis<O>) -> Self {
        let cycle_time_ns = axis.ramp().params().tick_interval_us() as i64 * 1000;
        Self {
            axis,
            stats: CycleStats::new(),
            running: Arc::new(AtomicBool::new(true)),
            cycle_time_ns,
            ticks: 0,
        }
    }

    /// Clear this flag (e.g. from a signal handler) to stop the loop.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn axis(&self) -> &AngularAxis<O> {
        &self.axis
    }

    pub fn into_axis(self) -> AngularAxis<O> {
        self.axis
    }

    /// Tick until `max_ticks` ticks have run or the running flag is cleared.
    ///
    /// # Errors
    /// With the `rt` feature, returns `CycleError::CycleOverrun` on the
    /// first tick that exceeds its interval.
    pub fn run(&mut self, max_ticks: u64) -> Result<(), CycleError> {
        info!(
            max_ticks,
            cycle_time_ns = self.cycle_time_ns,
            "entering tick loop"
        );

        #[cfg(feature = "rt")]
        let result = self.run_rt_loop(max_ticks);

        #[cfg(not(feature = "rt"))]
        let result = self.run_sim_loop(max_ticks);

        info!(
            ticks = self.ticks,
            overruns = self.stats.overruns,
            avg_cycle_ns = self.stats.avg_cycle_ns(),
            max_cycle_ns = self.stats.max_cycle_ns,
            max_latency_ns = self.stats.max_latency_ns,
            "tick loop finished"
        );
        result
    }

    fn keep_running(&self, max_ticks: u64) -> bool {
        self.ticks < max_ticks && self.running.load(Ordering::Relaxed)
    }

    /// RT loop using `clock_nanosleep(TIMER_ABSTIME)`.
    #[cfg(feature = "rt")]
    fn run_rt_loop(&mut self, max_ticks: u64) -> Result<(), CycleError> {
        use nix::time::{ClockId, ClockNanosleepFlags, clock_gettime, clock_nanosleep};

        let clock = ClockId::CLOCK_MONOTONIC;
        let now = || {
            clock_gettime(clock).map_err(|e| CycleError::RtSetup(format!("clock_gettime: {e}")))
        };
        let mut next_wake = now()?;

        while self.keep_running(max_ticks) {
            let cycle_start = now()?;
            let wake_latency_ns = timespec_diff_ns(&cycle_start, &next_wake).abs();

            self.axis.tick();
            self.ticks += 1;

            let duration_ns = timespec_diff_ns(&now()?, &cycle_start);
            self.stats.record(duration_ns, wake_latency_ns);

            if duration_ns > self.cycle_time_ns {
                self.stats.overruns += 1;
                warn!(tick = self.ticks, duration_ns, "tick overran its interval");
                return Err(CycleError::CycleOverrun {
                    actual_ns: duration_ns,
                    budget_ns: self.cycle_time_ns,
                });
            }

            next_wake = timespec_add_ns(next_wake, self.cycle_time_ns);
            let _ = clock_nanosleep(clock, ClockNanosleepFlags::TIMER_ABSTIME, &next_wake);
        }
        Ok(())
    }

    /// Host loop using `std::thread::sleep`.
    #[cfg(not(feature = "rt"))]
    fn run_sim_loop(&mut self, max_ticks: u64) -> Result<(), CycleError> {
        use std::time::{Duration, Instant};

        let cycle_duration = Duration::from_nanos(self.cycle_time_ns as u64);

        while self.keep_running(max_ticks) {
            let cycle_start = Instant::now();

            self.axis.tick();
            self.ticks += 1;

            let elapsed = cycle_start.elapsed();
            let duration_ns = elapsed.as_nanos() as i64;
            self.stats.record(duration_ns, 0);

            if duration_ns > self.cycle_time_ns {
                self.stats.overruns += 1;
                if self.stats.overruns == 1 {
                    warn!(
                        tick = self.ticks,
                        duration_ns,
                        budget_ns = self.cycle_time_ns,
                        "tick overran its interval"
                    );
                }
            }

            if let Some(remaining) = cycle_duration.checked_sub(elapsed) {
                std::thread::sleep(remaining);
            }
        }
        Ok(())
    }
}

// ─── Time Helpers ───────────────────────────────────────────────────

#[cfg(feature = "rt")]
fn timespec_add_ns(ts: nix::sys::time::TimeSpec, ns: i64) -> nix::sys::time::TimeSpec {
    use nix::sys::time::TimeSpec;
    let mut secs = ts.tv_sec();
    let mut nanos = ts.tv_nsec() + ns;
    while nanos >= 1_000_000_000 {
        secs += 1;
        nanos -= 1_000_000_000;
    }
    TimeSpec::new(secs, nanos)
}

/// `a - b` in nanoseconds.
#[cfg(feature = "rt")]
fn timespec_diff_ns(a: &nix::sys::time::TimeSpec, b: &nix::sys::time::TimeSpec) -> i64 {
    (a.tv_sec() - b.tv_sec()) * 1_000_000_000 + (a.tv_nsec() - b.tv_nsec())
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use stepramp_axis::{NullOutput, PulseRecorder, RampParams, VelocityRamp};

    fn axis<O: StepOutput>(output: O) -> AngularAxis<O> {
        AngularAxis::new(VelocityRamp::new(RampParams::REFERENCE, output), 1.0)
    }

    #[test]
    fn cycle_stats_basic() {
        let mut stats = CycleStats::new();
        assert_eq!(stats.avg_cycle_ns(), 0);

        stats.record(50_000, 1_000);
        stats.record(70_000, 500);
        assert_eq!(stats.cycle_count, 2);
        assert_eq!(stats.last_cycle_ns, 70_000);
        assert_eq!(stats.min_cycle_ns, 50_000);
        assert_eq!(stats.max_cycle_ns, 70_000);
        assert_eq!(stats.max_latency_ns, 1_000);
        assert_eq!(stats.avg_cycle_ns(), 60_000);
    }

    #[test]
    fn rt_setup_without_rt_feature_is_noop() {
        #[cfg(not(feature = "rt"))]
        assert!(rt_setup(0, 80).is_ok());
    }

    #[test]
    fn cycle_error_display() {
        let err = CycleError::CycleOverrun {
            actual_ns: 150_000,
            budget_ns: 100_000,
        };
        let msg = err.to_string();
        assert!(msg.contains("150000"));
        assert!(msg.contains("100000"));
    }

    #[test]
    fn runs_requested_ticks_in_real_time() {
        let mut ramp = axis(PulseRecorder::new());
        ramp.ramp_mut().set_acceleration(10_000_000);
        ramp.ramp_mut().set_target_speed(2_000_000);
        let mut runner = CycleRunner::new(ramp);

        let start = std::time::Instant::now();
        runner.run(50).unwrap();
        // 50 × 100 µs, minus slack for the first tick.
        assert!(start.elapsed() >= std::time::Duration::from_micros(4_900));
        assert_eq!(runner.ticks(), 50);
        assert_eq!(runner.stats().cycle_count, 50);
        assert_eq!(runner.axis().ramp().speed(), 2_000_000);
    }

    #[test]
    fn cleared_flag_stops_before_first_tick() {
        let mut runner = CycleRunner::new(axis(NullOutput));
        runner.running_flag().store(false, Ordering::SeqCst);
        runner.run(1_000).unwrap();
        assert_eq!(runner.ticks(), 0);
    }
}
