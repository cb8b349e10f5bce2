//! System-wide constants for the stepramp workspace.
//!
//! Single source of truth for the fixed-point scaling of speed values and
//! for the bounds every configured axis must respect. The bounds are chosen
//! so that the integer arithmetic of the tick path cannot overflow:
//! state lives in `i32`/`u32`, intermediates in `i64`/`u64`.

use static_assertions::const_assert;

/// Microseconds per second.
pub const US_PER_SECOND: u32 = 1_000_000;

/// Default maximum motor speed [microsteps/s].
pub const MAX_SPEED: i32 = 10_000;

/// Default ceiling on the time between two speed recomputations [µs].
pub const MAX_SPEED_INTERVAL_US: u32 = 1000;

/// Default fixed-point scale: speed is expressed in microsteps per
/// `SPEED_SCALE` seconds.
pub const SPEED_SCALE: u32 = 2000;

/// Default number of microsteps per physical step.
pub const MICROSTEPS: u16 = 16;

/// Default number of physical steps per revolution (1.8° motor).
pub const STEPS_PER_REVOLUTION: u16 = 200;

/// Default tick interval [µs] (10 kHz).
pub const TICK_INTERVAL_US: u32 = 100;

// ─── Parameter Bounds ───────────────────────────────────────────────

/// Minimum tick interval [µs].
pub const TICK_INTERVAL_US_MIN: u32 = 1;
/// Maximum tick interval [µs].
pub const TICK_INTERVAL_US_MAX: u32 = 1_000_000;

/// Minimum speed scale.
pub const SPEED_SCALE_MIN: u32 = 1;
/// Maximum speed scale. A speed of 1 yields the longest step period,
/// `US_PER_SECOND * SPEED_SCALE`; the step timer may run one tick past it,
/// and both must fit in a `u32`.
pub const SPEED_SCALE_MAX: u32 = (u32::MAX - TICK_INTERVAL_US_MAX) / US_PER_SECOND;

/// Minimum speed refresh ceiling [µs].
pub const MAX_SPEED_INTERVAL_US_MIN: u32 = 1;
/// Maximum speed refresh ceiling [µs].
pub const MAX_SPEED_INTERVAL_US_MAX: u32 = 1_000_000;

/// Upper bound on microsteps per step.
pub const MICROSTEPS_MAX: u16 = 256;

const_assert!(SPEED_SCALE >= SPEED_SCALE_MIN && SPEED_SCALE <= SPEED_SCALE_MAX);
const_assert!(MAX_SPEED as i64 * SPEED_SCALE as i64 <= i32::MAX as i64);
const_assert!(US_PER_SECOND as u64 * SPEED_SCALE as u64 <= u32::MAX as u64);
// At most one pulse per tick: the shortest step period is not below the tick.
const_assert!(MAX_SPEED as u64 * TICK_INTERVAL_US as u64 <= US_PER_SECOND as u64);
const_assert!(TICK_INTERVAL_US >= TICK_INTERVAL_US_MIN && TICK_INTERVAL_US <= TICK_INTERVAL_US_MAX);
const_assert!(MAX_SPEED_INTERVAL_US <= MAX_SPEED_INTERVAL_US_MAX);
// Worst-case speed delta: |i32::MIN| * (refresh ceiling + one tick) must fit in i64.
const_assert!(
    (i32::MAX as i64 + 1)
        <= i64::MAX / (MAX_SPEED_INTERVAL_US_MAX as i64 + TICK_INTERVAL_US_MAX as i64)
);
