//! Step/direction output capability.
//!
//! The ramp never touches hardware directly. It drives a [`StepOutput`],
//! which is called from the tick context and therefore must not block,
//! allocate or fail. Implementations that can fail (GPIO expanders, etc.)
//! record the failure and carry on.

use embedded_hal::digital::{OutputPin, PinState};

/// Rotation direction of a pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    /// Also used when speed is exactly zero.
    #[default]
    Reverse,
}

impl Direction {
    /// Direction for a pulse emitted at `speed`: forward only when strictly positive.
    #[inline]
    pub const fn from_speed(speed: i32) -> Self {
        if speed > 0 { Self::Forward } else { Self::Reverse }
    }

    /// Position change of one pulse in this direction.
    #[inline]
    pub const fn increment(self) -> i32 {
        match self {
            Self::Forward => 1,
            Self::Reverse => -1,
        }
    }
}

/// Output actions consumed by the step/direction driver.
pub trait StepOutput {
    /// Drive the step line. A pulse is `set_step(true)` followed by `set_step(false)`.
    fn set_step(&mut self, high: bool);

    /// Drive the direction line. Called between the rising and falling edge of each pulse.
    fn set_direction(&mut self, direction: Direction);
}

impl<T: StepOutput + ?Sized> StepOutput for &mut T {
    #[inline]
    fn set_step(&mut self, high: bool) {
        (**self).set_step(high);
    }

    #[inline]
    fn set_direction(&mut self, direction: Direction) {
        (**self).set_direction(direction);
    }
}

/// Discards every signal. Useful for dry runs and benchmarks.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullOutput;

impl StepOutput for NullOutput {
    #[inline]
    fn set_step(&mut self, _high: bool) {}

    #[inline]
    fn set_direction(&mut self, _direction: Direction) {}
}

/// STEP/DIR driver on two `embedded-hal` output pins.
///
/// Pin errors cannot be propagated out of the tick; they are counted in
/// [`PinOutput::faults`] for the non-RT side to inspect.
#[derive(Debug)]
pub struct PinOutput<S, D> {
    step: S,
    dir: D,
    invert_direction: bool,
    faults: u32,
}

impl<S: OutputPin, D: OutputPin> PinOutput<S, D> {
    pub fn new(step: S, dir: D) -> Self {
        Self {
            step,
            dir,
            invert_direction: false,
            faults: 0,
        }
    }

    /// Swap the DIR level for motors wired in reverse.
    pub fn inverted(mut self, invert: bool) -> Self {
        self.invert_direction = invert;
        self
    }

    /// Number of pin writes that returned an error.
    pub fn faults(&self) -> u32 {
        self.faults
    }

    pub fn release(self) -> (S, D) {
        (self.step, self.dir)
    }
}

impl<S: OutputPin, D: OutputPin> StepOutput for PinOutput<S, D> {
    #[inline]
    fn set_step(&mut self, high: bool) {
        if self.step.set_state(PinState::from(high)).is_err() {
            self.faults = self.faults.wrapping_add(1);
        }
    }

    #[inline]
    fn set_direction(&mut self, direction: Direction) {
        let level = (direction == Direction::Forward) != self.invert_direction;
        if self.dir.set_state(PinState::from(level)).is_err() {
            self.faults = self.faults.wrapping_add(1);
        }
    }
}
