//! Instrumented [`StepOutput`] for simulation and tests.
//!
//! Counts completed pulses per direction and keeps a short, fixed-capacity
//! history of signal edges. No allocation, so it can sit behind a real
//! tick as well.

use heapless::Deque;

use crate::output::{Direction, StepOutput};

/// Number of edges kept in the history ring.
pub const EDGE_HISTORY: usize = 32;

/// One signal change seen by the recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    StepHigh,
    StepLow,
    Direction(Direction),
}

/// Pulse-counting output.
#[derive(Debug, Clone)]
pub struct PulseRecorder {
    step_high: bool,
    direction: Direction,
    forward: u64,
    reverse: u64,
    /// Rising edge while high or falling edge while low.
    malformed: u32,
    edges: Deque<Edge, EDGE_HISTORY>,
}

impl Default for PulseRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl PulseRecorder {
    pub fn new() -> Self {
        Self {
            step_high: false,
            direction: Direction::Reverse,
            forward: 0,
            reverse: 0,
            malformed: 0,
            edges: Deque::new(),
        }
    }

    /// Completed pulses (falling edges) in both directions.
    #[inline]
    pub fn pulses(&self) -> u64 {
        self.forward + self.reverse
    }

    #[inline]
    pub fn forward_pulses(&self) -> u64 {
        self.forward
    }

    #[inline]
    pub fn reverse_pulses(&self) -> u64 {
        self.reverse
    }

    /// Forward minus reverse pulses: the position a driver would have moved.
    #[inline]
    pub fn net_steps(&self) -> i64 {
        self.forward as i64 - self.reverse as i64
    }

    /// Current level of the direction line.
    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[inline]
    pub fn is_step_high(&self) -> bool {
        self.step_high
    }

    #[inline]
    pub fn malformed_edges(&self) -> u32 {
        self.malformed
    }

    /// Most recent edges, oldest first.
    pub fn recent_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    /// Forget counts and history; line levels are kept.
    pub fn clear(&mut self) {
        self.forward = 0;
        self.reverse = 0;
        self.malformed = 0;
        self.edges.clear();
    }

    fn push_edge(&mut self, edge: Edge) {
        if self.edges.is_full() {
            self.edges.pop_front();
        }
        // Cannot fail: one slot was freed above if needed.
        let _ = self.edges.push_back(edge);
    }
}

impl StepOutput for PulseRecorder {
    fn set_step(&mut self, high: bool) {
        match (self.step_high, high) {
            (false, true) => {
                self.push_edge(Edge::StepHigh);
            }
            (true, false) => {
                match self.direction {
                    Direction::Forward => self.forward += 1,
                    Direction::Reverse => self.reverse += 1,
                }
                self.push_edge(Edge::StepLow);
            }
            _ => self.malformed = self.malformed.wrapping_add(1),
        }
        self.step_high = high;
    }

    fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
        self.push_edge(Edge::Direction(direction));
    }
}
