//! Rolling telemetry history fed by motion-sensor ticks.
//!
//! Every tick appends one value to each of three buffers (speed,
//! location-derived acceleration, motion-derived acceleration) and then
//! evicts the oldest entries from all three together, so the buffers always
//! have the same length and never hold more than the window allows.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::error::{TelemetryError, TelemetryResult};
use crate::samples::MotionSample;
use crate::telemetry::TelemetryState;

/// Standard gravity used to scale user acceleration from g to m/s²
pub const STANDARD_GRAVITY: f64 = 9.8;

/// Motion ticks per second of chart history
pub const TICKS_PER_SECOND: u32 = 100;

/// User-selectable chart window, counted in motion ticks.
///
/// Valid values are 300..=3000 in steps of 100 (3 s to 30 s of history).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct WindowLength(u32);

impl WindowLength {
    pub const MIN: u32 = 300;
    pub const MAX: u32 = 3000;
    pub const STEP: u32 = 100;

    pub fn new(ticks: u32) -> TelemetryResult<Self> {
        if !(Self::MIN..=Self::MAX).contains(&ticks) || ticks % Self::STEP != 0 {
            return Err(TelemetryError::InvalidParameters(format!(
                "window length {} must be within {}..={} in steps of {}",
                ticks,
                Self::MIN,
                Self::MAX,
                Self::STEP
            )));
        }
        Ok(WindowLength(ticks))
    }

    /// Window from a whole number of seconds (3..=30)
    pub fn from_seconds(seconds: u32) -> TelemetryResult<Self> {
        Self::new(seconds.saturating_mul(TICKS_PER_SECOND))
    }

    pub fn ticks(&self) -> u32 {
        self.0
    }

    pub fn seconds(&self) -> u32 {
        self.0 / TICKS_PER_SECOND
    }

    pub fn capacity(&self) -> usize {
        self.0 as usize
    }
}

impl Default for WindowLength {
    fn default() -> Self {
        WindowLength(Self::MIN)
    }
}

impl TryFrom<u32> for WindowLength {
    type Error = TelemetryError;

    fn try_from(ticks: u32) -> Result<Self, Self::Error> {
        WindowLength::new(ticks)
    }
}

impl From<WindowLength> for u32 {
    fn from(window: WindowLength) -> u32 {
        window.0
    }
}

/// Change in speed between two valid readings.
///
/// Exactly zero whenever the new reading is exactly zero: once it becomes
/// the reference speed both values are zero, and a stopped receiver must
/// not keep reporting its last deceleration.
pub fn compute_delta_speed(previous_speed: f64, current_speed: f64) -> f64 {
    if current_speed == 0.0 {
        0.0
    } else {
        current_speed - previous_speed
    }
}

/// Copy of the three history buffers taken at one instant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    pub speed: Vec<f64>,
    pub location_acceleration: Vec<f64>,
    pub motion_acceleration: Vec<f64>,
}

impl HistorySnapshot {
    pub fn len(&self) -> usize {
        self.speed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.speed.is_empty()
    }
}

/// Three lockstep FIFO buffers bounded by a shared capacity
#[derive(Debug, Clone)]
pub struct History {
    speed: VecDeque<f64>,
    location_acceleration: VecDeque<f64>,
    motion_acceleration: VecDeque<f64>,
    capacity: usize,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        History {
            speed: VecDeque::with_capacity(capacity + 1),
            location_acceleration: VecDeque::with_capacity(capacity + 1),
            motion_acceleration: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn with_window(window: WindowLength) -> Self {
        Self::new(window.capacity())
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the bound. Excess entries are evicted right away.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.trim();
    }

    pub fn len(&self) -> usize {
        self.speed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.speed.is_empty()
    }

    pub fn speed(&self) -> &VecDeque<f64> {
        &self.speed
    }

    pub fn location_acceleration(&self) -> &VecDeque<f64> {
        &self.location_acceleration
    }

    pub fn motion_acceleration(&self) -> &VecDeque<f64> {
        &self.motion_acceleration
    }

    /// Process one motion tick against `state`.
    ///
    /// A tick without a sample changes nothing. Returns whether a row was
    /// appended.
    pub fn on_motion_sample(
        &mut self,
        state: &mut TelemetryState,
        sample: Option<&MotionSample>,
    ) -> bool {
        let Some(sample) = sample else {
            log::trace!("motion tick without data, skipped");
            return false;
        };

        state.acceleration = sample.magnitude();

        if state.speed != state.last_speed && state.speed >= 0.0 {
            state.delta_speed = compute_delta_speed(state.last_speed, state.speed);
            state.last_speed = state.speed;
        }

        self.push(
            state.charted_speed(),
            state.delta_speed,
            state.acceleration * STANDARD_GRAVITY,
        );
        true
    }

    fn push(&mut self, speed: f64, location_acceleration: f64, motion_acceleration: f64) {
        self.speed.push_back(speed);
        self.location_acceleration.push_back(location_acceleration);
        self.motion_acceleration.push_back(motion_acceleration);
        self.trim();
    }

    fn trim(&mut self) {
        while self.speed.len() > self.capacity {
            self.speed.pop_front();
            self.location_acceleration.pop_front();
            self.motion_acceleration.pop_front();
        }
    }

    pub fn snapshot(&self) -> HistorySnapshot {
        HistorySnapshot {
            speed: self.speed.iter().copied().collect(),
            location_acceleration: self.location_acceleration.iter().copied().collect(),
            motion_acceleration: self.motion_acceleration.iter().copied().collect(),
        }
    }
}

impl Default for History {
    fn default() -> Self {
        Self::with_window(WindowLength::default())
    }
}
