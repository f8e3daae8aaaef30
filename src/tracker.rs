use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::display::{validate_scale, AccelerationSource, ChartMode, DisplaySettings};
use crate::error::{lock_poisoned, TelemetryResult};
use crate::history::{History, HistorySnapshot, WindowLength};
use crate::samples::{AuthorizationStatus, HeadingSample, LocationSample, MotionSample, SensorEvent};
use crate::telemetry::TelemetryState;
use crate::units::SpeedUnit;

/// Running totals of adapter notifications
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleCounters {
    pub location_updates: u64,
    pub heading_updates: u64,
    pub motion_ticks: u64,
    pub skipped_motion_ticks: u64,
}

/// Consistent copy of everything the display needs, taken under one lock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub state: TelemetryState,
    pub settings: DisplaySettings,
    pub history: HistorySnapshot,
    pub counters: SampleCounters,
}

struct TrackerInner {
    state: TelemetryState,
    history: History,
    settings: DisplaySettings,
    counters: SampleCounters,
}

/// Shared owner of telemetry state, history and display settings.
///
/// Clones share the same state; every mutation from either adapter stream
/// goes through one mutex so the three history buffers stay in lockstep.
#[derive(Clone)]
pub struct Tracker {
    inner: Arc<Mutex<TrackerInner>>,
}

impl Tracker {
    pub fn new(settings: DisplaySettings) -> Self {
        let inner = TrackerInner {
            state: TelemetryState::new(),
            history: History::with_window(settings.window_length),
            settings,
            counters: SampleCounters::default(),
        };
        Tracker {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    fn lock(&self) -> TelemetryResult<MutexGuard<'_, TrackerInner>> {
        self.inner.lock().map_err(|_| lock_poisoned("telemetry"))
    }

    /// Route one adapter notification.
    ///
    /// Returns true only for an authorization change that should start
    /// location and heading updates.
    pub fn handle_event(&self, event: &SensorEvent) -> TelemetryResult<bool> {
        match event {
            SensorEvent::Authorization(status) => self.apply_authorization(*status),
            SensorEvent::Location(sample) => self.apply_location_update(sample).map(|_| false),
            SensorEvent::Heading(sample) => self.apply_heading_update(sample).map(|_| false),
            SensorEvent::Motion(sample) => self.on_motion_sample(sample.as_ref()).map(|_| false),
        }
    }

    pub fn apply_authorization(&self, status: AuthorizationStatus) -> TelemetryResult<bool> {
        let mut inner = self.lock()?;
        let start_updates = inner.state.apply_authorization(status);
        match inner.state.status_message.as_deref() {
            Some(message) => log::warn!("{}", message),
            None => log::info!("location authorized ({:?})", status),
        }
        Ok(start_updates)
    }

    pub fn apply_location_update(&self, sample: &LocationSample) -> TelemetryResult<()> {
        let mut inner = self.lock()?;
        inner.state.apply_location_update(sample);
        inner.counters.location_updates += 1;
        Ok(())
    }

    pub fn apply_heading_update(&self, sample: &HeadingSample) -> TelemetryResult<()> {
        let mut inner = self.lock()?;
        inner.state.apply_heading_update(sample);
        inner.counters.heading_updates += 1;
        Ok(())
    }

    /// Feed one motion tick into the history. Returns whether a row was appended.
    pub fn on_motion_sample(&self, sample: Option<&MotionSample>) -> TelemetryResult<bool> {
        let mut inner = self.lock()?;
        let TrackerInner {
            state,
            history,
            counters,
            ..
        } = &mut *inner;

        counters.motion_ticks += 1;
        let appended = history.on_motion_sample(state, sample);
        if !appended {
            counters.skipped_motion_ticks += 1;
        }
        Ok(appended)
    }

    pub fn settings(&self) -> TelemetryResult<DisplaySettings> {
        Ok(self.lock()?.settings)
    }

    pub fn set_unit(&self, unit: SpeedUnit) -> TelemetryResult<()> {
        self.lock()?.settings.unit = unit;
        log::debug!("display unit set to {}", unit.label());
        Ok(())
    }

    /// Advance to the next display unit and return it
    pub fn cycle_unit(&self) -> TelemetryResult<SpeedUnit> {
        let mut inner = self.lock()?;
        let unit = inner.settings.unit.next();
        inner.settings.unit = unit;
        log::debug!("display unit cycled to {}", unit.label());
        Ok(unit)
    }

    pub fn set_speedometer_scale(&self, scale: usize) -> TelemetryResult<()> {
        let scale = validate_scale(scale)?;
        self.lock()?.settings.speedometer_scale = scale;
        log::debug!("speedometer scale set to {}", scale);
        Ok(())
    }

    /// Change the chart window; a shorter window evicts the excess at once
    pub fn set_window_length(&self, window: WindowLength) -> TelemetryResult<()> {
        let mut inner = self.lock()?;
        inner.settings.window_length = window;
        inner.history.set_capacity(window.capacity());
        log::debug!("chart window set to {} ticks", window.ticks());
        Ok(())
    }

    pub fn set_chart_mode(&self, mode: ChartMode) -> TelemetryResult<()> {
        self.lock()?.settings.chart_mode = mode;
        Ok(())
    }

    pub fn set_acceleration_source(&self, source: AccelerationSource) -> TelemetryResult<()> {
        self.lock()?.settings.acceleration_source = source;
        Ok(())
    }

    pub fn counters(&self) -> TelemetryResult<SampleCounters> {
        Ok(self.lock()?.counters)
    }

    pub fn snapshot(&self) -> TelemetryResult<TelemetrySnapshot> {
        let inner = self.lock()?;
        Ok(TelemetrySnapshot {
            state: inner.state.clone(),
            settings: inner.settings,
            history: inner.history.snapshot(),
            counters: inner.counters,
        })
    }
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new(DisplaySettings::default())
    }
}
