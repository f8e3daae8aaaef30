//! Presentation-facing helpers.
//!
//! Everything here is a pure function of a [`TelemetrySnapshot`]; a UI layer
//! only has to place the strings and plot the series.

use serde::{Deserialize, Serialize};

use crate::error::{TelemetryError, TelemetryResult};
use crate::format::{
    compass_label, format_degrees_minutes_seconds, latitude_hemisphere, longitude_hemisphere,
};
use crate::history::{WindowLength, STANDARD_GRAVITY};
use crate::tracker::TelemetrySnapshot;
use crate::units::{max_gauge_value, SpeedUnit, GAUGE_SCALE_COUNT};

/// Which series the chart shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChartMode {
    #[default]
    Speed,
    Acceleration,
}

/// Where the acceleration chart takes its values from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AccelerationSource {
    /// Speed change between location fixes
    #[default]
    Location,
    /// Device-motion user acceleration
    Motion,
}

/// Settings written by the user interface
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DisplaySettings {
    pub unit: SpeedUnit,
    pub speedometer_scale: usize,
    pub window_length: WindowLength,
    pub chart_mode: ChartMode,
    pub acceleration_source: AccelerationSource,
}

impl DisplaySettings {
    /// Build settings from raw picker values, rejecting out-of-range input
    pub fn new(unit_index: usize, speedometer_scale: usize, window_ticks: u32) -> TelemetryResult<Self> {
        Ok(DisplaySettings {
            unit: SpeedUnit::from_index(unit_index)?,
            speedometer_scale: validate_scale(speedometer_scale)?,
            window_length: WindowLength::new(window_ticks)?,
            chart_mode: ChartMode::default(),
            acceleration_source: AccelerationSource::default(),
        })
    }
}

pub(crate) fn validate_scale(scale: usize) -> TelemetryResult<usize> {
    if scale < GAUGE_SCALE_COUNT {
        Ok(scale)
    } else {
        Err(TelemetryError::InvalidParameters(format!(
            "speedometer scale {} out of range 0..={}",
            scale,
            GAUGE_SCALE_COUNT - 1
        )))
    }
}

/// Gauge position and range in the display unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GaugeReading {
    pub value: f64,
    pub max: u32,
}

impl GaugeReading {
    /// Filled fraction of the gauge arc, 0..=1
    pub fn fraction(&self) -> f64 {
        if self.max == 0 {
            return 0.0;
        }
        (self.value / self.max as f64).clamp(0.0, 1.0)
    }
}

pub fn gauge(snapshot: &TelemetrySnapshot) -> GaugeReading {
    let unit = snapshot.settings.unit;
    let max = max_gauge_value(unit, snapshot.settings.speedometer_scale);
    let value = unit.convert(snapshot.state.charted_speed()).min(max as f64);
    GaugeReading { value, max }
}

/// Large speed number; invalid speed shows as 0.0
pub fn speed_readout(snapshot: &TelemetrySnapshot) -> String {
    let unit = snapshot.settings.unit;
    format!("{:.1}", unit.convert(snapshot.state.charted_speed()))
}

/// Heading with one decimal and its compass label, e.g. `91.2º E`
pub fn heading_readout(snapshot: &TelemetrySnapshot) -> String {
    let heading = snapshot.state.heading;
    format!("{:.1}º {}", heading, compass_label(heading))
}

/// Latitude and longitude in sexagesimal form with hemisphere letters
pub fn coordinate_readout(snapshot: &TelemetrySnapshot) -> (String, String) {
    let lat = snapshot.state.latitude;
    let lon = snapshot.state.longitude;
    (
        format!("{} {}", format_degrees_minutes_seconds(lat), latitude_hemisphere(lat)),
        format!("{} {}", format_degrees_minutes_seconds(lon), longitude_hemisphere(lon)),
    )
}

/// Speed change between fixes and the motion-sensor acceleration,
/// e.g. `-1.25 (3.4) km/h·s`.
pub fn acceleration_readout(snapshot: &TelemetrySnapshot) -> String {
    let unit = snapshot.settings.unit;
    let state = &snapshot.state;
    let sign = if state.delta_speed < 0.0 { "-" } else { " " };
    let delta = if state.has_valid_speed() {
        unit.convert(state.delta_speed).abs()
    } else {
        0.0
    };
    let motion = unit.convert(state.acceleration * STANDARD_GRAVITY);
    format!("{}{:.2} ({:.1}) {}·s", sign, delta, motion, unit.label())
}

pub fn horizontal_accuracy_readout(snapshot: &TelemetrySnapshot) -> String {
    let accuracy = snapshot.state.horizontal_accuracy;
    if accuracy < 0.0 {
        "Location unavailable".to_string()
    } else {
        format!("Location: ±{:.2} m", accuracy)
    }
}

/// Gated on the heading's own accuracy, not the location fix's.
pub fn heading_accuracy_readout(snapshot: &TelemetrySnapshot) -> String {
    let accuracy = snapshot.state.heading_accuracy;
    if accuracy < 0.0 {
        "Azimuth unavailable".to_string()
    } else {
        format!("Azimuth: ±{:.2}º", accuracy)
    }
}

pub fn speed_accuracy_readout(snapshot: &TelemetrySnapshot) -> String {
    let unit = snapshot.settings.unit;
    let accuracy = snapshot.state.speed_accuracy;
    if accuracy < 0.0 {
        "Speed unavailable".to_string()
    } else {
        format!("Speed: ±{:.2} {}", unit.convert(accuracy), unit.label())
    }
}

/// Chart window caption, e.g. `12s`
pub fn window_label(window: WindowLength) -> String {
    format!("{}s", window.seconds())
}

/// Authorization problem to show, if any
pub fn status_line(snapshot: &TelemetrySnapshot) -> Option<&str> {
    snapshot.state.status_message.as_deref()
}

/// Series selected by the chart settings, converted to the display unit
pub fn chart_series(snapshot: &TelemetrySnapshot) -> Vec<f64> {
    let unit = snapshot.settings.unit;
    let history = &snapshot.history;
    let source = match (snapshot.settings.chart_mode, snapshot.settings.acceleration_source) {
        (ChartMode::Speed, _) => &history.speed,
        (ChartMode::Acceleration, AccelerationSource::Location) => &history.location_acceleration,
        (ChartMode::Acceleration, AccelerationSource::Motion) => &history.motion_acceleration,
    };
    source.iter().map(|v| unit.convert(*v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::HistorySnapshot;
    use crate::telemetry::TelemetryState;
    use crate::tracker::SampleCounters;

    fn snapshot_with(state: TelemetryState, settings: DisplaySettings) -> TelemetrySnapshot {
        TelemetrySnapshot {
            state,
            settings,
            history: HistorySnapshot {
                speed: vec![1.0, 2.0],
                location_acceleration: vec![1.0, 1.0],
                motion_acceleration: vec![0.5, 0.25],
            },
            counters: SampleCounters::default(),
        }
    }

    #[test]
    fn test_settings_validation() {
        let settings = DisplaySettings::new(2, 3, 3000).unwrap();
        assert_eq!(settings.unit, SpeedUnit::MilesPerHour);
        assert_eq!(settings.speedometer_scale, 3);

        assert!(DisplaySettings::new(3, 0, 300).is_err());
        assert!(DisplaySettings::new(0, 4, 300).is_err());
        assert!(DisplaySettings::new(0, 0, 250).is_err());
    }

    #[test]
    fn test_unavailable_accuracy_readouts() {
        let mut state = TelemetryState::new();
        state.horizontal_accuracy = -1.0;
        state.speed_accuracy = -1.0;
        state.heading_accuracy = -1.0;
        let snapshot = snapshot_with(state, DisplaySettings::default());

        assert_eq!(horizontal_accuracy_readout(&snapshot), "Location unavailable");
        assert_eq!(speed_accuracy_readout(&snapshot), "Speed unavailable");
        assert_eq!(heading_accuracy_readout(&snapshot), "Azimuth unavailable");
    }

    #[test]
    fn test_available_accuracy_readouts() {
        let mut state = TelemetryState::new();
        state.horizontal_accuracy = 4.5;
        state.speed_accuracy = 1.0;
        state.heading_accuracy = 10.0;
        let snapshot = snapshot_with(state, DisplaySettings::default());

        assert_eq!(horizontal_accuracy_readout(&snapshot), "Location: ±4.50 m");
        assert_eq!(speed_accuracy_readout(&snapshot), "Speed: ±3.60 km/h");
        assert_eq!(heading_accuracy_readout(&snapshot), "Azimuth: ±10.00º");
    }

    #[test]
    fn test_speed_and_gauge() {
        let mut state = TelemetryState::new();
        state.speed = 10.0;
        let snapshot = snapshot_with(state.clone(), DisplaySettings::default());
        assert_eq!(speed_readout(&snapshot), "36.0");
        let reading = gauge(&snapshot);
        assert_eq!(reading.max, 50);
        assert!((reading.fraction() - 0.72).abs() < 1e-9);

        state.speed = -1.0;
        let snapshot = snapshot_with(state, DisplaySettings::default());
        assert_eq!(speed_readout(&snapshot), "0.0");
        assert_eq!(gauge(&snapshot).value, 0.0);
    }

    #[test]
    fn test_heading_and_coordinates() {
        let mut state = TelemetryState::new();
        state.heading = 91.24;
        state.latitude = 37.7749;
        state.longitude = -122.4194;
        let snapshot = snapshot_with(state, DisplaySettings::default());

        assert_eq!(heading_readout(&snapshot), "91.2º E");
        let (lat, lon) = coordinate_readout(&snapshot);
        assert_eq!(lat, "37º46'29\" N");
        assert!(lon.ends_with(" W"));
    }

    #[test]
    fn test_acceleration_readout() {
        let mut state = TelemetryState::new();
        state.speed = 3.0;
        state.delta_speed = -2.0;
        state.acceleration = 0.5;
        let settings = DisplaySettings {
            unit: SpeedUnit::MetersPerSecond,
            ..DisplaySettings::default()
        };
        let snapshot = snapshot_with(state, settings);

        assert_eq!(acceleration_readout(&snapshot), "-2.00 (4.9) m/s·s");
    }

    #[test]
    fn test_chart_series_selection() {
        let mut settings = DisplaySettings::default();
        let snapshot = snapshot_with(TelemetryState::new(), settings);
        assert_eq!(chart_series(&snapshot), vec![3.6, 7.2]);

        settings.unit = SpeedUnit::MetersPerSecond;
        settings.chart_mode = ChartMode::Acceleration;
        settings.acceleration_source = AccelerationSource::Motion;
        let snapshot = snapshot_with(TelemetryState::new(), settings);
        assert_eq!(chart_series(&snapshot), vec![0.5, 0.25]);

        settings.acceleration_source = AccelerationSource::Location;
        let snapshot = snapshot_with(TelemetryState::new(), settings);
        assert_eq!(chart_series(&snapshot), vec![1.0, 1.0]);
    }

    #[test]
    fn test_window_label() {
        assert_eq!(window_label(WindowLength::new(1200).unwrap()), "12s");
        assert_eq!(window_label(WindowLength::default()), "3s");
    }
}
