// Speedometer telemetry core
// Fuses location/heading and device-motion streams into bounded chart history

pub mod display;
pub mod error;
pub mod format;
pub mod history;
pub mod samples;
pub mod sensors;
pub mod telemetry;
pub mod tracker;
pub mod units;

pub use display::{AccelerationSource, ChartMode, DisplaySettings, GaugeReading};
pub use error::{TelemetryError, TelemetryResult};
pub use history::{compute_delta_speed, History, HistorySnapshot, WindowLength, STANDARD_GRAVITY};
pub use samples::{
    AuthorizationStatus, HeadingSample, LocationSample, MotionSample, SensorEvent, TimedEvent,
};
pub use telemetry::TelemetryState;
pub use tracker::{SampleCounters, TelemetrySnapshot, Tracker};
pub use units::{convert_speed, max_gauge_value, unit_label, SpeedUnit};
