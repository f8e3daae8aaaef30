use serde::{Deserialize, Serialize};

use crate::samples::{AuthorizationStatus, HeadingSample, LocationSample};

/// Latest sensor readings plus the quantities derived from them.
///
/// Adapter values are stored as delivered; negative speed and accuracy
/// values mean "unavailable" and are interpreted by the display layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryState {
    pub speed: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub horizontal_accuracy: f64,
    pub speed_accuracy: f64,
    pub heading: f64,
    pub heading_accuracy: f64,
    /// Magnitude of the latest user acceleration, in g
    pub acceleration: f64,
    /// Last valid speed seen by the history manager
    pub last_speed: f64,
    /// Change between the two most recent distinct valid speeds, m/s
    pub delta_speed: f64,
    pub authorization: AuthorizationStatus,
    /// Human-readable authorization problem, if any
    pub status_message: Option<String>,
}

impl TelemetryState {
    pub fn new() -> Self {
        TelemetryState {
            speed: 0.0,
            latitude: 0.0,
            longitude: 0.0,
            altitude: 0.0,
            horizontal_accuracy: 0.0,
            speed_accuracy: 0.0,
            heading: 0.0,
            heading_accuracy: 0.0,
            acceleration: 0.0,
            last_speed: 0.0,
            delta_speed: 0.0,
            authorization: AuthorizationStatus::NotDetermined,
            status_message: None,
        }
    }

    pub fn apply_location_update(&mut self, sample: &LocationSample) {
        self.speed = sample.speed;
        self.latitude = sample.latitude;
        self.longitude = sample.longitude;
        self.altitude = sample.altitude;
        self.horizontal_accuracy = sample.horizontal_accuracy;
        self.speed_accuracy = sample.speed_accuracy;
    }

    pub fn apply_heading_update(&mut self, sample: &HeadingSample) {
        self.heading = sample.true_heading;
        self.heading_accuracy = sample.heading_accuracy;
    }

    /// Record an authorization transition.
    ///
    /// Returns true when location and heading updates should start.
    pub fn apply_authorization(&mut self, status: AuthorizationStatus) -> bool {
        self.authorization = status;
        self.status_message = status.status_message().map(str::to_string);
        status.is_authorized()
    }

    /// Speed as charted: invalid (negative) readings count as stationary
    pub fn charted_speed(&self) -> f64 {
        if self.speed >= 0.0 {
            self.speed
        } else {
            0.0
        }
    }

    pub fn has_valid_speed(&self) -> bool {
        self.speed >= 0.0
    }
}

impl Default for TelemetryState {
    fn default() -> Self {
        Self::new()
    }
}
