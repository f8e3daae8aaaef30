use serde::{Deserialize, Serialize};

/// Location fix from the platform location provider.
///
/// Negative `speed`, `horizontal_accuracy` or `speed_accuracy` mean the
/// provider could not determine that value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    pub speed: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub horizontal_accuracy: f64,
    pub speed_accuracy: f64,
}

impl LocationSample {
    pub fn new(
        speed: f64,
        latitude: f64,
        longitude: f64,
        altitude: f64,
        horizontal_accuracy: f64,
        speed_accuracy: f64,
    ) -> Self {
        Self {
            speed,
            latitude,
            longitude,
            altitude,
            horizontal_accuracy,
            speed_accuracy,
        }
    }

    /// Fix with speed only, position at the origin and both accuracies valid
    pub fn with_speed(speed: f64) -> Self {
        Self::new(speed, 0.0, 0.0, 0.0, 5.0, 0.5)
    }
}

/// Compass heading update
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeadingSample {
    /// Degrees from true north, 0-360
    pub true_heading: f64,
    pub heading_accuracy: f64,
}

impl HeadingSample {
    pub fn new(true_heading: f64, heading_accuracy: f64) -> Self {
        Self {
            true_heading,
            heading_accuracy,
        }
    }
}

/// User acceleration (gravity removed) from the device-motion provider, in g
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl MotionSample {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// Location permission states reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthorizationStatus {
    NotDetermined,
    Restricted,
    Denied,
    AuthorizedAlways,
    AuthorizedWhenInUse,
    Unknown,
}

impl AuthorizationStatus {
    /// Only the two authorized states start location and heading updates
    pub fn is_authorized(&self) -> bool {
        matches!(
            self,
            AuthorizationStatus::AuthorizedAlways | AuthorizationStatus::AuthorizedWhenInUse
        )
    }

    /// User-visible status line, `None` when authorized
    pub fn status_message(&self) -> Option<&'static str> {
        match self {
            AuthorizationStatus::NotDetermined => Some("Location authorization not determined"),
            AuthorizationStatus::Restricted => Some("Location authorization restricted"),
            AuthorizationStatus::Denied => Some("Location authorization denied"),
            AuthorizationStatus::AuthorizedAlways | AuthorizationStatus::AuthorizedWhenInUse => {
                None
            }
            AuthorizationStatus::Unknown => Some("Unknown authorization status"),
        }
    }
}

/// One notification from either adapter stream.
///
/// `Motion(None)` is a motion tick that carried no data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "sample", rename_all = "snake_case")]
pub enum SensorEvent {
    Authorization(AuthorizationStatus),
    Location(LocationSample),
    Heading(HeadingSample),
    Motion(Option<MotionSample>),
}

/// Recorded event with its capture time in seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimedEvent {
    pub timestamp: f64,
    pub event: SensorEvent,
}
