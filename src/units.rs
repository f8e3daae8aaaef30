use serde::{Deserialize, Serialize};

use crate::error::{TelemetryError, TelemetryResult};

/// m/s to km/h
pub const KMH_PER_MPS: f64 = 3.6;

/// m/s to mph. Kept at this literal so displayed values stay reproducible.
pub const MPH_PER_MPS: f64 = 2.2369362921;

/// Gauge maxima per unit, indexed by speedometer scale
const GAUGE_MAXIMA: [[u32; 4]; 3] = [
    [50, 100, 150, 200], // km/h
    [15, 30, 40, 50],    // m/s
    [25, 50, 100, 150],  // mph
];

/// Number of selectable gauge scales
pub const GAUGE_SCALE_COUNT: usize = 4;

/// Display unit for speeds and speed-derived values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpeedUnit {
    #[default]
    KilometersPerHour,
    MetersPerSecond,
    MilesPerHour,
}

impl SpeedUnit {
    pub const ALL: [SpeedUnit; 3] = [
        SpeedUnit::KilometersPerHour,
        SpeedUnit::MetersPerSecond,
        SpeedUnit::MilesPerHour,
    ];

    /// Unit from its picker index (0 = km/h, 1 = m/s, 2 = mph)
    pub fn from_index(index: usize) -> TelemetryResult<Self> {
        Self::ALL.get(index).copied().ok_or_else(|| {
            TelemetryError::InvalidParameters(format!("speed unit index {} out of range", index))
        })
    }

    pub fn index(&self) -> usize {
        match self {
            SpeedUnit::KilometersPerHour => 0,
            SpeedUnit::MetersPerSecond => 1,
            SpeedUnit::MilesPerHour => 2,
        }
    }

    /// Next unit in tap order, wrapping back to km/h
    pub fn next(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn convert(&self, meters_per_second: f64) -> f64 {
        convert_speed(*self, meters_per_second)
    }

    pub fn label(&self) -> &'static str {
        unit_label(*self)
    }
}

/// Convert a speed in m/s into `unit`
pub fn convert_speed(unit: SpeedUnit, meters_per_second: f64) -> f64 {
    match unit {
        SpeedUnit::KilometersPerHour => meters_per_second * KMH_PER_MPS,
        SpeedUnit::MetersPerSecond => meters_per_second,
        SpeedUnit::MilesPerHour => meters_per_second * MPH_PER_MPS,
    }
}

pub fn unit_label(unit: SpeedUnit) -> &'static str {
    match unit {
        SpeedUnit::KilometersPerHour => "km/h",
        SpeedUnit::MetersPerSecond => "m/s",
        SpeedUnit::MilesPerHour => "mph",
    }
}

/// Upper bound of the gauge for `unit` at `scale_index`.
///
/// Indexes past the last scale resolve to the largest range.
pub fn max_gauge_value(unit: SpeedUnit, scale_index: usize) -> u32 {
    let row = &GAUGE_MAXIMA[unit.index()];
    row[scale_index.min(GAUGE_SCALE_COUNT - 1)]
}

/// All gauge maxima for `unit`, in scale order
pub fn gauge_scale_options(unit: SpeedUnit) -> [u32; GAUGE_SCALE_COUNT] {
    GAUGE_MAXIMA[unit.index()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_speed_multipliers() {
        for x in [0.0, 1.0, 13.4, -2.5, 1234.5678] {
            assert_eq!(convert_speed(SpeedUnit::KilometersPerHour, x), x * 3.6);
            assert_eq!(convert_speed(SpeedUnit::MetersPerSecond, x), x);
            assert_eq!(convert_speed(SpeedUnit::MilesPerHour, x), x * 2.2369362921);
        }
    }

    #[test]
    fn test_unit_labels() {
        assert_eq!(unit_label(SpeedUnit::KilometersPerHour), "km/h");
        assert_eq!(unit_label(SpeedUnit::MetersPerSecond), "m/s");
        assert_eq!(SpeedUnit::MilesPerHour.label(), "mph");
    }

    #[test]
    fn test_gauge_tables() {
        let kmh: Vec<u32> = (0..4)
            .map(|i| max_gauge_value(SpeedUnit::KilometersPerHour, i))
            .collect();
        let mps: Vec<u32> = (0..4)
            .map(|i| max_gauge_value(SpeedUnit::MetersPerSecond, i))
            .collect();
        let mph: Vec<u32> = (0..4)
            .map(|i| max_gauge_value(SpeedUnit::MilesPerHour, i))
            .collect();

        assert_eq!(kmh, vec![50, 100, 150, 200]);
        assert_eq!(mps, vec![15, 30, 40, 50]);
        assert_eq!(mph, vec![25, 50, 100, 150]);
        assert_eq!(max_gauge_value(SpeedUnit::MilesPerHour, 9), 150);
        assert_eq!(gauge_scale_options(SpeedUnit::MetersPerSecond), [15, 30, 40, 50]);
    }

    #[test]
    fn test_unit_index_round_trip_and_cycle() {
        for unit in SpeedUnit::ALL {
            assert_eq!(SpeedUnit::from_index(unit.index()).unwrap(), unit);
        }
        assert!(SpeedUnit::from_index(3).is_err());

        assert_eq!(SpeedUnit::KilometersPerHour.next(), SpeedUnit::MetersPerSecond);
        assert_eq!(SpeedUnit::MetersPerSecond.next(), SpeedUnit::MilesPerHour);
        assert_eq!(SpeedUnit::MilesPerHour.next(), SpeedUnit::KilometersPerHour);
    }
}
