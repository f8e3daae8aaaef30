//! Coordinate and heading text formatting.

/// Format an angle as degrees, minutes and seconds, e.g. `37º46'29"`.
///
/// The sign is dropped; render the hemisphere separately with
/// [`latitude_hemisphere`] / [`longitude_hemisphere`]. Seconds are
/// truncated, not rounded.
pub fn format_degrees_minutes_seconds(value: f64) -> String {
    let value = value.abs();
    let degree = value.floor();
    let minutes_total = value.fract() * 60.0;
    let minute = minutes_total.floor();
    let second = (minutes_total.fract() * 60.0).trunc();
    format!("{:.0}º{:.0}'{:.0}\"", degree, minute, second)
}

pub fn latitude_hemisphere(latitude: f64) -> &'static str {
    if latitude < 0.0 {
        "S"
    } else {
        "N"
    }
}

pub fn longitude_hemisphere(longitude: f64) -> &'static str {
    if longitude < 0.0 {
        "W"
    } else {
        "E"
    }
}

/// Sector boundaries and labels as shipped in the speedometer heading view.
///
/// The first sector reads "NW" where "N" belongs, and "N" only covers
/// 337.5..=360. Kept as observed until the intended labelling is confirmed.
const COMPASS_SECTORS: [(f64, f64, &str); 8] = [
    (0.0, 22.5, "NW"),
    (22.5, 67.5, "NE"),
    (67.5, 112.5, "E"),
    (112.5, 157.5, "SE"),
    (157.5, 202.5, "S"),
    (202.5, 247.5, "SW"),
    (247.5, 292.5, "W"),
    (292.5, 337.5, "NW"),
];

/// Eight-way compass label for a true heading in degrees.
///
/// Headings outside 0..=360 (and NaN) yield an empty label.
pub fn compass_label(heading: f64) -> &'static str {
    if let Some(&(_, _, label)) = COMPASS_SECTORS
        .iter()
        .find(|(lo, hi, _)| heading >= *lo && heading < *hi)
    {
        return label;
    }
    if (337.5..=360.0).contains(&heading) {
        "N"
    } else {
        ""
    }
}
