//! Short human-readable renderings of route metrics.

/// Render a distance: whole metres below one kilometre, otherwise
/// kilometres with one decimal.
///
/// # Examples
/// ```
/// use busline_core::format::format_distance;
///
/// assert_eq!(format_distance(850.4), "850 m");
/// assert_eq!(format_distance(4930.0), "4.9 km");
/// ```
#[must_use]
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{} m", meters.round())
    } else {
        format!("{:.1} km", meters / 1000.0)
    }
}

/// Render a duration rounded to whole minutes.
///
/// # Examples
/// ```
/// use busline_core::format::format_duration;
///
/// assert_eq!(format_duration(780.0), "13 min");
/// assert_eq!(format_duration(4500.0), "1 h 15 min");
/// ```
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    let minutes = (seconds / 60.0).round();
    if minutes < 60.0 {
        return format!("{minutes} min");
    }
    let hours = (minutes / 60.0).floor();
    let remaining = minutes - hours * 60.0;
    format!("{hours} h {remaining} min")
}
