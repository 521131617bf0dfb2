//! Display strings for distances and walking times.
//!
//! Inputs are the unrounded calculator outputs; this is the only place
//! rounding happens.

/// "350 m" below a kilometre, "1.2 km" from there on
pub fn format_distance(meters: f64) -> String {
    let rounded = meters.round();
    if rounded < 1000.0 {
        format!("{} m", rounded.max(0.0) as u64)
    } else {
        format!("{:.1} km", meters / 1000.0)
    }
}

/// "< 1 min", "14 min", "1 hr", "1 hr 5 min"
pub fn format_walking_time(minutes: f64) -> String {
    if !(minutes >= 1.0) {
        return "< 1 min".to_string();
    }

    let total = minutes.round() as u64;
    if total < 60 {
        return format!("{total} min");
    }

    match (total / 60, total % 60) {
        (hours, 0) => format!("{hours} hr"),
        (hours, rest) => format!("{hours} hr {rest} min"),
    }
}
