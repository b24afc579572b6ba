//! Remaining-time formatting

/// Format seconds as `MM:SS` below an hour and `H:MM:SS` from an hour up.
/// Negative and fractional inputs are rounded and clamped to zero.
pub fn format_remaining(secs: f64) -> String {
    let total = rounded_secs(secs);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// Whole seconds for display, never negative
pub fn rounded_secs(secs: f64) -> u64 {
    if secs.is_finite() && secs > 0.0 {
        secs.round() as u64
    } else {
        0
    }
}
