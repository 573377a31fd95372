use std::time::Duration;

/// Formats a position in seconds as `minutes:seconds` with zero-padded
/// seconds. Anything that is not a finite non-negative number renders as
/// `0:00`, which is also what an unknown duration displays as.
pub(crate) fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_owned();
    }

    let total = seconds as u64;
    let minutes = total / 60;
    let seconds = total % 60;
    format!("{minutes}:{seconds:02}")
}

/// Percentage of the track completed, in `[0, 100]`. Zero while the duration
/// is unknown.
pub(crate) fn percent(position: Duration, duration: Option<Duration>) -> f64 {
    match duration {
        Some(duration) if duration > Duration::ZERO => {
            (position.as_secs_f64() / duration.as_secs_f64() * 100.0).clamp(0.0, 100.0)
        }
        _ => 0.0,
    }
}
