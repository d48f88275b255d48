//! Remaining-time rendering for countdown displays.

use chrono::Duration;

/// Render a remaining duration as `Nd Nh Nm Ns`, or `ended` once the
/// duration is zero or negative.
pub fn format_remaining(remaining: Duration) -> String {
    let secs = remaining.num_seconds();
    if secs <= 0 {
        return "ended".to_string();
    }
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let minutes = (secs % 3_600) / 60;
    let seconds = secs % 60;
    format!("{days}d {hours}h {minutes}m {seconds}s")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_each_unit() {
        assert_eq!(format_remaining(Duration::seconds(3661)), "0d 1h 1m 1s");
        assert_eq!(
            format_remaining(Duration::days(2) + Duration::seconds(59)),
            "2d 0h 0m 59s"
        );
    }

    #[test]
    fn zero_and_negative_render_as_ended() {
        assert_eq!(format_remaining(Duration::zero()), "ended");
        assert_eq!(format_remaining(Duration::seconds(-1)), "ended");
    }
}
