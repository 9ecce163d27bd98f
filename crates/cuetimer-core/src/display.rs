//! Presentation helpers shared by every front end.

use crate::timer::TimerState;

/// Radius of the progress ring in a 100x100 view box.
pub const RING_RADIUS: f64 = 48.0;

/// Circumference of the progress ring.
pub fn ring_circumference() -> f64 {
    2.0 * std::f64::consts::PI * RING_RADIUS
}

/// `mm:ss` for `secs`. Minutes wrap at the hour like a clock face.
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", (secs / 60) % 60, secs % 60)
}

/// 0.0 .. 1.0 of the run completed.
pub fn progress(remaining: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (1.0 - remaining as f64 / total as f64).clamp(0.0, 1.0)
}

/// `(dash, gap)` lengths for a stroke-dasharray drawing `fraction` of the ring.
pub fn ring_dash(fraction: f64) -> (f64, f64) {
    let p = ring_circumference();
    (fraction.clamp(0.0, 1.0) * p, p)
}

/// Heading shown above the clock.
pub fn title(state: TimerState) -> &'static str {
    match state {
        TimerState::Started => "Greatness is within sight!!",
        TimerState::Paused => "Never quite, keep going!!",
        TimerState::Reset => "Let the countdown begin!!",
    }
}

/// Fixed-width text progress bar.
pub fn progress_bar(fraction: f64, width: usize) -> String {
    let filled = (fraction.clamp(0.0, 1.0) * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_formats_minutes_and_seconds() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(65), "01:05");
        assert_eq!(format_clock(185), "03:05");
        assert_eq!(format_clock(3_605), "00:05");
    }

    #[test]
    fn progress_runs_from_zero_to_one() {
        assert_eq!(progress(10, 10), 0.0);
        assert_eq!(progress(5, 10), 0.5);
        assert_eq!(progress(0, 10), 1.0);
        assert_eq!(progress(0, 0), 0.0);
    }

    #[test]
    fn ring_dash_scales_with_fraction() {
        let (dash, gap) = ring_dash(0.5);
        assert!((dash - gap / 2.0).abs() < 1e-9);
        assert_eq!(ring_dash(2.0).0, gap);
    }

    #[test]
    fn titles_per_state() {
        assert_eq!(title(TimerState::Reset), "Let the countdown begin!!");
        assert_eq!(title(TimerState::Started), "Greatness is within sight!!");
        assert_eq!(title(TimerState::Paused), "Never quite, keep going!!");
    }

    #[test]
    fn progress_bar_fills_proportionally() {
        assert_eq!(progress_bar(0.0, 4), "[----]");
        assert_eq!(progress_bar(0.5, 4), "[##--]");
        assert_eq!(progress_bar(1.0, 4), "[####]");
    }
}
