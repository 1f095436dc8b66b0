//! Pure watch-progress arithmetic shared by the watch session and any UI.
//!
//! All functions here are side-effect free and recomputable on every render.

/// Fraction of the effective duration past which a lesson counts as complete.
pub const COMPLETION_RATIO: f64 = 0.9;

/// Picks the duration used for completion and percentage math.
///
/// The duration observed from the player wins over the server-declared
/// nominal value, which may be absent or drift from the encoded media.
#[must_use]
pub fn effective_duration(observed: Option<u32>, nominal: Option<u32>) -> Option<u32> {
    observed.or(nominal)
}

/// Whether `watched` seconds cross the completion threshold.
///
/// Without a duration reference completion cannot be asserted, so an unknown
/// duration always yields `false` rather than a false positive.
#[must_use]
pub fn is_completed(watched: u32, duration: Option<u32>) -> bool {
    duration.is_some_and(|total| f64::from(watched) >= COMPLETION_RATIO * f64::from(total))
}

/// Display-ready watched value.
///
/// Takes the maximum of the persisted and locally observed values so a seek
/// backward never shrinks the shown progress, clamped to the duration when
/// one is known.
#[must_use]
pub fn effective_viewed(duration: Option<u32>, persisted: u32, observed: u32) -> u32 {
    let best = persisted.max(observed);
    duration.map_or(best, |total| best.min(total))
}

/// Percentage of the lesson watched, capped at 100.
///
/// Returns 0 while the duration is unknown or zero.
#[must_use]
pub fn percent(viewed: u32, duration: Option<u32>) -> f64 {
    match duration {
        Some(total) if total > 0 => (f64::from(viewed) / f64::from(total) * 100.0).min(100.0),
        _ => 0.0,
    }
}

/// Formats a second count as `m:ss`, or `h:mm:ss` past one hour.
#[must_use]
pub fn format_timestamp(seconds: u32) -> String {
    let hours = seconds / 3600;
    let mins = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}:{mins:02}:{secs:02}")
    } else {
        format!("{mins}:{secs:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observed_duration_wins_over_nominal() {
        assert_eq!(effective_duration(Some(110), Some(100)), Some(110));
        assert_eq!(effective_duration(None, Some(100)), Some(100));
        assert_eq!(effective_duration(None, None), None);
    }

    #[test]
    fn completion_requires_known_duration() {
        assert!(!is_completed(1_000, None));
        assert!(is_completed(90, Some(100)));
        assert!(!is_completed(89, Some(100)));
    }

    #[test]
    fn viewed_never_regresses_and_clamps_to_duration() {
        // Seek backward: persisted 80, observed dropped to 10.
        assert_eq!(effective_viewed(Some(100), 80, 10), 80);
        // Overshoot past the real duration is clamped.
        assert_eq!(effective_viewed(Some(100), 80, 130), 100);
        // Unknown duration: no clamp, still monotone.
        assert_eq!(effective_viewed(None, 80, 130), 130);
    }

    #[test]
    fn percent_caps_at_one_hundred() {
        assert_eq!(percent(50, Some(200)), 25.0);
        assert_eq!(percent(300, Some(200)), 100.0);
        assert_eq!(percent(50, None), 0.0);
        assert_eq!(percent(50, Some(0)), 0.0);
    }

    #[test]
    fn formats_short_and_long_timestamps() {
        assert_eq!(format_timestamp(0), "0:00");
        assert_eq!(format_timestamp(65), "1:05");
        assert_eq!(format_timestamp(3_600), "1:00:00");
        assert_eq!(format_timestamp(3_725), "1:02:05");
    }
}
