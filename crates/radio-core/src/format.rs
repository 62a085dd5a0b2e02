//! Display strings shared by the dashboard regions.

use crate::model::Track;

/// Coarse relative duration used by the playlist: `"under a min"` below one
/// minute, otherwise whole minutes.
pub fn format_duration(secs: f64) -> String {
    if secs < 60.0 {
        return "under a min".to_string();
    }
    let mins = (secs / 60.0).round() as u64;
    if mins == 1 {
        "1 min".to_string()
    } else {
        format!("{} mins", mins)
    }
}

/// `M:SS`, with a leading `-` for negative values.
pub fn format_clock(secs: f64) -> String {
    let prefix = if secs < 0.0 { "-" } else { "" };
    let total = secs.abs().round() as u64;
    format!("{}{}:{:02}", prefix, total / 60, total % 60)
}

/// `"Artist - Title"`, or just the title when the artist is blank.
pub fn format_track(track: &Track) -> String {
    match track.artist.as_deref().map(str::trim) {
        Some(artist) if !artist.is_empty() => format!("{} - {}", artist, track.title),
        _ => track.title.clone(),
    }
}

pub fn format_listeners(current: u64, peak: Option<u64>) -> String {
    match peak {
        Some(peak) => format!("{} (peak {})", current, peak),
        None => current.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration_buckets() {
        assert_eq!(format_duration(0.0), "under a min");
        assert_eq!(format_duration(59.9), "under a min");
        assert_eq!(format_duration(60.0), "1 min");
        assert_eq!(format_duration(89.0), "1 min");
        assert_eq!(format_duration(90.0), "2 mins");
        assert_eq!(format_duration(600.0), "10 mins");
    }

    #[test]
    fn test_format_duration_plural_matches_rounding() {
        let mut secs = 0.0;
        while secs < 7200.0 {
            let s = format_duration(secs);
            if secs < 60.0 {
                assert_eq!(s, "under a min");
            } else {
                let mins = (secs / 60.0).round() as u64;
                let expected = if mins == 1 { "1 min".to_string() } else { format!("{} mins", mins) };
                assert_eq!(s, expected, "secs={}", secs);
            }
            secs += 7.3;
        }
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0.0), "0:00");
        assert_eq!(format_clock(5.0), "0:05");
        assert_eq!(format_clock(180.0), "3:00");
        assert_eq!(format_clock(59.6), "1:00");
        assert_eq!(format_clock(-61.0), "-1:01");
        assert_eq!(format_clock(3725.0), "62:05");
    }

    #[test]
    fn test_format_track() {
        let mut track = Track {
            artist: Some("Aphex Twin".to_string()),
            title: "Xtal".to_string(),
            ..Track::default()
        };
        assert_eq!(format_track(&track), "Aphex Twin - Xtal");
        track.artist = Some(String::new());
        assert_eq!(format_track(&track), "Xtal");
        track.artist = None;
        assert_eq!(format_track(&track), "Xtal");
    }

    #[test]
    fn test_format_listeners() {
        assert_eq!(format_listeners(4, Some(9)), "4 (peak 9)");
        assert_eq!(format_listeners(4, None), "4");
    }
}
