//! Local progress clock for the current track.
//!
//! The server only tells us `elapsed` once per playlist poll; between polls
//! the clock advances itself one second per tick so the bar moves smoothly.
//! When the local clock runs past the track length it asks for exactly one
//! early playlist refetch instead of waiting for the next poll.

use crate::format::format_clock;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProgressUpdate {
    pub length: f64,
    pub elapsed: f64,
    pub live: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProgressView {
    /// Elapsed seconds, clamped to `length` for scheduled tracks.
    pub elapsed: f64,
    pub length: f64,
    /// 0.0..=1.0
    pub ratio: f64,
    /// Rounded whole percent of `ratio`.
    pub percent: u8,
    pub label: String,
    pub live: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ProgressClock {
    length: i64,
    elapsed: i64,
    live: bool,
    refetch_pending: bool,
    refetch_sent: bool,
}

impl ProgressClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-seed from authoritative server data.  Durations are truncated to
    /// whole seconds.
    pub fn update(&mut self, update: ProgressUpdate) -> ProgressView {
        self.length = update.length.trunc() as i64;
        self.elapsed = update.elapsed.trunc() as i64;
        self.live = update.live;
        self.refetch_pending = false;
        self.refetch_sent = false;
        self.check_end();
        self.view()
    }

    /// Advance one second.
    pub fn tick(&mut self) -> ProgressView {
        self.elapsed += 1;
        self.check_end();
        self.view()
    }

    /// Returns `true` once per update after the track end has been reached.
    pub fn take_refetch(&mut self) -> bool {
        std::mem::take(&mut self.refetch_pending)
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    pub fn view(&self) -> ProgressView {
        if self.live {
            return ProgressView {
                elapsed: self.elapsed as f64,
                length: 0.0,
                ratio: 1.0,
                percent: 100,
                label: format!("{} / LIVE", format_clock(self.elapsed as f64)),
                live: true,
            };
        }

        let elapsed = self.elapsed.min(self.length).max(0);
        let ratio = if self.length > 0 {
            elapsed as f64 / self.length as f64
        } else {
            0.0
        };
        ProgressView {
            elapsed: elapsed as f64,
            length: self.length as f64,
            ratio,
            percent: (ratio * 100.0).round() as u8,
            label: format!(
                "{} / {}",
                format_clock(elapsed as f64),
                format_clock(self.length as f64)
            ),
            live: false,
        }
    }

    fn check_end(&mut self) {
        if self.live || self.refetch_sent {
            return;
        }
        if self.elapsed >= self.length {
            self.refetch_pending = true;
            self.refetch_sent = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrun_clamps_and_refetches_once() {
        let mut clock = ProgressClock::new();
        let view = clock.update(ProgressUpdate {
            length: 180.0,
            elapsed: 181.0,
            live: false,
        });
        assert_eq!(view.elapsed, 180.0);
        assert_eq!(view.percent, 100);
        assert_eq!(view.label, "3:00 / 3:00");
        assert!(clock.take_refetch());

        for _ in 0..5 {
            let view = clock.tick();
            assert_eq!(view.elapsed, 180.0);
            assert!(!clock.take_refetch());
        }
    }

    #[test]
    fn test_reaching_end_by_ticking() {
        let mut clock = ProgressClock::new();
        clock.update(ProgressUpdate {
            length: 10.0,
            elapsed: 8.0,
            live: false,
        });
        assert!(!clock.take_refetch());
        clock.tick();
        assert!(!clock.take_refetch());
        let view = clock.tick();
        assert_eq!(view.elapsed, 10.0);
        assert!(clock.take_refetch());
        clock.tick();
        assert!(!clock.take_refetch());
    }

    #[test]
    fn test_new_update_rearms_refetch() {
        let mut clock = ProgressClock::new();
        clock.update(ProgressUpdate {
            length: 5.0,
            elapsed: 5.0,
            live: false,
        });
        assert!(clock.take_refetch());
        clock.update(ProgressUpdate {
            length: 200.0,
            elapsed: 1.0,
            live: false,
        });
        assert!(!clock.take_refetch());
        assert_eq!(clock.view().percent, 1);
    }

    #[test]
    fn test_fractional_seconds_truncate() {
        let mut clock = ProgressClock::new();
        let view = clock.update(ProgressUpdate {
            length: 240.9,
            elapsed: 60.7,
            live: false,
        });
        assert_eq!(view.elapsed, 60.0);
        assert_eq!(view.length, 240.0);
        assert_eq!(view.percent, 25);
        assert_eq!(view.label, "1:00 / 4:00");
    }

    #[test]
    fn test_live_is_pinned_full_and_never_refetches() {
        let mut clock = ProgressClock::new();
        let view = clock.update(ProgressUpdate {
            length: 0.0,
            elapsed: 65.0,
            live: true,
        });
        assert!(view.live);
        assert_eq!(view.percent, 100);
        assert_eq!(view.label, "1:05 / LIVE");
        for _ in 0..3 {
            clock.tick();
        }
        assert!(!clock.take_refetch());
        assert_eq!(clock.view().label, "1:08 / LIVE");
    }

    #[test]
    fn test_zero_length_does_not_divide() {
        let mut clock = ProgressClock::new();
        let view = clock.update(ProgressUpdate::default());
        assert_eq!(view.ratio, 0.0);
        assert_eq!(view.percent, 0);
    }
}
