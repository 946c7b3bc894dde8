//! Playback clock.
//!
//! Playback time is `(now - start) - paused_total`, frozen at `pause_ts`
//! while paused. Every value is integer nanoseconds since the session's
//! origin `Instant`, so pause/resume and seek arithmetic is exact.
//!
//! The control handle writes these values and the worker reads them. There
//! is no lock: each store is individually atomic and the last writer wins.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::time::Instant;

const NANOS_PER_SEC: f64 = 1_000_000_000.0;

/// Convert seconds to clock nanoseconds.
pub fn secs_to_nanos(secs: f64) -> i64 {
    (secs * NANOS_PER_SEC).round() as i64
}

/// Convert clock nanoseconds to seconds.
pub fn nanos_to_secs(nanos: i64) -> f64 {
    nanos as f64 / NANOS_PER_SEC
}

/// Lock-free playback clock shared between control handle and worker.
#[derive(Debug)]
pub struct TimeBase {
    origin: Instant,
    start: AtomicI64,
    paused_total: AtomicI64,
    pause_ts: AtomicI64,
    paused: AtomicBool,
}

impl TimeBase {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            start: AtomicI64::new(0),
            paused_total: AtomicI64::new(0),
            pause_ts: AtomicI64::new(0),
            paused: AtomicBool::new(false),
        }
    }

    /// Nanoseconds since this clock was created.
    pub fn now(&self) -> i64 {
        i64::try_from(self.origin.elapsed().as_nanos()).unwrap_or(i64::MAX)
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Playback time at `now`, in seconds.
    pub fn position_at(&self, now: i64) -> f64 {
        let reference = if self.is_paused() {
            self.pause_ts.load(Ordering::Acquire)
        } else {
            now
        };
        let start = self.start.load(Ordering::Acquire);
        let paused_total = self.paused_total.load(Ordering::Acquire);
        nanos_to_secs(reference - start - paused_total)
    }

    pub fn position(&self) -> f64 {
        self.position_at(self.now())
    }

    /// Restart at zero, running, with no accumulated pause.
    pub fn reset_at(&self, now: i64) {
        self.start.store(now, Ordering::Release);
        self.paused_total.store(0, Ordering::Release);
        self.pause_ts.store(now, Ordering::Release);
        self.paused.store(false, Ordering::Release);
    }

    /// Freeze the clock. Returns `false` if it was already paused.
    pub fn pause_at(&self, now: i64) -> bool {
        if self.is_paused() {
            return false;
        }
        self.pause_ts.store(now, Ordering::Release);
        self.paused.store(true, Ordering::Release);
        true
    }

    /// Unfreeze, adding the time spent paused. Returns `false` if it was running.
    pub fn resume_at(&self, now: i64) -> bool {
        if !self.is_paused() {
            return false;
        }
        let pause_ts = self.pause_ts.load(Ordering::Acquire);
        self.paused_total.fetch_add(now - pause_ts, Ordering::AcqRel);
        self.paused.store(false, Ordering::Release);
        true
    }

    /// Move the clock so it reads exactly `secs`, paused or not.
    pub fn seek_at(&self, now: i64, secs: f64) {
        let target = secs_to_nanos(secs.max(0.0));
        let reference = if self.is_paused() {
            self.pause_ts.load(Ordering::Acquire)
        } else {
            now
        };
        self.paused_total.store(0, Ordering::Release);
        self.start.store(reference - target, Ordering::Release);
    }
}

impl Default for TimeBase {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    const SEC: i64 = 1_000_000_000;

    #[test]
    fn runs_from_reset_point() {
        let clock = TimeBase::new();
        clock.reset_at(5 * SEC);
        assert_approx_eq!(clock.position_at(5 * SEC), 0.0);
        assert_approx_eq!(clock.position_at(7 * SEC), 2.0);
    }

    #[test]
    fn pause_freezes_and_resume_is_continuous() {
        for delta in [0, 1, 37, 250_000_000, 3_600 * SEC] {
            let clock = TimeBase::new();
            clock.reset_at(0);
            let before = clock.position_at(SEC);
            assert!(clock.pause_at(SEC));
            assert_eq!(clock.position_at(SEC + delta), before);
            assert!(clock.resume_at(SEC + delta));
            assert_eq!(clock.position_at(SEC + delta), before);
            assert_approx_eq!(clock.position_at(2 * SEC + delta), before + 1.0);
        }
    }

    #[test]
    fn repeated_pause_and_resume_are_noops() {
        let clock = TimeBase::new();
        clock.reset_at(0);
        assert!(clock.pause_at(SEC));
        assert!(!clock.pause_at(2 * SEC));
        assert!(clock.resume_at(3 * SEC));
        assert!(!clock.resume_at(4 * SEC));
        assert_approx_eq!(clock.position_at(4 * SEC), 2.0);
    }

    #[test]
    fn seek_while_paused_reads_exact_target() {
        let clock = TimeBase::new();
        clock.reset_at(0);
        clock.pause_at(3 * SEC);
        clock.seek_at(9 * SEC, 1.25);
        assert_eq!(clock.position_at(9 * SEC), 1.25);
        assert_eq!(clock.position_at(60 * SEC), 1.25);
        clock.resume_at(10 * SEC);
        assert_eq!(clock.position_at(10 * SEC), 1.25);
        assert_approx_eq!(clock.position_at(11 * SEC), 2.25);
    }

    #[test]
    fn seek_while_running_restarts_from_target() {
        let clock = TimeBase::new();
        clock.reset_at(0);
        clock.pause_at(SEC);
        clock.resume_at(2 * SEC);
        clock.seek_at(4 * SEC, 0.3);
        assert_eq!(clock.position_at(4 * SEC), 0.3);
        assert_approx_eq!(clock.position_at(5 * SEC), 1.3);
    }

    #[test]
    fn negative_seek_clamps_to_zero() {
        let clock = TimeBase::new();
        clock.reset_at(0);
        clock.seek_at(SEC, -4.0);
        assert_eq!(clock.position_at(SEC), 0.0);
    }

    #[test]
    fn nanos_round_trip_common_values() {
        for secs in [0.0, 0.3, 0.5, 1.25, 12.345] {
            assert_eq!(nanos_to_secs(secs_to_nanos(secs)), secs);
        }
    }
}
