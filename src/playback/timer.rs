//! Hybrid sleep and the scoped OS timer-resolution request.
//!
//! A wait is split in two: everything but the final [`SPIN_WINDOW`] is a
//! normal thread sleep (capped at [`MAX_COARSE_SLEEP`] so control flags get
//! rechecked), and the remainder is a busy wait.

use std::thread;
use std::time::{Duration, Instant};

/// Tail of every wait that is spun instead of slept.
pub const SPIN_WINDOW: Duration = Duration::from_millis(2);

/// Longest single sleep the loop takes before rechecking its flags.
pub const MAX_COARSE_SLEEP: Duration = Duration::from_millis(50);

/// Portion of a `wait_secs` wait to sleep now, or `None` when only the spin
/// window is left.
pub fn coarse_sleep_for(wait_secs: f64) -> Option<Duration> {
    if !wait_secs.is_finite() {
        return Some(MAX_COARSE_SLEEP);
    }
    let spin = SPIN_WINDOW.as_secs_f64();
    if wait_secs <= spin {
        return None;
    }
    Some(Duration::from_secs_f64(wait_secs - spin).min(MAX_COARSE_SLEEP))
}

/// Busy-wait until `ready` returns true or `budget` runs out.
///
/// Returns the last value of `ready`.
pub fn spin_until(mut ready: impl FnMut() -> bool, budget: Duration) -> bool {
    let deadline = Instant::now() + budget;
    loop {
        if ready() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        std::hint::spin_loop();
    }
}

/// Sleep that tolerates a zero duration.
pub fn nap(duration: Duration) {
    if !duration.is_zero() {
        thread::sleep(duration);
    }
}

/// Holds a 1 ms system timer resolution for its lifetime.
///
/// Only Windows has a process-visible setting; elsewhere this is a no-op.
#[derive(Debug)]
pub struct TimerResolution {
    active: bool,
}

impl TimerResolution {
    pub const PERIOD_MS: u32 = 1;

    /// Request the finer resolution. Check [`is_active`](Self::is_active).
    pub fn acquire() -> Self {
        let active = sys::begin(Self::PERIOD_MS);
        if active {
            tracing::debug!(period_ms = Self::PERIOD_MS, "timer resolution raised");
        }
        Self { active }
    }

    /// A guard that holds nothing.
    pub fn none() -> Self {
        Self { active: false }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl Drop for TimerResolution {
    fn drop(&mut self) {
        if self.active {
            sys::end(Self::PERIOD_MS);
            self.active = false;
            tracing::debug!("timer resolution restored");
        }
    }
}

#[cfg(windows)]
mod sys {
    #[link(name = "winmm")]
    extern "system" {
        fn timeBeginPeriod(period: u32) -> u32;
        fn timeEndPeriod(period: u32) -> u32;
    }

    const TIMERR_NOERROR: u32 = 0;

    pub fn begin(period: u32) -> bool {
        // SAFETY: plain winmm call with no pointer arguments.
        unsafe { timeBeginPeriod(period) == TIMERR_NOERROR }
    }

    pub fn end(period: u32) {
        // SAFETY: paired with a successful timeBeginPeriod of the same period.
        unsafe {
            timeEndPeriod(period);
        }
    }
}

#[cfg(not(windows))]
mod sys {
    pub fn begin(_period: u32) -> bool {
        false
    }

    pub fn end(_period: u32) {}
}
