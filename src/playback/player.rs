//! Playback session: the worker loop and its control handle.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::backend::OutputBackend;
use crate::model::{sort_events, KeyEvent};

use super::batch::{dispatch_batch, take_batch};
use super::clock::TimeBase;
use super::notify::{NotificationSender, Notifier, PlaybackNotification};
use super::options::PlaybackOptions;
use super::state::{PlaybackState, StateCell};
use super::timer::{coarse_sleep_for, nap, spin_until, TimerResolution, SPIN_WINDOW};
use super::PlayerError;

/// Granularity of the countdown's stop check.
const COUNTDOWN_TICK: Duration = Duration::from_millis(50);

/// State shared by the worker and every control handle.
struct Shared {
    events: Vec<KeyEvent>,
    total_duration: f64,
    clock: TimeBase,
    state: StateCell,
    cursor: AtomicUsize,
    stop: AtomicBool,
    pending_shutdown: AtomicBool,
    notifier: Notifier,
}

impl Shared {
    fn stopped(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    fn position(&self) -> f64 {
        match self.state.get() {
            PlaybackState::Idle | PlaybackState::Countdown => 0.0,
            _ => self.clock.position(),
        }
    }

    fn request_shutdown(&self) {
        self.pending_shutdown.store(true, Ordering::Release);
    }

    fn seek(&self, secs: f64) {
        if !matches!(
            self.state.get(),
            PlaybackState::Playing | PlaybackState::Paused | PlaybackState::Finished
        ) {
            return;
        }
        let secs = if secs.is_finite() { secs.max(0.0) } else { 0.0 };
        self.request_shutdown();
        self.clock.seek_at(self.clock.now(), secs);
        self.cursor
            .store(self.events.partition_point(|e| e.time < secs), Ordering::Release);
        if self.state.get() == PlaybackState::Finished {
            self.state.set_unless_stopped(PlaybackState::Paused);
        }
        self.notifier.send(PlaybackNotification::Progress(secs));
    }

    fn toggle_pause(&self) {
        match self.state.get() {
            PlaybackState::Paused | PlaybackState::Finished => {
                if self.cursor.load(Ordering::Acquire) >= self.events.len() {
                    self.seek(0.0);
                }
                self.clock.resume_at(self.clock.now());
                if self.state.set_unless_stopped(PlaybackState::Playing) {
                    self.notifier.status("Resuming...");
                }
            }
            PlaybackState::Playing => {
                self.clock.pause_at(self.clock.now());
                self.request_shutdown();
                if self.state.set_unless_stopped(PlaybackState::Paused) {
                    self.notifier.status("Paused.");
                }
            }
            PlaybackState::Idle | PlaybackState::Countdown | PlaybackState::Stopped => {}
        }
    }

    fn stop(&self) {
        if !self.stop.swap(true, Ordering::AcqRel) {
            self.notifier.status("Stopping playback...");
        }
        self.state.set(PlaybackState::Stopped);
    }

    /// Pause at the end of the sequence and flag it finished.
    fn auto_pause(&self) {
        if !self.clock.pause_at(self.clock.now()) {
            return;
        }
        self.request_shutdown();
        if self.state.set_unless_stopped(PlaybackState::Finished) {
            self.notifier.send(PlaybackNotification::AutoPaused);
            self.notifier.status("Playback finished. Paused.");
        }
    }
}

/// Cloneable handle for controlling a running [`Player`] from any thread.
///
/// Calls from two threads at once are not serialized against each other;
/// the last write wins.
#[derive(Clone)]
pub struct PlayerControl {
    shared: Arc<Shared>,
}

impl PlayerControl {
    /// Pause, or resume. Resuming after the end restarts from zero.
    pub fn toggle_pause(&self) {
        self.shared.toggle_pause();
    }

    /// Jump to `secs`. Held keys are released before playback continues.
    pub fn seek(&self, secs: f64) {
        self.shared.seek(secs);
    }

    /// End the session. Idempotent.
    pub fn stop(&self) {
        self.shared.stop();
    }

    pub fn state(&self) -> PlaybackState {
        self.shared.state.get()
    }

    pub fn position(&self) -> f64 {
        self.shared.position()
    }

    pub fn total_duration(&self) -> f64 {
        self.shared.total_duration
    }
}

/// One playback session over a compiled event sequence.
pub struct Player {
    shared: Arc<Shared>,
    options: PlaybackOptions,
    worker: Option<JoinHandle<()>>,
}

impl Player {
    /// Create an idle session. `events` are put in schedule order.
    pub fn new(
        mut events: Vec<KeyEvent>,
        total_duration: f64,
        options: PlaybackOptions,
        notifications: Option<NotificationSender>,
    ) -> Self {
        sort_events(&mut events);
        Self {
            shared: Arc::new(Shared {
                events,
                total_duration,
                clock: TimeBase::new(),
                state: StateCell::new(PlaybackState::Idle),
                cursor: AtomicUsize::new(0),
                stop: AtomicBool::new(false),
                pending_shutdown: AtomicBool::new(false),
                notifier: Notifier::new(notifications),
            }),
            options,
            worker: None,
        }
    }

    /// Start the worker thread driving `backend`.
    ///
    /// A player runs at most one session; a second call fails.
    pub fn play<B>(&mut self, backend: B) -> Result<(), PlayerError>
    where
        B: OutputBackend + 'static,
    {
        if self.worker.is_some() {
            return Err(PlayerError::AlreadyStarted);
        }
        match self.shared.state.get() {
            PlaybackState::Idle => {}
            PlaybackState::Stopped => return Err(PlayerError::Stopped),
            _ => return Err(PlayerError::AlreadyStarted),
        }
        let shared = Arc::clone(&self.shared);
        let options = self.options.clone();
        let handle = thread::Builder::new()
            .name("pianola-playback".into())
            .spawn(move || run_session(&shared, backend, &options))?;
        self.worker = Some(handle);
        Ok(())
    }

    pub fn control(&self) -> PlayerControl {
        PlayerControl {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn toggle_pause(&self) {
        self.shared.toggle_pause();
    }

    pub fn seek(&self, secs: f64) {
        self.shared.seek(secs);
    }

    pub fn stop(&self) {
        self.shared.stop();
    }

    pub fn state(&self) -> PlaybackState {
        self.shared.state.get()
    }

    /// Current playback time in seconds.
    pub fn position(&self) -> f64 {
        self.shared.position()
    }

    /// Index of the next event to dispatch.
    pub fn cursor(&self) -> usize {
        self.shared.cursor.load(Ordering::Acquire)
    }

    pub fn is_finished(&self) -> bool {
        self.shared.state.get() == PlaybackState::Finished
    }

    pub fn events(&self) -> &[KeyEvent] {
        &self.shared.events
    }

    pub fn total_duration(&self) -> f64 {
        self.shared.total_duration
    }

    /// Wait for the worker to exit. The worker only exits after [`stop`](Self::stop).
    pub fn join(&mut self) {
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.stop();
        self.join();
    }
}

/// Worker entry point: shutdown and the final notification happen on every exit path.
fn run_session<B: OutputBackend>(shared: &Shared, mut backend: B, options: &PlaybackOptions) {
    let _timer = if options.fine_timer {
        TimerResolution::acquire()
    } else {
        TimerResolution::none()
    };
    tracing::debug!(events = shared.events.len(), "playback session started");

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        if countdown(shared, options.countdown_secs) {
            start_clock(shared);
            run_loop(shared, &mut backend, options);
        }
    }));
    if let Err(payload) = outcome {
        let message = panic_message(payload.as_ref());
        tracing::error!(%message, "playback loop failed");
        shared.notifier.status(format!("Error: {message}"));
    }

    if let Err(e) = backend.shutdown() {
        tracing::warn!(error = %e, "backend shutdown failed");
    }
    shared.stop.store(true, Ordering::Release);
    shared.state.set(PlaybackState::Stopped);
    shared.notifier.send(PlaybackNotification::Finished);
    tracing::debug!("playback session ended");
}

/// Count down `secs` seconds. Returns `false` if stopped meanwhile.
fn countdown(shared: &Shared, secs: u32) -> bool {
    if secs == 0 {
        return !shared.stopped();
    }
    if !shared.state.set_unless_stopped(PlaybackState::Countdown) {
        return false;
    }
    shared.notifier.status("Get ready...");
    for remaining in (1..=secs).rev() {
        if shared.stopped() {
            return false;
        }
        shared.notifier.status(format!("{remaining}..."));
        let until = Instant::now() + Duration::from_secs(1);
        while Instant::now() < until {
            if shared.stopped() {
                return false;
            }
            nap(COUNTDOWN_TICK.min(until.saturating_duration_since(Instant::now())));
        }
    }
    !shared.stopped()
}

fn start_clock(shared: &Shared) {
    shared.cursor.store(0, Ordering::Release);
    shared.clock.reset_at(shared.clock.now());
    if shared.state.set_unless_stopped(PlaybackState::Playing) {
        shared.notifier.status("Playing!");
    }
}

fn run_loop(shared: &Shared, backend: &mut dyn OutputBackend, options: &PlaybackOptions) {
    let events = shared.events.as_slice();
    let tolerance = options.batch_tolerance_secs.max(0.0);
    let progress_every = options.progress_interval();
    let mut last_progress: Option<Instant> = None;

    while !shared.stopped() {
        if shared.pending_shutdown.swap(false, Ordering::AcqRel) {
            if let Err(e) = backend.shutdown() {
                tracing::warn!(error = %e, "backend shutdown failed");
            }
        }

        if shared.clock.is_paused() {
            thread::sleep(options.pause_poll());
            continue;
        }

        let cursor = shared.cursor.load(Ordering::Acquire);
        let Some(next) = events.get(cursor) else {
            if shared.clock.position() > shared.total_duration + options.end_grace_secs {
                shared.auto_pause();
            } else {
                thread::sleep(options.idle_poll());
            }
            continue;
        };

        let wait = next.time - shared.clock.position();
        if let Some(coarse) = coarse_sleep_for(wait) {
            thread::sleep(coarse);
            report_progress(shared, &mut last_progress, progress_every);
            continue;
        }
        let due = spin_until(
            || {
                shared.stopped()
                    || shared.clock.is_paused()
                    || shared.clock.position() >= next.time
            },
            SPIN_WINDOW * 2,
        );
        if !due || shared.stopped() || shared.clock.is_paused() {
            continue;
        }
        if shared.clock.position() < next.time {
            continue;
        }

        let end = take_batch(events, cursor, tolerance);
        // A seek in the meantime owns the cursor; drop this batch.
        if shared
            .cursor
            .compare_exchange(cursor, end, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            continue;
        }
        dispatch_batch(&events[cursor..end], backend, &shared.notifier, || {
            !shared.stopped()
        });
        report_progress(shared, &mut last_progress, progress_every);
    }
}

/// Send the clock position unless one went out within `every`.
fn report_progress(shared: &Shared, last: &mut Option<Instant>, every: Duration) {
    if shared.stopped() || shared.clock.is_paused() {
        return;
    }
    let now = Instant::now();
    if last.map_or(true, |at| now.duration_since(at) >= every) {
        shared
            .notifier
            .send(PlaybackNotification::Progress(shared.clock.position()));
        *last = Some(now);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
