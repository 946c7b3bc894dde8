//! Playback notifications: mpsc-based bridge to whatever presents playback.
//!
//! Delivery is best-effort. A dropped receiver, or no channel at all, never
//! affects playback.

use std::sync::mpsc;

/// Events emitted by a playback session.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackNotification {
    /// Human-readable status line.
    Status(String),
    /// Current playback time in seconds.
    Progress(f64),
    /// A key went down (`active`) or came up.
    NoteActive { pitch: u8, active: bool },
    /// Sent once when playback runs past the end and pauses itself.
    AutoPaused,
    /// Sent once when the worker exits, whatever the cause.
    Finished,
}

/// Sender half: handed to a [`Player`](super::Player).
pub type NotificationSender = mpsc::Sender<PlaybackNotification>;

/// Receiver half: held by the presentation side.
pub struct NotificationReceiver {
    rx: mpsc::Receiver<PlaybackNotification>,
}

impl NotificationReceiver {
    /// Non-blocking poll for the next notification.
    pub fn poll(&self) -> Option<PlaybackNotification> {
        self.rx.try_recv().ok()
    }

    /// Drain all pending notifications.
    pub fn drain(&self) -> Vec<PlaybackNotification> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }

    /// Block until the next notification; `None` once every sender is gone.
    pub fn recv(&self) -> Option<PlaybackNotification> {
        self.rx.recv().ok()
    }

    /// Block up to `timeout` for the next notification.
    pub fn recv_timeout(&self, timeout: std::time::Duration) -> Option<PlaybackNotification> {
        self.rx.recv_timeout(timeout).ok()
    }
}

/// Create a new notification channel pair.
pub fn notification_channel() -> (NotificationSender, NotificationReceiver) {
    let (tx, rx) = mpsc::channel();
    (tx, NotificationReceiver { rx })
}

/// Fire-and-forget wrapper around an optional sender.
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    tx: Option<NotificationSender>,
}

impl Notifier {
    pub fn new(tx: Option<NotificationSender>) -> Self {
        Self { tx }
    }

    pub fn send(&self, notification: PlaybackNotification) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(notification);
        }
    }

    pub fn status(&self, text: impl Into<String>) {
        self.send(PlaybackNotification::Status(text.into()));
    }
}
