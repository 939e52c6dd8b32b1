use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Error => "error",
        }
    }
}

/// A transient, auto-dismissing message.
#[derive(Debug, Clone)]
pub struct Notice {
    pub id: u64,
    pub message: String,
    pub severity: Severity,
    pub raised_at: Instant,
    pub expires_at: Instant,
}

impl Notice {
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Stack of notices, each shown for a fixed duration.
///
/// Notices never block anything: raising one only appends to the stack, and
/// expiry is applied lazily whenever the stack is read.
#[derive(Debug)]
pub struct Notifier {
    notices: VecDeque<Notice>,
    display_for: Duration,
    next_id: u64,
}

impl Notifier {
    pub fn new(display_for: Duration) -> Self {
        Notifier {
            notices: VecDeque::new(),
            display_for,
            next_id: 1,
        }
    }

    pub fn notify(&mut self, message: impl Into<String>, severity: Severity) -> u64 {
        self.notify_at(message, severity, Instant::now())
    }

    pub fn notify_at(&mut self, message: impl Into<String>, severity: Severity, now: Instant) -> u64 {
        let message = message.into();
        // Failures are already logged where they are reported
        debug!(severity = severity.label(), "{}", message);

        let id = self.next_id;
        self.next_id += 1;
        self.notices.push_back(Notice {
            id,
            message,
            severity,
            raised_at: now,
            expires_at: now + self.display_for,
        });
        id
    }

    pub fn success(&mut self, message: impl Into<String>) -> u64 {
        self.notify(message, Severity::Success)
    }

    pub fn error(&mut self, message: impl Into<String>) -> u64 {
        self.notify(message, Severity::Error)
    }

    /// Notices still on screen at `now`, oldest first.
    pub fn active_at(&mut self, now: Instant) -> Vec<Notice> {
        self.notices.retain(|notice| !notice.is_expired(now));
        self.notices.iter().cloned().collect()
    }

    pub fn active(&mut self) -> Vec<Notice> {
        self.active_at(Instant::now())
    }

    /// Take every pending notice, for front ends that print and forget.
    pub fn drain(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    pub fn dismiss(&mut self, id: u64) {
        self.notices.retain(|notice| notice.id != id);
    }

    pub fn display_for(&self) -> Duration {
        self.display_for
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Notifier::new(Duration::from_secs(3))
    }
}
