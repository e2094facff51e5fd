//! Transient user notifications.
//!
//! Mirrors the two notification surfaces of the dashboard: global banners
//! that dismiss after 5 seconds and in-flow (per-command) notices that
//! dismiss after 3 seconds. The center is plain single-threaded state; the
//! command layer pushes entries while it works and drains them at the end.

use std::time::{Duration, Instant};

/// Global banner lifetime.
pub const GLOBAL_DISMISS: Duration = Duration::from_secs(5);
/// In-flow notice lifetime.
pub const INLINE_DISMISS: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Success,
    Error,
    Info,
}

impl Kind {
    /// Prefix used when printing to the terminal.
    pub fn tag(&self) -> &'static str {
        match self {
            Kind::Success => "[ok]",
            Kind::Error => "[error]",
            Kind::Info => "[info]",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub kind: Kind,
    pub message: String,
    created: Instant,
    ttl: Duration,
}

impl Notification {
    pub fn expired(&self, now: Instant) -> bool {
        now.duration_since(self.created) >= self.ttl
    }
}

/// Collects notifications raised while a command runs.
#[derive(Default)]
pub struct NotificationCenter {
    entries: Vec<Notification>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a global notification (5 s lifetime).
    pub fn push(&mut self, kind: Kind, message: impl Into<String>) {
        self.push_with_ttl(kind, message, GLOBAL_DISMISS);
    }

    /// Push an in-flow notice (3 s lifetime), e.g. a partial-success note
    /// attached to an otherwise successful save.
    pub fn push_inline(&mut self, kind: Kind, message: impl Into<String>) {
        self.push_with_ttl(kind, message, INLINE_DISMISS);
    }

    fn push_with_ttl(&mut self, kind: Kind, message: impl Into<String>, ttl: Duration) {
        self.entries.push(Notification {
            kind,
            message: message.into(),
            created: Instant::now(),
            ttl,
        });
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(Kind::Success, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Kind::Error, message);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Kind::Info, message);
    }

    /// Entries still alive at `now`, pruning the rest.
    pub fn active(&mut self, now: Instant) -> Vec<Notification> {
        self.entries.retain(|n| !n.expired(now));
        self.entries.clone()
    }

    /// Take everything, expired or not, clearing the center. Used when a
    /// command finishes and the output is printed once.
    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.entries)
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|n| n.kind == Kind::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttls_match_the_two_surfaces() {
        assert_eq!(GLOBAL_DISMISS, Duration::from_secs(5));
        assert_eq!(INLINE_DISMISS, Duration::from_secs(3));
    }

    #[test]
    fn test_active_prunes_expired_entries() {
        let mut center = NotificationCenter::new();
        center.success("saved");
        center.push_inline(Kind::Info, "comment failed");

        let now = Instant::now();
        assert_eq!(center.active(now).len(), 2);

        // The inline notice expires first.
        let later = now + INLINE_DISMISS;
        assert_eq!(center.active(later).len(), 1);

        let much_later = now + GLOBAL_DISMISS;
        assert!(center.active(much_later).is_empty());
    }

    #[test]
    fn test_drain_clears() {
        let mut center = NotificationCenter::new();
        center.error("boom");
        assert!(center.has_errors());
        let drained = center.drain();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].kind, Kind::Error);
        assert!(!center.has_errors());
        assert!(center.drain().is_empty());
    }
}
