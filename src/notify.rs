//! Unseen-message accounting.
//!
//! Counts events that arrive while the feed is off-screen. "Read" state is
//! modelled entirely in memory: `mark_seen` zeroes the counter and moves the
//! watermark, and nothing else ever decrements it.

use serde::Serialize;

use crate::event::{now_millis, MessageEvent};

/// Read-only view of the tracker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NotificationSnapshot {
    pub unseen_count: u64,
    pub last_seen_at: u64,
}

#[derive(Debug)]
pub struct NotificationTracker {
    unseen_count: u64,
    last_seen_at: u64,
}

impl NotificationTracker {
    pub fn new() -> Self {
        NotificationTracker {
            unseen_count: 0,
            last_seen_at: now_millis(),
        }
    }

    /// Account for a newly appended event. Only counts while the feed is
    /// hidden and only for events newer than the last-seen watermark.
    pub fn on_new_event(&mut self, event: &MessageEvent, chat_visible: bool) {
        if !chat_visible && event.created_at > self.last_seen_at {
            self.unseen_count += 1;
        }
    }

    /// The caller viewed the feed: zero the counter, advance the watermark.
    pub fn mark_seen(&mut self) {
        self.unseen_count = 0;
        self.last_seen_at = now_millis();
    }

    pub fn snapshot(&self) -> NotificationSnapshot {
        NotificationSnapshot {
            unseen_count: self.unseen_count,
            last_seen_at: self.last_seen_at,
        }
    }
}

impl Default for NotificationTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use crate::event::Category;

    use super::*;

    fn event_at(created_at: u64) -> MessageEvent {
        MessageEvent {
            id: 1,
            author_id: "guest-0001".to_string(),
            body: "hi".to_string(),
            created_at,
            category: Category::General,
            is_private: false,
            recipient_id: None,
            reply_to_id: None,
            attachment: None,
        }
    }

    #[test]
    fn test_hidden_feed_accumulates_unseen() {
        let mut tracker = NotificationTracker::new();
        let base = tracker.snapshot().last_seen_at;
        for i in 1..=3 {
            tracker.on_new_event(&event_at(base + i), false);
        }
        assert_eq!(tracker.snapshot().unseen_count, 3);
    }

    #[test]
    fn test_visible_feed_never_counts() {
        let mut tracker = NotificationTracker::new();
        let base = tracker.snapshot().last_seen_at;
        tracker.on_new_event(&event_at(base + 10), true);
        assert_eq!(tracker.snapshot().unseen_count, 0);
    }

    #[test]
    fn test_events_older_than_watermark_never_count() {
        let mut tracker = NotificationTracker::new();
        let base = tracker.snapshot().last_seen_at;
        tracker.on_new_event(&event_at(base.saturating_sub(5)), false);
        tracker.on_new_event(&event_at(base), false);
        assert_eq!(tracker.snapshot().unseen_count, 0);
    }

    #[test]
    fn test_mark_seen_resets_and_advances_watermark() {
        let mut tracker = NotificationTracker::new();
        let base = tracker.snapshot().last_seen_at;
        tracker.on_new_event(&event_at(base + 1), false);
        tracker.on_new_event(&event_at(base + 2), false);
        assert_eq!(tracker.snapshot().unseen_count, 2);

        tracker.mark_seen();
        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.unseen_count, 0);
        assert!(snapshot.last_seen_at >= base);
    }

    #[test]
    fn test_count_is_monotonic_while_hidden() {
        let mut tracker = NotificationTracker::new();
        let base = tracker.snapshot().last_seen_at;
        let mut previous = 0;
        for i in 1..=10 {
            tracker.on_new_event(&event_at(base + i), false);
            let current = tracker.snapshot().unseen_count;
            assert!(current >= previous);
            previous = current;
        }
        assert_eq!(previous, 10);
    }
}
