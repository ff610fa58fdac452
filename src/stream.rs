//! Time-ordered, capacity-bounded feed buffer.
//!
//! The single source of truth for what the UI renders. Events are inserted
//! in `created_at` order (stable on ties) and the oldest are evicted once
//! the buffer exceeds its cap. The stream itself is not synchronized; the
//! engine serializes all writes behind its state lock.

use std::collections::VecDeque;

use crate::event::{EventId, MessageEvent};

#[derive(Debug)]
pub struct MessageStream {
    events: VecDeque<MessageEvent>,
    cap: usize,
}

impl MessageStream {
    pub fn new(cap: usize) -> Self {
        MessageStream {
            events: VecDeque::with_capacity(cap.min(1024) + 1),
            cap: cap.max(1),
        }
    }

    /// Insert `event` keeping ascending `created_at` order, then evict from
    /// the front until the buffer is back at its cap.
    ///
    /// `partition_point` places equal timestamps after existing ones, which
    /// is exactly the required tie-break: later appends render later.
    pub fn append(&mut self, event: MessageEvent) {
        let index = self
            .events
            .partition_point(|existing| existing.created_at <= event.created_at);
        self.events.insert(index, event);
        while self.events.len() > self.cap {
            self.events.pop_front();
        }
    }

    /// A fresh snapshot of the current feed, oldest first.
    pub fn all(&self) -> Vec<MessageEvent> {
        self.events.iter().cloned().collect()
    }

    pub fn find(&self, id: EventId) -> Option<MessageEvent> {
        self.events.iter().find(|event| event.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use crate::event::Category;

    use super::*;

    fn event(id: EventId, created_at: u64) -> MessageEvent {
        MessageEvent {
            id,
            author_id: format!("guest-{id:04}"),
            body: "hi".to_string(),
            created_at,
            category: Category::General,
            is_private: false,
            recipient_id: None,
            reply_to_id: None,
            attachment: None,
        }
    }

    fn assert_sorted(stream: &MessageStream) {
        let all = stream.all();
        for pair in all.windows(2) {
            assert!(
                pair[0].created_at <= pair[1].created_at,
                "stream out of order: {} then {}",
                pair[0].created_at,
                pair[1].created_at
            );
        }
    }

    #[test]
    fn test_append_keeps_ascending_order_for_out_of_order_inserts() {
        let mut stream = MessageStream::new(100);
        for (id, at) in [(1, 50), (2, 10), (3, 30), (4, 20), (5, 40)] {
            stream.append(event(id, at));
            assert_sorted(&stream);
        }
        let ids: Vec<EventId> = stream.all().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 4, 3, 5, 1]);
    }

    #[test]
    fn test_equal_timestamps_keep_insertion_order() {
        let mut stream = MessageStream::new(100);
        stream.append(event(1, 100));
        stream.append(event(2, 100));
        stream.append(event(3, 100));
        let ids: Vec<EventId> = stream.all().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_capacity_eviction_drops_oldest_first() {
        let mut stream = MessageStream::new(100);
        for i in 0..150u64 {
            stream.append(event(i, 1_000 + i));
        }
        assert_eq!(stream.len(), 100);
        let all = stream.all();
        // The 51st inserted event (index 50) is now the oldest retained.
        assert_eq!(all[0].created_at, 1_050);
        assert_eq!(all.last().unwrap().created_at, 1_149);
        assert_sorted(&stream);
    }

    #[test]
    fn test_late_insert_of_old_event_can_be_evicted_immediately() {
        let mut stream = MessageStream::new(3);
        stream.append(event(1, 30));
        stream.append(event(2, 40));
        stream.append(event(3, 50));
        // Older than everything retained; it lands at the front and the
        // front is what eviction removes.
        stream.append(event(4, 10));
        assert_eq!(stream.len(), 3);
        assert!(stream.find(4).is_none());
        assert_sorted(&stream);
    }

    #[test]
    fn test_find_hits_and_misses() {
        let mut stream = MessageStream::new(10);
        stream.append(event(1, 10));
        stream.append(event(2, 20));
        assert_eq!(stream.find(2).unwrap().created_at, 20);
        assert!(stream.find(99).is_none());
    }

    #[test]
    fn test_find_after_eviction_is_none_but_replies_stay_valid() {
        let mut stream = MessageStream::new(2);
        stream.append(event(1, 10));
        stream.append(event(2, 20));
        let mut reply = event(3, 30);
        reply.reply_to_id = Some(1);
        stream.append(reply);

        // Event 1 was evicted; the reply still references it.
        assert!(stream.find(1).is_none());
        assert_eq!(stream.find(3).unwrap().reply_to_id, Some(1));
    }

    #[test]
    fn test_all_returns_snapshot_not_view() {
        let mut stream = MessageStream::new(10);
        stream.append(event(1, 10));
        let snapshot = stream.all();
        stream.append(event(2, 20));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(stream.all().len(), 2);
    }
}
