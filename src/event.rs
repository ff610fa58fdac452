//! Chat event types.
//!
//! A [`MessageEvent`] is one immutable record in the feed, public or
//! private. Events are created by the background generator, by the local
//! user, or by the admin responder, and are destroyed only by
//! capacity-based eviction from the stream.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Unique, monotonically allocated event identifier.
pub type EventId = u64;

/// Content category of a feed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Withdrawal,
    Deposit,
    Price,
    News,
    General,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Withdrawal => "withdrawal",
            Category::Deposit => "deposit",
            Category::Price => "price",
            Category::News => "news",
            Category::General => "general",
        }
    }
}

/// Kind of media referenced by an [`Attachment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    Image,
    Video,
}

/// Reference to a media object carried alongside a message body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Attachment {
    pub kind: AttachmentKind,
    pub uri: String,
}

/// One immutable chat message record.
///
/// `created_at` is milliseconds since the Unix epoch. For delayed admin
/// replies it is computed as trigger time plus the configured delay, which
/// may land ahead of the wall clock at append time; the stream keeps the
/// feed sorted either way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MessageEvent {
    pub id: EventId,
    pub author_id: String,
    pub body: String,
    pub created_at: u64,
    pub category: Category,
    pub is_private: bool,
    pub recipient_id: Option<String>,
    pub reply_to_id: Option<EventId>,
    pub attachment: Option<Attachment>,
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serde_names() {
        let json = serde_json::to_string(&Category::Withdrawal).unwrap();
        assert_eq!(json, "\"withdrawal\"");
        let back: Category = serde_json::from_str("\"price\"").unwrap();
        assert_eq!(back, Category::Price);
    }

    #[test]
    fn test_event_round_trips_through_json() {
        let event = MessageEvent {
            id: 7,
            author_id: "guest-0001".to_string(),
            body: "hello".to_string(),
            created_at: 1_700_000_000_000,
            category: Category::General,
            is_private: false,
            recipient_id: None,
            reply_to_id: Some(3),
            attachment: Some(Attachment {
                kind: AttachmentKind::Image,
                uri: "avatars/female/004.png".to_string(),
            }),
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: MessageEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_now_millis_is_plausible() {
        // Anything after 2020-01-01 and monotonic-ish across two calls.
        let a = now_millis();
        let b = now_millis();
        assert!(a > 1_577_836_800_000);
        assert!(b >= a);
    }
}
