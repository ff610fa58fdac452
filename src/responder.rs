//! Canned replies for the admin bot.
//!
//! The admin reacts to local-user messages and comments on background
//! withdrawals; it never reacts to its own output or to other synthetic
//! events, so no reply can ever trigger another reply. Pools are static and
//! selection is uniform; an empty pool degrades to a default line.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::event::{Category, MessageEvent};
use crate::identity::ADMIN_ID;

const DEFAULT_REPLY: &str = "Thanks for your message, we are here to help.";

const GENERAL_REPLIES: &[&str] = &[
    "Thanks for reaching out! Let us know if you need anything.",
    "Welcome to the conversation, glad to have you here.",
    "Good question - feel free to message support any time.",
    "We are around 24/7 if anything comes up.",
    "Appreciate the feedback, keep it coming!",
];

const WITHDRAWAL_REPLIES: &[&str] = &[
    "Withdrawals are processed around the clock, usually within minutes.",
    "Nice one! Withdrawal confirmations land fast here.",
    "Another smooth withdrawal - that is what we like to see.",
    "Remember to double-check your destination address on withdrawals.",
];

const DEPOSIT_REPLIES: &[&str] = &[
    "Deposits are credited as soon as the network confirms them.",
    "Great choice on the staking duration, enjoy the returns!",
    "Your funds start earning from the first confirmed block.",
    "Longer staking windows get the better rates, well played.",
];

const WELCOME_LINES: &[&str] = &[
    "Welcome aboard! Say hello to the room whenever you like.",
    "Great to see a new face here - the room is friendly, jump in!",
    "Welcome! Ask anything, the community and support are both here.",
];

fn choose(rng: &mut impl Rng, pool: &[&str]) -> String {
    pool.choose(rng).copied().unwrap_or(DEFAULT_REPLY).to_string()
}

/// Whether `event` should trigger an admin reply: only events authored by
/// the local user qualify. Admin and background-synthetic authors never do,
/// which keeps reply depth at exactly one.
pub fn should_reply(event: &MessageEvent, local_user_id: &str) -> bool {
    event.author_id == local_user_id && event.author_id != ADMIN_ID
}

/// Reply body for a trigger of the given category. Withdrawal and deposit
/// triggers get their dedicated pools; everything else gets the general one.
pub fn reply_body(rng: &mut impl Rng, category: Category) -> String {
    match category {
        Category::Withdrawal => choose(rng, WITHDRAWAL_REPLIES),
        Category::Deposit => choose(rng, DEPOSIT_REPLIES),
        _ => choose(rng, GENERAL_REPLIES),
    }
}

/// One-time welcome line for the first visibility-open.
pub fn welcome_body(rng: &mut impl Rng) -> String {
    choose(rng, WELCOME_LINES)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn event_from(author: &str) -> MessageEvent {
        MessageEvent {
            id: 1,
            author_id: author.to_string(),
            body: "hi".to_string(),
            created_at: 1,
            category: Category::General,
            is_private: false,
            recipient_id: None,
            reply_to_id: None,
            attachment: None,
        }
    }

    #[test]
    fn test_only_local_user_triggers_replies() {
        assert!(should_reply(&event_from("user-1"), "user-1"));
        assert!(!should_reply(&event_from("guest-0001"), "user-1"));
        assert!(!should_reply(&event_from(ADMIN_ID), "user-1"));
    }

    #[test]
    fn test_admin_as_local_user_never_self_replies() {
        // Degenerate wiring: even if the caller hands us the admin id as the
        // local user, the responder must not create a reply loop.
        assert!(!should_reply(&event_from(ADMIN_ID), ADMIN_ID));
    }

    #[test]
    fn test_reply_pools_keyed_by_category() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..20 {
            let body = reply_body(&mut rng, Category::Withdrawal);
            assert!(WITHDRAWAL_REPLIES.contains(&body.as_str()));
            let body = reply_body(&mut rng, Category::Deposit);
            assert!(DEPOSIT_REPLIES.contains(&body.as_str()));
            let body = reply_body(&mut rng, Category::General);
            assert!(GENERAL_REPLIES.contains(&body.as_str()));
            // Price and news fall through to the general pool.
            let body = reply_body(&mut rng, Category::Price);
            assert!(GENERAL_REPLIES.contains(&body.as_str()));
        }
    }

    #[test]
    fn test_welcome_comes_from_welcome_pool() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        for _ in 0..10 {
            let body = welcome_body(&mut rng);
            assert!(WELCOME_LINES.contains(&body.as_str()));
        }
    }

    #[test]
    fn test_replies_are_never_empty() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for category in [
            Category::Withdrawal,
            Category::Deposit,
            Category::Price,
            Category::News,
            Category::General,
        ] {
            assert!(!reply_body(&mut rng, category).trim().is_empty());
        }
    }
}
