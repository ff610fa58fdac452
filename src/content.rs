//! Category-keyed message body generation.
//!
//! Pure functions over an injected RNG: no shared state, no failure modes.
//! Each category has its own template pool; a pool that somehow ends up
//! empty degrades to [`FALLBACK_LINE`] instead of producing an empty body.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::event::Category;

pub const FALLBACK_LINE: &str = "Great day for trading!";

const SYMBOLS: &[&str] = &[
    "BTC", "ETH", "SOL", "XRP", "ADA", "DOGE", "DOT", "LTC", "LINK", "AVAX",
];

const EXCHANGES: &[&str] = &["Binance", "Kraken", "Coinbase", "OKX", "Bybit", "KuCoin"];

const PRICE_TEMPLATES: &[&str] = &[
    "{sym} just moved {dir} {pct}% in the last hour",
    "watching {sym}, {dir} {pct}% already today",
    "{sym} {dir} {pct}%... anyone else riding this?",
    "my chart shows {sym} {dir} {pct}% since this morning",
];

const NEWS_TEMPLATES: &[&str] = &[
    "big news: {sym} foundation announced a new exchange partnership",
    "regulators are reviewing new rules for {sym} custody, worth a read",
    "heard a major {sym} protocol upgrade shipped last night",
    "another platform got hacked, glad my {sym} is here",
    "{sym} is trending everywhere after that announcement",
];

const WITHDRAWAL_TEMPLATES: &[&str] = &[
    "just withdrew {amt} {sym} to {exch}, took two minutes",
    "withdrawal of {amt} {sym} confirmed on {exch} already",
    "moved {amt} {sym} out to {exch} with no issues",
    "cashed out {amt} {sym} via {exch}, smooth as always",
];

const DEPOSIT_TEMPLATES: &[&str] = &[
    "deposited {amt} {sym} and staked it for {days} days",
    "just locked {amt} {sym} into the {days}-day plan",
    "topped up {amt} {sym}, going with {days} days staking",
    "put {amt} {sym} in for {days} days, the rates looked good",
];

const GENERAL_LINES: &[&str] = &[
    "good morning everyone",
    "anyone here from Europe?",
    "this market never sleeps lol",
    "first week here, liking it so far",
    "what are you all holding right now?",
    "slow day today huh",
    "the charts look wild this week",
    "hello from the night shift",
    "anyone tried the staking plans?",
    "gm gm",
    "been here three months, no complaints",
    "who else is up this late?",
    "coffee and candlesticks, perfect morning",
    "support answered me in minutes yesterday, impressed",
    "happy to be here, learning a lot from this chat",
];

fn choose<'a>(rng: &mut impl Rng, pool: &[&'a str]) -> &'a str {
    pool.choose(rng).copied().unwrap_or(FALLBACK_LINE)
}

fn symbol(rng: &mut impl Rng) -> &'static str {
    SYMBOLS.choose(rng).copied().unwrap_or("BTC")
}

fn price_body(rng: &mut impl Rng) -> String {
    let direction = if rng.gen_bool(0.5) { "up" } else { "down" };
    let magnitude = rng.gen_range(0.0..10.0);
    choose(rng, PRICE_TEMPLATES)
        .replace("{sym}", symbol(rng))
        .replace("{dir}", direction)
        .replace("{pct}", &format!("{magnitude:.2}"))
}

fn news_body(rng: &mut impl Rng) -> String {
    choose(rng, NEWS_TEMPLATES).replace("{sym}", symbol(rng))
}

fn withdrawal_body(rng: &mut impl Rng) -> String {
    let amount = rng.gen_range(0.1..5.1);
    choose(rng, WITHDRAWAL_TEMPLATES)
        .replace("{sym}", symbol(rng))
        .replace("{amt}", &format!("{amount:.3}"))
        .replace("{exch}", choose(rng, EXCHANGES))
}

fn deposit_body(rng: &mut impl Rng) -> String {
    let amount = rng.gen_range(0.5..10.5);
    let days: u32 = rng.gen_range(30..=365);
    choose(rng, DEPOSIT_TEMPLATES)
        .replace("{sym}", symbol(rng))
        .replace("{amt}", &format!("{amount:.3}"))
        .replace("{days}", &days.to_string())
}

/// Produce a plausible message body for `category`. Never empty.
pub fn generate_body(rng: &mut impl Rng, category: Category) -> String {
    let body = match category {
        Category::Price => price_body(rng),
        Category::News => news_body(rng),
        Category::Withdrawal => withdrawal_body(rng),
        Category::Deposit => deposit_body(rng),
        Category::General => choose(rng, GENERAL_LINES).to_string(),
    };
    if body.trim().is_empty() {
        FALLBACK_LINE.to_string()
    } else {
        body
    }
}
