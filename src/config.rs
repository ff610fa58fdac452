//! Engine configuration.
//!
//! All simulation parameters live here with serde defaults, so a caller can
//! deserialize a partial TOML file and get the reference behaviour for
//! everything left unspecified. An explicit `seed` makes roster and content
//! generation deterministic.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::event::Category;

fn default_roster_size() -> usize {
    500
}

fn default_active_set_size() -> usize {
    50
}

fn default_rotation_swap_size() -> usize {
    5
}

fn default_stream_cap() -> usize {
    100
}

fn default_message_interval_ms() -> u64 {
    3_000
}

fn default_rotation_interval_ms() -> u64 {
    300_000
}

fn default_reply_delay_ms() -> u64 {
    2_000
}

fn default_commentary_delay_ms() -> u64 {
    30_000
}

/// Relative weights for the background generator's category choice.
/// Normalized at sample time, so they need not sum to 1.0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryWeights {
    #[serde(default = "default_general_weight")]
    pub general: f64,
    #[serde(default = "default_price_weight")]
    pub price: f64,
    #[serde(default = "default_news_weight")]
    pub news: f64,
    #[serde(default = "default_deposit_weight")]
    pub deposit: f64,
    #[serde(default = "default_withdrawal_weight")]
    pub withdrawal: f64,
}

fn default_general_weight() -> f64 {
    0.35
}

fn default_price_weight() -> f64 {
    0.20
}

fn default_news_weight() -> f64 {
    0.15
}

fn default_deposit_weight() -> f64 {
    0.15
}

fn default_withdrawal_weight() -> f64 {
    0.15
}

impl Default for CategoryWeights {
    fn default() -> Self {
        CategoryWeights {
            general: default_general_weight(),
            price: default_price_weight(),
            news: default_news_weight(),
            deposit: default_deposit_weight(),
            withdrawal: default_withdrawal_weight(),
        }
    }
}

impl CategoryWeights {
    /// Normalize weights so they sum to 1.0. Falls back to all-general when
    /// every weight is zero or negative.
    pub fn normalized(&self) -> [(Category, f64); 5] {
        let entries = [
            (Category::General, self.general.max(0.0)),
            (Category::Price, self.price.max(0.0)),
            (Category::News, self.news.max(0.0)),
            (Category::Deposit, self.deposit.max(0.0)),
            (Category::Withdrawal, self.withdrawal.max(0.0)),
        ];
        let total: f64 = entries.iter().map(|(_, w)| w).sum();
        if total <= 0.0 {
            return [
                (Category::General, 1.0),
                (Category::Price, 0.0),
                (Category::News, 0.0),
                (Category::Deposit, 0.0),
                (Category::Withdrawal, 0.0),
            ];
        }
        entries.map(|(category, weight)| (category, weight / total))
    }

    /// Sample a category from a uniform draw in [0, 1).
    pub fn sample(&self, random_value: f64) -> Category {
        let entries = self.normalized();
        let mut cumulative = 0.0;
        for (category, weight) in entries {
            cumulative += weight;
            if random_value < cumulative {
                return category;
            }
        }
        Category::General
    }
}

/// Full engine configuration. Every field has a serde default matching the
/// reference deployment, so `ChatConfig::default()` and an empty TOML file
/// produce the same engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Number of synthetic identities manufactured at start (admin excluded).
    #[serde(default = "default_roster_size")]
    pub roster_size: usize,
    /// Size of the rotating "currently online" subset.
    #[serde(default = "default_active_set_size")]
    pub active_set_size: usize,
    /// How many active members are swapped out per rotation tick.
    #[serde(default = "default_rotation_swap_size")]
    pub rotation_swap_size: usize,
    /// Maximum number of retained feed events; oldest are evicted first.
    #[serde(default = "default_stream_cap")]
    pub stream_cap: usize,
    /// Period of background message production.
    #[serde(default = "default_message_interval_ms")]
    pub message_interval_ms: u64,
    /// Period of active-set rotation.
    #[serde(default = "default_rotation_interval_ms")]
    pub rotation_interval_ms: u64,
    /// Delay before the admin reacts to a local-user message.
    #[serde(default = "default_reply_delay_ms")]
    pub reply_delay_ms: u64,
    /// Delay before the admin comments on a background withdrawal.
    #[serde(default = "default_commentary_delay_ms")]
    pub commentary_delay_ms: u64,
    #[serde(default)]
    pub category_weights: CategoryWeights,
    /// Seed for all roster/content generation. `None` seeds from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        ChatConfig {
            roster_size: default_roster_size(),
            active_set_size: default_active_set_size(),
            rotation_swap_size: default_rotation_swap_size(),
            stream_cap: default_stream_cap(),
            message_interval_ms: default_message_interval_ms(),
            rotation_interval_ms: default_rotation_interval_ms(),
            reply_delay_ms: default_reply_delay_ms(),
            commentary_delay_ms: default_commentary_delay_ms(),
            category_weights: CategoryWeights::default(),
            seed: None,
        }
    }
}

impl ChatConfig {
    pub fn message_interval(&self) -> Duration {
        Duration::from_millis(self.message_interval_ms)
    }

    pub fn rotation_interval(&self) -> Duration {
        Duration::from_millis(self.rotation_interval_ms)
    }

    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }

    pub fn commentary_delay(&self) -> Duration {
        Duration::from_millis(self.commentary_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_yields_reference_defaults() {
        let config: ChatConfig = toml::from_str("").unwrap();
        assert_eq!(config.roster_size, 500);
        assert_eq!(config.active_set_size, 50);
        assert_eq!(config.rotation_swap_size, 5);
        assert_eq!(config.stream_cap, 100);
        assert_eq!(config.message_interval_ms, 3_000);
        assert_eq!(config.rotation_interval_ms, 300_000);
        assert_eq!(config.reply_delay_ms, 2_000);
        assert_eq!(config.commentary_delay_ms, 30_000);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_partial_toml_overrides_only_named_fields() {
        let config: ChatConfig = toml::from_str(
            r#"
            roster_size = 10
            seed = 42

            [category_weights]
            general = 1.0
            price = 0.0
            news = 0.0
            deposit = 0.0
            withdrawal = 0.0
            "#,
        )
        .unwrap();
        assert_eq!(config.roster_size, 10);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.stream_cap, 100);
        assert_eq!(config.category_weights.sample(0.99), Category::General);
    }

    #[test]
    fn test_weights_normalize_to_unit_sum() {
        let weights = CategoryWeights::default();
        let total: f64 = weights.normalized().iter().map(|(_, w)| w).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_weights_fall_back_to_general() {
        let weights = CategoryWeights {
            general: 0.0,
            price: 0.0,
            news: 0.0,
            deposit: 0.0,
            withdrawal: -3.0,
        };
        assert_eq!(weights.sample(0.0), Category::General);
        assert_eq!(weights.sample(0.999), Category::General);
    }

    #[test]
    fn test_sample_covers_all_categories() {
        let weights = CategoryWeights::default();
        // Cumulative order is general, price, news, deposit, withdrawal.
        assert_eq!(weights.sample(0.0), Category::General);
        assert_eq!(weights.sample(0.40), Category::Price);
        assert_eq!(weights.sample(0.60), Category::News);
        assert_eq!(weights.sample(0.75), Category::Deposit);
        assert_eq!(weights.sample(0.99), Category::Withdrawal);
    }
}
