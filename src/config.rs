// Worker configuration read from environment variables.
//
// Keys (all optional)
// - ASSOC_SYNC_BATCH_LIMIT          max raw events per poll, default 100
// - ASSOC_SYNC_MAX_ATTEMPTS         persist attempts per batch, default 3
// - ASSOC_SYNC_POLL_INTERVAL_MS     idle sleep between empty polls, default 250
// - ASSOC_SYNC_BUDGET_TOPIC, ASSOC_SYNC_CATEGORY_TOPIC,
//   ASSOC_SYNC_PAYMENT_METHOD_TOPIC                  container-side topics
// - ASSOC_SYNC_BUDGET_MEMBER_LINK_TOPIC, ASSOC_SYNC_CATEGORY_MEMBER_LINK_TOPIC,
//   ASSOC_SYNC_PAYMENT_METHOD_MEMBER_LINK_TOPIC      member-side topics

use crate::core::association::container::ContainerKind;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_POLL_INTERVAL_MS: u64 = 250;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub batch_limit: usize,
    pub max_attempts: u32,
    pub poll_interval: Duration,
    pub budget_topic: String,
    pub category_topic: String,
    pub payment_method_topic: String,
    pub budget_member_link_topic: String,
    pub category_member_link_topic: String,
    pub payment_method_member_link_topic: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            batch_limit: 100,
            max_attempts: 3,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            budget_topic: "budget-expense-links".to_string(),
            category_topic: "category-expense-links".to_string(),
            payment_method_topic: "payment-method-expense-links".to_string(),
            budget_member_link_topic: "expense-budget-links".to_string(),
            category_member_link_topic: "expense-category-links".to_string(),
            payment_method_member_link_topic: "expense-payment-method-links".to_string(),
        }
    }
}

impl SyncConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let batch_limit = positive(&lookup, "ASSOC_SYNC_BATCH_LIMIT", defaults.batch_limit)?;
        let max_attempts = positive(&lookup, "ASSOC_SYNC_MAX_ATTEMPTS", defaults.max_attempts)?;
        let poll_interval_ms =
            parsed(&lookup, "ASSOC_SYNC_POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL_MS)?;

        Ok(Self {
            batch_limit,
            max_attempts,
            poll_interval: Duration::from_millis(poll_interval_ms),
            budget_topic: lookup("ASSOC_SYNC_BUDGET_TOPIC").unwrap_or(defaults.budget_topic),
            category_topic: lookup("ASSOC_SYNC_CATEGORY_TOPIC").unwrap_or(defaults.category_topic),
            payment_method_topic: lookup("ASSOC_SYNC_PAYMENT_METHOD_TOPIC")
                .unwrap_or(defaults.payment_method_topic),
            budget_member_link_topic: lookup("ASSOC_SYNC_BUDGET_MEMBER_LINK_TOPIC")
                .unwrap_or(defaults.budget_member_link_topic),
            category_member_link_topic: lookup("ASSOC_SYNC_CATEGORY_MEMBER_LINK_TOPIC")
                .unwrap_or(defaults.category_member_link_topic),
            payment_method_member_link_topic: lookup("ASSOC_SYNC_PAYMENT_METHOD_MEMBER_LINK_TOPIC")
                .unwrap_or(defaults.payment_method_member_link_topic),
        })
    }

    pub fn topic_for(&self, kind: ContainerKind) -> &str {
        match kind {
            ContainerKind::Budget => &self.budget_topic,
            ContainerKind::Category => &self.category_topic,
            ContainerKind::PaymentMethod => &self.payment_method_topic,
        }
    }

    pub fn member_link_topic_for(&self, kind: ContainerKind) -> &str {
        match kind {
            ContainerKind::Budget => &self.budget_member_link_topic,
            ContainerKind::Category => &self.category_member_link_topic,
            ContainerKind::PaymentMethod => &self.payment_method_member_link_topic,
        }
    }
}

fn parsed<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|err: T::Err| ConfigError::Invalid {
            key,
            reason: err.to_string(),
            value,
        }),
    }
}

fn positive<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr + PartialEq + Default + std::fmt::Display,
    T::Err: std::fmt::Display,
{
    let value = parsed(lookup, key, default)?;
    if value == T::default() {
        return Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(value)
}
