/*!
 * Future Configuration
 *
 * Runtime policies for the conditions the bare protocol leaves open:
 * oversized values and repeated `set` calls.
 */

use crate::core::limits::{DEFAULT_WAITER_CAPACITY, MAX_FUTURE_CAPACITY};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::warn;

/// What `set` does with a value whose length differs from the capacity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthPolicy {
    /// Fail with `SizeMismatch` when the value is longer than the capacity
    #[default]
    Reject,
    /// Keep only the first `capacity` bytes
    Truncate,
    /// Accept only values of exactly `capacity` bytes
    ExactOnly,
}

/// What a second `set` on a ready future does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetPolicy {
    /// Replace the stored value; no waiter is woken again
    #[default]
    Overwrite,
    /// Fail with `AlreadySet`
    RejectSecond,
}

impl FromStr for LengthPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "truncate" => Ok(Self::Truncate),
            "exact" | "exact_only" => Ok(Self::ExactOnly),
            other => Err(format!("unknown length policy '{}'", other)),
        }
    }
}

impl FromStr for SetPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "overwrite" => Ok(Self::Overwrite),
            "reject" | "reject_second" => Ok(Self::RejectSecond),
            other => Err(format!("unknown set policy '{}'", other)),
        }
    }
}

/// Future manager configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FutureConfig {
    pub length_policy: LengthPolicy,
    pub set_policy: SetPolicy,
    /// Largest capacity `create` accepts
    pub max_capacity: usize,
    /// Waiter slots reserved when a future is created
    pub waiter_capacity_hint: usize,
}

impl Default for FutureConfig {
    fn default() -> Self {
        Self {
            length_policy: LengthPolicy::Reject,
            set_policy: SetPolicy::Overwrite,
            max_capacity: MAX_FUTURE_CAPACITY,
            waiter_capacity_hint: DEFAULT_WAITER_CAPACITY,
        }
    }
}

impl FutureConfig {
    /// Strictly single-shot futures holding exactly-sized values
    pub fn strict() -> Self {
        Self {
            length_policy: LengthPolicy::ExactOnly,
            set_policy: SetPolicy::RejectSecond,
            ..Self::default()
        }
    }

    /// Defaults overridden by environment variables
    ///
    /// - FUTURE_LENGTH_POLICY: reject | truncate | exact
    /// - FUTURE_SET_POLICY: overwrite | reject
    /// - FUTURE_MAX_CAPACITY: bytes
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(policy) = env_parse::<LengthPolicy>("FUTURE_LENGTH_POLICY") {
            config.length_policy = policy;
        }
        if let Some(policy) = env_parse::<SetPolicy>("FUTURE_SET_POLICY") {
            config.set_policy = policy;
        }
        if let Some(max) = env_parse::<usize>("FUTURE_MAX_CAPACITY") {
            config.max_capacity = max;
        }

        config
    }
}

fn env_parse<T>(key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, value = %raw, error = %e, "Ignoring invalid configuration value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policies() {
        let config = FutureConfig::default();
        assert_eq!(config.length_policy, LengthPolicy::Reject);
        assert_eq!(config.set_policy, SetPolicy::Overwrite);
        assert_eq!(config.max_capacity, MAX_FUTURE_CAPACITY);
    }

    #[test]
    fn test_strict_preset() {
        let config = FutureConfig::strict();
        assert_eq!(config.length_policy, LengthPolicy::ExactOnly);
        assert_eq!(config.set_policy, SetPolicy::RejectSecond);
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("Truncate".parse::<LengthPolicy>(), Ok(LengthPolicy::Truncate));
        assert_eq!("exact".parse::<LengthPolicy>(), Ok(LengthPolicy::ExactOnly));
        assert_eq!("reject".parse::<SetPolicy>(), Ok(SetPolicy::RejectSecond));
        assert!("sometimes".parse::<SetPolicy>().is_err());
    }
}
