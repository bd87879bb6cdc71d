//! Login throttling.
//!
//! The auth routes sit behind a token bucket keyed by client IP. The key is
//! taken from `X-Forwarded-For`/`X-Real-IP`/`Forwarded` when a proxy sets
//! them, and from the peer address otherwise.
//!
//! - `RATE_LIMIT_ENABLED`: default `true`
//! - `RATE_LIMIT_AUTH_PER_SECOND`: seconds between token refills, default 2
//! - `RATE_LIMIT_AUTH_BURST`: bucket size, default 5

use anyhow::anyhow;
use tower_governor::governor::{GovernorConfig, GovernorConfigBuilder};
use tower_governor::key_extractor::SmartIpKeyExtractor;

use crate::env_or;

pub type AuthGovernorConfig =
    GovernorConfig<SmartIpKeyExtractor, ::governor::middleware::NoOpMiddleware>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub auth_per_second: u64,
    pub auth_burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            auth_per_second: 2,
            auth_burst_size: 5,
        }
    }
}

impl RateLimitConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: env_or("RATE_LIMIT_ENABLED", defaults.enabled),
            auth_per_second: env_or("RATE_LIMIT_AUTH_PER_SECOND", defaults.auth_per_second),
            auth_burst_size: env_or("RATE_LIMIT_AUTH_BURST", defaults.auth_burst_size),
        }
    }

    /// A configuration that never throttles, for tests.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn auth_governor_config(&self) -> anyhow::Result<AuthGovernorConfig> {
        GovernorConfigBuilder::default()
            .per_second(self.auth_per_second)
            .burst_size(self.auth_burst_size)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow!("rate limit period and burst size must be non-zero"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RateLimitConfig::default();
        assert!(config.enabled);
        assert_eq!(config.auth_per_second, 2);
        assert_eq!(config.auth_burst_size, 5);
    }

    #[test]
    fn test_disabled() {
        assert!(!RateLimitConfig::disabled().enabled);
    }

    #[test]
    fn test_zero_burst_is_rejected() {
        let config = RateLimitConfig {
            auth_burst_size: 0,
            ..RateLimitConfig::default()
        };
        assert!(config.auth_governor_config().is_err());
        assert!(RateLimitConfig::default().auth_governor_config().is_ok());
    }
}
