//! # Classbook Config
//!
//! Environment-driven configuration. Every struct has a `from_env()` that
//! falls back to development defaults, so a bare `.env` with only
//! `DATABASE_URL` is enough to boot.
//!
//! - [`jwt`]: token secret and lifetimes
//! - [`cors`]: allowed browser origins
//! - [`rate_limit`]: login throttling
//! - [`server`]: bind address

pub mod cors;
pub mod jwt;
pub mod rate_limit;
pub mod server;

pub use cors::CorsConfig;
pub use jwt::JwtConfig;
pub use rate_limit::RateLimitConfig;
pub use server::ServerConfig;

/// Reads and parses an environment variable, falling back to `default` when
/// it is unset or unparsable.
pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
