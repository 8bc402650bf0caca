//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Number of sets in the cache
    pub number_of_sets: usize,
    /// Ways per set
    pub set_size: usize,
    /// HTTP server port
    pub server_port: u16,
    /// Interval in seconds between occupancy reports, 0 disables them
    pub stats_interval: u64,
}

/// Reads `name` from the environment, falling back to `default` when it is
/// unset or does not parse.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `NUMBER_OF_SETS` - Number of cache sets (default: 256)
    /// - `SET_SIZE` - Ways per set (default: 8)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `STATS_INTERVAL` - Occupancy report interval in seconds (default: 30)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            number_of_sets: env_or("NUMBER_OF_SETS", defaults.number_of_sets),
            set_size: env_or("SET_SIZE", defaults.set_size),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            stats_interval: env_or("STATS_INTERVAL", defaults.stats_interval),
        }
    }

    /// Total number of entries the configured cache can hold.
    pub fn capacity(&self) -> usize {
        self.number_of_sets.saturating_mul(self.set_size)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            number_of_sets: 256,
            set_size: 8,
            server_port: 3000,
            stats_interval: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.number_of_sets, 256);
        assert_eq!(config.set_size, 8);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.stats_interval, 30);
        assert_eq!(config.capacity(), 2048);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("NUMBER_OF_SETS");
        env::remove_var("SET_SIZE");
        env::remove_var("SERVER_PORT");
        env::remove_var("STATS_INTERVAL");

        let config = Config::from_env();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_env_or_falls_back_on_garbage() {
        env::set_var("NWAY_CACHE_TEST_GARBAGE", "not-a-number");
        env::set_var("NWAY_CACHE_TEST_NUMBER", "12");

        assert_eq!(env_or("NWAY_CACHE_TEST_GARBAGE", 7usize), 7);
        assert_eq!(env_or("NWAY_CACHE_TEST_NUMBER", 7usize), 12);
        assert_eq!(env_or("NWAY_CACHE_TEST_MISSING", 7usize), 7);

        env::remove_var("NWAY_CACHE_TEST_GARBAGE");
        env::remove_var("NWAY_CACHE_TEST_NUMBER");
    }
}
