//! Client configuration loaded from environment variables.
//!
//! Every setting has a default so the client runs with zero configuration.

use std::path::PathBuf;
use std::time::Duration;

use swiftdash_shared::constants::{
    DEFAULT_AUTH_DELAY_MS, DEFAULT_MESSAGE_LOAD_DELAY_MS, DEFAULT_REPLY_DELAY_MAX_MS,
    DEFAULT_REPLY_DELAY_MIN_MS, DEFAULT_REPLY_PROBABILITY,
};

/// Client configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// SQLite file holding the durable session slot.
    /// Env: `SWIFTDASH_DB_PATH`
    /// Default: `None` (platform data directory).
    pub db_path: Option<PathBuf>,

    /// Simulated latency of login and registration.
    /// Env: `SWIFTDASH_AUTH_DELAY_MS`
    pub auth_delay: Duration,

    /// Simulated latency of loading a conversation's message log.
    /// Env: `SWIFTDASH_MESSAGE_LOAD_DELAY_MS`
    pub message_load_delay: Duration,

    /// Lower bound of the auto-reply delay.
    /// Env: `SWIFTDASH_REPLY_DELAY_MIN_MS`
    pub reply_delay_min: Duration,

    /// Upper bound of the auto-reply delay.
    /// Env: `SWIFTDASH_REPLY_DELAY_MAX_MS`
    pub reply_delay_max: Duration,

    /// Probability in `[0, 1]` that a sent message gets an auto-reply.
    /// Env: `SWIFTDASH_REPLY_PROBABILITY`
    pub reply_probability: f64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            auth_delay: Duration::from_millis(DEFAULT_AUTH_DELAY_MS),
            message_load_delay: Duration::from_millis(DEFAULT_MESSAGE_LOAD_DELAY_MS),
            reply_delay_min: Duration::from_millis(DEFAULT_REPLY_DELAY_MIN_MS),
            reply_delay_max: Duration::from_millis(DEFAULT_REPLY_DELAY_MAX_MS),
            reply_probability: DEFAULT_REPLY_PROBABILITY,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] over an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup("SWIFTDASH_DB_PATH") {
            if !path.is_empty() {
                config.db_path = Some(PathBuf::from(path));
            }
        }

        if let Some(delay) = parse_millis(&lookup, "SWIFTDASH_AUTH_DELAY_MS") {
            config.auth_delay = delay;
        }
        if let Some(delay) = parse_millis(&lookup, "SWIFTDASH_MESSAGE_LOAD_DELAY_MS") {
            config.message_load_delay = delay;
        }
        if let Some(delay) = parse_millis(&lookup, "SWIFTDASH_REPLY_DELAY_MIN_MS") {
            config.reply_delay_min = delay;
        }
        if let Some(delay) = parse_millis(&lookup, "SWIFTDASH_REPLY_DELAY_MAX_MS") {
            config.reply_delay_max = delay;
        }

        if let Some(val) = lookup("SWIFTDASH_REPLY_PROBABILITY") {
            match val.parse::<f64>() {
                Ok(p) if (0.0..=1.0).contains(&p) => config.reply_probability = p,
                _ => tracing::warn!(
                    value = %val,
                    "Invalid SWIFTDASH_REPLY_PROBABILITY, using default"
                ),
            }
        }

        config.normalised()
    }

    /// Swap reversed reply bounds.
    pub fn normalised(mut self) -> Self {
        if self.reply_delay_min > self.reply_delay_max {
            std::mem::swap(&mut self.reply_delay_min, &mut self.reply_delay_max);
        }
        self
    }

    /// Zero delays, no auto-replies. Used by tests and scripted runs.
    pub fn instant() -> Self {
        Self {
            db_path: None,
            auth_delay: Duration::ZERO,
            message_load_delay: Duration::ZERO,
            reply_delay_min: Duration::ZERO,
            reply_delay_max: Duration::ZERO,
            reply_probability: 0.0,
        }
    }
}

fn parse_millis<F>(lookup: &F, key: &str) -> Option<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    let val = lookup(key)?;
    match val.parse::<u64>() {
        Ok(ms) => Some(Duration::from_millis(ms)),
        Err(_) => {
            tracing::warn!(key, value = %val, "Invalid millisecond value, using default");
            None
        }
    }
}
