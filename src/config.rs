//! Startup configuration read from the environment.
use std::net::SocketAddr;

use chrono::Duration;
use thiserror::Error;

use crate::bank::{Money, parse_money};

/// The size of the channel for queuing ATM commands.
const DEFAULT_CHANNEL_SIZE: usize = 100;
const DEFAULT_PIN: &str = "1234";
const DEFAULT_OPENING_BALANCE: &str = "500.00";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";
const DEFAULT_SESSION_TTL_SECS: i64 = 15 * 60;
const PIN_LENGTH: usize = 4;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

impl ConfigError {
    fn invalid(key: &'static str, message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            key,
            message: message.into(),
        }
    }
}

/// Settings for one ATM process.
#[derive(Debug, Clone)]
pub struct AtmConfig {
    pub pin: String,
    pub opening_balance: Money,
    pub bind_addr: SocketAddr,
    pub session_ttl: Duration,
    pub channel_size: usize,
}

impl AtmConfig {
    /// Reads `ATM_PIN`, `ATM_OPENING_BALANCE`, `ATM_BIND_ADDR`,
    /// `ATM_SESSION_TTL_SECS` and `ATM_CHANNEL_SIZE`. Unset variables take
    /// their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AtmConfig::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let pin = get("ATM_PIN", DEFAULT_PIN);
        if pin.len() != PIN_LENGTH || !pin.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ConfigError::invalid(
                "ATM_PIN",
                format!("expected {PIN_LENGTH} digits"),
            ));
        }

        let opening_balance = parse_money(&get("ATM_OPENING_BALANCE", DEFAULT_OPENING_BALANCE))
            .map_err(|err| ConfigError::invalid("ATM_OPENING_BALANCE", err.to_string()))?;
        if opening_balance < 0 {
            return Err(ConfigError::invalid(
                "ATM_OPENING_BALANCE",
                "must not be negative",
            ));
        }

        let bind_addr = get("ATM_BIND_ADDR", DEFAULT_BIND_ADDR)
            .parse()
            .map_err(|err: std::net::AddrParseError| {
                ConfigError::invalid("ATM_BIND_ADDR", err.to_string())
            })?;

        let ttl_secs = positive(
            "ATM_SESSION_TTL_SECS",
            lookup("ATM_SESSION_TTL_SECS"),
            DEFAULT_SESSION_TTL_SECS,
        )?;

        let channel_size = positive(
            "ATM_CHANNEL_SIZE",
            lookup("ATM_CHANNEL_SIZE"),
            DEFAULT_CHANNEL_SIZE as i64,
        )?;

        Ok(AtmConfig {
            pin,
            opening_balance,
            bind_addr,
            session_ttl: Duration::seconds(ttl_secs),
            channel_size: channel_size as usize,
        })
    }
}

fn positive(key: &'static str, value: Option<String>, default: i64) -> Result<i64, ConfigError> {
    let Some(raw) = value else {
        return Ok(default);
    };
    match raw.trim().parse::<i64>() {
        Ok(n) if n > 0 && n <= u32::MAX as i64 => Ok(n),
        Ok(_) => Err(ConfigError::invalid(key, "must be a positive number")),
        Err(err) => Err(ConfigError::invalid(key, err.to_string())),
    }
}
