//! Environment configuration for binaries embedding the coordinator.

use std::time::Duration;

use crate::coordinator::{CoordinatorBuilder, DEFAULT_REQUEST_TIMEOUT, DEFAULT_UPDATE_INTERVAL};
use crate::logger::MessageLogMode;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Controller address, `host` or `host:port`.
    pub host: String,
    pub protocol: String,
    pub update_interval: Duration,
    pub request_timeout: Duration,
    /// NDJSON log of every exchange, written in full.
    pub message_log: Option<String>,
}

impl Config {
    /// Reads `MYAIR3_HOST` (required), `MYAIR3_PROTOCOL`, `MYAIR3_INTERVAL_SECS`,
    /// `MYAIR3_TIMEOUT_SECS` and `MYAIR3_MESSAGE_LOG`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = non_empty("MYAIR3_HOST")
            .ok_or_else(|| Error::Config("MYAIR3_HOST is not set".to_string()))?;
        let protocol = non_empty("MYAIR3_PROTOCOL").unwrap_or_else(|| "http".to_string());

        let secs = |key: &str, default: Duration| -> Result<Duration> {
            match non_empty(key) {
                Some(v) => v
                    .trim()
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|_| Error::Config(format!("{key} must be a whole number of seconds"))),
                None => Ok(default),
            }
        };

        Ok(Config {
            host: host.trim().to_string(),
            protocol,
            update_interval: secs("MYAIR3_INTERVAL_SECS", DEFAULT_UPDATE_INTERVAL)?,
            request_timeout: secs("MYAIR3_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT)?,
            message_log: non_empty("MYAIR3_MESSAGE_LOG"),
        })
    }

    pub fn builder(&self) -> CoordinatorBuilder {
        let builder = CoordinatorBuilder::new(self.host.clone())
            .protocol(&self.protocol)
            .update_interval(self.update_interval)
            .request_timeout(self.request_timeout);
        match self.message_log {
            Some(ref path) => builder.message_log(MessageLogMode::Full, path.clone()),
            None => builder,
        }
    }
}
