//! Connection hub configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Channel capacities and liveness timing for the hub.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct HubConfig {
    /// Notifications that may wait for the router
    #[serde(default = "default_channel_capacity")]
    pub notify_capacity: usize,

    /// Chat messages that may wait for the router
    #[serde(default = "default_channel_capacity")]
    pub chat_capacity: usize,

    /// Frames that may wait for a single connection's writer. Must hold a
    /// full notify channel plus a full chat channel.
    #[serde(default = "default_max_pending")]
    pub max_pending: usize,

    /// Seconds a single write may take before the peer is dropped
    #[serde(default = "default_write_timeout")]
    pub write_timeout_secs: u64,

    /// Seconds between server pings
    #[serde(default = "default_ping_interval")]
    pub ping_interval_secs: u64,

    /// Seconds allowed for a pong before the connection is dropped
    #[serde(default = "default_pong_wait")]
    pub pong_wait_secs: u64,
}

impl HubConfig {
    /// Get ping interval as Duration
    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_secs)
    }

    /// Get pong wait as Duration
    pub fn pong_wait(&self) -> Duration {
        Duration::from_secs(self.pong_wait_secs)
    }

    /// Get write timeout as Duration
    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }

    /// Validate hub configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.notify_capacity == 0 {
            return Err(ValidationError::InvalidCapacity("notify_capacity"));
        }
        if self.chat_capacity == 0 {
            return Err(ValidationError::InvalidCapacity("chat_capacity"));
        }
        if self.max_pending < self.notify_capacity + self.chat_capacity {
            return Err(ValidationError::PendingLimitTooSmall(self.max_pending));
        }
        if self.write_timeout_secs == 0 {
            return Err(ValidationError::InvalidWriteTimeout);
        }
        if self.ping_interval_secs == 0 || self.ping_interval_secs >= self.pong_wait_secs {
            return Err(ValidationError::PingIntervalTooLong);
        }
        Ok(())
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            notify_capacity: default_channel_capacity(),
            chat_capacity: default_channel_capacity(),
            max_pending: default_max_pending(),
            write_timeout_secs: default_write_timeout(),
            ping_interval_secs: default_ping_interval(),
            pong_wait_secs: default_pong_wait(),
        }
    }
}

fn default_channel_capacity() -> usize {
    256
}

fn default_max_pending() -> usize {
    1024
}

fn default_write_timeout() -> u64 {
    10
}

fn default_ping_interval() -> u64 {
    30
}

fn default_pong_wait() -> u64 {
    60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hub_config_defaults() {
        let config = HubConfig::default();
        assert_eq!(config.notify_capacity, 256);
        assert_eq!(config.chat_capacity, 256);
        assert_eq!(config.max_pending, 1024);
        assert_eq!(config.write_timeout(), Duration::from_secs(10));
        assert_eq!(config.ping_interval(), Duration::from_secs(30));
        assert_eq!(config.pong_wait(), Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_capacity_fails() {
        let config = HubConfig {
            chat_capacity: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidCapacity("chat_capacity"))
        );
    }

    #[test]
    fn test_pending_limit_must_hold_both_channels() {
        let config = HubConfig {
            max_pending: 300,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::PendingLimitTooSmall(300))
        );
    }

    #[test]
    fn test_zero_write_timeout_fails() {
        let config = HubConfig {
            write_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidWriteTimeout));
    }

    #[test]
    fn test_ping_must_beat_pong_wait() {
        let config = HubConfig {
            ping_interval_secs: 60,
            pong_wait_secs: 60,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::PingIntervalTooLong));
    }
}
