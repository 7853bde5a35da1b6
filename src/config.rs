//! # Engine Configuration
//!
//! Environment-aware configuration loading for the reservation engine.
//! Values come from an optional YAML file (base plus per-environment
//! override) merged with `BOOKING_CORE__*` environment variables; every
//! field carries a safe default so a bare deployment needs no file at all.
//!
//! ## Usage
//!
//! ```rust
//! use booking_core::config::BookingCoreConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BookingCoreConfig::load()?;
//! assert!(config.engine.reserve_retry_attempts >= 1);
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::constants::system;
use crate::error::{ReservationError, ReservationResult};
use crate::realtime::PublisherConfig;
use crate::reservations::CoordinatorConfig;

/// Root configuration for the reservation engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingCoreConfig {
    /// Atomic-section retry policy
    pub engine: EngineConfig,
    /// Occupancy broadcast tuning
    pub events: EventsConfig,
}

impl Default for BookingCoreConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            events: EventsConfig::default(),
        }
    }
}

/// Retry policy for storage conflicts inside the atomic section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Bounded retry budget; terminal errors are never retried
    pub reserve_retry_attempts: u32,
    /// Delay between retries, in milliseconds
    pub reserve_retry_delay_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reserve_retry_attempts: system::DEFAULT_RESERVE_RETRY_ATTEMPTS,
            reserve_retry_delay_ms: system::DEFAULT_RESERVE_RETRY_DELAY_MS,
        }
    }
}

impl EngineConfig {
    /// Build the coordinator's runtime policy from this section
    pub fn coordinator_config(&self) -> CoordinatorConfig {
        CoordinatorConfig {
            reserve_retry_attempts: self.reserve_retry_attempts,
            reserve_retry_delay: Duration::from_millis(self.reserve_retry_delay_ms),
        }
    }
}

/// Occupancy broadcast tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Per-connection delivery timeout, in milliseconds
    pub publish_timeout_ms: u64,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            publish_timeout_ms: system::DEFAULT_PUBLISH_TIMEOUT_MS,
        }
    }
}

impl EventsConfig {
    /// Build the publisher's runtime policy from this section
    pub fn publisher_config(&self) -> PublisherConfig {
        PublisherConfig {
            delivery_timeout: Duration::from_millis(self.publish_timeout_ms),
        }
    }
}

impl BookingCoreConfig {
    /// Load configuration with environment auto-detection
    pub fn load() -> ReservationResult<Self> {
        let environment = detect_environment();
        let settings = Config::builder()
            .add_source(File::with_name("config/booking-core").required(false))
            .add_source(
                File::with_name(&format!("config/booking-core.{environment}")).required(false),
            )
            .add_source(Environment::with_prefix("BOOKING_CORE").separator("__"))
            .build()?;

        let config: BookingCoreConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from an explicit file, useful for tests
    pub fn load_from_file(path: &Path) -> ReservationResult<Self> {
        let settings = Config::builder()
            .add_source(File::from(path).required(true))
            .build()?;

        let config: BookingCoreConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that would disable required behavior
    pub fn validate(&self) -> ReservationResult<()> {
        if self.engine.reserve_retry_attempts == 0 {
            return Err(ReservationError::configuration(
                "engine",
                "reserve_retry_attempts must be at least 1",
            ));
        }
        if self.events.publish_timeout_ms == 0 {
            return Err(ReservationError::configuration(
                "events",
                "publish_timeout_ms must be positive",
            ));
        }
        Ok(())
    }
}

/// Current environment from environment variables, defaulting to development
pub fn detect_environment() -> String {
    std::env::var("BOOKING_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .or_else(|_| std::env::var("NODE_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = BookingCoreConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.engine.reserve_retry_attempts,
            system::DEFAULT_RESERVE_RETRY_ATTEMPTS
        );
        assert_eq!(
            config.events.publish_timeout_ms,
            system::DEFAULT_PUBLISH_TIMEOUT_MS
        );
    }

    #[test]
    fn test_validation_rejects_zero_retries() {
        let mut config = BookingCoreConfig::default();
        config.engine.reserve_retry_attempts = 0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ReservationError::Configuration { .. }));
    }

    #[test]
    fn test_load_from_yaml_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".yaml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            "engine:\n  reserve_retry_attempts: 5\n  reserve_retry_delay_ms: 10\nevents:\n  publish_timeout_ms: 100\n"
        )
        .unwrap();

        let config = BookingCoreConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.engine.reserve_retry_attempts, 5);
        assert_eq!(config.engine.reserve_retry_delay_ms, 10);
        assert_eq!(config.events.publish_timeout_ms, 100);

        let coordinator = config.engine.coordinator_config();
        assert_eq!(coordinator.reserve_retry_delay, Duration::from_millis(10));
    }
}
