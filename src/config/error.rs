//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),

    #[error("Invalid log filter directive: {0}")]
    InvalidLogFilter(String),

    #[error("CORS origin must include an http(s) scheme: {0}")]
    InvalidCorsOrigin(String),

    #[error("JWT secret must be at least {0} bytes in production")]
    WeakJwtSecret(usize),

    #[error("Hub capacity must be greater than zero: {0}")]
    InvalidCapacity(&'static str),

    #[error("Ping interval must be shorter than the pong wait")]
    PingIntervalTooLong,

    #[error("Per-connection pending limit {0} is smaller than the hub channels")]
    PendingLimitTooSmall(usize),

    #[error("Write timeout must be greater than zero")]
    InvalidWriteTimeout,

    #[error("Directory seed file not found: {0}")]
    SeedFileMissing(String),
}
