//! Configuration for mcwire
//!
//! Centralized configuration with sensible defaults.

use crate::error::{Result, WireError};

/// Main configuration for encoders and the file provider
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // File Provider Configuration
    // -------------------------------------------------------------------------
    /// How often the monitor thread checks the watched file (milliseconds)
    pub poll_interval_ms: u64,

    /// Follow symlinks when fingerprinting the watched file.
    /// When false only the link itself is inspected.
    pub follow_symlinks: bool,

    // -------------------------------------------------------------------------
    // Encoder Configuration
    // -------------------------------------------------------------------------
    /// Largest value the binary request encoder accepts (in bytes)
    pub max_value_size: usize,

    // -------------------------------------------------------------------------
    // Logging Configuration
    // -------------------------------------------------------------------------
    /// Default `EnvFilter` directive when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
            follow_symlinks: true,
            max_value_size: 1024 * 1024, // 1 MB
            log_filter: "info,mcwire=debug".to_string(),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the values that would make the file provider or encoders misbehave
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(WireError::Config(
                "poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.max_value_size as u64 > u64::from(u32::MAX) {
            return Err(WireError::Config(format!(
                "max_value_size {} does not fit a 32-bit body length",
                self.max_value_size
            )));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the file poll interval (in milliseconds)
    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.poll_interval_ms = ms;
        self
    }

    /// Follow or ignore symlinks when watching
    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.config.follow_symlinks = follow;
        self
    }

    /// Set the maximum value size (in bytes)
    pub fn max_value_size(mut self, size: usize) -> Self {
        self.config.max_value_size = size;
        self
    }

    /// Set the default log filter
    pub fn log_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.log_filter = filter.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
