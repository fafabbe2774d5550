//! `[watch]` section configuration.
//!
//! ```toml
//! [watch]
//! debounce_ms = 100   # quiet period before a burst of fs events is handled
//! ```

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Development watch settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatchConfig {
    /// Debounce window in milliseconds.
    pub debounce_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { debounce_ms: 100 }
    }
}

impl WatchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.debounce_ms == 0 {
            return Err(ConfigError::validation(
                "watch.debounce_ms",
                "must be greater than 0",
            ));
        }
        Ok(())
    }

    pub fn debounce(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_debounce_rejected() {
        assert!(WatchConfig { debounce_ms: 0 }.validate().is_err());
        assert!(WatchConfig::default().validate().is_ok());
    }
}
