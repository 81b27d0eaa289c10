//! Engine configuration.
//!
//! Nested config sections with defaults carrying the design values: a 30
//! second ring timeout on staff dials, a 30 minute session TTL, and digit
//! `0` reserved for the emergency path.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{ReceptionError, Result};

/// Top-level configuration for the reception engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceptionConfig {
    pub general: GeneralConfig,
    pub session: SessionConfig,
    pub transfer: TransferConfig,
}

impl ReceptionConfig {
    /// Load from a JSON file. Missing sections take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ReceptionError::config(format!("cannot read {}: {e}", path.as_ref().display()))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            ReceptionError::config(format!("invalid config {}: {e}", path.as_ref().display()))
        })
    }
}

/// General engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Base URL the provider posts dial outcomes back to.
    pub callback_base_url: String,
    /// Reserved in-band digit that triggers the emergency path from any
    /// state. The highest-priority signal in the system.
    pub emergency_digit: char,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            callback_base_url: "http://127.0.0.1:8080/signal/outcome".to_string(),
            emergency_digit: '0',
        }
    }
}

/// Session store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Idle age after which a session is swept.
    pub ttl_secs: u64,
    /// Interval between sweep passes.
    pub sweep_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 30 * 60,
            sweep_interval_secs: 60,
        }
    }
}

impl SessionConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

/// Transfer coordinator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Ring timeout on the staff dial. The one hard wall-clock deadline
    /// owned by this engine.
    pub ring_timeout_secs: u32,
    /// Extra slack the local watchdog allows past the ring timeout before
    /// it resolves a stranded attempt as no-answer. The provider callback
    /// always wins when it arrives first.
    pub watchdog_grace_secs: u32,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            ring_timeout_secs: 30,
            watchdog_grace_secs: 5,
        }
    }
}

impl TransferConfig {
    pub fn ring_timeout(&self) -> Duration {
        Duration::from_secs(self.ring_timeout_secs as u64)
    }

    pub fn watchdog_deadline(&self) -> Duration {
        Duration::from_secs((self.ring_timeout_secs + self.watchdog_grace_secs) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_section_defaults() {
        let config: ReceptionConfig =
            serde_json::from_str(r#"{"transfer": {"ring_timeout_secs": 20}}"#).unwrap();
        assert_eq!(config.transfer.ring_timeout_secs, 20);
        assert_eq!(config.transfer.watchdog_grace_secs, 5);
        assert_eq!(config.session.ttl_secs, 30 * 60);
        assert_eq!(config.general.emergency_digit, '0');
    }

    #[test]
    fn from_file_reports_missing_path_as_config_error() {
        let err = ReceptionConfig::from_file("/nonexistent/frontdesk.json").unwrap_err();
        assert!(matches!(err, ReceptionError::Configuration(_)));
    }
}
