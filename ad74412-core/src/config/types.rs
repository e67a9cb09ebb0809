//! Device configuration types

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Linear mapping between an engineering value and the full DAC code range
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OutputRange {
    /// Value produced by DAC code 0
    pub min: f32,
    /// Value produced by the full-scale DAC code
    pub max: f32,
}

impl OutputRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Check the range is non-empty
    pub fn validate(&self) -> Result<()> {
        if self.max > self.min {
            Ok(())
        } else {
            Err(Error::InvalidRequest)
        }
    }

    /// Whether `value` lies within the range
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Per-device configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeviceConfig {
    /// Voltage output span in volts
    pub voltage_output: OutputRange,
    /// Current output span in amps
    pub current_output: OutputRange,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            voltage_output: OutputRange::new(0.0, 11.0),
            current_output: OutputRange::new(0.0, 0.025),
        }
    }
}

impl DeviceConfig {
    /// Reject empty output spans
    pub fn validate(&self) -> Result<()> {
        self.voltage_output.validate()?;
        self.current_output.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = DeviceConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.voltage_output.contains(11.0));
        assert!(!config.current_output.contains(0.03));
    }

    #[test]
    fn test_empty_range_rejected() {
        let config = DeviceConfig {
            voltage_output: OutputRange::new(5.0, 5.0),
            ..DeviceConfig::default()
        };
        assert_eq!(config.validate(), Err(Error::InvalidRequest));
    }
}
