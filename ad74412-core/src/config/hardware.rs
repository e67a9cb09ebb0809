//! Hardware constants
//!
//! Fixed by the chip datasheet; not meant to be tuned at runtime.

/// Minimum dwell time around a channel function change (µs)
pub const CHANNEL_MINIMUM_TIME_US: u32 = 130;

/// Wait between setting the final channel function and loading the DAC (µs)
pub const DAC_UPDATE_DELAY_US: u32 = 150;

/// Settle time after a software reset (µs)
pub const RESET_SETTLE_US: u32 = 50_000;

/// On-chip sense resistor (Ω)
pub const RSENSE_OHMS: f32 = 100.0;

/// Pull-up used for resistance measurement (Ω)
pub const RSENSE_HIGH_OHMS: f32 = 2000.0;

/// Full-scale ADC code
pub const MAX_ADC_CODE: u16 = 0xFFFF;

/// Full-scale DAC code
pub const MAX_DAC_CODE: u16 = 0x1FFF;

/// Size of the device instance pool
pub const MAX_SUPPORTED_DEVICES: usize = 2;
