//! Configuration known to be active on the chip
//!
//! ADC results are interpreted with the function and range the chip was
//! running when it converted them, not with what is staged in the cache.

use ad74412_protocol::{Channel, Register};

use super::fields::{self, AdcRange, ChannelFunction};
use super::RegisterStore;

/// Per-channel CH_FUNC_SETUP and ADC_CONFIG values last committed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommittedConfig {
    ch_func_setup: [u16; Channel::COUNT],
    adc_config: [u16; Channel::COUNT],
}

impl Default for CommittedConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl CommittedConfig {
    /// Power-on configuration (every channel high impedance, 0-10V)
    pub const fn new() -> Self {
        Self {
            ch_func_setup: [Register::ChFuncSetup0.reset_value(); Channel::COUNT],
            adc_config: [Register::AdcConfig0.reset_value(); Channel::COUNT],
        }
    }

    /// Copy all four channels from the cache
    pub fn snapshot(&mut self, store: &RegisterStore) {
        for channel in Channel::ALL {
            self.snapshot_channel(store, channel);
        }
    }

    /// Copy one channel from the cache
    pub fn snapshot_channel(&mut self, store: &RegisterStore, channel: Channel) {
        let i = channel.index();
        self.ch_func_setup[i] = store.get(Register::ch_func_setup(channel));
        self.adc_config[i] = store.get(Register::adc_config(channel));
    }

    /// Record a channel as parked in high impedance
    pub fn set_high_impedance(&mut self, channel: Channel) {
        self.ch_func_setup[channel.index()] = Register::ChFuncSetup0.reset_value();
    }

    /// Raw `(CH_FUNC_SETUP, ADC_CONFIG)` for a channel
    pub fn raw(&self, channel: Channel) -> (u16, u16) {
        let i = channel.index();
        (self.ch_func_setup[i], self.adc_config[i])
    }

    /// Committed function; unknown channels and codes read as high impedance
    pub fn function(&self, index: usize) -> ChannelFunction {
        self.ch_func_setup
            .get(index)
            .and_then(|&value| fields::ch_func(value))
            .unwrap_or(ChannelFunction::HighImpedance)
    }

    /// Committed ADC range; unknown channels and codes read as 0-10V
    pub fn range(&self, index: usize) -> AdcRange {
        self.adc_config
            .get(index)
            .and_then(|&value| fields::adc_range(value))
            .unwrap_or(AdcRange::ZeroTo10V)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::fields::set_adc_range;

    #[test]
    fn test_snapshot_tracks_store() {
        let mut store = RegisterStore::new();
        store.set(Register::ChFuncSetup2, ChannelFunction::VoltageInput.bits(), true);
        store.set(Register::AdcConfig2, set_adc_range(0, AdcRange::ZeroTo2V5), true);

        let mut committed = CommittedConfig::new();
        assert_eq!(committed.function(2), ChannelFunction::HighImpedance);

        committed.snapshot(&store);
        assert_eq!(committed.function(2), ChannelFunction::VoltageInput);
        assert_eq!(committed.range(2), AdcRange::ZeroTo2V5);

        committed.set_high_impedance(Channel::C);
        assert_eq!(committed.function(2), ChannelFunction::HighImpedance);
        assert_eq!(committed.range(2), AdcRange::ZeroTo2V5);
    }

    #[test]
    fn test_out_of_range_channel_falls_back() {
        let committed = CommittedConfig::new();
        assert_eq!(committed.function(7), ChannelFunction::HighImpedance);
        assert_eq!(committed.range(7), AdcRange::ZeroTo10V);
    }
}
