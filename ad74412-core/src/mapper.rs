//! Channel function to register field mapping

use ad74412_protocol::{Channel, Register};

use crate::registers::fields::{
    self, set_adc_mux, set_adc_range, set_ch_func, set_comparator_enabled,
    set_conversion_enabled,
};
use crate::registers::{AdcMux, AdcRange, ChannelFunction, RegisterStore};

/// Register fields that realise one channel function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelFields {
    pub adc_mux: AdcMux,
    pub adc_range: AdcRange,
    pub comparator_enable: bool,
    pub adc_conversion_enabled: bool,
}

/// Fields for `function`
pub const fn derive_fields(function: ChannelFunction) -> ChannelFields {
    use AdcMux::*;
    use AdcRange::*;
    use ChannelFunction::*;

    let (adc_mux, adc_range, comparator_enable, adc_conversion_enabled) = match function {
        HighImpedance => (ScrewTerminals, ZeroTo10V, false, false),
        VoltageOutput => (SenseResistor, Neg2V5To2V5, false, true),
        CurrentOutput => (ScrewTerminals, ZeroTo10V, false, true),
        VoltageInput => (ScrewTerminals, ZeroTo10V, false, true),
        CurrentInputExternallyPowered => (SenseResistor, ZeroTo2V5, false, true),
        CurrentInputLoopPowered => (SenseResistor, Neg2V5To0, false, false),
        ResistanceMeasurement => (ScrewTerminals, ZeroTo2V5, false, true),
        DigitalInputLogic => (ScrewTerminals, ZeroTo10V, true, true),
        DigitalInputLoopPowered => (ScrewTerminals, ZeroTo10V, true, true),
    };
    ChannelFields {
        adc_mux,
        adc_range,
        comparator_enable,
        adc_conversion_enabled,
    }
}

/// Stage `function` for `channel` in the register cache
///
/// Nothing reaches the chip until the next commit. A channel dropped to
/// high impedance also gets its DAC code zeroed.
pub fn stage_channel_function(
    store: &mut RegisterStore,
    channel: Channel,
    function: ChannelFunction,
) {
    let f = derive_fields(function);

    store.modify(Register::ch_func_setup(channel), |v| set_ch_func(v, function));
    store.modify(Register::adc_config(channel), |v| {
        set_adc_range(set_adc_mux(v, f.adc_mux), f.adc_range)
    });
    store.modify(Register::din_config(channel), |v| {
        set_comparator_enabled(v, f.comparator_enable)
    });
    store.modify(Register::AdcConvCtrl, |v| {
        set_conversion_enabled(v, channel, f.adc_conversion_enabled)
    });

    if function == ChannelFunction::HighImpedance {
        store.set(Register::dac_code(channel), 0, true);
    }
}

/// Whether `channel` has a function change waiting for commit
pub fn is_channel_function_modified(store: &RegisterStore, channel: Channel) -> bool {
    store.is_dirty(Register::ch_func_setup(channel))
}

/// Any staged conversion enable in ADC_CONV_CTRL
pub fn any_conversion_enabled(store: &RegisterStore) -> bool {
    fields::any_conversion_enabled(store.get(Register::AdcConvCtrl))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::fields::{adc_mux, adc_range, comparator_enabled, conversion_enabled};

    #[test]
    fn test_derive_fields_table() {
        let expected = [
            (ChannelFunction::HighImpedance, AdcMux::ScrewTerminals, AdcRange::ZeroTo10V, false, false),
            (ChannelFunction::VoltageOutput, AdcMux::SenseResistor, AdcRange::Neg2V5To2V5, false, true),
            (ChannelFunction::CurrentOutput, AdcMux::ScrewTerminals, AdcRange::ZeroTo10V, false, true),
            (ChannelFunction::VoltageInput, AdcMux::ScrewTerminals, AdcRange::ZeroTo10V, false, true),
            (ChannelFunction::CurrentInputExternallyPowered, AdcMux::SenseResistor, AdcRange::ZeroTo2V5, false, true),
            (ChannelFunction::CurrentInputLoopPowered, AdcMux::SenseResistor, AdcRange::Neg2V5To0, false, false),
            (ChannelFunction::ResistanceMeasurement, AdcMux::ScrewTerminals, AdcRange::ZeroTo2V5, false, true),
            (ChannelFunction::DigitalInputLogic, AdcMux::ScrewTerminals, AdcRange::ZeroTo10V, true, true),
            (ChannelFunction::DigitalInputLoopPowered, AdcMux::ScrewTerminals, AdcRange::ZeroTo10V, true, true),
        ];
        for (function, mux, range, comparator, enabled) in expected {
            let fields = derive_fields(function);
            assert_eq!(fields.adc_mux, mux, "{:?}", function);
            assert_eq!(fields.adc_range, range, "{:?}", function);
            assert_eq!(fields.comparator_enable, comparator, "{:?}", function);
            assert_eq!(fields.adc_conversion_enabled, enabled, "{:?}", function);
        }
    }

    #[test]
    fn test_derive_fields_is_pure() {
        for function in ChannelFunction::ALL {
            assert_eq!(derive_fields(function), derive_fields(function));
        }
    }

    #[test]
    fn test_stage_resistance_measurement() {
        let mut store = RegisterStore::new();
        stage_channel_function(&mut store, Channel::B, ChannelFunction::ResistanceMeasurement);

        assert_eq!(store.channel_function(Channel::B), Some(ChannelFunction::ResistanceMeasurement));
        let adc = store.get(Register::AdcConfig1);
        assert_eq!(adc_mux(adc), Some(AdcMux::ScrewTerminals));
        assert_eq!(adc_range(adc), Some(AdcRange::ZeroTo2V5));
        assert!(!comparator_enabled(store.get(Register::DinConfig1)));
        assert!(conversion_enabled(store.get(Register::AdcConvCtrl), Channel::B));

        for reg in [
            Register::ChFuncSetup1,
            Register::AdcConfig1,
            Register::DinConfig1,
            Register::AdcConvCtrl,
        ] {
            assert!(store.is_dirty(reg), "{:?}", reg);
        }
        assert!(!store.is_dirty(Register::DacCode1));
        assert!(is_channel_function_modified(&store, Channel::B));
        assert!(!is_channel_function_modified(&store, Channel::A));
    }

    #[test]
    fn test_stage_high_impedance_zeroes_dac() {
        let mut store = RegisterStore::new();
        store.set(Register::DacCode3, 0x1000, false);
        stage_channel_function(&mut store, Channel::D, ChannelFunction::HighImpedance);

        assert_eq!(store.get(Register::DacCode3), 0);
        assert!(store.is_dirty(Register::DacCode3));
        assert!(store.is_dirty(Register::ChFuncSetup3));
        assert!(!any_conversion_enabled(&store));
    }

    #[test]
    fn test_stage_digital_input_enables_comparator() {
        let mut store = RegisterStore::new();
        stage_channel_function(&mut store, Channel::A, ChannelFunction::DigitalInputLogic);
        let din = store.get(Register::DinConfig0);
        assert!(comparator_enabled(din));
        // Debounce bits from the reset value survive
        assert_eq!(din & 0x000B, 0x000B);
    }
}
