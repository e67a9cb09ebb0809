//! Raw code to engineering unit conversion
//!
//! ADC codes are interpreted against the committed configuration of the
//! channel that produced them. Output values go the other way, into
//! 13-bit DAC codes scaled over the device's configured output span.

use ad74412_protocol::Channel;

use crate::config::{OutputRange, MAX_ADC_CODE, MAX_DAC_CODE, RSENSE_HIGH_OHMS, RSENSE_OHMS};
use crate::error::{Error, Result};
use crate::registers::{ChannelFunction, CommittedConfig};

/// Reported for a resistance measurement at full-scale ADC code
pub const RESISTANCE_OVERRANGE: f32 = f32::MAX;

/// Physical quantity carried by a [`ChannelValue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ValueKind {
    /// Volts
    Voltage,
    /// Amps
    Current,
    /// Ohms
    Resistance,
}

/// A value measured on, or requested for, one channel
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelValue {
    pub channel: Channel,
    pub kind: ValueKind,
    pub value: f32,
}

impl ChannelValue {
    pub const fn voltage(channel: Channel, volts: f32) -> Self {
        Self {
            channel,
            kind: ValueKind::Voltage,
            value: volts,
        }
    }

    pub const fn current(channel: Channel, amps: f32) -> Self {
        Self {
            channel,
            kind: ValueKind::Current,
            value: amps,
        }
    }
}

/// Convert an ADC code read from `channel` to an engineering value
pub fn scale(committed: &CommittedConfig, channel: Channel, raw: u16) -> ChannelValue {
    let (kind, value) = scale_index(committed, channel.index(), raw);
    ChannelValue {
        channel,
        kind,
        value,
    }
}

/// Convert an ADC code using the committed configuration at `index`
///
/// Indices outside the four channels fall back to high impedance, 0-10V.
pub fn scale_index(committed: &CommittedConfig, index: usize, raw: u16) -> (ValueKind, f32) {
    use ChannelFunction::*;

    let (min, max) = committed.range(index).bounds();
    let span = max - min;
    let fraction = raw as f32 / MAX_ADC_CODE as f32;

    match committed.function(index) {
        HighImpedance | CurrentOutput | VoltageInput | DigitalInputLogic
        | DigitalInputLoopPowered => (ValueKind::Voltage, min + fraction * span),
        VoltageOutput | CurrentInputLoopPowered => {
            (ValueKind::Current, (min + fraction * span) / RSENSE_OHMS)
        }
        CurrentInputExternallyPowered => (
            ValueKind::Current,
            (raw as f32 * span / MAX_ADC_CODE as f32) / RSENSE_OHMS,
        ),
        ResistanceMeasurement => (ValueKind::Resistance, resistance(raw)),
    }
}

fn resistance(raw: u16) -> f32 {
    if raw >= MAX_ADC_CODE {
        return RESISTANCE_OVERRANGE;
    }
    let pull_up = RSENSE_OHMS + RSENSE_HIGH_OHMS;
    raw as f32 * pull_up / (MAX_ADC_CODE - raw) as f32
}

/// Convert a requested output value into a DAC code
///
/// The value must be of the kind the channel function drives (voltage for
/// voltage output, current for current output) and inside `range`.
pub fn output_code(
    function: ChannelFunction,
    kind: ValueKind,
    value: f32,
    range: &OutputRange,
) -> Result<u16> {
    match (function, kind) {
        (ChannelFunction::VoltageOutput, ValueKind::Voltage)
        | (ChannelFunction::CurrentOutput, ValueKind::Current) => {}
        _ => return Err(Error::WrongActionForChannelType),
    }
    if !range.contains(value) {
        return Err(Error::ValueOutOfRange);
    }
    let fraction = (value - range.min) / (range.max - range.min);
    let code = fraction * MAX_DAC_CODE as f32 + 0.5;
    Ok((code as u16).min(MAX_DAC_CODE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ad74412_protocol::Register;
    use proptest::prelude::*;

    use crate::mapper::{derive_fields, stage_channel_function};
    use crate::registers::RegisterStore;

    fn committed_with(channel: Channel, function: ChannelFunction) -> CommittedConfig {
        let mut store = RegisterStore::new();
        stage_channel_function(&mut store, channel, function);
        let mut committed = CommittedConfig::new();
        committed.snapshot(&store);
        committed
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() <= b.abs() * 1e-5 + 1e-6
    }

    #[test]
    fn test_high_impedance_voltage() {
        let committed = CommittedConfig::new();
        let zero = scale(&committed, Channel::A, 0);
        assert_eq!(zero.kind, ValueKind::Voltage);
        assert_eq!(zero.value, 0.0);

        let full = scale(&committed, Channel::A, 65535);
        assert!(close(full.value, 10.0));
    }

    #[test]
    fn test_resistance() {
        let committed = committed_with(Channel::C, ChannelFunction::ResistanceMeasurement);
        let value = scale(&committed, Channel::C, 32767);
        assert_eq!(value.kind, ValueKind::Resistance);
        assert!(close(value.value, 2100.0 * 32767.0 / 32768.0));

        let saturated = scale(&committed, Channel::C, 65535);
        assert_eq!(saturated.value, RESISTANCE_OVERRANGE);
    }

    #[test]
    fn test_voltage_output_reads_current() {
        let committed = committed_with(Channel::B, ChannelFunction::VoltageOutput);
        let value = scale(&committed, Channel::B, 0);
        assert_eq!(value.kind, ValueKind::Current);
        assert!(close(value.value, -0.025));
    }

    #[test]
    fn test_externally_powered_current_input() {
        let committed = committed_with(Channel::D, ChannelFunction::CurrentInputExternallyPowered);
        let value = scale(&committed, Channel::D, 65535);
        assert_eq!(value.kind, ValueKind::Current);
        assert!(close(value.value, 0.025));
    }

    #[test]
    fn test_loop_powered_current_input() {
        let committed = committed_with(Channel::A, ChannelFunction::CurrentInputLoopPowered);
        let (kind, value) = scale_index(&committed, 0, 65535);
        assert_eq!(kind, ValueKind::Current);
        assert!(close(value, 0.0));
        assert!(!derive_fields(ChannelFunction::CurrentInputLoopPowered).adc_conversion_enabled);
    }

    #[test]
    fn test_uses_committed_not_staged() {
        let mut store = RegisterStore::new();
        let committed = CommittedConfig::new();
        stage_channel_function(&mut store, Channel::A, ChannelFunction::ResistanceMeasurement);
        assert!(store.is_dirty(Register::ChFuncSetup0));

        // Nothing committed yet, still reads as a 0-10V voltage
        assert_eq!(scale(&committed, Channel::A, 0).kind, ValueKind::Voltage);
    }

    #[test]
    fn test_unknown_index_falls_back() {
        let committed = committed_with(Channel::A, ChannelFunction::ResistanceMeasurement);
        let (kind, value) = scale_index(&committed, 9, 65535);
        assert_eq!(kind, ValueKind::Voltage);
        assert!(close(value, 10.0));
    }

    #[test]
    fn test_output_code() {
        let range = OutputRange::new(0.0, 11.0);
        assert_eq!(
            output_code(ChannelFunction::VoltageOutput, ValueKind::Voltage, 11.0, &range),
            Ok(MAX_DAC_CODE)
        );
        assert_eq!(
            output_code(ChannelFunction::VoltageOutput, ValueKind::Voltage, 0.0, &range),
            Ok(0)
        );
        assert_eq!(
            output_code(ChannelFunction::VoltageOutput, ValueKind::Voltage, 5.5, &range),
            Ok(4096)
        );
        assert_eq!(
            output_code(ChannelFunction::VoltageOutput, ValueKind::Current, 0.01, &range),
            Err(Error::WrongActionForChannelType)
        );
        assert_eq!(
            output_code(ChannelFunction::VoltageInput, ValueKind::Voltage, 1.0, &range),
            Err(Error::WrongActionForChannelType)
        );
        assert_eq!(
            output_code(ChannelFunction::VoltageOutput, ValueKind::Voltage, 12.0, &range),
            Err(Error::ValueOutOfRange)
        );
    }

    proptest! {
        #[test]
        fn prop_output_code_monotonic(a in 0.0f32..=0.025, b in 0.0f32..=0.025) {
            let range = OutputRange::new(0.0, 0.025);
            let code = |v| output_code(ChannelFunction::CurrentOutput, ValueKind::Current, v, &range);
            let (ca, cb) = (code(a).unwrap(), code(b).unwrap());
            prop_assert!(ca <= MAX_DAC_CODE && cb <= MAX_DAC_CODE);
            if a <= b {
                prop_assert!(ca <= cb);
            }
        }

        #[test]
        fn prop_resistance_never_negative(raw in any::<u16>()) {
            let committed = committed_with(Channel::A, ChannelFunction::ResistanceMeasurement);
            let value = scale(&committed, Channel::A, raw);
            prop_assert!(value.value >= 0.0);
        }
    }
}
