//! Typed accessors for packed register fields
//!
//! Each pair works on a raw register value so the wire layout stays
//! identical to the datasheet while callers deal in enums.

use ad74412_protocol::regs::{adc_config, adc_conv_ctrl, ch_func_setup, din_config};
use ad74412_protocol::Channel;

/// Channel function (CH_FUNC_SETUPn)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum ChannelFunction {
    #[default]
    HighImpedance = 0,
    VoltageOutput = 1,
    CurrentOutput = 2,
    VoltageInput = 3,
    CurrentInputExternallyPowered = 4,
    CurrentInputLoopPowered = 5,
    ResistanceMeasurement = 6,
    DigitalInputLogic = 7,
    DigitalInputLoopPowered = 8,
}

impl ChannelFunction {
    pub const ALL: [ChannelFunction; 9] = [
        ChannelFunction::HighImpedance,
        ChannelFunction::VoltageOutput,
        ChannelFunction::CurrentOutput,
        ChannelFunction::VoltageInput,
        ChannelFunction::CurrentInputExternallyPowered,
        ChannelFunction::CurrentInputLoopPowered,
        ChannelFunction::ResistanceMeasurement,
        ChannelFunction::DigitalInputLogic,
        ChannelFunction::DigitalInputLoopPowered,
    ];

    pub fn from_bits(bits: u16) -> Option<Self> {
        Self::ALL.get(bits as usize).copied()
    }

    pub const fn bits(self) -> u16 {
        self as u16
    }

    /// Whether the channel drives its DAC
    pub const fn is_output(self) -> bool {
        matches!(self, ChannelFunction::VoltageOutput | ChannelFunction::CurrentOutput)
    }
}

/// ADC input multiplexer (ADC_CONFIGn)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcMux {
    /// Across the screw terminals
    ScrewTerminals,
    /// Across the 100Ω sense resistor
    SenseResistor,
}

impl AdcMux {
    pub fn from_bits(bits: u16) -> Option<Self> {
        match bits {
            0 => Some(AdcMux::ScrewTerminals),
            1 => Some(AdcMux::SenseResistor),
            _ => None,
        }
    }

    pub const fn bits(self) -> u16 {
        match self {
            AdcMux::ScrewTerminals => 0,
            AdcMux::SenseResistor => 1,
        }
    }
}

/// ADC input range (ADC_CONFIGn)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcRange {
    #[default]
    ZeroTo10V,
    ZeroTo2V5,
    Neg2V5To0,
    Neg2V5To2V5,
}

impl AdcRange {
    pub fn from_bits(bits: u16) -> Option<Self> {
        match bits {
            0 => Some(AdcRange::ZeroTo10V),
            1 => Some(AdcRange::ZeroTo2V5),
            2 => Some(AdcRange::Neg2V5To0),
            3 => Some(AdcRange::Neg2V5To2V5),
            _ => None,
        }
    }

    pub const fn bits(self) -> u16 {
        match self {
            AdcRange::ZeroTo10V => 0,
            AdcRange::ZeroTo2V5 => 1,
            AdcRange::Neg2V5To0 => 2,
            AdcRange::Neg2V5To2V5 => 3,
        }
    }

    /// `(min, max)` in volts
    pub const fn bounds(self) -> (f32, f32) {
        match self {
            AdcRange::ZeroTo10V => (0.0, 10.0),
            AdcRange::ZeroTo2V5 => (0.0, 2.5),
            AdcRange::Neg2V5To0 => (-2.5, 0.0),
            AdcRange::Neg2V5To2V5 => (-2.5, 2.5),
        }
    }
}

/// Conversion sequencer command (ADC_CONV_CTRL)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConvSeq {
    Idle,
    Single,
    Continuous,
    PowerDown,
}

impl ConvSeq {
    pub const fn from_bits(bits: u16) -> Self {
        match bits & 0x3 {
            0 => ConvSeq::Idle,
            1 => ConvSeq::Single,
            2 => ConvSeq::Continuous,
            _ => ConvSeq::PowerDown,
        }
    }

    pub const fn bits(self) -> u16 {
        match self {
            ConvSeq::Idle => 0,
            ConvSeq::Single => 1,
            ConvSeq::Continuous => 2,
            ConvSeq::PowerDown => 3,
        }
    }
}

pub fn ch_func(value: u16) -> Option<ChannelFunction> {
    ChannelFunction::from_bits(value & ch_func_setup::CH_FUNC_MASK)
}

pub fn set_ch_func(value: u16, function: ChannelFunction) -> u16 {
    (value & !ch_func_setup::CH_FUNC_MASK) | function.bits()
}

pub fn adc_mux(value: u16) -> Option<AdcMux> {
    AdcMux::from_bits(value & adc_config::MUX_MASK)
}

pub fn set_adc_mux(value: u16, mux: AdcMux) -> u16 {
    (value & !adc_config::MUX_MASK) | mux.bits()
}

pub fn adc_range(value: u16) -> Option<AdcRange> {
    AdcRange::from_bits((value & adc_config::RANGE_MASK) >> adc_config::RANGE_SHIFT)
}

pub fn set_adc_range(value: u16, range: AdcRange) -> u16 {
    (value & !adc_config::RANGE_MASK) | (range.bits() << adc_config::RANGE_SHIFT)
}

pub fn comparator_enabled(value: u16) -> bool {
    value & din_config::COMPARATOR_EN != 0
}

pub fn set_comparator_enabled(value: u16, enabled: bool) -> u16 {
    if enabled {
        value | din_config::COMPARATOR_EN
    } else {
        value & !din_config::COMPARATOR_EN
    }
}

pub fn conv_seq(value: u16) -> ConvSeq {
    ConvSeq::from_bits((value & adc_conv_ctrl::CONV_SEQ_MASK) >> adc_conv_ctrl::CONV_SEQ_SHIFT)
}

pub fn set_conv_seq(value: u16, seq: ConvSeq) -> u16 {
    (value & !adc_conv_ctrl::CONV_SEQ_MASK) | (seq.bits() << adc_conv_ctrl::CONV_SEQ_SHIFT)
}

pub fn conversion_enabled(value: u16, channel: Channel) -> bool {
    value & channel.conversion_enable_bit() != 0
}

pub fn set_conversion_enabled(value: u16, channel: Channel, enabled: bool) -> u16 {
    if enabled {
        value | channel.conversion_enable_bit()
    } else {
        value & !channel.conversion_enable_bit()
    }
}

pub fn any_conversion_enabled(value: u16) -> bool {
    value & adc_conv_ctrl::CH_EN_MASK != 0
}
