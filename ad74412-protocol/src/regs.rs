//! AD74412R register map
//!
//! Every implemented address in `0x00..=0x46`, its power-on default and the
//! bit fields the driver touches. Addresses that the chip does not implement
//! (0x30..=0x3B, 0x3D..=0x40) have no variant.

/// Number of addresses covered by the map (0x00 through SILICON_REV)
pub const ADDRESS_SPACE: usize = 0x47;

/// One of the four universal I/O channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Channel {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
}

/// Channel index outside `0..4`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelIndexOutOfRange(pub u8);

impl Channel {
    /// Number of channels on the chip
    pub const COUNT: usize = 4;

    /// All channels, in address order
    pub const ALL: [Channel; Self::COUNT] = [Channel::A, Channel::B, Channel::C, Channel::D];

    /// Zero-based channel index
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Look a channel up by index
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Channel::A),
            1 => Some(Channel::B),
            2 => Some(Channel::C),
            3 => Some(Channel::D),
            _ => None,
        }
    }

    /// This channel's enable bit in ADC_CONV_CTRL
    pub const fn conversion_enable_bit(self) -> u16 {
        1 << (self as u16)
    }

    /// This channel's voltage/current error bit in ALERT_STATUS
    pub const fn vi_error_bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl TryFrom<u8> for Channel {
    type Error = ChannelIndexOutOfRange;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Self::from_index(index as usize).ok_or(ChannelIndexOutOfRange(index))
    }
}

macro_rules! registers {
    ($($(#[$doc:meta])* $name:ident = $addr:literal,)+) => {
        /// Chip register addresses
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        #[repr(u8)]
        pub enum Register {
            $($(#[$doc])* $name = $addr,)+
        }

        impl Register {
            /// Every implemented register in ascending address order
            pub const ALL: &'static [Register] = &[$(Register::$name,)+];
        }
    };
}

registers! {
    /// No operation
    Nop = 0x00,
    ChFuncSetup0 = 0x01,
    ChFuncSetup1 = 0x02,
    ChFuncSetup2 = 0x03,
    ChFuncSetup3 = 0x04,
    AdcConfig0 = 0x05,
    AdcConfig1 = 0x06,
    AdcConfig2 = 0x07,
    AdcConfig3 = 0x08,
    DinConfig0 = 0x09,
    DinConfig1 = 0x0A,
    DinConfig2 = 0x0B,
    DinConfig3 = 0x0C,
    /// Parallel GPO data
    GpoParallel = 0x0D,
    GpoConfig0 = 0x0E,
    GpoConfig1 = 0x0F,
    GpoConfig2 = 0x10,
    GpoConfig3 = 0x11,
    OutputConfig0 = 0x12,
    OutputConfig1 = 0x13,
    OutputConfig2 = 0x14,
    OutputConfig3 = 0x15,
    DacCode0 = 0x16,
    DacCode1 = 0x17,
    DacCode2 = 0x18,
    DacCode3 = 0x19,
    DacClrCode0 = 0x1A,
    DacClrCode1 = 0x1B,
    DacClrCode2 = 0x1C,
    DacClrCode3 = 0x1D,
    DacActive0 = 0x1E,
    DacActive1 = 0x1F,
    DacActive2 = 0x20,
    DacActive3 = 0x21,
    /// Digital input threshold
    DinThresh = 0x22,
    /// ADC conversion control (channel enables, sequencer mode)
    AdcConvCtrl = 0x23,
    /// Diagnostic source assignment
    DiagAssign = 0x24,
    /// Digital input comparator outputs
    DinCompOut = 0x25,
    AdcResult0 = 0x26,
    AdcResult1 = 0x27,
    AdcResult2 = 0x28,
    AdcResult3 = 0x29,
    DiagResult0 = 0x2A,
    DiagResult1 = 0x2B,
    DiagResult2 = 0x2C,
    DiagResult3 = 0x2D,
    /// Latched alerts, write 1 to clear
    AlertStatus = 0x2E,
    /// Live (unlatched) status
    LiveStatus = 0x2F,
    AlertMask = 0x3C,
    /// Selects the register returned by the next frame
    ReadSelect = 0x41,
    /// ADC conversion control for the 20/4.8 kSPS modes
    AdcConvCtrl40Sps = 0x42,
    ThermRst = 0x43,
    /// Command keys (software reset, DAC load, DAC clear)
    CmdKey = 0x44,
    Scratch = 0x45,
    SiliconRev = 0x46,
}

impl Register {
    /// Number of implemented registers
    pub const COUNT: usize = Self::ALL.len();

    /// Bus address
    pub const fn addr(self) -> u8 {
        self as u8
    }

    /// Look a register up by bus address
    pub fn from_addr(addr: u8) -> Option<Self> {
        Self::ALL
            .binary_search_by_key(&addr, |reg| reg.addr())
            .ok()
            .map(|i| Self::ALL[i])
    }

    /// Power-on default
    pub const fn reset_value(self) -> u16 {
        match self {
            Register::DinConfig0
            | Register::DinConfig1
            | Register::DinConfig2
            | Register::DinConfig3 => 0x000B,
            Register::AlertStatus => alert_status::RESET_OCCURRED,
            Register::SiliconRev => 0x0001,
            _ => 0x0000,
        }
    }

    /// Pick the register for `channel` out of a per-channel block
    const fn per_channel(channel: Channel, block: [Register; Channel::COUNT]) -> Register {
        block[channel.index()]
    }

    pub const fn ch_func_setup(channel: Channel) -> Register {
        Self::per_channel(
            channel,
            [Register::ChFuncSetup0, Register::ChFuncSetup1, Register::ChFuncSetup2, Register::ChFuncSetup3],
        )
    }

    pub const fn adc_config(channel: Channel) -> Register {
        Self::per_channel(
            channel,
            [Register::AdcConfig0, Register::AdcConfig1, Register::AdcConfig2, Register::AdcConfig3],
        )
    }

    pub const fn din_config(channel: Channel) -> Register {
        Self::per_channel(
            channel,
            [Register::DinConfig0, Register::DinConfig1, Register::DinConfig2, Register::DinConfig3],
        )
    }

    pub const fn dac_code(channel: Channel) -> Register {
        Self::per_channel(
            channel,
            [Register::DacCode0, Register::DacCode1, Register::DacCode2, Register::DacCode3],
        )
    }

    pub const fn dac_clr_code(channel: Channel) -> Register {
        Self::per_channel(
            channel,
            [Register::DacClrCode0, Register::DacClrCode1, Register::DacClrCode2, Register::DacClrCode3],
        )
    }

    pub const fn adc_result(channel: Channel) -> Register {
        Self::per_channel(
            channel,
            [Register::AdcResult0, Register::AdcResult1, Register::AdcResult2, Register::AdcResult3],
        )
    }
}

/// CH_FUNC_SETUPn fields
pub mod ch_func_setup {
    /// Channel function selector
    pub const CH_FUNC_MASK: u16 = 0x000F;
}

/// ADC_CONFIGn fields
pub mod adc_config {
    /// Input range selector
    pub const RANGE_MASK: u16 = 0x00E0;
    pub const RANGE_SHIFT: u16 = 5;
    /// ADC input multiplexer
    pub const MUX_MASK: u16 = 0x0003;
}

/// DIN_CONFIGn fields
pub mod din_config {
    /// Enables the digital input comparator
    pub const COMPARATOR_EN: u16 = 0x1000;
}

/// DAC_CODEn fields
pub mod dac_code {
    /// 13-bit output code
    pub const CODE_MASK: u16 = 0x1FFF;
}

/// ADC_CONV_CTRL fields
pub mod adc_conv_ctrl {
    /// Per-channel conversion enables, channel A in bit 0
    pub const CH_EN_MASK: u16 = 0x000F;
    /// Conversion sequencer command
    pub const CONV_SEQ_MASK: u16 = 0x0300;
    pub const CONV_SEQ_SHIFT: u16 = 8;
}

/// ALERT_STATUS bits (latched, write 1 to clear)
pub mod alert_status {
    pub const RESET_OCCURRED: u16 = 1 << 15;
    pub const CAL_MEM_ERR: u16 = 1 << 14;
    pub const SPI_CRC_ERR: u16 = 1 << 13;
    pub const SPI_SCLK_CNT_ERR: u16 = 1 << 12;
    pub const ADC_SAT_ERR: u16 = 1 << 11;
    pub const ADC_CONV_ERR: u16 = 1 << 10;
    pub const ALDO1V8_ERR: u16 = 1 << 9;
    pub const DVCC_ERR: u16 = 1 << 8;
    pub const AVDD_ERR: u16 = 1 << 7;
    pub const ALDO5V_ERR: u16 = 1 << 6;
    pub const CHARGE_PUMP_ERR: u16 = 1 << 5;
    pub const HI_TEMP_ERR: u16 = 1 << 4;
    /// Channel voltage/current errors, channel A in bit 0
    pub const VI_ERR_MASK: u16 = 0x000F;
}

/// LIVE_STATUS bits (unlatched)
pub mod live_status {
    pub const ADC_DATA_RDY: u16 = 1 << 14;
    pub const ADC_BUSY: u16 = 1 << 13;
    pub const ADC_CH_CURR_MASK: u16 = 0x1C00;
    pub const ALDO1V8_STATUS: u16 = 1 << 9;
    pub const DVCC_STATUS: u16 = 1 << 8;
    pub const AVDD_STATUS: u16 = 1 << 7;
    pub const ALDO5V_STATUS: u16 = 1 << 6;
    pub const CHARGE_PUMP_STATUS: u16 = 1 << 5;
    pub const HI_TEMP_STATUS: u16 = 1 << 4;
    pub const VI_ERR_CURR_MASK: u16 = 0x000F;
}

/// READ_SELECT fields
pub mod read_select {
    /// Keep returning the selected register (and its successors in a burst)
    pub const AUTO_RD_EN: u16 = 0x0200;
    pub const ADDR_MASK: u16 = 0x007F;
}

/// Keys accepted by CMD_KEY
pub mod cmd_key {
    /// First half of the software reset sequence
    pub const SW_RST_KEY1: u16 = 0x15FA;
    /// Second half of the software reset sequence
    pub const SW_RST_KEY2: u16 = 0xAF51;
    /// Load DAC_CODEn into the active DACs
    pub const LDAC_KEY: u16 = 0x953A;
    /// Load DAC_CLR_CODEn into the active DACs
    pub const DAC_CLR_KEY: u16 = 0x73D1;
}
