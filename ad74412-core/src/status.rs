//! Alert and live status analysis
//!
//! Turns freshly read ALERT_STATUS and LIVE_STATUS values into
//! notifications and ADC results. Power-rail conditions are edge-latched:
//! a rail reports `BelowThreshold` once when its alert is first seen and
//! `AboveThreshold` once when LIVE_STATUS shows it recovered.

use ad74412_protocol::regs::{alert_status, live_status};
use ad74412_protocol::{Channel, Register, FRAME_BYTES};

use crate::exchange::{Exchange, TransactionId};
use crate::registers::fields::conversion_enabled;
use crate::registers::{CommittedConfig, RegisterStore};
use crate::scaler::{scale, ChannelValue};

/// Room for the ALERT_STATUS and LIVE_STATUS write-backs
pub const STATUS_CLEAR_BYTES: usize = 2 * FRAME_BYTES;

/// Supply rail monitored by the chip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rail {
    Aldo1V8,
    Dvcc,
    Avdd,
    Aldo5V,
}

impl Rail {
    pub const ALL: [Rail; 4] = [Rail::Aldo1V8, Rail::Dvcc, Rail::Avdd, Rail::Aldo5V];

    const fn index(self) -> usize {
        self as usize
    }

    /// Latched error bit in ALERT_STATUS
    pub const fn alert_bit(self) -> u16 {
        match self {
            Rail::Aldo1V8 => alert_status::ALDO1V8_ERR,
            Rail::Dvcc => alert_status::DVCC_ERR,
            Rail::Avdd => alert_status::AVDD_ERR,
            Rail::Aldo5V => alert_status::ALDO5V_ERR,
        }
    }

    /// Live status bit in LIVE_STATUS, set while the rail is in regulation
    pub const fn live_bit(self) -> u16 {
        match self {
            Rail::Aldo1V8 => live_status::ALDO1V8_STATUS,
            Rail::Dvcc => live_status::DVCC_STATUS,
            Rail::Avdd => live_status::AVDD_STATUS,
            Rail::Aldo5V => live_status::ALDO5V_STATUS,
        }
    }
}

/// Condition reported to the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Notification {
    ResetOccurred,
    CalibrationMemoryError,
    SpiCrcError,
    SpiSclkCountError,
    AdcSaturation,
    AdcConversionError,
    /// Rail dropped below its threshold
    BelowThreshold(Rail),
    /// Rail recovered
    AboveThreshold(Rail),
    ChargePumpError,
    HighTemperature,
    /// Voltage or current error on a channel
    ChannelError(Channel),
}

/// Output of one analysis pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Report {
    Value(ChannelValue),
    Status(Notification),
}

/// How an ALERT_STATUS bit is reported
#[derive(Debug, Clone, Copy)]
enum AlertBit {
    /// Reported every time the bit is seen
    Always(Notification),
    /// Reported once per drop, edge-latched
    Rail(Rail),
}

/// ALERT_STATUS bits, most significant first
const ALERT_BITS: [(u16, AlertBit); 16] = [
    (alert_status::RESET_OCCURRED, AlertBit::Always(Notification::ResetOccurred)),
    (alert_status::CAL_MEM_ERR, AlertBit::Always(Notification::CalibrationMemoryError)),
    (alert_status::SPI_CRC_ERR, AlertBit::Always(Notification::SpiCrcError)),
    (alert_status::SPI_SCLK_CNT_ERR, AlertBit::Always(Notification::SpiSclkCountError)),
    (alert_status::ADC_SAT_ERR, AlertBit::Always(Notification::AdcSaturation)),
    (alert_status::ADC_CONV_ERR, AlertBit::Always(Notification::AdcConversionError)),
    (alert_status::ALDO1V8_ERR, AlertBit::Rail(Rail::Aldo1V8)),
    (alert_status::DVCC_ERR, AlertBit::Rail(Rail::Dvcc)),
    (alert_status::AVDD_ERR, AlertBit::Rail(Rail::Avdd)),
    (alert_status::ALDO5V_ERR, AlertBit::Rail(Rail::Aldo5V)),
    (alert_status::CHARGE_PUMP_ERR, AlertBit::Always(Notification::ChargePumpError)),
    (alert_status::HI_TEMP_ERR, AlertBit::Always(Notification::HighTemperature)),
    (Channel::D.vi_error_bit(), AlertBit::Always(Notification::ChannelError(Channel::D))),
    (Channel::C.vi_error_bit(), AlertBit::Always(Notification::ChannelError(Channel::C))),
    (Channel::B.vi_error_bit(), AlertBit::Always(Notification::ChannelError(Channel::B))),
    (Channel::A.vi_error_bit(), AlertBit::Always(Notification::ChannelError(Channel::A))),
];

/// Edge-latch state and the ADC ready pin flag
#[derive(Debug, Clone, Default)]
pub struct StatusAnalyzer {
    below_threshold: [bool; 4],
    adc_ready_pin: bool,
}

impl StatusAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that the ADC_RDY pin fired
    pub fn note_adc_ready_pin(&mut self) {
        self.adc_ready_pin = true;
    }

    pub fn adc_ready_pending(&self) -> bool {
        self.adc_ready_pin
    }

    pub fn is_below_threshold(&self, rail: Rail) -> bool {
        self.below_threshold[rail.index()]
    }

    /// Clear latches after a chip reset
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Analyse the status registers currently valid in `store`
    ///
    /// Both status registers are invalidated afterwards. The returned
    /// exchange holds the write-1-to-clear frames, and is empty when nothing
    /// needs clearing.
    pub fn analyze(
        &mut self,
        store: &mut RegisterStore,
        committed: &CommittedConfig,
        mut report: impl FnMut(Report),
    ) -> Exchange<STATUS_CLEAR_BYTES> {
        let mut clear = Exchange::new(TransactionId::StatusClear, FRAME_BYTES);

        if let Some(alert) = store.try_get(Register::AlertStatus) {
            self.analyze_alert(alert, &mut report);
            store.invalidate(Register::AlertStatus);
            if alert != 0 {
                clear.add_write(Register::AlertStatus, alert);
            }
        }

        if let Some(live) = store.try_get(Register::LiveStatus) {
            if live & live_status::ADC_DATA_RDY != 0 && self.adc_ready_pin {
                let conv_ctrl = store.get(Register::AdcConvCtrl);
                for channel in Channel::ALL {
                    if !conversion_enabled(conv_ctrl, channel) {
                        continue;
                    }
                    // A result rejected on the wire stays invalid until re-read
                    if let Some(raw) = store.try_get(Register::adc_result(channel)) {
                        report(Report::Value(scale(committed, channel, raw)));
                    }
                }
                self.adc_ready_pin = false;
                clear.add_write(Register::LiveStatus, live_status::ADC_DATA_RDY);
            }
            self.analyze_live(live, &mut report);
            store.invalidate(Register::LiveStatus);
        }

        clear
    }

    fn analyze_alert(&mut self, alert: u16, report: &mut impl FnMut(Report)) {
        for (bit, kind) in ALERT_BITS {
            if alert & bit == 0 {
                continue;
            }
            match kind {
                AlertBit::Always(notification) => report(Report::Status(notification)),
                AlertBit::Rail(rail) => {
                    let latch = &mut self.below_threshold[rail.index()];
                    if !*latch {
                        *latch = true;
                        report(Report::Status(Notification::BelowThreshold(rail)));
                    }
                }
            }
        }
    }

    fn analyze_live(&mut self, live: u16, report: &mut impl FnMut(Report)) {
        for rail in Rail::ALL {
            let latch = &mut self.below_threshold[rail.index()];
            if live & rail.live_bit() != 0 && *latch {
                *latch = false;
                report(Report::Status(Notification::AboveThreshold(rail)));
            }
        }
    }
}
