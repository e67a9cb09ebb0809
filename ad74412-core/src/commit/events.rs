//! Events and timer requests exchanged with the host

use crate::exchange::TransactionId;

/// Identifies which step a timer resumes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerTag {
    /// Periodic re-read of invalid registers
    Housekeeping,
    /// Settle time after a software reset elapsed
    SoftwareReset,
    /// Dwell in the current function before parking in high impedance
    WaitBeforeChange,
    /// Dwell in high impedance before the final function
    WaitInHighImpedance,
    /// Wait before loading deferred DAC codes
    WaitBeforeDacUpdate,
}

/// Request to call back after a delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerRequest {
    pub tag: TimerTag,
    pub after_us: u32,
}

impl TimerRequest {
    pub const fn new(tag: TimerTag, after_us: u32) -> Self {
        Self { tag, after_us }
    }
}

/// Inputs to the commit state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommitEvent {
    /// Host asked to commit staged channel functions
    Requested,
    /// A previously requested timer elapsed
    TimerExpired(TimerTag),
    /// An exchange finished on the bus
    ExchangeComplete(TransactionId),
}
