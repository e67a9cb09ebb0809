//! Commit state machine
//!
//! ```text
//! Idle ──request──▶ WaitBeforeChange ──130µs──▶ PreparingHighImpedance
//!   ▲                                                │ prepare exchange done
//!   │                                                ▼
//! WaitBeforeDacUpdate ◀──done── SettingDesiredState ◀──130µs── WaitInHighImpedance
//!   │ 150µs: load deferred outputs, back to Idle
//! ```

use ad74412_protocol::regs::cmd_key;
use ad74412_protocol::{Channel, Register, FRAME_BYTES};

use super::events::{CommitEvent, TimerRequest, TimerTag};
use crate::config::{CHANNEL_MINIMUM_TIME_US, DAC_UPDATE_DELAY_US};
use crate::error::{Error, Result};
use crate::exchange::{Exchange, TransactionId, FULL_EXCHANGE_BYTES};
use crate::mapper::{any_conversion_enabled, is_channel_function_modified};
use crate::outputs::apply_outputs;
use crate::registers::fields::set_conv_seq;
use crate::registers::{CommittedConfig, ConvSeq, RegisterStore};

/// Capacity of every exchange the machine builds
pub const COMMIT_EXCHANGE_BYTES: usize = FULL_EXCHANGE_BYTES;

/// Commit sequence states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommitState {
    #[default]
    Idle,
    /// Dwelling in the old functions
    WaitBeforeChange,
    /// Exchange parking modified channels in high impedance is on the bus
    PreparingHighImpedance,
    /// Dwelling in high impedance
    WaitInHighImpedance,
    /// Exchange writing the final configuration is on the bus
    SettingDesiredState,
    /// Waiting before the deferred DAC load
    WaitBeforeDacUpdate,
}

impl CommitState {
    pub fn is_idle(&self) -> bool {
        matches!(self, CommitState::Idle)
    }
}

/// What the host must do after an event
#[derive(Debug)]
pub enum CommitStep {
    /// Nothing; the event did not apply to the current state
    Nothing,
    /// Arm a timer and deliver its tag back when it expires
    Schedule(TimerRequest),
    /// Put the exchange on the bus, then report its completion
    Submit(Exchange<COMMIT_EXCHANGE_BYTES>),
}

/// Drives one device's commit sequence
#[derive(Debug, Clone, Default)]
pub struct CommitStateMachine {
    state: CommitState,
    deferred_load: bool,
}

impl CommitStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CommitState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state.is_idle()
    }

    /// Load outputs at the end of the sequence even if no code is dirty
    pub fn defer_output_load(&mut self) {
        self.deferred_load = true;
    }

    /// Drop back to `Idle` after a failed exchange
    pub fn abort(&mut self) {
        self.state = CommitState::Idle;
    }

    /// Feed one event through the machine
    ///
    /// Events that do not belong to the current state are ignored, except a
    /// commit request outside `Idle`, which is rejected as busy.
    pub fn advance(
        &mut self,
        event: CommitEvent,
        store: &mut RegisterStore,
        committed: &mut CommittedConfig,
    ) -> Result<CommitStep> {
        use CommitEvent::*;
        use CommitState::*;

        let (next, step) = match (self.state, event) {
            (Idle, Requested) => (
                WaitBeforeChange,
                CommitStep::Schedule(TimerRequest::new(
                    TimerTag::WaitBeforeChange,
                    CHANNEL_MINIMUM_TIME_US,
                )),
            ),
            (_, Requested) => return Err(Error::BusyDuringCommit),

            (WaitBeforeChange, TimerExpired(TimerTag::WaitBeforeChange)) => (
                PreparingHighImpedance,
                CommitStep::Submit(build_prepare(store)),
            ),

            (PreparingHighImpedance, ExchangeComplete(TransactionId::CommitPrepare)) => {
                for channel in Channel::ALL {
                    if is_channel_function_modified(store, channel) {
                        committed.set_high_impedance(channel);
                    }
                }
                (
                    WaitInHighImpedance,
                    CommitStep::Schedule(TimerRequest::new(
                        TimerTag::WaitInHighImpedance,
                        CHANNEL_MINIMUM_TIME_US,
                    )),
                )
            }

            (WaitInHighImpedance, TimerExpired(TimerTag::WaitInHighImpedance)) => (
                SettingDesiredState,
                CommitStep::Submit(build_set_desired(store, committed)),
            ),

            (SettingDesiredState, ExchangeComplete(TransactionId::CommitSetDesired)) => (
                WaitBeforeDacUpdate,
                CommitStep::Schedule(TimerRequest::new(
                    TimerTag::WaitBeforeDacUpdate,
                    DAC_UPDATE_DELAY_US,
                )),
            ),

            (WaitBeforeDacUpdate, TimerExpired(TimerTag::WaitBeforeDacUpdate)) => {
                let force = core::mem::take(&mut self.deferred_load);
                (Idle, CommitStep::Submit(apply_outputs(store, force)))
            }

            (state, _) => (state, CommitStep::Nothing),
        };

        self.state = next;
        Ok(step)
    }
}

/// Stop conversions, zero and load the DACs of modified channels, then
/// park those channels in high impedance
fn build_prepare(store: &mut RegisterStore) -> Exchange<COMMIT_EXCHANGE_BYTES> {
    let mut exchange = Exchange::new(TransactionId::CommitPrepare, FRAME_BYTES);
    exchange.add_write(Register::AdcConvCtrl, Register::AdcConvCtrl.reset_value());

    let modified = Channel::ALL.map(|channel| is_channel_function_modified(store, channel));

    for channel in Channel::ALL {
        if modified[channel.index()] {
            let dac = Register::dac_code(channel);
            let clear_code = Register::dac_clr_code(channel).reset_value();
            exchange.add_write(dac, clear_code);
            store.set(dac, clear_code, false);
            store.clear_dirty(dac);
        }
    }
    exchange.add_write(Register::CmdKey, cmd_key::LDAC_KEY);
    for channel in Channel::ALL {
        if modified[channel.index()] {
            let ch_func = Register::ch_func_setup(channel);
            exchange.add_write(ch_func, ch_func.reset_value());
        }
    }
    exchange
}

/// Write every dirty register in ascending order and record the result as
/// committed
fn build_set_desired(
    store: &mut RegisterStore,
    committed: &mut CommittedConfig,
) -> Exchange<COMMIT_EXCHANGE_BYTES> {
    let seq = if any_conversion_enabled(store) {
        ConvSeq::Continuous
    } else {
        ConvSeq::Idle
    };
    store.modify(Register::AdcConvCtrl, |v| set_conv_seq(v, seq));

    let mut exchange = Exchange::new(TransactionId::CommitSetDesired, FRAME_BYTES);
    for &reg in Register::ALL {
        if store.is_dirty(reg) {
            exchange.add_write(reg, store.get(reg));
            store.clear_dirty(reg);
        }
    }
    committed.snapshot(store);
    exchange
}
