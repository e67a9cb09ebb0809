//! AD74412R device instance
//!
//! Owns one chip's bus, register cache and commit machine, and executes
//! the exchanges and timer requests the core logic produces.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized ──init──▶ Resetting ──SoftwareReset timer──▶ Ready
//! ```
//!
//! Timers are not run by the device. The pending request is either polled
//! with [`Ad74412::take_timer_request`] and delivered back through
//! [`Ad74412::on_timer_expired`], or serviced in place with a blocking delay
//! through [`Ad74412::service_timers`].

use embedded_hal::delay::DelayNs;

use ad74412_core::commit::{CommitEvent, CommitState, CommitStateMachine, CommitStep, TimerRequest, TimerTag};
use ad74412_core::config::{DeviceConfig, RESET_SETTLE_US};
use ad74412_core::exchange::{Exchange, TransactionId, FULL_EXCHANGE_BYTES};
use ad74412_core::mapper::{is_channel_function_modified, stage_channel_function};
use ad74412_core::outputs::{apply_outputs, restore_dirty, stage_output, OutputAction, OUTPUT_EXCHANGE_BYTES};
use ad74412_core::pool::Handle;
use ad74412_core::readback::{
    absorb_burst, absorb_reads, burst_read, position_read_select, read_invalid, software_reset,
};
use ad74412_core::registers::{ChannelFunction, CommittedConfig, RegisterStore};
use ad74412_core::scaler::ChannelValue;
use ad74412_core::status::{Report, StatusAnalyzer};
use ad74412_core::traits::{DeviceListener, FrameBus};
use ad74412_core::{Error, Result};
use ad74412_protocol::{Channel, Register};

/// Interrupt-capable chip pins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pin {
    /// ADC_RDY: a conversion result is available
    AdcReady,
    /// ALERT: a bit in ALERT_STATUS is set
    Alert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum Lifecycle {
    Uninitialized,
    Resetting,
    Ready,
}

/// One AD74412R on a [`FrameBus`]
pub struct Ad74412<B, L> {
    handle: Handle,
    bus: B,
    config: DeviceConfig,
    listener: Option<L>,
    lifecycle: Lifecycle,
    store: RegisterStore,
    committed: CommittedConfig,
    machine: CommitStateMachine,
    analyzer: StatusAnalyzer,
    /// Functions requested while they could not be staged
    pending: [Option<ChannelFunction>; Channel::COUNT],
    read_select_positioned: bool,
    timer: Option<TimerRequest>,
}

impl<B: FrameBus, L: DeviceListener> Ad74412<B, L> {
    /// Create an instance holding the power-on register map
    ///
    /// Nothing is sent on the bus until [`init`](Self::init).
    pub fn new(handle: Handle, bus: B, config: DeviceConfig) -> Self {
        Self {
            handle,
            bus,
            config,
            listener: None,
            lifecycle: Lifecycle::Uninitialized,
            store: RegisterStore::new(),
            committed: CommittedConfig::new(),
            machine: CommitStateMachine::new(),
            analyzer: StatusAnalyzer::new(),
            pending: [None; Channel::COUNT],
            read_select_positioned: false,
            timer: None,
        }
    }

    pub fn handle(&self) -> Handle {
        self.handle
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    pub fn listener(&self) -> Option<&L> {
        self.listener.as_ref()
    }

    pub fn listener_mut(&mut self) -> Option<&mut L> {
        self.listener.as_mut()
    }

    pub fn store(&self) -> &RegisterStore {
        &self.store
    }

    /// Configuration the chip is running with
    pub fn committed(&self) -> &CommittedConfig {
        &self.committed
    }

    pub fn commit_state(&self) -> CommitState {
        self.machine.state()
    }

    /// Reset settled and the initial read-back done
    pub fn is_ready(&self) -> bool {
        self.lifecycle == Lifecycle::Ready
    }

    /// Consume the instance, giving back the bus
    pub fn release(self) -> B {
        self.bus
    }

    /// Reset the chip and start listening
    ///
    /// Sends the software reset keys and requests a
    /// [`TimerTag::SoftwareReset`] settle timer. The instance is ready once
    /// that timer has been delivered and the read-back succeeded. A failed
    /// read-back re-arms the timer; delivering it again retries.
    pub fn init(&mut self, listener: L) -> Result<()> {
        self.config.validate()?;

        self.listener = Some(listener);
        self.store.reset_to_defaults();
        self.committed = CommittedConfig::new();
        self.machine = CommitStateMachine::new();
        self.analyzer.reset();
        self.pending = [None; Channel::COUNT];
        self.timer = None;
        self.lifecycle = Lifecycle::Uninitialized;

        let mut reset = software_reset();
        self.transact(&mut reset)?;

        self.lifecycle = Lifecycle::Resetting;
        self.timer = Some(TimerRequest::new(TimerTag::SoftwareReset, RESET_SETTLE_US));
        debug!("device {}: software reset sent", self.handle.id());
        Ok(())
    }

    /// Stage a new function for `channel`
    ///
    /// Takes effect on the next commit. While the chip is still resetting or
    /// a commit is in flight the request is held and staged once the
    /// instance is idle again.
    pub fn configure_channel(&mut self, channel: Channel, function: ChannelFunction) -> Result<()> {
        match self.lifecycle {
            Lifecycle::Uninitialized => Err(Error::NotInitialized),
            Lifecycle::Ready if self.machine.is_idle() => {
                stage_channel_function(&mut self.store, channel, function);
                Ok(())
            }
            _ => {
                self.pending[channel.index()] = Some(function);
                Ok(())
            }
        }
    }

    /// Whether `channel` has a function change not yet committed
    pub fn is_channel_function_modified(&self, channel: Channel) -> bool {
        self.pending[channel.index()].is_some() || is_channel_function_modified(&self.store, channel)
    }

    /// Start the commit sequence for all staged functions
    ///
    /// Fails with [`Error::BusyDuringCommit`] while a sequence is running.
    pub fn commit_configurations(&mut self) -> Result<()> {
        self.ensure_ready()?;
        let step = self
            .machine
            .advance(CommitEvent::Requested, &mut self.store, &mut self.committed)?;
        debug!("device {}: commit requested", self.handle.id());
        self.drive(step)
    }

    /// Stage and/or load an output value
    ///
    /// During a commit the load is deferred to the end of the sequence.
    pub fn set_output(&mut self, value: ChannelValue, action: OutputAction) -> Result<()> {
        self.ensure_ready()?;

        if action.stages_value() {
            stage_output(&mut self.store, &value, &self.config)?;
        }
        if !action.loads() {
            return Ok(());
        }
        if !self.machine.is_idle() {
            self.machine.defer_output_load();
            return Ok(());
        }

        let mut exchange: Exchange<OUTPUT_EXCHANGE_BYTES> = apply_outputs(&mut self.store, false);
        if let Err(error) = self.transact(&mut exchange) {
            restore_dirty(&mut self.store, &exchange);
            return Err(error);
        }
        Ok(())
    }

    /// Deliver an expired timer
    pub fn on_timer_expired(&mut self, tag: TimerTag) -> Result<()> {
        if self.timer.is_some_and(|request| request.tag == tag) {
            self.timer = None;
        }

        match (self.lifecycle, tag) {
            (Lifecycle::Resetting, TimerTag::SoftwareReset) => {
                let read_back = self
                    .read_invalid_registers(TransactionId::ReadAfterReset)
                    .and_then(|rejected| match rejected {
                        0 => Ok(()),
                        _ => Err(Error::NotInitialized),
                    });
                if let Err(error) = read_back {
                    warn!("device {}: read-back after reset failed", self.handle.id());
                    self.timer = Some(TimerRequest::new(TimerTag::SoftwareReset, RESET_SETTLE_US));
                    return Err(error);
                }
                self.committed.snapshot(&self.store);
                self.lifecycle = Lifecycle::Ready;
                debug!("device {}: ready", self.handle.id());
                self.drain_pending();
                self.analyze_status()
            }
            (Lifecycle::Ready, TimerTag::SoftwareReset) => Ok(()),
            (Lifecycle::Ready, TimerTag::Housekeeping) => {
                self.store.invalidate(Register::AlertStatus);
                self.store.invalidate(Register::LiveStatus);
                self.read_invalid_registers(TransactionId::ReadUnmodified)?;
                self.analyze_status()
            }
            (Lifecycle::Ready, tag) => {
                let step = self.machine.advance(
                    CommitEvent::TimerExpired(tag),
                    &mut self.store,
                    &mut self.committed,
                )?;
                self.drive(step)
            }
            _ => Err(Error::NotInitialized),
        }
    }

    /// ADC_RDY pin fired
    pub fn on_adc_data_ready(&mut self) -> Result<()> {
        self.ensure_ready()?;
        self.analyzer.note_adc_ready_pin();
        self.refresh_status()
    }

    /// ALERT pin fired
    pub fn on_alert(&mut self) -> Result<()> {
        self.ensure_ready()?;
        self.refresh_status()
    }

    pub fn on_pin(&mut self, pin: Pin) -> Result<()> {
        match pin {
            Pin::AdcReady => self.on_adc_data_ready(),
            Pin::Alert => self.on_alert(),
        }
    }

    /// Timer the host should arm, without taking it
    pub fn pending_timer(&self) -> Option<TimerRequest> {
        self.timer
    }

    /// Take the timer the host should arm
    pub fn take_timer_request(&mut self) -> Option<TimerRequest> {
        self.timer.take()
    }

    /// Run pending timers to completion with a blocking delay
    pub fn service_timers(&mut self, delay: &mut impl DelayNs) -> Result<()> {
        while let Some(request) = self.timer.take() {
            delay.delay_us(request.after_us);
            self.on_timer_expired(request.tag)?;
        }
        Ok(())
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(Error::NotInitialized)
        }
    }

    /// Execute machine steps until one needs a timer
    fn drive(&mut self, mut step: CommitStep) -> Result<()> {
        loop {
            step = match step {
                CommitStep::Nothing => break,
                CommitStep::Schedule(request) => {
                    self.timer = Some(request);
                    break;
                }
                CommitStep::Submit(mut exchange) => {
                    let tag = exchange.tag();
                    if let Err(error) = self.transact(&mut exchange) {
                        self.machine.abort();
                        restore_dirty(&mut self.store, &exchange);
                        self.drain_pending();
                        return Err(error);
                    }
                    self.machine.advance(
                        CommitEvent::ExchangeComplete(tag),
                        &mut self.store,
                        &mut self.committed,
                    )?
                }
            };
        }

        debug!("device {}: commit state {}", self.handle.id(), self.machine.state());
        if self.machine.is_idle() {
            self.drain_pending();
        }
        Ok(())
    }

    fn drain_pending(&mut self) {
        if self.lifecycle != Lifecycle::Ready || !self.machine.is_idle() {
            return;
        }
        for channel in Channel::ALL {
            if let Some(function) = self.pending[channel.index()].take() {
                stage_channel_function(&mut self.store, channel, function);
            }
        }
    }

    /// Returns the number of rejected frames; those registers stay invalid
    fn read_invalid_registers(&mut self, tag: TransactionId) -> Result<usize> {
        let mut exchange: Exchange<FULL_EXCHANGE_BYTES> = read_invalid(&self.store, tag);
        self.transact(&mut exchange)?;
        let rejected = absorb_reads(&mut self.store, &exchange);
        if rejected > 0 {
            warn!("device {}: {} read-back frames rejected", self.handle.id(), rejected);
        }
        Ok(rejected)
    }

    /// Burst read results and status, then analyse them
    fn refresh_status(&mut self) -> Result<()> {
        if !self.read_select_positioned {
            let mut position = position_read_select();
            self.transact(&mut position)?;
            self.read_select_positioned = true;
        }

        let mut burst = burst_read();
        self.transact(&mut burst)?;
        let rejected = absorb_burst(&mut self.store, &burst);
        if rejected > 0 {
            warn!("device {}: {} burst frames rejected", self.handle.id(), rejected);
        }
        self.analyze_status()
    }

    fn analyze_status(&mut self) -> Result<()> {
        let handle = self.handle;
        let listener = &mut self.listener;
        let mut clear = self
            .analyzer
            .analyze(&mut self.store, &self.committed, |report| {
                let Some(listener) = listener.as_mut() else {
                    return;
                };
                match report {
                    Report::Value(value) => listener.on_new_value(handle, value),
                    Report::Status(notification) => {
                        debug!("device {}: {}", handle.id(), notification);
                        listener.on_status_change(handle, notification);
                    }
                }
            });
        self.transact(&mut clear)
    }

    /// Clock an exchange over the bus
    ///
    /// Empty exchanges are skipped. Anything but a burst moves READ_SELECT
    /// or may have, so the burst positioning is forgotten.
    fn transact<const N: usize>(&mut self, exchange: &mut Exchange<N>) -> Result<()> {
        let tag = exchange.tag();
        if let Err(error) = exchange.status() {
            warn!("device {}: {} not built: {}", self.handle.id(), tag, error);
            return Err(error);
        }
        if exchange.is_empty() {
            return Ok(());
        }

        trace!("device {}: {} ({} bytes)", self.handle.id(), tag, exchange.len());
        if !matches!(
            tag,
            TransactionId::BurstReadInit | TransactionId::BurstReadResults
        ) {
            self.read_select_positioned = false;
        }

        let bus = &mut self.bus;
        let result = exchange.transfer_with(|frame| bus.transfer(frame));
        result.map_err(|_| {
            warn!("device {}: bus failure during {}", self.handle.id(), tag);
            Error::BusFailure
        })
    }
}
