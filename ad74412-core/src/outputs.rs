//! Output (DAC) staging and loading

use ad74412_protocol::regs::cmd_key;
use ad74412_protocol::{Channel, Register, FRAME_BYTES};

use crate::config::DeviceConfig;
use crate::error::{Error, Result};
use crate::exchange::{Exchange, TransactionId};
use crate::registers::fields::ch_func;
use crate::registers::{ChannelFunction, RegisterStore};
use crate::scaler::{output_code, ChannelValue, ValueKind};

/// Room for four DAC codes and the load command
pub const OUTPUT_EXCHANGE_BYTES: usize = (Channel::COUNT + 1) * FRAME_BYTES;

/// How `set_output` treats the value and the DAC load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputAction {
    /// Stage the value; load it with a later `WriteQueued` or `Write`
    Queue,
    /// Stage the value and load every staged output
    Write,
    /// Load every staged output; the value is ignored
    WriteQueued,
}

impl OutputAction {
    pub const fn stages_value(self) -> bool {
        matches!(self, OutputAction::Queue | OutputAction::Write)
    }

    pub const fn loads(self) -> bool {
        matches!(self, OutputAction::Write | OutputAction::WriteQueued)
    }
}

/// Stage `value` into its channel's DAC code
///
/// The channel's staged function must be an output of the matching kind.
/// Returns whether the cached code changed; an unchanged code stays clean.
pub fn stage_output(
    store: &mut RegisterStore,
    value: &ChannelValue,
    config: &DeviceConfig,
) -> Result<bool> {
    let function = ch_func(store.get(Register::ch_func_setup(value.channel)))
        .ok_or(Error::WrongActionForChannelType)?;
    let range = match (function, value.kind) {
        (ChannelFunction::CurrentOutput, ValueKind::Current) => &config.current_output,
        _ => &config.voltage_output,
    };
    let code = output_code(function, value.kind, value.value, range)?;

    let reg = Register::dac_code(value.channel);
    if store.get(reg) == code {
        return Ok(false);
    }
    store.set(reg, code, true);
    Ok(true)
}

/// Build the exchange writing dirty DAC codes followed by the load key
///
/// The load key is only sent when a code was written or `force_load` is
/// set; otherwise the exchange is empty.
pub fn apply_outputs<const N: usize>(store: &mut RegisterStore, force_load: bool) -> Exchange<N> {
    let mut exchange = Exchange::new(TransactionId::SetOutput, FRAME_BYTES);
    let mut load = force_load;
    for channel in Channel::ALL {
        let reg = Register::dac_code(channel);
        if store.is_dirty(reg) {
            exchange.add_write(reg, store.get(reg));
            store.clear_dirty(reg);
            load = true;
        }
    }
    if load {
        store.set(Register::CmdKey, cmd_key::LDAC_KEY, false);
        exchange.add_write(Register::CmdKey, cmd_key::LDAC_KEY);
    }
    exchange
}

/// Re-mark the registers a failed exchange was carrying as dirty
///
/// READ_SELECT and CMD_KEY writes are commands, not state, and are skipped.
pub fn restore_dirty<const N: usize>(store: &mut RegisterStore, exchange: &Exchange<N>) {
    for reg in exchange.written_registers() {
        if !matches!(reg, Register::ReadSelect | Register::CmdKey) {
            store.mark_dirty(reg);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ad74412_protocol::encode_write;

    use crate::mapper::stage_channel_function;

    fn store_with(channel: Channel, function: ChannelFunction) -> RegisterStore {
        let mut store = RegisterStore::new();
        stage_channel_function(&mut store, channel, function);
        store.clear_dirty(Register::dac_code(channel));
        store
    }

    #[test]
    fn test_stage_voltage_output() {
        let mut store = store_with(Channel::A, ChannelFunction::VoltageOutput);
        let config = DeviceConfig::default();

        let value = ChannelValue::voltage(Channel::A, 11.0);
        assert_eq!(stage_output(&mut store, &value, &config), Ok(true));
        assert_eq!(store.get(Register::DacCode0), 0x1FFF);
        assert!(store.is_dirty(Register::DacCode0));

        store.clear_dirty(Register::DacCode0);
        assert_eq!(stage_output(&mut store, &value, &config), Ok(false));
        assert!(!store.is_dirty(Register::DacCode0));
    }

    #[test]
    fn test_stage_wrong_channel_type() {
        let mut store = store_with(Channel::B, ChannelFunction::VoltageInput);
        let config = DeviceConfig::default();
        assert_eq!(
            stage_output(&mut store, &ChannelValue::voltage(Channel::B, 1.0), &config),
            Err(Error::WrongActionForChannelType)
        );

        let mut store = store_with(Channel::B, ChannelFunction::CurrentOutput);
        assert_eq!(
            stage_output(&mut store, &ChannelValue::voltage(Channel::B, 1.0), &config),
            Err(Error::WrongActionForChannelType)
        );
        assert_eq!(
            stage_output(&mut store, &ChannelValue::current(Channel::B, 0.0125), &config),
            Ok(true)
        );
    }

    #[test]
    fn test_apply_outputs() {
        let mut store = RegisterStore::new();
        store.set(Register::DacCode2, 0x0800, true);

        let exchange: Exchange<OUTPUT_EXCHANGE_BYTES> = apply_outputs(&mut store, false);
        assert_eq!(exchange.status(), Ok(()));
        assert_eq!(&exchange.bytes()[..4], &encode_write(0x18, 0x0800));
        assert_eq!(&exchange.bytes()[4..], &encode_write(0x44, cmd_key::LDAC_KEY));
        assert!(!store.is_dirty(Register::DacCode2));

        let exchange: Exchange<OUTPUT_EXCHANGE_BYTES> = apply_outputs(&mut store, false);
        assert!(exchange.is_empty());

        let exchange: Exchange<OUTPUT_EXCHANGE_BYTES> = apply_outputs(&mut store, true);
        assert_eq!(exchange.bytes(), &encode_write(0x44, cmd_key::LDAC_KEY));
    }

    #[test]
    fn test_restore_dirty() {
        let mut store = RegisterStore::new();
        store.set(Register::DacCode1, 0x0100, true);
        let exchange: Exchange<OUTPUT_EXCHANGE_BYTES> = apply_outputs(&mut store, false);
        assert!(!store.is_dirty(Register::DacCode1));

        restore_dirty(&mut store, &exchange);
        assert!(store.is_dirty(Register::DacCode1));
        assert!(!store.is_dirty(Register::CmdKey));
    }
}
