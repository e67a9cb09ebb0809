//! Reset, read-back and burst read exchanges
//!
//! Reads are pipelined: each READ_SELECT write is answered by the frame
//! that follows it. Burst reads rely on READ_SELECT already pointing at
//! ADC_RESULT0 with auto-read enabled, then clock out results and status
//! in a single long frame.

use ad74412_protocol::regs::{cmd_key, read_select};
use ad74412_protocol::{burst_len, BurstFrames, Register, FRAME_BYTES};

use crate::exchange::{Exchange, TransactionId};
use crate::registers::RegisterStore;

/// Room for the two software reset keys
pub const RESET_EXCHANGE_BYTES: usize = 2 * FRAME_BYTES;

/// First register of the burst block
pub const BURST_FIRST: Register = Register::AdcResult0;

/// Registers in the burst block (ADC_RESULT0 through LIVE_STATUS)
pub const BURST_REGISTERS: usize =
    (Register::LiveStatus.addr() - Register::AdcResult0.addr()) as usize + 1;

/// Size of the single burst frame
pub const BURST_FRAME_BYTES: usize = burst_len(BURST_REGISTERS);

/// Write both software reset keys
pub fn software_reset() -> Exchange<RESET_EXCHANGE_BYTES> {
    let mut exchange = Exchange::new(TransactionId::SoftwareReset, FRAME_BYTES);
    exchange.add_write(Register::CmdKey, cmd_key::SW_RST_KEY1);
    exchange.add_write(Register::CmdKey, cmd_key::SW_RST_KEY2);
    exchange
}

/// Read every register not currently valid, then flush with a NOP
pub fn read_invalid<const N: usize>(store: &RegisterStore, tag: TransactionId) -> Exchange<N> {
    let mut exchange = Exchange::new(tag, FRAME_BYTES);
    for reg in store.invalid_registers() {
        exchange.add_read(reg, false);
    }
    exchange.add_nop();
    exchange
}

/// Store the responses of a completed read-back
///
/// Registers with local changes pending keep their local value. Returns
/// the number of frames rejected by CRC or address checks; those
/// registers stay invalid.
pub fn absorb_reads<const N: usize>(store: &mut RegisterStore, exchange: &Exchange<N>) -> usize {
    let mut rejected = 0;
    for (reg, result) in exchange.read_responses() {
        match result {
            Ok(value) if !store.is_dirty(reg) => store.set(reg, value, false),
            Ok(_) => {}
            Err(_) => {
                store.invalidate(reg);
                rejected += 1;
            }
        }
    }
    rejected
}

/// Point READ_SELECT at the burst block
pub fn position_read_select() -> Exchange<FRAME_BYTES> {
    let mut exchange = Exchange::new(TransactionId::BurstReadInit, FRAME_BYTES);
    exchange.add_write(
        Register::ReadSelect,
        BURST_FIRST.addr() as u16 | read_select::AUTO_RD_EN,
    );
    exchange
}

/// One NOP frame stretched over the whole burst block
pub fn burst_read() -> Exchange<BURST_FRAME_BYTES> {
    let mut exchange = Exchange::new(TransactionId::BurstReadResults, BURST_FRAME_BYTES);
    exchange.add_nop();
    exchange
}

/// Store the registers of a completed burst read
///
/// Returns the number of frames rejected; those registers are left
/// invalid.
pub fn absorb_burst<const N: usize>(store: &mut RegisterStore, exchange: &Exchange<N>) -> usize {
    let received = &exchange.bytes()[..exchange.received()];
    let mut rejected = 0;
    for (addr, result) in BurstFrames::new(received, BURST_FIRST.addr()).take(BURST_REGISTERS) {
        match (Register::from_addr(addr), result) {
            (Some(reg), Ok(value)) => store.set(reg, value, false),
            (Some(reg), Err(_)) => {
                store.invalidate(reg);
                rejected += 1;
            }
            (None, _) => rejected += 1,
        }
    }
    rejected
}
