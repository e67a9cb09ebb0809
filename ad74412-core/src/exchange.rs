//! Bus exchange building
//!
//! An [`Exchange`] is one bus transaction: a buffer of frames queued for
//! transmission, later overwritten in place by the bytes clocked back.
//! Builders fail closed; the first error is latched and every later add is
//! a no-op, so callers check [`Exchange::status`] once before submitting.

use heapless::Vec;

use ad74412_protocol::regs::read_select;
use ad74412_protocol::{encode_register_write, parse_response, FrameError, Register, FRAME_BYTES};

use crate::error::{Error, Result};

/// Enough room to read every register plus a flushing NOP
pub const FULL_EXCHANGE_BYTES: usize = (Register::COUNT + 1) * FRAME_BYTES;

/// Filler clocked out after the leading frame of a burst
pub const BURST_FILL: u8 = 0x55;

/// Most reads one exchange can track
const MAX_READS: usize = Register::COUNT;

/// Which logical step an exchange belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransactionId {
    /// Software reset key sequence
    SoftwareReset,
    /// Read-back of every register after a reset
    ReadAfterReset,
    /// Housekeeping read of every invalid register
    ReadUnmodified,
    /// Point READ_SELECT at the start of the result block
    BurstReadInit,
    /// Burst read of results and status
    BurstReadResults,
    /// Write-1-to-clear of status bits
    StatusClear,
    /// DAC code update and load
    SetOutput,
    /// Park modified channels in high impedance
    CommitPrepare,
    /// Write the requested configuration
    CommitSetDesired,
}

/// One bus transaction under construction or completed
#[derive(Debug, Clone)]
pub struct Exchange<const N: usize> {
    tag: TransactionId,
    frame_size: usize,
    buf: Vec<u8, N>,
    received: usize,
    result: Result<()>,
    /// `(frame index of the READ_SELECT write, register selected)`
    reads: Vec<(u8, Register), MAX_READS>,
    /// Bit per address written by this exchange
    written: u128,
}

impl<const N: usize> Exchange<N> {
    /// Start an exchange clocked `frame_size` bytes at a time
    pub fn new(tag: TransactionId, frame_size: usize) -> Self {
        let result = if frame_size < FRAME_BYTES {
            Err(Error::InvalidRequest)
        } else {
            Ok(())
        };
        Self {
            tag,
            frame_size,
            buf: Vec::new(),
            received: 0,
            result,
            reads: Vec::new(),
            written: 0,
        }
    }

    fn latch(&mut self, error: Error) {
        if self.result.is_ok() {
            self.result = Err(error);
        }
    }

    /// Queue a register write
    ///
    /// In exchanges with frames longer than [`FRAME_BYTES`] the remainder of
    /// the frame is padded with [`BURST_FILL`].
    pub fn add_write(&mut self, reg: Register, data: u16) {
        if self.result.is_err() {
            return;
        }
        if self.buf.len() + self.frame_size > N {
            self.latch(Error::NoResources);
            return;
        }
        let frame = encode_register_write(reg, data);
        // Capacity checked above
        let _ = self.buf.extend_from_slice(&frame);
        while self.buf.len() % self.frame_size != 0 {
            let _ = self.buf.push(BURST_FILL);
        }
        if reg != Register::Nop {
            self.written |= 1u128 << reg.addr();
        }
    }

    /// Queue a read of `reg` through READ_SELECT
    ///
    /// The value arrives in the next frame; `flush` appends a NOP to carry it.
    pub fn add_read(&mut self, reg: Register, flush: bool) {
        let frame_index = self.frames();
        self.add_write(Register::ReadSelect, reg.addr() as u16 | read_select::AUTO_RD_EN);
        if self.result.is_ok() {
            if frame_index > u8::MAX as usize || self.reads.push((frame_index as u8, reg)).is_err() {
                self.latch(Error::NoResources);
                return;
            }
        }
        if flush {
            self.add_nop();
        }
    }

    /// Queue a NOP frame
    pub fn add_nop(&mut self) {
        self.add_write(Register::Nop, 0);
    }

    /// Latched build result
    pub fn status(&self) -> Result<()> {
        self.result
    }

    pub fn tag(&self) -> TransactionId {
        self.tag
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Frames queued
    pub fn frames(&self) -> usize {
        self.buf.len() / self.frame_size.max(1)
    }

    /// Bytes queued for transmission
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Bytes clocked back so far
    pub fn received(&self) -> usize {
        self.received
    }

    /// Queued bytes; after a transfer these are the bytes received
    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Registers written by this exchange, ascending
    pub fn written_registers(&self) -> impl Iterator<Item = Register> + '_ {
        Register::ALL
            .iter()
            .copied()
            .filter(move |reg| self.written & (1u128 << reg.addr()) != 0)
    }

    /// Clock the exchange through `transfer`, one frame per call
    ///
    /// Each frame is replaced in place by the bytes received for it. Stops
    /// at the first failing frame.
    pub fn transfer_with<E>(
        &mut self,
        mut transfer: impl FnMut(&mut [u8]) -> core::result::Result<(), E>,
    ) -> core::result::Result<(), E> {
        let frame_size = self.frame_size;
        for frame in self.buf.chunks_mut(frame_size) {
            transfer(frame)?;
            self.received += frame.len();
        }
        Ok(())
    }

    /// Responses to the queued reads, in queue order
    ///
    /// A read whose response frame was not received is skipped.
    pub fn read_responses(&self) -> impl Iterator<Item = (Register, core::result::Result<u16, FrameError>)> + '_ {
        self.reads.iter().filter_map(move |&(index, reg)| {
            let start = (index as usize + 1) * self.frame_size;
            let end = start + FRAME_BYTES;
            if end > self.received {
                return None;
            }
            let frame: &[u8; FRAME_BYTES] = self.buf.get(start..end)?.try_into().ok()?;
            Some((reg, parse_response(frame, reg.addr())))
        })
    }
}
