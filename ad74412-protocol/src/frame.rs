//! Frame encoding and decoding for the AD74412R SPI interface.
//!
//! Frame format (MSB first on the wire):
//! - ADDRESS (1 byte): register address; bit 7 is set by the chip in responses
//! - DATA (2 bytes): big-endian register value
//! - CRC (1 byte): CRC-8 over the three preceding bytes
//!
//! The chip answers one frame late: the response to a READ_SELECT write
//! arrives in the next frame clocked out. A burst read keeps clocking after
//! the first response frame; each following register arrives as a 3-byte
//! continuation (`DATA_HI`, `DATA_LO`, `CRC`) with an implicit address.

use crate::regs::Register;

/// Size of a single frame
pub const FRAME_BYTES: usize = 4;

/// Size of a burst-read continuation frame
pub const CONTINUATION_BYTES: usize = 3;

/// Set by the chip in byte 0 of every response frame
pub const RESPONSE_MARKER: u8 = 0x80;

/// Address bits of byte 0
pub const ADDRESS_MASK: u8 = 0x7F;

/// CRC-8 generator polynomial (x^8 + x^2 + x + 1) without the implicit top bit
const CRC_POLY: u8 = 0x07;

/// Errors detected while checking a received frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Bit 7 of the address byte was clear
    MissingResponseMarker,
    /// Response carried a different register address
    AddressMismatch,
    /// CRC byte did not match the frame contents
    CrcMismatch,
}

/// CRC-8 used by the chip, MSB first, initial value 0
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = 0u8;
    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            if crc & 0x80 != 0 {
                crc = (crc << 1) ^ CRC_POLY;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}

/// Build a write frame
pub fn encode_write(addr: u8, data: u16) -> [u8; FRAME_BYTES] {
    let [hi, lo] = data.to_be_bytes();
    let mut frame = [addr & ADDRESS_MASK, hi, lo, 0];
    frame[3] = crc8(&frame[..3]);
    frame
}

/// Build a write frame for a known register
pub fn encode_register_write(reg: Register, data: u16) -> [u8; FRAME_BYTES] {
    encode_write(reg.addr(), data)
}

/// Check a response frame and extract its data
pub fn parse_response(frame: &[u8; FRAME_BYTES], expected_addr: u8) -> Result<u16, FrameError> {
    if frame[0] & RESPONSE_MARKER == 0 {
        return Err(FrameError::MissingResponseMarker);
    }
    if frame[0] & ADDRESS_MASK != expected_addr & ADDRESS_MASK {
        return Err(FrameError::AddressMismatch);
    }
    if crc8(&frame[..3]) != frame[3] {
        return Err(FrameError::CrcMismatch);
    }
    Ok(u16::from_be_bytes([frame[1], frame[2]]))
}

/// True iff `frame` is a well-formed response for `expected_addr`
pub fn validate_response(frame: &[u8; FRAME_BYTES], expected_addr: u8) -> bool {
    parse_response(frame, expected_addr).is_ok()
}

/// Check a burst continuation frame and extract its data
///
/// The CRC window is the two data bytes with an implicit zero address byte
/// on top, which leaves a zero-initialised CRC unchanged.
pub fn parse_burst_continuation(frame: &[u8; CONTINUATION_BYTES]) -> Result<u16, FrameError> {
    if crc8(&frame[..2]) != frame[2] {
        return Err(FrameError::CrcMismatch);
    }
    Ok(u16::from_be_bytes([frame[0], frame[1]]))
}

/// True iff the continuation frame's CRC matches
pub fn validate_burst_continuation(frame: &[u8; CONTINUATION_BYTES]) -> bool {
    parse_burst_continuation(frame).is_ok()
}

/// Bytes needed to burst-read `count` sequential registers
pub const fn burst_len(count: usize) -> usize {
    if count == 0 {
        0
    } else {
        FRAME_BYTES + (count - 1) * CONTINUATION_BYTES
    }
}

/// Walks a received burst buffer, yielding `(address, result)` per register
#[derive(Debug, Clone)]
pub struct BurstFrames<'a> {
    buf: &'a [u8],
    next_addr: u8,
    offset: usize,
}

impl<'a> BurstFrames<'a> {
    /// `first_addr` is the register READ_SELECT pointed at when the burst began
    pub fn new(buf: &'a [u8], first_addr: u8) -> Self {
        Self {
            buf,
            next_addr: first_addr,
            offset: 0,
        }
    }
}

impl Iterator for BurstFrames<'_> {
    type Item = (u8, Result<u16, FrameError>);

    fn next(&mut self) -> Option<Self::Item> {
        let addr = self.next_addr;
        let result = if self.offset == 0 {
            let frame: &[u8; FRAME_BYTES] = self.buf.get(..FRAME_BYTES)?.try_into().ok()?;
            self.offset = FRAME_BYTES;
            parse_response(frame, addr)
        } else {
            let end = self.offset + CONTINUATION_BYTES;
            let frame: &[u8; CONTINUATION_BYTES] =
                self.buf.get(self.offset..end)?.try_into().ok()?;
            self.offset = end;
            parse_burst_continuation(frame)
        };
        self.next_addr = addr.wrapping_add(1);
        Some((addr, result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_crc_vectors() {
        assert_eq!(crc8(&[0x41, 0x00, 0x2E]), 0x27);
        assert_eq!(crc8(&[0xAE, 0xA0, 0x20]), 0x9C);
    }

    #[test]
    fn test_encode_write() {
        let frame = encode_write(0x41, 0x002E);
        assert_eq!(frame, [0x41, 0x00, 0x2E, 0x27]);

        // Address byte never carries the response marker on writes
        let frame = encode_write(0xC1, 0x002E);
        assert_eq!(frame[0], 0x41);
    }

    fn response(addr: u8, data: u16) -> [u8; FRAME_BYTES] {
        let [hi, lo] = data.to_be_bytes();
        let mut frame = [addr | RESPONSE_MARKER, hi, lo, 0];
        frame[3] = crc8(&frame[..3]);
        frame
    }

    #[test]
    fn test_parse_response() {
        let frame = response(0x2E, 0x8000);
        assert_eq!(parse_response(&frame, 0x2E), Ok(0x8000));
        assert_eq!(parse_response(&frame, 0x2F), Err(FrameError::AddressMismatch));

        let mut bad_crc = frame;
        bad_crc[3] ^= 0x01;
        assert_eq!(parse_response(&bad_crc, 0x2E), Err(FrameError::CrcMismatch));

        let echo = encode_write(0x2E, 0x8000);
        assert_eq!(parse_response(&echo, 0x2E), Err(FrameError::MissingResponseMarker));
    }

    #[test]
    fn test_burst_continuation() {
        let frame = [0x12, 0x34, crc8(&[0x12, 0x34])];
        assert_eq!(parse_burst_continuation(&frame), Ok(0x1234));
        // Same CRC as a full frame with a zero address byte
        assert_eq!(frame[2], crc8(&[0x00, 0x12, 0x34]));

        let mut bad = frame;
        bad[1] ^= 0x80;
        assert!(!validate_burst_continuation(&bad));
    }

    #[test]
    fn test_burst_len() {
        assert_eq!(burst_len(0), 0);
        assert_eq!(burst_len(1), 4);
        // ADC_RESULT0 through LIVE_STATUS
        assert_eq!(burst_len(10), 31);
    }

    #[test]
    fn test_burst_frames() {
        let mut buf = [0u8; 10];
        buf[..4].copy_from_slice(&response(0x26, 0xFFFF));
        buf[4..7].copy_from_slice(&[0x00, 0x01, crc8(&[0x00, 0x01])]);
        buf[7..10].copy_from_slice(&[0xAB, 0xCD, 0x00]);

        let mut frames = BurstFrames::new(&buf, 0x26);
        assert_eq!(frames.next(), Some((0x26, Ok(0xFFFF))));
        assert_eq!(frames.next(), Some((0x27, Ok(0x0001))));
        assert_eq!(frames.next(), Some((0x28, Err(FrameError::CrcMismatch))));
        assert_eq!(frames.next(), None);
    }

    proptest! {
        #[test]
        fn prop_write_round_trip(addr in 0u8..128, data in any::<u16>()) {
            let mut frame = encode_write(addr, data);
            frame[0] |= RESPONSE_MARKER;
            prop_assert_eq!(parse_response(&frame, addr), Ok(data));
        }

        #[test]
        fn prop_single_bit_flip_detected(addr in 0u8..128, data in any::<u16>(), bit in 0usize..32) {
            let mut frame = encode_write(addr, data);
            frame[0] |= RESPONSE_MARKER;
            frame[bit / 8] ^= 1 << (bit % 8);
            prop_assert!(!validate_response(&frame, addr));
        }
    }
}
