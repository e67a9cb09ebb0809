//! AD74412R SPI protocol
//!
//! Register map and frame codec for the AD74412R quad-channel software
//! configurable I/O chip. Pure data: no bus access, no state.
//!
//! # Protocol Overview
//!
//! Every bus transaction is a sequence of CRC-protected 4-byte frames:
//! ```text
//! ┌─────────┬─────────┬─────────┬──────┐
//! │ ADDRESS │ DATA_HI │ DATA_LO │ CRC8 │
//! │ 1B      │ 1B      │ 1B      │ 1B   │
//! └─────────┴─────────┴─────────┴──────┘
//! ```
//!
//! Reads go through READ_SELECT and come back one frame later.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod frame;
pub mod regs;

pub use frame::{
    burst_len, crc8, encode_register_write, encode_write, parse_burst_continuation,
    parse_response, validate_burst_continuation, validate_response, BurstFrames, FrameError,
    CONTINUATION_BYTES, FRAME_BYTES,
};
pub use regs::{Channel, ChannelIndexOutOfRange, Register, ADDRESS_SPACE};
