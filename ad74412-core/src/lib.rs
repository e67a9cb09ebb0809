//! Board-agnostic core logic for the AD74412R device layer
//!
//! This crate contains all logic that does not touch a bus or a timer:
//!
//! - Register cache with per-register valid/dirty tracking
//! - Channel function to register field mapping
//! - Exchange building (writes, pipelined reads, burst reads)
//! - Commit state machine for channel function changes
//! - Status analysis and ADC scaling
//! - Instance pool and host traits
//!
//! The device object in `ad74412-drivers` executes what this crate plans.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod commit;
pub mod config;
pub mod error;
pub mod exchange;
pub mod mapper;
pub mod outputs;
pub mod pool;
pub mod readback;
pub mod registers;
pub mod scaler;
pub mod status;
pub mod traits;

pub use error::{Error, Result};
pub use exchange::{Exchange, TransactionId};
pub use pool::{Handle, Pool};
pub use registers::{ChannelFunction, RegisterStore};
pub use scaler::{ChannelValue, ValueKind};
pub use status::{Notification, Rail, Report};
