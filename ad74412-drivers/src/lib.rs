//! AD74412R device instances and bus glue
//!
//! This crate runs the plans built by `ad74412-core` against real
//! hardware:
//!
//! - [`SpiFrameBus`]: frame transport over an `embedded-hal` SPI device
//! - [`Ad74412`]: one chip, driven by host calls, pin events and timers
//! - [`Ad74412Pool`]: handle-based access to a fixed number of chips
//!
//! Logging goes through defmt when the `defmt` feature is enabled.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod bus;
pub mod device;
pub mod pool;

pub use bus::SpiFrameBus;
pub use device::{Ad74412, Pin};
pub use pool::Ad74412Pool;
