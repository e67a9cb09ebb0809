//! Configuration
//!
//! Hardware-mandated timing and scaling constants, plus the per-device
//! output limits chosen by the board.

pub mod hardware;
pub mod types;

pub use hardware::*;
pub use types::*;
