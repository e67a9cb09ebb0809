//! Host abstraction traits
//!
//! These traits define the interface between the device logic and the
//! platform: the bus that carries frames and the application that
//! receives values and notifications.

pub mod bus;
pub mod listener;

pub use bus::FrameBus;
pub use listener::{Callbacks, DeviceListener};
