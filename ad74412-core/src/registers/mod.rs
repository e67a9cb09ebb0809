//! Register cache
//!
//! A shadow of every chip register with per-register status:
//! - `valid`: the cached value is known to match the chip (read back, or an
//!   accepted power-on default)
//! - `dirty`: the cached value was changed locally and must be written

pub mod committed;
pub mod fields;

pub use committed::CommittedConfig;
pub use fields::{AdcMux, AdcRange, ChannelFunction, ConvSeq};

use ad74412_protocol::{Channel, Register, ADDRESS_SPACE};

/// Cache status of one register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterStatus {
    pub valid: bool,
    pub dirty: bool,
}

/// Cached register values indexed by address
#[derive(Debug, Clone)]
pub struct RegisterStore {
    values: [u16; ADDRESS_SPACE],
    status: [RegisterStatus; ADDRESS_SPACE],
}

impl Default for RegisterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterStore {
    /// Create a store holding the power-on defaults
    pub fn new() -> Self {
        let mut store = Self {
            values: [0; ADDRESS_SPACE],
            status: [RegisterStatus::default(); ADDRESS_SPACE],
        };
        store.reset_to_defaults();
        store
    }

    /// Load the power-on defaults
    ///
    /// Everything is trusted except ALERT_STATUS and LIVE_STATUS, which
    /// only become valid once read from the chip.
    pub fn reset_to_defaults(&mut self) {
        self.values = [0; ADDRESS_SPACE];
        self.status = [RegisterStatus::default(); ADDRESS_SPACE];
        for &reg in Register::ALL {
            let i = reg.addr() as usize;
            self.values[i] = reg.reset_value();
            self.status[i].valid = !matches!(reg, Register::AlertStatus | Register::LiveStatus);
        }
    }

    /// Cached value
    ///
    /// Callers must only consume valid registers; an invalid register
    /// returns whatever was last cached.
    pub fn get(&self, reg: Register) -> u16 {
        debug_assert!(self.is_valid(reg), "read of invalid register {:?}", reg);
        self.values[reg.addr() as usize]
    }

    /// Cached value, if valid
    pub fn try_get(&self, reg: Register) -> Option<u16> {
        self.is_valid(reg).then(|| self.values[reg.addr() as usize])
    }

    /// Store a value; the register becomes valid
    pub fn set(&mut self, reg: Register, value: u16, mark_dirty: bool) {
        let i = reg.addr() as usize;
        self.values[i] = value;
        self.status[i].valid = true;
        if mark_dirty {
            self.status[i].dirty = true;
        }
    }

    /// Read-modify-write, marking the register dirty
    pub fn modify(&mut self, reg: Register, f: impl FnOnce(u16) -> u16) {
        let value = f(self.values[reg.addr() as usize]);
        self.set(reg, value, true);
    }

    pub fn status(&self, reg: Register) -> RegisterStatus {
        self.status[reg.addr() as usize]
    }

    pub fn mark_valid(&mut self, reg: Register) {
        self.status[reg.addr() as usize].valid = true;
    }

    pub fn invalidate(&mut self, reg: Register) {
        self.status[reg.addr() as usize].valid = false;
    }

    pub fn mark_dirty(&mut self, reg: Register) {
        self.status[reg.addr() as usize].dirty = true;
    }

    pub fn clear_dirty(&mut self, reg: Register) {
        self.status[reg.addr() as usize].dirty = false;
    }

    pub fn is_dirty(&self, reg: Register) -> bool {
        self.status[reg.addr() as usize].dirty
    }

    pub fn is_valid(&self, reg: Register) -> bool {
        self.status[reg.addr() as usize].valid
    }

    /// Dirty registers in ascending address order
    pub fn dirty_registers(&self) -> impl Iterator<Item = Register> + '_ {
        Register::ALL.iter().copied().filter(|&reg| self.is_dirty(reg))
    }

    /// Registers that need reading, in ascending address order
    pub fn invalid_registers(&self) -> impl Iterator<Item = Register> + '_ {
        Register::ALL.iter().copied().filter(|&reg| !self.is_valid(reg))
    }

    /// Function currently staged for `channel`
    pub fn channel_function(&self, channel: Channel) -> Option<ChannelFunction> {
        fields::ch_func(self.values[Register::ch_func_setup(channel).addr() as usize])
    }
}
