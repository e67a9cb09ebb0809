//! Driver error type

use ad74412_protocol::ChannelIndexOutOfRange;

/// Errors returned by the device abstraction layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Bus transfer primitive failed
    BusFailure,
    /// Exchange buffer too small for the requested frames
    NoResources,
    /// Inconsistent request (frame size below one frame, empty output range)
    InvalidRequest,
    /// Handle does not refer to an acquired instance
    UnknownOrInactiveHandle,
    /// Output value written to a channel not configured as that kind of output
    WrongActionForChannelType,
    /// Channel index outside the four channels
    ChannelIndexOutOfRange,
    /// Commit requested while a commit sequence is in flight
    BusyDuringCommit,
    /// Requested output outside the configured limits
    ValueOutOfRange,
    /// Device has not been initialised
    NotInitialized,
}

impl From<ChannelIndexOutOfRange> for Error {
    fn from(_: ChannelIndexOutOfRange) -> Self {
        Error::ChannelIndexOutOfRange
    }
}

/// Result alias used throughout the crate
pub type Result<T> = core::result::Result<T, Error>;
