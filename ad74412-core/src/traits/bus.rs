//! Frame transport trait

/// Full-duplex, blocking transport for chip frames
///
/// Implementations clock `frame` out and overwrite it with the bytes
/// received during the same transfer. Called once per frame; a burst read
/// passes the whole burst as one frame.
pub trait FrameBus {
    /// Transport-specific failure
    type Error: core::fmt::Debug;

    /// Exchange one frame in place
    fn transfer(&mut self, frame: &mut [u8]) -> Result<(), Self::Error>;
}

impl<T: FrameBus + ?Sized> FrameBus for &mut T {
    type Error = T::Error;

    fn transfer(&mut self, frame: &mut [u8]) -> Result<(), Self::Error> {
        T::transfer(self, frame)
    }
}
