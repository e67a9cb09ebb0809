//! embedded-hal SPI transport
//!
//! The wrapped [`SpiDevice`] owns chip select and must already be set up
//! for the chip's clock mode and speed.

use embedded_hal::spi::SpiDevice;

use ad74412_core::traits::FrameBus;

/// [`FrameBus`] over any blocking [`SpiDevice`]
///
/// Every frame is its own chip-select assertion, which is what latches the
/// frame inside the chip.
#[derive(Debug)]
pub struct SpiFrameBus<S> {
    spi: S,
}

impl<S> SpiFrameBus<S> {
    pub fn new(spi: S) -> Self {
        Self { spi }
    }

    /// Give back the SPI device
    pub fn into_inner(self) -> S {
        self.spi
    }
}

impl<S: SpiDevice<u8>> FrameBus for SpiFrameBus<S> {
    type Error = S::Error;

    fn transfer(&mut self, frame: &mut [u8]) -> Result<(), Self::Error> {
        self.spi.transfer_in_place(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::spi::{ErrorKind, ErrorType, Operation};

    /// Loopback that echoes each byte inverted and counts transactions
    #[derive(Default)]
    struct InvertingSpi {
        transactions: usize,
        fail: bool,
    }

    impl ErrorType for InvertingSpi {
        type Error = ErrorKind;
    }

    impl SpiDevice<u8> for InvertingSpi {
        fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), ErrorKind> {
            if self.fail {
                return Err(ErrorKind::Other);
            }
            self.transactions += 1;
            for op in operations {
                if let Operation::TransferInPlace(buf) = op {
                    buf.iter_mut().for_each(|b| *b = !*b);
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_transfer_in_place() {
        let mut bus = SpiFrameBus::new(InvertingSpi::default());
        let mut frame = [0x41, 0x02, 0x26, 0x00];
        bus.transfer(&mut frame).unwrap();
        assert_eq!(frame, [0xBE, 0xFD, 0xD9, 0xFF]);
        assert_eq!(bus.into_inner().transactions, 1);
    }

    #[test]
    fn test_error_passes_through() {
        let mut bus = SpiFrameBus::new(InvertingSpi {
            fail: true,
            ..Default::default()
        });
        assert_eq!(bus.transfer(&mut [0u8; 4]), Err(ErrorKind::Other));
    }
}
