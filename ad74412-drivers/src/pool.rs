//! Handle-based access to several devices
//!
//! Mirrors a host API where every call names its device by handle and
//! channels by index.

use ad74412_core::commit::{TimerRequest, TimerTag};
use ad74412_core::config::{DeviceConfig, MAX_SUPPORTED_DEVICES};
use ad74412_core::outputs::OutputAction;
use ad74412_core::pool::{Handle, Pool};
use ad74412_core::registers::ChannelFunction;
use ad74412_core::scaler::ChannelValue;
use ad74412_core::traits::{DeviceListener, FrameBus};
use ad74412_core::Result;
use ad74412_protocol::Channel;

use crate::device::{Ad74412, Pin};

/// Fixed pool of [`Ad74412`] instances
pub struct Ad74412Pool<B, L, const N: usize = MAX_SUPPORTED_DEVICES> {
    devices: Pool<Ad74412<B, L>, N>,
}

impl<B: FrameBus, L: DeviceListener, const N: usize> Default for Ad74412Pool<B, L, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: FrameBus, L: DeviceListener, const N: usize> Ad74412Pool<B, L, N> {
    pub fn new() -> Self {
        Self { devices: Pool::new() }
    }

    /// Take a slot for a device on `bus`
    ///
    /// Returns `None` when every slot is in use.
    pub fn acquire(&mut self, bus: B, config: DeviceConfig) -> Option<Handle> {
        let handle = self
            .devices
            .acquire_with(|handle| Ad74412::new(handle, bus, config))?;
        debug!("device {}: acquired", handle.id());
        Some(handle)
    }

    /// Free a slot, returning its bus
    pub fn release(&mut self, handle: Handle) -> Result<B> {
        self.devices.release(handle).map(Ad74412::release)
    }

    pub fn device(&self, handle: Handle) -> Result<&Ad74412<B, L>> {
        self.devices.get(handle)
    }

    pub fn device_mut(&mut self, handle: Handle) -> Result<&mut Ad74412<B, L>> {
        self.devices.get_mut(handle)
    }

    pub fn init(&mut self, handle: Handle, listener: L) -> Result<()> {
        self.device_mut(handle)?.init(listener)
    }

    pub fn configure_channel(&mut self, handle: Handle, channel: u8, function: ChannelFunction) -> Result<()> {
        let channel = Channel::try_from(channel)?;
        self.device_mut(handle)?.configure_channel(channel, function)
    }

    pub fn commit_configurations(&mut self, handle: Handle) -> Result<()> {
        self.device_mut(handle)?.commit_configurations()
    }

    pub fn set_output(&mut self, handle: Handle, value: ChannelValue, action: OutputAction) -> Result<()> {
        self.device_mut(handle)?.set_output(value, action)
    }

    pub fn is_channel_function_modified(&self, handle: Handle, channel: u8) -> Result<bool> {
        let channel = Channel::try_from(channel)?;
        Ok(self.device(handle)?.is_channel_function_modified(channel))
    }

    pub fn on_timer_expired(&mut self, handle: Handle, tag: TimerTag) -> Result<()> {
        self.device_mut(handle)?.on_timer_expired(tag)
    }

    pub fn on_pin(&mut self, handle: Handle, pin: Pin) -> Result<()> {
        self.device_mut(handle)?.on_pin(pin)
    }

    pub fn take_timer_request(&mut self, handle: Handle) -> Result<Option<TimerRequest>> {
        Ok(self.device_mut(handle)?.take_timer_request())
    }

    /// Acquired devices
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ad74412_core::status::Notification;
    use ad74412_core::Error;

    use std::vec::Vec;

    /// Bus that answers every frame with zeros and counts them
    #[derive(Debug, Default, PartialEq)]
    struct CountingBus {
        frames: usize,
    }

    impl FrameBus for CountingBus {
        type Error = ();

        fn transfer(&mut self, frame: &mut [u8]) -> core::result::Result<(), ()> {
            frame.fill(0);
            self.frames += 1;
            Ok(())
        }
    }

    #[derive(Default)]
    struct Statuses(Vec<(Handle, Notification)>);

    impl DeviceListener for Statuses {
        fn on_new_value(&mut self, _handle: Handle, _value: ChannelValue) {}

        fn on_status_change(&mut self, handle: Handle, notification: Notification) {
            self.0.push((handle, notification));
        }
    }

    type TestPool = Ad74412Pool<CountingBus, Statuses>;

    #[test]
    fn test_acquire_release() {
        let mut pool = TestPool::new();
        let first = pool.acquire(CountingBus::default(), DeviceConfig::default()).unwrap();
        let second = pool.acquire(CountingBus::default(), DeviceConfig::default()).unwrap();
        assert_eq!(
            pool.acquire(CountingBus::default(), DeviceConfig::default()),
            None
        );
        assert_eq!((first.id(), second.id()), (1, 2));
        assert_eq!(pool.len(), 2);

        assert_eq!(pool.release(first), Ok(CountingBus::default()));
        assert_eq!(pool.release(first).err(), Some(Error::UnknownOrInactiveHandle));
        assert_eq!(
            pool.commit_configurations(first),
            Err(Error::UnknownOrInactiveHandle)
        );
        assert!(pool
            .acquire(CountingBus::default(), DeviceConfig::default())
            .is_some());
    }

    #[test]
    fn test_channel_index_checked() {
        let mut pool = TestPool::new();
        let handle = pool.acquire(CountingBus::default(), DeviceConfig::default()).unwrap();
        pool.init(handle, Statuses::default()).unwrap();

        assert_eq!(
            pool.configure_channel(handle, 4, ChannelFunction::VoltageInput),
            Err(Error::ChannelIndexOutOfRange)
        );
        assert_eq!(
            pool.is_channel_function_modified(handle, 9),
            Err(Error::ChannelIndexOutOfRange)
        );
        pool.configure_channel(handle, 2, ChannelFunction::VoltageInput)
            .unwrap();
        assert_eq!(pool.is_channel_function_modified(handle, 2), Ok(true));
        assert_eq!(pool.is_channel_function_modified(handle, 1), Ok(false));
    }

    #[test]
    fn test_timers_routed_by_handle() {
        let mut pool = TestPool::new();
        let handle = pool.acquire(CountingBus::default(), DeviceConfig::default()).unwrap();
        pool.init(handle, Statuses::default()).unwrap();
        assert_eq!(pool.device(handle).unwrap().bus().frames, 2);

        let request = pool.take_timer_request(handle).unwrap().unwrap();
        assert_eq!(request.tag, TimerTag::SoftwareReset);
        assert_eq!(pool.take_timer_request(handle), Ok(None));

        // A silent bus fails every read-back check, so the device keeps resetting
        assert_eq!(
            pool.on_timer_expired(handle, request.tag),
            Err(Error::NotInitialized)
        );
        let device = pool.device(handle).unwrap();
        assert!(!device.is_ready());
        assert!(device.listener().unwrap().0.is_empty());
        assert!(!device.store().is_valid(ad74412_protocol::Register::AlertStatus));
        assert_eq!(
            pool.take_timer_request(handle).unwrap().map(|r| r.tag),
            Some(TimerTag::SoftwareReset)
        );
        assert_eq!(pool.on_pin(handle, Pin::Alert), Err(Error::NotInitialized));
    }
}
