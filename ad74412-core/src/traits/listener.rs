//! Application callbacks

use crate::pool::Handle;
use crate::scaler::ChannelValue;
use crate::status::Notification;

/// Receives measured values and status notifications from a device
pub trait DeviceListener {
    /// A fresh ADC result, scaled to engineering units
    fn on_new_value(&mut self, handle: Handle, value: ChannelValue);

    /// An alert or rail transition
    fn on_status_change(&mut self, handle: Handle, notification: Notification);
}

/// Listener that drops everything
impl DeviceListener for () {
    fn on_new_value(&mut self, _handle: Handle, _value: ChannelValue) {}

    fn on_status_change(&mut self, _handle: Handle, _notification: Notification) {}
}

/// Adapts a pair of closures to [`DeviceListener`]
pub struct Callbacks<V, S> {
    pub on_new_value: V,
    pub on_status_change: S,
}

impl<V, S> Callbacks<V, S>
where
    V: FnMut(Handle, ChannelValue),
    S: FnMut(Handle, Notification),
{
    pub fn new(on_new_value: V, on_status_change: S) -> Self {
        Self {
            on_new_value,
            on_status_change,
        }
    }
}

impl<V, S> DeviceListener for Callbacks<V, S>
where
    V: FnMut(Handle, ChannelValue),
    S: FnMut(Handle, Notification),
{
    fn on_new_value(&mut self, handle: Handle, value: ChannelValue) {
        (self.on_new_value)(handle, value)
    }

    fn on_status_change(&mut self, handle: Handle, notification: Notification) {
        (self.on_status_change)(handle, notification)
    }
}
