use crate::gpio::led::Brightness;

/// Callback value handed to the device layer when an LED is registered.
///
/// It identifies one LED slot at one point in its life. Once that LED is
/// deleted the hook goes stale and every call made with it is ignored, even
/// if the slot has since been reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LedHook {
    pub(crate) slot: usize,
    pub(crate) generation: u32,
}

impl LedHook {
    pub fn slot(&self) -> usize {
        self.slot
    }
}

/// Host LED class the controller registers its LEDs with.
///
/// The host drives an LED by passing the hook back to
/// [`GpioController::brightness_set`](crate::gpio::GpioController::brightness_set).
/// From within `register` and `unregister`, implementations may call the
/// hook callbacks (`brightness_set`, `brightness_get`, `blink_set`,
/// `blink_get`) and `execute` instructions that do not register or delete
/// a registered LED. Anything that reaches the device layer again panics.
pub trait DeviceLayer {
    /// Live registration; dropped or passed to `unregister` to tear it down.
    type Handle;
    /// Why a registration was refused.
    type Error: core::fmt::Debug;

    fn register(
        &mut self,
        fullname: &str,
        brightness: Brightness,
        hook: LedHook,
    ) -> Result<Self::Handle, Self::Error>;

    fn unregister(&mut self, handle: Self::Handle);
}

/// Device layer that accepts every registration and keeps nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDevices;

impl DeviceLayer for NoDevices {
    type Handle = LedHook;
    type Error = core::convert::Infallible;

    fn register(
        &mut self,
        _fullname: &str,
        _brightness: Brightness,
        hook: LedHook,
    ) -> Result<Self::Handle, Self::Error> {
        Ok(hook)
    }

    fn unregister(&mut self, _handle: Self::Handle) {}
}
