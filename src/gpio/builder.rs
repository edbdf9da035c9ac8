use bitmaps::{Bits, BitsImpl};

use crate::gpio::{
    controller::GpioController,
    device::{DeviceLayer, NoDevices},
    port::PortIo,
    register::RegisterTable,
    registry::LED_MAX,
};

// Builder states
pub struct NeedPortIo;
pub struct NeedDeviceLayer<IO> {
    io: IO,
}
pub struct Ready<IO, DL> {
    io: IO,
    devices: DL,
}

pub struct GpioControllerBuilder<State, const N: usize = LED_MAX> {
    registers: RegisterTable,
    state: State,
}

// Start the builder
impl GpioControllerBuilder<NeedPortIo> {
    pub fn new() -> Self {
        GpioControllerBuilder {
            registers: RegisterTable::ich7(),
            state: NeedPortIo,
        }
    }
}

impl Default for GpioControllerBuilder<NeedPortIo> {
    fn default() -> Self {
        Self::new()
    }
}

// Optional settings before the backend is chosen
impl<const N: usize> GpioControllerBuilder<NeedPortIo, N> {
    /// Set the number of LED slots.
    pub fn led_capacity<const M: usize>(self) -> GpioControllerBuilder<NeedPortIo, M> {
        GpioControllerBuilder {
            registers: self.registers,
            state: NeedPortIo,
        }
    }

    /// Replace the ICH7 register catalogue.
    pub fn register_table(self, registers: RegisterTable) -> Self {
        GpioControllerBuilder {
            registers,
            state: NeedPortIo,
        }
    }

    /// Set the raw port backend.
    pub fn port_io<IO: PortIo>(self, io: IO) -> GpioControllerBuilder<NeedDeviceLayer<IO>, N> {
        GpioControllerBuilder {
            registers: self.registers,
            state: NeedDeviceLayer { io },
        }
    }
}

// Set device layer
impl<IO: PortIo, const N: usize> GpioControllerBuilder<NeedDeviceLayer<IO>, N> {
    /// Set the host LED class LEDs are registered with.
    pub fn device_layer<DL: DeviceLayer>(
        self,
        devices: DL,
    ) -> GpioControllerBuilder<Ready<IO, DL>, N> {
        GpioControllerBuilder {
            registers: self.registers,
            state: Ready {
                io: self.state.io,
                devices,
            },
        }
    }

    /// Accept every registration without exposing LEDs anywhere.
    pub fn no_devices(self) -> GpioControllerBuilder<Ready<IO, NoDevices>, N> {
        self.device_layer(NoDevices)
    }
}

// Build the final controller
impl<IO, DL, const N: usize> GpioControllerBuilder<Ready<IO, DL>, N>
where
    IO: PortIo,
    DL: DeviceLayer,
    BitsImpl<N>: Bits,
{
    /// Build an inactive controller; call
    /// [`GpioController::activate`] to map the GPIO block.
    pub fn build(self) -> GpioController<IO, DL, N> {
        GpioController::new(self.state.io, self.state.devices, self.registers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpio::{
        GpioError,
        error::{Entity, Pool},
        register::{Register, RegisterBase},
        test_support::{FakeLpc, FakeRegions, RecordingDevices, SimulatedBlock},
    };

    #[test]
    fn test_simple_builder() {
        let ctl = GpioControllerBuilder::new()
            .port_io(SimulatedBlock::new())
            .no_devices()
            .build();
        assert!(!ctl.is_active());
        assert_eq!(ctl.registers().len(), 8);
        ctl.with_leds(|leds| assert_eq!(leds.capacity(), LED_MAX));
    }

    #[test]
    fn test_builder_with_device_layer_and_capacity() {
        let ctl = GpioControllerBuilder::new()
            .led_capacity::<2>()
            .port_io(SimulatedBlock::new())
            .device_layer(RecordingDevices::default())
            .build();
        ctl.activate(&mut FakeLpc::new(), &mut FakeRegions::default())
            .unwrap();

        ctl.execute("createled a red").unwrap();
        ctl.execute("createled b red").unwrap();
        assert_eq!(
            ctl.execute("createled c red"),
            Err(GpioError::CapacityExceeded(Pool::LedSlots))
        );
        ctl.execute("registerled a").unwrap();
        ctl.with_devices(|dev| assert_eq!(dev.live(), 1));
    }

    #[test]
    fn test_builder_with_custom_register_table() {
        static ONLY_LVL: [Register; 1] = [Register::new("LVL", RegisterBase::GpioBlock, 0x0c)];

        let ctl = GpioControllerBuilder::new()
            .register_table(RegisterTable::new(&ONLY_LVL))
            .port_io(SimulatedBlock::new())
            .no_devices()
            .build();
        ctl.activate(&mut FakeLpc::new(), &mut FakeRegions::default())
            .unwrap();

        ctl.execute("set LVL 3").unwrap();
        assert_eq!(
            ctl.execute("set GP_LVL 3"),
            Err(GpioError::NotFound(Entity::Register))
        );
        assert_eq!(ctl.port().with_io(|io| io.regs[3]), 3);
    }

    #[test]
    fn test_no_devices_hooks_drive_hardware() {
        let ctl = GpioControllerBuilder::new()
            .port_io(SimulatedBlock::new())
            .no_devices()
            .build();
        ctl.activate(&mut FakeLpc::new(), &mut FakeRegions::default())
            .unwrap();
        ctl.execute("createled a red").unwrap();
        ctl.execute("addledcmd a bright_1 GP_LVL 0 1").unwrap();
        ctl.execute("registerled a").unwrap();

        let hook = ctl.with_leds(|leds| leds.hook(0)).unwrap();
        assert!(ctl.brightness_set(hook, 255));
        assert_eq!(ctl.port().with_io(|io| io.regs[3]), 1);
    }
}
