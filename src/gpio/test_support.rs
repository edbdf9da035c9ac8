//! Test support utilities - only compiled in test builds.

extern crate std;

use std::{string::String, vec::Vec};

use crate::gpio::{
    controller::GpioController,
    device::{DeviceLayer, LedHook},
    led::Brightness,
    port::{GpioPort, PortIo},
    probe::{GPIO_EN, IoRegions, PCI_VENDOR_ID_INTEL, PciFunction},
    register::{Register, RegisterTable},
};

/// Port base the simulated block is decoded at (64-byte aligned).
pub const TEST_BASE: u32 = 0x0480;

pub type TestController = GpioController<SimulatedBlock, RecordingDevices>;

/// 64 bytes of GPIO registers decoded at `TEST_BASE`.
#[derive(Debug, Default)]
pub struct SimulatedBlock {
    pub regs: [u32; 16],
    pub writes: usize,
}

impl SimulatedBlock {
    pub fn new() -> Self {
        Self::default()
    }

    fn index(port: u32) -> usize {
        assert!(
            (TEST_BASE..TEST_BASE + 64).contains(&port) && port % 4 == 0,
            "port {port:#x} outside the simulated block"
        );
        ((port - TEST_BASE) / 4) as usize
    }
}

impl PortIo for SimulatedBlock {
    fn inl(&mut self, port: u32) -> u32 {
        self.regs[Self::index(port)]
    }

    fn outl(&mut self, port: u32, value: u32) {
        self.writes += 1;
        self.regs[Self::index(port)] = value;
    }
}

/// Looks up an ICH7 register by name.
pub fn reg(name: &str) -> &'static Register {
    RegisterTable::ich7().lookup_by_name(name).unwrap()
}

/// A port already mapped at `TEST_BASE`.
pub fn mapped_port() -> GpioPort<SimulatedBlock> {
    let port = GpioPort::new(SimulatedBlock::new());
    port.set_gpio_base(Some(TEST_BASE));
    port
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceEvent {
    Register(usize),
    Unregister(usize),
}

#[derive(Debug, Clone)]
pub struct Registration {
    pub handle: usize,
    pub fullname: String,
    pub brightness: Brightness,
    pub hook: LedHook,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Refused;

/// Device layer that hands out sequential handles and records every call.
#[derive(Debug, Default)]
pub struct RecordingDevices {
    pub events: Vec<DeviceEvent>,
    pub registered: Vec<Registration>,
    pub unregistered: Vec<usize>,
    /// Refuse every registration while set.
    pub refuse: bool,
    next: usize,
}

impl RecordingDevices {
    /// Registrations not yet torn down.
    pub fn live(&self) -> usize {
        self.registered.len() - self.unregistered.len()
    }
}

impl DeviceLayer for RecordingDevices {
    type Handle = usize;
    type Error = Refused;

    fn register(
        &mut self,
        fullname: &str,
        brightness: Brightness,
        hook: LedHook,
    ) -> Result<usize, Refused> {
        if self.refuse {
            return Err(Refused);
        }
        let handle = self.next;
        self.next += 1;
        self.events.push(DeviceEvent::Register(handle));
        self.registered.push(Registration {
            handle,
            fullname: String::from(fullname),
            brightness,
            hook,
        });
        Ok(handle)
    }

    fn unregister(&mut self, handle: usize) {
        assert!(
            !self.unregistered.contains(&handle),
            "handle {handle} unregistered twice"
        );
        self.events.push(DeviceEvent::Unregister(handle));
        self.unregistered.push(handle);
    }
}

/// An ICH7 LPC bridge with its GPIO block enabled at `TEST_BASE`.
#[derive(Debug)]
pub struct FakeLpc {
    pub device: u16,
    pub gpio_base: u32,
    pub gpio_ctrl: u32,
    pub enable_ok: bool,
    pub enabled: bool,
    pub config_readable: bool,
}

impl FakeLpc {
    pub fn new() -> Self {
        Self {
            device: 0x27b8,
            gpio_base: TEST_BASE | 0x1,
            gpio_ctrl: GPIO_EN,
            enable_ok: true,
            enabled: false,
            config_readable: true,
        }
    }
}

impl PciFunction for FakeLpc {
    fn vendor_id(&self) -> u16 {
        PCI_VENDOR_ID_INTEL
    }

    fn device_id(&self) -> u16 {
        self.device
    }

    fn enable(&mut self) -> bool {
        self.enabled = self.enable_ok;
        self.enable_ok
    }

    fn read_config_dword(&mut self, offset: u16) -> Option<u32> {
        if !self.config_readable {
            return None;
        }
        match offset {
            crate::gpio::probe::GPIO_BASE => Some(self.gpio_base),
            crate::gpio::probe::GPIO_CTRL => Some(self.gpio_ctrl),
            _ => Some(0),
        }
    }
}

/// Single-range port allocator.
#[derive(Debug, Default)]
pub struct FakeRegions {
    pub claimed: Option<(u32, u32)>,
    /// Refuse every request while set.
    pub busy: bool,
    pub releases: usize,
}

impl IoRegions for FakeRegions {
    fn request_region(&mut self, start: u32, len: u32, _owner: &'static str) -> bool {
        if self.busy || self.claimed.is_some() {
            return false;
        }
        self.claimed = Some((start, len));
        true
    }

    fn release_region(&mut self, start: u32, len: u32) {
        assert_eq!(self.claimed, Some((start, len)));
        self.claimed = None;
        self.releases += 1;
    }
}

/// A controller that has not been activated.
pub fn test_controller() -> TestController {
    GpioController::new(
        SimulatedBlock::new(),
        RecordingDevices::default(),
        RegisterTable::ich7(),
    )
}

/// A controller mapped onto the simulated block at `TEST_BASE`.
pub fn active_controller() -> TestController {
    let ctl = test_controller();
    ctl.activate(&mut FakeLpc::new(), &mut FakeRegions::default())
        .unwrap();
    ctl
}
