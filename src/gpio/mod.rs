pub mod builder;
pub mod command;
pub mod control;
pub mod controller;
pub mod device;
pub mod error;
pub mod interpreter;
pub mod led;
pub(crate) mod macros;
pub mod port;
pub mod probe;
pub mod register;
pub mod registry;
#[cfg(all(feature = "port-io", any(target_arch = "x86", target_arch = "x86_64")))]
pub mod x86;

#[cfg(test)]
mod test_support;

pub use builder::GpioControllerBuilder;
pub use command::{Command, CommandTable};
pub use control::ControlFile;
pub use controller::{GpioController, Outcome};
pub use device::{DeviceLayer, LedHook, NoDevices};
pub use error::{Entity, GpioError, Pool, Resource};
pub use interpreter::Instruction;
pub use led::{Behavior, Brightness, Led};
pub use port::{GpioPort, PortIo};
pub use probe::{IoRegions, IoReservation, PciFunction};
pub use register::{Register, RegisterBase, RegisterTable};
pub use registry::LedRegistry;
#[cfg(all(feature = "port-io", any(target_arch = "x86", target_arch = "x86_64")))]
pub use x86::RawPorts;

pub mod prelude {
    pub use super::{
        Behavior, ControlFile, DeviceLayer, GpioController, GpioControllerBuilder, GpioError,
        IoRegions, LedHook, NoDevices, Outcome, PciFunction, PortIo, RegisterTable,
    };
}
