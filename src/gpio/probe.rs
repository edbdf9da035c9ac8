//! Claiming the ICH7 GPIO block from its LPC bridge.
//!
//! The PCI function and the I/O region allocator belong to the host
//! platform; this module only drives them through the traits below.

use crate::gpio::{
    GpioError,
    error::Resource,
    macros::{debug, error, info},
};

pub const PCI_VENDOR_ID_INTEL: u16 = 0x8086;

/// ICH7 LPC bridge device IDs (ICH7_0, ICH7_1, ICH7_30, ICH7_31).
pub const ICH7_LPC_DEVICE_IDS: [u16; 4] = [0x27b8, 0x27b9, 0x27b0, 0x27bd];

/// PCI config offset of the `GPIOBASE` register.
pub const GPIO_BASE: u16 = 0x48;
/// PCI config offset of the `GPIO_CNTL` register.
pub const GPIO_CTRL: u16 = 0x4c;
/// `GPIO_CNTL` bit enabling the GPIO block.
pub const GPIO_EN: u32 = 0x10;
/// Mask applied to `GPIOBASE` to get the I/O base address.
pub const GPIO_BASE_MASK: u32 = 0xFFFF_FFC0;

/// Size in bytes of the GPIO register block.
pub const ICH7_GPIO_SIZE: u32 = 64;

/// Owner name used when reserving the port range.
pub const DRIVER_NAME: &str = "ich7_gpio";

/// The PCI function hosting the GPIO block.
pub trait PciFunction {
    fn vendor_id(&self) -> u16;
    fn device_id(&self) -> u16;
    /// Enables the device. `false` means it could not be enabled.
    fn enable(&mut self) -> bool;
    fn read_config_dword(&mut self, offset: u16) -> Option<u32>;
}

/// Exclusive reservation of I/O port ranges.
pub trait IoRegions {
    /// Claims `start..start + len`. `false` if any part is already claimed.
    fn request_region(&mut self, start: u32, len: u32, owner: &'static str) -> bool;
    fn release_region(&mut self, start: u32, len: u32);
}

/// A claimed GPIO port range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IoReservation {
    pub base: u32,
    pub len: u32,
}

/// Returns true if `vendor:device` is an ICH7 LPC bridge.
pub fn is_supported(vendor: u16, device: u16) -> bool {
    vendor == PCI_VENDOR_ID_INTEL && ICH7_LPC_DEVICE_IDS.contains(&device)
}

/// Enables the LPC bridge, checks that its GPIO block is on, and reserves
/// the block's port range.
///
/// Nothing stays reserved on failure.
pub fn probe<P, R>(pci: &mut P, regions: &mut R) -> Result<IoReservation, GpioError>
where
    P: PciFunction,
    R: IoRegions,
{
    if !is_supported(pci.vendor_id(), pci.device_id()) {
        return Err(GpioError::ResourceUnavailable(Resource::UnsupportedDevice));
    }

    if !pci.enable() {
        error!("unable to enable LPC device");
        return Err(GpioError::ResourceUnavailable(Resource::EnableFailed));
    }

    let ctrl = pci
        .read_config_dword(GPIO_CTRL)
        .ok_or(GpioError::ResourceUnavailable(Resource::ConfigRead))?;
    debug!("GPIO_CTRL {:#x}", ctrl);
    if ctrl & GPIO_EN == 0 {
        error!("the LPC GPIO block has not been enabled");
        return Err(GpioError::ResourceUnavailable(Resource::GpioDisabled));
    }

    let Some(raw_base) = pci.read_config_dword(GPIO_BASE) else {
        error!("unable to read GPIOBASE");
        return Err(GpioError::ResourceUnavailable(Resource::ConfigRead));
    };
    let base = raw_base & GPIO_BASE_MASK;
    debug!("GPIOBASE {:#x}", base);

    if !regions.request_region(base, ICH7_GPIO_SIZE, DRIVER_NAME) {
        error!("unable to reserve GPIO I/O addresses at {:#x}", base);
        return Err(GpioError::ResourceUnavailable(Resource::RegionBusy));
    }

    info!("claimed GPIO block at {:#x}", base);
    Ok(IoReservation {
        base,
        len: ICH7_GPIO_SIZE,
    })
}

/// Releases a reservation taken by [`probe`]. A second call is a no-op.
pub fn remove<R: IoRegions>(regions: &mut R, reservation: &mut Option<IoReservation>) {
    if let Some(res) = reservation.take() {
        debug!("releasing GPIO I/O addresses at {:#x}", res.base);
        regions.release_region(res.base, res.len);
    }
}
