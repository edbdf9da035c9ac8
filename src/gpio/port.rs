use core::cell::{Cell, RefCell};

use critical_section::Mutex;

use crate::gpio::{
    GpioError,
    macros::trace,
    probe::ICH7_GPIO_SIZE,
    register::{Register, RegisterBase},
};

/// Raw 32-bit port I/O.
///
/// Implementations perform the actual `inl`/`outl` against the port
/// address computed by [`GpioPort`]. They are always called with the
/// block lock held.
pub trait PortIo {
    fn inl(&mut self, port: u32) -> u32;
    fn outl(&mut self, port: u32, value: u32);
}

/// Lock-protected access to the registers of one GPIO block.
///
/// Every access runs inside a single critical section, so reads, writes
/// and read-modify-write bit updates never interleave with each other.
pub struct GpioPort<IO: PortIo> {
    io: Mutex<RefCell<IO>>,
    gpio_base: Mutex<Cell<Option<u32>>>,
}

impl<IO: PortIo> core::fmt::Debug for GpioPort<IO> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GpioPort")
            .field("gpio_base", &self.gpio_base())
            .finish_non_exhaustive()
    }
}

impl<IO: PortIo> GpioPort<IO> {
    /// Creates a port with no resolved base; all accesses are no-ops until
    /// [`Self::set_gpio_base`] is called.
    pub const fn new(io: IO) -> Self {
        Self {
            io: Mutex::new(RefCell::new(io)),
            gpio_base: Mutex::new(Cell::new(None)),
        }
    }

    pub fn gpio_base(&self) -> Option<u32> {
        critical_section::with(|cs| self.gpio_base.borrow(cs).get())
    }

    pub fn set_gpio_base(&self, base: Option<u32>) {
        critical_section::with(|cs| self.gpio_base.borrow(cs).set(base));
    }

    /// Runs `f` on the raw backend with the block lock held.
    pub fn with_io<R>(&self, f: impl FnOnce(&mut IO) -> R) -> R {
        critical_section::with(|cs| f(&mut self.io.borrow(cs).borrow_mut()))
    }

    /// Returns the I/O address of `reg`, or `None` if its block is not
    /// mapped or the register does not lie wholly inside the block.
    pub fn resolve_port(&self, reg: &Register) -> Option<u32> {
        match reg.base {
            RegisterBase::GpioBlock => {
                let end = reg.offset.checked_add(4)?;
                if end > ICH7_GPIO_SIZE {
                    return None;
                }
                self.gpio_base()?.checked_add(reg.offset)
            }
        }
    }

    /// Reads the whole register. Unmapped registers read as 0.
    pub fn read(&self, reg: &Register) -> u32 {
        critical_section::with(|cs| match self.resolve_port(reg) {
            Some(port) => self.io.borrow(cs).borrow_mut().inl(port),
            None => 0,
        })
    }

    /// Writes the whole register. Unmapped registers are left alone.
    pub fn write(&self, reg: &Register, value: u32) {
        critical_section::with(|cs| {
            if let Some(port) = self.resolve_port(reg) {
                trace!("writing {:#x} to port {:#x}", value, port);
                self.io.borrow(cs).borrow_mut().outl(port, value);
            }
        });
    }

    /// Sets or clears one bit with a locked read-modify-write.
    ///
    /// Out-of-range `bit` or `value` is refused without touching hardware.
    pub fn set_bit(&self, reg: &Register, bit: i32, value: i32) -> Result<(), GpioError> {
        let mask = bit_mask(bit)?;
        if !(0..=1).contains(&value) {
            return Err(GpioError::InvalidArgument);
        }

        critical_section::with(|cs| {
            let Some(port) = self.resolve_port(reg) else {
                return;
            };
            trace!("setting {} bit {} to {}", reg.name, bit, value);
            let mut io = self.io.borrow(cs).borrow_mut();
            let current = io.inl(port);
            let next = if value == 1 {
                current | mask
            } else {
                current & !mask
            };
            io.outl(port, next);
        });

        Ok(())
    }

    /// Reads one bit of the register.
    pub fn get_bit(&self, reg: &Register, bit: i32) -> Result<bool, GpioError> {
        let mask = bit_mask(bit)?;
        Ok(self.read(reg) & mask != 0)
    }
}

fn bit_mask(bit: i32) -> Result<u32, GpioError> {
    if !(0..32).contains(&bit) {
        return Err(GpioError::InvalidArgument);
    }
    Ok(1u32 << bit)
}
