//! Named registers of the ICH7 GPIO block.
//!
//! Offsets follow the ICH7 datasheet (chapter 10.10) and are relative to
//! the `GPIOBASE` address read during probe.

/// Hardware block a register lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegisterBase {
    /// The LPC GPIO block addressed through `GPIOBASE`.
    GpioBlock,
}

/// A named, offset-addressed 32-bit register.
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Register {
    pub name: &'static str,
    pub base: RegisterBase,
    pub offset: u32,
}

impl Register {
    pub const fn new(name: &'static str, base: RegisterBase, offset: u32) -> Self {
        Self { name, base, offset }
    }
}

pub const GPIO_USE_SEL: u32 = 0x00;
pub const GP_IO_SEL: u32 = 0x04;
pub const GP_LVL: u32 = 0x0c;
pub const GPO_BLINK: u32 = 0x18;
pub const GPI_INV: u32 = 0x2c;
pub const GPIO_USE_SEL2: u32 = 0x30;
pub const GP_IO_SEL2: u32 = 0x34;
pub const GP_LVL2: u32 = 0x38;

/// The ICH7 register catalogue, in dump order.
pub static ICH7_REGISTERS: [Register; 8] = [
    Register::new("GP_LVL", RegisterBase::GpioBlock, GP_LVL),
    Register::new("GPIO_USE_SEL", RegisterBase::GpioBlock, GPIO_USE_SEL),
    Register::new("GP_IO_SEL", RegisterBase::GpioBlock, GP_IO_SEL),
    Register::new("GPO_BLINK", RegisterBase::GpioBlock, GPO_BLINK),
    Register::new("GP_LVL2", RegisterBase::GpioBlock, GP_LVL2),
    Register::new("GPIO_USE_SEL2", RegisterBase::GpioBlock, GPIO_USE_SEL2),
    Register::new("GP_IO_SEL2", RegisterBase::GpioBlock, GP_IO_SEL2),
    Register::new("GPI_INV", RegisterBase::GpioBlock, GPI_INV),
];

/// Immutable catalogue of registers, looked up by exact name.
#[derive(Debug, Clone, Copy)]
pub struct RegisterTable {
    registers: &'static [Register],
}

impl RegisterTable {
    pub const fn new(registers: &'static [Register]) -> Self {
        Self { registers }
    }

    /// The ICH7 GPIO register catalogue.
    pub const fn ich7() -> Self {
        Self::new(&ICH7_REGISTERS)
    }

    /// Case-sensitive lookup. Unknown names yield `None`.
    pub fn lookup_by_name(&self, name: &str) -> Option<&'static Register> {
        self.registers.iter().find(|reg| reg.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static Register> {
        self.registers.iter()
    }

    pub fn len(&self) -> usize {
        self.registers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }
}

impl Default for RegisterTable {
    fn default() -> Self {
        Self::ich7()
    }
}
