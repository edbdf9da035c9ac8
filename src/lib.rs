//! A `no_std`, no-alloc controller mapping Intel ICH7 GPIO bits to LEDs.
//!
//! The ICH7 south bridge exposes its GPIO pins through a 64-byte block of
//! 32-bit registers in I/O port space. This crate claims that block from the
//! LPC bridge and lets a text control surface describe LEDs in terms of
//! register bits.
//!
//! # Features
//!
//! - **Named registers** - `GP_LVL`, `GPO_BLINK` and friends by name
//! - **Locked bit updates** - every read-modify-write runs in one critical section
//! - **Command-defined LEDs** - each LED is five short bit-command sequences
//! - **Host LED class** - LEDs are registered with a pluggable device layer
//! - **Zero heap allocation** - fixed LED pool and command tables
//!
//! # Control language
//!
//! One instruction per line, tokens separated by single spaces:
//!
//! ```text
//! set <register> <value>
//! setbit <register> <bit> <0|1>
//! createled <name> <color>
//! addledcmd <led> <bright_0|bright_1|blink_on|get_bright|get_blink> <register> <bit> <value>
//! registerled <led>
//! runledcmd <led> <behavior>
//! deleteled <led>
//! ```
//!
//! Numbers are read like C's `%i`: `0x` hex, leading-zero octal or decimal.
//!
//! # Example
//!
//! ```rust,no_run
//! use ich7_gpio_led::prelude::*;
//!
//! struct Ports;
//!
//! impl PortIo for Ports {
//!     fn inl(&mut self, _port: u32) -> u32 {
//!         0
//!     }
//!     fn outl(&mut self, _port: u32, _value: u32) {}
//! }
//!
//! fn bring_up(pci: &mut impl PciFunction, regions: &mut impl IoRegions) {
//!     let gpio = GpioControllerBuilder::new()
//!         .port_io(Ports)
//!         .no_devices()
//!         .build();
//!     gpio.activate(pci, regions).unwrap();
//!
//!     // A disk LED on GPIO 3, active low
//!     gpio.execute("createled disk green").unwrap();
//!     gpio.execute("addledcmd disk bright_1 GP_LVL 3 0").unwrap();
//!     gpio.execute("addledcmd disk bright_0 GP_LVL 3 1").unwrap();
//!     gpio.execute("addledcmd disk get_bright GP_LVL 3 0").unwrap();
//!     gpio.execute("registerled disk").unwrap();
//!
//!     assert_eq!(gpio.execute("runledcmd disk bright_1"), Ok(Outcome::Done));
//!
//!     gpio.shutdown(regions);
//! }
//! ```

#![deny(unsafe_code)]
#![no_std]

pub mod gpio;

pub mod prelude {
    pub use crate::gpio::prelude::*;
}
