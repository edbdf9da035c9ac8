//! `in`/`out` instruction backend for x86 targets.

#![allow(unsafe_code)]

use core::arch::asm;

use crate::gpio::port::PortIo;

/// Direct 32-bit port I/O through the CPU's `in`/`out` instructions.
#[derive(Debug)]
pub struct RawPorts {
    _private: (),
}

impl RawPorts {
    /// # Safety
    /// The caller must run with I/O privilege and must own the ports the
    /// controller will touch, i.e. the range reserved during activation.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl PortIo for RawPorts {
    fn inl(&mut self, port: u32) -> u32 {
        // x86 port space is 16 bits wide; nothing decodes above it.
        let Ok(port) = u16::try_from(port) else {
            return u32::MAX;
        };
        let value: u32;
        // SAFETY: port ownership is guaranteed by `RawPorts::new`'s contract.
        unsafe {
            asm!("in eax, dx", in("dx") port, out("eax") value, options(nomem, nostack, preserves_flags));
        }
        value
    }

    fn outl(&mut self, port: u32, value: u32) {
        let Ok(port) = u16::try_from(port) else {
            return;
        };
        // SAFETY: port ownership is guaranteed by `RawPorts::new`'s contract.
        unsafe {
            asm!("out dx, eax", in("dx") port, in("eax") value, options(nomem, nostack, preserves_flags));
        }
    }
}
