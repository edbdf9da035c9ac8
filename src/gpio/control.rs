//! Byte-oriented control surface over a [`GpioController`].
//!
//! Writes carry one instruction line. Reads return a text dump of every
//! register, refreshed whenever a read starts at offset 0.

use bitmaps::{Bits, BitsImpl};
use heapless::String;

use crate::gpio::{
    controller::GpioController,
    device::DeviceLayer,
    macros::debug,
    port::PortIo,
    registry::LED_MAX,
};

/// Longest instruction line taken from one write; the rest is dropped.
pub const MAX_LINE: usize = 127;

/// Capacity of the register dump.
pub const DUMP_CAPACITY: usize = 512;

/// One open handle on the control surface. Each handle keeps its own dump
/// snapshot, so concurrent readers never see each other's refreshes.
pub struct ControlFile<'c, IO, DL, const N: usize = LED_MAX>
where
    IO: PortIo,
    DL: DeviceLayer,
    BitsImpl<N>: Bits,
{
    controller: &'c GpioController<IO, DL, N>,
    dump: String<DUMP_CAPACITY>,
}

impl<'c, IO, DL, const N: usize> ControlFile<'c, IO, DL, N>
where
    IO: PortIo,
    DL: DeviceLayer,
    BitsImpl<N>: Bits,
{
    pub fn new(controller: &'c GpioController<IO, DL, N>) -> Self {
        Self {
            controller,
            dump: String::new(),
        }
    }

    /// Executes the first [`MAX_LINE`] bytes of `input` as one instruction.
    ///
    /// Always reports the whole input as consumed, whatever the outcome.
    pub fn write(&self, input: &[u8]) -> usize {
        let raw = &input[..input.len().min(MAX_LINE)];
        let line = match core::str::from_utf8(raw) {
            Ok(line) => line,
            // Keep the valid prefix; a cut multi-byte char is dropped.
            Err(err) => match core::str::from_utf8(&raw[..err.valid_up_to()]) {
                Ok(line) => line,
                Err(_) => "",
            },
        };
        // Failures are logged by the controller.
        let _ = self.controller.execute(line);
        input.len()
    }

    /// Copies dump bytes starting at `offset` into `out`.
    ///
    /// Returns the number of bytes copied; 0 once `offset` is past the end.
    pub fn read(&mut self, offset: usize, out: &mut [u8]) -> usize {
        if offset == 0 {
            self.refresh();
        }
        let bytes = self.dump.as_bytes();
        if offset >= bytes.len() {
            return 0;
        }
        let n = out.len().min(bytes.len() - offset);
        out[..n].copy_from_slice(&bytes[offset..offset + n]);
        n
    }

    /// Current dump snapshot.
    pub fn dump(&self) -> &str {
        &self.dump
    }

    fn refresh(&mut self) {
        self.dump.clear();
        if self.controller.dump_registers(&mut self.dump).is_err() {
            debug!("register dump truncated at {} bytes", self.dump.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpio::test_support::{active_controller, reg, test_controller};

    #[test]
    fn write_executes_and_reports_full_length() {
        let ctl = active_controller();
        let file = ControlFile::new(&ctl);

        assert_eq!(file.write(b"set GP_LVL 0x55\n"), 16);
        assert_eq!(ctl.port().read(reg("GP_LVL")), 0x55);

        // Failed instructions are still fully consumed
        assert_eq!(file.write(b"frobnicate\n"), 11);
        assert_eq!(file.write(b""), 0);
    }

    #[test]
    fn write_truncates_long_lines() {
        let ctl = active_controller();
        let file = ControlFile::new(&ctl);

        ctl.port().write(reg("GP_LVL"), 5);

        // A run of zeros whose final `7` lands one byte past the cut
        let mut line = [b'0'; MAX_LINE + 1];
        let cmd = b"set GP_LVL ";
        line[..cmd.len()].copy_from_slice(cmd);
        line[MAX_LINE] = b'7';

        assert_eq!(file.write(&line), MAX_LINE + 1);
        assert_eq!(ctl.port().read(reg("GP_LVL")), 0);

        let mut line = [b'\n'; 200];
        let cmd = b"set GP_LVL 7";
        line[..cmd.len()].copy_from_slice(cmd);
        assert_eq!(file.write(&line), 200);
        assert_eq!(ctl.port().read(reg("GP_LVL")), 7);
    }

    #[test]
    fn write_tolerates_invalid_utf8() {
        let ctl = active_controller();
        let file = ControlFile::new(&ctl);
        assert_eq!(file.write(b"set GP_LVL 9 \xff"), 14);
        assert_eq!(ctl.port().read(reg("GP_LVL")), 9);
    }

    #[test]
    fn read_streams_dump_then_ends() {
        let ctl = active_controller();
        ctl.port().write(reg("GPI_INV"), 0xCAFE);
        let mut file = ControlFile::new(&ctl);

        let mut out = [0u8; 20];
        let mut collected = heapless::Vec::<u8, DUMP_CAPACITY>::new();
        let mut offset = 0;
        loop {
            let n = file.read(offset, &mut out);
            if n == 0 {
                break;
            }
            collected.extend_from_slice(&out[..n]).unwrap();
            offset += n;
        }

        let text = core::str::from_utf8(&collected).unwrap();
        assert_eq!(text.lines().count(), 8);
        assert!(text.starts_with("GP_LVL          0x00000000\n"));
        assert!(text.ends_with("GPI_INV         0x0000cafe\n"));
        assert_eq!(file.read(offset + 100, &mut out), 0);
    }

    #[test]
    fn only_offset_zero_refreshes() {
        let ctl = active_controller();
        let mut file = ControlFile::new(&ctl);
        let mut out = [0u8; 8];

        file.read(0, &mut out);
        ctl.port().write(reg("GP_LVL"), 0xFFFF_FFFF);
        file.read(8, &mut out);
        assert!(file.dump().starts_with("GP_LVL          0x00000000"));

        file.read(0, &mut out);
        assert!(file.dump().starts_with("GP_LVL          0xffffffff"));
    }

    #[test]
    fn inactive_controller_dumps_zeroes() {
        let ctl = test_controller();
        let mut file = ControlFile::new(&ctl);
        let mut out = [0u8; DUMP_CAPACITY];
        let n = file.read(0, &mut out);
        assert_eq!(n, file.dump().len());
        assert!(file.dump().lines().all(|line| line.ends_with("0x00000000")));
    }
}
