use heapless::Vec;

use crate::gpio::{
    GpioError,
    error::Pool,
    macros::debug,
    port::{GpioPort, PortIo},
    register::Register,
};

/// Number of commands a single LED behavior can hold.
pub const COMMANDS_PER_BEHAVIOR: usize = 4;

/// One bit-level instruction: set, clear or test a bit of a register.
///
/// For set behaviors `value` is the bit value to write; for get behaviors
/// it is the level that counts as "on". Both fields are kept as given and
/// range-checked only when the command runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Command {
    pub register: &'static Register,
    pub bit: i32,
    pub value: i32,
}

/// Ordered, fixed-capacity sequence of commands implementing one behavior.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandTable {
    commands: Vec<Command, COMMANDS_PER_BEHAVIOR>,
}

impl CommandTable {
    pub const fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Appends a command after the existing ones.
    pub fn append(
        &mut self,
        register: &'static Register,
        bit: i32,
        value: i32,
    ) -> Result<(), GpioError> {
        self.commands
            .push(Command {
                register,
                bit,
                value,
            })
            .map_err(|_| GpioError::CapacityExceeded(Pool::CommandSlots))
    }

    /// Runs every command in order as a locked bit update.
    ///
    /// A command with an out-of-range bit or value is skipped; the rest of
    /// the sequence still runs. Each bit update is atomic, the sequence as a
    /// whole is not.
    pub fn execute_set<IO: PortIo>(&self, port: &GpioPort<IO>) {
        for cmd in self.commands.iter() {
            if let Err(err) = port.set_bit(cmd.register, cmd.bit, cmd.value) {
                debug!(
                    "skipping {} bit {} value {}: {}",
                    cmd.register.name, cmd.bit, cmd.value, err
                );
            }
        }
    }

    /// Evaluates the first command only: true if the live bit equals its
    /// expected value. An empty table reads as false.
    pub fn execute_get<IO: PortIo>(&self, port: &GpioPort<IO>) -> bool {
        let Some(cmd) = self.commands.first() else {
            return false;
        };
        match port.get_bit(cmd.register, cmd.bit) {
            Ok(level) => i32::from(level) == cmd.value,
            Err(_) => false,
        }
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.commands.is_full()
    }
}
