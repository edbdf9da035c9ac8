use core::cell::{Cell, RefCell};

use bitmaps::{Bits, BitsImpl};
use critical_section::Mutex;
use heapless::String;

use crate::gpio::{
    GpioError,
    device::{DeviceLayer, LedHook},
    error::{Entity, Pool},
    interpreter::{Instruction, tokenize},
    led::{Behavior, Brightness, LED_FULL, LED_FULLNAME_LEN, LED_NAME_LEN, LED_OFF, Led, truncated},
    macros::{debug, info, warn},
    port::{GpioPort, PortIo},
    probe::{self, IoRegions, IoReservation, PciFunction},
    register::RegisterTable,
    registry::{LED_MAX, LedRegistry},
};

/// Result of a successfully executed instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    /// The instruction ran; there is nothing to report.
    Done,
    /// `createled` claimed this slot.
    Created { slot: usize },
    /// A query behavior ran and found the LED on (`true`) or off.
    State(bool),
}

/// Owns everything needed to drive one ICH7 GPIO block: the locked port,
/// the register catalogue, the LED pool, the device layer and the port
/// reservation.
///
/// All methods take `&self`; mutation goes through critical sections so
/// the controller can be shared between the control surface and device
/// callbacks.
pub struct GpioController<IO, DL, const N: usize = LED_MAX>
where
    IO: PortIo,
    DL: DeviceLayer,
    BitsImpl<N>: Bits,
{
    port: GpioPort<IO>,
    registers: RegisterTable,
    leds: Mutex<RefCell<LedRegistry<DL::Handle, N>>>,
    devices: Mutex<RefCell<DL>>,
    reservation: Mutex<Cell<Option<IoReservation>>>,
}

impl<IO, DL, const N: usize> core::fmt::Debug for GpioController<IO, DL, N>
where
    IO: PortIo,
    DL: DeviceLayer,
    BitsImpl<N>: Bits,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GpioController")
            .field("port", &self.port)
            .field("reservation", &self.reservation())
            .finish_non_exhaustive()
    }
}

impl<IO, DL, const N: usize> GpioController<IO, DL, N>
where
    IO: PortIo,
    DL: DeviceLayer,
    BitsImpl<N>: Bits,
{
    /// Creates an inactive controller. Register access is a no-op until
    /// [`Self::activate`] succeeds.
    pub fn new(io: IO, devices: DL, registers: RegisterTable) -> Self {
        Self {
            port: GpioPort::new(io),
            registers,
            leds: Mutex::new(RefCell::new(LedRegistry::new())),
            devices: Mutex::new(RefCell::new(devices)),
            reservation: Mutex::new(Cell::new(None)),
        }
    }

    pub fn port(&self) -> &GpioPort<IO> {
        &self.port
    }

    pub fn registers(&self) -> &RegisterTable {
        &self.registers
    }

    pub fn reservation(&self) -> Option<IoReservation> {
        critical_section::with(|cs| self.reservation.borrow(cs).get())
    }

    pub fn is_active(&self) -> bool {
        self.reservation().is_some()
    }

    /// Read-only access to the LED pool.
    pub fn with_leds<R>(&self, f: impl FnOnce(&LedRegistry<DL::Handle, N>) -> R) -> R {
        critical_section::with(|cs| f(&self.leds.borrow(cs).borrow()))
    }

    /// Access to the device layer.
    pub fn with_devices<R>(&self, f: impl FnOnce(&mut DL) -> R) -> R {
        critical_section::with(|cs| f(&mut self.devices.borrow(cs).borrow_mut()))
    }

    /// Probes the LPC bridge, maps the GPIO block and starts from an empty
    /// LED pool.
    ///
    /// On failure nothing stays reserved and the controller stays inactive.
    pub fn activate<P, R>(&self, pci: &mut P, regions: &mut R) -> Result<(), GpioError>
    where
        P: PciFunction,
        R: IoRegions,
    {
        if self.is_active() {
            return Ok(());
        }

        let reservation = probe::probe(pci, regions)?;
        critical_section::with(|cs| {
            self.reservation.borrow(cs).set(Some(reservation));
            self.port.set_gpio_base(Some(reservation.base));
        });
        self.reset_leds();
        info!("GPIO block active at {:#x}", reservation.base);
        Ok(())
    }

    /// Deletes every LED, then releases the port range. Safe to call more
    /// than once.
    pub fn shutdown<R: IoRegions>(&self, regions: &mut R) {
        self.reset_leds();
        let mut reservation = critical_section::with(|cs| {
            self.port.set_gpio_base(None);
            self.reservation.borrow(cs).take()
        });
        probe::remove(regions, &mut reservation);
    }

    /// Deallocates every LED slot, unregistering live devices first.
    pub fn reset_leds(&self) {
        for index in 0..N {
            self.deallocate_slot(index);
        }
    }

    /// Runs one control line.
    ///
    /// Failures are logged: register writes quietly, LED management
    /// visibly. They are returned either way.
    pub fn execute(&self, line: &str) -> Result<Outcome, GpioError> {
        let tokens = tokenize(line);
        let instruction = match Instruction::parse(&tokens) {
            Ok(instruction) => instruction,
            Err(err) => {
                debug!("ignoring instruction: {}", err);
                return Err(err);
            }
        };

        let result = self.run(instruction);
        if let Err(err) = result {
            if instruction.reports_failures() {
                warn!("{}: {}", instruction.verb(), err);
            } else {
                debug!("{}: {}", instruction.verb(), err);
            }
        }
        result
    }

    pub fn run(&self, instruction: Instruction<'_>) -> Result<Outcome, GpioError> {
        match instruction {
            Instruction::Set { register, value } => self.set(register, value),
            Instruction::SetBit {
                register,
                bit,
                value,
            } => self.set_bit(register, bit, value),
            Instruction::CreateLed { name, color } => self
                .create_led(name, color)
                .map(|slot| Outcome::Created { slot }),
            Instruction::AddLedCmd {
                led,
                behavior,
                register,
                bit,
                value,
            } => self.add_led_command(led, behavior, register, bit, value),
            Instruction::DeleteLed { led } => self.delete_led(led),
            Instruction::RegisterLed { led } => self.register_led(led),
            Instruction::RunLedCmd { led, behavior } => self.run_led_command(led, behavior),
        }
    }

    /// `set`: writes a whole register.
    pub fn set(&self, register: &str, value: u32) -> Result<Outcome, GpioError> {
        let reg = self
            .registers
            .lookup_by_name(register)
            .ok_or(GpioError::NotFound(Entity::Register))?;
        self.port.write(reg, value);
        Ok(Outcome::Done)
    }

    /// `setbit`: sets or clears one bit of a register.
    pub fn set_bit(&self, register: &str, bit: i32, value: i32) -> Result<Outcome, GpioError> {
        let reg = self
            .registers
            .lookup_by_name(register)
            .ok_or(GpioError::NotFound(Entity::Register))?;
        self.port.set_bit(reg, bit, value)?;
        Ok(Outcome::Done)
    }

    /// `createled`: claims a free slot and names it. Returns the slot index.
    pub fn create_led(&self, name: &str, color: &str) -> Result<usize, GpioError> {
        if name.is_empty() {
            return Err(GpioError::MalformedInput);
        }

        critical_section::with(|cs| {
            let mut leds = self.leds.borrow(cs).borrow_mut();
            let name: String<LED_NAME_LEN> = truncated(name);
            if leds.index_of(&name).is_some() {
                return Err(GpioError::AlreadyExists);
            }
            let (slot, led) = leds
                .allocate()
                .ok_or(GpioError::CapacityExceeded(Pool::LedSlots))?;
            led.set_identity(&name, color);
            debug!("created LED {} in slot {}", led.fullname(), slot);
            Ok(slot)
        })
    }

    /// `addledcmd`: appends a bit command to one of an LED's behaviors.
    pub fn add_led_command(
        &self,
        led: &str,
        behavior: &str,
        register: &str,
        bit: i32,
        value: i32,
    ) -> Result<Outcome, GpioError> {
        critical_section::with(|cs| {
            let mut leds = self.leds.borrow(cs).borrow_mut();
            let entry = leds
                .find_by_name_mut(led)
                .ok_or(GpioError::NotFound(Entity::Led))?;
            let behavior =
                Behavior::from_name(behavior).ok_or(GpioError::NotFound(Entity::Behavior))?;
            let table = entry.table_mut(behavior);
            if table.is_full() {
                return Err(GpioError::CapacityExceeded(Pool::CommandSlots));
            }
            let reg = self
                .registers
                .lookup_by_name(register)
                .ok_or(GpioError::NotFound(Entity::Register))?;
            table.append(reg, bit, value)?;
            debug!(
                "added command: LED {} cmd {} reg {} bit {} val {}",
                led,
                behavior.name(),
                reg.name,
                bit,
                value
            );
            Ok(Outcome::Done)
        })
    }

    /// `deleteled`: unregisters the LED and frees its slot.
    pub fn delete_led(&self, led: &str) -> Result<Outcome, GpioError> {
        critical_section::with(|cs| {
            let index = self
                .leds
                .borrow(cs)
                .borrow()
                .index_of(led)
                .ok_or(GpioError::NotFound(Entity::Led))?;
            self.deallocate_slot(index);
            Ok(Outcome::Done)
        })
    }

    /// `registerled`: (re)registers the LED with the device layer.
    ///
    /// Any existing registration is torn down first. The initial brightness
    /// comes from the `get_bright` behavior. If the device layer refuses,
    /// the LED stays allocated and unregistered.
    pub fn register_led(&self, led: &str) -> Result<Outcome, GpioError> {
        critical_section::with(|cs| {
            let leds = self.leds.borrow(cs);
            let devices = self.devices.borrow(cs);

            let index = leds
                .borrow()
                .index_of(led)
                .ok_or(GpioError::NotFound(Entity::Led))?;

            let previous = leds.borrow_mut().take_registration(index);
            if let Some(handle) = previous {
                devices.borrow_mut().unregister(handle);
            }

            let (fullname, brightness, hook) = {
                let leds = leds.borrow();
                let entry = leds.get(index).ok_or(GpioError::NotFound(Entity::Led))?;
                let hook = leds.hook(index).ok_or(GpioError::NotFound(Entity::Led))?;
                let fullname: String<LED_FULLNAME_LEN> = truncated(entry.fullname());
                let brightness = if entry.table(Behavior::GetBright).execute_get(&self.port) {
                    LED_FULL
                } else {
                    LED_OFF
                };
                (fullname, brightness, hook)
            };

            let handle = match devices.borrow_mut().register(&fullname, brightness, hook) {
                Ok(handle) => handle,
                Err(_) => {
                    warn!("unable to register LED {}", fullname.as_str());
                    return Err(GpioError::RegistrationFailed);
                }
            };

            let orphan = match leds
                .borrow_mut()
                .get_mut(index)
                .filter(|entry| entry.generation == hook.generation)
            {
                Some(entry) => {
                    entry.registration = Some(handle);
                    None
                }
                None => Some(handle),
            };
            if let Some(handle) = orphan {
                // Deleted from within the device layer's register call
                devices.borrow_mut().unregister(handle);
                return Err(GpioError::NotFound(Entity::Led));
            }

            info!("registered LED {}", fullname.as_str());
            Ok(Outcome::Done)
        })
    }

    /// `runledcmd`: runs one behavior. Query behaviors report the state they
    /// read, the others write their bits.
    pub fn run_led_command(&self, led: &str, behavior: &str) -> Result<Outcome, GpioError> {
        critical_section::with(|cs| {
            let leds = self.leds.borrow(cs).borrow();
            let entry = leds
                .find_by_name(led)
                .ok_or(GpioError::NotFound(Entity::Led))?;
            let behavior =
                Behavior::from_name(behavior).ok_or(GpioError::NotFound(Entity::Behavior))?;
            let table = entry.table(behavior);
            if behavior.is_query() {
                Ok(Outcome::State(table.execute_get(&self.port)))
            } else {
                table.execute_set(&self.port);
                Ok(Outcome::Done)
            }
        })
    }

    /// Device-layer callback: drives the LED on at or above half brightness,
    /// off below. Returns `false` for a stale hook, which touches nothing.
    pub fn brightness_set(&self, hook: LedHook, brightness: Brightness) -> bool {
        self.with_hooked(hook, |led, port| {
            led.brightness_table(brightness).execute_set(port)
        })
        .is_some()
    }

    /// Device-layer callback: current brightness as reported by `get_bright`.
    pub fn brightness_get(&self, hook: LedHook) -> Option<Brightness> {
        self.with_hooked(hook, |led, port| {
            if led.table(Behavior::GetBright).execute_get(port) {
                LED_FULL
            } else {
                LED_OFF
            }
        })
    }

    /// Device-layer callback: runs `blink_on`.
    pub fn blink_set(&self, hook: LedHook) -> bool {
        self.with_hooked(hook, |led, port| {
            led.table(Behavior::BlinkOn).execute_set(port)
        })
        .is_some()
    }

    /// Device-layer callback: whether `get_blink` reports blinking.
    pub fn blink_get(&self, hook: LedHook) -> Option<bool> {
        self.with_hooked(hook, |led, port| {
            led.table(Behavior::GetBlink).execute_get(port)
        })
    }

    /// Dumps every register as `"<name padded to 15> 0x<value>\n"`.
    pub fn dump_registers<W: core::fmt::Write>(&self, out: &mut W) -> core::fmt::Result {
        for reg in self.registers.iter() {
            writeln!(out, "{:<15} 0x{:08x}", reg.name, self.port.read(reg))?;
        }
        Ok(())
    }

    fn with_hooked<R>(
        &self,
        hook: LedHook,
        f: impl FnOnce(&Led<DL::Handle>, &GpioPort<IO>) -> R,
    ) -> Option<R> {
        critical_section::with(|cs| {
            let leds = self.leds.borrow(cs).borrow();
            leds.resolve_hook(hook).map(|led| f(led, &self.port))
        })
    }

    /// Unregisters, then zeroes, one slot. The device layer runs without the
    /// LED pool borrowed so it may call back into the controller.
    fn deallocate_slot(&self, index: usize) {
        critical_section::with(|cs| {
            let leds = self.leds.borrow(cs);
            let handle = leds.borrow_mut().take_registration(index);
            if let Some(handle) = handle {
                self.devices.borrow(cs).borrow_mut().unregister(handle);
            }
            leds.borrow_mut().release(index);
        });
    }
}
