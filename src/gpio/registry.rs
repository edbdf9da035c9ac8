use bitmaps::{Bitmap, Bits, BitsImpl};

use crate::gpio::{
    device::{DeviceLayer, LedHook},
    led::Led,
};

/// Number of LED slots in the default registry.
pub const LED_MAX: usize = 16;

/// Fixed pool of LED slots with name-keyed lookup.
///
/// Occupancy is tracked explicitly, so a slot is in use from the moment it
/// is allocated, before it has been given its real name.
pub struct LedRegistry<H, const N: usize = LED_MAX>
where
    BitsImpl<N>: Bits,
{
    slots: [Led<H>; N],
    occupied: Bitmap<N>,
}

impl<H, const N: usize> core::fmt::Debug for LedRegistry<H, N>
where
    BitsImpl<N>: Bits,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LedRegistry")
            .field("live", &self.live())
            .field("capacity", &N)
            .finish_non_exhaustive()
    }
}

impl<H, const N: usize> LedRegistry<H, N>
where
    BitsImpl<N>: Bits,
{
    pub fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| Led::new()),
            occupied: Bitmap::new(),
        }
    }

    /// Number of allocated slots.
    pub fn live(&self) -> usize {
        self.occupied.len()
    }

    pub fn capacity(&self) -> usize {
        N
    }

    pub fn is_occupied(&self, index: usize) -> bool {
        index < N && self.occupied.get(index)
    }

    pub fn get(&self, index: usize) -> Option<&Led<H>> {
        self.is_occupied(index).then(|| &self.slots[index])
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Led<H>> {
        if self.is_occupied(index) {
            Some(&mut self.slots[index])
        } else {
            None
        }
    }

    /// Slot index of the allocated LED called `name`. Empty names never match.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        if name.is_empty() {
            return None;
        }
        (0..N).find(|&i| self.occupied.get(i) && self.slots[i].name() == name)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Led<H>> {
        self.index_of(name).map(|i| &self.slots[i])
    }

    pub fn find_by_name_mut(&mut self, name: &str) -> Option<&mut Led<H>> {
        self.index_of(name).map(|i| &mut self.slots[i])
    }

    /// Claims the first free slot and gives it a placeholder name.
    ///
    /// Returns `None` when every slot is in use.
    pub fn allocate(&mut self) -> Option<(usize, &mut Led<H>)> {
        let index = (0..N).find(|&i| !self.occupied.get(i))?;
        self.occupied.set(index, true);
        let led = &mut self.slots[index];
        led.set_placeholder();
        Some((index, led))
    }

    /// Hook identifying the current occupant of `index`.
    pub fn hook(&self, index: usize) -> Option<LedHook> {
        self.get(index).map(|led| LedHook {
            slot: index,
            generation: led.generation,
        })
    }

    /// The LED a hook was issued for, if it is still alive.
    pub fn resolve_hook(&self, hook: LedHook) -> Option<&Led<H>> {
        self.get(hook.slot)
            .filter(|led| led.generation == hook.generation)
    }

    /// Detaches the slot's registration, leaving the LED itself in place.
    pub fn take_registration(&mut self, index: usize) -> Option<H> {
        self.slots.get_mut(index)?.registration.take()
    }

    /// Zeroes the slot and returns it to the free pool. Any hook issued for
    /// the previous occupant goes stale.
    ///
    /// The registration must have been taken and torn down first.
    pub fn release(&mut self, index: usize) {
        let Some(led) = self.slots.get_mut(index) else {
            return;
        };
        led.reset();
        if self.occupied.get(index) {
            led.generation = led.generation.wrapping_add(1);
            self.occupied.set(index, false);
        }
    }

    /// Unregisters the slot's device (if any), then releases the slot.
    pub fn deallocate<D>(&mut self, index: usize, devices: &mut D)
    where
        D: DeviceLayer<Handle = H>,
    {
        if let Some(handle) = self.take_registration(index) {
            devices.unregister(handle);
        }
        self.release(index);
    }

    /// Deallocates every slot. Calling it again changes nothing.
    pub fn reset<D>(&mut self, devices: &mut D)
    where
        D: DeviceLayer<Handle = H>,
    {
        for index in 0..N {
            self.deallocate(index, devices);
        }
    }

    /// Allocated LEDs with their slot index.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Led<H>)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(i, _)| self.occupied.get(*i))
    }
}

impl<H, const N: usize> Default for LedRegistry<H, N>
where
    BitsImpl<N>: Bits,
{
    fn default() -> Self {
        Self::new()
    }
}
