use core::fmt::Write;

use heapless::String;

use crate::gpio::command::CommandTable;

pub const LED_NAME_LEN: usize = 31;
pub const LED_COLOR_LEN: usize = 31;
pub const LED_FULLNAME_LEN: usize = 95;

/// Prefix of every LED's full device name.
pub const LED_PREFIX: &str = "ich7";

/// Name given to a freshly allocated slot until the caller renames it.
pub const PLACEHOLDER_NAME: &str = "Unnamed";

/// Host LED brightness, `0..=255`.
pub type Brightness = u8;

pub const LED_OFF: Brightness = 0;
pub const LED_HALF: Brightness = 127;
pub const LED_FULL: Brightness = 255;

/// The five behaviors an LED is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Behavior {
    /// Drive the LED off (`bright_0`).
    BrightOff,
    /// Drive the LED on (`bright_1`).
    BrightOn,
    /// Start blinking (`blink_on`).
    BlinkOn,
    /// Query whether the LED is lit (`get_bright`).
    GetBright,
    /// Query whether the LED is blinking (`get_blink`).
    GetBlink,
}

impl Behavior {
    pub const ALL: [Behavior; 5] = [
        Behavior::BrightOff,
        Behavior::BrightOn,
        Behavior::BlinkOn,
        Behavior::GetBright,
        Behavior::GetBlink,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "bright_0" => Some(Behavior::BrightOff),
            "bright_1" => Some(Behavior::BrightOn),
            "blink_on" => Some(Behavior::BlinkOn),
            "get_bright" => Some(Behavior::GetBright),
            "get_blink" => Some(Behavior::GetBlink),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Behavior::BrightOff => "bright_0",
            Behavior::BrightOn => "bright_1",
            Behavior::BlinkOn => "blink_on",
            Behavior::GetBright => "get_bright",
            Behavior::GetBlink => "get_blink",
        }
    }

    /// True for behaviors that read state instead of writing it.
    pub fn is_query(self) -> bool {
        matches!(self, Behavior::GetBright | Behavior::GetBlink)
    }
}

/// One LED slot: identity, registration and its command tables.
///
/// `H` is the device layer's registration handle.
#[derive(Debug)]
pub struct Led<H> {
    name: String<LED_NAME_LEN>,
    color: String<LED_COLOR_LEN>,
    fullname: String<LED_FULLNAME_LEN>,
    pub(crate) registration: Option<H>,
    pub(crate) generation: u32,
    set_brightness_0: CommandTable,
    set_brightness_1: CommandTable,
    set_blink_on: CommandTable,
    get_brightness: CommandTable,
    get_blink: CommandTable,
}

impl<H> Led<H> {
    pub const fn new() -> Self {
        Self {
            name: String::new(),
            color: String::new(),
            fullname: String::new(),
            registration: None,
            generation: 0,
            set_brightness_0: CommandTable::new(),
            set_brightness_1: CommandTable::new(),
            set_blink_on: CommandTable::new(),
            get_brightness: CommandTable::new(),
            get_blink: CommandTable::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    /// `"ich7:<color>:<name>"`, as handed to the device layer.
    pub fn fullname(&self) -> &str {
        &self.fullname
    }

    pub fn is_registered(&self) -> bool {
        self.registration.is_some()
    }

    /// Sets name, color and the derived full name. Overlong values are cut
    /// at `LED_NAME_LEN`/`LED_COLOR_LEN` bytes.
    pub fn set_identity(&mut self, name: &str, color: &str) {
        self.name = truncated(name);
        self.color = truncated(color);
        self.fullname.clear();
        // Cannot overflow: prefix + both parts stay below LED_FULLNAME_LEN.
        let _ = write!(self.fullname, "{}:{}:{}", LED_PREFIX, self.color, self.name);
    }

    pub(crate) fn set_placeholder(&mut self) {
        self.name = truncated(PLACEHOLDER_NAME);
    }

    pub fn table(&self, behavior: Behavior) -> &CommandTable {
        match behavior {
            Behavior::BrightOff => &self.set_brightness_0,
            Behavior::BrightOn => &self.set_brightness_1,
            Behavior::BlinkOn => &self.set_blink_on,
            Behavior::GetBright => &self.get_brightness,
            Behavior::GetBlink => &self.get_blink,
        }
    }

    pub fn table_mut(&mut self, behavior: Behavior) -> &mut CommandTable {
        match behavior {
            Behavior::BrightOff => &mut self.set_brightness_0,
            Behavior::BrightOn => &mut self.set_brightness_1,
            Behavior::BlinkOn => &mut self.set_blink_on,
            Behavior::GetBright => &mut self.get_brightness,
            Behavior::GetBlink => &mut self.get_blink,
        }
    }

    /// Table to run for a requested brightness: `bright_1` at or above half
    /// scale, `bright_0` below.
    pub fn brightness_table(&self, brightness: Brightness) -> &CommandTable {
        if brightness >= LED_HALF {
            &self.set_brightness_1
        } else {
            &self.set_brightness_0
        }
    }

    /// Zeroes identity and all tables. Registration must already be gone.
    pub(crate) fn reset(&mut self) {
        debug_assert!(self.registration.is_none());
        self.name.clear();
        self.color.clear();
        self.fullname.clear();
        for behavior in Behavior::ALL {
            self.table_mut(behavior).clear();
        }
    }
}

impl<H> Default for Led<H> {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies at most `N` bytes of `s`, cutting at a char boundary.
pub(crate) fn truncated<const N: usize>(s: &str) -> String<N> {
    let mut end = s.len().min(N);
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    let mut out = String::new();
    // Cannot fail: `end <= N`.
    let _ = out.push_str(&s[..end]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpio::test_support::reg;

    #[test]
    fn behavior_names_round_trip() {
        for behavior in Behavior::ALL {
            assert_eq!(Behavior::from_name(behavior.name()), Some(behavior));
        }
        assert_eq!(Behavior::from_name("bright_2"), None);
        assert_eq!(Behavior::from_name("BRIGHT_0"), None);
    }

    #[test]
    fn query_behaviors() {
        assert!(Behavior::GetBright.is_query());
        assert!(Behavior::GetBlink.is_query());
        assert!(!Behavior::BrightOn.is_query());
        assert!(!Behavior::BlinkOn.is_query());
    }

    #[test]
    fn identity_builds_fullname() {
        let mut led: Led<()> = Led::new();
        led.set_identity("disk", "green");
        assert_eq!(led.name(), "disk");
        assert_eq!(led.color(), "green");
        assert_eq!(led.fullname(), "ich7:green:disk");
    }

    #[test]
    fn identity_truncates_long_values() {
        let mut led: Led<()> = Led::new();
        let long = "abcdefghijklmnopqrstuvwxyz0123456789";
        led.set_identity(long, long);
        assert_eq!(led.name().len(), LED_NAME_LEN);
        assert_eq!(led.name(), &long[..LED_NAME_LEN]);
        assert_eq!(led.color(), &long[..LED_COLOR_LEN]);
        assert!(led.fullname().starts_with("ich7:abcdef"));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        // 30 ASCII bytes followed by a 2-byte char straddling the limit
        let s = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaé";
        let out: String<31> = truncated(s);
        assert_eq!(out.len(), 30);
    }

    #[test]
    fn brightness_threshold_selects_table() {
        let mut led: Led<()> = Led::new();
        led.table_mut(Behavior::BrightOff)
            .append(reg("GP_LVL"), 0, 0)
            .unwrap();
        led.table_mut(Behavior::BrightOn)
            .append(reg("GP_LVL"), 0, 1)
            .unwrap();

        let off = led.table(Behavior::BrightOff) as *const _;
        let on = led.table(Behavior::BrightOn) as *const _;
        assert_eq!(led.brightness_table(LED_OFF) as *const _, off);
        assert_eq!(led.brightness_table(LED_HALF - 1) as *const _, off);
        assert_eq!(led.brightness_table(LED_HALF) as *const _, on);
        assert_eq!(led.brightness_table(LED_FULL) as *const _, on);
    }

    #[test]
    fn reset_clears_identity_and_tables() {
        let mut led: Led<()> = Led::new();
        led.set_identity("a", "b");
        for behavior in Behavior::ALL {
            led.table_mut(behavior).append(reg("GP_LVL"), 1, 1).unwrap();
        }
        led.reset();

        assert_eq!(led.name(), "");
        assert_eq!(led.color(), "");
        assert_eq!(led.fullname(), "");
        for behavior in Behavior::ALL {
            assert!(led.table(behavior).is_empty());
        }
    }
}
