//! Parsing of one control line into an [`Instruction`].
//!
//! A line is split on single spaces and newlines. Consecutive delimiters
//! yield empty tokens; a trailing delimiter does not. At most
//! [`MAX_TOKENS`] tokens are kept.

use heapless::Vec;

use crate::gpio::GpioError;

/// Maximum number of tokens taken from one line.
pub const MAX_TOKENS: usize = 12;

pub type Tokens<'a> = Vec<&'a str, MAX_TOKENS>;

pub fn tokenize(line: &str) -> Tokens<'_> {
    let mut tokens = Tokens::new();
    if line.is_empty() {
        return tokens;
    }

    let mut pieces = line.split([' ', '\n']).peekable();
    while let Some(piece) = pieces.next() {
        if piece.is_empty() && pieces.peek().is_none() {
            break;
        }
        if tokens.push(piece).is_err() {
            break;
        }
    }
    tokens
}

/// Parses an integer the way C's `%i` conversion does: optional sign, then
/// `0x` hex, leading-zero octal or decimal. The longest valid prefix is
/// used, a token without digits reads as 0, and out-of-range values
/// saturate to `i64::MIN`/`i64::MAX`.
pub fn parse_int(token: &str) -> i64 {
    let bytes = token.trim_start().as_bytes();
    let mut i = 0;

    let negative = match bytes.first() {
        Some(b'-') => {
            i += 1;
            true
        }
        Some(b'+') => {
            i += 1;
            false
        }
        _ => false,
    };

    let rest = &bytes[i..];
    let (radix, digits) = if rest.len() > 2
        && rest[0] == b'0'
        && (rest[1] == b'x' || rest[1] == b'X')
        && rest[2].is_ascii_hexdigit()
    {
        (16, &rest[2..])
    } else if rest.first() == Some(&b'0') {
        (8, rest)
    } else {
        (10, rest)
    };

    let mut value: Option<i64> = Some(0);
    for &b in digits {
        let Some(d) = (b as char).to_digit(radix) else {
            break;
        };
        value = value
            .and_then(|v| v.checked_mul(i64::from(radix)))
            .and_then(|v| v.checked_add(i64::from(d)));
    }

    match (value, negative) {
        (Some(v), true) => -v,
        (Some(v), false) => v,
        (None, true) => i64::MIN,
        (None, false) => i64::MAX,
    }
}

/// [`parse_int`] narrowed to `i32`, saturating at its bounds.
pub fn parse_i32(token: &str) -> i32 {
    let value = parse_int(token);
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}

/// One parsed control line. Names are borrowed from the line and resolved
/// when the instruction runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction<'a> {
    /// `set <register> <value>`
    Set { register: &'a str, value: u32 },
    /// `setbit <register> <bit> <value>`
    SetBit {
        register: &'a str,
        bit: i32,
        value: i32,
    },
    /// `createled <name> <color>`
    CreateLed { name: &'a str, color: &'a str },
    /// `addledcmd <led> <behavior> <register> <bit> <value>`
    AddLedCmd {
        led: &'a str,
        behavior: &'a str,
        register: &'a str,
        bit: i32,
        value: i32,
    },
    /// `deleteled <led>`
    DeleteLed { led: &'a str },
    /// `registerled <led>`
    RegisterLed { led: &'a str },
    /// `runledcmd <led> <behavior>`
    RunLedCmd { led: &'a str, behavior: &'a str },
}

impl<'a> Instruction<'a> {
    /// Builds an instruction from tokens.
    ///
    /// `set` and `setbit` tolerate trailing tokens; every other verb needs
    /// its exact argument count. Unknown verbs and wrong counts are
    /// `MalformedInput`.
    pub fn parse(tokens: &[&'a str]) -> Result<Self, GpioError> {
        let Some((&verb, args)) = tokens.split_first() else {
            return Err(GpioError::MalformedInput);
        };

        let instruction = match (verb, args) {
            ("set", &[register, value, ..]) => Instruction::Set {
                register,
                value: parse_int(value) as u32,
            },
            ("setbit", &[register, bit, value, ..]) => Instruction::SetBit {
                register,
                bit: parse_i32(bit),
                value: parse_i32(value),
            },
            ("createled", &[name, color]) => Instruction::CreateLed { name, color },
            ("addledcmd", &[led, behavior, register, bit, value]) => Instruction::AddLedCmd {
                led,
                behavior,
                register,
                bit: parse_i32(bit),
                value: parse_i32(value),
            },
            ("deleteled", &[led]) => Instruction::DeleteLed { led },
            ("registerled", &[led]) => Instruction::RegisterLed { led },
            ("runledcmd", &[led, behavior]) => Instruction::RunLedCmd { led, behavior },
            _ => return Err(GpioError::MalformedInput),
        };
        Ok(instruction)
    }

    pub fn verb(&self) -> &'static str {
        match self {
            Instruction::Set { .. } => "set",
            Instruction::SetBit { .. } => "setbit",
            Instruction::CreateLed { .. } => "createled",
            Instruction::AddLedCmd { .. } => "addledcmd",
            Instruction::DeleteLed { .. } => "deleteled",
            Instruction::RegisterLed { .. } => "registerled",
            Instruction::RunLedCmd { .. } => "runledcmd",
        }
    }

    /// Raw register writes fail quietly; LED management reports failures.
    pub fn reports_failures(&self) -> bool {
        !matches!(self, Instruction::Set { .. } | Instruction::SetBit { .. })
    }
}
