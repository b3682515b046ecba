//! Controller report representation shared by the sequencer, the macro
//! tables and the remote parser.
//!
//! A `PadReport` is one complete snapshot of emulated pad state: a 14-bit
//! button mask, two analog sticks (one byte per axis, 128 = center) and the
//! directional hat.

pub mod button_mapper;

pub use button_mapper::{apply_command, PadCommand};

use serde::{Deserialize, Serialize};

/// Stick axis minimum (full deflection towards 0).
pub const STICK_MIN: u8 = 0;
/// Stick axis center / rest position.
pub const STICK_CENTER: u8 = 128;
/// Stick axis maximum (full deflection towards 255).
pub const STICK_MAX: u8 = 255;

/// Button mask bits, one per logical pad button.
///
/// Bit positions follow the remote-protocol flag column order, so the parser
/// can map flag index i to bit i directly.
pub mod buttons {
    pub const A: u16 = 1 << 0;
    pub const B: u16 = 1 << 1;
    pub const X: u16 = 1 << 2;
    pub const Y: u16 = 1 << 3;
    pub const L: u16 = 1 << 4;
    pub const R: u16 = 1 << 5;
    pub const ZL: u16 = 1 << 6;
    pub const ZR: u16 = 1 << 7;
    pub const MINUS: u16 = 1 << 8;
    pub const PLUS: u16 = 1 << 9;
    pub const LCLICK: u16 = 1 << 10;
    pub const RCLICK: u16 = 1 << 11;
    pub const HOME: u16 = 1 << 12;
    pub const CAPTURE: u16 = 1 << 13;

    /// Number of addressable buttons (and remote flag columns).
    pub const COUNT: usize = 14;
}

// Hat direction, 0 = up, clockwise, 8 = released
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hat {
    Up,
    UpRight,
    Right,
    DownRight,
    Down,
    DownLeft,
    Left,
    UpLeft,
    Neutral,
}

impl Hat {
    /// Wire value: 0-7 clockwise from the top, 8 = neutral.
    pub fn as_byte(self) -> u8 {
        match self {
            Hat::Up => 0,
            Hat::UpRight => 1,
            Hat::Right => 2,
            Hat::DownRight => 3,
            Hat::Down => 4,
            Hat::DownLeft => 5,
            Hat::Left => 6,
            Hat::UpLeft => 7,
            Hat::Neutral => 8,
        }
    }

    /// Inverse of [`Hat::as_byte`]; values above 8 are not a hat position.
    pub fn from_byte(value: u8) -> Option<Hat> {
        match value {
            0 => Some(Hat::Up),
            1 => Some(Hat::UpRight),
            2 => Some(Hat::Right),
            3 => Some(Hat::DownRight),
            4 => Some(Hat::Down),
            5 => Some(Hat::DownLeft),
            6 => Some(Hat::Left),
            7 => Some(Hat::UpLeft),
            8 => Some(Hat::Neutral),
            _ => None,
        }
    }
}

impl Default for Hat {
    fn default() -> Self {
        Hat::Neutral
    }
}

/// One instant of emulated controller state.
///
/// Field defaults are the neutral/centered values; commands mutate only the
/// fields they name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PadReport {
    /// OR-combined button mask, see [`buttons`].
    pub buttons: u16,
    /// Left stick X axis.
    pub lx: u8,
    /// Left stick Y axis.
    pub ly: u8,
    /// Right stick X axis.
    pub rx: u8,
    /// Right stick Y axis.
    pub ry: u8,
    /// Directional hat.
    pub hat: Hat,
}

impl PadReport {
    /// The all-neutral report: no buttons, both sticks centered, hat released.
    pub const fn neutral() -> Self {
        Self {
            buttons: 0,
            lx: STICK_CENTER,
            ly: STICK_CENTER,
            rx: STICK_CENTER,
            ry: STICK_CENTER,
            hat: Hat::Neutral,
        }
    }

    /// Forces every field back to its neutral value.
    pub fn reset(&mut self) {
        *self = Self::neutral();
    }
}

impl Default for PadReport {
    fn default() -> Self {
        Self::neutral()
    }
}
