//! Named view of one port's sub-report.
//!
//! The virtual report forwards the button field untouched; this view exists
//! for diagnostics and tooling that want named buttons.
//!
//! # Button field
//! | Bit | Button     | Bit | Button |
//! |-----|------------|-----|--------|
//! | 0   | A          | 8   | Start  |
//! | 1   | B          | 9   | Z      |
//! | 2   | X          | 10  | R      |
//! | 3   | Y          | 11  | L      |
//! | 4   | D-pad left |     |        |
//! | 5   | D-pad right|     |        |
//! | 6   | D-pad down |     |        |
//! | 7   | D-pad up   |     |        |

use crate::input::{SubReport, rescale_axes};

/// Controller link type reported in the high nibble of the connection flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionKind {
    Disconnected,
    Wired,
    Wireless,
    /// Flag is non-zero but the type nibble is not one we know.
    Other(u8),
}

impl ConnectionKind {
    pub fn from_flag(flag: u8) -> Self {
        match flag >> 4 {
            _ if flag == 0 => Self::Disconnected,
            1 => Self::Wired,
            2 => Self::Wireless,
            other => Self::Other(other),
        }
    }
}

/// Decoded button field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GcButtons(pub u16);

impl GcButtons {
    pub const A: u16 = 1 << 0;
    pub const B: u16 = 1 << 1;
    pub const X: u16 = 1 << 2;
    pub const Y: u16 = 1 << 3;
    pub const DPAD_LEFT: u16 = 1 << 4;
    pub const DPAD_RIGHT: u16 = 1 << 5;
    pub const DPAD_DOWN: u16 = 1 << 6;
    pub const DPAD_UP: u16 = 1 << 7;
    pub const START: u16 = 1 << 8;
    pub const Z: u16 = 1 << 9;
    pub const R: u16 = 1 << 10;
    pub const L: u16 = 1 << 11;

    const NAMES: [(u16, &'static str); 12] = [
        (Self::A, "A"),
        (Self::B, "B"),
        (Self::X, "X"),
        (Self::Y, "Y"),
        (Self::DPAD_LEFT, "Left"),
        (Self::DPAD_RIGHT, "Right"),
        (Self::DPAD_DOWN, "Down"),
        (Self::DPAD_UP, "Up"),
        (Self::START, "Start"),
        (Self::Z, "Z"),
        (Self::R, "R"),
        (Self::L, "L"),
    ];

    pub fn contains(self, mask: u16) -> bool {
        self.0 & mask == mask
    }

    /// Names of the pressed buttons in bit order.
    pub fn pressed(self) -> Vec<&'static str> {
        Self::NAMES
            .iter()
            .filter(|(mask, _)| self.contains(*mask))
            .map(|(_, name)| *name)
            .collect()
    }
}

/// One controller's state with sticks re-centred around zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GcControllerState {
    pub connection: ConnectionKind,
    pub buttons: GcButtons,
    pub stick_x: i8,
    pub stick_y: i8,
    pub c_stick_x: i8,
    pub c_stick_y: i8,
    pub trigger_left: u8,
    pub trigger_right: u8,
}

impl GcControllerState {
    /// Decode a raw (not yet re-centred) sub-report.
    pub fn from_sub_report(raw: &SubReport) -> Self {
        let centred = rescale_axes(*raw);
        let [x, y, cx, cy] = centred.axes().map(|b| i8::from_ne_bytes([b]));
        let [left, right] = centred.triggers();
        Self {
            connection: ConnectionKind::from_flag(raw.connection_flag()),
            buttons: GcButtons(raw.buttons()),
            stick_x: x,
            stick_y: y,
            c_stick_x: cx,
            c_stick_y: cy,
            trigger_left: left,
            trigger_right: right,
        }
    }
}
