//! Host → adapter output reports.
//!
//! The adapter has a single output channel shared by all four ports. Rumble
//! is therefore one 6-byte frame holding every port's motor state; changing
//! one port means re-sending the whole frame.
//!
//! # Rumble frame layout (report ID 0x11)
//! | Offset | Field                          |
//! |--------|--------------------------------|
//! | 0      | report id `0x11`               |
//! | 1–4    | motor state for ports 0–3      |
//! | 5      | reserved, always zero          |

use crate::types::PortIndex;

/// Report id of the adapter rumble frame.
pub const RUMBLE_REPORT_ID: u8 = 0x11;

/// Length of the rumble frame, id byte included.
pub const RUMBLE_REPORT_LEN: usize = 6;

/// Report id of the one-byte command that starts input streaming.
pub const START_STREAMING_REPORT_ID: u8 = 0x13;

/// The complete streaming-enable command.
pub const START_STREAMING_REPORT: [u8; 1] = [START_STREAMING_REPORT_ID];

/// Report id a virtual port accepts as its rumble output.
pub const PORT_RUMBLE_REPORT_ID: u8 = 0x60;

/// Shared rumble frame for all four ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RumbleCommand([u8; RUMBLE_REPORT_LEN]);

impl RumbleCommand {
    /// All motors off.
    pub const fn new() -> Self {
        Self([RUMBLE_REPORT_ID, 0, 0, 0, 0, 0])
    }

    /// Merge one port's intensity into the frame; other ports are untouched.
    pub fn set_intensity(&mut self, port: PortIndex, intensity: u8) {
        if let Some(byte) = self.0.get_mut(1 + port.as_usize()) {
            *byte = intensity;
        }
    }

    pub fn intensity(&self, port: PortIndex) -> u8 {
        self.0.get(1 + port.as_usize()).copied().unwrap_or(0)
    }

    pub fn as_bytes(&self) -> &[u8; RUMBLE_REPORT_LEN] {
        &self.0
    }
}

impl Default for RumbleCommand {
    fn default() -> Self {
        Self::new()
    }
}

/// By-value form of [`RumbleCommand::set_intensity`].
pub fn encode_rumble(buffer: RumbleCommand, port: PortIndex, intensity: u8) -> RumbleCommand {
    let mut out = buffer;
    out.set_intensity(port, intensity);
    out
}
