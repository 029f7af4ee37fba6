//! Nintendo WUP-028 GameCube adapter USB HID protocol.
//!
//! The WUP-028 enumerates as a single HID interface that multiplexes up to
//! four GameCube controllers into one 37-byte input report. This crate holds
//! the I/O-free pieces needed to split that report into per-port reports and
//! to build the adapter's shared rumble frame.
//!
//! # VID / PID
//! - Vendor ID: `0x057E` (Nintendo)
//! - Product ID: `0x0337` (WUP-028)
//!
//! # Report ids
//! | Id     | Direction      | Length | Meaning                                |
//! |--------|----------------|--------|----------------------------------------|
//! | `0x21` | adapter → host | 37     | multiplexed state of all four ports    |
//! | `0x11` | host → adapter | 6      | rumble frame, one byte per port        |
//! | `0x13` | host → adapter | 1      | start streaming input reports          |
//! | `0x50` | virtual input  | 9      | one port's re-centred state            |
//! | `0x60` | virtual output | 2      | one port's rumble on/off               |
//!
//! `0x50` and `0x60` never reach the wire; they are the synthetic reports
//! described by [`INJECTED_DESCRIPTOR`] and exposed per virtual port.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(static_mut_refs)]
#![deny(clippy::unwrap_used)]

pub mod descriptor;
pub mod ids;
pub mod input;
pub mod output;
pub mod state;
pub mod types;

pub use descriptor::{INJECTED_DESCRIPTOR, inject_descriptor};
pub use ids::{ADAPTER_PRODUCT_NAME, PRODUCT_ID, VENDOR_ID, is_wup028, port_product_name};
pub use input::{
    AXIS_BIAS, MUX_REPORT_ID, MUX_REPORT_LEN, SUB_REPORT_LEN, SubReport, VIRTUAL_REPORT_ID,
    VIRTUAL_REPORT_LEN, VirtualReport, build_virtual_report, decode_multiplexed, rescale_axes,
    restore_axes,
};
pub use output::{
    PORT_RUMBLE_REPORT_ID, RUMBLE_REPORT_ID, RUMBLE_REPORT_LEN, RumbleCommand,
    START_STREAMING_REPORT, START_STREAMING_REPORT_ID, encode_rumble,
};
pub use state::{ConnectionKind, GcButtons, GcControllerState};
pub use types::{PORT_COUNT, PortIndex};
