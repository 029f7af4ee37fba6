//! GameCube adapter demultiplexer
//!
//! [`Adapter`] owns the physical WUP-028 connection. Every inbound
//! multiplexed report is split into four per-port reports; ports appear and
//! disappear as their connection flag changes, and each live port is handed
//! to a [`PortHost`] as an independent [`VirtualPort`].
//!
//! Rumble travels the other way: a port's output report (or a
//! [`gcadapter_ffb::RumbleEffectEngine`] bound to it) updates that port's
//! byte in the shared rumble frame and the whole frame is written to the
//! adapter.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod adapter;
pub mod error;
pub mod host;
pub mod port;

pub use adapter::Adapter;
pub use error::{AdapterError, AdapterResult, HostError};
pub use host::PortHost;
pub use port::VirtualPort;

pub use gcadapter_hid_wup028_protocol::{PORT_COUNT, PortIndex};
