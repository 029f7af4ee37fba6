//! Common HID plumbing for the GameCube adapter bridge
//!
//! This crate owns the boundary to the physical WUP-028 adapter: the
//! [`PhysicalDevice`] trait the engine writes through, the identity record
//! virtual ports forward, a `hidapi` backed implementation, and a mock for
//! tests.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod device_info;
pub mod hid_traits;
pub mod hidapi_device;

pub use device_info::*;
pub use hid_traits::*;
pub use hidapi_device::{HidApiDevice, list_adapters};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HidCommonError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Failed to open device: {0}")]
    OpenError(String),

    #[error("Failed to read from device: {0}")]
    ReadError(String),

    #[error("Failed to write to device: {0}")]
    WriteError(String),

    #[error("Invalid report format: {0}")]
    InvalidReport(String),

    #[error("Device disconnected")]
    Disconnected,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type HidCommonResult<T> = Result<T, HidCommonError>;
