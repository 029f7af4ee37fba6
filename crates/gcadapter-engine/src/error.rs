//! Error types for the adapter engine

use gcadapter_hid_common::HidCommonError;
use gcadapter_hid_wup028_protocol::PortIndex;
use thiserror::Error;

/// Failures reported by the host framework a port is registered with.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("host refused to attach port {0}")]
    AttachFailed(PortIndex),

    #[error("host failed to start port {0}")]
    StartFailed(PortIndex),

    #[error("report delivery to port {port} failed: {reason}")]
    DeliveryFailed { port: PortIndex, reason: String },
}

#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("adapter not started")]
    NotStarted,

    #[error("invalid port index {0}, expected 0..4")]
    InvalidPort(usize),

    #[error("virtual port is detached from its adapter")]
    Detached,

    #[error(transparent)]
    Host(#[from] HostError),

    #[error("physical device error: {0}")]
    Device(#[from] HidCommonError),
}

pub type AdapterResult<T> = Result<T, AdapterError>;
