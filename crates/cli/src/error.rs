//! Error types for gcadapterctl

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Port {0} has no controller")]
    PortNotConnected(u8),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("HID error: {0}")]
    Hid(#[from] hidapi::HidError),

    #[error(transparent)]
    Device(#[from] gcadapter_hid_common::HidCommonError),

    #[error(transparent)]
    Adapter(#[from] gcadapter_engine::AdapterError),

    #[error("Force feedback error: {0}")]
    Effect(#[from] gcadapter_ffb::FfbError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::DeviceNotFound(_) | CliError::PortNotConnected(_) => 2,
            CliError::ValidationError(_)
            | CliError::InvalidConfiguration(_)
            | CliError::JsonError(_)
            | CliError::YamlError(_) => 4,
            CliError::Hid(_) | CliError::Device(_) | CliError::Adapter(_) => 5,
            CliError::Effect(_) | CliError::IoError(_) => 1,
        }
    }
}
