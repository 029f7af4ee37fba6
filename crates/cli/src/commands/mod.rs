//! Command implementations for gcadapterctl

pub mod console;
pub mod descriptor;
pub mod list;
pub mod monitor;
pub mod rumble;

use gcadapter_hid_common::HidApiDevice;
use hidapi::HidApi;
use tracing::info;

use crate::config::CliConfig;
use crate::error::CliError;

pub use console::ConsoleHost;

/// Opens the first adapter matching the configured VID/PID.
pub fn open_adapter(config: &CliConfig) -> Result<HidApiDevice, CliError> {
    let api = HidApi::new()?;
    let device = HidApiDevice::open(&api, config.vendor_id, config.product_id).map_err(|e| {
        match e {
            gcadapter_hid_common::HidCommonError::DeviceNotFound(id) => {
                CliError::DeviceNotFound(id)
            }
            other => CliError::Device(other),
        }
    })?;
    info!(
        "Opened adapter {:04x}:{:04x}",
        config.vendor_id, config.product_id
    );
    Ok(device)
}

/// Microseconds since `origin`, saturating.
pub(crate) fn elapsed_us(origin: std::time::Instant) -> u64 {
    u64::try_from(origin.elapsed().as_micros()).unwrap_or(u64::MAX)
}
