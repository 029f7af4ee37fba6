//! `gcadapterctl list`

use gcadapter_hid_common::list_adapters;
use hidapi::HidApi;
use tracing::debug;

use crate::config::CliConfig;
use crate::error::CliError;
use crate::output;

pub fn execute(config: &CliConfig, json: bool) -> Result<(), CliError> {
    let api = HidApi::new()?;
    let adapters = list_adapters(&api, config.vendor_id, config.product_id);
    debug!("Found {} adapter(s)", adapters.len());
    output::print_adapter_list(&adapters, json);
    Ok(())
}
