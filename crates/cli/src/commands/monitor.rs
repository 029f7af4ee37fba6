//! `gcadapterctl monitor`
//!
//! Streams adapter reports through an [`Adapter`] and prints port events
//! and controller state as they change.

use std::time::Instant;

use gcadapter_engine::{Adapter, AdapterError};
use gcadapter_hid_common::PhysicalDevice;
use gcadapter_hid_wup028_protocol::MUX_REPORT_LEN;
use tracing::{debug, info, warn};

use crate::commands::{ConsoleHost, elapsed_us, open_adapter};
use crate::config::CliConfig;
use crate::error::CliError;

pub fn execute(config: &CliConfig, count: Option<u64>, json: bool) -> Result<(), CliError> {
    let device = open_adapter(config)?;
    let processed = run(device, ConsoleHost::stdout(json), config, count)?;
    info!("Processed {} report(s)", processed);
    Ok(())
}

/// Feeds reports into an adapter until `count` non-empty reads were
/// processed. Returns the number processed.
pub fn run(
    device: impl PhysicalDevice + 'static,
    host: ConsoleHost,
    config: &CliConfig,
    count: Option<u64>,
) -> Result<u64, CliError> {
    let mut adapter = Adapter::new(device, host);
    adapter.start()?;

    let origin = Instant::now();
    let mut buf = [0u8; MUX_REPORT_LEN * 2];
    let mut processed = 0u64;

    while count.is_none_or(|limit| processed < limit) {
        let n = adapter.read_report(&mut buf, config.read_timeout())?;
        let Some(report) = buf.get(..n).filter(|r| !r.is_empty()) else {
            continue;
        };

        match adapter.on_report(elapsed_us(origin), report) {
            Ok(()) => {}
            Err(AdapterError::Host(e)) => warn!("Report delivery failed: {}", e),
            Err(e) => return Err(e.into()),
        }
        processed += 1;
    }

    debug!(
        delivered = adapter.host().delivered(),
        "monitor finished"
    );
    adapter.shutdown();
    Ok(processed)
}
