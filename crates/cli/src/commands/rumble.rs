//! `gcadapterctl rumble`
//!
//! Plays a constant-force effect on one port through the rumble engine, the
//! same path a game would take.

use std::time::{Duration, Instant};

use gcadapter_engine::{Adapter, AdapterError, VirtualPort};
use gcadapter_ffb::{
    DownloadFlags, EffectParams, EffectStatus, EffectType, FfCommand, INFINITE,
    RumbleEffectEngine, StartMode,
};
use gcadapter_hid_common::PhysicalDevice;
use gcadapter_hid_wup028_protocol::{MUX_REPORT_LEN, PortIndex};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::commands::{ConsoleHost, elapsed_us, open_adapter};
use crate::config::{CliConfig, effect_duration_us};
use crate::error::CliError;
use crate::output;

/// Largest iteration count that still ends on its own.
pub const MAX_ITERATIONS: u32 = INFINITE - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RumbleRequest {
    pub port: PortIndex,
    pub duration_ms: u32,
    pub iterations: u32,
}

impl RumbleRequest {
    /// Checks that the effect will stop by itself. Returns the duration of
    /// one iteration in microseconds.
    pub fn validate(&self) -> Result<u32, CliError> {
        if self.iterations == 0 || self.iterations > MAX_ITERATIONS {
            return Err(CliError::ValidationError(format!(
                "iterations must be in 1..={MAX_ITERATIONS}"
            )));
        }
        if self.duration_ms == 0 {
            return Err(CliError::ValidationError(
                "duration must be greater than zero".to_string(),
            ));
        }
        effect_duration_us(self.duration_ms).ok_or_else(|| {
            CliError::ValidationError(format!(
                "duration of {} ms is not a finite effect duration",
                self.duration_ms
            ))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RumbleSummary {
    pub port: u8,
    pub duration_ms: u32,
    pub iterations: u32,
    pub elapsed_ms: u64,
}

pub fn execute(
    config: &CliConfig,
    port: u8,
    duration_ms: Option<u32>,
    iterations: u32,
    json: bool,
) -> Result<(), CliError> {
    let port = port
        .checked_sub(1)
        .and_then(PortIndex::new)
        .ok_or_else(|| CliError::ValidationError(format!("port {port} is not in 1..=4")))?;
    let request = RumbleRequest {
        port,
        duration_ms: duration_ms.unwrap_or(config.rumble_duration_ms),
        iterations,
    };
    request.validate()?;

    let device = open_adapter(config)?;
    let summary = run(device, ConsoleHost::stdout(json).quiet(), config, request)?;

    let message = format!(
        "Rumbled port {} for {} x {} ms",
        summary.port, summary.iterations, summary.duration_ms
    );
    if json {
        let value = serde_json::json!({ "success": true, "rumble": summary });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        output::print_success(&message, false);
    }
    Ok(())
}

/// Waits for the controller, plays the effect to completion and shuts the
/// adapter down.
pub fn run(
    device: impl PhysicalDevice + 'static,
    host: ConsoleHost,
    config: &CliConfig,
    request: RumbleRequest,
) -> Result<RumbleSummary, CliError> {
    let duration_us = request.validate()?;
    let mut adapter = Adapter::new(device, host);
    adapter.start()?;

    let origin = Instant::now();
    let port = wait_for_port(&mut adapter, config, request.port, origin)?;
    info!(port = %request.port, "controller present, starting effect");

    let mut engine = RumbleEffectEngine::new();
    engine.initialize(&port)?;

    let result = play(&mut adapter, &mut engine, config, duration_us, request, origin);
    if result.is_err() {
        if let Err(e) = engine.send_command(FfCommand::StopAll) {
            debug!("Could not stop effect after failure: {}", e);
        }
    }
    engine.terminate();
    adapter.shutdown();

    let elapsed_ms = result?;
    Ok(RumbleSummary {
        port: request.port.number(),
        duration_ms: request.duration_ms,
        iterations: request.iterations,
        elapsed_ms,
    })
}

fn wait_for_port(
    adapter: &mut Adapter<ConsoleHost>,
    config: &CliConfig,
    slot: PortIndex,
    origin: Instant,
) -> Result<VirtualPort, CliError> {
    let deadline = origin + Duration::from_millis(u64::from(config.connect_timeout_ms));
    let mut buf = [0u8; MUX_REPORT_LEN * 2];

    loop {
        if let Some(port) = adapter.port(slot.as_usize())? {
            return Ok(port.clone());
        }
        if Instant::now() >= deadline {
            return Err(CliError::PortNotConnected(slot.number()));
        }
        pump(adapter, &mut buf, config.read_timeout(), origin)?;
    }
}

/// Runs the effect until its timer stops it. Returns elapsed milliseconds.
fn play(
    adapter: &mut Adapter<ConsoleHost>,
    engine: &mut RumbleEffectEngine,
    config: &CliConfig,
    duration_us: u32,
    request: RumbleRequest,
    origin: Instant,
) -> Result<u64, CliError> {
    let params = EffectParams::new(duration_us);
    let id = engine.download_effect(EffectType::ConstantForce, &params, None, DownloadFlags::NONE)?;
    engine.start_effect(id, StartMode::Normal, request.iterations)?;

    let started = Instant::now();
    let tick = i32::try_from(config.timer_tick_ms).unwrap_or(i32::MAX);
    let mut buf = [0u8; MUX_REPORT_LEN * 2];

    while engine.get_effect_status(id)? == EffectStatus::Playing {
        pump(adapter, &mut buf, tick, origin)?;
        engine.poll_timer(Instant::now())?;
    }

    Ok(u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX))
}

/// Reads at most one report and hands it to the adapter.
fn pump(
    adapter: &mut Adapter<ConsoleHost>,
    buf: &mut [u8],
    timeout_ms: i32,
    origin: Instant,
) -> Result<(), CliError> {
    let n = adapter.read_report(buf, timeout_ms)?;
    if let Some(report) = buf.get(..n).filter(|r| !r.is_empty()) {
        match adapter.on_report(elapsed_us(origin), report) {
            Ok(()) => {}
            Err(AdapterError::Host(e)) => warn!("Report delivery failed: {}", e),
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}
