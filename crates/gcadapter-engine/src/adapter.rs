//! The adapter: demultiplexing and port lifecycle

use std::sync::Arc;

use gcadapter_hid_common::{HidDeviceInfo, PhysicalDevice, ReportKind};
use gcadapter_hid_wup028_protocol::{
    ADAPTER_PRODUCT_NAME, PORT_COUNT, PortIndex, RumbleCommand, START_STREAMING_REPORT,
    SubReport, VirtualReport, decode_multiplexed, encode_rumble, port_product_name, rescale_axes,
};
use parking_lot::Mutex;
use tracing::{debug, info, trace, warn};

use crate::error::{AdapterError, AdapterResult};
use crate::host::PortHost;
use crate::port::VirtualPort;

/// Physical device plus the rumble frame last committed to it.
///
/// Both report handling and rumble updates write to the device, so they go
/// through this one lock.
struct PhysicalLink {
    device: Box<dyn PhysicalDevice>,
    rumble: Option<RumbleCommand>,
}

/// Adapter state reachable from virtual ports.
pub(crate) struct AdapterShared {
    info: HidDeviceInfo,
    link: Mutex<PhysicalLink>,
}

impl AdapterShared {
    pub(crate) fn info(&self) -> &HidDeviceInfo {
        &self.info
    }

    /// Merges one port's intensity into the frame and writes the full frame.
    pub(crate) fn set_rumble(&self, port: PortIndex, intensity: u8) -> AdapterResult<()> {
        let mut link = self.link.lock();
        let current = link.rumble.ok_or(AdapterError::NotStarted)?;
        let frame = encode_rumble(current, port, intensity);
        link.rumble = Some(frame);

        debug!(port = %port, intensity, frame = ?frame.as_bytes(), "committing rumble frame");
        link.device.write_output_report(frame.as_bytes())?;
        Ok(())
    }

    pub(crate) fn get_report(&self, kind: ReportKind, buf: &mut [u8]) -> AdapterResult<usize> {
        Ok(self.link.lock().device.get_report(kind, buf)?)
    }
}

/// One WUP-028 adapter and its four port slots.
///
/// Report handling takes `&mut self`; one report is processed at a time.
/// Rumble may arrive concurrently through [`VirtualPort`] handles.
pub struct Adapter<H: PortHost> {
    shared: Arc<AdapterShared>,
    host: H,
    ports: [Option<VirtualPort>; PORT_COUNT],
    vreports: Option<Box<[VirtualReport; PORT_COUNT]>>,
}

impl<H: PortHost> Adapter<H> {
    pub fn new(device: impl PhysicalDevice + 'static, host: H) -> Self {
        Self::from_boxed(Box::new(device), host)
    }

    pub fn from_boxed(device: Box<dyn PhysicalDevice>, host: H) -> Self {
        let info = device.info().clone();
        Self {
            shared: Arc::new(AdapterShared {
                info,
                link: Mutex::new(PhysicalLink {
                    device,
                    rumble: None,
                }),
            }),
            host,
            ports: Default::default(),
            vreports: None,
        }
    }

    pub fn info(&self) -> &HidDeviceInfo {
        &self.shared.info
    }

    /// Product string the adapter publishes for itself.
    pub fn product(&self) -> &'static str {
        ADAPTER_PRODUCT_NAME
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn is_started(&self) -> bool {
        self.vreports.is_some()
    }

    /// Prepares the per-port buffers and the rumble frame, then asks the
    /// adapter to start streaming. On failure everything is released again.
    pub fn start(&mut self) -> AdapterResult<()> {
        if self.is_started() {
            debug!("adapter already started");
            return Ok(());
        }

        info!(
            vendor_id = format_args!("{:#06x}", self.shared.info.vendor_id),
            product_id = format_args!("{:#06x}", self.shared.info.product_id),
            location = ?self.shared.info.location_id,
            "starting GameCube adapter"
        );

        self.vreports = Some(Box::new([VirtualReport::new(); PORT_COUNT]));

        let enabled = {
            let mut link = self.shared.link.lock();
            link.rumble = Some(RumbleCommand::new());
            link.device.write_output_report(&START_STREAMING_REPORT)
        };

        if let Err(e) = enabled {
            warn!(error = %e, "failed to enable input streaming");
            self.cleanup();
            return Err(e.into());
        }

        debug!("input streaming enabled");
        Ok(())
    }

    /// Releases buffers and tears down every live port. Safe to call in any
    /// state, any number of times.
    pub fn stop(&mut self) {
        self.cleanup();
    }

    /// Stops the adapter and drops it.
    pub fn shutdown(mut self) {
        self.cleanup();
    }

    fn cleanup(&mut self) {
        if self.vreports.take().is_some() {
            debug!("released port report buffers");
        }

        for slot in PortIndex::ALL {
            self.release_port(slot);
        }

        self.shared.link.lock().rumble = None;
    }

    /// Handles one inbound physical report.
    ///
    /// Multiplexed reports update the port table and feed every connected
    /// port; anything else is ignored. Either way the raw report is passed on
    /// to the host's default handler. A delivery failure stops processing of
    /// the remaining slots and is returned.
    pub fn on_report(&mut self, timestamp: u64, raw: &[u8]) -> AdapterResult<()> {
        let result = match decode_multiplexed(raw) {
            Some(subs) => self.demultiplex(timestamp, &subs),
            None => {
                trace!(len = raw.len(), id = ?raw.first(), "passing through report");
                Ok(())
            }
        };

        self.host.default_report(timestamp, raw);
        result
    }

    fn demultiplex(
        &mut self,
        timestamp: u64,
        subs: &[SubReport; PORT_COUNT],
    ) -> AdapterResult<()> {
        if !self.is_started() {
            return Err(AdapterError::NotStarted);
        }

        for (slot, sub) in PortIndex::ALL.into_iter().zip(subs) {
            if !sub.is_connected() {
                self.release_port(slot);
                continue;
            }

            let Some(port) = self.ensure_port(slot) else {
                continue;
            };

            let Some(report) = self
                .vreports
                .as_mut()
                .and_then(|r| r.get_mut(slot.as_usize()))
            else {
                return Err(AdapterError::NotStarted);
            };
            report.write_payload(&rescale_axes(*sub));

            if let Err(e) = self.host.handle_report(&port, timestamp, report) {
                warn!(port = %slot, error = %e, "report delivery failed");
                return Err(e.into());
            }
        }

        Ok(())
    }

    /// Returns the port for `slot`, creating and registering it first if the
    /// slot is empty. `None` means creation failed this cycle.
    fn ensure_port(&mut self, slot: PortIndex) -> Option<VirtualPort> {
        if let Some(port) = self.ports.get(slot.as_usize()).and_then(Option::as_ref) {
            return Some(port.clone());
        }

        let port = VirtualPort::new(slot, Arc::downgrade(&self.shared));
        debug!(port = %slot, "creating virtual port");

        if let Err(e) = self.host.attach(&port) {
            warn!(port = %slot, error = %e, "could not attach virtual port");
            port.detach_adapter();
            return None;
        }

        if let Err(e) = self.host.start(&port) {
            warn!(port = %slot, error = %e, "could not start virtual port");
            self.host.detach(&port);
            port.detach_adapter();
            return None;
        }

        self.host.register(&port);
        info!(port = %slot, product = %port_product_name(slot), "controller connected");

        if let Some(entry) = self.ports.get_mut(slot.as_usize()) {
            *entry = Some(port.clone());
        }
        Some(port)
    }

    fn release_port(&mut self, slot: PortIndex) {
        if let Some(port) = self.ports.get_mut(slot.as_usize()).and_then(Option::take) {
            self.host.terminate(&port);
            port.detach_adapter();
            info!(port = %slot, "controller disconnected");
        }
    }

    /// Sets one port's rumble byte and writes the full frame.
    pub fn set_rumble(&self, port: PortIndex, intensity: u8) -> AdapterResult<()> {
        self.shared.set_rumble(port, intensity)
    }

    /// Last committed rumble frame, `None` while stopped.
    pub fn rumble_state(&self) -> Option<RumbleCommand> {
        self.shared.link.lock().rumble
    }

    /// Pass-through get-report to the physical adapter.
    pub fn get_report(&self, kind: ReportKind, buf: &mut [u8]) -> AdapterResult<usize> {
        self.shared.get_report(kind, buf)
    }

    /// Reads one raw report from the physical adapter. `Ok(0)` on timeout.
    pub fn read_report(&self, buf: &mut [u8], timeout_ms: i32) -> AdapterResult<usize> {
        Ok(self.shared.link.lock().device.read_report(buf, timeout_ms)?)
    }

    /// Live port in slot `index`, if any.
    pub fn port(&self, index: usize) -> AdapterResult<Option<&VirtualPort>> {
        let slot = PortIndex::try_from(index).map_err(AdapterError::InvalidPort)?;
        Ok(self.ports.get(slot.as_usize()).and_then(Option::as_ref))
    }

    pub fn live_ports(&self) -> impl Iterator<Item = &VirtualPort> {
        self.ports.iter().flatten()
    }

    /// The persistent report buffer of a slot, `None` while stopped.
    pub fn virtual_report(&self, slot: PortIndex) -> Option<&VirtualReport> {
        self.vreports.as_ref().and_then(|r| r.get(slot.as_usize()))
    }
}

impl<H: PortHost> Drop for Adapter<H> {
    fn drop(&mut self) {
        self.cleanup();
    }
}

impl<H: PortHost> std::fmt::Debug for Adapter<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Adapter")
            .field("info", &self.shared.info)
            .field("started", &self.is_started())
            .field("ports", &self.ports)
            .finish()
    }
}
