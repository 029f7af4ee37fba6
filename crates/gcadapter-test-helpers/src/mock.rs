//! Mock implementations for testing.
//!
//! The recording doubles live next to the traits they implement; this module
//! gathers them and adds [`AdapterHarness`], a started adapter wired to a
//! mock host and mock device.

pub use gcadapter_engine::host::mock::{HostEvent, MockHost};
pub use gcadapter_ffb::engine::mock::{MockTarget, RecordingLink};
pub use gcadapter_hid_common::mock::MockPhysicalDevice;

use gcadapter_engine::{Adapter, AdapterResult, VirtualPort};

use crate::fixtures::MuxReportBuilder;

/// Started adapter plus observer handles on its host and device.
pub struct AdapterHarness {
    pub adapter: Adapter<MockHost>,
    pub device: MockPhysicalDevice,
    pub host: MockHost,
    clock: u64,
}

impl AdapterHarness {
    /// Starts an adapter over a mock WUP-028. The streaming-enable write is
    /// cleared from the device history.
    pub fn start() -> AdapterResult<Self> {
        let device = MockPhysicalDevice::wup028();
        let host = MockHost::new();
        let mut adapter = Adapter::new(device.clone(), host.clone());
        adapter.start()?;
        device.clear_writes();
        Ok(Self {
            adapter,
            device,
            host,
            clock: 0,
        })
    }

    /// Feeds one raw report with the next timestamp.
    pub fn feed(&mut self, raw: &[u8]) -> AdapterResult<()> {
        self.clock += 1;
        self.adapter.on_report(self.clock, raw)
    }

    /// Feeds a report built from `builder`.
    pub fn feed_built(&mut self, builder: &MuxReportBuilder) -> AdapterResult<()> {
        let raw = builder.build();
        self.feed(&raw)
    }

    /// Connects resting controllers on `indices` and returns their ports.
    pub fn connect(&mut self, indices: &[usize]) -> AdapterResult<Vec<VirtualPort>> {
        self.feed_built(&MuxReportBuilder::new().connected(indices))?;
        let mut ports = Vec::with_capacity(indices.len());
        for &index in indices {
            if let Some(port) = self.adapter.port(index)? {
                ports.push(port.clone());
            }
        }
        Ok(ports)
    }

    /// Rumble byte of each port in the last frame written to the device.
    pub fn last_rumble(&self) -> Option<[u8; 4]> {
        let frame = self.device.last_write()?;
        let bytes = frame.get(1..5)?;
        let mut out = [0u8; 4];
        out.copy_from_slice(bytes);
        Some(out)
    }
}
