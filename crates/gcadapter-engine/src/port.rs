//! Virtual controller ports
//!
//! A [`VirtualPort`] owns no hardware. Identity queries are answered from the
//! adapter's [`HidDeviceInfo`], output reports become rumble updates on the
//! shared frame, and everything stops working once the adapter tears the
//! port down.

use std::sync::{Arc, Weak};

use gcadapter_ffb::{FfbError, FfbResult, ForceFeedbackTarget, RumbleLink, TARGET_CLASS};
use gcadapter_hid_common::{HidDeviceInfo, ReportKind};
use gcadapter_hid_wup028_protocol::{
    PORT_RUMBLE_REPORT_ID, PortIndex, inject_descriptor, port_product_name,
};
use parking_lot::RwLock;
use tracing::trace;

use crate::adapter::AdapterShared;
use crate::error::{AdapterError, AdapterResult};

/// Registry property holding the zero-based slot of a port.
pub const PORT_PROPERTY: &str = "Port";

struct PortCell {
    index: PortIndex,
    adapter: RwLock<Weak<AdapterShared>>,
}

/// Handle to one logical controller.
///
/// Clones refer to the same port. The handle outlives the port itself:
/// after teardown every identity query returns `None` and every report call
/// fails with [`AdapterError::Detached`].
#[derive(Clone)]
pub struct VirtualPort {
    cell: Arc<PortCell>,
}

impl std::fmt::Debug for VirtualPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualPort")
            .field("index", &self.cell.index)
            .field("attached", &self.is_attached())
            .finish()
    }
}

impl VirtualPort {
    pub(crate) fn new(index: PortIndex, adapter: Weak<AdapterShared>) -> Self {
        Self {
            cell: Arc::new(PortCell {
                index,
                adapter: RwLock::new(adapter),
            }),
        }
    }

    /// Drops the back-reference to the adapter. Idempotent.
    pub(crate) fn detach_adapter(&self) {
        *self.cell.adapter.write() = Weak::new();
    }

    fn adapter(&self) -> Option<Arc<AdapterShared>> {
        self.cell.adapter.read().upgrade()
    }

    fn with_info<T>(&self, f: impl FnOnce(&HidDeviceInfo) -> Option<T>) -> Option<T> {
        self.adapter().and_then(|shared| f(shared.info()))
    }

    pub fn index(&self) -> PortIndex {
        self.cell.index
    }

    /// Value of the `"Port"` property.
    pub fn port_property(&self) -> u32 {
        u32::from(self.cell.index.get())
    }

    /// Numeric registry property by name. Only [`PORT_PROPERTY`] exists.
    pub fn property(&self, name: &str) -> Option<u32> {
        (name == PORT_PROPERTY).then(|| self.port_property())
    }

    pub fn is_attached(&self) -> bool {
        self.adapter().is_some()
    }

    /// True when both handles refer to the same port.
    pub fn same_port(&self, other: &VirtualPort) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }

    /// `"GameCube Controller N"` with N counted from 1.
    pub fn product(&self) -> Option<String> {
        self.adapter().map(|_| port_product_name(self.cell.index))
    }

    pub fn manufacturer(&self) -> Option<String> {
        self.with_info(|info| info.manufacturer.clone())
    }

    pub fn serial_number(&self) -> Option<String> {
        self.with_info(|info| info.serial_number.clone())
    }

    pub fn vendor_id(&self) -> Option<u16> {
        self.with_info(|info| Some(info.vendor_id))
    }

    pub fn product_id(&self) -> Option<u16> {
        self.with_info(|info| Some(info.product_id))
    }

    pub fn version(&self) -> Option<u16> {
        self.with_info(|info| info.version)
    }

    pub fn transport(&self) -> Option<String> {
        self.with_info(|info| info.transport.clone())
    }

    pub fn location_id(&self) -> Option<u32> {
        self.with_info(|info| info.location_id)
    }

    pub fn report_interval_us(&self) -> Option<u32> {
        self.with_info(|info| info.report_interval_us)
    }

    /// Report descriptor of every virtual port.
    pub fn new_report_descriptor(&self) -> &'static [u8] {
        inject_descriptor()
    }

    /// Accepts an output report from the host.
    ///
    /// `[0x60, intensity]` updates this port's rumble byte. Anything else is
    /// accepted and dropped.
    pub fn set_report(&self, report: &[u8]) -> AdapterResult<()> {
        let shared = self.adapter().ok_or(AdapterError::Detached)?;

        match report {
            [PORT_RUMBLE_REPORT_ID, rest @ ..] => {
                let intensity = rest.first().copied().unwrap_or(0);
                shared.set_rumble(self.cell.index, intensity)
            }
            _ => {
                trace!(port = %self.cell.index, len = report.len(), "ignoring output report");
                Ok(())
            }
        }
    }

    /// Passes a get-report request through to the physical adapter.
    pub fn get_report(&self, kind: ReportKind, buf: &mut [u8]) -> AdapterResult<usize> {
        let shared = self.adapter().ok_or(AdapterError::Detached)?;
        shared.get_report(kind, buf)
    }
}

impl ForceFeedbackTarget for VirtualPort {
    fn class_name(&self) -> &str {
        TARGET_CLASS
    }

    fn open_rumble_link(&self) -> FfbResult<Box<dyn RumbleLink>> {
        if !self.is_attached() {
            return Err(FfbError::NoInterface);
        }
        Ok(Box::new(PortRumbleLink { port: self.clone() }))
    }
}

/// Rumble link writing through [`VirtualPort::set_report`].
struct PortRumbleLink {
    port: VirtualPort,
}

impl RumbleLink for PortRumbleLink {
    fn write_output(&mut self, report: &[u8]) -> FfbResult<()> {
        self.port.set_report(report).map_err(|e| match e {
            AdapterError::Detached => FfbError::NoInterface,
            other => FfbError::Device(other.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orphan(index: u8) -> Result<VirtualPort, String> {
        let index = PortIndex::new(index).ok_or("bad index")?;
        Ok(VirtualPort::new(index, Weak::new()))
    }

    #[test]
    fn test_detached_port_answers_nothing() -> Result<(), String> {
        let port = orphan(1)?;

        assert!(!port.is_attached());
        assert_eq!(port.product(), None);
        assert_eq!(port.manufacturer(), None);
        assert_eq!(port.vendor_id(), None);
        assert_eq!(port.location_id(), None);
        assert_eq!(port.port_property(), 1);
        assert_eq!(port.property("Port"), Some(1));
        assert_eq!(port.property("Product"), None);
        assert!(matches!(port.set_report(&[0x60, 1]), Err(AdapterError::Detached)));

        let mut buf = [0u8; 4];
        assert!(matches!(
            port.get_report(ReportKind::Input, &mut buf),
            Err(AdapterError::Detached)
        ));
        Ok(())
    }

    #[test]
    fn test_descriptor_is_shared() -> Result<(), String> {
        let a = orphan(0)?;
        let b = orphan(3)?;
        assert_eq!(a.new_report_descriptor(), b.new_report_descriptor());
        assert_eq!(a.new_report_descriptor().first(), Some(&0x05));
        Ok(())
    }

    #[test]
    fn test_clone_is_same_port() -> Result<(), String> {
        let a = orphan(2)?;
        let b = a.clone();
        assert!(a.same_port(&b));
        assert!(!a.same_port(&orphan(2)?));
        Ok(())
    }

    #[test]
    fn test_detached_port_refuses_rumble_link() -> Result<(), String> {
        let port = orphan(0)?;
        assert_eq!(port.class_name(), "GCAdapterPort");
        assert!(matches!(port.open_rumble_link(), Err(FfbError::NoInterface)));
        Ok(())
    }
}
