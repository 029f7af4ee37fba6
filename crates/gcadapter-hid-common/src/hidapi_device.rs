//! `hidapi` backed [`PhysicalDevice`].
//!
//! Report buffers follow hidapi conventions: the first byte is the report id
//! for writes and get-report requests.

use crate::{HidCommonError, HidCommonResult, HidDeviceInfo, PhysicalDevice, ReportKind};
use gcadapter_hid_wup028_protocol::{PRODUCT_ID, VENDOR_ID};
use hidapi::{DeviceInfo, HidApi, HidDevice};
use tracing::debug;

pub struct HidApiDevice {
    device: HidDevice,
    info: HidDeviceInfo,
}

impl HidApiDevice {
    /// Open the first device matching the VID/PID pair.
    pub fn open(api: &HidApi, vendor_id: u16, product_id: u16) -> HidCommonResult<Self> {
        let entry = api
            .device_list()
            .find(|d| d.vendor_id() == vendor_id && d.product_id() == product_id)
            .ok_or_else(|| {
                HidCommonError::DeviceNotFound(format!("{vendor_id:04x}:{product_id:04x}"))
            })?;

        let device = entry
            .open_device(api)
            .map_err(|e| HidCommonError::OpenError(e.to_string()))?;
        let info = device_info_from(entry);

        debug!(
            "Opened HID device {:04x}:{:04x} at {}",
            info.vendor_id, info.product_id, info.path
        );

        Ok(Self { device, info })
    }

    /// Open the first WUP-028 adapter.
    pub fn open_wup028(api: &HidApi) -> HidCommonResult<Self> {
        Self::open(api, VENDOR_ID, PRODUCT_ID)
    }
}

fn device_info_from(entry: &DeviceInfo) -> HidDeviceInfo {
    let mut info = HidDeviceInfo::new(
        entry.vendor_id(),
        entry.product_id(),
        entry.path().to_string_lossy().into_owned(),
    )
    .with_version(entry.release_number())
    .with_transport("USB");

    if let Some(serial) = entry.serial_number() {
        info = info.with_serial(serial);
    }
    if let Some(manufacturer) = entry.manufacturer_string() {
        info = info.with_manufacturer(manufacturer);
    }
    if let Some(product) = entry.product_string() {
        info = info.with_product_name(product);
    }
    info
}

/// Identity of every attached device matching the VID/PID pair.
pub fn list_adapters(api: &HidApi, vendor_id: u16, product_id: u16) -> Vec<HidDeviceInfo> {
    api.device_list()
        .filter(|d| d.vendor_id() == vendor_id && d.product_id() == product_id)
        .map(device_info_from)
        .collect()
}

impl PhysicalDevice for HidApiDevice {
    fn write_output_report(&mut self, data: &[u8]) -> HidCommonResult<usize> {
        self.device
            .write(data)
            .map_err(|e| HidCommonError::WriteError(e.to_string()))
    }

    fn read_report(&mut self, buf: &mut [u8], timeout_ms: i32) -> HidCommonResult<usize> {
        self.device
            .read_timeout(buf, timeout_ms)
            .map_err(|e| HidCommonError::ReadError(e.to_string()))
    }

    fn get_report(&mut self, kind: ReportKind, buf: &mut [u8]) -> HidCommonResult<usize> {
        match kind {
            ReportKind::Input => self
                .device
                .get_input_report(buf)
                .map_err(|e| HidCommonError::ReadError(e.to_string())),
            ReportKind::Feature => self
                .device
                .get_feature_report(buf)
                .map_err(|e| HidCommonError::ReadError(e.to_string())),
            ReportKind::Output => Err(HidCommonError::InvalidReport(
                "output reports cannot be requested".to_string(),
            )),
        }
    }

    fn info(&self) -> &HidDeviceInfo {
        &self.info
    }
}
