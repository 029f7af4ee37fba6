//! Identity of the physical adapter.
//!
//! Virtual ports do not have USB descriptors of their own; every identity
//! query they answer is forwarded to the adapter's [`HidDeviceInfo`].

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HidDeviceInfo {
    pub vendor_id: u16,
    pub product_id: u16,
    pub version: Option<u16>,
    pub serial_number: Option<String>,
    pub manufacturer: Option<String>,
    pub product_name: Option<String>,
    /// Bus hint such as `"USB"`.
    pub transport: Option<String>,
    /// Topology-derived location id; opaque, stable for one physical port.
    pub location_id: Option<u32>,
    /// Input report interval in microseconds.
    pub report_interval_us: Option<u32>,
    pub path: String,
}

impl HidDeviceInfo {
    pub fn new(vendor_id: u16, product_id: u16, path: String) -> Self {
        Self {
            vendor_id,
            product_id,
            version: None,
            serial_number: None,
            manufacturer: None,
            product_name: None,
            transport: None,
            location_id: None,
            report_interval_us: None,
            path,
        }
    }

    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.serial_number = Some(serial.into());
        self
    }

    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    pub fn with_product_name(mut self, name: impl Into<String>) -> Self {
        self.product_name = Some(name.into());
        self
    }

    pub fn with_version(mut self, version: u16) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_transport(mut self, transport: impl Into<String>) -> Self {
        self.transport = Some(transport.into());
        self
    }

    pub fn with_location_id(mut self, location_id: u32) -> Self {
        self.location_id = Some(location_id);
        self
    }

    pub fn with_report_interval_us(mut self, interval_us: u32) -> Self {
        self.report_interval_us = Some(interval_us);
        self
    }

    pub fn matches(&self, vendor_id: u16, product_id: u16) -> bool {
        self.vendor_id == vendor_id && self.product_id == product_id
    }

    pub fn is_wup028(&self) -> bool {
        gcadapter_hid_wup028_protocol::is_wup028(self.vendor_id, self.product_id)
    }

    pub fn display_name(&self) -> String {
        self.product_name
            .clone()
            .or_else(|| self.manufacturer.clone())
            .unwrap_or_else(|| format!("{:04x}:{:04x}", self.vendor_id, self.product_id))
    }
}

impl Default for HidDeviceInfo {
    fn default() -> Self {
        Self::new(0, 0, String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_info_creation() {
        let info = HidDeviceInfo::new(0x057E, 0x0337, "/dev/hidraw0".to_string());
        assert_eq!(info.vendor_id, 0x057E);
        assert_eq!(info.product_id, 0x0337);
        assert!(info.matches(0x057E, 0x0337));
        assert!(info.is_wup028());
        assert!(!info.matches(0x057E, 0x9999));
    }

    #[test]
    fn test_display_name_fallbacks() {
        let info = HidDeviceInfo::new(0x057E, 0x0337, String::new());
        assert_eq!(info.display_name(), "057e:0337");

        let info = info.with_manufacturer("Nintendo");
        assert_eq!(info.display_name(), "Nintendo");

        let info = info.with_product_name("WUP-028");
        assert_eq!(info.display_name(), "WUP-028");
    }

    #[test]
    fn test_serde_roundtrip_keeps_optional_fields() -> Result<(), serde_json::Error> {
        let info = HidDeviceInfo::new(0x057E, 0x0337, "usb-1".to_string())
            .with_location_id(0x1410_0000)
            .with_transport("USB");
        let json = serde_json::to_string(&info)?;
        let back: HidDeviceInfo = serde_json::from_str(&json)?;
        assert_eq!(back, info);
        Ok(())
    }
}
