//! Physical device traits

use crate::{HidCommonResult, HidDeviceInfo};

/// HID report category for get-report requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Input,
    Output,
    Feature,
}

/// The single physical HID endpoint behind the adapter.
///
/// Only one writer may hold this at a time; callers that share it between
/// the report path and the rumble path wrap it in a mutex.
pub trait PhysicalDevice: Send {
    /// Send an output report. `data[0]` is the report id.
    fn write_output_report(&mut self, data: &[u8]) -> HidCommonResult<usize>;

    /// Read one input report into `buf`, waiting at most `timeout_ms`
    /// (`-1` blocks). Returns `Ok(0)` on timeout.
    fn read_report(&mut self, buf: &mut [u8], timeout_ms: i32) -> HidCommonResult<usize>;

    /// Fetch a report on request. `buf[0]` selects the report id.
    fn get_report(&mut self, kind: ReportKind, buf: &mut [u8]) -> HidCommonResult<usize>;

    fn info(&self) -> &HidDeviceInfo;
}

impl<D: PhysicalDevice + ?Sized> PhysicalDevice for Box<D> {
    fn write_output_report(&mut self, data: &[u8]) -> HidCommonResult<usize> {
        (**self).write_output_report(data)
    }

    fn read_report(&mut self, buf: &mut [u8], timeout_ms: i32) -> HidCommonResult<usize> {
        (**self).read_report(buf, timeout_ms)
    }

    fn get_report(&mut self, kind: ReportKind, buf: &mut [u8]) -> HidCommonResult<usize> {
        (**self).get_report(kind, buf)
    }

    fn info(&self) -> &HidDeviceInfo {
        (**self).info()
    }
}

pub mod mock {
    use super::*;
    use crate::HidCommonError;
    use gcadapter_hid_wup028_protocol::{PRODUCT_ID, VENDOR_ID};
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::Arc;

    /// In-memory adapter. Clones share all state, so a test can keep one
    /// handle while the engine owns another.
    #[derive(Clone)]
    pub struct MockPhysicalDevice {
        info: HidDeviceInfo,
        read_queue: Arc<Mutex<VecDeque<Vec<u8>>>>,
        write_history: Arc<Mutex<Vec<Vec<u8>>>>,
        get_reports: Arc<Mutex<Vec<(ReportKind, u8)>>>,
        connected: Arc<Mutex<bool>>,
        fail_writes: Arc<Mutex<bool>>,
    }

    impl MockPhysicalDevice {
        pub fn new(vendor_id: u16, product_id: u16, path: impl Into<String>) -> Self {
            Self {
                info: HidDeviceInfo::new(vendor_id, product_id, path.into()),
                read_queue: Arc::new(Mutex::new(VecDeque::new())),
                write_history: Arc::new(Mutex::new(Vec::new())),
                get_reports: Arc::new(Mutex::new(Vec::new())),
                connected: Arc::new(Mutex::new(true)),
                fail_writes: Arc::new(Mutex::new(false)),
            }
        }

        /// A WUP-028 with the identity strings the real adapter reports.
        pub fn wup028() -> Self {
            let mut device = Self::new(VENDOR_ID, PRODUCT_ID, "mock://wup028");
            device.info = device
                .info
                .with_manufacturer("Nintendo")
                .with_product_name("WUP-028")
                .with_version(0x0100)
                .with_transport("USB")
                .with_location_id(0x1410_0000)
                .with_report_interval_us(8000);
            device
        }

        pub fn queue_read(&self, data: Vec<u8>) {
            self.read_queue.lock().push_back(data);
        }

        pub fn write_history(&self) -> Vec<Vec<u8>> {
            self.write_history.lock().clone()
        }

        pub fn last_write(&self) -> Option<Vec<u8>> {
            self.write_history.lock().last().cloned()
        }

        pub fn clear_writes(&self) {
            self.write_history.lock().clear();
        }

        /// `(kind, report id)` of every get-report request seen.
        pub fn get_report_requests(&self) -> Vec<(ReportKind, u8)> {
            self.get_reports.lock().clone()
        }

        /// Make every following write fail until cleared.
        pub fn set_fail_writes(&self, fail: bool) {
            *self.fail_writes.lock() = fail;
        }

        pub fn disconnect(&self) {
            *self.connected.lock() = false;
        }

        pub fn reconnect(&self) {
            *self.connected.lock() = true;
        }

        pub fn is_connected(&self) -> bool {
            *self.connected.lock()
        }
    }

    impl PhysicalDevice for MockPhysicalDevice {
        fn write_output_report(&mut self, data: &[u8]) -> HidCommonResult<usize> {
            if !self.is_connected() {
                return Err(HidCommonError::Disconnected);
            }
            if *self.fail_writes.lock() {
                return Err(HidCommonError::WriteError("mock write failure".to_string()));
            }

            self.write_history.lock().push(data.to_vec());
            Ok(data.len())
        }

        fn read_report(&mut self, buf: &mut [u8], _timeout_ms: i32) -> HidCommonResult<usize> {
            if !self.is_connected() {
                return Err(HidCommonError::Disconnected);
            }

            match self.read_queue.lock().pop_front() {
                Some(report) => {
                    let n = report.len().min(buf.len());
                    buf.iter_mut().zip(&report).for_each(|(dst, src)| *dst = *src);
                    Ok(n)
                }
                None => Ok(0),
            }
        }

        fn get_report(&mut self, kind: ReportKind, buf: &mut [u8]) -> HidCommonResult<usize> {
            if !self.is_connected() {
                return Err(HidCommonError::Disconnected);
            }
            let id = buf.first().copied().ok_or_else(|| {
                HidCommonError::InvalidReport("empty get-report buffer".to_string())
            })?;
            self.get_reports.lock().push((kind, id));
            Ok(buf.len())
        }

        fn info(&self) -> &HidDeviceInfo {
            &self.info
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockPhysicalDevice;
    use super::*;
    use crate::HidCommonError;

    #[test]
    fn test_mock_device_basic() {
        let device = MockPhysicalDevice::wup028();

        assert_eq!(device.info().vendor_id, 0x057E);
        assert_eq!(device.info().product_id, 0x0337);
        assert!(device.info().is_wup028());
        assert!(device.is_connected());
    }

    #[test]
    fn test_mock_device_write() -> HidCommonResult<()> {
        let mut device = MockPhysicalDevice::wup028();
        let observer = device.clone();

        assert_eq!(device.write_output_report(&[0x13])?, 1);

        assert_eq!(observer.write_history(), vec![vec![0x13]]);
        Ok(())
    }

    #[test]
    fn test_mock_device_read_timeout_is_zero() -> HidCommonResult<()> {
        let mut device = MockPhysicalDevice::wup028();
        let mut buf = [0u8; 37];
        assert_eq!(device.read_report(&mut buf, 10)?, 0);

        device.queue_read(vec![0x21, 0x10]);
        assert_eq!(device.read_report(&mut buf, 10)?, 2);
        assert_eq!(&buf[..2], &[0x21, 0x10]);
        Ok(())
    }

    #[test]
    fn test_mock_device_failures() {
        let mut device = MockPhysicalDevice::wup028();

        device.set_fail_writes(true);
        assert!(matches!(
            device.write_output_report(&[0x11]),
            Err(HidCommonError::WriteError(_))
        ));

        device.set_fail_writes(false);
        device.disconnect();
        assert!(matches!(
            device.write_output_report(&[0x11]),
            Err(HidCommonError::Disconnected)
        ));
        assert!(device.write_history().is_empty());
    }

    #[test]
    fn test_boxed_device_forwards() -> HidCommonResult<()> {
        let observer = MockPhysicalDevice::wup028();
        let mut boxed: Box<dyn PhysicalDevice> = Box::new(observer.clone());
        boxed.write_output_report(&[0x11, 0, 0, 0, 0, 0])?;
        let mut buf = [0x30u8; 4];
        boxed.get_report(ReportKind::Feature, &mut buf)?;
        assert_eq!(observer.write_history().len(), 1);
        assert_eq!(observer.get_report_requests(), vec![(ReportKind::Feature, 0x30)]);
        Ok(())
    }
}
