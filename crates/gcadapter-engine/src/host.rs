//! Host framework boundary
//!
//! The adapter never decides how a virtual port is surfaced to the operating
//! system. It calls into a [`PortHost`] for each lifecycle step and for every
//! report it produces.

use gcadapter_hid_wup028_protocol::VirtualReport;

use crate::error::HostError;
use crate::port::VirtualPort;

/// Lifecycle and delivery hooks for virtual ports.
///
/// Creation runs `attach`, `start`, then `register`. A failed `start` is
/// followed by `detach`. A port that made it through `register` ends with
/// exactly one `terminate`.
pub trait PortHost: Send {
    fn attach(&mut self, port: &VirtualPort) -> Result<(), HostError>;

    fn start(&mut self, port: &VirtualPort) -> Result<(), HostError>;

    /// Publishes the port. Completion is not awaited.
    fn register(&mut self, port: &VirtualPort);

    fn detach(&mut self, port: &VirtualPort);

    fn terminate(&mut self, port: &VirtualPort);

    /// Delivers one input report to one port.
    fn handle_report(
        &mut self,
        port: &VirtualPort,
        timestamp: u64,
        report: &VirtualReport,
    ) -> Result<(), HostError>;

    /// Pass-through of every raw report the adapter received.
    fn default_report(&mut self, timestamp: u64, report: &[u8]);
}

impl<H: PortHost + ?Sized> PortHost for Box<H> {
    fn attach(&mut self, port: &VirtualPort) -> Result<(), HostError> {
        (**self).attach(port)
    }

    fn start(&mut self, port: &VirtualPort) -> Result<(), HostError> {
        (**self).start(port)
    }

    fn register(&mut self, port: &VirtualPort) {
        (**self).register(port)
    }

    fn detach(&mut self, port: &VirtualPort) {
        (**self).detach(port)
    }

    fn terminate(&mut self, port: &VirtualPort) {
        (**self).terminate(port)
    }

    fn handle_report(
        &mut self,
        port: &VirtualPort,
        timestamp: u64,
        report: &VirtualReport,
    ) -> Result<(), HostError> {
        (**self).handle_report(port, timestamp, report)
    }

    fn default_report(&mut self, timestamp: u64, report: &[u8]) {
        (**self).default_report(timestamp, report)
    }
}

pub mod mock {
    use super::*;
    use gcadapter_hid_wup028_protocol::{PortIndex, VIRTUAL_REPORT_LEN};
    use parking_lot::Mutex;
    use std::collections::HashSet;
    use std::sync::Arc;

    /// Everything a [`MockHost`] was asked to do, in order.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum HostEvent {
        Attach(PortIndex),
        Start(PortIndex),
        Register(PortIndex),
        Detach(PortIndex),
        Terminate(PortIndex),
        Report {
            port: PortIndex,
            timestamp: u64,
            bytes: [u8; VIRTUAL_REPORT_LEN],
        },
        Default {
            timestamp: u64,
            bytes: Vec<u8>,
        },
    }

    #[derive(Debug, Default)]
    struct HostLog {
        events: Vec<HostEvent>,
        registered: Vec<VirtualPort>,
        fail_attach: HashSet<PortIndex>,
        fail_start: HashSet<PortIndex>,
        fail_delivery: HashSet<PortIndex>,
    }

    /// Recording host with injectable failures. Clones share the log.
    #[derive(Debug, Clone, Default)]
    pub struct MockHost {
        log: Arc<Mutex<HostLog>>,
    }

    impl MockHost {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn events(&self) -> Vec<HostEvent> {
            self.log.lock().events.clone()
        }

        pub fn clear_events(&self) {
            self.log.lock().events.clear();
        }

        /// Ports that were registered and not yet terminated.
        pub fn live_ports(&self) -> Vec<VirtualPort> {
            self.log.lock().registered.clone()
        }

        pub fn count(&self, wanted: &HostEvent) -> usize {
            self.log.lock().events.iter().filter(|e| *e == wanted).count()
        }

        pub fn reports_for(&self, port: PortIndex) -> Vec<[u8; VIRTUAL_REPORT_LEN]> {
            self.log
                .lock()
                .events
                .iter()
                .filter_map(|e| match e {
                    HostEvent::Report { port: p, bytes, .. } if *p == port => Some(*bytes),
                    _ => None,
                })
                .collect()
        }

        pub fn default_reports(&self) -> Vec<Vec<u8>> {
            self.log
                .lock()
                .events
                .iter()
                .filter_map(|e| match e {
                    HostEvent::Default { bytes, .. } => Some(bytes.clone()),
                    _ => None,
                })
                .collect()
        }

        pub fn fail_attach(&self, port: PortIndex, fail: bool) {
            toggle(&mut self.log.lock().fail_attach, port, fail);
        }

        pub fn fail_start(&self, port: PortIndex, fail: bool) {
            toggle(&mut self.log.lock().fail_start, port, fail);
        }

        pub fn fail_delivery(&self, port: PortIndex, fail: bool) {
            toggle(&mut self.log.lock().fail_delivery, port, fail);
        }
    }

    fn toggle(set: &mut HashSet<PortIndex>, port: PortIndex, on: bool) {
        if on {
            set.insert(port);
        } else {
            set.remove(&port);
        }
    }

    impl PortHost for MockHost {
        fn attach(&mut self, port: &VirtualPort) -> Result<(), HostError> {
            let mut log = self.log.lock();
            log.events.push(HostEvent::Attach(port.index()));
            if log.fail_attach.contains(&port.index()) {
                return Err(HostError::AttachFailed(port.index()));
            }
            Ok(())
        }

        fn start(&mut self, port: &VirtualPort) -> Result<(), HostError> {
            let mut log = self.log.lock();
            log.events.push(HostEvent::Start(port.index()));
            if log.fail_start.contains(&port.index()) {
                return Err(HostError::StartFailed(port.index()));
            }
            Ok(())
        }

        fn register(&mut self, port: &VirtualPort) {
            let mut log = self.log.lock();
            log.events.push(HostEvent::Register(port.index()));
            log.registered.push(port.clone());
        }

        fn detach(&mut self, port: &VirtualPort) {
            self.log.lock().events.push(HostEvent::Detach(port.index()));
        }

        fn terminate(&mut self, port: &VirtualPort) {
            let mut log = self.log.lock();
            log.events.push(HostEvent::Terminate(port.index()));
            log.registered.retain(|p| p.index() != port.index());
        }

        fn handle_report(
            &mut self,
            port: &VirtualPort,
            timestamp: u64,
            report: &VirtualReport,
        ) -> Result<(), HostError> {
            let mut log = self.log.lock();
            if log.fail_delivery.contains(&port.index()) {
                return Err(HostError::DeliveryFailed {
                    port: port.index(),
                    reason: "mock delivery failure".to_string(),
                });
            }
            log.events.push(HostEvent::Report {
                port: port.index(),
                timestamp,
                bytes: *report.as_bytes(),
            });
            Ok(())
        }

        fn default_report(&mut self, timestamp: u64, report: &[u8]) {
            self.log.lock().events.push(HostEvent::Default {
                timestamp,
                bytes: report.to_vec(),
            });
        }
    }
}
