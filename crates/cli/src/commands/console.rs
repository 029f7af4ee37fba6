//! Port host that prints to a terminal.
//!
//! Ports are announced on register and terminate. Controller state is
//! decoded from the raw pass-through report and printed whenever it
//! changes.

use std::io::Write;

use gcadapter_engine::{HostError, PortHost, VirtualPort};
use gcadapter_hid_wup028_protocol::{
    GcControllerState, PORT_COUNT, PortIndex, VirtualReport, decode_multiplexed,
};
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::output;

pub struct ConsoleHost {
    json: bool,
    show_state: bool,
    out: Box<dyn Write + Send>,
    last: [Option<GcControllerState>; PORT_COUNT],
    delivered: u64,
}

impl ConsoleHost {
    pub fn new(json: bool, out: Box<dyn Write + Send>) -> Self {
        Self {
            json,
            show_state: true,
            out,
            last: [None; PORT_COUNT],
            delivered: 0,
        }
    }

    pub fn stdout(json: bool) -> Self {
        Self::new(json, Box::new(std::io::stdout()))
    }

    /// Only announce connects and disconnects.
    pub fn quiet(mut self) -> Self {
        self.show_state = false;
        self
    }

    /// Reports delivered to live ports so far.
    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    fn emit(&mut self, line: String, value: Value) {
        let result = if self.json {
            writeln!(self.out, "{}", value)
        } else {
            writeln!(self.out, "{}", line)
        };
        if let Err(e) = result {
            warn!("Failed to write monitor output: {}", e);
        }
    }
}

impl PortHost for ConsoleHost {
    fn attach(&mut self, port: &VirtualPort) -> Result<(), HostError> {
        debug!(port = %port.index(), "attach");
        Ok(())
    }

    fn start(&mut self, port: &VirtualPort) -> Result<(), HostError> {
        debug!(port = %port.index(), "start");
        Ok(())
    }

    fn register(&mut self, port: &VirtualPort) {
        let index = port.index();
        self.emit(
            output::port_event_line(index, true),
            output::port_event_json(index, true),
        );
    }

    fn detach(&mut self, port: &VirtualPort) {
        debug!(port = %port.index(), "detach");
    }

    fn terminate(&mut self, port: &VirtualPort) {
        let index = port.index();
        if let Some(last) = self.last.get_mut(index.as_usize()) {
            *last = None;
        }
        self.emit(
            output::port_event_line(index, false),
            output::port_event_json(index, false),
        );
    }

    fn handle_report(
        &mut self,
        port: &VirtualPort,
        timestamp: u64,
        report: &VirtualReport,
    ) -> Result<(), HostError> {
        trace!(port = %port.index(), timestamp, bytes = ?report.as_bytes(), "report");
        self.delivered += 1;
        Ok(())
    }

    fn default_report(&mut self, timestamp: u64, report: &[u8]) {
        if !self.show_state {
            return;
        }
        let Some(subs) = decode_multiplexed(report) else {
            return;
        };

        for (index, sub) in PortIndex::ALL.into_iter().zip(subs.iter()) {
            if !sub.is_connected() {
                continue;
            }
            let state = GcControllerState::from_sub_report(sub);
            let Some(slot) = self.last.get_mut(index.as_usize()) else {
                continue;
            };
            if *slot == Some(state) {
                continue;
            }
            *slot = Some(state);
            self.emit(
                output::state_line(index, &state),
                output::state_json(index, timestamp, &state),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcadapter_engine::Adapter;
    use gcadapter_hid_wup028_protocol::GcButtons;
    use gcadapter_test_helpers::prelude::*;
    use sink::SharedBuf;

    mod sink {
        use std::io::Write;
        use std::sync::{Arc, Mutex};

        #[derive(Clone, Default)]
        pub struct SharedBuf(pub Arc<Mutex<Vec<u8>>>);

        impl SharedBuf {
            pub fn lines(&self) -> Vec<String> {
                let bytes = self.0.lock().map(|b| b.clone()).unwrap_or_default();
                String::from_utf8_lossy(&bytes)
                    .lines()
                    .map(str::to_string)
                    .collect()
            }
        }

        impl Write for SharedBuf {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                match self.0.lock() {
                    Ok(mut inner) => inner.write(buf),
                    Err(_) => Err(std::io::Error::other("poisoned")),
                }
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }
    }

    fn console_adapter(json: bool) -> (Adapter<ConsoleHost>, MockPhysicalDevice, SharedBuf) {
        let buf = SharedBuf::default();
        let device = MockPhysicalDevice::wup028();
        let host = ConsoleHost::new(json, Box::new(buf.clone()));
        (Adapter::new(device.clone(), host), device, buf)
    }

    #[test]
    fn prints_connect_state_and_disconnect() -> TestResult {
        let (mut adapter, _device, buf) = console_adapter(false);
        adapter.start()?;

        let connected = MuxReportBuilder::new()
            .port(1, ControllerFrame::wired().with_buttons(GcButtons::A))
            .build();
        adapter.on_report(10, &connected)?;
        adapter.on_report(20, &connected)?;
        adapter.on_report(30, &MuxReportBuilder::new().build())?;

        let lines = buf.lines();
        assert_eq!(lines.len(), 3, "{lines:?}");
        assert!(lines[0].contains("Port 2 connected"));
        assert!(lines[1].starts_with("[P2]"));
        assert!(lines[1].ends_with('A'));
        assert!(lines[2].contains("Port 2 disconnected"));
        assert_eq!(adapter.host().delivered(), 2);
        Ok(())
    }

    #[test]
    fn json_lines_parse() -> TestResult {
        let (mut adapter, _device, buf) = console_adapter(true);
        adapter.start()?;
        adapter.on_report(
            5,
            &MuxReportBuilder::new()
                .port(0, ControllerFrame::wireless())
                .build(),
        )?;

        let lines = buf.lines();
        assert_eq!(lines.len(), 2);
        let event: Value = serde_json::from_str(&lines[0])?;
        assert_eq!(event["event"], "connected");
        let state: Value = serde_json::from_str(&lines[1])?;
        assert_eq!(state["connection"], "wireless");
        assert_eq!(state["timestamp_us"], 5);
        Ok(())
    }

    #[test]
    fn quiet_host_skips_state() -> TestResult {
        let buf = SharedBuf::default();
        let host = ConsoleHost::new(false, Box::new(buf.clone())).quiet();
        let mut adapter = Adapter::new(MockPhysicalDevice::wup028(), host);
        adapter.start()?;
        adapter.on_report(
            0,
            &MuxReportBuilder::new()
                .port(3, ControllerFrame::wired())
                .build(),
        )?;
        assert_eq!(buf.lines().len(), 1);
        Ok(())
    }
}
