//! Builders for adapter input reports.
//!
//! Stick values are given re-centred (what a virtual port finally sees); the
//! builder adds the axis bias back so the raw report looks like real adapter
//! output.

use gcadapter_hid_wup028_protocol::{
    MUX_REPORT_ID, MUX_REPORT_LEN, PORT_COUNT, SUB_REPORT_LEN, SubReport, VIRTUAL_REPORT_ID,
    restore_axes,
};

/// One controller's state as a test wants to describe it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerFrame {
    pub flag: u8,
    pub buttons: u16,
    pub stick: (i8, i8),
    pub c_stick: (i8, i8),
    pub triggers: (u8, u8),
}

impl Default for ControllerFrame {
    fn default() -> Self {
        Self::wired()
    }
}

impl ControllerFrame {
    /// Wired controller at rest.
    pub fn wired() -> Self {
        Self {
            flag: 0x14,
            buttons: 0,
            stick: (0, 0),
            c_stick: (0, 0),
            triggers: (0x20, 0x20),
        }
    }

    /// WaveBird at rest.
    pub fn wireless() -> Self {
        Self {
            flag: 0x22,
            ..Self::wired()
        }
    }

    pub fn with_buttons(mut self, buttons: u16) -> Self {
        self.buttons = buttons;
        self
    }

    pub fn with_stick(mut self, x: i8, y: i8) -> Self {
        self.stick = (x, y);
        self
    }

    pub fn with_c_stick(mut self, x: i8, y: i8) -> Self {
        self.c_stick = (x, y);
        self
    }

    pub fn with_triggers(mut self, left: u8, right: u8) -> Self {
        self.triggers = (left, right);
        self
    }

    /// Stick bytes as a port sees them, X, Y, C-X, C-Y.
    fn centred_axes(&self) -> [u8; 4] {
        [self.stick.0, self.stick.1, self.c_stick.0, self.c_stick.1]
            .map(|v| u8::from_ne_bytes(v.to_ne_bytes()))
    }

    /// Raw sub-report, axis bias included.
    pub fn to_sub_report(&self) -> SubReport {
        let [lo, hi] = self.buttons.to_le_bytes();
        let [x, y, c_x, c_y] = self.centred_axes();
        let (left, right) = self.triggers;
        restore_axes(SubReport([self.flag, lo, hi, x, y, c_x, c_y, left, right]))
    }

    /// The 9-byte virtual report a port should receive for this frame.
    pub fn expected_virtual_report(&self) -> [u8; SUB_REPORT_LEN] {
        let [lo, hi] = self.buttons.to_le_bytes();
        let [x, y, c_x, c_y] = self.centred_axes();
        let (left, right) = self.triggers;
        [VIRTUAL_REPORT_ID, lo, hi, x, y, c_x, c_y, left, right]
    }
}

/// Builds 37-byte multiplexed reports.
#[derive(Debug, Clone, Default)]
pub struct MuxReportBuilder {
    report_id: Option<u8>,
    ports: [Option<ControllerFrame>; PORT_COUNT],
}

impl MuxReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts `frame` on port `index`. Out-of-range indices are ignored.
    pub fn port(mut self, index: usize, frame: ControllerFrame) -> Self {
        if let Some(slot) = self.ports.get_mut(index) {
            *slot = Some(frame);
        }
        self
    }

    /// Connects a resting wired controller to each listed port.
    pub fn connected(mut self, indices: &[usize]) -> Self {
        for &index in indices {
            self = self.port(index, ControllerFrame::wired());
        }
        self
    }

    /// Overrides the report id, for reports the adapter must ignore.
    pub fn report_id(mut self, id: u8) -> Self {
        self.report_id = Some(id);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut raw = Vec::with_capacity(MUX_REPORT_LEN);
        raw.push(self.report_id.unwrap_or(MUX_REPORT_ID));
        for frame in &self.ports {
            let sub = frame.map_or([0u8; SUB_REPORT_LEN], |f| f.to_sub_report().0);
            raw.extend_from_slice(&sub);
        }
        raw
    }
}
