//! Multiplexed input report decoding (report ID 0x21, 37 bytes).
//!
//! # Report layout
//! | Offset | Size | Field                                   |
//! |--------|------|-----------------------------------------|
//! | 0      | 1    | report id, always `0x21`                |
//! | 1      | 9    | port 0 sub-report                       |
//! | 10     | 9    | port 1 sub-report                       |
//! | 19     | 9    | port 2 sub-report                       |
//! | 28     | 9    | port 3 sub-report                       |
//!
//! # Sub-report layout
//! | Offset | Field                                                 |
//! |--------|-------------------------------------------------------|
//! | 0      | connection flag, non-zero while a controller is seen  |
//! | 1–2    | 16-bit button field, low byte first                   |
//! | 3–6    | stick X, stick Y, C-stick X, C-stick Y                |
//! | 7–8    | left / right analog trigger (observed `0x18..=0xF0`)  |

use crate::types::PORT_COUNT;

/// Report id of the multiplexed adapter input report.
pub const MUX_REPORT_ID: u8 = 0x21;

/// Exact length of the multiplexed input report, id byte included.
pub const MUX_REPORT_LEN: usize = 1 + PORT_COUNT * SUB_REPORT_LEN;

/// Length of one port's slice of the multiplexed report.
pub const SUB_REPORT_LEN: usize = 9;

/// Report id of the synthetic per-port input report.
pub const VIRTUAL_REPORT_ID: u8 = 0x50;

/// Length of the synthetic per-port input report, id byte included.
pub const VIRTUAL_REPORT_LEN: usize = 9;

/// Per-axis centre bias for X, Y, C-X and C-Y.
///
/// Measured on first-party controllers; third-party sticks may sit elsewhere.
pub const AXIS_BIAS: [u8; 4] = [122, 144, 133, 133];

const AXIS_OFFSET: usize = 3;

/// One port's 9-byte slice of the multiplexed report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubReport(pub [u8; SUB_REPORT_LEN]);

impl SubReport {
    pub fn connection_flag(&self) -> u8 {
        let [flag, ..] = self.0;
        flag
    }

    /// `true` when a controller answered on this port during the cycle.
    pub fn is_connected(&self) -> bool {
        self.connection_flag() != 0
    }

    /// Button field, bit 0 = byte 1 bit 0.
    pub fn buttons(&self) -> u16 {
        let [_, lo, hi, ..] = self.0;
        u16::from_le_bytes([lo, hi])
    }

    /// Raw stick bytes in X, Y, C-X, C-Y order.
    pub fn axes(&self) -> [u8; 4] {
        let [_, _, _, x, y, c_x, c_y, _, _] = self.0;
        [x, y, c_x, c_y]
    }

    /// Left and right trigger bytes.
    pub fn triggers(&self) -> [u8; 2] {
        let [.., left, right] = self.0;
        [left, right]
    }

    /// Everything after the connection flag.
    pub fn payload(&self) -> [u8; SUB_REPORT_LEN - 1] {
        let [_, payload @ ..] = self.0;
        payload
    }
}

/// Split a multiplexed report into its four sub-reports.
///
/// Returns `None` unless the slice is exactly [`MUX_REPORT_LEN`] bytes long and
/// starts with [`MUX_REPORT_ID`]. Anything else is not controller data and is
/// left for the default report path.
pub fn decode_multiplexed(raw: &[u8]) -> Option<[SubReport; PORT_COUNT]> {
    if raw.len() != MUX_REPORT_LEN || raw.first() != Some(&MUX_REPORT_ID) {
        return None;
    }

    let body = raw.get(1..)?;
    let mut subs = [SubReport::default(); PORT_COUNT];
    for (sub, window) in subs.iter_mut().zip(body.chunks_exact(SUB_REPORT_LEN)) {
        sub.0.copy_from_slice(window);
    }
    Some(subs)
}

/// Re-centre the four stick axes around zero.
///
/// Each byte is read as a signed value, the axis bias is subtracted and the
/// result is stored back as an unsigned byte. The subtraction wraps; modulo
/// 256 the signed and unsigned readings agree, so a wrapping `u8` subtraction
/// produces the same bytes.
pub fn rescale_axes(sub: SubReport) -> SubReport {
    let mut out = sub;
    for (byte, bias) in out.0.iter_mut().skip(AXIS_OFFSET).zip(AXIS_BIAS) {
        *byte = byte.wrapping_sub(bias);
    }
    out
}

/// Inverse of [`rescale_axes`].
pub fn restore_axes(sub: SubReport) -> SubReport {
    let mut out = sub;
    for (byte, bias) in out.0.iter_mut().skip(AXIS_OFFSET).zip(AXIS_BIAS) {
        *byte = byte.wrapping_add(bias);
    }
    out
}

/// Per-port input report as delivered to a virtual controller.
///
/// Byte 0 is always [`VIRTUAL_REPORT_ID`]; bytes 1–8 are the sub-report
/// payload with the connection flag stripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualReport([u8; VIRTUAL_REPORT_LEN]);

impl VirtualReport {
    /// Empty report with only the id byte set.
    pub const fn new() -> Self {
        Self([VIRTUAL_REPORT_ID, 0, 0, 0, 0, 0, 0, 0, 0])
    }

    /// Overwrite the payload in place, leaving the id byte untouched.
    pub fn write_payload(&mut self, sub: &SubReport) {
        let [_, payload @ ..] = &mut self.0;
        *payload = sub.payload();
    }

    pub fn as_bytes(&self) -> &[u8; VIRTUAL_REPORT_LEN] {
        &self.0
    }

    pub fn report_id(&self) -> u8 {
        let [id, ..] = self.0;
        id
    }
}

impl Default for VirtualReport {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<[u8]> for VirtualReport {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Build the virtual report for an already re-centred sub-report.
pub fn build_virtual_report(sub: &SubReport) -> VirtualReport {
    let mut report = VirtualReport::new();
    report.write_payload(sub);
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mux_with(port: usize, sub: [u8; SUB_REPORT_LEN]) -> [u8; MUX_REPORT_LEN] {
        let mut raw = [0u8; MUX_REPORT_LEN];
        raw[0] = MUX_REPORT_ID;
        let start = 1 + port * SUB_REPORT_LEN;
        raw[start..start + SUB_REPORT_LEN].copy_from_slice(&sub);
        raw
    }

    #[test]
    fn decode_rejects_wrong_id() {
        let mut raw = [0u8; MUX_REPORT_LEN];
        raw[0] = 0x22;
        assert!(decode_multiplexed(&raw).is_none());
    }

    #[test]
    fn decode_rejects_wrong_length() {
        let mut raw = vec![0u8; MUX_REPORT_LEN + 1];
        raw[0] = MUX_REPORT_ID;
        assert!(decode_multiplexed(&raw).is_none());
        assert!(decode_multiplexed(&raw[..MUX_REPORT_LEN - 1]).is_none());
        assert!(decode_multiplexed(&[]).is_none());
    }

    #[test]
    fn decode_splits_at_fixed_offsets() {
        let sub = [0x10, 0x01, 0x02, 0x80, 0x81, 0x82, 0x83, 0x20, 0xE0];
        let raw = mux_with(2, sub);
        let subs = decode_multiplexed(&raw).expect("recognised report");
        assert_eq!(subs[2].0, sub);
        assert!(!subs[0].is_connected());
        assert!(!subs[1].is_connected());
        assert!(subs[2].is_connected());
        assert!(!subs[3].is_connected());
        assert_eq!(subs[2].buttons(), 0x0201);
        assert_eq!(subs[2].triggers(), [0x20, 0xE0]);
        assert_eq!(subs[2].axes(), [0x80, 0x81, 0x82, 0x83]);
        assert_eq!(
            subs[2].payload(),
            [0x01, 0x02, 0x80, 0x81, 0x82, 0x83, 0x20, 0xE0]
        );
    }

    #[test]
    fn rescale_known_bytes() {
        let sub = SubReport([0x10, 0, 0, 0x80, 144, 133, 0, 0x18, 0xF0]);
        let out = rescale_axes(sub);
        // 0x80 is -128; -128 - 122 = -250 = 0x06 modulo 256.
        assert_eq!(out.axes(), [0x06, 0x00, 0x00, 0x7B]);
        assert_eq!(out.triggers(), [0x18, 0xF0]);
        assert_eq!(out.connection_flag(), 0x10);
    }

    #[test]
    fn rescale_centres_resting_sticks() {
        let sub = SubReport([0x10, 0, 0, 122, 144, 133, 133, 0, 0]);
        assert_eq!(rescale_axes(sub).axes(), [0, 0, 0, 0]);
    }

    #[test]
    fn virtual_report_strips_connection_flag() {
        let sub = SubReport([0x14, 1, 2, 3, 4, 5, 6, 7, 8]);
        let report = build_virtual_report(&sub);
        assert_eq!(report.as_bytes(), &[VIRTUAL_REPORT_ID, 1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn write_payload_keeps_id() {
        let mut report = VirtualReport::new();
        report.write_payload(&SubReport([0xFF; SUB_REPORT_LEN]));
        assert_eq!(report.report_id(), VIRTUAL_REPORT_ID);
        assert_eq!(&report.as_bytes()[1..], &[0xFF; 8]);
    }
}
