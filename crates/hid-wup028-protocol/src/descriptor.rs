//! HID report descriptor injected into every virtual controller.
//!
//! Two application collections inside a Game Pad collection:
//! - report `0x50` (input): 16 buttons, X/Y/Rx/Ry as signed bytes in
//!   `[-102, 102]`, Z/Rz triggers in `[0x18, 0xF0]`.
//! - report `0x60` (output): one vendor-defined byte carrying the port's
//!   rumble state.

/// Descriptor bytes shared by all virtual ports.
pub const INJECTED_DESCRIPTOR: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x05, // Usage (Game Pad)
    0xA1, 0x01, // Collection (Application)
    //
    0xA1, 0x01, //   Collection (Application)
    0x85, 0x50, //     Report ID (0x50)
    0x05, 0x09, //     Usage Page (Button)
    0x19, 0x01, //     Usage Minimum (Button 1)
    0x29, 0x10, //     Usage Maximum (Button 16)
    0x15, 0x00, //     Logical Minimum (0)
    0x25, 0x01, //     Logical Maximum (1)
    0x75, 0x01, //     Report Size (1)
    0x95, 0x10, //     Report Count (16)
    0x81, 0x02, //     Input (Data, Var, Abs)
    0x05, 0x01, //     Usage Page (Generic Desktop)
    0x09, 0x30, //     Usage (X)
    0x09, 0x31, //     Usage (Y)
    0x09, 0x33, //     Usage (Rx)
    0x09, 0x34, //     Usage (Ry)
    0x15, 0x9A, //     Logical Minimum (-102)
    0x25, 0x66, //     Logical Maximum (102)
    0x75, 0x08, //     Report Size (8)
    0x95, 0x04, //     Report Count (4)
    0x81, 0x02, //     Input (Data, Var, Abs)
    0x05, 0x01, //     Usage Page (Generic Desktop)
    0x09, 0x32, //     Usage (Z), left trigger
    0x09, 0x35, //     Usage (Rz), right trigger
    0x15, 0x18, //     Logical Minimum (0x18)
    0x26, 0xF0, 0x00, // Logical Maximum (0xF0)
    0x75, 0x08, //     Report Size (8)
    0x95, 0x02, //     Report Count (2)
    0x81, 0x02, //     Input (Data, Var, Abs)
    0xC0, //   End Collection
    //
    0xA1, 0x01, //   Collection (Application)
    0x85, 0x60, //     Report ID (0x60)
    0x06, 0x00, 0xFF, // Usage Page (Vendor Defined 0xFF00)
    0x09, 0x03, //     Usage (0x03)
    0x75, 0x08, //     Report Size (8)
    0x95, 0x01, //     Report Count (1)
    0x91, 0x02, //     Output (Data, Var, Abs)
    0xC0, //   End Collection
    //
    0xC0, // End Collection
];

/// Descriptor for a virtual port. Identical for every instance.
pub fn inject_descriptor() -> &'static [u8] {
    INJECTED_DESCRIPTOR
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PORT_RUMBLE_REPORT_ID, VIRTUAL_REPORT_ID};

    /// Walk short items and collect `(tag, data)` pairs.
    fn items(desc: &[u8]) -> Vec<(u8, Vec<u8>)> {
        let mut out = Vec::new();
        let mut i = 0;
        while i < desc.len() {
            let prefix = desc[i];
            let size = match prefix & 0x03 {
                3 => 4,
                n => usize::from(n),
            };
            out.push((prefix & 0xFC, desc[i + 1..i + 1 + size].to_vec()));
            i += 1 + size;
        }
        out
    }

    #[test]
    fn collections_are_balanced() {
        let parsed = items(INJECTED_DESCRIPTOR);
        let opens = parsed.iter().filter(|(tag, _)| *tag == 0xA0).count();
        let closes = parsed.iter().filter(|(tag, _)| *tag == 0xC0).count();
        assert_eq!(opens, 3);
        assert_eq!(opens, closes);
    }

    #[test]
    fn declares_both_report_ids() {
        let ids: Vec<u8> = items(INJECTED_DESCRIPTOR)
            .into_iter()
            .filter(|(tag, _)| *tag == 0x84)
            .map(|(_, data)| data[0])
            .collect();
        assert_eq!(ids, vec![VIRTUAL_REPORT_ID, PORT_RUMBLE_REPORT_ID]);
    }

    #[test]
    fn input_bits_fill_virtual_report_payload() {
        // 16 button bits + 4 axis bytes + 2 trigger bytes = 8 payload bytes.
        let mut bits = 0usize;
        let mut size = 0usize;
        let mut count = 0usize;
        for (tag, data) in items(INJECTED_DESCRIPTOR) {
            match tag {
                0x74 => size = usize::from(data[0]),
                0x94 => count = usize::from(data[0]),
                0x80 => bits += size * count,
                _ => {}
            }
        }
        assert_eq!(bits, 8 * (crate::VIRTUAL_REPORT_LEN - 1));
    }

    #[test]
    fn same_bytes_every_call() {
        assert!(core::ptr::eq(inject_descriptor(), inject_descriptor()));
    }
}
