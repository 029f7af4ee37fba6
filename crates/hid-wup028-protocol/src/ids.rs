//! USB identifiers and identity strings for the WUP-028 adapter.

/// Nintendo Co., Ltd.
pub const VENDOR_ID: u16 = 0x057E;

/// WUP-028 GameCube controller adapter.
pub const PRODUCT_ID: u16 = 0x0337;

/// Product string published for the physical adapter.
pub const ADAPTER_PRODUCT_NAME: &str = "GameCube USB Adapter WUP-028";

/// Returns `true` when the VID/PID pair is the WUP-028 adapter.
pub fn is_wup028(vendor_id: u16, product_id: u16) -> bool {
    vendor_id == VENDOR_ID && product_id == PRODUCT_ID
}

/// Product string of the virtual controller bound to a port.
///
/// Ports are numbered from 1 in user-facing strings, matching the labels
/// printed on the adapter.
pub fn port_product_name(port: crate::PortIndex) -> String {
    format!("GameCube Controller {}", port.number())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PortIndex;

    #[test]
    fn recognises_adapter() {
        assert!(is_wup028(0x057E, 0x0337));
        assert!(!is_wup028(0x057E, 0x0306));
        assert!(!is_wup028(0x045E, 0x0337));
    }

    #[test]
    fn port_names_are_one_based() {
        let names: Vec<String> = PortIndex::ALL.iter().copied().map(port_product_name).collect();
        assert_eq!(
            names,
            vec![
                "GameCube Controller 1",
                "GameCube Controller 2",
                "GameCube Controller 3",
                "GameCube Controller 4",
            ]
        );
    }
}
