//! Port addressing shared by the input and output codecs.

/// Number of controller ports on the adapter. Fixed by the wire format.
pub const PORT_COUNT: usize = 4;

/// Index of one adapter port, always in `0..PORT_COUNT`.
///
/// Holding a `PortIndex` is proof the index is in range, so slot tables can
/// be addressed without bounds failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PortIndex(u8);

impl PortIndex {
    /// All four ports in wire order.
    pub const ALL: [PortIndex; PORT_COUNT] =
        [PortIndex(0), PortIndex(1), PortIndex(2), PortIndex(3)];

    /// Returns `None` for indices outside `0..PORT_COUNT`.
    pub fn new(index: u8) -> Option<Self> {
        if usize::from(index) < PORT_COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Zero-based index.
    pub fn get(self) -> u8 {
        self.0
    }

    pub fn as_usize(self) -> usize {
        usize::from(self.0)
    }

    /// One-based port number as printed on the adapter.
    pub fn number(self) -> u8 {
        self.0 + 1
    }
}

impl core::fmt::Display for PortIndex {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<usize> for PortIndex {
    type Error = usize;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .ok()
            .and_then(PortIndex::new)
            .ok_or(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range() {
        assert!(PortIndex::new(3).is_some());
        assert!(PortIndex::new(4).is_none());
        assert!(PortIndex::try_from(usize::MAX).is_err());
    }

    #[test]
    fn all_is_in_wire_order() {
        for (i, port) in PortIndex::ALL.iter().enumerate() {
            assert_eq!(port.as_usize(), i);
        }
    }
}
