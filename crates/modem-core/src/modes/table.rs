//! u-blox AcT code table.
//!
//! The index into [`UBLOX_COMBINATIONS`] is the value used by `+URAT`.

use super::ModeSet;

pub const UBLOX_COMBINATIONS: [ModeSet; 7] = [
    ModeSet::G2,
    ModeSet::G2.union(ModeSet::G3),
    ModeSet::G3,
    ModeSet::G4,
    ModeSet::G2.union(ModeSet::G3).union(ModeSet::G4),
    ModeSet::G2.union(ModeSet::G4),
    ModeSet::G3.union(ModeSet::G4),
];

/// Mode set for a vendor code, `None` when the code is outside the table.
pub fn mode_for_code(code: u32) -> Option<ModeSet> {
    UBLOX_COMBINATIONS.get(code as usize).copied()
}

/// Vendor code whose table entry is exactly `mode`.
pub fn code_for_mode(mode: ModeSet) -> Option<u32> {
    UBLOX_COMBINATIONS
        .iter()
        .position(|entry| *entry == mode)
        .map(|idx| idx as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_entries() {
        assert_eq!(mode_for_code(0), Some(ModeSet::G2));
        assert_eq!(mode_for_code(3), Some(ModeSet::G4));
        assert_eq!(mode_for_code(4), Some(ModeSet::ALL));
        assert_eq!(mode_for_code(7), None);
    }

    #[test]
    fn test_code_lookup_is_left_inverse() {
        for (code, mode) in UBLOX_COMBINATIONS.iter().enumerate() {
            assert_eq!(code_for_mode(*mode), Some(code as u32));
        }
        assert_eq!(code_for_mode(ModeSet::NONE), None);
    }
}
