//! Radio technology combinations.
//!
//! A [`ModeSet`] is a bitmask of [`Generation`]s. A [`RadioCombination`]
//! pairs an allowed set with an optional single preferred generation.
//!
//! - `table`: vendor AcT code <-> mode set mapping
//! - `filter`: combination building, per-model filtering, selection

pub mod filter;
pub mod table;

use std::fmt;
use std::ops::{BitAnd, BitOr, Not};
use std::str::FromStr;

use thiserror::Error;

use crate::protocol::ParseError;

pub use filter::{
    ModeRequest, build_combinations, filter_supported_modes, load_supported_modes, modem_mode_any,
    supported_modes_per_model,
};
pub use table::{UBLOX_COMBINATIONS, code_for_mode, mode_for_code};

/// Errors from the combination algebra.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("No combinations built from +URAT=? response")]
    NoUsableCombination,

    #[error("No valid mode combinations built after filtering (model {model})")]
    ModelFilterExhausted { model: String },

    #[error("No AcT value matches requested mode: {mode}")]
    NoMatchingCode { mode: ModeSet },

    #[error("Invalid combination (allowed: {allowed}; preferred: {preferred})")]
    InvalidCombination { allowed: ModeSet, preferred: ModeSet },

    #[error("Combination not supported by the modem (allowed: {allowed}; preferred: {preferred})")]
    UnsupportedCombination { allowed: ModeSet, preferred: ModeSet },

    #[error("No combination with a preferred mode to pick 'any' from")]
    NoPreferredCombination,
}

/// Cellular radio access technology generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Generation {
    G2,
    G3,
    G4,
}

impl Generation {
    pub const ALL: [Generation; 3] = [Generation::G2, Generation::G3, Generation::G4];

    const fn bit(self) -> u8 {
        match self {
            Generation::G2 => 1 << 0,
            Generation::G3 => 1 << 1,
            Generation::G4 => 1 << 2,
        }
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Generation::G2 => write!(f, "2g"),
            Generation::G3 => write!(f, "3g"),
            Generation::G4 => write!(f, "4g"),
        }
    }
}

/// Set of technology generations with bitmask semantics.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ModeSet(u8);

impl ModeSet {
    pub const NONE: ModeSet = ModeSet(0);
    pub const G2: ModeSet = ModeSet(Generation::G2.bit());
    pub const G3: ModeSet = ModeSet(Generation::G3.bit());
    pub const G4: ModeSet = ModeSet(Generation::G4.bit());
    pub const ALL: ModeSet = ModeSet(Self::G2.0 | Self::G3.0 | Self::G4.0);

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Build from raw bits, dropping anything outside [`ModeSet::ALL`].
    pub const fn from_bits_truncate(bits: u8) -> Self {
        ModeSet(bits & Self::ALL.0)
    }

    pub const fn union(self, other: ModeSet) -> ModeSet {
        ModeSet(self.0 | other.0)
    }

    pub const fn intersection(self, other: ModeSet) -> ModeSet {
        ModeSet(self.0 & other.0)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether every generation in `other` is also in `self`.
    pub const fn contains(self, other: ModeSet) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn has(self, generation: Generation) -> bool {
        self.0 & generation.bit() != 0
    }

    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    pub const fn is_single(self) -> bool {
        self.count() == 1
    }

    pub fn iter(self) -> impl Iterator<Item = Generation> {
        Generation::ALL.into_iter().filter(move |g| self.has(*g))
    }
}

impl From<Generation> for ModeSet {
    fn from(generation: Generation) -> Self {
        ModeSet(generation.bit())
    }
}

impl BitOr for ModeSet {
    type Output = ModeSet;

    fn bitor(self, rhs: ModeSet) -> ModeSet {
        self.union(rhs)
    }
}

impl BitAnd for ModeSet {
    type Output = ModeSet;

    fn bitand(self, rhs: ModeSet) -> ModeSet {
        self.intersection(rhs)
    }
}

impl Not for ModeSet {
    type Output = ModeSet;

    fn not(self) -> ModeSet {
        ModeSet(!self.0 & Self::ALL.0)
    }
}

impl fmt::Debug for ModeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModeSet({self})")
    }
}

impl fmt::Display for ModeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }
        let names: Vec<String> = self.iter().map(|g| g.to_string()).collect();
        write!(f, "{}", names.join(", "))
    }
}

impl FromStr for ModeSet {
    type Err = String;

    /// Accepts `none`, `any`, or a comma separated list such as `2g,3g`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "none" | "" => return Ok(ModeSet::NONE),
            "any" | "all" => return Ok(ModeSet::ALL),
            _ => {}
        }

        s.split(',')
            .map(|item| match item.trim().to_ascii_lowercase().as_str() {
                "2g" => Ok(ModeSet::G2),
                "3g" => Ok(ModeSet::G3),
                "4g" => Ok(ModeSet::G4),
                other => Err(format!("unknown technology '{other}'")),
            })
            .try_fold(ModeSet::NONE, |acc, set| set.map(|set| acc | set))
    }
}

/// Allowed technologies plus an optional preferred one.
///
/// `preferred` is always empty or a single generation contained in `allowed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RadioCombination {
    allowed: ModeSet,
    preferred: ModeSet,
}

impl RadioCombination {
    /// Combination without preference. Returns `None` for an empty set.
    pub fn new(allowed: ModeSet) -> Option<Self> {
        if allowed.is_empty() {
            return None;
        }
        Some(Self {
            allowed,
            preferred: ModeSet::NONE,
        })
    }

    /// Combination with a preferred generation, validated against `allowed`.
    pub fn with_preferred(allowed: ModeSet, preferred: ModeSet) -> Option<Self> {
        let mut combination = Self::new(allowed)?;
        if preferred.is_empty() {
            return Some(combination);
        }
        if !preferred.is_single() || !allowed.contains(preferred) {
            return None;
        }
        combination.preferred = preferred;
        Some(combination)
    }

    pub fn allowed(&self) -> ModeSet {
        self.allowed
    }

    pub fn preferred(&self) -> ModeSet {
        self.preferred
    }

    pub fn has_preferred(&self) -> bool {
        !self.preferred.is_empty()
    }
}

impl fmt::Display for RadioCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "allowed: {}; preferred: {}", self.allowed, self.preferred)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_set_algebra() {
        let set = ModeSet::G2 | ModeSet::G4;
        assert_eq!(set.count(), 2);
        assert!(set.has(Generation::G4));
        assert!(!set.has(Generation::G3));
        assert!(set.contains(ModeSet::G2));
        assert!(!set.contains(ModeSet::G2 | ModeSet::G3));
        assert_eq!(set & ModeSet::G4, ModeSet::G4);
        assert_eq!(!set, ModeSet::G3);
        assert!(ModeSet::G3.is_single());
        assert_eq!(ModeSet::from_bits_truncate(0xFF), ModeSet::ALL);
    }

    #[test]
    fn test_mode_set_display_and_parse() {
        assert_eq!((ModeSet::G2 | ModeSet::G3).to_string(), "2g, 3g");
        assert_eq!(ModeSet::NONE.to_string(), "none");
        assert_eq!("2g,4g".parse::<ModeSet>().unwrap(), ModeSet::G2 | ModeSet::G4);
        assert_eq!("any".parse::<ModeSet>().unwrap(), ModeSet::ALL);
        assert!("5g".parse::<ModeSet>().is_err());
    }

    #[test]
    fn test_combination_invariant() {
        assert!(RadioCombination::new(ModeSet::NONE).is_none());

        let allowed = ModeSet::G2 | ModeSet::G3;
        let c = RadioCombination::with_preferred(allowed, ModeSet::G3).unwrap();
        assert_eq!(c.preferred(), ModeSet::G3);
        assert!(c.has_preferred());

        // Not a subset
        assert!(RadioCombination::with_preferred(allowed, ModeSet::G4).is_none());
        // Not a single generation
        assert!(RadioCombination::with_preferred(ModeSet::ALL, allowed).is_none());
    }
}
