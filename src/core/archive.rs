#[cfg(not(feature = "std"))]
use alloc::{boxed::Box, vec::Vec};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Immutable snapshot of a trained boolean pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pattern {
    bits: Box<[bool]>,
}

impl Pattern {
    pub fn new(bits: &[bool]) -> Self {
        Self { bits: bits.into() }
    }

    #[inline]
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Number of "on" bits.
    pub fn active_count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Hamming distance to `other`. Extra trailing bits on either side count as differences.
    pub fn hamming(&self, other: &[bool]) -> usize {
        let common = self
            .bits
            .iter()
            .zip(other)
            .filter(|(a, b)| a != b)
            .count();
        common + self.bits.len().abs_diff(other.len())
    }
}

impl From<Vec<bool>> for Pattern {
    fn from(bits: Vec<bool>) -> Self {
        Self {
            bits: bits.into_boxed_slice(),
        }
    }
}

impl AsRef<[bool]> for Pattern {
    fn as_ref(&self) -> &[bool] {
        &self.bits
    }
}

/// Ordered, append-only record of every trained pattern.
///
/// Replayed in order by [`crate::weights::WeightMatrix::retrain_all`] when the
/// learning mode changes. Identical patterns are kept as separate entries and
/// each contributes to retraining.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PatternArchive {
    patterns: Vec<Pattern>,
}

impl PatternArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a snapshot of `bits` and return its position.
    pub fn add(&mut self, bits: &[bool]) -> usize {
        self.patterns.push(Pattern::new(bits));
        self.patterns.len() - 1
    }

    pub fn all(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn get(&self, index: usize) -> Option<&Pattern> {
        self.patterns.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pattern> + '_ {
        self.patterns.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Drop every stored pattern. Only a resize should need this.
    pub fn clear(&mut self) {
        self.patterns.clear();
    }
}
