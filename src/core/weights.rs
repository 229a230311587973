#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use thiserror::Error;
use tracing::debug;

use crate::archive::PatternArchive;
use crate::error::{check_len, Result};
use crate::grid::Grid2D;

/// Type alias for a single coupling strength.
pub type Weight = f32;

/// Convention mapping a boolean "on/off" bit to a numeric drive value.
///
/// The mapping is used for both training and unit outputs, so switching it
/// invalidates every accumulated weight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LearningMode {
    /// Bipolar units: on = +1, off = -1.
    #[default]
    Symmetric,
    /// Binary units: on = 1, off = 0.
    Asymmetric,
}

impl LearningMode {
    #[inline]
    pub const fn unit_value(self, bit: bool) -> f32 {
        if bit {
            self.on_value()
        } else {
            self.off_value()
        }
    }

    #[inline]
    pub const fn on_value(self) -> f32 {
        1.0
    }

    #[inline]
    pub const fn off_value(self) -> f32 {
        match self {
            LearningMode::Symmetric => -1.0,
            LearningMode::Asymmetric => 0.0,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            LearningMode::Symmetric => "symmetric",
            LearningMode::Asymmetric => "asymmetric",
        }
    }
}

impl fmt::Display for LearningMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown learning mode (expected `symmetric` or `asymmetric`)")]
pub struct ParseModeError;

impl FromStr for LearningMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        match s.trim() {
            "symmetric" | "bipolar" | "sym" => Ok(LearningMode::Symmetric),
            "asymmetric" | "binary" | "asym" => Ok(LearningMode::Asymmetric),
            _ => Err(ParseModeError),
        }
    }
}

/// Summary of the off-diagonal weights.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WeightStats {
    pub min: Weight,
    pub max: Weight,
    pub mean_abs: Weight,
}

/// Dense `N x N` coupling matrix trained with the Hebbian outer-product rule.
///
/// Entry `(j, i)` is the influence of unit `j` on unit `i`. Storage is a
/// [`Grid2D`] whose row `i` holds every incoming weight of unit `i`, so the
/// local field of a unit is one contiguous dot product.
///
/// The diagonal is never written and stays at 0.
#[derive(Debug, Clone)]
pub struct WeightMatrix {
    mode: LearningMode,
    units: usize,
    w: Grid2D<Weight>,
}

impl WeightMatrix {
    pub fn new(units: usize, mode: LearningMode) -> Self {
        Self {
            mode,
            units,
            w: Grid2D::new(units, units),
        }
    }

    /// Reallocate as an `n x n` zero matrix.
    pub fn reset(&mut self, n: usize) {
        self.units = n;
        self.w = Grid2D::new(n, n);
    }

    #[inline]
    pub fn mode(&self) -> LearningMode {
        self.mode
    }

    #[inline]
    pub fn unit_count(&self) -> usize {
        self.units
    }

    /// Weight `(j, i)`: influence of unit `j` on unit `i`.
    #[inline]
    pub fn weight(&self, j: usize, i: usize) -> Option<Weight> {
        if j >= self.units || i >= self.units {
            return None;
        }
        self.w.get(j, i)
    }

    /// Every incoming weight of unit `i`, indexed by source unit.
    #[inline]
    pub fn incoming(&self, i: usize) -> &[Weight] {
        if i >= self.units {
            return &[];
        }
        let n = self.units;
        &self.w.as_slice()[i * n..(i + 1) * n]
    }

    pub fn as_grid(&self) -> &Grid2D<Weight> {
        &self.w
    }

    /// Superimpose `pattern` onto the weights.
    ///
    /// For every ordered pair `i != j` adds `v(p[i]) * v(p[j])` to `(j, i)`,
    /// where `v` is the current mode's bit mapping. Rejects a pattern whose
    /// length is not the unit count without touching any weight.
    pub fn learn(&mut self, pattern: &[bool]) -> Result<()> {
        check_len(self.units, pattern.len())?;
        let n = self.units;
        if n == 0 {
            return Ok(());
        }
        let values = self.values_of(pattern);
        for (i, row) in self.w.as_mut_slice()[..n * n].chunks_mut(n).enumerate() {
            accumulate_row(row, i, &values);
        }
        Ok(())
    }

    /// Zero the matrix and replay every archived pattern in order.
    pub fn retrain_all(&mut self, archive: &PatternArchive) -> Result<()> {
        for p in archive.iter() {
            check_len(self.units, p.len())?;
        }
        self.w.clear();
        for p in archive.iter() {
            self.learn(p.bits())?;
        }
        debug!(
            patterns = archive.len(),
            units = self.units,
            mode = %self.mode,
            "weights retrained"
        );
        Ok(())
    }

    /// Row-parallel retraining. Each row sums the archive in order, so the
    /// result is bit-identical to [`Self::retrain_all`].
    #[cfg(feature = "parallel")]
    pub fn retrain_all_parallel(&mut self, archive: &PatternArchive) -> Result<()> {
        for p in archive.iter() {
            check_len(self.units, p.len())?;
        }
        let encoded: Vec<Vec<f32>> = archive.iter().map(|p| self.values_of(p.bits())).collect();
        let n = self.units;
        self.w.clear();
        if n == 0 {
            return Ok(());
        }
        self.w.as_mut_slice()[..n * n]
            .par_chunks_mut(n)
            .enumerate()
            .for_each(|(i, row)| {
                for values in &encoded {
                    accumulate_row(row, i, values);
                }
            });
        debug!(
            patterns = archive.len(),
            units = self.units,
            mode = %self.mode,
            "weights retrained (parallel)"
        );
        Ok(())
    }

    /// Switch the bit mapping and rebuild the weights from `archive`.
    ///
    /// Weights accumulated under the old mapping are meaningless under the
    /// new one, so this always retrains, even when the mode is unchanged.
    pub fn set_mode(&mut self, mode: LearningMode, archive: &PatternArchive) -> Result<()> {
        self.mode = mode;
        self.retrain_all(archive)
    }

    /// Mode switch that retrains with rayon.
    #[cfg(feature = "parallel")]
    pub fn set_mode_parallel(
        &mut self,
        mode: LearningMode,
        archive: &PatternArchive,
    ) -> Result<()> {
        self.mode = mode;
        self.retrain_all_parallel(archive)
    }

    /// `true` when `(j, i) == (i, j)` for every pair.
    pub fn is_symmetric(&self) -> bool {
        let n = self.units;
        let cells = self.w.as_slice();
        (0..n).all(|i| (i + 1..n).all(|j| cells[i * n + j] == cells[j * n + i]))
    }

    pub fn stats(&self) -> WeightStats {
        let n = self.units;
        if n < 2 {
            return WeightStats::default();
        }
        let cells = self.w.as_slice();
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        let mut abs_sum = 0.0f64;
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let w = cells[i * n + j];
                min = min.min(w);
                max = max.max(w);
                abs_sum += w.abs() as f64;
            }
        }
        WeightStats {
            min,
            max,
            mean_abs: (abs_sum / (n * (n - 1)) as f64) as f32,
        }
    }

    fn values_of(&self, pattern: &[bool]) -> Vec<f32> {
        pattern.iter().map(|&b| self.mode.unit_value(b)).collect()
    }
}

/// Add the outer-product contribution of one encoded pattern to row `i`.
#[inline]
fn accumulate_row(row: &mut [Weight], i: usize, values: &[f32]) {
    let vi = values[i];
    for (j, (w, &vj)) in row.iter_mut().zip(values).enumerate() {
        if j != i {
            *w += vi * vj;
        }
    }
}
