// no_std support: use core and alloc when std is not available
#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[cfg(feature = "simd")]
use wide::f32x4;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use tracing::{debug, info, trace, warn};

use crate::archive::PatternArchive;
use crate::error::{check_len, NetworkError, Result};
use crate::grid::Grid2D;
use crate::prng::{IndexSource, Prng};
use crate::weights::{LearningMode, WeightMatrix, WeightStats};

pub type UnitId = usize;

/// Largest supported unit count. The weight matrix holds `MAX_UNITS^2`
/// entries (64 MiB of `f32` at this bound).
pub const MAX_UNITS: usize = 4096;

/// Type alias for a unit's output (one of the mode's two values).
pub type Output = f32;

/// Execution tier for local-field and energy evaluation.
///
/// - `Scalar`: Single-threaded, no SIMD (baseline, works everywhere)
/// - `Simd`: Single-threaded dot products via `wide` (requires `simd` feature)
/// - `Parallel`: Energy and retraining across threads via rayon (requires `parallel` feature)
///
/// Every tier produces the same state trajectory; only throughput differs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ExecutionTier {
    /// Single-threaded scalar execution (default, works everywhere).
    #[default]
    Scalar,
    /// Single-threaded with SIMD vectorization (requires `simd` feature).
    Simd,
    /// Multi-threaded parallel execution (requires `parallel` feature).
    Parallel,
}

/// Read-only view of one unit.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Unit {
    pub output: Output,
    /// Constant drive added to the local field. No learning rule touches it.
    pub bias: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NetworkConfig {
    pub rows: usize,
    pub cols: usize,
    pub mode: LearningMode,

    // If set, makes the update schedule reproducible.
    pub seed: Option<u64>,

    pub tier: ExecutionTier,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rows: 5,
            cols: 5,
            mode: LearningMode::Symmetric,
            seed: None,
            tier: ExecutionTier::Scalar,
        }
    }
}

impl NetworkConfig {
    pub fn with_size(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            ..Self::default()
        }
    }

    pub fn with_mode(mut self, mode: LearningMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_tier(mut self, tier: ExecutionTier) -> Self {
        self.tier = tier;
        self
    }

    #[inline]
    pub fn unit_count(&self) -> usize {
        self.rows.saturating_mul(self.cols)
    }

    /// Check that the grid fits within [`MAX_UNITS`].
    ///
    /// Dimensions below 1 pass; they are clamped on construction.
    pub fn validate(&self) -> Result<()> {
        checked_units(self.rows.max(1), self.cols.max(1)).map(|_| ())
    }
}

/// Outcome of one asynchronous update.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StepReport {
    pub unit: UnitId,
    pub previous: Output,
    pub output: Output,
    /// Local field (bias plus weighted input) that decided the new output.
    pub field: f32,
}

impl StepReport {
    #[inline]
    pub fn changed(&self) -> bool {
        self.previous != self.output
    }
}

#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Diagnostics {
    pub rows: usize,
    pub cols: usize,
    pub unit_count: usize,
    pub mode: LearningMode,
    pub pattern_count: usize,
    pub step_count: u64,
    pub active_units: usize,
    pub energy: f32,
    pub weights: WeightStats,
}

/// Fully-connected binary associative memory.
///
/// Owns the unit buffer, the weight matrix and the archive of trained
/// patterns; a resize replaces all three together. Unit updates are
/// asynchronous: every [`Network::step`] picks one unit from the injected
/// [`IndexSource`] and sets it from the current global state.
pub struct Network<R: IndexSource = Prng> {
    cfg: NetworkConfig,

    // Unit state, stored SoA so local fields are contiguous dot products.
    outputs: Vec<Output>,
    biases: Vec<f32>,

    weights: WeightMatrix,
    archive: PatternArchive,

    step_count: u64,

    rng: R,
}

impl Network<Prng> {
    pub fn new(cfg: NetworkConfig) -> Self {
        let rng = match cfg.seed {
            Some(seed) => Prng::new(seed),
            None => default_prng(),
        };
        Self::with_source(cfg, rng)
    }

    /// Shorthand for a network with default settings apart from shape and mode.
    pub fn create(rows: usize, cols: usize, mode: LearningMode) -> Self {
        Self::new(NetworkConfig::with_size(rows, cols).with_mode(mode))
    }
}

#[cfg(feature = "std")]
fn default_prng() -> Prng {
    Prng::from_entropy()
}

#[cfg(not(feature = "std"))]
fn default_prng() -> Prng {
    Prng::new(1)
}

impl<R: IndexSource> Network<R> {
    /// Build a network that draws update indices from `rng`.
    pub fn with_source(cfg: NetworkConfig, rng: R) -> Self {
        let (rows, cols) = fit_dims(cfg.rows, cfg.cols);
        let cfg = NetworkConfig { rows, cols, ..cfg };
        let n = rows * cols;

        Self {
            cfg,
            outputs: vec![cfg.mode.off_value(); n],
            biases: vec![0.0; n],
            weights: WeightMatrix::new(n, cfg.mode),
            archive: PatternArchive::new(),
            step_count: 0,
            rng,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn config(&self) -> &NetworkConfig {
        &self.cfg
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.cfg.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cfg.cols
    }

    #[inline]
    pub fn unit_count(&self) -> usize {
        self.outputs.len()
    }

    #[inline]
    pub fn mode(&self) -> LearningMode {
        self.weights.mode()
    }

    #[inline]
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn weights(&self) -> &WeightMatrix {
        &self.weights
    }

    pub fn archive(&self) -> &PatternArchive {
        &self.archive
    }

    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    pub fn unit(&self, i: UnitId) -> Option<Unit> {
        Some(Unit {
            output: *self.outputs.get(i)?,
            bias: self.biases[i],
        })
    }

    pub fn bias(&self, i: UnitId) -> Option<f32> {
        self.biases.get(i).copied()
    }

    pub fn set_bias(&mut self, i: UnitId, bias: f32) -> Result<()> {
        let count = self.biases.len();
        let slot = self
            .biases
            .get_mut(i)
            .ok_or(NetworkError::UnitOutOfRange { index: i, count })?;
        *slot = bias;
        Ok(())
    }

    pub fn index_source_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    // =========================================================================
    // Execution Tier Configuration
    // =========================================================================

    pub fn set_execution_tier(&mut self, tier: ExecutionTier) {
        self.cfg.tier = tier;
    }

    pub fn execution_tier(&self) -> ExecutionTier {
        self.cfg.tier
    }

    /// Returns the tier that will actually run, honoring compile-time feature gates.
    pub fn effective_execution_tier(&self) -> ExecutionTier {
        match self.cfg.tier {
            ExecutionTier::Scalar => ExecutionTier::Scalar,
            ExecutionTier::Simd => {
                #[cfg(feature = "simd")]
                {
                    ExecutionTier::Simd
                }
                #[cfg(not(feature = "simd"))]
                {
                    ExecutionTier::Scalar
                }
            }
            ExecutionTier::Parallel => {
                #[cfg(feature = "parallel")]
                {
                    ExecutionTier::Parallel
                }
                #[cfg(not(feature = "parallel"))]
                {
                    ExecutionTier::Scalar
                }
            }
        }
    }

    // =========================================================================
    // Training
    // =========================================================================

    /// Superimpose `bits` onto the weights and archive a snapshot of it.
    ///
    /// Returns the archive position. A length mismatch changes nothing.
    pub fn train(&mut self, bits: &[bool]) -> Result<usize> {
        self.weights.learn(bits)?;
        let index = self.archive.add(bits);
        debug!(
            index,
            active = self.archive.all()[index].active_count(),
            "pattern trained"
        );
        Ok(index)
    }

    /// Switch the bit mapping and rebuild the weights from the archive.
    ///
    /// Current outputs are re-encoded into the new mode, so
    /// [`Network::read_state`] reports the same bits before and after.
    pub fn set_mode(&mut self, mode: LearningMode) -> Result<()> {
        let previous = self.mode();
        match self.effective_execution_tier() {
            #[cfg(feature = "parallel")]
            ExecutionTier::Parallel => self.weights.set_mode_parallel(mode, &self.archive)?,
            _ => self.weights.set_mode(mode, &self.archive)?,
        }
        self.cfg.mode = mode;
        for out in &mut self.outputs {
            *out = mode.unit_value(*out > 0.0);
        }
        info!(
            from = %previous,
            to = %mode,
            patterns = self.archive.len(),
            "learning mode switched"
        );
        Ok(())
    }

    /// Tear down and rebuild for a new grid shape.
    ///
    /// Weights, archive, unit buffer and step counter are all discarded;
    /// mode, tier and index source carry over. A grid larger than
    /// [`MAX_UNITS`] is refused and the network is left untouched.
    pub fn resize(&mut self, rows: usize, cols: usize) -> Result<()> {
        let (rows, cols) = clamp_dims(rows, cols);
        let n = checked_units(rows, cols)?;
        let mode = self.mode();

        self.cfg.rows = rows;
        self.cfg.cols = cols;
        self.outputs = vec![mode.off_value(); n];
        self.biases = vec![0.0; n];
        self.weights = WeightMatrix::new(n, mode);
        self.archive = PatternArchive::new();
        self.step_count = 0;

        info!(rows, cols, units = n, "network resized");
        Ok(())
    }

    // =========================================================================
    // State I/O
    // =========================================================================

    /// Overwrite every output from a boolean vector.
    pub fn set_state(&mut self, bits: &[bool]) -> Result<()> {
        check_len(self.outputs.len(), bits.len())?;
        let mode = self.mode();
        for (out, &b) in self.outputs.iter_mut().zip(bits) {
            *out = mode.unit_value(b);
        }
        Ok(())
    }

    /// Overwrite every output from numeric values; anything `> 0` is "on".
    pub fn set_state_values(&mut self, values: &[f32]) -> Result<()> {
        check_len(self.outputs.len(), values.len())?;
        let mode = self.mode();
        for (out, &v) in self.outputs.iter_mut().zip(values) {
            *out = mode.unit_value(v > 0.0);
        }
        Ok(())
    }

    pub fn read_state(&self) -> Vec<bool> {
        self.outputs.iter().map(|&o| o > 0.0).collect()
    }

    /// Load archived pattern `index` into the outputs.
    pub fn recall_pattern(&mut self, index: usize) -> Result<()> {
        let len = self.archive.len();
        let pattern = self
            .archive
            .get(index)
            .ok_or(NetworkError::PatternNotFound { index, len })?;
        let mode = self.weights.mode();
        for (out, &b) in self.outputs.iter_mut().zip(pattern.bits()) {
            *out = mode.unit_value(b);
        }
        Ok(())
    }

    /// Outputs laid out as the `cols x rows` field they came from.
    pub fn state_grid(&self) -> Grid2D<Output> {
        Grid2D::from_vec(self.cols(), self.rows(), self.outputs.clone())
            .unwrap_or_else(|| Grid2D::new(self.cols(), self.rows()))
    }

    // =========================================================================
    // Dynamics
    // =========================================================================

    /// One asynchronous update.
    ///
    /// Picks a unit, computes its local field from the current outputs and
    /// sets it to the mode's "on" value when the field is strictly positive,
    /// "off" otherwise. Exactly one output can change. Returns `None` on a
    /// network without units.
    pub fn step(&mut self) -> Option<StepReport> {
        let n = self.outputs.len();
        if n == 0 {
            return None;
        }

        let unit = self.rng.next_index(n) % n;
        let field = self.field_of(unit);
        let mode = self.mode();

        let previous = self.outputs[unit];
        let output = if field > 0.0 {
            mode.on_value()
        } else {
            mode.off_value()
        };
        self.outputs[unit] = output;
        self.step_count = self.step_count.wrapping_add(1);

        trace!(unit, field, output, step = self.step_count, "unit updated");

        Some(StepReport {
            unit,
            previous,
            output,
            field,
        })
    }

    /// Local field of unit `i`: bias plus the weighted sum of every output.
    pub fn local_field(&self, i: UnitId) -> Result<f32> {
        let count = self.outputs.len();
        if i >= count {
            return Err(NetworkError::UnitOutOfRange { index: i, count });
        }
        Ok(self.field_of(i))
    }

    /// Global energy `-sum_i sum_j W[j,i] * out[i] * out[j]`.
    ///
    /// Purely observational; 0 for a network without units.
    pub fn energy(&self) -> f32 {
        if self.outputs.is_empty() {
            return 0.0;
        }
        match self.effective_execution_tier() {
            ExecutionTier::Scalar => self.energy_scalar(),
            ExecutionTier::Simd => self.energy_simd(),
            ExecutionTier::Parallel => self.energy_parallel(),
        }
    }

    fn field_of(&self, i: UnitId) -> f32 {
        let row = self.weights.incoming(i);
        let drive = match self.effective_execution_tier() {
            ExecutionTier::Simd => dot_simd(row, &self.outputs),
            _ => dot_scalar(row, &self.outputs),
        };
        self.biases[i] + drive
    }

    fn energy_scalar(&self) -> f32 {
        let mut sum = 0.0f32;
        for (i, &oi) in self.outputs.iter().enumerate() {
            sum += oi * dot_scalar(self.weights.incoming(i), &self.outputs);
        }
        -sum
    }

    fn energy_simd(&self) -> f32 {
        let mut sum = 0.0f32;
        for (i, &oi) in self.outputs.iter().enumerate() {
            sum += oi * dot_simd(self.weights.incoming(i), &self.outputs);
        }
        -sum
    }

    #[cfg(feature = "parallel")]
    fn energy_parallel(&self) -> f32 {
        let outputs = &self.outputs;
        let weights = &self.weights;
        let sum: f32 = (0..outputs.len())
            .into_par_iter()
            .map(|i| outputs[i] * dot_scalar(weights.incoming(i), outputs))
            .sum();
        -sum
    }

    #[cfg(not(feature = "parallel"))]
    fn energy_parallel(&self) -> f32 {
        self.energy_scalar()
    }

    // =========================================================================
    // Observation
    // =========================================================================

    /// Archived pattern nearest to the current state as `(index, hamming distance)`.
    ///
    /// Ties resolve to the earliest pattern.
    pub fn closest_pattern(&self) -> Option<(usize, usize)> {
        let state = self.read_state();
        self.archive
            .iter()
            .enumerate()
            .map(|(idx, p)| (idx, p.hamming(&state)))
            .min_by_key(|&(idx, dist)| (dist, idx))
    }

    pub fn active_units(&self) -> usize {
        self.outputs.iter().filter(|&&o| o > 0.0).count()
    }

    /// `true` when the state is a fixed point: updating any single unit
    /// would leave its output unchanged.
    pub fn is_settled(&self) -> bool {
        let mode = self.mode();
        (0..self.outputs.len()).all(|i| {
            let target = if self.field_of(i) > 0.0 {
                mode.on_value()
            } else {
                mode.off_value()
            };
            self.outputs[i] == target
        })
    }

    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics {
            rows: self.rows(),
            cols: self.cols(),
            unit_count: self.unit_count(),
            mode: self.mode(),
            pattern_count: self.archive.len(),
            step_count: self.step_count,
            active_units: self.active_units(),
            energy: self.energy(),
            weights: self.weights.stats(),
        }
    }
}

fn clamp_dims(rows: usize, cols: usize) -> (usize, usize) {
    if rows < 1 || cols < 1 {
        warn!(rows, cols, "grid dimensions below 1 clamped up");
    }
    (rows.max(1), cols.max(1))
}

fn checked_units(rows: usize, cols: usize) -> Result<usize> {
    rows.checked_mul(cols)
        .filter(|&n| n <= MAX_UNITS)
        .ok_or(NetworkError::TooManyUnits {
            rows,
            cols,
            max: MAX_UNITS,
        })
}

/// Clamp up to 1, then shrink an oversized grid until it fits [`MAX_UNITS`].
fn fit_dims(rows: usize, cols: usize) -> (usize, usize) {
    let (rows, cols) = clamp_dims(rows, cols);
    if checked_units(rows, cols).is_ok() {
        return (rows, cols);
    }
    let fit_rows = rows.min(MAX_UNITS);
    let fit_cols = cols.min(MAX_UNITS / fit_rows);
    warn!(
        rows,
        cols,
        fit_rows,
        fit_cols,
        max = MAX_UNITS,
        "grid exceeds the unit limit; shrunk to fit"
    );
    (fit_rows, fit_cols)
}

#[inline]
fn dot_scalar(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(feature = "simd")]
fn dot_simd(a: &[f32], b: &[f32]) -> f32 {
    let len = a.len().min(b.len());
    let simd_end = len - (len % 4);

    let mut acc = f32x4::splat(0.0);
    for i in (0..simd_end).step_by(4) {
        let x = f32x4::from([a[i], a[i + 1], a[i + 2], a[i + 3]]);
        let y = f32x4::from([b[i], b[i + 1], b[i + 2], b[i + 3]]);
        acc = acc + x * y;
    }

    // Handle remainder (tail elements).
    let mut sum: f32 = acc.to_array().iter().sum();
    for i in simd_end..len {
        sum += a[i] * b[i];
    }
    sum
}

#[cfg(not(feature = "simd"))]
fn dot_simd(a: &[f32], b: &[f32]) -> f32 {
    dot_scalar(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prng::ScriptedIndices;

    fn scripted(
        rows: usize,
        cols: usize,
        mode: LearningMode,
        order: Vec<usize>,
    ) -> Network<ScriptedIndices> {
        Network::with_source(
            NetworkConfig::with_size(rows, cols).with_mode(mode),
            ScriptedIndices::new(order),
        )
    }

    #[test]
    fn dimensions_below_one_are_clamped() {
        let net = Network::new(NetworkConfig::with_size(0, 3).with_seed(1));
        assert_eq!((net.rows(), net.cols()), (1, 3));
        assert_eq!(net.unit_count(), 3);
    }

    #[test]
    fn fresh_network_is_all_off() {
        let net = Network::create(2, 3, LearningMode::Asymmetric);
        assert!(net.outputs().iter().all(|&o| o == 0.0));
        assert_eq!(net.read_state(), vec![false; 6]);
        assert_eq!(net.energy(), 0.0);
    }

    #[test]
    fn train_archives_and_returns_position() {
        let mut net = scripted(2, 2, LearningMode::Symmetric, vec![0]);
        assert_eq!(net.train(&[true, false, true, false]), Ok(0));
        assert_eq!(net.train(&[false, true, true, false]), Ok(1));
        assert_eq!(net.archive().len(), 2);
    }

    #[test]
    fn train_length_mismatch_is_a_no_op() {
        let mut net = scripted(2, 2, LearningMode::Symmetric, vec![0]);
        let err = net.train(&[true, false]).unwrap_err();
        assert_eq!(
            err,
            NetworkError::PatternLengthMismatch {
                expected: 4,
                actual: 2
            }
        );
        assert!(net.archive().is_empty());
        assert!(net.weights().as_grid().as_slice().iter().all(|&w| w == 0.0));
    }

    #[test]
    fn set_state_mismatch_leaves_outputs() {
        let mut net = scripted(2, 2, LearningMode::Symmetric, vec![0]);
        net.set_state(&[true, true, false, false]).unwrap();
        assert!(net.set_state(&[false; 5]).is_err());
        assert!(net.set_state_values(&[1.0]).is_err());
        assert_eq!(net.read_state(), vec![true, true, false, false]);
    }

    #[test]
    fn set_state_values_thresholds_at_zero() {
        let mut net = scripted(1, 4, LearningMode::Symmetric, vec![0]);
        net.set_state_values(&[0.5, 0.0, -2.0, 3.0]).unwrap();
        assert_eq!(net.outputs(), &[1.0, -1.0, -1.0, 1.0]);
    }

    #[test]
    fn energy_of_trained_pattern_matches_double_sum() {
        let mut net = scripted(2, 2, LearningMode::Symmetric, vec![0]);
        let p = [true, false, true, false];
        net.train(&p).unwrap();
        net.set_state(&p).unwrap();
        assert_eq!(net.energy(), -12.0);
    }

    #[test]
    fn scripted_step_updates_the_chosen_unit() {
        let mut net = scripted(2, 2, LearningMode::Symmetric, vec![1]);
        net.train(&[true, false, true, false]).unwrap();
        net.set_state(&[true, true, true, false]).unwrap();

        // Field of unit 1: W[0,1] + W[2,1] - W[3,1] = -1 - 1 - 1 = -3.
        let report = net.step().unwrap();
        assert_eq!(report.unit, 1);
        assert_eq!(report.field, -3.0);
        assert!(report.changed());
        assert_eq!(net.read_state(), vec![true, false, true, false]);
        assert_eq!(net.step_count(), 1);
    }

    #[test]
    fn zero_field_turns_unit_off() {
        let mut net = scripted(1, 3, LearningMode::Asymmetric, vec![2]);
        net.set_state(&[false, false, true]).unwrap();
        let report = net.step().unwrap();
        assert_eq!(report.field, 0.0);
        assert_eq!(report.output, 0.0);
    }

    #[test]
    fn bias_enters_the_local_field() {
        let mut net = scripted(1, 2, LearningMode::Asymmetric, vec![0]);
        net.set_bias(0, 0.5).unwrap();
        assert_eq!(net.local_field(0), Ok(0.5));
        let report = net.step().unwrap();
        assert_eq!(report.output, 1.0);
        assert!(net.set_bias(9, 1.0).is_err());
        assert_eq!(net.unit(0).map(|u| u.bias), Some(0.5));
    }

    #[test]
    fn set_mode_reencodes_outputs() {
        let mut net = scripted(1, 3, LearningMode::Symmetric, vec![0]);
        net.train(&[true, false, true]).unwrap();
        net.set_state(&[true, false, true]).unwrap();
        net.set_mode(LearningMode::Asymmetric).unwrap();

        assert_eq!(net.outputs(), &[1.0, 0.0, 1.0]);
        assert_eq!(net.read_state(), vec![true, false, true]);
        assert_eq!(net.weights().weight(0, 2), Some(1.0));
        assert_eq!(net.weights().weight(0, 1), Some(0.0));
    }

    #[test]
    fn recall_pattern_restores_archived_bits() {
        let mut net = scripted(2, 2, LearningMode::Symmetric, vec![0]);
        net.train(&[false, true, true, false]).unwrap();
        net.recall_pattern(0).unwrap();
        assert_eq!(net.read_state(), vec![false, true, true, false]);
        assert_eq!(
            net.recall_pattern(3),
            Err(NetworkError::PatternNotFound { index: 3, len: 1 })
        );
    }

    #[test]
    fn resize_discards_everything() {
        let mut net = Network::new(NetworkConfig::with_size(5, 5).with_seed(9));
        net.train(&[true; 25]).unwrap();
        net.step();
        net.resize(3, 4).unwrap();

        assert_eq!(net.unit_count(), 12);
        assert!(net.archive().is_empty());
        assert_eq!(net.step_count(), 0);
        assert_eq!(net.weights().unit_count(), 12);
        assert!(net.weights().as_grid().as_slice().iter().all(|&w| w == 0.0));
    }

    #[test]
    fn oversized_resize_is_refused_and_changes_nothing() {
        let mut net = Network::new(NetworkConfig::with_size(2, 2).with_seed(9));
        net.train(&[true, false, true, false]).unwrap();
        net.step();

        assert_eq!(
            net.resize(1 << 33, 1 << 33),
            Err(NetworkError::TooManyUnits {
                rows: 1 << 33,
                cols: 1 << 33,
                max: MAX_UNITS
            })
        );
        assert!(net.resize(300, 300).is_err());
        assert!(net.resize(usize::MAX, 2).is_err());

        assert_eq!((net.rows(), net.cols()), (2, 2));
        assert_eq!(net.archive().len(), 1);
        assert_eq!(net.step_count(), 1);
        assert_eq!(net.weights().weight(2, 0), Some(1.0));

        net.resize(4, 8).unwrap();
        assert_eq!(net.unit_count(), 32);
    }

    #[test]
    fn oversized_config_is_shrunk_on_construction() {
        let cfg = NetworkConfig::with_size(usize::MAX, 300).with_seed(1);
        assert!(cfg.validate().is_err());
        let net = Network::new(cfg);
        assert!(net.unit_count() <= MAX_UNITS);
        assert_eq!(net.unit_count(), net.rows() * net.cols());
        assert_eq!(net.weights().unit_count(), net.unit_count());
        assert!(NetworkConfig::with_size(0, 7).validate().is_ok());
    }

    #[test]
    fn stored_pattern_is_settled() {
        let mut net = scripted(2, 2, LearningMode::Symmetric, vec![0]);
        net.train(&[true, false, true, false]).unwrap();
        net.set_state(&[true, false, true, false]).unwrap();
        assert!(net.is_settled());
        net.set_state(&[true, true, true, false]).unwrap();
        assert!(!net.is_settled());
    }

    #[test]
    fn closest_pattern_prefers_smallest_distance() {
        let mut net = scripted(1, 4, LearningMode::Symmetric, vec![0]);
        net.train(&[true, true, false, false]).unwrap();
        net.train(&[false, false, true, true]).unwrap();
        net.set_state(&[false, true, true, true]).unwrap();
        assert_eq!(net.closest_pattern(), Some((1, 1)));
    }

    #[test]
    fn state_grid_is_cols_by_rows() {
        let mut net = scripted(2, 3, LearningMode::Asymmetric, vec![0]);
        net.set_state(&[false, false, true, false, false, false]).unwrap();
        let g = net.state_grid();
        assert_eq!((g.width(), g.height()), (3, 2));
        assert_eq!(g.get(2, 0), Some(1.0));
    }

    #[test]
    fn tiers_agree_on_energy() {
        let mut net = Network::new(NetworkConfig::with_size(3, 5).with_seed(4));
        net.train(&[
            true, false, true, true, false, false, true, false, true, true, false, true, false,
            false, true,
        ])
        .unwrap();
        net.set_state(&[true; 15]).unwrap();
        let scalar = net.energy();
        for tier in [ExecutionTier::Simd, ExecutionTier::Parallel] {
            net.set_execution_tier(tier);
            assert_eq!(net.energy(), scalar, "{tier:?}");
        }
    }
}
