//! Capacity assays: how recall degrades as more patterns share one network.
//!
//! For each load `p` the assay trains `p` random patterns, corrupts every
//! stored pattern with a fixed number of bit flips, relaxes, and scores the
//! result against the original.

use hashbrown::HashMap;
#[cfg(feature = "serde")]
use serde::Serialize;
use tracing::{debug, info};

use hopfield::driver::SimulationDriver;
use hopfield::error::Result;
use hopfield::network::{Network, NetworkConfig};
use hopfield::prng::Prng;
use hopfield::weights::LearningMode;

#[derive(Debug, Clone)]
pub struct AssayConfig {
    pub rows: usize,
    pub cols: usize,
    pub mode: LearningMode,
    pub seed: u64,
    pub max_patterns: usize,
    /// Bits flipped in each cue.
    pub flips: usize,
    /// Relaxation length in sweeps (one sweep = N single-unit updates).
    pub sweeps: usize,
    /// Random starting states used to count attractors.
    pub random_starts: usize,
}

impl Default for AssayConfig {
    fn default() -> Self {
        Self {
            rows: 8,
            cols: 8,
            mode: LearningMode::Symmetric,
            seed: 1,
            max_patterns: 12,
            flips: 6,
            sweeps: 8,
            random_starts: 32,
        }
    }
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct LoadReport {
    pub patterns: usize,
    /// Load relative to unit count.
    pub alpha: f32,
    /// Cues that relaxed back onto their exact pattern.
    pub exact_recall: f32,
    pub mean_hamming: f32,
    pub mean_energy: f32,
    /// Distinct end states reached from random starts.
    pub attractors: usize,
    /// How many of those end states are stored patterns.
    pub stored_attractors: usize,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct AssayReport {
    pub rows: usize,
    pub cols: usize,
    pub mode: LearningMode,
    pub seed: u64,
    pub flips: usize,
    pub sweeps: usize,
    pub loads: Vec<LoadReport>,
}

fn random_bits(rng: &mut Prng, n: usize) -> Vec<bool> {
    (0..n).map(|_| rng.next_bool()).collect()
}

/// Flip `flips` distinct bits of `bits`.
fn corrupt(rng: &mut Prng, bits: &[bool], flips: usize) -> Vec<bool> {
    let mut out = bits.to_vec();
    let mut order: Vec<usize> = (0..bits.len()).collect();
    // Partial Fisher-Yates; only the first `flips` slots matter.
    for k in 0..flips.min(order.len()) {
        let pick = k + rng.gen_range_usize(0, order.len() - k);
        order.swap(k, pick);
        out[order[k]] = !out[order[k]];
    }
    out
}

/// Relax with a bounded driver run, checking for a fixed point once per sweep.
fn relax(net: &mut Network, sweeps: usize) {
    let n = net.unit_count();
    let mut driver = SimulationDriver::new();
    driver.run((sweeps * n).min(u32::MAX as usize) as u32, 0);
    while let Some(tick) = driver.tick(net) {
        if tick.index as usize % n == 0 && net.is_settled() {
            driver.stop();
        }
    }
}

fn measure_load(cfg: &AssayConfig, patterns: usize, rng: &mut Prng) -> Result<LoadReport> {
    let mut net = Network::new(
        NetworkConfig::with_size(cfg.rows, cfg.cols)
            .with_mode(cfg.mode)
            .with_seed(rng.next_u64()),
    );
    let n = net.unit_count();

    let stored: Vec<Vec<bool>> = (0..patterns).map(|_| random_bits(rng, n)).collect();
    for p in &stored {
        net.train(p)?;
    }

    let mut exact = 0usize;
    let mut hamming_sum = 0usize;
    let mut energy_sum = 0.0f32;
    for p in &stored {
        let cue = corrupt(rng, p, cfg.flips);
        net.set_state(&cue)?;
        relax(&mut net, cfg.sweeps);

        let state = net.read_state();
        let dist = state.iter().zip(p).filter(|(a, b)| a != b).count();
        if dist == 0 {
            exact += 1;
        }
        hamming_sum += dist;
        energy_sum += net.energy();
    }

    let mut ends: HashMap<Vec<bool>, usize> = HashMap::new();
    for _ in 0..cfg.random_starts {
        net.set_state(&random_bits(rng, n))?;
        relax(&mut net, cfg.sweeps);
        *ends.entry(net.read_state()).or_insert(0) += 1;
    }
    let stored_attractors = ends.keys().filter(|s| stored.contains(s)).count();

    let denom = patterns.max(1) as f32;
    let report = LoadReport {
        patterns,
        alpha: patterns as f32 / n as f32,
        exact_recall: exact as f32 / denom,
        mean_hamming: hamming_sum as f32 / denom,
        mean_energy: energy_sum / denom,
        attractors: ends.len(),
        stored_attractors,
    };
    debug!(?report, "load measured");
    Ok(report)
}

pub fn run_with(cfg: &AssayConfig) -> Result<AssayReport> {
    info!(
        rows = cfg.rows,
        cols = cfg.cols,
        mode = %cfg.mode,
        max_patterns = cfg.max_patterns,
        "capacity assay"
    );
    let mut rng = Prng::new(cfg.seed);
    let loads = (1..=cfg.max_patterns)
        .map(|p| measure_load(cfg, p, &mut rng))
        .collect::<Result<Vec<_>>>()?;
    Ok(AssayReport {
        rows: cfg.rows,
        cols: cfg.cols,
        mode: cfg.mode,
        seed: cfg.seed,
        flips: cfg.flips,
        sweeps: cfg.sweeps,
        loads,
    })
}

fn print_table(report: &AssayReport) {
    println!(
        "capacity assay: {}x{} mode={} seed={} flips={} sweeps={}",
        report.rows, report.cols, report.mode, report.seed, report.flips, report.sweeps
    );
    println!(" p   alpha  exact   hamming  energy     attractors(stored)");
    for l in &report.loads {
        println!(
            "{:2}   {:.3}  {:5.1}%  {:6.2}  {:9.2}  {:3} ({})",
            l.patterns,
            l.alpha,
            l.exact_recall * 100.0,
            l.mean_hamming,
            l.mean_energy,
            l.attractors,
            l.stored_attractors,
        );
    }
}

/// Entry point for `hopfield assays [--json] [--asymmetric] [--seed N]`.
pub fn run(args: &[String]) {
    let mut cfg = AssayConfig::default();
    let mut json = false;
    let mut it = args.iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--json" => json = true,
            "--asymmetric" => cfg.mode = LearningMode::Asymmetric,
            "--seed" => {
                if let Some(seed) = it.next().and_then(|s| s.parse().ok()) {
                    cfg.seed = seed;
                }
            }
            other => eprintln!("assays: ignoring unknown flag {other}"),
        }
    }

    let report = match run_with(&cfg) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("assays: {e}");
            std::process::exit(1);
        }
    };
    if json {
        print_json(&report);
    } else {
        print_table(&report);
    }
}

#[cfg(feature = "serde")]
fn print_json(report: &AssayReport) {
    match serde_json::to_string_pretty(report) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("assays: json encode failed: {e}"),
    }
}

#[cfg(not(feature = "serde"))]
fn print_json(report: &AssayReport) {
    eprintln!("assays: --json needs the `serde` feature");
    print_table(report);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrupt_flips_exactly_the_requested_bits() {
        let mut rng = Prng::new(3);
        let bits = vec![false; 20];
        let out = corrupt(&mut rng, &bits, 5);
        assert_eq!(out.iter().filter(|&&b| b).count(), 5);
    }

    #[test]
    fn single_pattern_is_always_recalled() {
        let cfg = AssayConfig {
            rows: 4,
            cols: 4,
            max_patterns: 1,
            flips: 2,
            sweeps: 20,
            random_starts: 4,
            ..AssayConfig::default()
        };
        let report = run_with(&cfg).unwrap();
        assert_eq!(report.loads.len(), 1);
        assert_eq!(report.loads[0].exact_recall, 1.0);
        assert_eq!(report.loads[0].mean_hamming, 0.0);
    }
}
