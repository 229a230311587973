//! # hopfield
//!
//! A fully-connected binary associative memory (Hopfield network).
//!
//! Patterns are stored with the Hebbian outer-product rule and recalled by
//! asynchronous stochastic relaxation: one randomly chosen unit is updated
//! per step from the current global state, which never raises the network
//! energy when the weights are symmetric with a zero diagonal.
//!
//! ## Quick Start
//!
//! ```
//! use hopfield::prelude::*;
//!
//! let cfg = NetworkConfig::with_size(2, 2).with_seed(42);
//! let mut net = Network::new(cfg);
//!
//! net.train(&[true, false, true, false]).unwrap();
//!
//! // Start from a corrupted copy and let it settle.
//! net.set_state(&[true, true, true, false]).unwrap();
//! let mut driver = SimulationDriver::new();
//! driver.run(50, 20);
//! driver.run_to_completion(&mut net, |_| {});
//!
//! assert_eq!(net.read_state(), vec![true, false, true, false]);
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Standard library support
//! - `serde` (default): Serialization of configs, snapshots and the daemon protocol
//! - `parallel`: Multi-threaded energy and retraining via rayon
//! - `simd`: SIMD local-field accumulation via the `wide` crate
//!
//! ## Modules
//!
//! - [`grid`]: Row-major 2D container with bilinear sampling
//! - [`weights`]: Learning modes and the Hebbian weight matrix
//! - [`archive`]: Trained pattern history
//! - [`network`]: Units, asynchronous dynamics and energy
//! - [`driver`]: Bounded simulation runs
//! - [`observer`]: Read-only snapshots
//! - `protocol`: JSON-lines IPC spoken by `hopfieldd` (needs `std` + `serde`)

// no_std support
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

#[path = "core/error.rs"]
pub mod error;

#[path = "core/grid.rs"]
pub mod grid;

#[path = "core/prng.rs"]
pub mod prng;

#[path = "core/archive.rs"]
pub mod archive;

#[path = "core/weights.rs"]
pub mod weights;

#[path = "core/network.rs"]
pub mod network;

#[path = "core/driver.rs"]
pub mod driver;

pub mod observer;

#[cfg(all(feature = "std", feature = "serde"))]
pub mod protocol;

/// Prelude module for convenient imports.
///
/// ```
/// use hopfield::prelude::*;
/// ```
pub mod prelude {
    pub use crate::archive::{Pattern, PatternArchive};
    pub use crate::driver::{DriverState, RunConfig, SimulationDriver, Tick};
    pub use crate::error::{NetworkError, Result};
    pub use crate::grid::Grid2D;
    pub use crate::network::{
        Diagnostics, ExecutionTier, Network, NetworkConfig, Output, StepReport, Unit, UnitId,
    };
    pub use crate::observer::{NetworkAdapter, NetworkSnapshot};
    pub use crate::prng::{IndexSource, Prng, ScriptedIndices};
    pub use crate::weights::{LearningMode, Weight, WeightMatrix, WeightStats};
}
