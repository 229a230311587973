#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::network::{Diagnostics, Network};
use crate::prng::IndexSource;

/// A read-only snapshot of what the network is doing.
///
/// Observers cannot mutate or steer the network. Snapshotting allocates and
/// costs one O(N^2) energy evaluation, so take it on demand, not per step.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NetworkSnapshot {
    pub diagnostics: Diagnostics,
    /// Current outputs as on/off bits, row-major.
    pub state: Vec<bool>,
    /// Nearest archived pattern and its Hamming distance, if any are stored.
    pub closest_pattern: Option<usize>,
    pub closest_distance: Option<usize>,
    /// `true` when no single-unit update would change the state.
    pub settled: bool,
}

pub struct NetworkAdapter<'a, R: IndexSource> {
    net: &'a Network<R>,
}

impl<'a, R: IndexSource> NetworkAdapter<'a, R> {
    pub fn new(net: &'a Network<R>) -> Self {
        Self { net }
    }

    pub fn snapshot(&self) -> NetworkSnapshot {
        let closest = self.net.closest_pattern();
        NetworkSnapshot {
            diagnostics: self.net.diagnostics(),
            state: self.net.read_state(),
            closest_pattern: closest.map(|(idx, _)| idx),
            closest_distance: closest.map(|(_, dist)| dist),
            settled: self.net.is_settled(),
        }
    }

    /// Render the state as text rows, `#` for on and `.` for off.
    #[cfg(feature = "std")]
    pub fn render_ascii(&self) -> String {
        let cols = self.net.cols();
        let mut out = String::with_capacity((cols + 1) * self.net.rows());
        for (i, &on) in self.net.read_state().iter().enumerate() {
            out.push(if on { '#' } else { '.' });
            if (i + 1) % cols == 0 {
                out.push('\n');
            }
        }
        out
    }
}
