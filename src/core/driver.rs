#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use tracing::debug;

use crate::network::{Network, StepReport};
use crate::prng::IndexSource;

/// Bounded-run settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RunConfig {
    /// Ticks before the run ends on its own.
    pub max_steps: u32,
    /// Suggested delay between ticks. The driver never sleeps; hosts pace ticks with it.
    pub interval_ms: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_steps: 100,
            interval_ms: 20,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DriverState {
    #[default]
    Idle,
    Running,
}

/// One driver tick: an update plus the energy read right after it.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Tick {
    /// 1-based position within the current run.
    pub index: u32,
    pub report: StepReport,
    pub energy: f32,
    /// `true` on the tick that exhausted the run.
    pub finished: bool,
}

/// Runs a network for a bounded number of ticks.
///
/// At most one run is active at a time. Each [`SimulationDriver::tick`] is a
/// single complete step, so a [`SimulationDriver::stop`] issued between ticks
/// always lands before the next one.
#[derive(Debug, Clone, Default)]
pub struct SimulationDriver {
    state: DriverState,
    remaining: u32,
    completed: u32,
    interval_ms: u32,
    last_energy: Option<f32>,
}

impl SimulationDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a run of up to `max_steps` ticks.
    ///
    /// Returns `false` without touching anything when a run is already
    /// active or `max_steps` is zero.
    pub fn run(&mut self, max_steps: u32, interval_ms: u32) -> bool {
        if self.state == DriverState::Running || max_steps == 0 {
            return false;
        }
        self.state = DriverState::Running;
        self.remaining = max_steps;
        self.completed = 0;
        self.interval_ms = interval_ms;
        debug!(max_steps, interval_ms, "run started");
        true
    }

    pub fn run_with(&mut self, cfg: RunConfig) -> bool {
        self.run(cfg.max_steps, cfg.interval_ms)
    }

    /// Cancel the active run. Returns whether one was active.
    pub fn stop(&mut self) -> bool {
        if self.state != DriverState::Running {
            return false;
        }
        debug!(completed = self.completed, remaining = self.remaining, "run stopped");
        self.state = DriverState::Idle;
        self.remaining = 0;
        true
    }

    #[inline]
    pub fn state(&self) -> DriverState {
        self.state
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state == DriverState::Running
    }

    /// Ticks left in the active run.
    #[inline]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Ticks executed by the current (or last) run.
    #[inline]
    pub fn completed(&self) -> u32 {
        self.completed
    }

    #[inline]
    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    #[cfg(feature = "std")]
    pub fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.interval_ms as u64)
    }

    /// Energy reported by the most recent tick.
    pub fn last_energy(&self) -> Option<f32> {
        self.last_energy
    }

    /// Advance the active run by one step.
    ///
    /// Returns `None` when idle. A network with no units ends the run.
    pub fn tick<R: IndexSource>(&mut self, net: &mut Network<R>) -> Option<Tick> {
        if self.state != DriverState::Running {
            return None;
        }

        let Some(report) = net.step() else {
            self.stop();
            return None;
        };
        let energy = net.energy();

        self.remaining = self.remaining.saturating_sub(1);
        self.completed += 1;
        self.last_energy = Some(energy);

        let finished = self.remaining == 0;
        if finished {
            self.state = DriverState::Idle;
            debug!(steps = self.completed, energy, "run finished");
        }

        Some(Tick {
            index: self.completed,
            report,
            energy,
            finished,
        })
    }

    /// Drain the active run synchronously, handing every tick to `observer`.
    ///
    /// Returns the number of ticks executed.
    pub fn run_to_completion<R, F>(&mut self, net: &mut Network<R>, mut observer: F) -> u32
    where
        R: IndexSource,
        F: FnMut(&Tick),
    {
        let mut ticks = 0;
        while let Some(tick) = self.tick(net) {
            observer(&tick);
            ticks += 1;
        }
        ticks
    }
}
