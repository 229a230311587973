//! Newline-delimited JSON protocol spoken by `hopfieldd` and `hopfield-cli`.
//!
//! One request per line, one response per line. Both enums are tagged by a
//! `"type"` field, e.g. `{"type":"Resize","rows":3,"cols":4}`.

use serde::{Deserialize, Serialize};

use crate::observer::NetworkSnapshot;
use crate::weights::LearningMode;

pub const DEFAULT_ADDR: &str = "127.0.0.1:9877";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    GetState,
    ListPatterns,
    Train {
        pattern: Vec<bool>,
    },
    SetState {
        pattern: Vec<bool>,
    },
    RecallPattern {
        index: usize,
    },
    /// Manual steps; refused while a run is active.
    Step {
        count: u32,
    },
    Run {
        #[serde(default)]
        max_steps: Option<u32>,
        #[serde(default)]
        interval_ms: Option<u32>,
    },
    Stop,
    SetMode {
        mode: LearningMode,
    },
    Resize {
        rows: usize,
        cols: usize,
    },
    Shutdown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    State(StateSnapshot),
    Patterns {
        rows: usize,
        cols: usize,
        patterns: Vec<Vec<bool>>,
    },
    Success {
        message: String,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub running: bool,
    pub remaining_steps: u32,
    pub interval_ms: u32,
    #[serde(default)]
    pub last_energy: Option<f32>,
    pub network: NetworkSnapshot,
}

/// Parse a bit string such as `"1010"` or `"#.#."`.
///
/// `1`, `#`, `x`, `X` and `*` are on; `0`, `.`, `-` and `_` are off.
/// Whitespace and `/` row separators are skipped. Any other character
/// rejects the whole string.
pub fn parse_bits(s: &str) -> Option<Vec<bool>> {
    let mut bits = Vec::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '1' | '#' | 'x' | 'X' | '*' => bits.push(true),
            '0' | '.' | '-' | '_' => bits.push(false),
            '/' => {}
            c if c.is_whitespace() => {}
            _ => return None,
        }
    }
    Some(bits)
}

/// Render bits as `#`/`.` rows of `cols` cells.
pub fn format_bits(bits: &[bool], cols: usize) -> String {
    let cols = cols.max(1);
    let mut out = String::with_capacity(bits.len() + bits.len() / cols + 1);
    for (i, &b) in bits.iter().enumerate() {
        out.push(if b { '#' } else { '.' });
        if (i + 1) % cols == 0 && i + 1 < bits.len() {
            out.push('\n');
        }
    }
    out
}
