// Minimal PRNG (no external crates).
//
// This is NOT cryptographically secure.
// It only picks which unit updates next and, in assays, which bits get corrupted.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Source of unit indices for asynchronous updates.
///
/// The network asks for one index per step. Implementations must return a
/// value in `[0, n)` for any `n > 0`.
pub trait IndexSource {
    fn next_index(&mut self, n: usize) -> usize;
}

#[derive(Debug, Clone)]
pub struct Prng {
    state: u64,
}

impl Prng {
    pub fn new(seed: u64) -> Self {
        // Avoid a zero state.
        let seed = if seed == 0 { 0x9E3779B97F4A7C15 } else { seed };
        Self { state: seed }
    }

    /// Seed from the wall clock when no seed is configured.
    #[cfg(feature = "std")]
    pub fn from_entropy() -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(1);
        Self::new(nanos ^ 0xD1B54A32D192ED03)
    }

    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        // xorshift64*
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    #[inline]
    pub fn next_f32_01(&mut self) -> f32 {
        // Convert to [0,1).
        let x = self.next_u32();
        (x as f32) / (u32::MAX as f32 + 1.0)
    }

    #[inline]
    pub fn next_bool(&mut self) -> bool {
        self.next_u64() >> 63 == 1
    }

    #[inline]
    pub fn gen_range_usize(&mut self, low: usize, high: usize) -> usize {
        if high <= low {
            return low;
        }
        // Multiply-shift range reduction.
        let span = (high - low) as u64;
        let v = ((self.next_u32() as u64 * span) >> 32) as usize;
        low + v
    }
}

impl IndexSource for Prng {
    #[inline]
    fn next_index(&mut self, n: usize) -> usize {
        self.gen_range_usize(0, n)
    }
}

/// Replays a fixed sequence of indices, cycling when exhausted.
///
/// Lets tests and demos drive the update schedule deterministically.
/// Each index is reduced modulo the unit count it is asked for.
#[derive(Debug, Clone)]
pub struct ScriptedIndices {
    indices: Vec<usize>,
    cursor: usize,
}

impl ScriptedIndices {
    pub fn new(indices: Vec<usize>) -> Self {
        Self { indices, cursor: 0 }
    }
}

impl IndexSource for ScriptedIndices {
    fn next_index(&mut self, n: usize) -> usize {
        if self.indices.is_empty() || n == 0 {
            return 0;
        }
        let idx = self.indices[self.cursor % self.indices.len()];
        self.cursor = self.cursor.wrapping_add(1);
        idx % n
    }
}

impl<S: IndexSource + ?Sized> IndexSource for &mut S {
    #[inline]
    fn next_index(&mut self, n: usize) -> usize {
        (**self).next_index(n)
    }
}
