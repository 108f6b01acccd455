//! Fixed-width bit vector over solid bits.
//!
//! Partitions record every solid that contributed to them. Solid bits are
//! dense indices assigned in insertion order, so a flat word array indexed
//! by bit is enough.

use std::fmt;

use crate::soltab::SolidBit;

const WORDS: usize = 16;

/// Largest number of solids one model may hold.
pub const MAX_SOLIDS: usize = WORDS * 64;

/// Set of solids, one bit per [`SolidBit`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SolidBits([u64; WORDS]);

impl SolidBits {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set holding only `bit`.
    pub fn single(bit: SolidBit) -> Self {
        let mut bits = Self::new();
        bits.set(bit);
        bits
    }

    /// Add a solid.
    #[inline]
    pub fn set(&mut self, bit: SolidBit) {
        let i = bit.index();
        self.0[i / 64] |= 1 << (i % 64);
    }

    /// Is the solid in the set?
    #[inline]
    pub fn test(&self, bit: SolidBit) -> bool {
        let i = bit.index();
        self.0[i / 64] & (1 << (i % 64)) != 0
    }

    /// Union in place.
    pub fn union_with(&mut self, other: &SolidBits) {
        for (a, b) in self.0.iter_mut().zip(other.0.iter()) {
            *a |= b;
        }
    }

    /// Number of solids in the set.
    pub fn count(&self) -> usize {
        self.0.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// True when no bit is set.
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&w| w == 0)
    }

    /// Solids in increasing bit order.
    pub fn iter(&self) -> impl Iterator<Item = SolidBit> + '_ {
        self.0.iter().enumerate().flat_map(|(wi, &word)| {
            (0..64)
                .filter(move |b| word & (1 << b) != 0)
                .map(move |b| SolidBit::from_index(wi * 64 + b))
        })
    }
}

impl fmt::Debug for SolidBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(|b| b.index())).finish()
    }
}
