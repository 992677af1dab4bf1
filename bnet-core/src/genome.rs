//! # Genome - Truth Tables for Every Gene
//!
//! A genome is `N` genosections. Genosection `i` is gene `i`'s truth
//! table: bit `j` is the gene's output when its `K` inputs, read as an
//! unsigned row index, equal `j`.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │ sections [N × T]  - only the low 2^K bits of each T  │
//! │                     are significant                  │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! Every mutating operation masks the insignificant upper bits back to
//! zero, so two genomes that behave identically also compare equal.

use std::fmt;
use std::ops::Index;

use rand::Rng;
use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};

use crate::genosection::Genosection;
use crate::traits::ComplexityOracle;
use crate::MAX_GENES;

/// Bit-packed genome of `N` genes with `K` inputs each
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Genome<T: Genosection, const N: usize, const K: usize> {
    sections: [T; N],
}

impl<T: Genosection, const N: usize, const K: usize> Genome<T, N, K> {
    /// Compile-time parameter check, forced by every constructor
    const VALID: () = {
        assert!(N >= 1 && N <= MAX_GENES, "gene count N must be in 1..=8");
        assert!(K >= 1 && K <= N, "inputs per gene K must be in 1..=N");
        assert!(
            (1u32 << K) <= T::BITS,
            "genosection type is too narrow for 2^K truth-table bits"
        );
    };

    /// Rows in each truth table
    pub const ROWS: usize = 1 << K;

    /// Significant bits in the whole genome
    pub const SIGNIFICANT_BITS: usize = N * (1 << K);

    /// Create an all-zero genome (every gene constantly off)
    pub fn new() -> Self {
        let () = Self::VALID;
        Self {
            sections: [T::ZERO; N],
        }
    }

    /// Build a genome from raw truth tables
    pub fn from_sections(sections: [T; N]) -> Self {
        let () = Self::VALID;
        let mut genome = Self { sections };
        genome.mask();
        genome
    }

    /// Create a uniformly random genome
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut genome = Self::new();
        genome.randomize(rng);
        genome
    }

    /// Give every genosection a uniform random value
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for gs in &mut self.sections {
            *gs = T::random(rng);
        }
        self.mask();
    }

    /// Flip every significant bit independently with probability `p`
    ///
    /// `p` is clamped into [0, 1]; NaN counts as 0.
    pub fn mutate<R: Rng + ?Sized>(&mut self, rng: &mut R, p: f64) {
        let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
        if p == 0.0 {
            return;
        }
        for gs in &mut self.sections {
            for row in 0..Self::ROWS {
                if rng.gen_bool(p) {
                    gs.flip(row);
                }
            }
        }
        self.mask();
    }

    /// Same as [`Genome::mutate`]
    #[inline]
    pub fn evolve<R: Rng + ?Sized>(&mut self, rng: &mut R, p: f64) {
        self.mutate(rng, p);
    }

    /// Flip exactly `bits_to_flip` distinct significant bits
    ///
    /// Positions are sampled without replacement; the count saturates at
    /// [`Genome::SIGNIFICANT_BITS`].
    pub fn evolve_bits<R: Rng + ?Sized>(&mut self, rng: &mut R, bits_to_flip: usize) {
        let amount = bits_to_flip.min(Self::SIGNIFICANT_BITS);
        for pos in rand::seq::index::sample(rng, Self::SIGNIFICANT_BITS, amount).iter() {
            self.sections[pos / Self::ROWS].flip(pos % Self::ROWS);
        }
        self.mask();
    }

    /// Number of differing truth-table bits
    pub fn hamming(&self, other: &Self) -> u32 {
        self.sections
            .iter()
            .zip(other.sections.iter())
            .map(|(a, b)| a.xor(*b).count_ones())
            .sum()
    }

    /// Count the canalyzing (input bit, value) pairs of one truth table
    ///
    /// Input bit `i` fixed to `v` is canalyzing when every row with that
    /// bit value produces the same output. Result is in `0..=2K`.
    pub fn canalyzing_count(gs: T) -> u32 {
        let mut count = 0;
        for bit in 0..K {
            for value in [0usize, 1] {
                let mut outputs = (0..Self::ROWS)
                    .filter(|row| (row >> bit) & 1 == value)
                    .map(|row| gs.bit(row));
                if let Some(first) = outputs.next() {
                    if outputs.all(|o| o == first) {
                        count += 1;
                    }
                }
            }
        }
        count
    }

    /// Does any input value force this truth table's output?
    pub fn is_canalyzing(gs: T) -> bool {
        Self::canalyzing_count(gs) > 0
    }

    /// Canalyzing pairs over the whole genome, normalised to [0, 1]
    pub fn canalyzingness(&self) -> f64 {
        let total: u32 = self
            .sections
            .iter()
            .map(|&gs| Self::canalyzing_count(gs))
            .sum();
        total as f64 / (2 * N * K) as f64
    }

    /// Fraction of set bits among the `N * 2^K` significant bits
    pub fn bias(&self) -> f64 {
        let set: u32 = self.sections.iter().map(|gs| gs.count_ones()).sum();
        set as f64 / Self::SIGNIFICANT_BITS as f64
    }

    /// Mean complexity of the truth tables under an external oracle
    pub fn complexity<O: ComplexityOracle + ?Sized>(&self, oracle: &O) -> f64 {
        let sum: f64 = self
            .sections
            .iter()
            .map(|gs| oracle.complexity(gs.to_u128(), K))
            .sum();
        sum / N as f64
    }

    #[inline]
    pub fn sections(&self) -> &[T; N] {
        &self.sections
    }

    /// Truth table of gene `gene`
    #[inline]
    pub fn section(&self, gene: usize) -> T {
        self.sections[gene]
    }

    /// Replace the truth table of gene `gene`
    pub fn set_section(&mut self, gene: usize, gs: T) {
        self.sections[gene] = gs.and(T::table_mask(K));
    }

    /// Output of gene `gene` for input row `row`
    #[inline]
    pub fn bit(&self, gene: usize, row: usize) -> bool {
        debug_assert!(row < Self::ROWS);
        self.sections[gene].bit(row)
    }

    /// Flip one truth-table bit
    pub fn flip(&mut self, gene: usize, row: usize) {
        assert!(row < Self::ROWS, "row {} out of range for K={}", row, K);
        self.sections[gene].flip(row);
    }

    #[inline]
    fn mask(&mut self) {
        let mask = T::table_mask(K);
        for gs in &mut self.sections {
            *gs = gs.and(mask);
        }
    }
}

impl<T: Genosection, const N: usize, const K: usize> Default for Genome<T, N, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Genosection, const N: usize, const K: usize> Index<usize> for Genome<T, N, K> {
    type Output = T;

    fn index(&self, gene: usize) -> &T {
        &self.sections[gene]
    }
}

impl<T: Genosection, const N: usize, const K: usize> fmt::Display for Genome<T, N, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, gs) in self.sections.iter().enumerate() {
            writeln!(f, "gene {}: {:0width$b}", i, gs, width = Self::ROWS)?;
        }
        Ok(())
    }
}

// Serialized as a plain sequence of integers.
impl<T: Genosection, const N: usize, const K: usize> Serialize for Genome<T, N, K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.sections.iter())
    }
}

impl<'de, T: Genosection, const N: usize, const K: usize> Deserialize<'de> for Genome<T, N, K> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let sections: Vec<T> = Vec::deserialize(deserializer)?;
        let found = sections.len();
        let sections: [T; N] = sections.try_into().map_err(|_| {
            <D::Error as de::Error>::custom(format!(
                "expected {} genosections, found {}",
                N, found
            ))
        })?;
        Ok(Self::from_sections(sections))
    }
}
