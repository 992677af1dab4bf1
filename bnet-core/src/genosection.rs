//! # Genosections
//!
//! A genosection is one gene's truth table, stored in the low `2^K` bits
//! of an unsigned integer. The integer type is chosen per network so that
//! small networks stay small: a 3-input gene fits in a `u8`, a 5-input gene
//! needs a `u32`, and 7 inputs need a `u128`.

use std::fmt::{Binary, Debug, LowerHex};
use std::hash::Hash;

use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Unsigned integer able to hold one truth table
pub trait Genosection:
    Copy
    + Default
    + Eq
    + Hash
    + Debug
    + Binary
    + LowerHex
    + Send
    + Sync
    + Serialize
    + DeserializeOwned
    + 'static
{
    /// Width of the integer in bits
    const BITS: u32;

    /// All-zero table
    const ZERO: Self;

    /// Mask selecting the low `2^k` (significant) bits
    fn table_mask(k: usize) -> Self;

    /// Read bit `row`
    fn bit(self, row: usize) -> bool;

    /// Flip bit `row`
    fn flip(&mut self, row: usize);

    fn and(self, other: Self) -> Self;

    fn xor(self, other: Self) -> Self;

    fn count_ones(self) -> u32;

    /// Uniform random value over the full width
    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self;

    /// Widen to `u128`, the largest supported table
    fn to_u128(self) -> u128;

    /// Truncating conversion from `u128`
    fn from_u128(v: u128) -> Self;
}

macro_rules! impl_genosection {
    ($($t:ty),*) => {
        $(
            impl Genosection for $t {
                const BITS: u32 = <$t>::BITS;
                const ZERO: Self = 0;

                #[inline]
                fn table_mask(k: usize) -> Self {
                    let width = 1u32 << k;
                    if width >= Self::BITS {
                        <$t>::MAX
                    } else {
                        ((1 as $t) << width) - 1
                    }
                }

                #[inline]
                fn bit(self, row: usize) -> bool {
                    (self >> row) & 1 == 1
                }

                #[inline]
                fn flip(&mut self, row: usize) {
                    *self ^= (1 as $t) << row;
                }

                #[inline]
                fn and(self, other: Self) -> Self {
                    self & other
                }

                #[inline]
                fn xor(self, other: Self) -> Self {
                    self ^ other
                }

                #[inline]
                fn count_ones(self) -> u32 {
                    <$t>::count_ones(self)
                }

                fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
                    rng.gen()
                }

                #[inline]
                fn to_u128(self) -> u128 {
                    self as u128
                }

                #[inline]
                fn from_u128(v: u128) -> Self {
                    v as $t
                }
            }
        )*
    };
}

impl_genosection!(u8, u16, u32, u64, u128);
