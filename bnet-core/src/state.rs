//! # States and State Sets
//!
//! A network state is an unsigned byte; only the low `N` bits are used.
//! There is no in-band "unset" value: code that needs one uses
//! `Option<State>`, so all 8 bits remain available for `N = 8`.
//!
//! [`StateSet`] is a 256-bit dense set, big enough for every state of
//! every supported network. Parent sets, limit cycles and basin
//! membership are all `StateSet`s.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One network state (low `N` bits significant)
pub type State = u8;

/// Mask selecting the low `n` bits of a state
#[inline]
pub const fn state_mask(n: usize) -> State {
    if n >= 8 {
        State::MAX
    } else {
        ((1u16 << n) - 1) as State
    }
}

/// Rotate the low `n` bits of `s` left by `by` places
#[inline]
pub const fn rotate_left(s: State, by: usize, n: usize) -> State {
    let by = by % n;
    if by == 0 {
        return s & state_mask(n);
    }
    let s = s as u16 & state_mask(n) as u16;
    (((s << by) | (s >> (n - by))) & state_mask(n) as u16) as State
}

/// Render the low `n` bits of a state, most significant (gene 0) first
pub fn state_bits(s: State, n: usize) -> String {
    (0..n)
        .rev()
        .map(|b| if (s >> b) & 1 == 1 { '1' } else { '0' })
        .collect()
}

/// Dense set of states
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateSet {
    words: [u64; 4],
}

impl StateSet {
    /// Create an empty set
    pub const fn new() -> Self {
        Self { words: [0; 4] }
    }

    /// A set holding a single state
    pub fn single(s: State) -> Self {
        let mut set = Self::new();
        set.insert(s);
        set
    }

    /// Insert a state; returns true if it was not already present
    #[inline]
    pub fn insert(&mut self, s: State) -> bool {
        let (w, b) = Self::slot(s);
        let fresh = self.words[w] & b == 0;
        self.words[w] |= b;
        fresh
    }

    /// Remove a state; returns true if it was present
    #[inline]
    pub fn remove(&mut self, s: State) -> bool {
        let (w, b) = Self::slot(s);
        let present = self.words[w] & b != 0;
        self.words[w] &= !b;
        present
    }

    #[inline]
    pub fn contains(&self, s: State) -> bool {
        let (w, b) = Self::slot(s);
        self.words[w] & b != 0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Add every state of `other` to this set
    pub fn union_with(&mut self, other: &StateSet) {
        for (a, b) in self.words.iter_mut().zip(other.words.iter()) {
            *a |= *b;
        }
    }

    pub fn is_disjoint(&self, other: &StateSet) -> bool {
        self.words
            .iter()
            .zip(other.words.iter())
            .all(|(a, b)| a & b == 0)
    }

    /// Smallest state in the set
    pub fn first(&self) -> Option<State> {
        self.iter().next()
    }

    /// Iterate the states in ascending order
    pub fn iter(&self) -> impl Iterator<Item = State> + '_ {
        (0..=State::MAX).filter(move |&s| self.contains(s))
    }

    #[inline]
    fn slot(s: State) -> (usize, u64) {
        ((s >> 6) as usize, 1u64 << (s & 63))
    }
}

impl FromIterator<State> for StateSet {
    fn from_iter<I: IntoIterator<Item = State>>(iter: I) -> Self {
        let mut set = Self::new();
        for s in iter {
            set.insert(s);
        }
        set
    }
}

impl fmt::Debug for StateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.iter().map(|s| format!("{:#04x}", s)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_mask() {
        assert_eq!(state_mask(3), 0b111);
        assert_eq!(state_mask(5), 0x1f);
        assert_eq!(state_mask(8), 0xff);
    }

    #[test]
    fn test_rotate_left() {
        // 5-bit rotations wrap within the low five bits
        assert_eq!(rotate_left(0b10000, 1, 5), 0b00001);
        assert_eq!(rotate_left(0b10110, 2, 5), 0b11010);
        assert_eq!(rotate_left(0b10110, 5, 5), 0b10110);
        assert_eq!(rotate_left(0x81, 1, 8), 0x03);
    }

    #[test]
    fn test_state_bits() {
        assert_eq!(state_bits(0x15, 5), "10101");
        assert_eq!(state_bits(0x0a, 5), "01010");
    }

    #[test]
    fn test_state_set() {
        let mut set = StateSet::new();
        assert!(set.is_empty());
        assert!(set.insert(0));
        assert!(set.insert(200));
        assert!(!set.insert(200));
        assert_eq!(set.len(), 2);
        assert!(set.contains(200));
        assert!(!set.contains(1));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![0, 200]);

        let other: StateSet = [1, 200].into_iter().collect();
        assert!(!set.is_disjoint(&other));
        set.union_with(&other);
        assert_eq!(set.len(), 3);
        assert!(set.remove(0));
        assert_eq!(set.first(), Some(1));
    }
}
