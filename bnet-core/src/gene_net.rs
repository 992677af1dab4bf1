//! # GeneNet - Boolean Network Dynamics
//!
//! A `GeneNet` holds one N-bit state and develops it under a genome.
//!
//! ## Wiring
//!
//! Which `K` of the `N` state bits gene `i` can see is decided by the
//! [`Wiring`]:
//!
//! - `Fixed`: gene `i` reads the state rotated left by `i`, keeping the
//!   low `K` bits. With `K == N` every gene sees the whole state (the
//!   "grand ensemble"); with `K < N` gene `i` ignores a contiguous window
//!   of `N-K` bits, which for `K == N-1` is its own output bit.
//! - `Random`: each gene gets `K` distinct state bits, drawn once.
//!
//! ## Development
//!
//! `develop` is synchronous: every gene computes its output from the
//! current state and the new state is assigned in one go. `develop_async`
//! updates a single randomly chosen gene.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{BnetError, BnetResult};
use crate::genome::Genome;
use crate::genosection::Genosection;
use crate::state::{rotate_left, state_bits, state_mask, State};
use crate::MAX_GENES;

/// Rule selecting the inputs of each gene
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wiring<const N: usize, const K: usize> {
    /// Rotation by gene index, masked to `K` bits
    Fixed,
    /// `table[i][b]` is the state bit feeding input bit `b` of gene `i`
    Random([[u8; K]; N]),
}

/// Shape of an attractor
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttractorKind {
    /// A state that develops into itself
    Point,
    /// Two or more states visited in a fixed cyclic order
    Limit,
}

/// End point of one trajectory
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attractor {
    pub kind: AttractorKind,

    /// Attractor states in visiting order, starting where the trajectory
    /// first entered the attractor
    pub cycle: Vec<State>,

    /// Steps taken before entering the attractor
    pub transient: usize,
}

impl Attractor {
    #[inline]
    pub fn is_point(&self) -> bool {
        self.kind == AttractorKind::Point
    }

    /// Number of states in the attractor
    #[inline]
    pub fn len(&self) -> usize {
        self.cycle.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cycle.is_empty()
    }

    pub fn contains(&self, s: State) -> bool {
        self.cycle.contains(&s)
    }
}

/// Synchronous/asynchronous Boolean gene network of `N` genes, `K` inputs each
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GeneNet<const N: usize, const K: usize> {
    state: State,
    wiring: Wiring<N, K>,
}

impl<const N: usize, const K: usize> GeneNet<N, K> {
    const VALID: () = {
        assert!(N >= 1 && N <= MAX_GENES, "gene count N must be in 1..=8");
        assert!(K >= 1 && K <= N, "inputs per gene K must be in 1..=N");
    };

    /// Mask of the `N` state bits
    pub const STATE_MASK: State = state_mask(N);

    /// Mask of the `K` input bits
    pub const INPUT_MASK: State = state_mask(K);

    /// Number of states of the network
    pub const NUM_STATES: usize = 1 << N;

    /// Create a network with fixed wiring in state 0
    pub fn new() -> Self {
        let () = Self::VALID;
        Self {
            state: 0,
            wiring: Wiring::Fixed,
        }
    }

    /// Create a network with fixed wiring in the given state
    pub fn with_state(state: State) -> Self {
        let mut net = Self::new();
        net.set_state(state);
        net
    }

    /// Create a network whose genes read `K` distinct, randomly chosen bits
    pub fn with_random_wiring<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut table = [[0u8; K]; N];
        for inputs in &mut table {
            let picks = rand::seq::index::sample(rng, N, K);
            for (slot, bit) in inputs.iter_mut().zip(picks.iter()) {
                *slot = bit as u8;
            }
        }
        Self {
            wiring: Wiring::Random(table),
            ..Self::new()
        }
    }

    #[inline]
    pub fn state(&self) -> State {
        self.state
    }

    /// Set the state, dropping bits above `N`
    #[inline]
    pub fn set_state(&mut self, state: State) {
        self.state = state & Self::STATE_MASK;
    }

    /// Set the state, rejecting bits above `N`
    pub fn try_set_state(&mut self, state: State) -> BnetResult<()> {
        self.state = Self::check_state(state)?;
        Ok(())
    }

    /// `state` unchanged if it fits in `N` bits
    pub fn check_state(state: State) -> BnetResult<State> {
        if state & !Self::STATE_MASK != 0 {
            return Err(BnetError::invalid_state(format!(
                "{:#04x} does not fit in {} genes",
                state, N
            )));
        }
        Ok(state)
    }

    #[inline]
    pub fn wiring(&self) -> &Wiring<N, K> {
        &self.wiring
    }

    /// Input row of `gene` when the network is in state `s`
    #[inline]
    pub fn input_row(&self, s: State, gene: usize) -> usize {
        match &self.wiring {
            Wiring::Fixed => (rotate_left(s, gene, N) & Self::INPUT_MASK) as usize,
            Wiring::Random(table) => table[gene]
                .iter()
                .enumerate()
                .map(|(b, &src)| (((s >> src) & 1) as usize) << b)
                .sum(),
        }
    }

    /// Every gene's input row for the current state
    pub fn setup_inputs(&self) -> [State; N] {
        std::array::from_fn(|gene| self.input_row(self.state, gene) as State)
    }

    /// Successor of `s` under synchronous update; does not touch `self.state`
    #[inline]
    pub fn next_state<T: Genosection>(&self, genome: &Genome<T, N, K>, s: State) -> State {
        let mut next: State = 0;
        for gene in 0..N {
            if genome.bit(gene, self.input_row(s, gene)) {
                next |= Self::gene_bit(gene);
            }
        }
        next
    }

    /// Synchronous update of all genes
    pub fn develop<T: Genosection>(&mut self, genome: &Genome<T, N, K>) {
        self.state = self.next_state(genome, self.state);
    }

    /// Update one uniformly chosen gene, leaving the others as they are
    pub fn develop_async<T: Genosection, R: Rng + ?Sized>(
        &mut self,
        genome: &Genome<T, N, K>,
        rng: &mut R,
    ) {
        let gene = rng.gen_range(0..N);
        let bit = Self::gene_bit(gene);
        if genome.bit(gene, self.input_row(self.state, gene)) {
            self.state |= bit;
        } else {
            self.state &= !bit;
        }
    }

    /// Number of bits in which the state differs from `target`
    #[inline]
    pub fn hamming(&self, target: State) -> u32 {
        ((self.state ^ target) & Self::STATE_MASK).count_ones()
    }

    /// Follow the synchronous trajectory from `start` until it repeats
    ///
    /// At most `2^N` distinct states exist, so this returns within
    /// `2^N + 1` steps.
    pub fn attractor_from<T: Genosection>(&self, genome: &Genome<T, N, K>, start: State) -> Attractor {
        let mut first_seen = [usize::MAX; 256];
        let mut path: Vec<State> = Vec::with_capacity(Self::NUM_STATES);
        let mut st = start & Self::STATE_MASK;

        while first_seen[st as usize] == usize::MAX {
            first_seen[st as usize] = path.len();
            path.push(st);
            st = self.next_state(genome, st);
        }

        let transient = first_seen[st as usize];
        let cycle = path.split_off(transient);
        let kind = if cycle.len() == 1 {
            AttractorKind::Point
        } else {
            AttractorKind::Limit
        };

        Attractor {
            kind,
            cycle,
            transient,
        }
    }

    /// Current state as a binary string, gene 0 first
    pub fn state_string(&self) -> String {
        state_bits(self.state, N)
    }

    /// State bit driven by `gene`
    #[inline]
    const fn gene_bit(gene: usize) -> State {
        1 << (N - 1 - gene)
    }
}

impl<const N: usize, const K: usize> Default for GeneNet<N, K> {
    fn default() -> Self {
        Self::new()
    }
}
