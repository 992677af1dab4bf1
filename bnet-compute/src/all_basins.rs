//! # AllBasins - Partitioning the State Space
//!
//! For one genome, every one of the `2^N` states is classified into the
//! basin of the attractor its trajectory ends in.
//!
//! ## Discovery
//!
//! 1. Take the next state not yet owned by a completed basin.
//! 2. Walk forward, recording each state with its child and parent,
//!    until the walk either repeats a state of its own (a new attractor
//!    closes) or steps onto a state owned by a completed basin.
//! 3. A closed walk is committed: merged into the completed basin with
//!    the identical limit cycle, or appended as a new basin. A walk that
//!    ran into a completed basin is handed off to it directly.
//!
//! `update_par` traces every start state in parallel with Rayon, without
//! the hand-off, and commits the traces serially in start order. Both
//! strategies produce the same partition.

use std::collections::BTreeSet;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use bnet_core::{GeneNet, Genome, Genosection, State, StateSet};

use crate::basin::{BasinOfAttraction, Endpoint};

/// Outcome of a single walk
enum Walk {
    /// The walk repeated one of its own states
    Closed(BasinOfAttraction),
    /// The walk stepped from `from` onto `into`, owned by basin `basin`
    Joined {
        trace: BasinOfAttraction,
        basin: usize,
        from: State,
        into: State,
    },
}

/// Summary of a basin analysis
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BasinStats {
    pub num_basins: usize,
    pub point_attractors: usize,
    pub limit_cycles: usize,
    pub mean_attractor_length: f64,
    pub max_attractor_length: usize,
    pub largest_basin: usize,
    pub attractor_sizes: Vec<usize>,
    pub basin_sizes: Vec<usize>,
}

/// Every basin of attraction of one genome
#[derive(Clone, Debug)]
pub struct AllBasins<T: Genosection, const N: usize, const K: usize> {
    genome: Genome<T, N, K>,
    net: GeneNet<N, K>,
    basins: Vec<BasinOfAttraction>,

    /// Basin index of each state
    owner: Vec<Option<usize>>,

    /// `state << 16 | child` for every transition
    transitions: BTreeSet<u32>,

    attractor_sizes: Vec<usize>,
}

impl<T: Genosection, const N: usize, const K: usize> AllBasins<T, N, K> {
    const NUM_STATES: usize = 1 << N;

    /// Analyse `genome` under the fixed wiring
    pub fn new(genome: Genome<T, N, K>) -> Self {
        Self::with_net(genome, GeneNet::new())
    }

    /// Analyse `genome` under the wiring of `net`
    pub fn with_net(genome: Genome<T, N, K>, net: GeneNet<N, K>) -> Self {
        let mut all = Self {
            genome,
            net,
            basins: Vec::new(),
            owner: vec![None; Self::NUM_STATES],
            transitions: BTreeSet::new(),
            attractor_sizes: Vec::new(),
        };
        all.update();
        all
    }

    #[inline]
    pub fn genome(&self) -> &Genome<T, N, K> {
        &self.genome
    }

    /// Replace the genome and recompute every basin
    pub fn set_genome(&mut self, genome: Genome<T, N, K>) {
        self.genome = genome;
        self.update();
    }

    /// Recompute all basins, one walk at a time
    pub fn update(&mut self) {
        self.reset();
        for s in 0..Self::NUM_STATES {
            if self.owner[s].is_some() {
                continue;
            }
            match Self::walk(&self.net, &self.genome, s as State, &self.owner) {
                Walk::Closed(trace) => {
                    self.commit(trace);
                }
                Walk::Joined {
                    trace,
                    basin,
                    from,
                    into,
                } => {
                    tracing::trace!(start = s, basin, "walk joined completed basin");
                    self.basins[basin].add_parent(into, from);
                    self.absorb(basin, trace);
                }
            }
        }
        self.finish();
    }

    /// Recompute all basins, tracing every start state in parallel
    pub fn update_par(&mut self) {
        let unowned: Vec<Option<usize>> = vec![None; Self::NUM_STATES];
        let net = &self.net;
        let genome = &self.genome;
        let traces: Vec<BasinOfAttraction> = (0..Self::NUM_STATES)
            .into_par_iter()
            .map(|s| match Self::walk(net, genome, s as State, &unowned) {
                Walk::Closed(trace) => trace,
                Walk::Joined { .. } => unreachable!("no state is owned while tracing in parallel"),
            })
            .collect();

        self.reset();
        for trace in traces {
            self.commit(trace);
        }
        self.finish();
    }

    /// Walk from `start` until a state repeats or an owned state is hit
    fn walk(
        net: &GeneNet<N, K>,
        genome: &Genome<T, N, K>,
        start: State,
        owner: &[Option<usize>],
    ) -> Walk {
        let mut trace = BasinOfAttraction::new(Self::NUM_STATES);
        let mut prev: Option<State> = None;
        let mut st = start;

        loop {
            let next = net.next_state(genome, st);
            trace.insert(st, next, prev);

            if trace.contains(next) {
                trace.add_parent(next, st);
                trace.classify(next, st);
                return Walk::Closed(trace);
            }
            if let Some(basin) = owner[next as usize] {
                return Walk::Joined {
                    trace,
                    basin,
                    from: st,
                    into: next,
                };
            }

            prev = Some(st);
            st = next;
        }
    }

    /// Merge a closed trace into the basin with the same cycle, or append it
    fn commit(&mut self, trace: BasinOfAttraction) -> usize {
        match self.find_cycle(trace.limit_cycle()) {
            Some(index) => {
                self.absorb(index, trace);
                index
            }
            None => {
                let index = self.basins.len();
                tracing::debug!(
                    basin = index,
                    endpoint = ?trace.endpoint(),
                    cycle = ?trace.limit_cycle(),
                    "new attractor"
                );
                for s in trace.members().iter() {
                    self.owner[s as usize] = Some(index);
                }
                self.basins.push(trace);
                index
            }
        }
    }

    fn absorb(&mut self, index: usize, trace: BasinOfAttraction) {
        for s in trace.members().iter() {
            self.owner[s as usize] = Some(index);
        }
        self.basins[index].merge(trace);
    }

    fn reset(&mut self) {
        self.basins.clear();
        self.owner.iter_mut().for_each(|o| *o = None);
        self.transitions.clear();
        self.attractor_sizes.clear();
    }

    fn finish(&mut self) {
        self.transitions = self
            .basins
            .iter()
            .flat_map(|b| b.nodes())
            .map(|n| ((n.state as u32) << 16) | n.child as u32)
            .collect();
        self.attractor_sizes = self.basins.iter().map(|b| b.attractor_len()).collect();

        tracing::debug!(
            basins = self.basins.len(),
            mean_attractor = self.mean_attractor_length(),
            "basin analysis complete"
        );
    }

    /// Index of the basin containing `state`
    #[inline]
    pub fn find(&self, state: State) -> Option<usize> {
        self.owner.get(state as usize).copied().flatten()
    }

    /// Index of the basin whose limit cycle is exactly `cycle`
    pub fn find_cycle(&self, cycle: &StateSet) -> Option<usize> {
        self.basins.iter().position(|b| b.limit_cycle() == cycle)
    }

    #[inline]
    pub fn basins(&self) -> &[BasinOfAttraction] {
        &self.basins
    }

    #[inline]
    pub fn num_basins(&self) -> usize {
        self.basins.len()
    }

    /// Every `state -> child` transition, keyed as `state << 16 | child`
    #[inline]
    pub fn transitions(&self) -> &BTreeSet<u32> {
        &self.transitions
    }

    /// Attractor size of each basin
    #[inline]
    pub fn attractor_sizes(&self) -> &[usize] {
        &self.attractor_sizes
    }

    pub fn mean_attractor_length(&self) -> f64 {
        if self.attractor_sizes.is_empty() {
            return 0.0;
        }
        self.attractor_sizes.iter().sum::<usize>() as f64 / self.attractor_sizes.len() as f64
    }

    pub fn max_attractor_length(&self) -> usize {
        self.attractor_sizes.iter().copied().max().unwrap_or(0)
    }

    pub fn point_attractor_count(&self) -> usize {
        self.count_endpoints(Endpoint::Point)
    }

    pub fn limit_cycle_count(&self) -> usize {
        self.count_endpoints(Endpoint::Limit)
    }

    /// States in the biggest basin
    pub fn largest_basin_size(&self) -> usize {
        self.basins.iter().map(|b| b.len()).max().unwrap_or(0)
    }

    pub fn stats(&self) -> BasinStats {
        BasinStats {
            num_basins: self.basins.len(),
            point_attractors: self.point_attractor_count(),
            limit_cycles: self.limit_cycle_count(),
            mean_attractor_length: self.mean_attractor_length(),
            max_attractor_length: self.max_attractor_length(),
            largest_basin: self.largest_basin_size(),
            attractor_sizes: self.attractor_sizes.clone(),
            basin_sizes: self.basins.iter().map(|b| b.len()).collect(),
        }
    }

    fn count_endpoints(&self, endpoint: Endpoint) -> usize {
        self.basins.iter().filter(|b| b.endpoint() == endpoint).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn selected_genome() -> Genome<u32, 5, 5> {
        Genome::from_sections([0x8875517a, 0x5c1e87e1, 0x8eef99d4, 0x1a3c467f, 0xdf7235c6])
    }

    /// Coverage, disjointness, closure under development and exact parent sets
    fn assert_partition<T: Genosection, const N: usize, const K: usize>(all: &AllBasins<T, N, K>) {
        let net = GeneNet::<N, K>::new();
        let num_states = 1usize << N;

        let mut covered = StateSet::new();
        for (i, a) in all.basins().iter().enumerate() {
            assert!(covered.is_disjoint(a.members()));
            covered.union_with(a.members());
            for b in &all.basins()[i + 1..] {
                assert_ne!(a.limit_cycle(), b.limit_cycle());
            }
            assert!(!a.limit_cycle().is_empty());
        }
        assert_eq!(covered.len(), num_states);

        for s in 0..num_states {
            let s = s as State;
            let index = all.find(s).unwrap();
            let basin = &all.basins()[index];
            let node = basin.node(s).unwrap();
            let child = net.next_state(all.genome(), s);
            assert_eq!(node.child, child);
            assert!(basin.contains(child));
            assert!(basin.node(child).unwrap().parents.contains(s));
        }
        assert_eq!(all.transitions().len(), num_states);
    }

    #[test]
    fn test_constant_genome_single_point_basin() {
        let all = AllBasins::new(Genome::<u8, 3, 3>::new());
        assert_eq!(all.num_basins(), 1);

        let basin = &all.basins()[0];
        assert_eq!(basin.endpoint(), Endpoint::Point);
        assert_eq!(basin.limit_cycle(), &StateSet::single(0));
        assert_eq!(basin.len(), 8);
        assert_eq!(basin.node(0).unwrap().parents.len(), 8);
        assert_eq!(basin.sources().len(), 7);
        assert_eq!(all.attractor_sizes(), &[1]);
        assert_partition(&all);
    }

    #[test]
    fn test_identity_network_every_state_a_point() {
        // Each gene copies its own bit, which is the top bit of its row
        let all = AllBasins::new(Genome::<u8, 3, 3>::from_sections([0xf0; 3]));
        assert_eq!(all.num_basins(), 8);
        assert_eq!(all.point_attractor_count(), 8);
        assert_eq!(all.mean_attractor_length(), 1.0);
        assert_partition(&all);
    }

    #[test]
    fn test_negating_network_two_cycles() {
        // Each gene negates its own bit: s -> !s
        let all = AllBasins::new(Genome::<u8, 3, 3>::from_sections([0x0f; 3]));
        assert_eq!(all.num_basins(), 4);
        assert_eq!(all.limit_cycle_count(), 4);
        assert_eq!(all.max_attractor_length(), 2);
        let basin = &all.basins()[all.find(2).unwrap()];
        assert_eq!(basin.cycle_order(), &[2, 5]);
        assert_partition(&all);
    }

    #[test]
    fn test_point_attractor_self_loop() {
        let mut rng = StdRng::seed_from_u64(21);
        let net = GeneNet::<5, 5>::new();
        for _ in 0..30 {
            let all = AllBasins::new(Genome::<u32, 5, 5>::random(&mut rng));
            for s in 0..32u8 {
                if net.next_state(all.genome(), s) == s {
                    let basin = &all.basins()[all.find(s).unwrap()];
                    assert_eq!(basin.endpoint(), Endpoint::Point);
                    assert_eq!(basin.limit_cycle(), &StateSet::single(s));
                }
            }
        }
    }

    #[test]
    fn test_selected_genome_basins() {
        let all = AllBasins::new(selected_genome());
        let pos = all.find(0x0a).unwrap();
        let ant = all.find(0x15).unwrap();
        assert_ne!(pos, ant);
        assert_eq!(all.find(0x00), Some(pos));
        assert_eq!(all.find(0x10), Some(ant));
        assert_eq!(all.basins()[pos].endpoint(), Endpoint::Point);
        assert_eq!(all.find_cycle(&StateSet::single(0x15)), Some(ant));
        assert_partition(&all);
    }

    #[test]
    fn test_partition_random_genomes() {
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..40 {
            assert_partition(&AllBasins::new(Genome::<u32, 5, 5>::random(&mut rng)));
            assert_partition(&AllBasins::new(Genome::<u16, 5, 4>::random(&mut rng)));
            assert_partition(&AllBasins::new(Genome::<u16, 4, 4>::random(&mut rng)));
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..20 {
            let mut all = AllBasins::new(Genome::<u32, 5, 5>::random(&mut rng));
            let sequential = all.basins().to_vec();
            let transitions = all.transitions().clone();
            all.update_par();
            assert_eq!(all.basins(), &sequential[..]);
            assert_eq!(all.transitions(), &transitions);
        }

        let mut all = AllBasins::new(Genome::<u128, 8, 7>::random(&mut rng));
        let sequential = all.basins().to_vec();
        all.update_par();
        assert_eq!(all.basins(), &sequential[..]);
        assert_partition(&all);
    }

    #[test]
    fn test_transition_keys() {
        // s -> !s
        let all = AllBasins::new(Genome::<u8, 3, 3>::from_sections([0x0f; 3]));
        let expected: BTreeSet<u32> = (0..8u32).map(|s| (s << 16) | (!s & 0b111)).collect();
        assert_eq!(all.transitions(), &expected);

        let all = AllBasins::new(Genome::<u8, 3, 3>::new());
        let expected: BTreeSet<u32> = (0..8u32).map(|s| s << 16).collect();
        assert_eq!(all.transitions(), &expected);
        assert!(all.transitions().contains(&(7 << 16)));
    }

    #[test]
    fn test_set_genome_recomputes() {
        let mut all = AllBasins::new(Genome::<u8, 3, 3>::new());
        assert_eq!(all.num_basins(), 1);
        all.set_genome(Genome::from_sections([0xf0; 3]));
        assert_eq!(all.num_basins(), 8);
    }

    #[test]
    fn test_stats() {
        let all = AllBasins::new(Genome::<u8, 3, 3>::from_sections([0x0f; 3]));
        let stats = all.stats();
        assert_eq!(stats.num_basins, 4);
        assert_eq!(stats.limit_cycles, 4);
        assert_eq!(stats.point_attractors, 0);
        assert_eq!(stats.basin_sizes, vec![2, 2, 2, 2]);
        assert_eq!(stats.largest_basin, 2);
    }
}
