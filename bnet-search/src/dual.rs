//! # GeneNetDual - Two Developmental Contexts
//!
//! A genome is developed from two fixed initial states:
//!
//! - **posterior**: every gene off (`0`)
//! - **anterior**: only gene 0 on (`1 << (N-1)`)
//!
//! Each context should settle on its own target state. The score of one
//! context is 1 for a point attractor on the target and 0 for any other
//! point attractor. A limit cycle of length `L` scores
//! `Π_j m_j / L^N`, where `m_j` counts the cycle states whose bit `j`
//! matches the target; long cycles are penalised steeply.
//!
//! The fitness of a genome is the product of both context scores.

use rand::Rng;

use bnet_core::config::SearchConfig;
use bnet_core::{BnetResult, Fitness, GeneNet, Genome, Genosection, State};

use crate::climber::{HillClimber, SearchOutcome};

/// Dual-context fitness for `N`-gene, `K`-input networks
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GeneNetDual<const N: usize, const K: usize> {
    net: GeneNet<N, K>,
    target_ant: State,
    target_pos: State,
}

impl<const N: usize, const K: usize> GeneNetDual<N, K> {
    /// Posterior initial state: all genes off
    pub const INITIAL_POS: State = 0;

    /// Anterior initial state: gene 0 on
    pub const INITIAL_ANT: State = 1 << (N - 1);

    /// Fixed wiring, with targets masked to `N` bits
    pub fn new(target_ant: State, target_pos: State) -> Self {
        Self::with_net(GeneNet::new(), target_ant, target_pos)
    }

    /// Develop under the wiring of `net`
    pub fn with_net(net: GeneNet<N, K>, target_ant: State, target_pos: State) -> Self {
        Self {
            net,
            target_ant: target_ant & GeneNet::<N, K>::STATE_MASK,
            target_pos: target_pos & GeneNet::<N, K>::STATE_MASK,
        }
    }

    /// Like [`GeneNetDual::with_net`], but targets wider than `N` bits are an error
    pub fn try_with_net(net: GeneNet<N, K>, target_ant: State, target_pos: State) -> BnetResult<Self> {
        Ok(Self {
            net,
            target_ant: GeneNet::<N, K>::check_state(target_ant)?,
            target_pos: GeneNet::<N, K>::check_state(target_pos)?,
        })
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(config.target_ant, config.target_pos)
    }

    #[inline]
    pub fn net(&self) -> &GeneNet<N, K> {
        &self.net
    }

    #[inline]
    pub fn target_ant(&self) -> State {
        self.target_ant
    }

    #[inline]
    pub fn target_pos(&self) -> State {
        self.target_pos
    }

    /// Score the attractor reached from `initial` against `target`
    pub fn evaluate_one<T: Genosection>(
        &self,
        genome: &Genome<T, N, K>,
        initial: State,
        target: State,
    ) -> f64 {
        let attractor = self.net.attractor_from(genome, initial);

        if attractor.is_point() {
            return if attractor.cycle[0] == target { 1.0 } else { 0.0 };
        }

        let mut matches = [0u32; N];
        for &s in &attractor.cycle {
            let agree = !(s ^ target);
            for (j, m) in matches.iter_mut().enumerate() {
                *m += ((agree >> j) & 1) as u32;
            }
        }

        let product: f64 = matches.iter().map(|&m| m as f64).product();
        product / (attractor.len() as f64).powi(N as i32)
    }

    /// Product of the anterior and posterior scores, in [0, 1]
    pub fn evaluate_fitness<T: Genosection>(&self, genome: &Genome<T, N, K>) -> f64 {
        self.evaluate_one(genome, Self::INITIAL_ANT, self.target_ant)
            * self.evaluate_one(genome, Self::INITIAL_POS, self.target_pos)
    }

    /// Hill-climb from a random genome until fitness 1.0 or the budget runs out
    pub fn evolve_new_genome<T: Genosection, R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        p: f64,
        max_generations: u64,
    ) -> SearchOutcome<T, N, K> {
        HillClimber::new(p, max_generations).run(self, rng)
    }
}

impl<T: Genosection, const N: usize, const K: usize> Fitness<T, N, K> for GeneNetDual<N, K> {
    fn fitness(&self, genome: &Genome<T, N, K>) -> f64 {
        self.evaluate_fitness(genome)
    }
}
