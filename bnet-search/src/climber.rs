//! # Hill Climbing
//!
//! Strict greedy local search: one mutant per generation, accepted when
//! it is at least as fit as the current genome. Equal-fitness moves are
//! accepted so the search can drift across plateaus; worse moves never
//! are. No population, no crossover.
//!
//! Every search carries a generation budget and ends in a
//! [`SearchOutcome`], never in an endless loop.

use rand::Rng;
use serde::Serialize;

use bnet_core::config::SearchConfig;
use bnet_core::{BnetError, BnetResult, Fitness, Genome, Genosection};

/// How a bounded search ended
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum SearchOutcome<T: Genosection, const N: usize, const K: usize> {
    /// Target fitness reached
    Converged {
        genome: Genome<T, N, K>,
        fitness: f64,
        generations: u64,
    },
    /// Budget spent; best genome found so far
    Exhausted {
        best_genome: Genome<T, N, K>,
        best_fitness: f64,
        generations: u64,
    },
}

impl<T: Genosection, const N: usize, const K: usize> SearchOutcome<T, N, K> {
    #[inline]
    pub fn is_converged(&self) -> bool {
        matches!(self, Self::Converged { .. })
    }

    /// Final genome, converged or not
    pub fn genome(&self) -> &Genome<T, N, K> {
        match self {
            Self::Converged { genome, .. } => genome,
            Self::Exhausted { best_genome, .. } => best_genome,
        }
    }

    pub fn fitness(&self) -> f64 {
        match self {
            Self::Converged { fitness, .. } => *fitness,
            Self::Exhausted { best_fitness, .. } => *best_fitness,
        }
    }

    pub fn generations(&self) -> u64 {
        match self {
            Self::Converged { generations, .. } | Self::Exhausted { generations, .. } => *generations,
        }
    }

    /// The converged genome, or `SearchExhausted`
    pub fn into_result(self) -> BnetResult<Genome<T, N, K>> {
        match self {
            Self::Converged { genome, .. } => Ok(genome),
            Self::Exhausted {
                best_fitness,
                generations,
                ..
            } => Err(BnetError::SearchExhausted {
                generations,
                best_fitness,
            }),
        }
    }
}

/// Greedy mutation-based search
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HillClimber {
    /// Per-bit flip probability of each mutant
    pub flip_probability: f64,

    /// Mutants to try before giving up
    pub max_generations: u64,
}

impl HillClimber {
    pub fn new(flip_probability: f64, max_generations: u64) -> Self {
        Self {
            flip_probability,
            max_generations,
        }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(config.flip_probability, config.max_generations)
    }

    /// Search from a uniformly random genome
    pub fn run<T, const N: usize, const K: usize, F, R>(
        &self,
        fitness: &F,
        rng: &mut R,
    ) -> SearchOutcome<T, N, K>
    where
        T: Genosection,
        F: Fitness<T, N, K> + ?Sized,
        R: Rng + ?Sized,
    {
        let start = Genome::random(rng);
        self.run_from(fitness, start, rng)
    }

    /// Search from `start`
    pub fn run_from<T, const N: usize, const K: usize, F, R>(
        &self,
        fitness: &F,
        start: Genome<T, N, K>,
        rng: &mut R,
    ) -> SearchOutcome<T, N, K>
    where
        T: Genosection,
        F: Fitness<T, N, K> + ?Sized,
        R: Rng + ?Sized,
    {
        let target = fitness.target();
        let mut best = start;
        let mut best_fitness = fitness.fitness(&best);
        let mut generations = 0u64;

        while best_fitness < target {
            if generations >= self.max_generations {
                tracing::warn!(generations, best_fitness, "search exhausted its generation budget");
                return SearchOutcome::Exhausted {
                    best_genome: best,
                    best_fitness,
                    generations,
                };
            }

            generations += 1;
            self.step(fitness, &mut best, &mut best_fitness, rng);
        }

        tracing::debug!(generations, "search converged");
        SearchOutcome::Converged {
            genome: best,
            fitness: best_fitness,
            generations,
        }
    }

    /// Try one mutant of `current`; keep it if it is at least as fit
    ///
    /// Returns whether the mutant was accepted.
    pub fn step<T, const N: usize, const K: usize, F, R>(
        &self,
        fitness: &F,
        current: &mut Genome<T, N, K>,
        current_fitness: &mut f64,
        rng: &mut R,
    ) -> bool
    where
        T: Genosection,
        F: Fitness<T, N, K> + ?Sized,
        R: Rng + ?Sized,
    {
        let mut candidate = *current;
        candidate.mutate(rng, self.flip_probability);

        let candidate_fitness = fitness.fitness(&candidate);
        if candidate_fitness < *current_fitness {
            return false;
        }
        if candidate_fitness > *current_fitness {
            tracing::trace!(fitness = candidate_fitness, "fitter genome");
        }
        *current = candidate;
        *current_fitness = candidate_fitness;
        true
    }
}
