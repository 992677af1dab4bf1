//! # Ensemble - Independent Searches
//!
//! Runs several seeded hill climbs side by side on Rayon's pool. Run `i`
//! draws from its own `StdRng` seeded with `seed + i`, so results do not
//! depend on scheduling. Each converged genome is followed by a full
//! basin analysis.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::Serialize;

use bnet_compute::{AllBasins, BasinStats};
use bnet_core::config::SearchConfig;
use bnet_core::Genosection;

use crate::climber::{HillClimber, SearchOutcome};
use crate::dual::GeneNetDual;

/// Result of one search in the ensemble
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunReport<T: Genosection, const N: usize, const K: usize> {
    pub run: usize,
    pub seed: u64,
    pub outcome: SearchOutcome<T, N, K>,

    /// Basins of the converged genome
    pub basins: Option<BasinStats>,
}

/// Aggregate over all runs
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct EnsembleSummary {
    pub runs: usize,
    pub converged: usize,
    pub exhausted: usize,
    pub mean_generations: f64,
    pub max_generations: u64,
    pub mean_fitness: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ensemble {
    pub climber: HillClimber,
    pub runs: usize,
    pub seed: u64,
}

impl Ensemble {
    pub fn new(climber: HillClimber, runs: usize, seed: u64) -> Self {
        Self { climber, runs, seed }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(HillClimber::from_config(config), config.runs, config.seed)
    }

    /// Run every search and report them in run order
    pub fn run<T: Genosection, const N: usize, const K: usize>(
        &self,
        dual: &GeneNetDual<N, K>,
    ) -> Vec<RunReport<T, N, K>> {
        tracing::info!(runs = self.runs, seed = self.seed, "starting ensemble");

        (0..self.runs)
            .into_par_iter()
            .map(|run| {
                let seed = self.seed.wrapping_add(run as u64);
                let mut rng = StdRng::seed_from_u64(seed);
                let outcome = self.climber.run(dual, &mut rng);

                let basins = if outcome.is_converged() {
                    tracing::info!(run, generations = outcome.generations(), "run converged");
                    Some(AllBasins::with_net(*outcome.genome(), *dual.net()).stats())
                } else {
                    tracing::info!(run, best_fitness = outcome.fitness(), "run exhausted");
                    None
                };

                RunReport {
                    run,
                    seed,
                    outcome,
                    basins,
                }
            })
            .collect()
    }

    pub fn summarize<T: Genosection, const N: usize, const K: usize>(
        reports: &[RunReport<T, N, K>],
    ) -> EnsembleSummary {
        if reports.is_empty() {
            return EnsembleSummary::default();
        }

        let runs = reports.len();
        let converged = reports.iter().filter(|r| r.outcome.is_converged()).count();
        let total_generations: u64 = reports.iter().map(|r| r.outcome.generations()).sum();
        let total_fitness: f64 = reports.iter().map(|r| r.outcome.fitness()).sum();

        EnsembleSummary {
            runs,
            converged,
            exhausted: runs - converged,
            mean_generations: total_generations as f64 / runs as f64,
            max_generations: reports
                .iter()
                .map(|r| r.outcome.generations())
                .max()
                .unwrap_or(0),
            mean_fitness: total_fitness / runs as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_ensemble(runs: usize, max_generations: u64) -> Ensemble {
        Ensemble::new(HillClimber::new(0.05, max_generations), runs, 7)
    }

    #[test]
    fn test_runs_are_reproducible() {
        let dual = GeneNetDual::<3, 3>::new(0b101, 0b010);
        let ensemble = small_ensemble(4, 100_000);

        let a: Vec<RunReport<u8, 3, 3>> = ensemble.run(&dual);
        let b: Vec<RunReport<u8, 3, 3>> = ensemble.run(&dual);
        assert_eq!(a, b);

        let seeds: Vec<u64> = a.iter().map(|r| r.seed).collect();
        assert_eq!(seeds, vec![7, 8, 9, 10]);
    }

    #[test]
    fn test_converged_runs_carry_basins() {
        let dual = GeneNetDual::<3, 3>::new(0b101, 0b010);
        let reports: Vec<RunReport<u8, 3, 3>> = small_ensemble(3, 100_000).run(&dual);

        for report in &reports {
            assert!(report.outcome.is_converged());
            let stats = report.basins.as_ref().unwrap();
            // Both targets are point attractors, so at least two basins
            assert!(stats.point_attractors >= 2);
            assert_eq!(stats.basin_sizes.iter().sum::<usize>(), 8);
        }
    }

    #[test]
    fn test_summary() {
        let dual = GeneNetDual::<3, 3>::new(0b101, 0b010);
        let reports: Vec<RunReport<u8, 3, 3>> = small_ensemble(2, 0).run(&dual);
        let summary = Ensemble::summarize(&reports);

        assert_eq!(summary.runs, 2);
        assert_eq!(summary.converged + summary.exhausted, 2);
        assert_eq!(summary.max_generations, 0);
        assert!(reports.iter().all(|r| r.outcome.is_converged() == r.basins.is_some()));
    }

    #[test]
    fn test_empty_summary() {
        let summary = Ensemble::summarize::<u8, 3, 3>(&[]);
        assert_eq!(summary, EnsembleSummary::default());
    }
}
