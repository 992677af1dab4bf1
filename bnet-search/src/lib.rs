//! # BNET Search
//!
//! Searching genome space for networks that develop into chosen states.
//!
//! - **GeneNetDual**: scores a genome by the attractors it reaches from
//!   the anterior and posterior initial states
//! - **HillClimber**: bounded greedy mutation search against any
//!   [`Fitness`](bnet_core::Fitness)
//! - **Ensemble**: independent seeded climbs on Rayon's pool
//!
//! ## Network Shapes
//!
//! `N` and `K` are compile-time parameters, so [`run_search`] picks one
//! instantiation per supported `(genes, inputs)` pair:
//!
//! | genes | inputs | genosection |
//! |-------|--------|-------------|
//! | 3     | 3      | `u8`        |
//! | 4     | 4      | `u16`       |
//! | 5     | 4      | `u16`       |
//! | 5     | 5      | `u32`       |
//! | 6     | 6      | `u64`       |
//! | 7     | 7      | `u128`      |

pub mod climber;
pub mod dual;
pub mod ensemble;

pub use climber::{HillClimber, SearchOutcome};
pub use dual::GeneNetDual;
pub use ensemble::{Ensemble, EnsembleSummary, RunReport};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use bnet_core::config::BnetConfig;
use bnet_core::error::{BnetError, BnetResult};
use bnet_core::{GeneNet, Genosection};

/// Everything one invocation produced
#[derive(Clone, Debug, Serialize)]
pub struct SearchReport<T: Genosection, const N: usize, const K: usize> {
    pub config: BnetConfig,
    pub summary: EnsembleSummary,
    pub runs: Vec<RunReport<T, N, K>>,
}

/// Run the ensemble described by `config` and return its report as JSON
pub fn run_search(config: &BnetConfig) -> BnetResult<serde_json::Value> {
    config.validate()?;

    match (config.network.genes, config.network.inputs) {
        (3, 3) => run_shape::<u8, 3, 3>(config),
        (4, 4) => run_shape::<u16, 4, 4>(config),
        (5, 4) => run_shape::<u16, 5, 4>(config),
        (5, 5) => run_shape::<u32, 5, 5>(config),
        (6, 6) => run_shape::<u64, 6, 6>(config),
        (7, 7) => run_shape::<u128, 7, 7>(config),
        (genes, inputs) => Err(BnetError::config(format!(
            "no network instantiation for {} genes with {} inputs",
            genes, inputs
        ))),
    }
}

fn run_shape<T: Genosection, const N: usize, const K: usize>(
    config: &BnetConfig,
) -> BnetResult<serde_json::Value> {
    let net = if config.network.random_wiring {
        // Wiring draws from its own stream so runs keep their seeds
        let mut rng = StdRng::seed_from_u64(config.search.seed ^ 0x5eed_5eed);
        GeneNet::<N, K>::with_random_wiring(&mut rng)
    } else {
        GeneNet::<N, K>::new()
    };
    tracing::info!(
        genes = N,
        inputs = K,
        random_wiring = config.network.random_wiring,
        "network ready"
    );

    let dual = GeneNetDual::try_with_net(net, config.search.target_ant, config.search.target_pos)?;
    let runs: Vec<RunReport<T, N, K>> = Ensemble::from_config(&config.search).run(&dual);
    let summary = Ensemble::summarize(&runs);
    tracing::info!(
        converged = summary.converged,
        exhausted = summary.exhausted,
        mean_generations = summary.mean_generations,
        "ensemble finished"
    );

    let report = SearchReport {
        config: config.clone(),
        summary,
        runs,
    };
    Ok(serde_json::to_value(&report)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config(genes: usize, inputs: usize) -> BnetConfig {
        let mut config = BnetConfig::default();
        config.network.genes = genes;
        config.network.inputs = inputs;
        config.search.target_ant = 0b101;
        config.search.target_pos = 0b010;
        config.search.runs = 2;
        config
    }

    #[test]
    fn test_run_search_small_network() {
        let report = run_search(&small_config(3, 3)).unwrap();
        assert_eq!(report["summary"]["runs"], 2);
        assert_eq!(report["summary"]["converged"], 2);
        assert_eq!(report["runs"].as_array().unwrap().len(), 2);
        assert_eq!(report["config"]["network"]["genes"], 3);
    }

    #[test]
    fn test_run_search_random_wiring() {
        let mut config = small_config(4, 3);
        assert!(run_search(&config).is_err());

        config.network.inputs = 4;
        config.network.random_wiring = true;
        config.search.max_generations = 50;
        let report = run_search(&config).unwrap();
        assert_eq!(report["summary"]["runs"], 2);
    }

    #[test]
    fn test_unsupported_shape() {
        let config = small_config(8, 8);
        assert!(matches!(run_search(&config), Err(BnetError::Config(_))));
    }
}
