//! # Configuration - Network Shape and Search Parameters
//!
//! The gene count and inputs per gene are compile-time parameters of the
//! network types; the config names which instantiation a driver should
//! pick and validates the runtime parameters of a search against it.

use serde::{Deserialize, Serialize};

use crate::error::{BnetError, BnetResult};
use crate::state::{state_mask, State};
use crate::MAX_GENES;

/// Master configuration for BNET
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BnetConfig {
    /// Network shape
    #[serde(default)]
    pub network: NetworkConfig,

    /// Hill-climbing search settings
    #[serde(default)]
    pub search: SearchConfig,
}

/// Shape of the gene network
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Number of genes (N)
    pub genes: usize,

    /// Inputs per gene (K)
    pub inputs: usize,

    /// Draw a random wiring instead of the fixed rotation wiring
    pub random_wiring: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            genes: 5,
            inputs: 5,
            random_wiring: false,
        }
    }
}

/// Dual-context hill-climbing search
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Per-bit flip probability of each mutation
    pub flip_probability: f64,

    /// Attractor wanted from the anterior initial state
    pub target_ant: State,

    /// Attractor wanted from the posterior initial state
    pub target_pos: State,

    /// Generation budget of a single search
    pub max_generations: u64,

    /// Independent searches to run
    pub runs: usize,

    /// Base seed; run `i` uses `seed + i`
    pub seed: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            flip_probability: 0.05,
            target_ant: 0x15,
            target_pos: 0x0a,
            max_generations: 100_000,
            runs: 8,
            seed: 42,
        }
    }
}

impl BnetConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &str) -> BnetResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &str) -> BnetResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Create config from environment variables
    ///
    /// Reads (integers may be given in hex with a `0x` prefix):
    /// - BNET_GENES, BNET_INPUTS: network shape (default: 5, 5)
    /// - BNET_RANDOM_WIRING: "1" or "true" for random wiring
    /// - BNET_FLIP_P: per-bit flip probability (default: 0.05)
    /// - BNET_TARGET_ANT, BNET_TARGET_POS: target states (default: 0x15, 0x0a)
    /// - BNET_MAX_GENERATIONS: generation budget (default: 100000)
    /// - BNET_RUNS: independent searches (default: 8)
    /// - BNET_SEED: base seed (default: 42)
    pub fn from_env() -> BnetResult<Self> {
        let mut config = Self::default();

        if let Some(v) = env_int("BNET_GENES")? {
            config.network.genes = v as usize;
        }
        if let Some(v) = env_int("BNET_INPUTS")? {
            config.network.inputs = v as usize;
        }
        if let Ok(v) = std::env::var("BNET_RANDOM_WIRING") {
            config.network.random_wiring = v == "1" || v.eq_ignore_ascii_case("true");
        }
        if let Ok(v) = std::env::var("BNET_FLIP_P") {
            config.search.flip_probability = v
                .trim()
                .parse()
                .map_err(|_| BnetError::config(format!("BNET_FLIP_P: not a number: {}", v)))?;
        }
        if let Some(v) = env_int("BNET_TARGET_ANT")? {
            config.search.target_ant = narrow_state("BNET_TARGET_ANT", v)?;
        }
        if let Some(v) = env_int("BNET_TARGET_POS")? {
            config.search.target_pos = narrow_state("BNET_TARGET_POS", v)?;
        }
        if let Some(v) = env_int("BNET_MAX_GENERATIONS")? {
            config.search.max_generations = v;
        }
        if let Some(v) = env_int("BNET_RUNS")? {
            config.search.runs = v as usize;
        }
        if let Some(v) = env_int("BNET_SEED")? {
            config.search.seed = v;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the runtime parameters against each other
    pub fn validate(&self) -> BnetResult<()> {
        let net = &self.network;
        if net.genes == 0 || net.genes > MAX_GENES {
            return Err(BnetError::config(format!(
                "genes must be in 1..={}, got {}",
                MAX_GENES, net.genes
            )));
        }
        if net.inputs == 0 || net.inputs > net.genes {
            return Err(BnetError::config(format!(
                "inputs must be in 1..={}, got {}",
                net.genes, net.inputs
            )));
        }

        let search = &self.search;
        if !(0.0..=1.0).contains(&search.flip_probability) {
            return Err(BnetError::config(format!(
                "flip_probability must be in [0, 1], got {}",
                search.flip_probability
            )));
        }
        let mask = state_mask(net.genes);
        for (name, target) in [("target_ant", search.target_ant), ("target_pos", search.target_pos)] {
            if target & !mask != 0 {
                return Err(BnetError::config(format!(
                    "{} {:#04x} does not fit in {} genes",
                    name, target, net.genes
                )));
            }
        }
        if search.runs == 0 {
            return Err(BnetError::config("runs must be at least 1"));
        }
        Ok(())
    }
}

/// Read an optional integer environment variable, decimal or `0x` hex
fn env_int(name: &str) -> BnetResult<Option<u64>> {
    let Ok(raw) = std::env::var(name) else {
        return Ok(None);
    };
    let raw = raw.trim();
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => raw.parse(),
    };
    parsed
        .map(Some)
        .map_err(|_| BnetError::config(format!("{}: not an integer: {}", name, raw)))
}

fn narrow_state(name: &str, v: u64) -> BnetResult<State> {
    State::try_from(v).map_err(|_| BnetError::config(format!("{}: {} exceeds 8 bits", name, v)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = BnetConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.search.target_ant, 0x15);
        assert_eq!(config.search.target_pos, 0x0a);
    }

    #[test]
    fn test_validate_rejects_bad_shape() {
        let mut config = BnetConfig::default();
        config.network.genes = 9;
        assert!(matches!(config.validate(), Err(BnetError::Config(_))));

        let mut config = BnetConfig::default();
        config.network.inputs = 6;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_search() {
        let mut config = BnetConfig::default();
        config.search.flip_probability = 1.5;
        assert!(config.validate().is_err());

        // 0x15 needs five genes
        let mut config = BnetConfig::default();
        config.network.genes = 4;
        config.network.inputs = 4;
        assert!(config.validate().is_err());

        let mut config = BnetConfig::default();
        config.search.runs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: BnetConfig =
            serde_json::from_str(r#"{ "network": { "genes": 3, "inputs": 3, "random_wiring": false } }"#)
                .unwrap();
        assert_eq!(config.network.genes, 3);
        assert_eq!(config.search, SearchConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("bnet-config-{}.json", std::process::id()));
        let path = path.to_string_lossy().into_owned();

        let mut config = BnetConfig::default();
        config.search.seed = 1234;
        config.save(&path).unwrap();
        let loaded = BnetConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_narrow_state() {
        assert_eq!(narrow_state("T", 0x15).unwrap(), 0x15);
        assert!(narrow_state("T", 0x100).is_err());
    }
}
