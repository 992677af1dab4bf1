//! # Error Types for BNET
//!
//! Unified error handling across the BNET crates. Simulation itself is
//! total; errors only arise at configuration boundaries and from bounded
//! searches that run out of budget.

use thiserror::Error;

/// Main error type for BNET operations
#[derive(Error, Debug)]
pub enum BnetError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A bounded search spent its generation budget without converging
    #[error("Search exhausted after {generations} generations (best fitness {best_fitness})")]
    SearchExhausted { generations: u64, best_fitness: f64 },

    /// Invalid state
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Result type for BNET operations
pub type BnetResult<T> = Result<T, BnetError>;

impl BnetError {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid state error
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }
}

impl From<serde_json::Error> for BnetError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
