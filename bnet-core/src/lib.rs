//! # BNET Core
//!
//! Core types for BNET, a Boolean gene-regulatory network simulator.
//!
//! This crate provides the fundamental building blocks:
//! - **Genome**: one bit-packed truth table ("genosection") per gene
//! - **GeneNet**: the transition function that develops an N-bit state
//! - **StateSet**: a dense set over the (at most 256) states of a network
//! - **Attractor**: where a single trajectory ends up
//!
//! ## Parameters
//!
//! The gene count `N` and the number of inputs per gene `K` are const
//! generics. Invalid combinations (`N > 8`, `K > N`, or a truth table that
//! does not fit the chosen integer type) are rejected when the type is
//! instantiated, never mid-simulation.
//!
//! ## State Layout
//!
//! Gene `i` drives state bit `N-1-i`, so gene 0 is the most significant
//! bit of the state and bit 0 belongs to the last gene.

pub mod config;
pub mod error;
pub mod gene_net;
pub mod genome;
pub mod genosection;
pub mod state;
pub mod traits;

// Re-export main types at crate root
pub use config::BnetConfig;
pub use error::{BnetError, BnetResult};
pub use gene_net::{Attractor, AttractorKind, GeneNet, Wiring};
pub use genome::Genome;
pub use genosection::Genosection;
pub use state::{State, StateSet};
pub use traits::*;

/// Largest supported gene count (width of [`State`])
pub const MAX_GENES: usize = 8;

/// Number of distinct states of an `n`-gene network
#[inline]
pub const fn num_states(n: usize) -> usize {
    1 << n
}
