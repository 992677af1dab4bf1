//! # Traits - Seams Between BNET's Components
//!
//! - `ComplexityOracle`: minimal-Boolean-expression complexity of a truth
//!   table, supplied by an external minimiser
//! - `Fitness`: scores a genome; the hill climber is generic over it

use crate::genome::Genome;
use crate::genosection::Genosection;

/// Complexity of a single truth table
///
/// Implemented by an external Boolean minimiser (for example a
/// Quine–McCluskey reducer). The core never needs it; callers use it
/// through [`Genome::complexity`].
pub trait ComplexityOracle {
    /// Complexity in [0, 1] of the `2^k`-row truth table `table`
    fn complexity(&self, table: u128, k: usize) -> f64;
}

/// Objective maximised by a genome search
pub trait Fitness<T: Genosection, const N: usize, const K: usize>: Sync {
    /// Fitness of `genome`, in [0, 1]
    fn fitness(&self, genome: &Genome<T, N, K>) -> f64;

    /// Fitness at which a search has converged
    fn target(&self) -> f64 {
        1.0
    }
}
