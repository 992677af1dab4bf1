//! # BNET Compute
//!
//! Basin-of-attraction discovery for Boolean gene networks.
//!
//! For a fixed genome the whole `2^N` state space is enumerated and
//! partitioned into basins, each tagged with its attractor:
//! - **Point**: a state that develops into itself
//! - **Limit**: a cycle of two or more states
//!
//! Discovery runs either one walk at a time (`AllBasins::update`) or with
//! every start state traced in parallel on Rayon's pool
//! (`AllBasins::update_par`). Both give the same partition.

pub mod all_basins;
pub mod basin;

pub use all_basins::{AllBasins, BasinStats};
pub use basin::{BasinOfAttraction, Endpoint, StateNode};
