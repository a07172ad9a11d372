//! A permutation group library
//!
//! This crate provides data structures and algorithms for working with permutations and permutation
//! groups given by generators.
//!
//! The central tool is a base and strong generating set, computed by deterministic Schreier-Sims
//! with Jerrum's filter ([`schreier_sims`]), incrementally ([`incremental`]) or by a Monte Carlo
//! variant ([`randomized`]). On top of the resulting [`StabilizerChain`] the crate provides group
//! orders, membership tests, ranking and unranking of elements, uniform sampling, orbits and
//! stabilizers, block systems and a backtrack search for subgroups.
//!
//! Permutations compose like functions: `(a * b)(x) = a(b(x))`.
//!
//! No logger is installed; progress is reported through the [`log`] facade.
pub mod action;
pub mod baseswap;
pub mod block;
pub mod chain;
pub mod coset;
pub mod error;
pub mod group;
pub mod incremental;
pub mod jerrum;
pub mod orbit;
pub mod perm;
pub mod random;
pub mod randomized;
pub mod schreier_sims;
pub mod search;

#[cfg(test)]
pub(crate) mod test_groups;

pub use block::BlockSystem;
pub use chain::{Bsgs, StabilizerChain, Transversal};
pub use coset::GenerateMethod;
pub use error::GroupError;
pub use group::PermGroup;
pub use orbit::{Orbit, OrbitSeed, SchreierEntry};
pub use perm::Perm;
pub use random::{ProductReplacement, ProductReplacementConfig};
pub use randomized::RandomSchreierSimsConfig;
pub use search::SearchOptions;

/// Set element.
///
/// Set elements are represented by non-negative integers (`u32`).
pub type El = u32;
