//! Errors reported by group construction and configuration.
use thiserror::Error;

/// Errors that can occur when building or configuring permutation groups.
///
/// Membership failures are not errors: operations such as coset decomposition or ranking report
/// them as `None`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GroupError {
    /// A group (or a direct product) was requested without any generators.
    #[error("a permutation group needs at least one generator")]
    NoGenerators,
    /// Generators of a group must all act on the same number of points.
    #[error("generator {index} has degree {found}, expected degree {expected}")]
    DegreeMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },
    /// An image vector that is not a bijection of its index set.
    #[error("images do not form a permutation of 0..{degree}")]
    InvalidPermutation { degree: usize },
    /// An element enumeration method name that is not recognized.
    #[error("unsupported element enumeration method `{0}`")]
    UnsupportedMethod(String),
}
