//! Error types for solid preparation.

use crate::SolidKind;
use thiserror::Error;

/// Reasons a solid's parameters cannot be prepared for ray tracing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolidError {
    /// A defining vector or radius is too small to use.
    #[error("{kind}: degenerate {what}")]
    Degenerate {
        /// Kind of the rejected solid.
        kind: SolidKind,
        /// Which parameter was degenerate.
        what: &'static str,
    },

    /// Two vectors that must be perpendicular are not.
    #[error("{kind}: {first} and {second} are not perpendicular")]
    NotPerpendicular {
        /// Kind of the rejected solid.
        kind: SolidKind,
        /// First vector name.
        first: &'static str,
        /// Second vector name.
        second: &'static str,
    },

    /// Parameters are individually valid but inconsistent.
    #[error("{kind}: {reason}")]
    Invalid {
        /// Kind of the rejected solid.
        kind: SolidKind,
        /// Description of the inconsistency.
        reason: String,
    },
}

/// Result type for solid preparation.
pub type Result<T> = std::result::Result<T, SolidError>;
