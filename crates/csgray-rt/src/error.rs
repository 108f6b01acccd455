//! The unrecoverable-error type of the ray-tracing core.
//!
//! Nothing here describes a per-ray outcome: misses and overlaps travel
//! through the shot handler. A [`FatalError`] means the model, a ray or a
//! pool is corrupt and continuing would produce wrong answers. Library code
//! returns it; callers that want the traditional behaviour call
//! [`FatalError::bomb`].

use csgray_solids::SolidError;
use thiserror::Error;

/// Conditions the core refuses to continue past.
#[derive(Error, Debug)]
pub enum FatalError {
    /// The ray has a non-finite origin or a zero or non-finite direction.
    #[error("bad ray: origin ({x}, {y}, {z}) direction ({dx}, {dy}, {dz})")]
    BadRay {
        /// Origin x.
        x: f64,
        /// Origin y.
        y: f64,
        /// Origin z.
        z: f64,
        /// Direction x.
        dx: f64,
        /// Direction y.
        dy: f64,
        /// Direction z.
        dz: f64,
    },

    /// Rays were shot before [`crate::RtInstance::prep`].
    #[error("model has not been prepped")]
    NotPrepped,

    /// Solids or regions were added after prep.
    #[error("model is already prepped; cannot add {0}")]
    AlreadyPrepped(String),

    /// Nothing is left to ray trace.
    #[error("no solids to prep ({air_discards} air regions discarded)")]
    NoSolids {
        /// Regions dropped because air is not in use.
        air_discards: usize,
    },

    /// More solids than the partition bit vector can index.
    #[error("{count} solids exceeds the limit of {limit}")]
    TooManySolids {
        /// Solids in the model.
        count: usize,
        /// Compile-time limit.
        limit: usize,
    },

    /// A solid's parameters failed validation.
    #[error("solid '{name}' failed prep: {source}")]
    BadSolid {
        /// Solid name.
        name: String,
        /// Why it was rejected.
        #[source]
        source: SolidError,
    },

    /// A boolean tree refers to something that does not exist.
    #[error("corrupt boolean tree in region '{region}': {reason}")]
    CorruptTree {
        /// Region name.
        region: String,
        /// What was wrong.
        reason: String,
    },

    /// A solid with this name already exists.
    #[error("duplicate solid name '{0}'")]
    DuplicateSolid(String),

    /// A region with this name already exists.
    #[error("duplicate region name '{0}'")]
    DuplicateRegion(String),

    /// A pool handle was freed twice or never belonged to the pool.
    #[error("stale {0} handle returned to pool")]
    StaleHandle(&'static str),
}

impl FatalError {
    /// Log the error and abort the process.
    pub fn bomb(self) -> ! {
        log::error!("fatal: {self}");
        eprintln!("csgray: fatal: {self}");
        std::process::abort()
    }
}

/// Result type for the ray-tracing core.
pub type Result<T> = std::result::Result<T, FatalError>;
