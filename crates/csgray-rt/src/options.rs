//! Model-wide ray-tracing options.

use csgray_math::Tolerance;
use serde::{Deserialize, Serialize};

/// Options fixed for the lifetime of an [`crate::RtInstance`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RtOptions {
    /// Keep regions with a nonzero air code instead of discarding them at
    /// region build time.
    pub use_air: bool,
    /// Overlaps thinner than this are resolved silently by the default
    /// handler.
    pub overlap_report_depth: f64,
    /// Default hit limit for applications; zero means all partitions.
    pub onehit: usize,
    /// Distance and angle tolerances.
    pub tolerance: Tolerance,
}

impl Default for RtOptions {
    fn default() -> Self {
        Self {
            use_air: false,
            overlap_report_depth: 0.1,
            onehit: 0,
            tolerance: Tolerance::DEFAULT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_options_fill_defaults() {
        let opts: RtOptions = serde_json::from_str(r#"{ "use_air": true }"#).unwrap();
        assert!(opts.use_air);
        assert_eq!(opts.onehit, 0);
        assert_eq!(opts.tolerance, Tolerance::DEFAULT);
    }
}
