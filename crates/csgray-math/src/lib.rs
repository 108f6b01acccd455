#![warn(missing_docs)]

//! Math types for the csgray ray-tracing core.
//!
//! Thin wrappers around nalgebra providing the point, vector and direction
//! types used by solids and rays, the tolerance constants applied to
//! ray-parameter comparisons, and the two bounding volumes used for cheap
//! ray rejection.

use nalgebra::{Unit, Vector3};
use serde::{Deserialize, Serialize};

mod bbox;
mod bsphere;

pub use bbox::Aabb3;
pub use bsphere::BoundingSphere;

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// A 3x3 matrix, used for the affine frames of quadric solids.
pub type Mat3 = nalgebra::Matrix3<f64>;

/// Stand-in for an infinite ray distance.
///
/// Half-spaces report their unbounded end at `±FAR_DIST`, which keeps the
/// interval arithmetic free of `inf - inf` NaNs.
pub const FAR_DIST: f64 = 1.0e40;

/// Tolerance constants for ray-parameter and geometric comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerance {
    /// Distance along a ray below which two hit distances are coincident.
    pub dist: f64,
    /// Dot product below which two unit vectors are treated as perpendicular.
    pub perp: f64,
    /// Length below which a vector is degenerate.
    pub len: f64,
}

impl Tolerance {
    /// Default tolerances (1e-4 ray distance, 1e-3 perpendicularity, 1e-8 length).
    pub const DEFAULT: Self = Self {
        dist: 1e-4,
        perp: 1e-3,
        len: 1e-8,
    };

    /// Check if two ray distances are coincident within tolerance.
    #[inline]
    pub fn dist_equal(&self, a: f64, b: f64) -> bool {
        (a - b).abs() < self.dist
    }

    /// Check if a scalar is effectively zero at ray-distance scale.
    #[inline]
    pub fn near_zero(&self, d: f64) -> bool {
        d.abs() < self.dist
    }

    /// Check if two unit vectors are perpendicular.
    #[inline]
    pub fn perpendicular(&self, a: &Vec3, b: &Vec3) -> bool {
        a.dot(b).abs() < self.perp
    }

    /// Check if a vector is too short to define a direction.
    #[inline]
    pub fn degenerate(&self, v: &Vec3) -> bool {
        v.norm() < self.len
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dist_equal() {
        let tol = Tolerance::DEFAULT;
        assert!(tol.dist_equal(1.0, 1.00005));
        assert!(!tol.dist_equal(1.0, 1.0002));
    }

    #[test]
    fn test_perpendicular() {
        let tol = Tolerance::DEFAULT;
        assert!(tol.perpendicular(&Vec3::x(), &Vec3::y()));
        assert!(tol.perpendicular(&Vec3::x(), &Vec3::new(1e-4, 1.0, 0.0).normalize()));
        assert!(!tol.perpendicular(&Vec3::x(), &Vec3::new(1.0, 1.0, 0.0).normalize()));
    }

    #[test]
    fn test_degenerate() {
        let tol = Tolerance::DEFAULT;
        assert!(tol.degenerate(&Vec3::new(1e-9, 0.0, 0.0)));
        assert!(!tol.degenerate(&Vec3::new(1e-3, 0.0, 0.0)));
    }

    #[test]
    fn test_tolerance_deserialize_partial() {
        let tol: Tolerance = serde_json::from_str(r#"{ "dist": 0.001 }"#).unwrap();
        assert!((tol.dist - 0.001).abs() < 1e-15);
        assert!((tol.len - Tolerance::DEFAULT.len).abs() < 1e-20);
    }
}
