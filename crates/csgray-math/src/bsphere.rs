//! Bounding spheres for first-pass ray rejection.

use crate::{Aabb3, Dir3, Point3};

/// Sphere enclosing a solid, stored as center and squared radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    /// Center of the sphere.
    pub center: Point3,
    /// Squared radius.
    pub radius_sq: f64,
}

impl BoundingSphere {
    /// Create a sphere from center and radius.
    pub fn new(center: Point3, radius: f64) -> Self {
        Self {
            center,
            radius_sq: radius * radius,
        }
    }

    /// The sphere circumscribing a box.
    pub fn from_aabb(aabb: &Aabb3) -> Self {
        Self::new(aabb.center(), aabb.half_diagonal())
    }

    /// A sphere no ray can miss.
    pub fn infinite() -> Self {
        Self {
            center: Point3::origin(),
            radius_sq: f64::INFINITY,
        }
    }

    /// Radius of the sphere.
    pub fn radius(&self) -> f64 {
        self.radius_sq.sqrt()
    }

    /// True for the sphere returned by [`BoundingSphere::infinite`].
    pub fn is_infinite(&self) -> bool {
        self.radius_sq.is_infinite()
    }

    /// Test whether a ray starting at `origin` along `dir` certainly misses.
    ///
    /// A ray is rejected when its closest approach to the center exceeds the
    /// radius, or when the whole sphere lies behind the origin.
    pub fn rejects(&self, origin: &Point3, dir: &Dir3) -> bool {
        if self.is_infinite() {
            return false;
        }
        let to_center = self.center - origin;
        let along = to_center.dot(dir.as_ref());
        let perp_sq = to_center.norm_squared() - along * along;
        if perp_sq > self.radius_sq {
            return true;
        }
        along < 0.0 && along * along > self.radius_sq
    }
}
