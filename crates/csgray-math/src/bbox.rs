//! Axis-aligned bounding boxes.
//!
//! Every prepared solid carries one, and the model as a whole carries the
//! union of the finite ones. Rays that miss a box never reach the solids
//! inside it.

use crate::{Point3, Vec3};

/// Axis-aligned bounding box in 3D.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb3 {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl Aabb3 {
    /// Create an AABB from min and max corners.
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Create an empty (inverted) AABB suitable for expansion.
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// A box that contains everything.
    pub fn infinite() -> Self {
        Self {
            min: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
            max: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
        }
    }

    /// Box centered on `center` extending `half` along each axis.
    pub fn from_center_half_extent(center: &Point3, half: &Vec3) -> Self {
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// True if no point has been included yet.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// True if every corner coordinate is finite.
    pub fn is_finite(&self) -> bool {
        self.min.coords.iter().chain(self.max.coords.iter()).all(|c| c.is_finite())
    }

    /// Expand this AABB to include a point.
    pub fn include_point(&mut self, p: &Point3) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    /// Expand this AABB to include another box.
    pub fn include_box(&mut self, other: &Aabb3) {
        if other.is_empty() {
            return;
        }
        self.include_point(&other.min);
        self.include_point(&other.max);
    }

    /// Test if two AABBs overlap (touching counts as overlap).
    pub fn overlaps(&self, other: &Aabb3) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Test if a point lies inside or on the box.
    pub fn contains(&self, p: &Point3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Expand the AABB by a tolerance in all directions.
    pub fn expand(&mut self, tol: f64) {
        self.min -= Vec3::repeat(tol);
        self.max += Vec3::repeat(tol);
    }

    /// Round the corners outward to whole units.
    ///
    /// The model box is kept on integer boundaries so that rays grazing a
    /// face of the outermost solid are not rejected by roundoff.
    pub fn round_out(&mut self) {
        self.min = self.min.map(f64::floor);
        self.max = self.max.map(f64::ceil);
    }

    /// Center of the box.
    pub fn center(&self) -> Point3 {
        nalgebra::center(&self.min, &self.max)
    }

    /// Half of the box diagonal.
    pub fn half_diagonal(&self) -> f64 {
        (self.max - self.min).norm() * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_then_include() {
        let mut b = Aabb3::empty();
        assert!(b.is_empty());
        b.include_point(&Point3::new(1.0, 2.0, 3.0));
        b.include_point(&Point3::new(-1.0, 0.0, 5.0));
        assert!(!b.is_empty());
        assert_eq!(b.min, Point3::new(-1.0, 0.0, 3.0));
        assert_eq!(b.max, Point3::new(1.0, 2.0, 5.0));
    }

    #[test]
    fn test_include_empty_box_is_noop() {
        let mut b = Aabb3::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        b.include_box(&Aabb3::empty());
        assert_eq!(b.max, Point3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_round_out() {
        let mut b = Aabb3::new(Point3::new(-0.5, 0.2, -2.0), Point3::new(0.5, 1.2, 2.0));
        b.round_out();
        assert_eq!(b.min, Point3::new(-1.0, 0.0, -2.0));
        assert_eq!(b.max, Point3::new(1.0, 2.0, 2.0));
    }

    #[test]
    fn test_infinite_is_not_finite() {
        assert!(!Aabb3::infinite().is_finite());
        assert!(Aabb3::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0)).is_finite());
    }

    #[test]
    fn test_overlaps_touching() {
        let a = Aabb3::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let b = Aabb3::new(Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0));
        assert!(a.overlaps(&b));
        assert!(a.contains(&Point3::new(0.5, 0.5, 1.0)));
    }
}
