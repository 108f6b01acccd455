//! Torus: a circle of radius `r2` swept around an axis at radius `r1`.
//!
//! The ray/torus quartic is solved in closed form and its roots polished.
//! Up to four crossings give up to two segments. Which spans between
//! consecutive crossings lie inside the tube is decided by testing their
//! midpoints, which keeps grazing (double) roots from flipping the parity.

use std::fmt;

use csgray_math::{Aabb3, BoundingSphere, Dir3, Point3, Tolerance, Vec3};

use crate::error::{Result, SolidError};
use crate::poly::Quartic;
use crate::{Hit, Ray, SegmentSink, SolidKind};

/// Torus parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Tor {
    /// Center.
    pub v: Point3,
    /// Axis of revolution.
    pub n: Vec3,
    /// Major radius, center to tube center.
    pub r1: f64,
    /// Minor radius of the tube.
    pub r2: f64,
}

impl Tor {
    /// Torus from center, axis and radii.
    pub fn new(v: Point3, n: Vec3, r1: f64, r2: f64) -> Self {
        Self { v, n, r1, r2 }
    }

    pub(crate) fn prep(&self, tol: &Tolerance) -> Result<(TorSpecific, Aabb3, BoundingSphere)> {
        if tol.degenerate(&self.n) {
            return Err(SolidError::Degenerate {
                kind: SolidKind::Tor,
                what: "axis",
            });
        }
        if self.r2 <= tol.len || self.r1 <= tol.len {
            return Err(SolidError::Degenerate {
                kind: SolidKind::Tor,
                what: "radius",
            });
        }
        if self.r2 > self.r1 {
            return Err(SolidError::Invalid {
                kind: SolidKind::Tor,
                reason: format!("minor radius {} exceeds major radius {}", self.r2, self.r1),
            });
        }
        let axis = Dir3::new_normalize(self.n);
        let half = Vec3::from_fn(|i, _| self.r1 * (1.0 - axis[i] * axis[i]).max(0.0).sqrt() + self.r2);
        Ok((
            TorSpecific {
                v: self.v,
                axis,
                r1: self.r1,
                r2: self.r2,
            },
            Aabb3::from_center_half_extent(&self.v, &half),
            BoundingSphere::new(self.v, self.r1 + self.r2),
        ))
    }
}

impl fmt::Display for Tor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "torus V=({:.4}, {:.4}, {:.4})", self.v.x, self.v.y, self.v.z)?;
        writeln!(f, "  N=({:.4}, {:.4}, {:.4})", self.n.x, self.n.y, self.n.z)?;
        writeln!(f, "  r1={:.4} r2={:.4}", self.r1, self.r2)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct TorSpecific {
    v: Point3,
    axis: Dir3,
    r1: f64,
    r2: f64,
}

impl TorSpecific {
    fn contains(&self, p: &Point3) -> bool {
        let rel = p - self.v;
        let h = rel.dot(self.axis.as_ref());
        let radial = (rel - h * self.axis.as_ref()).norm();
        (radial - self.r1).powi(2) + h * h < self.r2 * self.r2
    }

    pub(crate) fn shoot(&self, ray: &Ray, sink: &mut dyn SegmentSink) -> usize {
        let axis = self.axis.as_ref();
        let d = ray.direction.as_ref();
        let o = ray.origin - self.v;

        let big = self.r1 * self.r1;
        let small = self.r2 * self.r2;
        let od = o.dot(d);
        let oa = o.dot(axis);
        let da = d.dot(axis);
        let k = o.norm_squared() - big - small;

        // (|p|^2 - R^2 - r^2)^2 = 4 R^2 (r^2 - (p.axis)^2) with p = o + t d, |d| = 1
        let quartic = Quartic::new(
            1.0,
            4.0 * od,
            2.0 * k + 4.0 * od * od + 4.0 * big * da * da,
            4.0 * k * od + 8.0 * big * oa * da,
            k * k - 4.0 * big * (small - oa * oa),
        );
        let roots = quartic.real_roots();

        let mut count = 0;
        let mut open: Option<f64> = None;
        for pair in roots.windows(2) {
            let (t0, t1) = (pair[0], pair[1]);
            let inside = self.contains(&ray.at(0.5 * (t0 + t1)));
            match (inside, open) {
                (true, None) => open = Some(t0),
                (false, Some(t_in)) => {
                    sink.push_segment(Hit::new(t_in, 0), Hit::new(t0, 0));
                    count += 1;
                    open = None;
                }
                _ => {}
            }
        }
        if let (Some(t_in), Some(&t_out)) = (open, roots.last()) {
            sink.push_segment(Hit::new(t_in, 0), Hit::new(t_out, 0));
            count += 1;
        }
        count
    }

    pub(crate) fn normal(&self, hit: &Hit, ray: &Ray) -> Dir3 {
        let rel = hit.point(ray) - self.v;
        let h = rel.dot(self.axis.as_ref());
        let radial = rel - h * self.axis.as_ref();
        if radial.norm() < 1e-12 {
            return self.axis;
        }
        let tube_center = radial.normalize() * self.r1;
        Dir3::new_normalize(rel - tube_center)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ring() -> TorSpecific {
        Tor::new(Point3::origin(), Vec3::z(), 10.0, 3.0)
            .prep(&Tolerance::DEFAULT)
            .unwrap()
            .0
    }

    fn shoot(spec: &TorSpecific, ray: &Ray) -> Vec<(Hit, Hit)> {
        let mut segs = Vec::new();
        spec.shoot(ray, &mut segs);
        segs
    }

    #[test]
    fn test_through_both_tubes() {
        let ray = Ray::new(Point3::new(-20.0, 0.0, 0.0), Vec3::x());
        let segs = shoot(&ring(), &ray);
        assert_eq!(segs.len(), 2);
        assert_relative_eq!(segs[0].0.dist(), 7.0, epsilon = 1e-8);
        assert_relative_eq!(segs[0].1.dist(), 13.0, epsilon = 1e-8);
        assert_relative_eq!(segs[1].0.dist(), 27.0, epsilon = 1e-8);
        assert_relative_eq!(segs[1].1.dist(), 33.0, epsilon = 1e-8);
    }

    #[test]
    fn test_normals_point_out_of_tube() {
        let spec = ring();
        let ray = Ray::new(Point3::new(-20.0, 0.0, 0.0), Vec3::x());
        let segs = shoot(&spec, &ray);
        assert_relative_eq!(spec.normal(&segs[0].0, &ray).x, -1.0, epsilon = 1e-8);
        assert_relative_eq!(spec.normal(&segs[0].1, &ray).x, 1.0, epsilon = 1e-8);
    }

    #[test]
    fn test_down_through_tube() {
        let ray = Ray::new(Point3::new(10.0, 0.0, 10.0), -Vec3::z());
        let segs = shoot(&ring(), &ray);
        assert_eq!(segs.len(), 1);
        assert_relative_eq!(segs[0].0.dist(), 7.0, epsilon = 1e-8);
        assert_relative_eq!(segs[0].1.dist(), 13.0, epsilon = 1e-8);
    }

    #[test]
    fn test_through_hole_misses() {
        let ray = Ray::new(Point3::new(0.0, 0.0, 10.0), -Vec3::z());
        assert!(shoot(&ring(), &ray).is_empty());
    }

    #[test]
    fn test_above_misses() {
        let ray = Ray::new(Point3::new(-20.0, 0.0, 10.0), Vec3::x());
        assert!(shoot(&ring(), &ray).is_empty());
    }

    #[test]
    fn test_fat_minor_radius_rejected() {
        let tor = Tor::new(Point3::origin(), Vec3::z(), 1.0, 2.0);
        assert!(tor.prep(&Tolerance::DEFAULT).is_err());
    }
}
