//! Ellipsoid defined by a center and three perpendicular semi-axes.
//!
//! Prep builds the affine map taking the ellipsoid to the unit sphere; a
//! ray is pushed through the same map and intersected with the sphere.

use std::fmt;

use csgray_math::{Aabb3, Dir3, Mat3, Point3, Tolerance, Vec3};

use crate::error::{Result, SolidError};
use crate::poly::quadratic_roots;
use crate::{Hit, Ray, SegmentSink, SolidKind};

/// Ellipsoid parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Ell {
    /// Center.
    pub v: Point3,
    /// First semi-axis.
    pub a: Vec3,
    /// Second semi-axis.
    pub b: Vec3,
    /// Third semi-axis.
    pub c: Vec3,
}

impl Ell {
    /// Ellipsoid from center and semi-axes.
    pub fn new(v: Point3, a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self { v, a, b, c }
    }

    /// Sphere of the given radius.
    pub fn sphere(center: Point3, radius: f64) -> Self {
        Self {
            v: center,
            a: Vec3::x() * radius,
            b: Vec3::y() * radius,
            c: Vec3::z() * radius,
        }
    }

    pub(crate) fn prep(&self, tol: &Tolerance) -> Result<(EllSpecific, Aabb3)> {
        let axes = [("A", &self.a), ("B", &self.b), ("C", &self.c)];
        for (name, axis) in axes {
            if tol.degenerate(axis) {
                return Err(SolidError::Degenerate {
                    kind: SolidKind::Ell,
                    what: name,
                });
            }
        }
        for (i, j) in [(0, 1), (1, 2), (0, 2)] {
            let (ni, ai) = axes[i];
            let (nj, aj) = axes[j];
            if !tol.perpendicular(&ai.normalize(), &aj.normalize()) {
                return Err(SolidError::NotPerpendicular {
                    kind: SolidKind::Ell,
                    first: ni,
                    second: nj,
                });
            }
        }

        // Row i is axis_i / |axis_i|^2: unit direction scaled by 1/|axis_i|.
        let scale_rows = Mat3::from_rows(&[
            (self.a / self.a.norm_squared()).transpose(),
            (self.b / self.b.norm_squared()).transpose(),
            (self.c / self.c.norm_squared()).transpose(),
        ]);

        let half = Vec3::from_fn(|i, _| {
            (self.a[i] * self.a[i] + self.b[i] * self.b[i] + self.c[i] * self.c[i]).sqrt()
        });
        let aabb = Aabb3::from_center_half_extent(&self.v, &half);

        Ok((
            EllSpecific {
                v: self.v,
                sor: scale_rows,
            },
            aabb,
        ))
    }
}

impl fmt::Display for Ell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ellipsoid V=({:.4}, {:.4}, {:.4})", self.v.x, self.v.y, self.v.z)?;
        for (name, axis) in [("A", &self.a), ("B", &self.b), ("C", &self.c)] {
            writeln!(
                f,
                "  {name}=({:.4}, {:.4}, {:.4}) mag={:.4}",
                axis.x,
                axis.y,
                axis.z,
                axis.norm()
            )?;
        }
        Ok(())
    }
}

/// Prepared ellipsoid: center and world-to-unit-sphere matrix.
#[derive(Debug, Clone)]
pub(crate) struct EllSpecific {
    v: Point3,
    sor: Mat3,
}

impl EllSpecific {
    pub(crate) fn shoot(&self, ray: &Ray, sink: &mut dyn SegmentSink) -> usize {
        let o = self.sor * (ray.origin - self.v);
        let d = self.sor * ray.direction.as_ref();

        let roots = quadratic_roots(d.norm_squared(), 2.0 * o.dot(&d), o.norm_squared() - 1.0);
        match roots.as_slice() {
            // Tangent rays are misses.
            [t0, t1] if t1 > t0 => {
                sink.push_segment(
                    Hit::with_private(*t0, 0, o + *t0 * d),
                    Hit::with_private(*t1, 0, o + *t1 * d),
                );
                1
            }
            _ => 0,
        }
    }

    pub(crate) fn normal(&self, hit: &Hit) -> Dir3 {
        Dir3::new_normalize(self.sor.transpose() * hit.private())
    }
}
