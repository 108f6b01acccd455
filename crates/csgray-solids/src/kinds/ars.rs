//! ARS: a closed faceted surface swept through a stack of curves.
//!
//! Each curve is a closed loop with the same number of points. Adjacent
//! curves are stitched into triangles; curves collapsed to a single point
//! close off the ends. The triangle soup is intersected facet by facet and
//! the sorted hits are paired into entry/exit segments.

use std::fmt;

use csgray_math::{Aabb3, Dir3, Point3, Tolerance, Vec3};

use crate::error::{Result, SolidError};
use crate::{Hit, Ray, SegmentSink, SolidKind};

/// ARS parameters: curves of points.
#[derive(Debug, Clone, PartialEq)]
pub struct Ars {
    /// Closed curves, all with the same point count.
    pub curves: Vec<Vec<Point3>>,
}

impl Ars {
    /// ARS from its curves.
    pub fn new(curves: Vec<Vec<Point3>>) -> Self {
        Self { curves }
    }

    pub(crate) fn prep(&self, tol: &Tolerance) -> Result<(ArsSpecific, Aabb3)> {
        let invalid = |reason: String| SolidError::Invalid {
            kind: SolidKind::Ars,
            reason,
        };
        if self.curves.len() < 2 {
            return Err(invalid(format!("{} curves, need at least 2", self.curves.len())));
        }
        let per_curve = self.curves[0].len();
        if per_curve < 3 {
            return Err(invalid(format!("{per_curve} points per curve, need at least 3")));
        }
        if let Some(bad) = self.curves.iter().position(|c| c.len() != per_curve) {
            return Err(invalid(format!(
                "curve {bad} has {} points, expected {per_curve}",
                self.curves[bad].len()
            )));
        }

        let mut aabb = Aabb3::empty();
        let mut facets = Vec::new();
        for pair in self.curves.windows(2) {
            let (lo, hi) = (&pair[0], &pair[1]);
            for j in 0..per_curve {
                let k = (j + 1) % per_curve;
                for tri in [[lo[j], hi[j], hi[k]], [lo[j], hi[k], lo[k]]] {
                    if let Some(f) = Facet::new(tri, tol) {
                        facets.push(f);
                    }
                }
            }
        }
        for p in self.curves.iter().flatten() {
            aabb.include_point(p);
        }
        if facets.is_empty() {
            return Err(SolidError::Degenerate {
                kind: SolidKind::Ars,
                what: "surface",
            });
        }

        // Divergence theorem: a negative volume means the facets wind inward.
        let volume: f64 = facets
            .iter()
            .map(|f| f.p0.coords.dot(&f.e1.cross(&f.e2)))
            .sum();
        if volume < 0.0 {
            for f in facets.iter_mut() {
                f.normal = -f.normal;
            }
        }
        Ok((ArsSpecific { facets }, aabb))
    }
}

impl fmt::Display for Ars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let per_curve = self.curves.first().map_or(0, Vec::len);
        writeln!(f, "ars: {} curves, {} points each", self.curves.len(), per_curve)?;
        for (i, curve) in self.curves.iter().enumerate() {
            if let Some(p) = curve.first() {
                writeln!(f, "  curve {i} starts at ({:.4}, {:.4}, {:.4})", p.x, p.y, p.z)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct Facet {
    p0: Point3,
    e1: Vec3,
    e2: Vec3,
    normal: Dir3,
}

impl Facet {
    fn new([p0, p1, p2]: [Point3; 3], tol: &Tolerance) -> Option<Self> {
        let e1 = p1 - p0;
        let e2 = p2 - p0;
        let n = e1.cross(&e2);
        if tol.degenerate(&n) {
            return None;
        }
        Some(Self {
            p0,
            e1,
            e2,
            normal: Dir3::new_normalize(n),
        })
    }

    /// Moller-Trumbore intersection; returns the ray parameter.
    fn intersect(&self, ray: &Ray) -> Option<f64> {
        let pvec = ray.direction.cross(&self.e2);
        let det = self.e1.dot(&pvec);
        if det.abs() < 1e-12 {
            return None;
        }
        let inv_det = 1.0 / det;
        let tvec = ray.origin - self.p0;
        let u = tvec.dot(&pvec) * inv_det;
        if !(-1e-9..=1.0 + 1e-9).contains(&u) {
            return None;
        }
        let qvec = tvec.cross(&self.e1);
        let v = ray.direction.dot(&qvec) * inv_det;
        if v < -1e-9 || u + v > 1.0 + 1e-9 {
            return None;
        }
        Some(self.e2.dot(&qvec) * inv_det)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ArsSpecific {
    facets: Vec<Facet>,
}

impl ArsSpecific {
    pub(crate) fn shoot(&self, ray: &Ray, tol: &Tolerance, sink: &mut dyn SegmentSink) -> usize {
        let mut hits: Vec<(f64, usize, bool)> = self
            .facets
            .iter()
            .enumerate()
            .filter_map(|(i, f)| {
                let t = f.intersect(ray)?;
                let entering = f.normal.dot(ray.direction.as_ref()) < 0.0;
                Some((t, i, entering))
            })
            .collect();
        hits.sort_by(|a, b| a.0.total_cmp(&b.0));
        // A ray through a shared edge hits both neighbours.
        hits.dedup_by(|b, a| a.2 == b.2 && (a.0 - b.0).abs() < tol.dist);

        let mut count = 0;
        let mut open: Option<(f64, usize)> = None;
        for (t, facet, entering) in hits {
            match (entering, open) {
                (true, None) => open = Some((t, facet)),
                (false, Some((t_in, in_facet))) => {
                    sink.push_segment(
                        Hit::new(t_in, in_facet as u32),
                        Hit::new(t, facet as u32),
                    );
                    count += 1;
                    open = None;
                }
                // Inconsistent parity from a grazing hit; skip it.
                _ => {}
            }
        }
        count
    }

    pub(crate) fn normal(&self, hit: &Hit) -> Dir3 {
        self.facets[hit.surface() as usize].normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Square prism from z=0 to z=2 with apex-point caps.
    fn prism(reverse: bool) -> Ars {
        let square = |z: f64| {
            let mut pts = vec![
                Point3::new(-1.0, -1.0, z),
                Point3::new(1.0, -1.0, z),
                Point3::new(1.0, 1.0, z),
                Point3::new(-1.0, 1.0, z),
            ];
            if reverse {
                pts.reverse();
            }
            pts
        };
        let cap = |z: f64| vec![Point3::new(0.0, 0.0, z); 4];
        Ars::new(vec![cap(0.0), square(0.0), square(2.0), cap(2.0)])
    }

    fn shoot(ars: &Ars, ray: &Ray) -> (ArsSpecific, Vec<(Hit, Hit)>) {
        let (spec, _) = ars.prep(&Tolerance::DEFAULT).unwrap();
        let mut segs = Vec::new();
        spec.shoot(ray, &Tolerance::DEFAULT, &mut segs);
        (spec, segs)
    }

    #[test]
    fn test_prism_through_sides() {
        let ray = Ray::new(Point3::new(-5.0, 0.3, 1.0), Vec3::x());
        let (spec, segs) = shoot(&prism(false), &ray);
        assert_eq!(segs.len(), 1);
        assert_relative_eq!(segs[0].0.dist(), 4.0, epsilon = 1e-9);
        assert_relative_eq!(segs[0].1.dist(), 6.0, epsilon = 1e-9);
        assert_relative_eq!(spec.normal(&segs[0].0).x, -1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_winding_does_not_matter() {
        let ray = Ray::new(Point3::new(0.2, 0.1, -3.0), Vec3::z());
        for reverse in [false, true] {
            let (spec, segs) = shoot(&prism(reverse), &ray);
            assert_eq!(segs.len(), 1);
            assert_relative_eq!(segs[0].0.dist(), 3.0, epsilon = 1e-9);
            assert_relative_eq!(segs[0].1.dist(), 5.0, epsilon = 1e-9);
            assert_relative_eq!(spec.normal(&segs[0].0).z, -1.0, epsilon = 1e-9);
            assert_relative_eq!(spec.normal(&segs[0].1).z, 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_ray_through_diagonal_edge() {
        // Passes exactly through the diagonal seams of both caps.
        let ray = Ray::new(Point3::new(0.5, 0.5, -3.0), Vec3::z());
        let (_, segs) = shoot(&prism(false), &ray);
        assert_eq!(segs.len(), 1);
    }

    #[test]
    fn test_mismatched_curves_rejected() {
        let ars = Ars::new(vec![vec![Point3::origin(); 3], vec![Point3::origin(); 4]]);
        assert!(ars.prep(&Tolerance::DEFAULT).is_err());
    }
}
