//! Truncated general cone and right elliptical cylinder.
//!
//! Both are handled in the affine frame spanned by the base semi-axes `A`,
//! `B` and the height vector `H`. In that frame the base is the unit disc at
//! `z = 0`, the top is a disc of radius `r` at `z = 1`, and the lateral
//! surface is `x^2 + y^2 = (1 + (r - 1) z)^2`, a quadric. This covers every
//! cone whose top ellipse is a scaled copy of the base (`C = r A`,
//! `D = r B`), oblique or not.

use std::fmt;

use csgray_math::{Aabb3, Dir3, Mat3, Point3, Tolerance, Vec3};

use crate::error::{Result, SolidError};
use crate::poly::quadratic_roots;
use crate::{Hit, Ray, SegmentSink, SolidKind};

const SURF_BODY: u32 = 0;
const SURF_BASE: u32 = 1;
const SURF_TOP: u32 = 2;

/// Truncated general cone: base at `v` with semi-axes `a`, `b`; top at
/// `v + h` with semi-axes `c`, `d`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tgc {
    /// Base center.
    pub v: Point3,
    /// Height vector from base to top center.
    pub h: Vec3,
    /// First base semi-axis.
    pub a: Vec3,
    /// Second base semi-axis.
    pub b: Vec3,
    /// First top semi-axis, parallel to `a`.
    pub c: Vec3,
    /// Second top semi-axis, parallel to `b`.
    pub d: Vec3,
}

impl Tgc {
    /// Cone from its six defining vectors.
    pub fn new(v: Point3, h: Vec3, a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> Self {
        Self { v, h, a, b, c, d }
    }

    /// Right circular truncated cone along `h` with base and top radii.
    pub fn right_circular(v: Point3, h: Vec3, r_base: f64, r_top: f64) -> Self {
        let axis = h.normalize();
        let a_dir = any_perpendicular(&axis);
        let b_dir = axis.cross(&a_dir);
        Self::new(v, h, a_dir * r_base, b_dir * r_base, a_dir * r_top, b_dir * r_top)
    }

    pub(crate) fn prep(&self, tol: &Tolerance) -> Result<(ConeSpecific, Aabb3)> {
        let kind = SolidKind::Tgc;
        let ratio_c = top_ratio(kind, &self.a, &self.c, "C", tol)?;
        let ratio_d = top_ratio(kind, &self.b, &self.d, "D", tol)?;
        if (ratio_c - ratio_d).abs() > tol.perp * ratio_c.max(ratio_d).max(1.0) {
            return Err(SolidError::Invalid {
                kind,
                reason: format!("top ellipse is not a scaled base (|C|/|A|={ratio_c:.6}, |D|/|B|={ratio_d:.6})"),
            });
        }
        let spec = ConeSpecific::new(kind, self.v, &self.h, &self.a, &self.b, ratio_c, tol)?;
        let aabb = cone_aabb(&self.v, &self.h, &self.a, &self.b, &self.c, &self.d);
        Ok((spec, aabb))
    }
}

impl fmt::Display for Tgc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "truncated general cone V=({:.4}, {:.4}, {:.4})", self.v.x, self.v.y, self.v.z)?;
        for (name, vec) in [("H", &self.h), ("A", &self.a), ("B", &self.b), ("C", &self.c), ("D", &self.d)] {
            writeln!(f, "  {name}=({:.4}, {:.4}, {:.4}) mag={:.4}", vec.x, vec.y, vec.z, vec.norm())?;
        }
        Ok(())
    }
}

/// Right elliptical cylinder: base at `v`, height `h`, semi-axes `a`, `b`
/// perpendicular to `h` and to each other.
#[derive(Debug, Clone, PartialEq)]
pub struct Rec {
    /// Base center.
    pub v: Point3,
    /// Height vector.
    pub h: Vec3,
    /// First semi-axis.
    pub a: Vec3,
    /// Second semi-axis.
    pub b: Vec3,
}

impl Rec {
    /// Cylinder from its four defining vectors.
    pub fn new(v: Point3, h: Vec3, a: Vec3, b: Vec3) -> Self {
        Self { v, h, a, b }
    }

    /// Right circular cylinder of radius `r` along `h`.
    pub fn circular(v: Point3, h: Vec3, r: f64) -> Self {
        let axis = h.normalize();
        let a_dir = any_perpendicular(&axis);
        Self::new(v, h, a_dir * r, axis.cross(&a_dir) * r)
    }

    pub(crate) fn prep(&self, tol: &Tolerance) -> Result<(ConeSpecific, Aabb3)> {
        let kind = SolidKind::Rec;
        let spec = ConeSpecific::new(kind, self.v, &self.h, &self.a, &self.b, 1.0, tol)?;
        let pairs = [("A", &self.a, "H", &self.h), ("B", &self.b, "H", &self.h), ("A", &self.a, "B", &self.b)];
        for (n1, v1, n2, v2) in pairs {
            if !tol.perpendicular(&v1.normalize(), &v2.normalize()) {
                return Err(SolidError::NotPerpendicular {
                    kind,
                    first: n1,
                    second: n2,
                });
            }
        }
        let aabb = cone_aabb(&self.v, &self.h, &self.a, &self.b, &self.a, &self.b);
        Ok((spec, aabb))
    }
}

impl fmt::Display for Rec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "right elliptical cylinder V=({:.4}, {:.4}, {:.4})", self.v.x, self.v.y, self.v.z)?;
        for (name, vec) in [("H", &self.h), ("A", &self.a), ("B", &self.b)] {
            writeln!(f, "  {name}=({:.4}, {:.4}, {:.4}) mag={:.4}", vec.x, vec.y, vec.z, vec.norm())?;
        }
        Ok(())
    }
}

/// `|top| / |base|`, checking that `top` runs the same way as `base`.
fn top_ratio(kind: SolidKind, base: &Vec3, top: &Vec3, name: &'static str, tol: &Tolerance) -> Result<f64> {
    if tol.degenerate(base) {
        return Err(SolidError::Degenerate {
            kind,
            what: if name == "C" { "A" } else { "B" },
        });
    }
    if tol.degenerate(top) {
        return Ok(0.0);
    }
    let cos = base.normalize().dot(&top.normalize());
    if cos < 1.0 - tol.perp {
        return Err(SolidError::Invalid {
            kind,
            reason: format!("{name} is not parallel to its base axis"),
        });
    }
    Ok(top.norm() / base.norm())
}

fn any_perpendicular(axis: &Vec3) -> Vec3 {
    let helper = if axis.x.abs() < 0.9 { Vec3::x() } else { Vec3::y() };
    axis.cross(&helper).normalize()
}

/// Box around the base and top ellipses.
fn cone_aabb(v: &Point3, h: &Vec3, a: &Vec3, b: &Vec3, c: &Vec3, d: &Vec3) -> Aabb3 {
    let ellipse_half = |p: &Vec3, q: &Vec3| Vec3::from_fn(|i, _| (p[i] * p[i] + q[i] * q[i]).sqrt());
    let mut aabb = Aabb3::from_center_half_extent(v, &ellipse_half(a, b));
    aabb.include_box(&Aabb3::from_center_half_extent(&(v + h), &ellipse_half(c, d)));
    aabb
}

/// Prepared cone: world-to-frame matrix and the top radius in frame units.
#[derive(Debug, Clone)]
pub(crate) struct ConeSpecific {
    v: Point3,
    to_frame: Mat3,
    r: f64,
}

impl ConeSpecific {
    fn new(kind: SolidKind, v: Point3, h: &Vec3, a: &Vec3, b: &Vec3, r: f64, tol: &Tolerance) -> Result<Self> {
        for (name, vec) in [("H", h), ("A", a), ("B", b)] {
            if tol.degenerate(vec) {
                return Err(SolidError::Degenerate { kind, what: name });
            }
        }
        let to_frame = Mat3::from_columns(&[*a, *b, *h])
            .try_inverse()
            .ok_or(SolidError::Degenerate {
                kind,
                what: "frame (H lies in the base plane)",
            })?;
        Ok(Self { v, to_frame, r })
    }

    pub(crate) fn shoot(&self, ray: &Ray, sink: &mut dyn SegmentSink) -> usize {
        let o = self.to_frame * (ray.origin - self.v);
        let d = self.to_frame * ray.direction.as_ref();
        let k = self.r - 1.0;

        let mut hits: Vec<Hit> = Vec::with_capacity(4);

        // Lateral surface: x^2 + y^2 - (1 + k z)^2 = 0
        let qa = d.x * d.x + d.y * d.y - k * k * d.z * d.z;
        let qb = 2.0 * (o.x * d.x + o.y * d.y - k * d.z * (1.0 + k * o.z));
        let qc = o.x * o.x + o.y * o.y - (1.0 + k * o.z) * (1.0 + k * o.z);
        for t in quadratic_roots(qa, qb, qc) {
            let p = o + t * d;
            if (0.0..=1.0).contains(&p.z) {
                hits.push(Hit::with_private(t, SURF_BODY, p));
            }
        }

        if d.z.abs() > 1e-12 {
            for (z, radius, surf) in [(0.0, 1.0, SURF_BASE), (1.0, self.r, SURF_TOP)] {
                let t = (z - o.z) / d.z;
                let p = o + t * d;
                if p.x * p.x + p.y * p.y <= radius * radius {
                    hits.push(Hit::with_private(t, surf, p));
                }
            }
        }

        if hits.len() < 2 {
            return 0;
        }
        hits.sort_by(|x, y| x.dist().total_cmp(&y.dist()));
        // Convex: the nearest and farthest surface crossings bound the solid.
        let (first, last) = (hits[0], hits[hits.len() - 1]);
        if last.dist() <= first.dist() {
            return 0;
        }
        sink.push_segment(first, last);
        1
    }

    pub(crate) fn normal(&self, hit: &Hit) -> Dir3 {
        let grad = match hit.surface() {
            SURF_BASE => Vec3::new(0.0, 0.0, -1.0),
            SURF_TOP => Vec3::new(0.0, 0.0, 1.0),
            _ => {
                let p = hit.private();
                let k = self.r - 1.0;
                Vec3::new(p.x, p.y, -k * (1.0 + k * p.z))
            }
        };
        Dir3::new_normalize(self.to_frame.transpose() * grad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn shoot(spec: &ConeSpecific, ray: &Ray) -> Vec<(Hit, Hit)> {
        let mut segs = Vec::new();
        spec.shoot(ray, &mut segs);
        segs
    }

    #[test]
    fn test_cylinder_side_on() {
        let rec = Rec::circular(Point3::origin(), Vec3::new(0.0, 0.0, 4.0), 1.0);
        let (spec, aabb) = rec.prep(&Tolerance::DEFAULT).unwrap();
        let ray = Ray::new(Point3::new(-5.0, 0.0, 2.0), Vec3::x());
        let segs = shoot(&spec, &ray);
        assert_eq!(segs.len(), 1);
        assert_relative_eq!(segs[0].0.dist(), 4.0, epsilon = 1e-9);
        assert_relative_eq!(segs[0].1.dist(), 6.0, epsilon = 1e-9);
        assert_relative_eq!(spec.normal(&segs[0].0).x, -1.0, epsilon = 1e-9);
        assert_relative_eq!(aabb.max.z, 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_cylinder_along_axis_hits_caps() {
        let rec = Rec::circular(Point3::origin(), Vec3::new(0.0, 0.0, 4.0), 1.0);
        let (spec, _) = rec.prep(&Tolerance::DEFAULT).unwrap();
        let ray = Ray::new(Point3::new(0.2, 0.0, -1.0), Vec3::z());
        let segs = shoot(&spec, &ray);
        assert_relative_eq!(segs[0].0.dist(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(segs[0].1.dist(), 5.0, epsilon = 1e-9);
        assert_relative_eq!(spec.normal(&segs[0].0).z, -1.0, epsilon = 1e-9);
        assert_relative_eq!(spec.normal(&segs[0].1).z, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_cone_narrows_toward_top() {
        // Base radius 2 at z=0, top radius 1 at z=2.
        let tgc = Tgc::right_circular(Point3::origin(), Vec3::new(0.0, 0.0, 2.0), 2.0, 1.0);
        let (spec, _) = tgc.prep(&Tolerance::DEFAULT).unwrap();
        let ray = Ray::new(Point3::new(-5.0, 0.0, 1.0), Vec3::x());
        let segs = shoot(&spec, &ray);
        // Radius 1.5 at z=1.
        assert_relative_eq!(segs[0].0.dist(), 3.5, epsilon = 1e-9);
        assert_relative_eq!(segs[0].1.dist(), 6.5, epsilon = 1e-9);
        let n = spec.normal(&segs[0].0);
        assert!(n.x < 0.0 && n.z > 0.0);
    }

    #[test]
    fn test_cone_to_apex() {
        let tgc = Tgc::right_circular(Point3::origin(), Vec3::new(0.0, 0.0, 2.0), 1.0, 0.0);
        let (spec, _) = tgc.prep(&Tolerance::DEFAULT).unwrap();
        let ray = Ray::new(Point3::new(0.0, 0.0, -1.0), Vec3::z());
        let segs = shoot(&spec, &ray);
        assert_eq!(segs.len(), 1);
        assert_relative_eq!(segs[0].0.dist(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(segs[0].1.dist(), 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_miss_above_top() {
        let rec = Rec::circular(Point3::origin(), Vec3::new(0.0, 0.0, 4.0), 1.0);
        let (spec, _) = rec.prep(&Tolerance::DEFAULT).unwrap();
        let ray = Ray::new(Point3::new(-5.0, 0.0, 4.5), Vec3::x());
        assert!(shoot(&spec, &ray).is_empty());
    }

    #[test]
    fn test_unequal_ratios_rejected() {
        let tgc = Tgc::new(
            Point3::origin(),
            Vec3::z(),
            Vec3::x(),
            Vec3::y(),
            Vec3::x() * 0.5,
            Vec3::y() * 0.8,
        );
        assert!(matches!(tgc.prep(&Tolerance::DEFAULT), Err(SolidError::Invalid { .. })));
    }

    #[test]
    fn test_oblique_rec_rejected() {
        let rec = Rec::new(Point3::origin(), Vec3::new(1.0, 0.0, 1.0), Vec3::x(), Vec3::y());
        assert!(matches!(
            rec.prep(&Tolerance::DEFAULT),
            Err(SolidError::NotPerpendicular { .. })
        ));
    }
}
