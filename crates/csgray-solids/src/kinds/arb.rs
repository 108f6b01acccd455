//! General ARB: a convex polyhedron with up to six planar faces.
//!
//! The solid is given by eight vertices in the usual order (points 1-4 are
//! one face, 5-8 the opposite face, 1 joined to 5 and so on). Coincident
//! vertices describe the 4- to 7-vertex variants; faces that collapse to a
//! line or point are dropped at prep. Rays are clipped against the face
//! planes.

use std::fmt;

use csgray_math::{Aabb3, Dir3, Point3, Tolerance, Vec3};

use crate::error::{Result, SolidError};
use crate::{Hit, Ray, SegmentSink, SolidKind};

/// Vertex indices of the six candidate faces.
const FACES: [[usize; 4]; 6] = [
    [0, 1, 2, 3],
    [4, 5, 6, 7],
    [0, 4, 7, 3],
    [1, 2, 6, 5],
    [0, 1, 5, 4],
    [3, 2, 6, 7],
];

/// ARB parameters: eight vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct Arb {
    /// The eight vertices.
    pub pts: [Point3; 8],
}

impl Arb {
    /// ARB from eight vertices.
    pub fn new(pts: [Point3; 8]) -> Self {
        Self { pts }
    }

    /// Axis-aligned box between two corners.
    pub fn from_rpp(min: Point3, max: Point3) -> Self {
        let p = |x: f64, y: f64, z: f64| Point3::new(x, y, z);
        Self {
            pts: [
                p(min.x, min.y, min.z),
                p(max.x, min.y, min.z),
                p(max.x, max.y, min.z),
                p(min.x, max.y, min.z),
                p(min.x, min.y, max.z),
                p(max.x, min.y, max.z),
                p(max.x, max.y, max.z),
                p(min.x, max.y, max.z),
            ],
        }
    }

    pub(crate) fn prep(&self, tol: &Tolerance) -> Result<(ArbSpecific, Aabb3)> {
        let mut aabb = Aabb3::empty();
        for p in &self.pts {
            aabb.include_point(p);
        }
        let centroid = Point3::from(self.pts.iter().map(|p| p.coords).sum::<Vec3>() / 8.0);

        let mut faces = Vec::with_capacity(FACES.len());
        for idx in &FACES {
            let Some(normal) = face_normal(idx.map(|i| self.pts[i]), tol) else {
                continue;
            };
            let anchor = self.pts[idx[0]];
            // Orient outward: the centroid must be on the inner side.
            let normal = if normal.dot(&(centroid - anchor)) > 0.0 {
                -normal
            } else {
                normal
            };
            let d = normal.dot(&anchor.coords);
            if faces
                .iter()
                .any(|f: &Face| f.normal.dot(normal.as_ref()) > 1.0 - tol.perp && (f.d - d).abs() < tol.dist)
            {
                continue;
            }
            faces.push(Face { normal, d });
        }

        if faces.len() < 4 {
            return Err(SolidError::Invalid {
                kind: SolidKind::Arb,
                reason: format!("only {} usable faces", faces.len()),
            });
        }
        Ok((ArbSpecific { faces }, aabb))
    }
}

/// Unit normal of the plane through a face's distinct vertices.
fn face_normal(pts: [Point3; 4], tol: &Tolerance) -> Option<Dir3> {
    let mut distinct: Vec<Point3> = Vec::with_capacity(4);
    for p in pts {
        if distinct.iter().all(|q| (p - q).norm() > tol.len) {
            distinct.push(p);
        }
    }
    if distinct.len() < 3 {
        return None;
    }
    // Largest cross product over the distinct triples.
    let mut best = Vec3::zeros();
    for i in 1..distinct.len() {
        for j in (i + 1)..distinct.len() {
            let n = (distinct[i] - distinct[0]).cross(&(distinct[j] - distinct[0]));
            if n.norm_squared() > best.norm_squared() {
                best = n;
            }
        }
    }
    if tol.degenerate(&best) {
        return None;
    }
    Some(Dir3::new_normalize(best))
}

impl fmt::Display for Arb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "arb8")?;
        for (i, p) in self.pts.iter().enumerate() {
            writeln!(f, "  {}=({:.4}, {:.4}, {:.4})", i + 1, p.x, p.y, p.z)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct Face {
    normal: Dir3,
    d: f64,
}

#[derive(Debug, Clone)]
pub(crate) struct ArbSpecific {
    faces: Vec<Face>,
}

impl ArbSpecific {
    pub(crate) fn shoot(&self, ray: &Ray, tol: &Tolerance, sink: &mut dyn SegmentSink) -> usize {
        let mut t_in = f64::NEG_INFINITY;
        let mut t_out = f64::INFINITY;
        let mut in_face = None;
        let mut out_face = None;

        for (i, face) in self.faces.iter().enumerate() {
            let dn = face.normal.dot(ray.direction.as_ref());
            // Positive when the origin is outside this face.
            let above = face.normal.dot(&ray.origin.coords) - face.d;

            if dn.abs() < tol.len {
                if above > tol.dist {
                    return 0;
                }
                continue;
            }
            let t = -above / dn;
            if dn < 0.0 {
                if t > t_in {
                    t_in = t;
                    in_face = Some(i);
                }
            } else if t < t_out {
                t_out = t;
                out_face = Some(i);
            }
            if t_in >= t_out {
                return 0;
            }
        }

        match (in_face, out_face) {
            (Some(i), Some(o)) => {
                sink.push_segment(Hit::new(t_in, i as u32), Hit::new(t_out, o as u32));
                1
            }
            _ => 0,
        }
    }

    pub(crate) fn normal(&self, hit: &Hit) -> Dir3 {
        self.faces[hit.surface() as usize].normal
    }
}
