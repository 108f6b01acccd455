//! Half-space: everything on the inner side of a plane.
//!
//! The only infinite solid kind. Its unbounded end is reported at
//! `±FAR_DIST`.

use std::fmt;

use csgray_math::{Dir3, Tolerance, Vec3, FAR_DIST};

use crate::error::{Result, SolidError};
use crate::{Hit, Ray, SegmentSink, SolidKind};

const SURF_PLANE: u32 = 0;
const SURF_NEAR_INFINITY: u32 = 1;
const SURF_FAR_INFINITY: u32 = 2;

/// Half-space `{ p : normal . p <= d }`; `normal` points out of the solid.
#[derive(Debug, Clone, PartialEq)]
pub struct Half {
    /// Outward normal of the bounding plane.
    pub normal: Vec3,
    /// Distance of the plane from the origin along the normal.
    pub d: f64,
}

impl Half {
    /// Half-space from outward normal and plane distance.
    pub fn new(normal: Vec3, d: f64) -> Self {
        Self { normal, d }
    }

    pub(crate) fn prep(&self, tol: &Tolerance) -> Result<HalfSpecific> {
        if tol.degenerate(&self.normal) {
            return Err(SolidError::Degenerate {
                kind: SolidKind::Half,
                what: "normal",
            });
        }
        let len = self.normal.norm();
        Ok(HalfSpecific {
            normal: Dir3::new_normalize(self.normal),
            d: self.d / len,
        })
    }
}

impl fmt::Display for Half {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "half-space N=({:.4}, {:.4}, {:.4}) d={:.4}",
            self.normal.x, self.normal.y, self.normal.z, self.d
        )
    }
}

#[derive(Debug, Clone)]
pub(crate) struct HalfSpecific {
    normal: Dir3,
    d: f64,
}

impl HalfSpecific {
    pub(crate) fn shoot(&self, ray: &Ray, tol: &Tolerance, sink: &mut dyn SegmentSink) -> usize {
        let slant = self.normal.dot(ray.direction.as_ref());
        // Positive when the origin is outside.
        let above = self.normal.dot(&ray.origin.coords) - self.d;

        let near = Hit::new(-FAR_DIST, SURF_NEAR_INFINITY);
        let far = Hit::new(FAR_DIST, SURF_FAR_INFINITY);

        if slant.abs() < tol.len {
            if above > 0.0 {
                return 0;
            }
            sink.push_segment(near, far);
            return 1;
        }

        let t = -above / slant;
        if slant < 0.0 {
            sink.push_segment(Hit::new(t, SURF_PLANE), far);
        } else {
            sink.push_segment(near, Hit::new(t, SURF_PLANE));
        }
        1
    }

    pub(crate) fn normal(&self, hit: &Hit, ray: &Ray) -> Dir3 {
        match hit.surface() {
            SURF_NEAR_INFINITY => -ray.direction,
            SURF_FAR_INFINITY => ray.direction,
            _ => self.normal,
        }
    }
}
