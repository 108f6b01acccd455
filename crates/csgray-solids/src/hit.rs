//! Ray/solid hit records and the sink shoot routines write segments into.

use crate::Ray;
use csgray_math::{Point3, Vec3};

/// One ray/surface intersection.
///
/// Only the distance is stored eagerly. The hit point is derived from the
/// ray, and the outward normal is derived by the owning solid from the
/// surface number and the private vector its shoot routine stashed here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    dist: f64,
    surf: u32,
    vpriv: Vec3,
}

impl Hit {
    /// Hit at `dist` on surface `surf`.
    pub fn new(dist: f64, surf: u32) -> Self {
        Self {
            dist,
            surf,
            vpriv: Vec3::zeros(),
        }
    }

    /// Hit carrying a solid-private vector for later normal computation.
    pub fn with_private(dist: f64, surf: u32, vpriv: Vec3) -> Self {
        Self { dist, surf, vpriv }
    }

    /// Signed distance from the ray origin.
    #[inline]
    pub fn dist(&self) -> f64 {
        self.dist
    }

    /// Solid-specific surface number.
    #[inline]
    pub fn surface(&self) -> u32 {
        self.surf
    }

    /// Solid-private vector.
    #[inline]
    pub fn private(&self) -> &Vec3 {
        &self.vpriv
    }

    /// Intersection point on `ray`.
    #[inline]
    pub fn point(&self, ray: &Ray) -> Point3 {
        ray.at(self.dist)
    }
}

/// Destination for the segments a shoot routine produces.
///
/// Every pushed pair satisfies `inhit.dist() <= outhit.dist()`, and pairs
/// from one solid are pushed in increasing distance order.
pub trait SegmentSink {
    /// Accept one entry/exit pair.
    fn push_segment(&mut self, inhit: Hit, outhit: Hit);
}

impl SegmentSink for Vec<(Hit, Hit)> {
    fn push_segment(&mut self, inhit: Hit, outhit: Hit) {
        self.push((inhit, outhit));
    }
}
