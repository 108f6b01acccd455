#![warn(missing_docs)]

//! Primitive solids for the csgray ray-tracing core.
//!
//! Solids come in a closed set of kinds. Each kind has plain parameters
//! ([`Solid`]) that are validated and turned into ray-ready data by
//! [`Solid::prep`]. The resulting [`PreparedSolid`] carries the bounding
//! volumes used for cheap rejection and dispatches [`PreparedSolid::shoot`]
//! and [`PreparedSolid::normal`] to the kind's own routines.
//!
//! # Example
//!
//! ```
//! use csgray_math::{Point3, Tolerance, Vec3};
//! use csgray_solids::{Ell, Hit, Ray, Solid};
//!
//! let solid = Solid::Ell(Ell::sphere(Point3::new(0.0, 0.0, 5.0), 1.0));
//! let prepared = solid.prep(&Tolerance::DEFAULT).unwrap();
//!
//! let ray = Ray::new(Point3::origin(), Vec3::z());
//! let mut segs: Vec<(Hit, Hit)> = Vec::new();
//! prepared.shoot(&ray, &Tolerance::DEFAULT, &mut segs);
//! assert!((segs[0].0.dist() - 4.0).abs() < 1e-9);
//! ```

use std::fmt;

use csgray_math::{Aabb3, BoundingSphere, Dir3, Point3, Tolerance};

pub mod error;
mod hit;
mod kinds;
pub mod poly;
mod ray;

pub use error::SolidError;
pub use hit::{Hit, SegmentSink};
pub use kinds::{Arb, Ars, Ell, Half, Rec, Tgc, Tor};
pub use ray::Ray;

use kinds::{ArbSpecific, ArsSpecific, ConeSpecific, EllSpecific, HalfSpecific, TorSpecific};

/// Type tag of a solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SolidKind {
    /// Torus.
    Tor,
    /// Truncated general cone.
    Tgc,
    /// Ellipsoid.
    Ell,
    /// General convex polyhedron with up to eight vertices.
    Arb,
    /// Faceted surface built from curves.
    Ars,
    /// Half-space.
    Half,
    /// Right elliptical cylinder.
    Rec,
    /// Placeholder that is never hit.
    Null,
}

impl SolidKind {
    /// Every kind, in tag order.
    pub const ALL: [SolidKind; 8] = [
        SolidKind::Tor,
        SolidKind::Tgc,
        SolidKind::Ell,
        SolidKind::Arb,
        SolidKind::Ars,
        SolidKind::Half,
        SolidKind::Rec,
        SolidKind::Null,
    ];

    /// Short database name of the kind.
    pub fn name(self) -> &'static str {
        match self {
            SolidKind::Tor => "tor",
            SolidKind::Tgc => "tgc",
            SolidKind::Ell => "ell",
            SolidKind::Arb => "arb8",
            SolidKind::Ars => "ars",
            SolidKind::Half => "half",
            SolidKind::Rec => "rec",
            SolidKind::Null => "null",
        }
    }

    /// Position in [`SolidKind::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for SolidKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Solid parameters as they come from the database.
#[derive(Debug, Clone, PartialEq)]
pub enum Solid {
    /// Torus.
    Tor(Tor),
    /// Truncated general cone.
    Tgc(Tgc),
    /// Ellipsoid.
    Ell(Ell),
    /// Convex polyhedron.
    Arb(Arb),
    /// Faceted surface.
    Ars(Ars),
    /// Half-space.
    Half(Half),
    /// Right elliptical cylinder.
    Rec(Rec),
    /// Never hit.
    Null,
}

impl Solid {
    /// Type tag.
    pub fn kind(&self) -> SolidKind {
        match self {
            Solid::Tor(_) => SolidKind::Tor,
            Solid::Tgc(_) => SolidKind::Tgc,
            Solid::Ell(_) => SolidKind::Ell,
            Solid::Arb(_) => SolidKind::Arb,
            Solid::Ars(_) => SolidKind::Ars,
            Solid::Half(_) => SolidKind::Half,
            Solid::Rec(_) => SolidKind::Rec,
            Solid::Null => SolidKind::Null,
        }
    }

    /// Validate the parameters and build ray-ready data.
    pub fn prep(&self, tol: &Tolerance) -> Result<PreparedSolid, SolidError> {
        let (specific, aabb, bsphere) = match self {
            Solid::Tor(tor) => {
                let (spec, aabb, bsphere) = tor.prep(tol)?;
                (Specific::Tor(spec), aabb, bsphere)
            }
            Solid::Tgc(tgc) => {
                let (spec, aabb) = tgc.prep(tol)?;
                (Specific::Cone(spec), aabb, BoundingSphere::from_aabb(&aabb))
            }
            Solid::Rec(rec) => {
                let (spec, aabb) = rec.prep(tol)?;
                (Specific::Cone(spec), aabb, BoundingSphere::from_aabb(&aabb))
            }
            Solid::Ell(ell) => {
                let (spec, aabb) = ell.prep(tol)?;
                let radius = ell.a.norm().max(ell.b.norm()).max(ell.c.norm());
                (Specific::Ell(spec), aabb, BoundingSphere::new(ell.v, radius))
            }
            Solid::Arb(arb) => {
                let (spec, aabb) = arb.prep(tol)?;
                (Specific::Arb(spec), aabb, BoundingSphere::from_aabb(&aabb))
            }
            Solid::Ars(ars) => {
                let (spec, aabb) = ars.prep(tol)?;
                (Specific::Ars(spec), aabb, BoundingSphere::from_aabb(&aabb))
            }
            Solid::Half(half) => (
                Specific::Half(half.prep(tol)?),
                Aabb3::infinite(),
                BoundingSphere::infinite(),
            ),
            Solid::Null => (
                Specific::Null,
                Aabb3::empty(),
                BoundingSphere::new(Point3::origin(), 0.0),
            ),
        };
        Ok(PreparedSolid {
            kind: self.kind(),
            specific,
            aabb,
            bsphere,
        })
    }
}

impl fmt::Display for Solid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Solid::Tor(s) => fmt::Display::fmt(s, f),
            Solid::Tgc(s) => fmt::Display::fmt(s, f),
            Solid::Ell(s) => fmt::Display::fmt(s, f),
            Solid::Arb(s) => fmt::Display::fmt(s, f),
            Solid::Ars(s) => fmt::Display::fmt(s, f),
            Solid::Half(s) => fmt::Display::fmt(s, f),
            Solid::Rec(s) => fmt::Display::fmt(s, f),
            Solid::Null => writeln!(f, "null"),
        }
    }
}

#[derive(Debug, Clone)]
enum Specific {
    Tor(TorSpecific),
    Cone(ConeSpecific),
    Ell(EllSpecific),
    Arb(ArbSpecific),
    Ars(ArsSpecific),
    Half(HalfSpecific),
    Null,
}

/// A solid ready for ray shooting.
#[derive(Debug, Clone)]
pub struct PreparedSolid {
    kind: SolidKind,
    specific: Specific,
    aabb: Aabb3,
    bsphere: BoundingSphere,
}

impl PreparedSolid {
    /// Type tag.
    pub fn kind(&self) -> SolidKind {
        self.kind
    }

    /// Bounding box.
    pub fn aabb(&self) -> &Aabb3 {
        &self.aabb
    }

    /// Bounding sphere.
    pub fn bsphere(&self) -> &BoundingSphere {
        &self.bsphere
    }

    /// True for solids with no finite bounds. These are shot on every ray.
    pub fn is_infinite(&self) -> bool {
        self.bsphere.is_infinite()
    }

    /// Intersect `ray` with the solid, pushing entry/exit pairs into `sink`.
    ///
    /// Returns the number of segments pushed. Distances are along the full
    /// line of the ray, so a ray starting inside reports a negative entry.
    pub fn shoot(&self, ray: &Ray, tol: &Tolerance, sink: &mut dyn SegmentSink) -> usize {
        match &self.specific {
            Specific::Tor(s) => s.shoot(ray, sink),
            Specific::Cone(s) => s.shoot(ray, sink),
            Specific::Ell(s) => s.shoot(ray, sink),
            Specific::Arb(s) => s.shoot(ray, tol, sink),
            Specific::Ars(s) => s.shoot(ray, tol, sink),
            Specific::Half(s) => s.shoot(ray, tol, sink),
            Specific::Null => 0,
        }
    }

    /// Outward unit normal at a hit this solid produced on `ray`.
    pub fn normal(&self, hit: &Hit, ray: &Ray) -> Dir3 {
        match &self.specific {
            Specific::Tor(s) => s.normal(hit, ray),
            Specific::Cone(s) => s.normal(hit),
            Specific::Ell(s) => s.normal(hit),
            Specific::Arb(s) => s.normal(hit),
            Specific::Ars(s) => s.normal(hit),
            Specific::Half(s) => s.normal(hit, ray),
            Specific::Null => -ray.direction,
        }
    }
}
