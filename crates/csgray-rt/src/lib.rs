#![warn(missing_docs)]

//! CSG ray-tracing core.
//!
//! A model is a table of primitive solids and a list of regions, each
//! region a boolean tree over the solids. After [`RtInstance::prep`], rays
//! are fired with [`shoot_ray`]: the result is a list of [`Partition`]s,
//! the stretches of ray inside each region in order of distance, handed to
//! the application's [`ShotHandler`].
//!
//! # Example
//!
//! ```
//! use csgray_math::{Point3, Vec3};
//! use csgray_rt::{shoot_ray, Application, BoolTree, Partitions, Region, Resource, RtInstance, Shot, ShotHandler};
//! use csgray_solids::{Arb, Ray, Solid};
//!
//! struct FirstHit;
//!
//! impl ShotHandler for FirstHit {
//!     type Output = Option<f64>;
//!     fn hit(&mut self, _: &Shot<'_>, parts: &Partitions<'_>) -> Option<f64> {
//!         parts.first().map(|p| p.in_dist())
//!     }
//!     fn miss(&mut self, _: &Shot<'_>) -> Option<f64> {
//!         None
//!     }
//! }
//!
//! let mut rt = RtInstance::new();
//! let cube = rt
//!     .add_solid("cube", Solid::Arb(Arb::from_rpp(Point3::origin(), Point3::new(1.0, 1.0, 1.0))))
//!     .unwrap();
//! rt.add_region(Region::new("cube.r", BoolTree::leaf(cube))).unwrap();
//! rt.prep().unwrap();
//!
//! let mut res = Resource::new(0);
//! let ray = Ray::new(Point3::new(0.5, 0.5, -4.0), Vec3::z());
//! let mut ap = Application::new(ray, FirstHit, &mut res);
//! let first = shoot_ray(&rt, &mut ap).unwrap();
//! assert!((first.unwrap() - 4.0).abs() < 1e-9);
//! ```

mod application;
mod bitv;
mod boolean;
pub mod error;
mod merge;
mod options;
mod partition;
mod region;
mod resource;
mod rt;
mod seg;
mod shoot;
mod soltab;

pub use application::{
    default_overlap, Application, FnHandler, HitFn, MissFn, OverlapFn, OverlapResolution, Shot,
    ShotHandler,
};
pub use bitv::{SolidBits, MAX_SOLIDS};
pub use boolean::Boundary;
pub use error::FatalError;
pub use options::RtOptions;
pub use partition::{Partition, PartitionList, Partitions};
pub use region::{
    BoolTree, MaterialInfo, Region, RegionBit, OP_BINARY, OP_INTERSECT, OP_SOLID, OP_SUBTRACT,
    OP_UNION, OP_XOR,
};
pub use resource::{PartKey, Resource, ResourceStats, SegKey};
pub use rt::{RtInstance, RtStats};
pub use seg::Segment;
pub use shoot::{shoot_chain, shoot_many, shoot_ray};
pub use soltab::{SolidBit, SolidEntry};
