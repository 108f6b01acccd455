//! Serialized record types.
//!
//! The database is a flat document: model options, a list of named solids
//! and a list of regions. Region trees refer to solids by name, either as
//! a bare string leaf or as an `{ op, left, right }` node.

use csgray_rt::RtOptions;
use serde::{Deserialize, Serialize};

/// 3D vector, written either as `{ x, y, z }` or as `[x, y, z]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec3Repr")]
pub struct Vec3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Vec3 {
    /// Create a new Vec3.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Vec3Repr {
    Array([f64; 3]),
    Fields { x: f64, y: f64, z: f64 },
}

impl From<Vec3Repr> for Vec3 {
    fn from(repr: Vec3Repr) -> Self {
        match repr {
            Vec3Repr::Array([x, y, z]) => Vec3 { x, y, z },
            Vec3Repr::Fields { x, y, z } => Vec3 { x, y, z },
        }
    }
}

/// Solid geometry, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    /// Sphere.
    Sph {
        /// Center.
        center: Vec3,
        /// Radius.
        radius: f64,
    },
    /// Ellipsoid from center and three semi-axes.
    Ell {
        /// Center.
        v: Vec3,
        /// First semi-axis.
        a: Vec3,
        /// Second semi-axis.
        b: Vec3,
        /// Third semi-axis.
        c: Vec3,
    },
    /// Torus.
    Tor {
        /// Center.
        v: Vec3,
        /// Axis.
        n: Vec3,
        /// Major radius.
        r1: f64,
        /// Minor radius.
        r2: f64,
    },
    /// Truncated general cone.
    Tgc {
        /// Base center.
        v: Vec3,
        /// Height vector.
        h: Vec3,
        /// Base semi-axis.
        a: Vec3,
        /// Base semi-axis.
        b: Vec3,
        /// Top semi-axis, parallel to `a`.
        c: Vec3,
        /// Top semi-axis, parallel to `b`.
        d: Vec3,
    },
    /// Right circular cylinder.
    Rcc {
        /// Base center.
        v: Vec3,
        /// Height vector.
        h: Vec3,
        /// Radius.
        radius: f64,
    },
    /// Truncated right circular cone.
    Trc {
        /// Base center.
        v: Vec3,
        /// Height vector.
        h: Vec3,
        /// Base radius.
        r_base: f64,
        /// Top radius.
        r_top: f64,
    },
    /// Right elliptical cylinder.
    Rec {
        /// Base center.
        v: Vec3,
        /// Height vector.
        h: Vec3,
        /// Semi-axis.
        a: Vec3,
        /// Semi-axis.
        b: Vec3,
    },
    /// Convex polyhedron from four to eight vertices.
    #[serde(alias = "arb8")]
    Arb {
        /// Vertices, in ARB4 through ARB8 order.
        points: Vec<Vec3>,
    },
    /// Axis-aligned box.
    Rpp {
        /// Minimum corner.
        min: Vec3,
        /// Maximum corner.
        max: Vec3,
    },
    /// Faceted surface from closed curves.
    Ars {
        /// Curves, each a closed loop of points.
        curves: Vec<Vec<Vec3>>,
    },
    /// Half-space `normal . p <= d`.
    Half {
        /// Outward normal.
        normal: Vec3,
        /// Plane distance.
        d: f64,
    },
    /// Placeholder that is never hit.
    Null,
}

/// A named solid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolidRecord {
    /// Unique solid name.
    pub name: String,
    /// Geometry.
    #[serde(flatten)]
    pub shape: Shape,
}

/// Boolean operator of a tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Op {
    /// Union.
    Union,
    /// Intersection.
    Intersect,
    /// Subtraction.
    Subtract,
    /// Exclusive or.
    Xor,
}

/// Region tree as written in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeRecord {
    /// A solid by name.
    Leaf(String),
    /// A binary operator.
    Node {
        /// Operator.
        op: Op,
        /// Left operand.
        left: Box<TreeRecord>,
        /// Right operand.
        right: Box<TreeRecord>,
    },
}

fn default_los() -> i32 {
    100
}

/// A region and its attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionRecord {
    /// Unique region name.
    pub name: String,
    /// Defining tree.
    pub tree: TreeRecord,
    /// Region identifier code.
    #[serde(default)]
    pub id: i32,
    /// Nonzero for air regions.
    #[serde(default)]
    pub aircode: i32,
    /// Material code.
    #[serde(default)]
    pub material: i32,
    /// Line-of-sight percentage.
    #[serde(default = "default_los")]
    pub los: i32,
    /// RGB color.
    #[serde(default)]
    pub color: Option<[u8; 3]>,
    /// Shader name.
    #[serde(default)]
    pub shader: Option<String>,
    /// Shader parameters.
    #[serde(default)]
    pub shader_params: String,
    /// Lower combinations inherit this material.
    #[serde(default)]
    pub inherit: bool,
}

/// A whole model database.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Database {
    /// Model-wide options.
    #[serde(default)]
    pub options: RtOptions,
    /// Solids.
    #[serde(default)]
    pub solids: Vec<SolidRecord>,
    /// Regions.
    #[serde(default)]
    pub regions: Vec<RegionRecord>,
}
