#![warn(missing_docs)]

//! Model database for the csgray ray-tracing core.
//!
//! A database is a TOML or JSON document of solids and regions:
//!
//! ```toml
//! [options]
//! use_air = false
//!
//! [[solids]]
//! name = "block"
//! type = "rpp"
//! min = [0, 0, 0]
//! max = [10, 10, 10]
//!
//! [[solids]]
//! name = "bore"
//! type = "rcc"
//! v = [5, 5, -1]
//! h = [0, 0, 12]
//! radius = 2
//!
//! [[regions]]
//! name = "part"
//! id = 1000
//! tree = { op = "subtract", left = "block", right = "bore" }
//! ```
//!
//! [`Database::build`] turns it into a prepped [`RtInstance`].

use std::collections::HashMap;
use std::path::Path;

use csgray_math::{Point3, Vec3 as MathVec3};
use csgray_rt::{BoolTree, MaterialInfo, Region, RtInstance, SolidBit};
use csgray_solids::{Arb, Ars, Ell, Half, Rec, Solid, Tgc, Tor};

pub mod error;
pub mod records;

pub use error::{DbError, Result};
pub use records::{Database, Op, RegionRecord, Shape, SolidRecord, TreeRecord, Vec3};

fn point(v: Vec3) -> Point3 {
    Point3::new(v.x, v.y, v.z)
}

fn vector(v: Vec3) -> MathVec3 {
    MathVec3::new(v.x, v.y, v.z)
}

impl Database {
    /// Parse a TOML document.
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Parse a JSON document.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read a database file, choosing the parser by extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| DbError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml(&text),
            Some("json") => Self::from_json(&text),
            other => Err(DbError::UnknownFormat(other.unwrap_or("").to_string())),
        }
    }

    /// Build and prep a ray-trace instance from this database.
    pub fn build(&self) -> Result<RtInstance> {
        let mut rt = RtInstance::with_options(self.options.clone());
        let mut bits: HashMap<&str, SolidBit> = HashMap::new();
        for record in &self.solids {
            let bit = rt.add_solid(record.name.clone(), to_solid(record)?)?;
            bits.insert(record.name.as_str(), bit);
        }
        for record in &self.regions {
            let tree = to_tree(&record.tree, &record.name, &bits)?;
            let mut region = Region::new(record.name.clone(), tree)
                .with_id(record.id)
                .with_aircode(record.aircode)
                .with_material(MaterialInfo {
                    color: record.color,
                    name: record.shader.clone().unwrap_or_default(),
                    params: record.shader_params.clone(),
                    inherit: record.inherit,
                });
            region.gift_material = record.material;
            region.los = record.los;
            rt.add_region(region)?;
        }
        log::info!(
            "loaded {} solids and {} regions ({} air discarded)",
            self.solids.len(),
            rt.regions().len(),
            rt.air_discards()
        );
        rt.prep()?;
        Ok(rt)
    }
}

/// Load a database file and build it.
pub fn load_model(path: impl AsRef<Path>) -> Result<RtInstance> {
    Database::load(path)?.build()
}

fn to_solid(record: &SolidRecord) -> Result<Solid> {
    let solid = match &record.shape {
        Shape::Sph { center, radius } => Solid::Ell(Ell::sphere(point(*center), *radius)),
        Shape::Ell { v, a, b, c } => Solid::Ell(Ell::new(point(*v), vector(*a), vector(*b), vector(*c))),
        Shape::Tor { v, n, r1, r2 } => Solid::Tor(Tor::new(point(*v), vector(*n), *r1, *r2)),
        Shape::Tgc { v, h, a, b, c, d } => Solid::Tgc(Tgc::new(
            point(*v),
            vector(*h),
            vector(*a),
            vector(*b),
            vector(*c),
            vector(*d),
        )),
        Shape::Rcc { v, h, radius } => Solid::Rec(Rec::circular(point(*v), vector(*h), *radius)),
        Shape::Trc { v, h, r_base, r_top } => {
            Solid::Tgc(Tgc::right_circular(point(*v), vector(*h), *r_base, *r_top))
        }
        Shape::Rec { v, h, a, b } => Solid::Rec(Rec::new(point(*v), vector(*h), vector(*a), vector(*b))),
        Shape::Arb { points } => Solid::Arb(Arb::new(expand_arb(&record.name, points)?)),
        Shape::Rpp { min, max } => Solid::Arb(Arb::from_rpp(point(*min), point(*max))),
        Shape::Ars { curves } => Solid::Ars(Ars::new(
            curves
                .iter()
                .map(|c| c.iter().copied().map(point).collect())
                .collect(),
        )),
        Shape::Half { normal, d } => Solid::Half(Half::new(vector(*normal), *d)),
        Shape::Null => Solid::Null,
    };
    Ok(solid)
}

/// Fill out an ARB4 through ARB7 to eight vertices.
fn expand_arb(name: &str, points: &[Vec3]) -> Result<[Point3; 8]> {
    let p: Vec<Point3> = points.iter().copied().map(point).collect();
    let order: [usize; 8] = match p.len() {
        4 => [0, 1, 2, 0, 3, 3, 3, 3],
        5 => [0, 1, 2, 3, 4, 4, 4, 4],
        6 => [0, 1, 2, 3, 4, 4, 5, 5],
        7 => [0, 1, 2, 3, 4, 5, 6, 4],
        8 => [0, 1, 2, 3, 4, 5, 6, 7],
        n => {
            return Err(DbError::BadRecord {
                name: name.to_string(),
                reason: format!("arb needs 4 to 8 points, got {n}"),
            })
        }
    };
    Ok(order.map(|i| p[i]))
}

fn to_tree(record: &TreeRecord, region: &str, bits: &HashMap<&str, SolidBit>) -> Result<BoolTree> {
    match record {
        TreeRecord::Leaf(name) => bits
            .get(name.as_str())
            .map(|&bit| BoolTree::leaf(bit))
            .ok_or_else(|| DbError::UnknownSolid {
                region: region.to_string(),
                solid: name.clone(),
            }),
        TreeRecord::Node { op, left, right } => {
            let l = to_tree(left, region, bits)?;
            let r = to_tree(right, region, bits)?;
            Ok(match op {
                Op::Union => BoolTree::union(l, r),
                Op::Intersect => BoolTree::intersect(l, r),
                Op::Subtract => BoolTree::subtract(l, r),
                Op::Xor => BoolTree::xor(l, r),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use csgray_solids::SolidKind;

    const PART: &str = r#"
[options]
onehit = 2

[[solids]]
name = "block"
type = "rpp"
min = [0, 0, 0]
max = [10, 10, 10]

[[solids]]
name = "bore"
type = "rcc"
v = { x = 5, y = 5, z = -1 }
h = [0, 0, 12]
radius = 2

[[solids]]
name = "spare"
type = "arb"
points = [[0, 0, 20], [1, 0, 20], [0, 1, 20], [0, 0, 21]]

[[regions]]
name = "part"
id = 1000
color = [200, 20, 20]
tree = { op = "subtract", left = "block", right = "bore" }

[[regions]]
name = "room"
aircode = 1
tree = "block"
"#;

    #[test]
    fn test_toml_round_trip_through_build() {
        let db = Database::from_toml(PART).unwrap();
        assert_eq!(db.options.onehit, 2);
        assert_eq!(db.solids.len(), 3);
        assert_eq!(db.regions[1].los, 100);
        assert!(matches!(db.regions[0].tree, TreeRecord::Node { op: Op::Subtract, .. }));

        let rt = db.build().unwrap();
        assert_eq!(rt.regions().len(), 1);
        assert_eq!(rt.air_discards(), 1);
        let part = rt.find_region("part").unwrap();
        assert_eq!(part.id, 1000);
        assert_eq!(part.material.color, Some([200, 20, 20]));
        assert_eq!(rt.nsol_by_type(SolidKind::Arb), 1);
        assert_eq!(rt.nsol_by_type(SolidKind::Rec), 1);
        assert!(rt.find_solid("spare").unwrap().prepared().is_none());
    }

    #[test]
    fn test_json_matches_toml() {
        let db = Database::from_toml(PART).unwrap();
        let json = db.to_json().unwrap();
        assert_eq!(Database::from_json(&json).unwrap(), db);
    }

    #[test]
    fn test_unknown_solid_reported() {
        let text = r#"
[[regions]]
name = "r"
tree = { op = "union", left = "a", right = "b" }
"#;
        let err = Database::from_toml(text).unwrap().build().unwrap_err();
        assert!(matches!(err, DbError::UnknownSolid { ref solid, .. } if solid == "a"));
    }

    #[test]
    fn test_arb_point_counts() {
        let v = |x: f64| Vec3::new(x, 0.0, 0.0);
        let five: Vec<Vec3> = (0..5).map(|i| v(i as f64)).collect();
        let pts = expand_arb("a5", &five).unwrap();
        assert_eq!(pts[7], Point3::new(4.0, 0.0, 0.0));
        assert!(expand_arb("a3", &five[..3]).is_err());
    }

    #[test]
    fn test_unknown_extension() {
        let path = std::env::temp_dir().join("csgray-db-test.yaml");
        std::fs::write(&path, "solids = []").unwrap();
        assert!(matches!(Database::load(&path), Err(DbError::UnknownFormat(_))));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_toml_file() {
        let path = std::env::temp_dir().join("csgray-db-test-part.toml");
        std::fs::write(&path, PART).unwrap();
        let rt = load_model(&path).unwrap();
        assert!(rt.is_prepped());
        let _ = std::fs::remove_file(&path);
    }
}
