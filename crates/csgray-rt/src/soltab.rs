//! The solid table: one entry per named solid in the model.

use std::fmt;

use csgray_solids::{PreparedSolid, Solid};

use crate::region::RegionBit;

/// Dense index of a solid in its model, assigned in insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SolidBit(u32);

impl SolidBit {
    /// Bit for table slot `index`.
    pub fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    /// Table slot.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SolidBit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A named solid, its prepared form and the regions that use it.
#[derive(Debug, Clone)]
pub struct SolidEntry {
    pub(crate) name: String,
    pub(crate) solid: Solid,
    pub(crate) prepared: Option<PreparedSolid>,
    pub(crate) bit: SolidBit,
    pub(crate) regions: Vec<RegionBit>,
}

impl SolidEntry {
    pub(crate) fn new(name: String, solid: Solid, bit: SolidBit) -> Self {
        Self {
            name,
            solid,
            prepared: None,
            bit,
            regions: Vec::new(),
        }
    }

    /// Solid name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameters as added.
    pub fn solid(&self) -> &Solid {
        &self.solid
    }

    /// Prepared form. `None` before prep, and for solids no region uses.
    pub fn prepared(&self) -> Option<&PreparedSolid> {
        self.prepared.as_ref()
    }

    /// Index of this solid.
    pub fn bit(&self) -> SolidBit {
        self.bit
    }

    /// Regions whose trees mention this solid, ascending by bit.
    pub fn regions(&self) -> &[RegionBit] {
        &self.regions
    }

    /// True once prepped and referenced by at least one region.
    pub fn is_active(&self) -> bool {
        self.prepared.is_some()
    }
}

impl fmt::Display for SolidEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "------------ {} (bit {}) {} ------------",
            self.name,
            self.bit.0,
            self.solid.kind()
        )?;
        if let Some(prep) = &self.prepared {
            let bb = prep.aabb();
            if bb.is_finite() {
                writeln!(
                    f,
                    "RPP ({:.4}, {:.4}, {:.4}) ({:.4}, {:.4}, {:.4}), radius {:.4}",
                    bb.min.x,
                    bb.min.y,
                    bb.min.z,
                    bb.max.x,
                    bb.max.y,
                    bb.max.z,
                    prep.bsphere().radius()
                )?;
            } else {
                writeln!(f, "RPP infinite")?;
            }
        }
        let regions: Vec<String> = self.regions.iter().map(|r| r.index().to_string()).collect();
        writeln!(f, "referenced by regions [{}]", regions.join(" "))?;
        fmt::Display::fmt(&self.solid, f)
    }
}
