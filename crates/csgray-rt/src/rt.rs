//! The ray-trace instance: a model's solids and regions, prepared for
//! shooting, plus model-wide statistics.
//!
//! Build the model with [`RtInstance::add_solid`] and
//! [`RtInstance::add_region`], call [`RtInstance::prep`] once, then share
//! the instance read-only between workers.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use csgray_math::{Aabb3, Point3, Tolerance};
use csgray_solids::{Solid, SolidKind};

use crate::bitv::MAX_SOLIDS;
use crate::error::{FatalError, Result};
use crate::options::RtOptions;
use crate::region::{Region, RegionBit};
use crate::resource::Resource;
use crate::soltab::{SolidBit, SolidEntry};

#[derive(Debug, Default)]
struct Counters {
    nrays: AtomicU64,
    nmiss_model: AtomicU64,
    nshots: AtomicU64,
    nhits: AtomicU64,
    nmiss: AtomicU64,
    nmiss_solid: AtomicU64,
    noverlaps: AtomicU64,
}

/// Snapshot of the model-wide counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RtStats {
    /// Active solids.
    pub nsolids: usize,
    /// Regions.
    pub nregions: usize,
    /// Rays shot.
    pub nrays: u64,
    /// Rays that missed the model bounding box.
    pub nmiss_model: u64,
    /// Solid shoot routines invoked.
    pub nshots: u64,
    /// Shoot routines that produced segments.
    pub nhits: u64,
    /// Shoot routines that produced nothing.
    pub nmiss: u64,
    /// Solids rejected by bounding volumes.
    pub nmiss_solid: u64,
    /// Overlaps reported to handlers.
    pub noverlaps: u64,
}

impl fmt::Display for RtStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} solids in {} regions", self.nsolids, self.nregions)?;
        writeln!(
            f,
            "{} rays, {} missed the model, {} solid shots ({} hit, {} missed), {} pruned, {} overlaps",
            self.nrays, self.nmiss_model, self.nshots, self.nhits, self.nmiss, self.nmiss_solid, self.noverlaps
        )
    }
}

/// A model ready to be shot at.
#[derive(Debug)]
pub struct RtInstance {
    options: RtOptions,
    solids: Vec<SolidEntry>,
    solid_names: HashMap<String, SolidBit>,
    regions: Vec<Region>,
    region_names: HashMap<String, RegionBit>,
    model_box: Aabb3,
    infinite: Vec<SolidBit>,
    finite: Vec<SolidBit>,
    nsol_by_type: [usize; SolidKind::ALL.len()],
    air_discards: usize,
    prepped: bool,
    counters: Counters,
}

impl Default for RtInstance {
    fn default() -> Self {
        Self::new()
    }
}

impl RtInstance {
    /// Empty model with default options.
    pub fn new() -> Self {
        Self::with_options(RtOptions::default())
    }

    /// Empty model.
    pub fn with_options(options: RtOptions) -> Self {
        Self {
            options,
            solids: Vec::new(),
            solid_names: HashMap::new(),
            regions: Vec::new(),
            region_names: HashMap::new(),
            model_box: Aabb3::empty(),
            infinite: Vec::new(),
            finite: Vec::new(),
            nsol_by_type: [0; SolidKind::ALL.len()],
            air_discards: 0,
            prepped: false,
            counters: Counters::default(),
        }
    }

    /// Options in force.
    pub fn options(&self) -> &RtOptions {
        &self.options
    }

    /// Tolerances in force.
    pub fn tolerance(&self) -> &Tolerance {
        &self.options.tolerance
    }

    /// Add a named solid.
    pub fn add_solid(&mut self, name: impl Into<String>, solid: Solid) -> Result<SolidBit> {
        let name = name.into();
        if self.prepped {
            return Err(FatalError::AlreadyPrepped(format!("solid '{name}'")));
        }
        if self.solid_names.contains_key(&name) {
            return Err(FatalError::DuplicateSolid(name));
        }
        let bit = SolidBit::from_index(self.solids.len());
        self.solid_names.insert(name.clone(), bit);
        self.solids.push(SolidEntry::new(name, solid, bit));
        Ok(bit)
    }

    /// Add a region. Air regions are discarded unless the options ask for
    /// them, in which case `None` is returned.
    pub fn add_region(&mut self, mut region: Region) -> Result<Option<RegionBit>> {
        if self.prepped {
            return Err(FatalError::AlreadyPrepped(format!("region '{}'", region.name)));
        }
        if self.region_names.contains_key(&region.name) {
            return Err(FatalError::DuplicateRegion(region.name));
        }
        if region.is_air() && !self.options.use_air {
            log::debug!("discarding air region {} (aircode {})", region.name, region.aircode);
            self.air_discards += 1;
            return Ok(None);
        }
        let bit = RegionBit::from_index(self.regions.len());
        region.bit = bit;
        self.region_names.insert(region.name.clone(), bit);
        self.regions.push(region);
        Ok(Some(bit))
    }

    /// Validate the model and prepare every solid a region uses.
    ///
    /// A second call is ignored.
    pub fn prep(&mut self) -> Result<()> {
        if self.prepped {
            log::warn!("prep called more than once, ignored");
            return Ok(());
        }
        if self.solids.len() > MAX_SOLIDS {
            return Err(FatalError::TooManySolids {
                count: self.solids.len(),
                limit: MAX_SOLIDS,
            });
        }

        for region in &self.regions {
            for leaf in region.tree.leaves() {
                let Some(entry) = self.solids.get_mut(leaf.index()) else {
                    return Err(FatalError::CorruptTree {
                        region: region.name.clone(),
                        reason: format!("solid {leaf} does not exist"),
                    });
                };
                if entry.regions.last() != Some(&region.bit) {
                    entry.regions.push(region.bit);
                }
            }
        }

        let tol = self.options.tolerance;
        let mut model_box = Aabb3::empty();
        for entry in &mut self.solids {
            if entry.regions.is_empty() {
                log::debug!("solid {} is not referenced by any region, skipped", entry.name);
                continue;
            }
            let prepared = entry.solid.prep(&tol).map_err(|source| FatalError::BadSolid {
                name: entry.name.clone(),
                source,
            })?;
            if prepared.is_infinite() {
                self.infinite.push(entry.bit);
            } else {
                model_box.include_box(prepared.aabb());
                self.finite.push(entry.bit);
            }
            self.nsol_by_type[prepared.kind().index()] += 1;
            entry.prepared = Some(prepared);
        }

        if self.infinite.is_empty() && self.finite.is_empty() {
            return Err(FatalError::NoSolids {
                air_discards: self.air_discards,
            });
        }
        if model_box.is_empty() {
            model_box = Aabb3::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        }
        model_box.round_out();
        self.model_box = model_box;
        self.prepped = true;

        log::info!(
            "prepped {} solids ({} infinite) in {} regions, model RPP ({}, {}, {}) to ({}, {}, {})",
            self.finite.len() + self.infinite.len(),
            self.infinite.len(),
            self.regions.len(),
            self.model_box.min.x,
            self.model_box.min.y,
            self.model_box.min.z,
            self.model_box.max.x,
            self.model_box.max.y,
            self.model_box.max.z
        );
        Ok(())
    }

    /// True once [`RtInstance::prep`] succeeded.
    pub fn is_prepped(&self) -> bool {
        self.prepped
    }

    /// Union of the finite solid bounds, rounded out to whole units.
    pub fn model_box(&self) -> &Aabb3 {
        &self.model_box
    }

    /// Every solid, in bit order.
    pub fn solids(&self) -> &[SolidEntry] {
        &self.solids
    }

    /// Solid by bit.
    ///
    /// # Panics
    ///
    /// Panics if `bit` does not belong to this model.
    pub fn solid(&self, bit: SolidBit) -> &SolidEntry {
        &self.solids[bit.index()]
    }

    /// Look a solid up by name.
    pub fn find_solid(&self, name: &str) -> Option<&SolidEntry> {
        self.solid_names.get(name).map(|&b| self.solid(b))
    }

    /// Every region, in bit order.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Region by bit.
    ///
    /// # Panics
    ///
    /// Panics if `bit` does not belong to this model.
    pub fn region(&self, bit: RegionBit) -> &Region {
        &self.regions[bit.index()]
    }

    /// Look a region up by name.
    pub fn find_region(&self, name: &str) -> Option<&Region> {
        self.region_names.get(name).map(|&b| self.region(b))
    }

    /// Solids shot on every ray.
    pub fn infinite_solids(&self) -> &[SolidBit] {
        &self.infinite
    }

    pub(crate) fn finite_solids(&self) -> &[SolidBit] {
        &self.finite
    }

    /// Prepared solids of `kind`.
    pub fn nsol_by_type(&self, kind: SolidKind) -> usize {
        self.nsol_by_type[kind.index()]
    }

    /// Air regions dropped at build time.
    pub fn air_discards(&self) -> usize {
        self.air_discards
    }

    /// Region tree in infix form with solid names.
    pub fn describe_region(&self, bit: RegionBit) -> String {
        let region = self.region(bit);
        format!(
            "{} id={} air={} material={} los={}%: {}",
            region.name,
            region.id,
            region.aircode,
            region.gift_material,
            region.los,
            region
                .tree
                .display_with(|b| self.solids.get(b.index()).map_or_else(|| b.to_string(), |e| e.name.clone()))
        )
    }

    /// Fold a worker's counters into the model totals and zero them.
    pub fn add_res_stats(&self, res: &mut Resource) {
        let s = res.take_stats();
        let c = &self.counters;
        c.nrays.fetch_add(s.nshootray, Ordering::Relaxed);
        c.nmiss_model.fetch_add(s.nmiss_model, Ordering::Relaxed);
        c.nshots.fetch_add(s.shots, Ordering::Relaxed);
        c.nhits.fetch_add(s.shot_hit, Ordering::Relaxed);
        c.nmiss.fetch_add(s.shot_miss, Ordering::Relaxed);
        c.nmiss_solid.fetch_add(s.prune_solrpp, Ordering::Relaxed);
        c.noverlaps.fetch_add(s.overlaps, Ordering::Relaxed);
    }

    /// Current model-wide counters.
    pub fn stats(&self) -> RtStats {
        let c = &self.counters;
        RtStats {
            nsolids: self.finite.len() + self.infinite.len(),
            nregions: self.regions.len(),
            nrays: c.nrays.load(Ordering::Relaxed),
            nmiss_model: c.nmiss_model.load(Ordering::Relaxed),
            nshots: c.nshots.load(Ordering::Relaxed),
            nhits: c.nhits.load(Ordering::Relaxed),
            nmiss: c.nmiss.load(Ordering::Relaxed),
            nmiss_solid: c.nmiss_solid.load(Ordering::Relaxed),
            noverlaps: c.noverlaps.load(Ordering::Relaxed),
        }
    }
}
