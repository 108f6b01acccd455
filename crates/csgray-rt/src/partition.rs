//! Partitions: the final answer of a shot, one per stretch of ray inside a
//! region.
//!
//! Partitions live in the worker's [`Resource`](crate::Resource) pool. A
//! [`PartitionList`] orders handles by entry distance; applications see it
//! through the read-only [`Partitions`] view.

use std::fmt;

use csgray_math::{Dir3, Point3};
use csgray_solids::{Hit, Ray};
use slotmap::SlotMap;

use crate::bitv::SolidBits;
use crate::boolean::{Boundary, Interval};
use crate::region::RegionBit;
use crate::resource::PartKey;
use crate::rt::RtInstance;
use crate::soltab::SolidBit;

/// The span of a ray inside one region.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    pub(crate) entry: Boundary,
    pub(crate) exit: Boundary,
    pub(crate) region: RegionBit,
    pub(crate) solhit: SolidBits,
}

impl Partition {
    pub(crate) fn from_interval(iv: Interval, region: RegionBit) -> Self {
        Self {
            entry: iv.entry,
            exit: iv.exit,
            region,
            solhit: iv.solids,
        }
    }

    /// Entry distance.
    #[inline]
    pub fn in_dist(&self) -> f64 {
        self.entry.dist()
    }

    /// Exit distance.
    #[inline]
    pub fn out_dist(&self) -> f64 {
        self.exit.dist()
    }

    /// Thickness along the ray.
    pub fn length(&self) -> f64 {
        self.out_dist() - self.in_dist()
    }

    /// Region this partition belongs to.
    pub fn region(&self) -> RegionBit {
        self.region
    }

    /// Entry boundary.
    pub fn entry(&self) -> &Boundary {
        &self.entry
    }

    /// Exit boundary.
    pub fn exit(&self) -> &Boundary {
        &self.exit
    }

    /// Entry hit.
    pub fn in_hit(&self) -> &Hit {
        &self.entry.hit
    }

    /// Exit hit.
    pub fn out_hit(&self) -> &Hit {
        &self.exit.hit
    }

    /// Solid whose surface the ray enters through.
    pub fn in_solid(&self) -> SolidBit {
        self.entry.solid
    }

    /// Solid whose surface the ray leaves through.
    pub fn out_solid(&self) -> SolidBit {
        self.exit.solid
    }

    /// Every solid that contributed a boundary along the way.
    pub fn solids(&self) -> &SolidBits {
        &self.solhit
    }

    /// Entry point.
    pub fn in_point(&self, ray: &Ray) -> Point3 {
        self.entry.hit.point(ray)
    }

    /// Exit point.
    pub fn out_point(&self, ray: &Ray) -> Point3 {
        self.exit.hit.point(ray)
    }

    /// Outward normal of the region at the entry point.
    pub fn in_normal(&self, rtip: &RtInstance, ray: &Ray) -> Dir3 {
        boundary_normal(rtip, ray, &self.entry)
    }

    /// Outward normal of the region at the exit point.
    pub fn out_normal(&self, rtip: &RtInstance, ray: &Ray) -> Dir3 {
        boundary_normal(rtip, ray, &self.exit)
    }
}

fn boundary_normal(rtip: &RtInstance, ray: &Ray, b: &Boundary) -> Dir3 {
    let n = match rtip.solid(b.solid).prepared() {
        Some(prep) => prep.normal(&b.hit, ray),
        None => -ray.direction,
    };
    if b.flip {
        -n
    } else {
        n
    }
}

/// Handles to partitions ordered by entry distance, then region bit.
#[derive(Debug, Default, Clone)]
pub struct PartitionList {
    keys: Vec<PartKey>,
}

impl PartitionList {
    /// Empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of partitions.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// True when the list holds nothing.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Handles in order.
    pub fn keys(&self) -> &[PartKey] {
        &self.keys
    }

    pub(crate) fn insert_sorted(&mut self, key: PartKey, pool: &SlotMap<PartKey, Partition>) {
        let new = &pool[key];
        let at = self.keys.partition_point(|&k| {
            let p = &pool[k];
            p.in_dist() < new.in_dist() || (p.in_dist() == new.in_dist() && p.region <= new.region)
        });
        self.keys.insert(at, key);
    }

    pub(crate) fn position(&self, key: PartKey) -> Option<usize> {
        self.keys.iter().position(|&k| k == key)
    }

    pub(crate) fn dequeue(&mut self, index: usize) -> PartKey {
        self.keys.remove(index)
    }

    pub(crate) fn truncate(&mut self, len: usize) -> Vec<PartKey> {
        self.keys.split_off(len.min(self.keys.len()))
    }

    pub(crate) fn drain(&mut self) -> Vec<PartKey> {
        std::mem::take(&mut self.keys)
    }

    /// Read-only view over the pooled partitions.
    pub(crate) fn view<'a>(&'a self, pool: &'a SlotMap<PartKey, Partition>) -> Partitions<'a> {
        Partitions { list: self, pool }
    }
}

/// The ordered partitions of one shot, as handed to the hit callback.
#[derive(Clone, Copy)]
pub struct Partitions<'a> {
    list: &'a PartitionList,
    pool: &'a SlotMap<PartKey, Partition>,
}

impl<'a> Partitions<'a> {
    /// Number of partitions.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// True when there is nothing to report.
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// The `i`th partition along the ray.
    pub fn get(&self, i: usize) -> Option<&'a Partition> {
        let (list, pool) = (self.list, self.pool);
        list.keys.get(i).and_then(|&k| pool.get(k))
    }

    /// Nearest partition.
    pub fn first(&self) -> Option<&'a Partition> {
        self.get(0)
    }

    /// Farthest partition.
    pub fn last(&self) -> Option<&'a Partition> {
        self.list.len().checked_sub(1).and_then(|i| self.get(i))
    }

    /// Partitions in ray order.
    pub fn iter(&self) -> impl Iterator<Item = &'a Partition> + 'a {
        let (list, pool) = (self.list, self.pool);
        list.keys.iter().filter_map(move |&k| pool.get(k))
    }

    /// Human-readable dump of the partitions with region and solid names.
    pub fn describe(&self, rtip: &'a RtInstance) -> impl fmt::Display + 'a {
        Describe { parts: *self, rtip }
    }
}

impl fmt::Debug for Partitions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

struct Describe<'a> {
    parts: Partitions<'a>,
    rtip: &'a RtInstance,
}

impl fmt::Display for Describe<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "------ {} partitions ------", self.parts.len())?;
        for p in self.parts.iter() {
            let region = self.rtip.region(p.region);
            let solids: Vec<&str> = p.solhit.iter().map(|b| self.rtip.solid(b).name()).collect();
            writeln!(
                f,
                "  {:>12.4} .. {:<12.4} {} (in {}{}, out {}{}) solids [{}]",
                p.in_dist(),
                p.out_dist(),
                region.name,
                self.rtip.solid(p.entry.solid).name(),
                if p.entry.flip { " flipped" } else { "" },
                self.rtip.solid(p.exit.solid).name(),
                if p.exit.flip { " flipped" } else { "" },
                solids.join(" ")
            )?;
        }
        Ok(())
    }
}
