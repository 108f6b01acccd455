//! Per-worker pools and counters.
//!
//! Every shot allocates segments and partitions from the [`Resource`] its
//! application carries, and returns them before the shot ends. A resource
//! belongs to exactly one worker at a time, so none of this is locked.
//! Freed slots are reused most-recent first.

use slotmap::SlotMap;

use crate::error::{FatalError, Result};
use crate::partition::Partition;
use crate::seg::Segment;

slotmap::new_key_type! {
    /// Handle to a pooled [`Segment`].
    pub struct SegKey;
}

slotmap::new_key_type! {
    /// Handle to a pooled [`Partition`].
    pub struct PartKey;
}

/// Counters one worker accumulates between folds into the model totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceStats {
    /// Rays shot.
    pub nshootray: u64,
    /// Rays that missed the model bounding box.
    pub nmiss_model: u64,
    /// Solid shoot routines invoked.
    pub shots: u64,
    /// Shoot routines that produced at least one segment.
    pub shot_hit: u64,
    /// Shoot routines that produced nothing.
    pub shot_miss: u64,
    /// Solids skipped by the bounding volume tests.
    pub prune_solrpp: u64,
    /// Overlaps passed to a handler.
    pub overlaps: u64,
    /// Segments allocated.
    pub seg_get: u64,
    /// Segments freed.
    pub seg_free: u64,
    /// Partitions allocated.
    pub part_get: u64,
    /// Partitions freed.
    pub part_free: u64,
}

/// Pools and counters for one worker.
#[derive(Debug, Default)]
pub struct Resource {
    cpu: usize,
    pub(crate) segs: SlotMap<SegKey, Segment>,
    pub(crate) parts: SlotMap<PartKey, Partition>,
    /// Counters since the last fold.
    pub stats: ResourceStats,
}

impl Resource {
    /// Resource for worker `cpu`.
    pub fn new(cpu: usize) -> Self {
        Self {
            cpu,
            ..Default::default()
        }
    }

    /// Worker number.
    pub fn cpu(&self) -> usize {
        self.cpu
    }

    /// Segments currently handed out.
    pub fn segs_in_use(&self) -> usize {
        self.segs.len()
    }

    /// Partitions currently handed out.
    pub fn parts_in_use(&self) -> usize {
        self.parts.len()
    }

    pub(crate) fn get_seg(&mut self, seg: Segment) -> SegKey {
        self.stats.seg_get += 1;
        self.segs.insert(seg)
    }

    pub(crate) fn free_seg(&mut self, key: SegKey) -> Result<()> {
        self.segs
            .remove(key)
            .ok_or(FatalError::StaleHandle("segment"))?;
        self.stats.seg_free += 1;
        Ok(())
    }

    pub(crate) fn get_part(&mut self, part: Partition) -> PartKey {
        self.stats.part_get += 1;
        self.parts.insert(part)
    }

    pub(crate) fn free_part(&mut self, key: PartKey) -> Result<()> {
        self.parts
            .remove(key)
            .ok_or(FatalError::StaleHandle("partition"))?;
        self.stats.part_free += 1;
        Ok(())
    }

    /// Take the counters, leaving them zeroed.
    pub(crate) fn take_stats(&mut self) -> ResourceStats {
        std::mem::take(&mut self.stats)
    }
}
