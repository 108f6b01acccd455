//! The application descriptor: what to shoot and who hears about it.
//!
//! An [`Application`] carries the ray, the worker's [`Resource`] and a
//! [`ShotHandler`] that receives the hit, miss and overlap callbacks. The
//! handler's output is returned from [`crate::shoot_ray`] unchanged.

use crate::partition::{Partition, Partitions};
use crate::resource::Resource;
use crate::rt::RtInstance;
use csgray_solids::Ray;

/// What to do where two regions claim the same stretch of ray.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapResolution {
    /// The earlier partition keeps the overlap.
    RetainFirst,
    /// The later partition keeps the overlap.
    RetainSecond,
    /// Leave both partitions as they are.
    RetainBoth,
}

/// Context passed to every callback of one shot.
#[derive(Debug, Clone, Copy)]
pub struct Shot<'a> {
    /// The model being shot.
    pub rtip: &'a RtInstance,
    /// The ray, clipped to the model bounds.
    pub ray: &'a Ray,
    /// Recursion level; zero for primary rays.
    pub level: u32,
    /// Pixel column, or the ray index for batch shooting.
    pub x: i32,
    /// Pixel row.
    pub y: i32,
    /// Free-form description of why the ray was fired.
    pub purpose: Option<&'a str>,
    /// Worker that fired it.
    pub cpu: usize,
}

/// Receiver of shot outcomes.
pub trait ShotHandler {
    /// What a shot produces.
    type Output;

    /// Called when the ray hits at least one region. The partitions are
    /// valid only for the duration of the call.
    fn hit(&mut self, shot: &Shot<'_>, parts: &Partitions<'_>) -> Self::Output;

    /// Called when the ray hits nothing.
    fn miss(&mut self, shot: &Shot<'_>) -> Self::Output;

    /// Called for each pair of partitions from different regions that
    /// overlap. `first` enters no later than `second`.
    fn overlap(
        &mut self,
        shot: &Shot<'_>,
        first: &Partition,
        second: &Partition,
    ) -> OverlapResolution {
        default_overlap(shot, first, second)
    }

    /// Whether [`crate::shoot_chain`] follows the ray's deflection after
    /// a shot that produced `output`.
    fn proceed(&self, output: &Self::Output) -> bool {
        let _ = output;
        true
    }
}

/// Report overlaps at least as deep as the model's report threshold, then
/// give the overlap to the earlier partition.
pub fn default_overlap(shot: &Shot<'_>, first: &Partition, second: &Partition) -> OverlapResolution {
    let depth = first.out_dist().min(second.out_dist()) - second.in_dist();
    if depth >= shot.rtip.options().overlap_report_depth {
        let at = second.in_point(shot.ray);
        log::warn!(
            "OVERLAP: {} and {} for {:.4} mm at ({:.4}, {:.4}, {:.4}), pixel {},{} level {}",
            shot.rtip.region(first.region()).name,
            shot.rtip.region(second.region()).name,
            depth,
            at.x,
            at.y,
            at.z,
            shot.x,
            shot.y,
            shot.level
        );
    }
    OverlapResolution::RetainFirst
}

/// Everything needed to fire one ray.
pub struct Application<'r, H> {
    /// The ray. Owned by the caller for the duration of the shot.
    pub ray: Ray,
    /// Callback receiver.
    pub handler: H,
    /// Pools and counters of the worker firing the ray.
    pub resource: &'r mut Resource,
    /// Stop after this many partitions past the ray origin; zero for all.
    pub onehit: usize,
    /// Recursion level.
    pub level: u32,
    /// Pixel column.
    pub x: i32,
    /// Pixel row.
    pub y: i32,
    /// Why the ray is being fired.
    pub purpose: Option<String>,
}

impl<'r, H: ShotHandler> Application<'r, H> {
    /// Primary ray with no hit limit.
    pub fn new(ray: Ray, handler: H, resource: &'r mut Resource) -> Self {
        Self {
            ray,
            handler,
            resource,
            onehit: 0,
            level: 0,
            x: 0,
            y: 0,
            purpose: None,
        }
    }

    /// Limit the partitions reported.
    pub fn with_onehit(mut self, onehit: usize) -> Self {
        self.onehit = onehit;
        self
    }

    /// Tag the ray with a pixel position.
    pub fn at_pixel(mut self, x: i32, y: i32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Tag the ray with a purpose.
    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = Some(purpose.into());
        self
    }
}

/// Hit callback of a [`FnHandler`].
pub type HitFn<U> = fn(&Shot<'_>, &Partitions<'_>, &mut U) -> i32;
/// Miss callback of a [`FnHandler`].
pub type MissFn<U> = fn(&Shot<'_>, &mut U) -> i32;
/// Overlap callback of a [`FnHandler`].
pub type OverlapFn<U> = fn(&Shot<'_>, &Partition, &Partition, &mut U) -> OverlapResolution;

/// Handler assembled from plain functions and a user slot.
///
/// Outputs are integers; [`crate::shoot_chain`] continues while they are
/// nonzero.
pub struct FnHandler<U> {
    /// Hit callback.
    pub hit: HitFn<U>,
    /// Miss callback.
    pub miss: MissFn<U>,
    /// Overlap callback; `None` uses [`default_overlap`].
    pub overlap: Option<OverlapFn<U>>,
    /// Application data threaded through every callback.
    pub user: U,
}

impl<U> ShotHandler for FnHandler<U> {
    type Output = i32;

    fn hit(&mut self, shot: &Shot<'_>, parts: &Partitions<'_>) -> i32 {
        (self.hit)(shot, parts, &mut self.user)
    }

    fn miss(&mut self, shot: &Shot<'_>) -> i32 {
        (self.miss)(shot, &mut self.user)
    }

    fn overlap(&mut self, shot: &Shot<'_>, first: &Partition, second: &Partition) -> OverlapResolution {
        match self.overlap {
            Some(f) => f(shot, first, second, &mut self.user),
            None => default_overlap(shot, first, second),
        }
    }

    fn proceed(&self, output: &i32) -> bool {
        *output != 0
    }
}
