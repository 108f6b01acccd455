//! Firing rays at a prepared model.
//!
//! One shot runs in four steps. First, every solid the ray might touch is
//! intersected and its segments are chained in the worker's pool. Second,
//! each region using a hit solid is evaluated along the ray. Third, the
//! region intervals are woven into one partition list. Finally, the
//! handler is told about the hit or miss. Partitions and segments go back
//! to the pool before the call returns.

use csgray_math::Tolerance;
use csgray_solids::{PreparedSolid, Ray};
use rayon::prelude::*;
use slotmap::SlotMap;

use crate::application::{Application, Shot, ShotHandler};
use crate::boolean::{self, Boundary, Interval, IntervalSet};
use crate::error::{FatalError, Result};
use crate::merge;
use crate::region::RegionBit;
use crate::resource::{Resource, SegKey};
use crate::rt::RtInstance;
use crate::seg::{ChainSink, SegChains, Segment};
use crate::soltab::SolidBit;

/// Shoot the application's ray and return what its handler produced.
///
/// Counters accumulate in the application's resource; fold them into the
/// model with [`RtInstance::add_res_stats`].
pub fn shoot_ray<H: ShotHandler>(rtip: &RtInstance, ap: &mut Application<'_, H>) -> Result<H::Output> {
    if !rtip.is_prepped() {
        return Err(FatalError::NotPrepped);
    }
    let mut ray = working_ray(&ap.ray)?;
    let tol = *rtip.tolerance();
    let model_span = ray.intersect_aabb(rtip.model_box());
    if let Some((t0, t1)) = model_span {
        ray.clip(t0, t1);
    }

    let res: &mut Resource = &mut *ap.resource;
    let handler = &mut ap.handler;
    let shot = Shot {
        rtip,
        ray: &ray,
        level: ap.level,
        x: ap.x,
        y: ap.y,
        purpose: ap.purpose.as_deref(),
        cpu: res.cpu(),
    };

    let mut chains = SegChains::new();
    for &bit in rtip.infinite_solids() {
        if let Some(prep) = rtip.solid(bit).prepared() {
            shoot_solid(prep, bit, &ray, &tol, res, &mut chains);
        }
    }

    if model_span.is_none() && chains.is_empty() {
        res.stats.nmiss_model += 1;
        res.stats.nshootray += 1;
        trace_status(&shot, "MISS model");
        return Ok(handler.miss(&shot));
    }

    if model_span.is_some() {
        for &bit in rtip.finite_solids() {
            let Some(prep) = rtip.solid(bit).prepared() else {
                continue;
            };
            if ray.misses_sphere(prep.bsphere()) || ray.intersect_aabb(prep.aabb()).is_none() {
                res.stats.prune_solrpp += 1;
                continue;
            }
            shoot_solid(prep, bit, &ray, &tol, res, &mut chains);
        }
    }

    if chains.is_empty() {
        res.stats.nshootray += 1;
        trace_status(&shot, "MISS solids");
        return Ok(handler.miss(&shot));
    }
    chains.seal();

    let mut active: Vec<RegionBit> = chains
        .chains()
        .iter()
        .flat_map(|c| rtip.solid(c.solid).regions().iter().copied())
        .collect();
    active.sort_unstable();
    active.dedup();

    let mut evaluated = Vec::with_capacity(active.len());
    for bit in active {
        let segs = &res.segs;
        let set = boolean::eval(
            &rtip.region(bit).tree,
            &mut |solid| leaf_intervals(&chains, segs, solid, &tol),
            &tol,
        );
        if !set.is_empty() {
            evaluated.push((bit, set));
        }
    }

    let mut list = merge::weave(evaluated, res, handler, &shot, &tol, ap.onehit)?;
    let output = if list.is_empty() {
        trace_status(&shot, "MISS bool");
        handler.miss(&shot)
    } else {
        trace_status(&shot, "HIT");
        handler.hit(&shot, &list.view(&res.parts))
    };

    for key in list.drain() {
        res.free_part(key)?;
    }
    chains.free_all(res)?;
    res.stats.nshootray += 1;
    Ok(output)
}

/// Shoot the application's ray, then its deflection chain.
///
/// Each successor is shot one level deeper than its predecessor. The chain
/// stops at the first ray without a successor, or when the handler
/// declines to [`proceed`](ShotHandler::proceed).
pub fn shoot_chain<H: ShotHandler>(rtip: &RtInstance, ap: &mut Application<'_, H>) -> Result<Vec<H::Output>> {
    let mut outputs = Vec::new();
    loop {
        let output = shoot_ray(rtip, ap)?;
        let go_on = ap.handler.proceed(&output);
        outputs.push(output);
        if !go_on {
            break;
        }
        let Some(next) = ap.ray.deflected.take() else {
            break;
        };
        ap.ray = *next;
        ap.level += 1;
    }
    Ok(outputs)
}

/// Shoot many rays in parallel, one fresh handler per ray.
///
/// Each worker thread gets its own [`Resource`]; counters are folded into
/// the model as rays finish. Output `i` belongs to `rays[i]`, which is also
/// the `x` its callbacks see.
pub fn shoot_many<H, F>(rtip: &RtInstance, rays: &[Ray], make_handler: F) -> Result<Vec<H::Output>>
where
    H: ShotHandler,
    H::Output: Send,
    F: Fn() -> H + Sync + Send,
{
    let onehit = rtip.options().onehit;
    rays.par_iter()
        .enumerate()
        .map_init(
            || Resource::new(rayon::current_thread_index().unwrap_or(0)),
            |res, (i, ray)| {
                let mut ap = Application::new(ray.clone(), make_handler(), res).with_onehit(onehit);
                ap.x = i as i32;
                let output = shoot_ray(rtip, &mut ap);
                rtip.add_res_stats(&mut *ap.resource);
                output
            },
        )
        .collect()
}

fn working_ray(ray: &Ray) -> Result<Ray> {
    let dir = ray.direction.into_inner();
    let len = dir.norm();
    let finite = ray.origin.coords.iter().chain(dir.iter()).all(|c| c.is_finite());
    if !finite || len < 1.0e-12 {
        log::error!("bad ray: origin {:?} direction {:?}", ray.origin, dir);
        return Err(FatalError::BadRay {
            x: ray.origin.x,
            y: ray.origin.y,
            z: ray.origin.z,
            dx: dir.x,
            dy: dir.y,
            dz: dir.z,
        });
    }
    if (len - 1.0).abs() > 1.0e-4 {
        log::info!("ray direction length {len}, renormalized");
    }
    let mut working = Ray::new(ray.origin, dir);
    working.clip(ray.min_dist, ray.max_dist);
    Ok(working)
}

fn shoot_solid(
    prep: &PreparedSolid,
    bit: SolidBit,
    ray: &Ray,
    tol: &Tolerance,
    res: &mut Resource,
    chains: &mut SegChains,
) {
    res.stats.shots += 1;
    let mut sink = ChainSink::new(res, bit);
    prep.shoot(ray, tol, &mut sink);
    match sink.finish() {
        Some(chain) => {
            chains.push(chain);
            res.stats.shot_hit += 1;
        }
        None => res.stats.shot_miss += 1,
    }
}

fn leaf_intervals(
    chains: &SegChains,
    segs: &SlotMap<SegKey, Segment>,
    solid: SolidBit,
    tol: &Tolerance,
) -> IntervalSet {
    let raw = chains
        .iter(solid, segs)
        .map(|(key, seg)| {
            Interval::new(
                Boundary::new(*seg.inhit(), key, solid),
                Boundary::new(*seg.outhit(), key, solid),
            )
        })
        .collect();
    boolean::normalize(raw, tol)
}

fn trace_status(shot: &Shot<'_>, status: &str) {
    log::debug!(
        "shot cpu={} pixel {},{} level {} ({}): {}",
        shot.cpu,
        shot.x,
        shot.y,
        shot.level,
        shot.purpose.unwrap_or("?"),
        status
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::FnHandler;
    use crate::partition::Partitions;
    use crate::region::{BoolTree, Region};
    use approx::assert_relative_eq;
    use csgray_math::{Point3, Vec3};
    use csgray_solids::{Ell, Solid};

    fn one_sphere() -> RtInstance {
        let mut rt = RtInstance::new();
        let s = rt
            .add_solid("s", Solid::Ell(Ell::sphere(Point3::new(0.0, 0.0, 10.0), 2.0)))
            .unwrap();
        rt.add_region(Region::new("r", BoolTree::leaf(s))).unwrap();
        rt.prep().unwrap();
        rt
    }

    fn first_in(_: &Shot<'_>, parts: &Partitions<'_>, out: &mut Vec<f64>) -> i32 {
        out.extend(parts.iter().map(|p| p.in_dist()));
        1
    }

    fn missed(_: &Shot<'_>, _: &mut Vec<f64>) -> i32 {
        0
    }

    fn handler() -> FnHandler<Vec<f64>> {
        FnHandler {
            hit: first_in,
            miss: missed,
            overlap: None,
            user: Vec::new(),
        }
    }

    #[test]
    fn test_hit_reports_and_frees() {
        let rt = one_sphere();
        let mut res = Resource::new(0);
        let mut ap = Application::new(Ray::new(Point3::origin(), Vec3::z()), handler(), &mut res);
        assert_eq!(shoot_ray(&rt, &mut ap).unwrap(), 1);
        assert_eq!(ap.handler.user.len(), 1);
        assert_relative_eq!(ap.handler.user[0], 8.0, epsilon = 1e-9);
        assert_eq!(res.segs_in_use(), 0);
        assert_eq!(res.parts_in_use(), 0);
        assert_eq!(res.stats.nshootray, 1);
        assert_eq!(res.stats.shot_hit, 1);
    }

    #[test]
    fn test_model_miss_counted() {
        let rt = one_sphere();
        let mut res = Resource::new(0);
        let mut ap = Application::new(Ray::new(Point3::new(50.0, 0.0, 0.0), Vec3::z()), handler(), &mut res);
        assert_eq!(shoot_ray(&rt, &mut ap).unwrap(), 0);
        assert_eq!(res.stats.nmiss_model, 1);
        assert_eq!(res.stats.shots, 0);
    }

    #[test]
    fn test_unnormalized_direction_accepted() {
        let rt = one_sphere();
        let mut res = Resource::new(0);
        let mut ray = Ray::new(Point3::origin(), Vec3::z());
        ray.direction = csgray_math::Dir3::new_unchecked(Vec3::new(0.0, 0.0, 3.0));
        let mut ap = Application::new(ray, handler(), &mut res);
        assert_eq!(shoot_ray(&rt, &mut ap).unwrap(), 1);
        assert_relative_eq!(ap.handler.user[0], 8.0, epsilon = 1e-9);
    }

    #[test]
    fn test_bad_ray_is_fatal() {
        let rt = one_sphere();
        let mut res = Resource::new(0);
        let ray = Ray::new(Point3::new(f64::NAN, 0.0, 0.0), Vec3::z());
        let mut ap = Application::new(ray, handler(), &mut res);
        assert!(matches!(shoot_ray(&rt, &mut ap), Err(FatalError::BadRay { .. })));
    }

    #[test]
    fn test_unprepped_is_fatal() {
        let rt = RtInstance::new();
        let mut res = Resource::new(0);
        let mut ap = Application::new(Ray::new(Point3::origin(), Vec3::z()), handler(), &mut res);
        assert!(matches!(shoot_ray(&rt, &mut ap), Err(FatalError::NotPrepped)));
    }
}
