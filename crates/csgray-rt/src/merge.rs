//! Weaving per-region intervals into the final partition list.
//!
//! Region evaluation leaves each region with its own interval set. Here
//! they are placed on one list ordered by entry distance, overlaps between
//! different regions are handed to the application for a verdict, and the
//! list is cut short when the application wants only the first hits.

use csgray_math::Tolerance;

use crate::application::{OverlapResolution, Shot, ShotHandler};
use crate::boolean::IntervalSet;
use crate::error::Result;
use crate::partition::{Partition, PartitionList};
use crate::region::RegionBit;
use crate::resource::{PartKey, Resource};

pub(crate) fn weave<H: ShotHandler>(
    evaluated: Vec<(RegionBit, IntervalSet)>,
    res: &mut Resource,
    handler: &mut H,
    shot: &Shot<'_>,
    tol: &Tolerance,
    onehit: usize,
) -> Result<PartitionList> {
    let mut list = PartitionList::new();
    for (region, set) in evaluated {
        for iv in set {
            // Wholly behind the ray origin.
            if iv.exit.dist() <= tol.dist {
                continue;
            }
            let key = res.get_part(Partition::from_interval(iv, region));
            list.insert_sorted(key, &res.parts);
        }
    }

    resolve_overlaps(&mut list, res, handler, shot, tol)?;

    if onehit > 0 {
        let mut seen = 0;
        let mut keep = list.len();
        for (i, &k) in list.keys().iter().enumerate() {
            if res.parts[k].in_dist() >= 0.0 {
                seen += 1;
                if seen == onehit {
                    keep = i + 1;
                    break;
                }
            }
        }
        for k in list.truncate(keep) {
            res.free_part(k)?;
        }
    }
    Ok(list)
}

fn resolve_overlaps<H: ShotHandler>(
    list: &mut PartitionList,
    res: &mut Resource,
    handler: &mut H,
    shot: &Shot<'_>,
    tol: &Tolerance,
) -> Result<()> {
    let mut tolerated: Vec<(PartKey, PartKey)> = Vec::new();
    'scan: loop {
        for i in 0..list.len() {
            for j in i + 1..list.len() {
                let (ki, kj) = (list.keys()[i], list.keys()[j]);
                let (first, second) = (&res.parts[ki], &res.parts[kj]);
                if second.in_dist() >= first.out_dist() - tol.dist {
                    break;
                }
                if first.region == second.region || tolerated.contains(&(ki, kj)) {
                    continue;
                }
                let verdict = handler.overlap(shot, first, second);
                res.stats.overlaps += 1;
                match verdict {
                    OverlapResolution::RetainBoth => tolerated.push((ki, kj)),
                    OverlapResolution::RetainFirst => give_to_first(list, res, ki, kj, tol)?,
                    OverlapResolution::RetainSecond => give_to_second(list, res, ki, kj, tol)?,
                }
                continue 'scan;
            }
        }
        return Ok(());
    }
}

/// Trim `second` to start where `first` ends.
fn give_to_first(
    list: &mut PartitionList,
    res: &mut Resource,
    first: PartKey,
    second: PartKey,
    tol: &Tolerance,
) -> Result<()> {
    let first_exit = res.parts[first].exit;
    let Some(at) = list.position(second) else {
        return Ok(());
    };
    list.dequeue(at);
    if res.parts[second].out_dist() <= first_exit.dist() + tol.dist {
        return res.free_part(second);
    }
    res.parts[second].entry = first_exit.flipped();
    list.insert_sorted(second, &res.parts);
    Ok(())
}

/// Cut `second`'s span out of `first`, splitting `first` when `second`
/// lies strictly inside it.
fn give_to_second(
    list: &mut PartitionList,
    res: &mut Resource,
    first: PartKey,
    second: PartKey,
    tol: &Tolerance,
) -> Result<()> {
    let (second_entry, second_exit) = (res.parts[second].entry, res.parts[second].exit);
    let earlier = res.parts[first].clone();

    if earlier.out_dist() > second_exit.dist() + tol.dist {
        let mut tail = earlier.clone();
        tail.entry = second_exit.flipped();
        let key = res.get_part(tail);
        list.insert_sorted(key, &res.parts);
    }

    if second_entry.dist() - earlier.in_dist() <= tol.dist {
        if let Some(at) = list.position(first) {
            list.dequeue(at);
        }
        return res.free_part(first);
    }
    res.parts[first].exit = second_entry.flipped();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boolean::{Boundary, Interval};
    use crate::partition::Partitions;
    use crate::region::{BoolTree, Region};
    use crate::resource::SegKey;
    use crate::rt::RtInstance;
    use crate::soltab::SolidBit;
    use csgray_math::{Point3, Vec3};
    use csgray_solids::{Ell, Hit, Ray, Solid};

    struct Verdict(OverlapResolution, usize);

    impl ShotHandler for Verdict {
        type Output = ();
        fn hit(&mut self, _: &Shot<'_>, _: &Partitions<'_>) {}
        fn miss(&mut self, _: &Shot<'_>) {}
        fn overlap(&mut self, _: &Shot<'_>, _: &Partition, _: &Partition) -> OverlapResolution {
            self.1 += 1;
            self.0
        }
    }

    fn model() -> RtInstance {
        let mut rt = RtInstance::new();
        for name in ["a", "b", "c"] {
            let bit = rt
                .add_solid(name, Solid::Ell(Ell::sphere(Point3::origin(), 1.0)))
                .unwrap();
            rt.add_region(Region::new(format!("r.{name}"), BoolTree::leaf(bit)))
                .unwrap();
        }
        rt.prep().unwrap();
        rt
    }

    fn set(region: usize, spans: &[(f64, f64)]) -> (RegionBit, IntervalSet) {
        let bit = SolidBit::from_index(region);
        let ivs = spans
            .iter()
            .map(|&(a, b)| {
                Interval::new(
                    Boundary::new(Hit::new(a, 0), SegKey::default(), bit),
                    Boundary::new(Hit::new(b, 0), SegKey::default(), bit),
                )
            })
            .collect();
        (RegionBit::from_index(region), ivs)
    }

    fn run(
        verdict: OverlapResolution,
        sets: Vec<(RegionBit, IntervalSet)>,
        onehit: usize,
    ) -> (Vec<(usize, f64, f64)>, usize) {
        let rt = model();
        let ray = Ray::new(Point3::origin(), Vec3::x());
        let mut res = Resource::new(0);
        let mut handler = Verdict(verdict, 0);
        let shot = Shot {
            rtip: &rt,
            ray: &ray,
            level: 0,
            x: 0,
            y: 0,
            purpose: None,
            cpu: 0,
        };
        let mut list = weave(sets, &mut res, &mut handler, &shot, &Tolerance::DEFAULT, onehit).unwrap();
        let out = list
            .view(&res.parts)
            .iter()
            .map(|p| (p.region().index(), p.in_dist(), p.out_dist()))
            .collect();
        for k in list.drain() {
            res.free_part(k).unwrap();
        }
        assert_eq!(res.parts_in_use(), 0);
        (out, handler.1)
    }

    #[test]
    fn test_behind_origin_dropped() {
        let (parts, _) = run(
            OverlapResolution::RetainFirst,
            vec![set(0, &[(-5.0, -1.0), (2.0, 3.0)])],
            0,
        );
        assert_eq!(parts, vec![(0, 2.0, 3.0)]);
    }

    #[test]
    fn test_retain_first_trims_later() {
        let (parts, calls) = run(
            OverlapResolution::RetainFirst,
            vec![set(0, &[(0.0, 10.0)]), set(1, &[(5.0, 15.0)])],
            0,
        );
        assert_eq!(calls, 1);
        assert_eq!(parts, vec![(0, 0.0, 10.0), (1, 10.0, 15.0)]);
    }

    #[test]
    fn test_retain_first_swallows_contained() {
        let (parts, _) = run(
            OverlapResolution::RetainFirst,
            vec![set(0, &[(0.0, 10.0)]), set(1, &[(2.0, 4.0)])],
            0,
        );
        assert_eq!(parts, vec![(0, 0.0, 10.0)]);
    }

    #[test]
    fn test_retain_second_splits_earlier() {
        let (parts, _) = run(
            OverlapResolution::RetainSecond,
            vec![set(0, &[(0.0, 10.0)]), set(1, &[(2.0, 4.0)])],
            0,
        );
        assert_eq!(parts, vec![(0, 0.0, 2.0), (1, 2.0, 4.0), (0, 4.0, 10.0)]);
    }

    #[test]
    fn test_retain_second_same_start_drops_earlier() {
        let (parts, _) = run(
            OverlapResolution::RetainSecond,
            vec![set(0, &[(1.0, 3.0)]), set(1, &[(1.0, 5.0)])],
            0,
        );
        assert_eq!(parts, vec![(1, 1.0, 5.0)]);
    }

    #[test]
    fn test_retain_both_keeps_overlap() {
        let (parts, calls) = run(
            OverlapResolution::RetainBoth,
            vec![set(0, &[(0.0, 10.0)]), set(1, &[(5.0, 15.0)])],
            0,
        );
        assert_eq!(calls, 1);
        assert_eq!(parts, vec![(0, 0.0, 10.0), (1, 5.0, 15.0)]);
    }

    #[test]
    fn test_onehit_counts_only_forward_partitions() {
        let (parts, _) = run(
            OverlapResolution::RetainFirst,
            vec![
                set(0, &[(-2.0, 1.0), (4.0, 5.0)]),
                set(1, &[(2.0, 3.0), (6.0, 7.0)]),
            ],
            1,
        );
        assert_eq!(parts, vec![(0, -2.0, 1.0), (1, 2.0, 3.0)]);
    }

    #[test]
    fn test_touching_regions_are_not_overlaps() {
        let (parts, calls) = run(
            OverlapResolution::RetainFirst,
            vec![set(0, &[(0.0, 2.0)]), set(1, &[(2.0, 4.0)]), set(2, &[(4.0, 6.0)])],
            0,
        );
        assert_eq!(calls, 0);
        assert_eq!(parts.len(), 3);
    }
}
