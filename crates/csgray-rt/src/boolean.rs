//! One-dimensional boolean evaluation along a ray.
//!
//! A region's tree is evaluated against the segments of the current shot.
//! Each solid leaf becomes a sorted list of disjoint [`Interval`]s, and the
//! operators combine those lists with merges. Endpoints closer than the
//! distance tolerance are the same point, so subtracting a solid that
//! shares a face with the minuend leaves no sliver behind.

use csgray_math::Tolerance;
use csgray_solids::Hit;

use crate::bitv::SolidBits;
use crate::region::BoolTree;
use crate::resource::SegKey;
use crate::soltab::SolidBit;

/// One end of an interval: the hit that bounds it and where it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boundary {
    pub(crate) hit: Hit,
    pub(crate) seg: SegKey,
    pub(crate) solid: SolidBit,
    pub(crate) flip: bool,
}

impl Boundary {
    pub(crate) fn new(hit: Hit, seg: SegKey, solid: SolidBit) -> Self {
        Self {
            hit,
            seg,
            solid,
            flip: false,
        }
    }

    /// Distance along the ray.
    #[inline]
    pub fn dist(&self) -> f64 {
        self.hit.dist()
    }

    /// The hit record.
    pub fn hit(&self) -> &Hit {
        &self.hit
    }

    /// Solid whose surface this is.
    pub fn solid(&self) -> SolidBit {
        self.solid
    }

    /// Segment the hit belongs to.
    pub fn seg(&self) -> SegKey {
        self.seg
    }

    /// True when the solid's outward normal must be reversed here.
    pub fn flip(&self) -> bool {
        self.flip
    }

    /// The same surface seen from the other side.
    pub(crate) fn flipped(self) -> Self {
        Self {
            flip: !self.flip,
            ..self
        }
    }
}

/// A stretch of ray inside the volume being evaluated.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Interval {
    pub(crate) entry: Boundary,
    pub(crate) exit: Boundary,
    pub(crate) solids: SolidBits,
}

impl Interval {
    pub(crate) fn new(entry: Boundary, exit: Boundary) -> Self {
        let mut solids = SolidBits::single(entry.solid);
        solids.set(exit.solid);
        Self {
            entry,
            exit,
            solids,
        }
    }

    fn length(&self) -> f64 {
        self.exit.dist() - self.entry.dist()
    }
}

/// Sorted, pairwise-disjoint intervals.
pub(crate) type IntervalSet = Vec<Interval>;

/// Turn one solid's raw segments into a canonical interval set.
pub(crate) fn normalize(mut raw: Vec<Interval>, tol: &Tolerance) -> IntervalSet {
    raw.retain(|iv| iv.length() > tol.dist);
    raw.sort_by(|a, b| a.entry.dist().total_cmp(&b.entry.dist()));
    coalesce(raw, tol)
}

fn coalesce(sorted: Vec<Interval>, tol: &Tolerance) -> IntervalSet {
    let mut out: IntervalSet = Vec::with_capacity(sorted.len());
    for iv in sorted {
        match out.last_mut() {
            Some(cur) if iv.entry.dist() <= cur.exit.dist() + tol.dist => {
                if iv.exit.dist() > cur.exit.dist() {
                    cur.exit = iv.exit;
                }
                cur.solids.union_with(&iv.solids);
            }
            _ => out.push(iv),
        }
    }
    out
}

/// Points in `a` or `b`.
pub(crate) fn union(a: IntervalSet, b: IntervalSet, tol: &Tolerance) -> IntervalSet {
    if a.is_empty() {
        return b;
    }
    if b.is_empty() {
        return a;
    }
    let mut all = a;
    all.extend(b);
    all.sort_by(|x, y| x.entry.dist().total_cmp(&y.entry.dist()));
    coalesce(all, tol)
}

/// Points in both `a` and `b`.
pub(crate) fn intersect(a: &[Interval], b: &[Interval], tol: &Tolerance) -> IntervalSet {
    let mut out = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        let (x, y) = (&a[i], &b[j]);
        let entry = if y.entry.dist() > x.entry.dist() + tol.dist {
            y.entry
        } else {
            x.entry
        };
        let exit = if y.exit.dist() < x.exit.dist() - tol.dist {
            y.exit
        } else {
            x.exit
        };
        if exit.dist() - entry.dist() > tol.dist {
            let mut solids = x.solids;
            solids.union_with(&y.solids);
            out.push(Interval {
                entry,
                exit,
                solids,
            });
        }
        if x.exit.dist() <= y.exit.dist() {
            i += 1;
        } else {
            j += 1;
        }
    }
    out
}

/// Points in `a` but not in `b`.
///
/// Surfaces of `b` that bound a surviving piece face the other way, so
/// their boundaries come out flipped.
pub(crate) fn subtract(a: &[Interval], b: &[Interval], tol: &Tolerance) -> IntervalSet {
    let mut out = Vec::new();
    let mut first = 0;
    for x in a {
        while first < b.len() && b[first].exit.dist() <= x.entry.dist() + tol.dist {
            first += 1;
        }
        let mut cursor = x.entry;
        let mut solids = x.solids;
        let mut consumed = false;
        for y in b[first..]
            .iter()
            .take_while(|y| y.entry.dist() < x.exit.dist() - tol.dist)
        {
            if y.entry.dist() > cursor.dist() + tol.dist {
                let mut piece_solids = solids;
                piece_solids.union_with(&y.solids);
                out.push(Interval {
                    entry: cursor,
                    exit: y.entry.flipped(),
                    solids: piece_solids,
                });
            }
            if y.exit.dist() > cursor.dist() {
                cursor = y.exit.flipped();
                solids = x.solids;
                solids.union_with(&y.solids);
            }
            if cursor.dist() >= x.exit.dist() - tol.dist {
                consumed = true;
                break;
            }
        }
        if !consumed && x.exit.dist() - cursor.dist() > tol.dist {
            out.push(Interval {
                entry: cursor,
                exit: x.exit,
                solids,
            });
        }
    }
    out
}

/// Points in exactly one of `a` and `b`.
pub(crate) fn xor(a: &[Interval], b: &[Interval], tol: &Tolerance) -> IntervalSet {
    union(subtract(a, b, tol), subtract(b, a, tol), tol)
}

/// Evaluate `tree`, asking `leaf` for each solid's interval set.
///
/// The right operand of an intersection or subtraction is not evaluated
/// when the left one is already empty.
pub(crate) fn eval<F>(tree: &BoolTree, leaf: &mut F, tol: &Tolerance) -> IntervalSet
where
    F: FnMut(SolidBit) -> IntervalSet,
{
    match tree {
        BoolTree::Solid(bit) => leaf(*bit),
        BoolTree::Union(l, r) => {
            let a = eval(l, leaf, tol);
            let b = eval(r, leaf, tol);
            union(a, b, tol)
        }
        BoolTree::Intersect(l, r) => {
            let a = eval(l, leaf, tol);
            if a.is_empty() {
                return a;
            }
            intersect(&a, &eval(r, leaf, tol), tol)
        }
        BoolTree::Subtract(l, r) => {
            let a = eval(l, leaf, tol);
            if a.is_empty() {
                return a;
            }
            subtract(&a, &eval(r, leaf, tol), tol)
        }
        BoolTree::Xor(l, r) => {
            let a = eval(l, leaf, tol);
            let b = eval(r, leaf, tol);
            xor(&a, &b, tol)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: Tolerance = Tolerance::DEFAULT;

    fn iv(solid: usize, a: f64, b: f64) -> Interval {
        let bit = SolidBit::from_index(solid);
        Interval::new(
            Boundary::new(Hit::new(a, 0), SegKey::default(), bit),
            Boundary::new(Hit::new(b, 1), SegKey::default(), bit),
        )
    }

    fn spans(set: &[Interval]) -> Vec<(f64, f64)> {
        set.iter().map(|i| (i.entry.dist(), i.exit.dist())).collect()
    }

    #[test]
    fn test_union_merges_touching() {
        let out = union(vec![iv(0, 0.0, 2.0)], vec![iv(1, 2.00005, 5.0), iv(1, 7.0, 8.0)], &TOL);
        assert_eq!(spans(&out), vec![(0.0, 5.0), (7.0, 8.0)]);
        assert_eq!(out[0].solids.count(), 2);
        assert_eq!(out[0].exit.solid, SolidBit::from_index(1));
    }

    #[test]
    fn test_intersect() {
        let a = vec![iv(0, 0.0, 4.0), iv(0, 6.0, 10.0)];
        let b = vec![iv(1, 3.0, 7.0)];
        let out = intersect(&a, &b, &TOL);
        assert_eq!(spans(&out), vec![(3.0, 4.0), (6.0, 7.0)]);
        assert_eq!(out[0].entry.solid, SolidBit::from_index(1));
        assert_eq!(out[0].exit.solid, SolidBit::from_index(0));
    }

    #[test]
    fn test_intersect_touching_is_empty() {
        let out = intersect(&[iv(0, 0.0, 2.0)], &[iv(1, 2.0, 4.0)], &TOL);
        assert!(out.is_empty());
    }

    #[test]
    fn test_subtract_middle_flips_boundaries() {
        let out = subtract(&[iv(0, 0.0, 10.0)], &[iv(1, 4.0, 6.0)], &TOL);
        assert_eq!(spans(&out), vec![(0.0, 4.0), (6.0, 10.0)]);
        assert!(out[0].exit.flip);
        assert!(out[1].entry.flip);
        assert!(!out[0].entry.flip);
        assert!(!out[1].exit.flip);
    }

    #[test]
    fn test_subtract_coincident_face_leaves_no_sliver() {
        let out = subtract(&[iv(0, 0.0, 10.0)], &[iv(1, 5.0, 10.00005)], &TOL);
        assert_eq!(spans(&out), vec![(0.0, 5.0)]);
        let out = subtract(&[iv(0, 0.0, 10.0)], &[iv(1, -0.00005, 5.0)], &TOL);
        assert_eq!(spans(&out), vec![(5.0, 10.0)]);
        let out = subtract(&[iv(0, 0.0, 10.0)], &[iv(1, 0.0, 10.0)], &TOL);
        assert!(out.is_empty());
    }

    #[test]
    fn test_subtract_several_holes() {
        let a = vec![iv(0, 0.0, 10.0), iv(0, 20.0, 30.0)];
        let b = vec![iv(1, 2.0, 3.0), iv(1, 5.0, 22.0), iv(1, 29.0, 40.0)];
        let out = subtract(&a, &b, &TOL);
        assert_eq!(spans(&out), vec![(0.0, 2.0), (3.0, 5.0), (22.0, 29.0)]);
    }

    #[test]
    fn test_xor() {
        let out = xor(&[iv(0, 0.0, 6.0)], &[iv(1, 4.0, 10.0)], &TOL);
        assert_eq!(spans(&out), vec![(0.0, 4.0), (6.0, 10.0)]);
    }

    #[test]
    fn test_normalize_drops_grazes_and_merges() {
        let out = normalize(vec![iv(0, 5.0, 6.0), iv(0, 1.0, 1.0), iv(0, 0.0, 5.0)], &TOL);
        assert_eq!(spans(&out), vec![(0.0, 6.0)]);
    }

    #[test]
    fn test_eval_short_circuits_empty_left() {
        let tree = BoolTree::intersect(
            BoolTree::leaf(SolidBit::from_index(0)),
            BoolTree::leaf(SolidBit::from_index(1)),
        );
        let mut asked = Vec::new();
        let out = eval(
            &tree,
            &mut |bit: SolidBit| {
                asked.push(bit.index());
                Vec::new()
            },
            &TOL,
        );
        assert!(out.is_empty());
        assert_eq!(asked, vec![0]);
    }
}
