//! Segments: the span of a ray inside one solid.

use csgray_solids::{Hit, SegmentSink};
use slotmap::SlotMap;

use crate::error::Result;
use crate::resource::{Resource, SegKey};
use crate::soltab::SolidBit;

/// Entry and exit of a ray through one solid.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    inhit: Hit,
    outhit: Hit,
    solid: SolidBit,
    next: Option<SegKey>,
}

impl Segment {
    /// Segment of `solid` from `inhit` to `outhit`.
    pub fn new(inhit: Hit, outhit: Hit, solid: SolidBit) -> Self {
        Self {
            inhit,
            outhit,
            solid,
            next: None,
        }
    }

    /// Where the ray enters.
    pub fn inhit(&self) -> &Hit {
        &self.inhit
    }

    /// Where the ray leaves.
    pub fn outhit(&self) -> &Hit {
        &self.outhit
    }

    /// Solid this segment belongs to.
    pub fn solid(&self) -> SolidBit {
        self.solid
    }
}

/// The segments one solid produced on the current shot, linked in order.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Chain {
    pub(crate) solid: SolidBit,
    head: SegKey,
}

/// Every chain produced on one shot, sorted by solid bit once shooting ends.
#[derive(Debug, Default)]
pub(crate) struct SegChains {
    chains: Vec<Chain>,
    sorted: bool,
}

impl SegChains {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, chain: Chain) {
        self.chains.push(chain);
        self.sorted = false;
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// Order chains by solid so lookups can bisect.
    pub(crate) fn seal(&mut self) {
        self.chains.sort_by_key(|c| c.solid);
        self.sorted = true;
    }

    pub(crate) fn chains(&self) -> &[Chain] {
        &self.chains
    }

    /// Segments of `solid` in chain order.
    pub(crate) fn iter<'a>(
        &'a self,
        solid: SolidBit,
        segs: &'a SlotMap<SegKey, Segment>,
    ) -> impl Iterator<Item = (SegKey, &'a Segment)> + 'a {
        debug_assert!(self.sorted);
        let head = self
            .chains
            .binary_search_by_key(&solid, |c| c.solid)
            .ok()
            .map(|i| self.chains[i].head);
        std::iter::successors(head, move |&k| segs.get(k).and_then(|s| s.next))
            .filter_map(move |k| segs.get(k).map(|s| (k, s)))
    }

    /// Return every segment to the pool.
    pub(crate) fn free_all(self, res: &mut Resource) -> Result<()> {
        for chain in self.chains {
            let mut cursor = Some(chain.head);
            while let Some(key) = cursor {
                cursor = res.segs.get(key).and_then(|s| s.next);
                res.free_seg(key)?;
            }
        }
        Ok(())
    }
}

/// Sink that links one solid's segments into a chain in the pool.
pub(crate) struct ChainSink<'a> {
    res: &'a mut Resource,
    solid: SolidBit,
    head: Option<SegKey>,
    tail: Option<SegKey>,
}

impl<'a> ChainSink<'a> {
    pub(crate) fn new(res: &'a mut Resource, solid: SolidBit) -> Self {
        Self {
            res,
            solid,
            head: None,
            tail: None,
        }
    }

    /// The finished chain, if anything was pushed.
    pub(crate) fn finish(self) -> Option<Chain> {
        self.head.map(|head| Chain {
            solid: self.solid,
            head,
        })
    }
}

impl SegmentSink for ChainSink<'_> {
    fn push_segment(&mut self, inhit: Hit, outhit: Hit) {
        let key = self.res.get_seg(Segment::new(inhit, outhit, self.solid));
        match self.tail.and_then(|t| self.res.segs.get_mut(t)) {
            Some(tail) => tail.next = Some(key),
            None => self.head = Some(key),
        }
        self.tail = Some(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(res: &mut Resource, solid: usize, dists: &[(f64, f64)]) -> Option<Chain> {
        let mut sink = ChainSink::new(res, SolidBit::from_index(solid));
        for &(a, b) in dists {
            sink.push_segment(Hit::new(a, 0), Hit::new(b, 0));
        }
        sink.finish()
    }

    #[test]
    fn test_chains_keep_push_order() {
        let mut res = Resource::new(0);
        let mut chains = SegChains::new();
        for (solid, spans) in [(3, vec![(1.0, 2.0), (5.0, 6.0)]), (1, vec![(0.0, 9.0)])] {
            if let Some(c) = fill(&mut res, solid, &spans) {
                chains.push(c);
            }
        }
        assert!(fill(&mut res, 7, &[]).is_none());
        chains.seal();
        assert_eq!(chains.chains().len(), 2);
        assert_eq!(chains.chains()[0].solid.index(), 1);

        let dists: Vec<f64> = chains
            .iter(SolidBit::from_index(3), &res.segs)
            .map(|(_, s)| s.inhit().dist())
            .collect();
        assert_eq!(dists, vec![1.0, 5.0]);
        assert_eq!(chains.iter(SolidBit::from_index(7), &res.segs).count(), 0);

        chains.free_all(&mut res).unwrap();
        assert_eq!(res.segs_in_use(), 0);
        assert_eq!(res.stats.seg_get, res.stats.seg_free);
    }
}
