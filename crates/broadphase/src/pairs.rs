//! Per-cycle broad-phase driver.
//!
//! Owns the quadrant tree plus the reusable buffers one simulation loop
//! needs: rebuild the index from the active colliders each cycle, then turn
//! per-collider region queries into a de-duplicated set of candidate pairs
//! for the narrow phase.

use fixedbitset::FixedBitSet;
use geom::Rect;
use tracing::debug;

use crate::config::SpatialConfig;
use crate::spatial::{ColliderRef, QuadTree};

/// Candidate pair from the broad phase, ordered `a < b`.
///
/// Candidates are loose: the pair's rects may not actually overlap, and the
/// caller's exact narrow-phase test decides. No pair is emitted twice and no
/// collider is paired with itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidatePair {
    pub a: u32,
    pub b: u32,
}

/// Broad-phase pipeline state, reused across cycles.
pub struct BroadPhase {
    tree: QuadTree,
    /// Scratch buffer for one collider's candidates.
    candidates: Vec<ColliderRef>,
    /// Seen-set that kills straddle duplicates within one query.
    seen: FixedBitSet,
}

impl BroadPhase {
    pub fn new(config: &SpatialConfig) -> Self {
        Self {
            tree: QuadTree::new(config.node_capacity, config.max_depth),
            candidates: Vec::with_capacity(64),
            seen: FixedBitSet::with_capacity(1024),
        }
    }

    /// Rebuild the index from scratch for this cycle.
    ///
    /// Collider IDs are expected to be unique within one cycle.
    pub fn rebuild(&mut self, border: Rect, refs: &[ColliderRef]) {
        self.tree.clear();
        self.tree.set_boundaries(border);
        for &r in refs {
            self.tree.insert(r);
        }
        debug!(
            "rebuilt spatial index: {} nodes, {} stored refs",
            self.tree.node_count(),
            self.tree.item_count()
        );
    }

    /// Append every unique candidate pair among `refs` to `out`.
    ///
    /// Returns the summed work count of the underlying region queries.
    pub fn candidate_pairs(&mut self, refs: &[ColliderRef], out: &mut Vec<CandidatePair>) -> usize {
        let mut work = 0;
        for r in refs {
            self.candidates.clear();
            work += self.tree.collect_candidates(&mut self.candidates, r.bounds);

            self.seen.clear();
            for c in &self.candidates {
                // Emit each unordered pair once: only from the lower-id side,
                // and only the first time a straddle copy surfaces.
                if c.id <= r.id {
                    continue;
                }
                let bit = c.id as usize;
                if bit >= self.seen.len() {
                    self.seen.grow(bit + 1);
                }
                if self.seen.put(bit) {
                    continue;
                }
                out.push(CandidatePair { a: r.id, b: c.id });
            }
        }
        debug!("collected {} candidate pairs ({} work)", out.len(), work);
        work
    }

    /// Region query pass-through for callers with a single region of
    /// interest.
    pub fn query(&self, region: Rect, out: &mut Vec<ColliderRef>) -> usize {
        self.tree.collect_candidates(out, region)
    }

    /// Node rectangles for external visualization.
    pub fn debug_rects(&self, out: &mut Vec<Rect>) {
        self.tree.collect_rects(out);
    }

    pub fn tree(&self) -> &QuadTree {
        &self.tree
    }
}
