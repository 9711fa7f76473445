//! Quadrant-tree spatial index for broad-phase collision queries.
//!
//! The tree recursively splits its boundary into four equal quadrants as
//! references accumulate, so a region query only walks the cells the region
//! touches instead of scanning every reference. The index is rebuilt from
//! scratch every cycle; there is no removal.
//!
//! Nodes live in an arena `Vec` and address each other by index, so tearing
//! the tree down is a single linear release with no recursive destructors.

use geom::Rect;
use tracing::trace;

/// References a leaf may hold before it subdivides.
pub const DEFAULT_NODE_CAPACITY: usize = 2;

/// Subdivision depth limit.
pub const DEFAULT_MAX_DEPTH: u32 = 8;

/// Non-owning handle to an externally owned collider.
///
/// The index stores and returns these by value; the referenced entity is
/// created and destroyed elsewhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColliderRef {
    /// Collider ID in the owning system.
    pub id: u32,
    /// Bounding rectangle (cached at insert time).
    pub bounds: Rect,
}

impl ColliderRef {
    #[inline]
    pub fn new(id: u32, bounds: Rect) -> Self {
        Self { id, bounds }
    }
}

/// One cell of the index: a leaf holding references directly, or an internal
/// node delegating to four child quadrants.
#[derive(Debug)]
struct QuadNode {
    /// The rectangle this node covers.
    bounds: Rect,
    /// Root is depth 0.
    depth: u32,
    /// Back-link for diagnostics; never an ownership edge.
    parent: Option<u32>,
    /// References stored directly at this node.
    items: Vec<ColliderRef>,
    /// All four children or none; children exactly tile `bounds`.
    children: Option<[u32; 4]>,
}

impl QuadNode {
    fn leaf(bounds: Rect, depth: u32, parent: Option<u32>, capacity: usize) -> Self {
        Self {
            bounds,
            depth,
            parent,
            items: Vec::with_capacity(capacity),
            children: None,
        }
    }
}

/// Quadrant tree with an explicit lifecycle: uninitialized until
/// [`QuadTree::set_boundaries`], back to uninitialized on [`QuadTree::clear`].
///
/// Degenerate inputs are silent no-ops rather than errors: inserting into an
/// uninitialized tree or outside the boundary does nothing, and querying an
/// uninitialized tree or a disjoint region returns a fixed minimal work
/// count with an empty result.
pub struct QuadTree {
    nodes: Vec<QuadNode>,
    root: Option<u32>,
    node_capacity: usize,
    max_depth: u32,
}

impl QuadTree {
    /// Create an uninitialized tree with the given tuning.
    ///
    /// `node_capacity` is the number of references a leaf holds before it
    /// subdivides: larger values make shallower, coarser trees; smaller
    /// values cull more precisely at the cost of traversal. `max_depth` is a
    /// hard limit: a leaf at that depth absorbs references past capacity
    /// instead of splitting, so clustered input always terminates.
    pub fn new(node_capacity: usize, max_depth: u32) -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
            node_capacity,
            max_depth,
        }
    }

    /// Discard any existing hierarchy and start over with a fresh single-leaf
    /// root covering `rect`.
    pub fn set_boundaries(&mut self, rect: Rect) {
        self.nodes.clear();
        self.nodes.push(QuadNode::leaf(rect, 0, None, self.node_capacity));
        self.root = Some(0);
    }

    /// Index a reference. No-op if the tree is uninitialized; silently
    /// dropped if its bounds do not intersect the boundary.
    pub fn insert(&mut self, item: ColliderRef) {
        let Some(root) = self.root else { return };
        if self.nodes[root as usize].bounds.intersects(&item.bounds) {
            self.insert_at(root, item);
        }
    }

    /// Drop the whole hierarchy and return to uninitialized. Safe to call on
    /// an already-empty tree.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    /// Append every reference that might intersect `region` to `out`.
    ///
    /// Returns the number of references appended, as a rough work counter.
    /// With no root, or a root disjoint from `region`, returns 1 without
    /// touching `out`.
    ///
    /// References stored directly at a visited node are appended without
    /// checking their own bounds against `region`; they are taken to span
    /// the node's extent, and the caller's exact narrow-phase test filters
    /// them afterward.
    pub fn collect_candidates(&self, out: &mut Vec<ColliderRef>, region: Rect) -> usize {
        let Some(root) = self.root else { return 1 };
        if !self.nodes[root as usize].bounds.intersects(&region) {
            return 1;
        }
        self.collect_at(root, out, &region)
    }

    /// Append every node's rectangle in pre-order (self, then children), for
    /// external visualization. No-op if uninitialized.
    pub fn collect_rects(&self, out: &mut Vec<Rect>) {
        if let Some(root) = self.root {
            self.rects_at(root, out);
        }
    }

    /// Total nodes in the hierarchy.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Total stored references, counting straddle duplicates.
    #[inline]
    pub fn item_count(&self) -> usize {
        self.nodes.iter().map(|n| n.items.len()).sum()
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.root.is_some()
    }

    /// The overall boundary, if one has been set.
    #[inline]
    pub fn bounds(&self) -> Option<Rect> {
        self.root.map(|r| self.nodes[r as usize].bounds)
    }

    fn insert_at(&mut self, idx: u32, item: ColliderRef) {
        let node = &mut self.nodes[idx as usize];
        if node.children.is_none() {
            // Leaf: absorb under capacity, and unconditionally at the depth
            // limit.
            if node.items.len() < self.node_capacity || node.depth >= self.max_depth {
                node.items.push(item);
                return;
            }
            self.subdivide(idx);
        }
        self.fan_out(idx, item);
    }

    /// Dispatch a reference to the children of an internal node.
    fn fan_out(&mut self, idx: u32, item: ColliderRef) {
        let Some(children) = self.nodes[idx as usize].children else {
            return;
        };
        let mut hits = [false; 4];
        for (i, &child) in children.iter().enumerate() {
            hits[i] = self.nodes[child as usize].bounds.intersects(&item.bounds);
        }
        if hits.iter().all(|&h| h) {
            // Spans this node's whole extent; it stays here, never duplicated.
            self.nodes[idx as usize].items.push(item);
            return;
        }
        // A reference overlapping two or three quadrants goes into each of
        // them, so queries may return the same reference more than once.
        for (&child, hit) in children.iter().zip(hits) {
            if hit {
                self.insert_at(child, item);
            }
        }
    }

    fn subdivide(&mut self, idx: u32) {
        let (bounds, child_depth) = {
            let node = &self.nodes[idx as usize];
            (node.bounds, node.depth + 1)
        };
        let base = self.nodes.len() as u32;
        for quad in bounds.quadrants() {
            self.nodes
                .push(QuadNode::leaf(quad, child_depth, Some(idx), self.node_capacity));
        }
        let node = &mut self.nodes[idx as usize];
        node.children = Some([base, base + 1, base + 2, base + 3]);

        // Buffer sized to whatever the node actually holds.
        let held = std::mem::take(&mut node.items);
        trace!(
            "subdivided node {} ({} refs redistributed to depth {})",
            idx,
            held.len(),
            child_depth
        );
        debug_assert!(self.children_consistent(idx));
        for item in held {
            self.fan_out(idx, item);
        }
    }

    /// Children tile the parent exactly and link back to it.
    fn children_consistent(&self, idx: u32) -> bool {
        let node = &self.nodes[idx as usize];
        let Some(children) = node.children else {
            return false;
        };
        let quads = node.bounds.quadrants();
        children.iter().enumerate().all(|(i, &c)| {
            let child = &self.nodes[c as usize];
            child.parent == Some(idx) && child.bounds == quads[i] && child.depth == node.depth + 1
        })
    }

    fn collect_at(&self, idx: u32, out: &mut Vec<ColliderRef>, region: &Rect) -> usize {
        let node = &self.nodes[idx as usize];
        let mut count = node.items.len();
        out.extend_from_slice(&node.items);
        if let Some(children) = node.children {
            for child in children {
                if self.nodes[child as usize].bounds.intersects(region) {
                    count += self.collect_at(child, out, region);
                }
            }
        }
        count
    }

    fn rects_at(&self, idx: u32, out: &mut Vec<Rect>) {
        let node = &self.nodes[idx as usize];
        out.push(node.bounds);
        if let Some(children) = node.children {
            for child in children {
                self.rects_at(child, out);
            }
        }
    }
}

impl Default for QuadTree {
    fn default() -> Self {
        Self::new(DEFAULT_NODE_CAPACITY, DEFAULT_MAX_DEPTH)
    }
}

impl std::fmt::Debug for QuadTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuadTree")
            .field("nodes", &self.node_count())
            .field("items", &self.item_count())
            .field("bounds", &self.bounds())
            .finish()
    }
}
