//! Spatial indexing utilities.
//!
//! Quadrant tree rebuilt from scratch every simulation cycle.

mod quadtree;

pub use quadtree::{ColliderRef, QuadTree, DEFAULT_MAX_DEPTH, DEFAULT_NODE_CAPACITY};
