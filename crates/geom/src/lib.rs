//! Shared geometry crate for quadphase.
//!
//! This crate contains:
//! - The axis-aligned `Rect` value type
//! - The containment/intersection predicates the spatial index is built on

mod rect;

pub use rect::Rect;
