//! Quadrant-tree broad-phase library.

pub mod config;
pub mod error;
pub mod pairs;
pub mod spatial;

// Re-export commonly used types
pub use config::Config;
pub use error::ConfigError;
pub use pairs::{BroadPhase, CandidatePair};
pub use spatial::{ColliderRef, QuadTree};
