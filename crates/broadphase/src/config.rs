//! Pipeline configuration.

use geom::Rect;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::error::ConfigError;
use crate::spatial::{DEFAULT_MAX_DEPTH, DEFAULT_NODE_CAPACITY};

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub spatial: SpatialConfig,
    #[serde(default)]
    pub border: BorderConfig,
    #[serde(default)]
    pub demo: DemoConfig,
}

impl Config {
    /// Load configuration from `quadphase.toml` or use defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = Path::new("quadphase.toml");
        let config: Self = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str(&contents)?
        } else {
            info!("No quadphase.toml found, creating default config");
            let default_config = Self::default();
            std::fs::write(path, toml::to_string_pretty(&default_config)?)?;
            default_config
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values the index cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.spatial.node_capacity == 0 {
            return Err(ConfigError::ZeroNodeCapacity);
        }
        if self.spatial.max_depth == 0 {
            return Err(ConfigError::ZeroMaxDepth);
        }
        if self.border.width <= 0.0 || self.border.height <= 0.0 {
            return Err(ConfigError::EmptyBorder {
                width: self.border.width,
                height: self.border.height,
            });
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spatial: SpatialConfig::default(),
            border: BorderConfig::default(),
            demo: DemoConfig::default(),
        }
    }
}

/// Quadrant-tree tuning.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SpatialConfig {
    /// References a leaf may hold before it subdivides. Larger values
    /// produce shallower, coarser trees; smaller values cull more precisely
    /// at the cost of traversal.
    #[serde(default = "default_node_capacity")]
    pub node_capacity: usize,
    /// Hard subdivision limit. A leaf at this depth absorbs references past
    /// capacity instead of splitting, so clustered input always terminates.
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            node_capacity: default_node_capacity(),
            max_depth: default_max_depth(),
        }
    }
}

/// World border, centered on the origin.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BorderConfig {
    #[serde(default = "default_border_width")]
    pub width: f32,
    #[serde(default = "default_border_height")]
    pub height: f32,
}

impl BorderConfig {
    /// The border as a rect centered on the origin.
    pub fn rect(&self) -> Rect {
        Rect::new(
            -self.width / 2.0,
            -self.height / 2.0,
            self.width,
            self.height,
        )
    }
}

impl Default for BorderConfig {
    fn default() -> Self {
        Self {
            width: default_border_width(),
            height: default_border_height(),
        }
    }
}

/// Demo loop settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DemoConfig {
    /// Number of moving boxes to simulate.
    #[serde(default = "default_movers")]
    pub movers: usize,
    /// Ticks to run before exiting.
    #[serde(default = "default_ticks")]
    pub ticks: u64,
    /// Log metrics every this many ticks.
    #[serde(default = "default_stats_interval")]
    pub stats_interval: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            movers: default_movers(),
            ticks: default_ticks(),
            stats_interval: default_stats_interval(),
        }
    }
}

fn default_node_capacity() -> usize {
    DEFAULT_NODE_CAPACITY
}
fn default_max_depth() -> u32 {
    DEFAULT_MAX_DEPTH
}
fn default_border_width() -> f32 {
    1000.0
}
fn default_border_height() -> f32 {
    1000.0
}
fn default_movers() -> usize {
    256
}
fn default_ticks() -> u64 {
    600
}
fn default_stats_interval() -> u64 {
    100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.spatial.node_capacity, 2);
        assert_eq!(config.spatial.max_depth, 8);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.spatial.node_capacity, config.spatial.node_capacity);
        assert_eq!(back.border.width, config.border.width);
        assert_eq!(back.demo.movers, config.demo.movers);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: Config = toml::from_str("[spatial]\nnode_capacity = 4\n").unwrap();
        assert_eq!(config.spatial.node_capacity, 4);
        assert_eq!(config.spatial.max_depth, 8);
        assert_eq!(config.border.width, 1000.0);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.spatial.node_capacity = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroNodeCapacity)));

        let mut config = Config::default();
        config.spatial.max_depth = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroMaxDepth)));

        let mut config = Config::default();
        config.border.width = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::EmptyBorder { .. })));
    }

    #[test]
    fn test_border_rect_is_origin_centered() {
        let border = BorderConfig {
            width: 200.0,
            height: 100.0,
        };
        let rect = border.rect();
        assert_eq!(rect, Rect::new(-100.0, -50.0, 200.0, 100.0));
        assert_eq!(rect.center(), glam::Vec2::ZERO);
    }
}
