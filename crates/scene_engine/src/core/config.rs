//! # Engine Configuration
//!
//! Every tunable of the composition layer in one serde tree, loadable from
//! TOML or RON through the [`Config`] trait.
//!
//! ## Configuration Categories
//!
//! - **Engine**: log level, world-transform composition rule
//! - **Physics**: gravity, spatial index strategy and octree limits
//! - **Lighting**: shadow generator parameters

use serde::{Deserialize, Serialize};

pub use crate::config::{Config, ConfigError};
use crate::backend::ShadowSettings;
use crate::ecs::TransformComposition;
use crate::foundation::math::Vec3;
use crate::spatial::{OctreeConfig, SpatialIndexKind};

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// # Physics Configuration
///
/// Gravity and the spatial index used for attractor queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// World gravity, applied once the backend comes up
    pub gravity: Vec3,
    /// Index strategy rebuilt every tick
    pub spatial_index: SpatialIndexKind,
    /// Octree subdivision limits
    pub octree: OctreeConfig,
    /// Margin added around the fitted index bounds
    pub bounds_padding: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::zeros(),
            spatial_index: SpatialIndexKind::Octree,
            octree: OctreeConfig::default(),
            bounds_padding: 1.0,
        }
    }
}

impl PhysicsConfig {
    /// Set gravity
    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set index strategy
    pub fn with_spatial_index(mut self, kind: SpatialIndexKind) -> Self {
        self.spatial_index = kind;
        self
    }

    /// Set octree limits
    pub fn with_octree(mut self, octree: OctreeConfig) -> Self {
        self.octree = octree;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.gravity.iter().all(|g| g.is_finite()) {
            return Err(ConfigError::Invalid("gravity must be finite".to_string()));
        }
        if self.octree.max_entities_per_node == 0 {
            return Err(ConfigError::Invalid(
                "octree.max_entities_per_node must be at least 1".to_string(),
            ));
        }
        if !(self.octree.min_node_size > 0.0) {
            return Err(ConfigError::Invalid("octree.min_node_size must be positive".to_string()));
        }
        if !(self.bounds_padding >= 0.0) {
            return Err(ConfigError::Invalid("bounds_padding cannot be negative".to_string()));
        }
        Ok(())
    }
}

/// # Engine Configuration
///
/// Top-level configuration applications hand to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Log level for the engine
    pub log_level: String,
    /// How world transforms are derived from parents
    pub transform_composition: TransformComposition,
    /// Physics system configuration
    pub physics: PhysicsConfig,
    /// Shadow generator parameters
    pub lighting: ShadowSettings,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
            transform_composition: TransformComposition::default(),
            physics: PhysicsConfig::default(),
            lighting: ShadowSettings::default(),
        }
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set the world-transform composition rule
    pub fn with_transform_composition(mut self, composition: TransformComposition) -> Self {
        self.transform_composition = composition;
        self
    }

    /// Set physics configuration
    pub fn with_physics(mut self, physics: PhysicsConfig) -> Self {
        self.physics = physics;
        self
    }

    /// Set shadow parameters
    pub fn with_lighting(mut self, lighting: ShadowSettings) -> Self {
        self.lighting = lighting;
        self
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!("unknown log level '{}'", self.log_level)));
        }
        if self.lighting.map_size == 0 || !self.lighting.map_size.is_power_of_two() {
            return Err(ConfigError::Invalid(format!(
                "shadow map size {} is not a power of two",
                self.lighting.map_size
            )));
        }
        self.physics.validate()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Config for EngineConfig {}
