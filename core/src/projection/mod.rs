//! Geocoordinate projection into renderable map space.
//!
//! Two strategies share the [`Projector`] capability: a bounded facility grid
//! that maps into `[0, 100] x [0, 100]` and a tile-map pass-through for
//! renderers that place markers by latitude/longitude themselves.

pub mod bounds;
pub mod local;
pub mod tile_map;
pub mod zones;

pub use bounds::FacilityBounds;
pub use local::LocalProjector;
pub use tile_map::TileMapProjector;
pub use zones::{zone_geometry, ZoneRect};

use crate::prelude::FleetResult;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionMode {
    Local,
    #[default]
    TileMap,
}

/// Position of a marker in the space of the active projection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProjectedPosition {
    /// Percentage of the viewport, both axes in `[0, 100]`.
    Grid { x: f64, y: f64 },
    Geo { lat: f64, lng: f64 },
}

pub trait Projector: Send + Sync {
    fn mode(&self) -> ProjectionMode;
    fn project(&self, latitude: f64, longitude: f64) -> ProjectedPosition;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ProjectionConfig {
    pub mode: ProjectionMode,
    pub bounds: FacilityBounds,
}

/// Builds the configured strategy, failing on degenerate local bounds.
pub fn build_projector(config: &ProjectionConfig) -> FleetResult<Arc<dyn Projector>> {
    match config.mode {
        ProjectionMode::Local => Ok(Arc::new(LocalProjector::new(config.bounds)?)),
        ProjectionMode::TileMap => Ok(Arc::new(TileMapProjector)),
    }
}
