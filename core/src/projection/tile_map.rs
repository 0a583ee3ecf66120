use crate::projection::{ProjectedPosition, ProjectionMode, Projector};

/// Hands raw coordinates to a tile-map renderer unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct TileMapProjector;

impl Projector for TileMapProjector {
    fn mode(&self) -> ProjectionMode {
        ProjectionMode::TileMap
    }

    fn project(&self, latitude: f64, longitude: f64) -> ProjectedPosition {
        ProjectedPosition::Geo {
            lat: latitude,
            lng: longitude,
        }
    }
}
