use crate::projection::bounds::FacilityBounds;
use crate::projection::{ProjectedPosition, ProjectionMode, Projector};
use crate::prelude::FleetResult;

/// Linear projection onto the facility grid, clamped to `[0, 100]`.
///
/// Clamping keeps devices that drift outside the facility pinned to its edge.
#[derive(Debug, Clone, Copy)]
pub struct LocalProjector {
    bounds: FacilityBounds,
}

impl LocalProjector {
    pub fn new(bounds: FacilityBounds) -> FleetResult<Self> {
        bounds.validate()?;
        Ok(Self { bounds })
    }

    pub fn bounds(&self) -> &FacilityBounds {
        &self.bounds
    }

    pub fn grid_point(&self, latitude: f64, longitude: f64) -> (f64, f64) {
        let b = &self.bounds;
        let x = ((longitude - b.west) / (b.east - b.west)) * 100.0;
        let y = ((b.north - latitude) / (b.north - b.south)) * 100.0;
        (clamp_percent(x), clamp_percent(y))
    }
}

fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

impl Projector for LocalProjector {
    fn mode(&self) -> ProjectionMode {
        ProjectionMode::Local
    }

    fn project(&self, latitude: f64, longitude: f64) -> ProjectedPosition {
        let (x, y) = self.grid_point(latitude, longitude);
        ProjectedPosition::Grid { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::FleetError;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn bounds() -> FacilityBounds {
        FacilityBounds {
            north: 40.0,
            south: 30.0,
            east: -110.0,
            west: -120.0,
        }
    }

    #[test]
    fn corners_map_to_grid_corners() {
        let projector = LocalProjector::new(bounds()).unwrap();
        assert_eq!(
            projector.project(40.0, -120.0),
            ProjectedPosition::Grid { x: 0.0, y: 0.0 }
        );
        assert_eq!(
            projector.project(30.0, -110.0),
            ProjectedPosition::Grid { x: 100.0, y: 100.0 }
        );
        assert_eq!(
            projector.project(35.0, -115.0),
            ProjectedPosition::Grid { x: 50.0, y: 50.0 }
        );
    }

    #[test]
    fn out_of_bounds_input_is_clamped() {
        let projector = LocalProjector::new(bounds()).unwrap();
        assert_eq!(projector.grid_point(90.0, 180.0), (100.0, 0.0));
        assert_eq!(projector.grid_point(-90.0, -180.0), (0.0, 100.0));
    }

    #[test]
    fn every_projection_lands_in_the_grid() {
        let projector = LocalProjector::new(bounds()).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..1_000 {
            let lat = rng.gen_range(-90.0..=90.0);
            let lng = rng.gen_range(-180.0..=180.0);
            let (x, y) = projector.grid_point(lat, lng);
            assert!((0.0..=100.0).contains(&x));
            assert!((0.0..=100.0).contains(&y));
        }
    }

    #[test]
    fn zero_width_bounds_are_a_configuration_error() {
        let degenerate = FacilityBounds {
            east: -120.0,
            ..bounds()
        };
        assert!(matches!(
            LocalProjector::new(degenerate),
            Err(FleetError::Configuration(_))
        ));
    }
}
