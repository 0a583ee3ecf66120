use crate::prelude::{FleetError, FleetResult};
use serde::{Deserialize, Serialize};

/// Geographic rectangle covered by the facility grid, in degrees.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FacilityBounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl Default for FacilityBounds {
    fn default() -> Self {
        Self {
            north: 34.0530,
            south: 34.0514,
            east: -118.2425,
            west: -118.2449,
        }
    }
}

impl FacilityBounds {
    pub fn validate(&self) -> FleetResult<()> {
        let edges = [self.north, self.south, self.east, self.west];
        if edges.iter().any(|edge| !edge.is_finite()) {
            return Err(FleetError::Configuration(format!(
                "facility bounds must be finite: {:?}",
                self
            )));
        }
        if self.east == self.west {
            return Err(FleetError::Configuration(format!(
                "facility bounds have zero width (east = west = {})",
                self.east
            )));
        }
        if self.north == self.south {
            return Err(FleetError::Configuration(format!(
                "facility bounds have zero height (north = south = {})",
                self.north
            )));
        }
        Ok(())
    }

    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Geocoordinate at grid position `(x, y)`, as `(latitude, longitude)`.
    pub fn unproject(&self, x: f64, y: f64) -> (f64, f64) {
        let latitude = self.north - (y / 100.0) * self.height();
        let longitude = self.west + (x / 100.0) * self.width();
        (latitude, longitude)
    }
}
