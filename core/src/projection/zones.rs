use crate::device::Zone;
use serde::Serialize;

/// Overlay rectangle in normalized facility space.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct ZoneRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ZoneRect {
    const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

const ZONE_LAYOUT: [(Zone, ZoneRect); 6] = [
    (Zone::ServerRoom, ZoneRect::new(5.0, 5.0, 20.0, 25.0)),
    (Zone::OfficeNorth, ZoneRect::new(30.0, 5.0, 40.0, 25.0)),
    (Zone::Warehouse, ZoneRect::new(75.0, 5.0, 20.0, 60.0)),
    (Zone::OfficeSouth, ZoneRect::new(30.0, 35.0, 40.0, 30.0)),
    (Zone::ParkingLot, ZoneRect::new(5.0, 70.0, 30.0, 25.0)),
    (Zone::Lobby, ZoneRect::new(40.0, 70.0, 25.0, 25.0)),
];

/// Overlay rectangle for a zone; `Unknown` has none.
pub fn zone_geometry(zone: Zone) -> Option<ZoneRect> {
    ZONE_LAYOUT
        .iter()
        .find(|(candidate, _)| *candidate == zone)
        .map(|(_, rect)| *rect)
}

/// Every zone with an overlay, in drawing order.
pub fn zone_layout() -> impl Iterator<Item = (Zone, ZoneRect)> {
    ZONE_LAYOUT.into_iter()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_named_zone_has_geometry_inside_the_grid() {
        for zone in Zone::ALL {
            match zone_geometry(zone) {
                Some(rect) => {
                    assert!(rect.x >= 0.0 && rect.x + rect.width <= 100.0);
                    assert!(rect.y >= 0.0 && rect.y + rect.height <= 100.0);
                }
                None => assert_eq!(zone, Zone::Unknown),
            }
        }
    }

    #[test]
    fn zone_overlays_do_not_overlap() {
        let rects: Vec<_> = zone_layout().map(|(_, rect)| rect).collect();
        for (i, a) in rects.iter().enumerate() {
            for b in rects.iter().skip(i + 1) {
                let disjoint = a.x + a.width <= b.x
                    || b.x + b.width <= a.x
                    || a.y + a.height <= b.y
                    || b.y + b.height <= a.y;
                assert!(disjoint, "{:?} overlaps {:?}", a, b);
            }
        }
    }

    #[test]
    fn contains_is_inclusive_of_edges() {
        let rect = zone_geometry(Zone::Lobby).unwrap();
        assert!(rect.contains(40.0, 70.0));
        assert!(rect.contains(65.0, 95.0));
        assert!(!rect.contains(39.9, 80.0));
    }
}
