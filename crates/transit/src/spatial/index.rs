//! R-tree nodes for spatial indexing.
//!
//! Wraps merged stations with their position in degrees (x = lng, y = lat).
//!
//! ## Two-Stage Filtering
//!
//! Radius queries first select candidates from degree-space bounding boxes in
//! the R-tree, then apply the exact Haversine distance to the candidates. The
//! boxes bound the whole spherical cap, so no station inside the radius is
//! dropped by the first stage. A cap crossing the antimeridian is split in two
//! and a cap reaching a pole spans every longitude. Station longitudes are
//! expected in `-180..=180`.

use std::sync::Arc;

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::models::types::{Coordinate, Station};
use crate::spatial::distance::meters_to_degrees;

#[derive(Clone, Debug)]
pub struct StationNode {
    pub station: Arc<Station>,
    /// Position of the station in merge order; used to break distance ties
    pub order: usize,
    point: [f64; 2],
}

impl StationNode {
    pub fn new(order: usize, station: Arc<Station>) -> Self {
        let location = station.location();
        Self {
            station,
            order,
            point: [location.lng, location.lat],
        }
    }
}

impl RTreeObject for StationNode {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for StationNode {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

pub fn build_station_tree(stations: &[Arc<Station>]) -> RTree<StationNode> {
    RTree::bulk_load(
        stations
            .iter()
            .enumerate()
            .map(|(order, s)| StationNode::new(order, s.clone()))
            .collect(),
    )
}

/// Degree-space boxes that together contain every point within `radius_m`
pub fn search_envelopes(center: Coordinate, radius_m: f64, earth_radius_m: f64) -> Vec<AABB<[f64; 2]>> {
    // small margin against rounding at the box edge
    let d_lat = meters_to_degrees(radius_m, earth_radius_m) * 1.01;
    let min_lat = center.lat - d_lat;
    let max_lat = center.lat + d_lat;

    // sine of the widest longitude offset on the cap's boundary
    let spread = d_lat.to_radians().sin() / center.lat.to_radians().cos();
    if min_lat <= -90.0 || max_lat >= 90.0 || !(spread < 1.0) {
        return vec![AABB::from_corners(
            [-180.0, min_lat.max(-90.0)],
            [180.0, max_lat.min(90.0)],
        )];
    }

    let d_lng = spread.asin().to_degrees();
    let west = center.lng - d_lng;
    let east = center.lng + d_lng;

    let mut boxes = vec![AABB::from_corners([west, min_lat], [east, max_lat])];
    if west < -180.0 {
        boxes.push(AABB::from_corners([west + 360.0, min_lat], [180.0, max_lat]));
    }
    if east > 180.0 {
        boxes.push(AABB::from_corners([-180.0, min_lat], [east - 360.0, max_lat]));
    }
    boxes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::distance::{haversine_distance, EARTH_RADIUS_M};
    use rstar::Envelope;

    #[test]
    fn test_envelope_covers_radius_in_every_direction() {
        let center = Coordinate::new(23.1, 72.58);
        let radius = 2_000.0;
        let envelopes = search_envelopes(center, radius, EARTH_RADIUS_M);
        assert_eq!(envelopes.len(), 1);

        // walk out just under the radius along both axes
        let d_lat = meters_to_degrees(radius, EARTH_RADIUS_M) * 0.999;
        let d_lng = d_lat / center.lat.to_radians().cos();
        for point in [
            Coordinate::new(center.lat + d_lat, center.lng),
            Coordinate::new(center.lat - d_lat, center.lng),
            Coordinate::new(center.lat, center.lng + d_lng),
            Coordinate::new(center.lat, center.lng - d_lng),
        ] {
            assert!(haversine_distance(center, point) < radius);
            assert!(envelopes[0].contains_point(&[point.lng, point.lat]));
        }
    }

    fn covered(envelopes: &[AABB<[f64; 2]>], point: Coordinate) -> bool {
        envelopes.iter().any(|e| e.contains_point(&[point.lng, point.lat]))
    }

    #[test]
    fn test_envelope_split_at_antimeridian() {
        let center = Coordinate::new(-17.7, 179.9);
        let across = Coordinate::new(-17.7, -179.9);
        let radius = 30_000.0;
        assert!(haversine_distance(center, across) < radius);

        let envelopes = search_envelopes(center, radius, EARTH_RADIUS_M);
        assert_eq!(envelopes.len(), 2);
        assert!(covered(&envelopes, center));
        assert!(covered(&envelopes, across));
        assert!(!covered(&envelopes, Coordinate::new(-17.7, 0.0)));

        let mirrored = search_envelopes(across, radius, EARTH_RADIUS_M);
        assert_eq!(mirrored.len(), 2);
        assert!(covered(&mirrored, center));
    }

    #[test]
    fn test_envelope_near_pole_spans_all_longitudes() {
        let center = Coordinate::new(89.9, 10.0);
        let far_side = Coordinate::new(89.9, -170.0);
        let radius = 50_000.0;
        assert!(haversine_distance(center, far_side) < radius);

        let envelopes = search_envelopes(center, radius, EARTH_RADIUS_M);
        assert_eq!(envelopes.len(), 1);
        assert!(covered(&envelopes, far_side));
    }

    #[test]
    fn test_tree_keeps_merge_order() {
        use crate::models::types::{Line, LineKind, RawStation};
        use crate::network::merge::{merge_lines, MergeOptions};

        let line = Line::new(
            LineKind::EastWest,
            "East-West",
            "#3B82F6",
            vec![
                RawStation::new("ew-1", "A", 23.00, 72.50),
                RawStation::new("ew-2", "B", 23.01, 72.55),
            ],
        );
        let merged = merge_lines(&[line], &MergeOptions::default()).unwrap();
        let tree = build_station_tree(&merged.stations);

        let nearest = tree.nearest_neighbor(&[72.549, 23.01]).unwrap();
        assert_eq!(nearest.station.name(), "B");
        assert_eq!(nearest.order, 1);
        assert_eq!(tree.size(), 2);
    }
}
