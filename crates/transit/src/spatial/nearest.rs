//! Nearest-station resolution over a merged station set.

use std::sync::Arc;

use crate::models::types::{Coordinate, NearestStation, Station};
use crate::spatial::distance::WalkingModel;

/// Find the station closest to `point`.
///
/// Returns `None` only for an empty station set. Every station is scanned;
/// a later station replaces the current best only when strictly closer, so on
/// an exact tie the station earlier in `stations` wins.
pub fn find_nearest(
    point: Coordinate,
    stations: &[Arc<Station>],
    model: &WalkingModel,
) -> Option<NearestStation> {
    let mut best: Option<(&Arc<Station>, f64)> = None;

    for station in stations {
        let distance = model.distance(point, station.location());
        match best {
            Some((_, min)) if !(distance < min) => {}
            _ => best = Some((station, distance)),
        }
    }

    best.map(|(station, distance)| decorate(station.clone(), distance, model))
}

/// Decorate a station with its walking distance and time from a point.
pub fn decorate(station: Arc<Station>, distance_m: f64, model: &WalkingModel) -> NearestStation {
    NearestStation {
        station,
        distance_m,
        walking_time_min: model.walking_time(distance_m),
    }
}

/// Sort candidates by distance, keeping the given order among equal distances.
pub fn sort_by_distance(candidates: &mut [(usize, NearestStation)]) {
    candidates.sort_by(|(a_order, a), (b_order, b)| {
        a.distance_m
            .total_cmp(&b.distance_m)
            .then(a_order.cmp(b_order))
    });
}
