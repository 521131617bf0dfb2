//! GeoJSON rendering of a network for map viewers.
//!
//! Lines become `LineString` features and stations become `Point` features.
//! Positions are `[lng, lat]`.

use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value};
use metro_transit::{Coordinate, Line, MetroNetwork, NearestStation, Station, TransitProvider};
use serde_json::json;

fn position(coordinate: Coordinate) -> Vec<f64> {
    vec![coordinate.lng, coordinate.lat]
}

fn feature(geometry: Value, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(geometry)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn line_feature(network: &MetroNetwork, line: &Line) -> Option<Feature> {
    if line.stations.len() < 2 {
        tracing::debug!("not drawing {} with {} station(s)", line.kind, line.stations.len());
        return None;
    }

    let path = line.stations.iter().map(|s| position(s.location())).collect();

    let mut properties = JsonObject::new();
    properties.insert("feature_type".to_string(), json!("line"));
    properties.insert("kind".to_string(), json!(line.kind));
    properties.insert("name".to_string(), json!(&*line.name));
    properties.insert(
        "color".to_string(),
        json!(network.line_color(line.kind).unwrap_or(&*line.color)),
    );

    Some(feature(Value::LineString(path), properties))
}

fn station_feature(network: &MetroNetwork, station: &Station, nearest: bool) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("feature_type".to_string(), json!("station"));
    properties.insert("id".to_string(), json!(station.id().as_str()));
    properties.insert("name".to_string(), json!(station.name()));
    properties.insert("lines".to_string(), json!(station.lines()));
    properties.insert("interchange".to_string(), json!(station.is_interchange()));
    properties.insert("color".to_string(), json!(network.station_color(station)));
    if nearest {
        properties.insert("nearest".to_string(), json!(true));
    }

    feature(Value::Point(position(station.location())), properties)
}

/// Every drawable line followed by every station.
///
/// The station matching `nearest` (by id) carries `"nearest": true`.
pub fn network_features(
    network: &MetroNetwork,
    nearest: Option<&NearestStation>,
) -> FeatureCollection {
    let nearest_id = nearest.map(|n| n.station.id());

    let lines = network
        .all_lines()
        .iter()
        .filter_map(|line| line_feature(network, line));

    let stations = network.all_stations().iter().map(|station| {
        station_feature(network, station, nearest_id == Some(station.id()))
    });

    FeatureCollection {
        bbox: None,
        features: lines.chain(stations).collect(),
        foreign_members: None,
    }
}

pub fn to_geojson_string(collection: FeatureCollection) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&GeoJson::from(collection))
}
