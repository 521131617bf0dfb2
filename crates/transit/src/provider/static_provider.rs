//! In-memory metro network built from static line data.
//!
//! Holds the merged station set with lookup maps and a spatial index. Built
//! once at load time and read-only afterwards.

use std::collections::HashMap;
use std::sync::Arc;

use rstar::RTree;

use crate::identifiers::*;
use crate::models::{traits::*, types::*};
use crate::network::merge::{join_key, merge_lines, InterchangeMismatch, MergeOptions, NameCollision};
use crate::spatial::distance::WalkingModel;
use crate::spatial::index::{build_station_tree, search_envelopes, StationNode};
use crate::spatial::nearest::{self, decorate, sort_by_distance};

/// In-memory metro network with spatial indexing
///
/// This type is cheap to clone since all data is stored in `Arc`s.
#[derive(Clone)]
pub struct MetroNetwork {
    // Core data
    lines: Vec<Arc<Line>>,
    stations: Vec<Arc<Station>>,

    // Lookup maps
    station_map: HashMap<StationIdentifier, Arc<Station>>,
    name_map: HashMap<Arc<str>, Arc<Station>>,

    // Spatial index
    station_tree: RTree<StationNode>,

    walking: WalkingModel,

    // Load-time findings
    collisions: Vec<NameCollision>,
    interchange_mismatches: Vec<InterchangeMismatch>,
}

impl MetroNetwork {
    /// Create a new empty network
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            stations: Vec::new(),
            station_map: HashMap::new(),
            name_map: HashMap::new(),
            station_tree: RTree::new(),
            walking: WalkingModel::default(),
            collisions: Vec::new(),
            interchange_mismatches: Vec::new(),
        }
    }

    /// Build a network from line data, merging stations by name
    pub fn from_lines(lines: Vec<Line>, options: &MergeOptions) -> Result<Self> {
        let merged = merge_lines(&lines, options)?;

        let mut lines: Vec<Arc<Line>> = lines.into_iter().map(Arc::new).collect();
        lines.sort_by_key(|line| line.kind);

        // Build lookup maps
        let station_map: HashMap<_, _> = merged
            .stations
            .iter()
            .map(|s| (s.id.clone(), s.clone()))
            .collect();

        let name_map: HashMap<_, _> = merged
            .stations
            .iter()
            .map(|s| (s.name.clone(), s.clone()))
            .collect();

        // Build spatial index
        let station_tree = build_station_tree(&merged.stations);

        Ok(Self {
            lines,
            stations: merged.stations,
            station_map,
            name_map,
            station_tree,
            walking: WalkingModel::default(),
            collisions: merged.collisions,
            interchange_mismatches: merged.interchange_mismatches,
        })
    }

    pub fn with_walking_model(mut self, walking: WalkingModel) -> Self {
        self.walking = walking;
        self
    }

    pub fn walking_model(&self) -> &WalkingModel {
        &self.walking
    }

    /// Same-name entries that were merged despite disagreeing coordinates
    pub fn collisions(&self) -> &[NameCollision] {
        &self.collisions
    }

    pub fn interchange_mismatches(&self) -> &[InterchangeMismatch] {
        &self.interchange_mismatches
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Display colour for a line.
    ///
    /// A branch uses its trunk's colour whenever the trunk is loaded, and its
    /// own colour otherwise.
    pub fn line_color(&self, kind: LineKind) -> Option<&str> {
        self.line_ref(kind.trunk())
            .or_else(|| self.line_ref(kind))
            .map(|line| &*line.color)
    }

    /// Display colour for a station marker (its primary line's colour)
    pub fn station_color(&self, station: &Station) -> Option<&str> {
        self.line_color(station.primary_line())
    }

    /// Merged stations served by `kind`, in that line's path order
    pub fn stations_on(&self, kind: LineKind) -> Vec<Arc<Station>> {
        let Some(line) = self.line_ref(kind) else {
            return Vec::new();
        };

        let mut seen = std::collections::HashSet::new();
        line.stations
            .iter()
            .filter_map(|raw| self.name_map.get(join_key(&raw.name)))
            .filter(|s| seen.insert(s.id.clone()))
            .cloned()
            .collect()
    }

    fn line_ref(&self, kind: LineKind) -> Option<&Arc<Line>> {
        self.lines.iter().find(|line| line.kind == kind)
    }

    fn ranked(
        &self,
        point: Coordinate,
        candidates: impl Iterator<Item = (usize, Arc<Station>)>,
    ) -> Vec<(usize, NearestStation)> {
        let mut ranked: Vec<_> = candidates
            .map(|(order, station)| {
                let distance = self.walking.distance(point, station.location);
                (order, decorate(station, distance, &self.walking))
            })
            .collect();
        sort_by_distance(&mut ranked);
        ranked
    }
}

impl Default for MetroNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl TransitProvider for MetroNetwork {
    fn get_station(&self, id: &StationIdentifier) -> Option<Arc<Station>> {
        self.station_map.get(id).cloned()
    }

    fn station_by_name(&self, name: &str) -> Option<Arc<Station>> {
        self.name_map.get(join_key(name)).cloned()
    }

    fn get_line(&self, kind: LineKind) -> Option<Arc<Line>> {
        self.line_ref(kind).cloned()
    }

    fn all_stations(&self) -> &[Arc<Station>] {
        &self.stations
    }

    fn all_lines(&self) -> &[Arc<Line>] {
        &self.lines
    }

    fn find_nearest(&self, point: Coordinate) -> Option<NearestStation> {
        nearest::find_nearest(point, &self.stations, &self.walking)
    }

    fn stations_within(&self, point: Coordinate, radius_m: f64) -> Vec<NearestStation> {
        if radius_m.is_nan() || radius_m < 0.0 {
            return Vec::new();
        }
        if radius_m.is_infinite() {
            return self.nearest_stations(point, self.stations.len());
        }

        // the boxes never overlap, so no station is returned twice
        let envelopes = search_envelopes(point, radius_m, self.walking.earth_radius_m);
        let candidates = envelopes
            .iter()
            .flat_map(|envelope| self.station_tree.locate_in_envelope(envelope))
            .map(|node| (node.order, node.station.clone()));

        self.ranked(point, candidates)
            .into_iter()
            .map(|(_, nearest)| nearest)
            .filter(|nearest| nearest.distance_m <= radius_m)
            .collect()
    }

    fn nearest_stations(&self, point: Coordinate, n: usize) -> Vec<NearestStation> {
        let candidates = self.stations.iter().cloned().enumerate();

        self.ranked(point, candidates)
            .into_iter()
            .take(n)
            .map(|(_, nearest)| nearest)
            .collect()
    }
}
