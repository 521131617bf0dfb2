//! Core traits for metro network data.
//!
//! These traits define the public interface consumed by the session and
//! presentation layers. Implementations can be in-memory or remote.

use std::sync::Arc;

use crate::identifiers::*;
use crate::models::types::*;

// ============================================================================
// Provider Trait
// ============================================================================

/// Provider of the merged station set with lookup and query methods
pub trait TransitProvider: Send + Sync {
    // ---- Lookups ----
    fn get_station(&self, id: &StationIdentifier) -> Option<Arc<Station>>;
    fn station_by_name(&self, name: &str) -> Option<Arc<Station>>;
    fn get_line(&self, kind: LineKind) -> Option<Arc<Line>>;

    // ---- Collections ----

    /// Merged stations in first-encounter order
    fn all_stations(&self) -> &[Arc<Station>];

    /// Lines in merge order
    fn all_lines(&self) -> &[Arc<Line>];

    // ---- Spatial queries ----

    /// The single closest station, `None` only if there are no stations
    fn find_nearest(&self, point: Coordinate) -> Option<NearestStation>;

    /// Stations within radius (meters), closest first. An infinite radius
    /// returns every station, a negative or NaN one returns none.
    fn stations_within(&self, point: Coordinate, radius_m: f64) -> Vec<NearestStation>;

    /// The N nearest stations, closest first
    fn nearest_stations(&self, point: Coordinate, n: usize) -> Vec<NearestStation>;
}
