//! Core data types and enums for metro network data.

use std::sync::Arc;

use geo::{Coord, LineString, Point};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use crate::identifiers::*;

// ============================================================================
// Enums
// ============================================================================

/// The fixed set of metro lines.
///
/// Declaration order is the merge order: East-West first, then North-South,
/// then the branch.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, AsRefStr, EnumIter,
)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum LineKind {
    EastWest,
    NorthSouth,
    NorthSouthBranch,
}

impl LineKind {
    /// All lines in merge order
    pub fn in_merge_order() -> impl Iterator<Item = LineKind> {
        Self::iter()
    }

    /// The line whose display colour this line uses.
    ///
    /// Branch stations are drawn in their trunk's colour.
    pub fn trunk(self) -> LineKind {
        match self {
            Self::NorthSouthBranch => Self::NorthSouth,
            other => other,
        }
    }

    pub fn is_branch(self) -> bool {
        self.trunk() != self
    }

    /// Human readable label (e.g., "East–West Line")
    pub fn label(self) -> &'static str {
        match self {
            Self::EastWest => "East–West Line",
            Self::NorthSouth => "North–South Line",
            Self::NorthSouthBranch => "North–South Line (Branch)",
        }
    }
}

// ============================================================================
// Coordinates
// ============================================================================

/// A WGS-84 position in degrees.
///
/// No range validation is applied; out-of-range values give well-defined but
/// meaningless distances.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

impl From<Coordinate> for Point {
    fn from(c: Coordinate) -> Self {
        Point::new(c.lng, c.lat)
    }
}

impl From<Point> for Coordinate {
    fn from(p: Point) -> Self {
        Coordinate::new(p.y(), p.x())
    }
}

impl From<Coordinate> for Coord {
    fn from(c: Coordinate) -> Self {
        Coord { x: c.lng, y: c.lat }
    }
}

// ============================================================================
// Data Structures
// ============================================================================

/// A station entry as it appears in one line's station list.
///
/// `interchange` is the flag declared by the source data. It is advisory only;
/// the merged [`Station`] derives its own flag from line membership.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawStation {
    pub id: StationIdentifier,
    pub name: Arc<str>,
    pub lat: f64,
    pub lng: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub interchange: bool,
}

impl RawStation {
    pub fn new(id: impl Into<StationIdentifier>, name: &str, lat: f64, lng: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            lat,
            lng,
            interchange: false,
        }
    }

    pub fn location(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

/// One metro line: an ordered station list plus its display colour.
#[derive(Clone, Debug, PartialEq)]
pub struct Line {
    pub kind: LineKind,
    pub name: Arc<str>,
    /// Hex RGB, e.g. "#3B82F6"
    pub color: Arc<str>,
    /// Stations in path order (first to last)
    pub stations: Vec<RawStation>,
}

impl Line {
    pub fn new(kind: LineKind, name: &str, color: &str, stations: Vec<RawStation>) -> Self {
        Self {
            kind,
            name: name.into(),
            color: color.into(),
            stations,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Polyline through the stations in path order
    pub fn path(&self) -> LineString {
        self.stations
            .iter()
            .map(|s| Coord::from(s.location()))
            .collect()
    }
}

/// A deduplicated station, annotated with every line that serves it.
///
/// Built once by the line merge and shared as `Arc<Station>` afterwards.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Station {
    pub(crate) id: StationIdentifier,
    pub(crate) name: Arc<str>,
    pub(crate) location: Coordinate,
    pub(crate) interchange: bool,
    pub(crate) lines: Vec<LineKind>,
}

impl Station {
    pub fn id(&self) -> &StationIdentifier {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> Coordinate {
        self.location
    }

    /// True iff the station is served by two or more lines
    pub fn is_interchange(&self) -> bool {
        self.interchange
    }

    /// Lines serving this station, in the order they were first encountered
    pub fn lines(&self) -> &[LineKind] {
        &self.lines
    }

    pub fn serves(&self, kind: LineKind) -> bool {
        self.lines.contains(&kind)
    }

    /// The line used for colouring: the trunk of the first line encountered.
    pub fn primary_line(&self) -> LineKind {
        // lines is never empty for merged stations
        self.lines.first().copied().unwrap_or(LineKind::EastWest).trunk()
    }
}

/// The closest station to a coordinate, with walking distance and time.
///
/// Both numbers are unrounded; rounding happens only when formatting.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NearestStation {
    pub station: Arc<Station>,
    /// Meters
    pub distance_m: f64,
    /// Minutes
    pub walking_time_min: f64,
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum TransitError {
    #[error("Station not found: {0}")]
    StationNotFound(StationIdentifier),

    #[error("Station name {name:?} is shared by {first} and {second}, {separation_m:.0} m apart")]
    NameCollision {
        name: Arc<str>,
        first: StationIdentifier,
        second: StationIdentifier,
        separation_m: f64,
    },

    #[error("Station id {0} is used by more than one station")]
    DuplicateStationId(StationIdentifier),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, TransitError>;
