//! # metro-transit
//!
//! Station data and nearest-station queries for a small metro network.
//!
//! ## Features
//!
//! - **Line merge**: per-line station lists become one deduplicated station
//!   set, with interchanges derived from line membership
//! - **Distances**: Haversine great-circle distance and walking-time estimates
//! - **Nearest station**: deterministic linear scan, plus radius and top-N
//!   queries backed by an R-tree
//! - **Formatting**: display strings for distances and walking times
//!
//! ## Example
//!
//! ```
//! use metro_transit::prelude::*;
//!
//! let east_west = Line::new(
//!     LineKind::EastWest,
//!     "East-West Line",
//!     "#3B82F6",
//!     vec![
//!         RawStation::new("ew-01", "Vastral", 23.02, 72.68),
//!         RawStation::new("ew-17", "Thaltej", 23.05, 72.48),
//!     ],
//! );
//!
//! let network = MetroNetwork::from_lines(vec![east_west], &MergeOptions::default()).unwrap();
//!
//! let nearest = network.find_nearest(Coordinate::new(23.03, 72.67)).unwrap();
//! assert_eq!(nearest.station.name(), "Vastral");
//! assert!(format_distance(nearest.distance_m).ends_with(" km"));
//! ```

pub mod identifiers;
pub mod models;
pub mod network;
pub mod provider;
pub mod spatial;

// Re-exports for convenience
pub mod prelude {
    pub use crate::identifiers::*;
    pub use crate::models::{traits::*, types::*};
    pub use crate::network::merge::{merge_lines, MergeOptions, MergedStations};
    pub use crate::provider::static_provider::MetroNetwork;
    pub use crate::spatial::{
        distance::{haversine_distance, walking_time_minutes, WalkingModel},
        format::{format_distance, format_walking_time},
    };
}

pub use prelude::*;
