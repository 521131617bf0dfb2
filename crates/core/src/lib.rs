//! Nearest-station viewer engine for the Ahmedabad–Gandhinagar metro.
//!
//! Ties the transit network to the things that move: the active location
//! (search, device or fallback), a debounced place search and the session
//! that republishes the nearest station whenever either changes.

pub mod config;
pub mod dataset;
pub mod export;
pub mod location;
pub mod search;
pub mod session;

// Re-export transit from the transit crate
pub use metro_transit as transit;

pub use config::{ConfigError, ViewerConfig};
pub use dataset::DatasetError;
pub use location::{ActiveLocation, GeolocationStatus, LocationArbiter, LocationSource};
pub use session::{NearestStationSession, SessionSnapshot};
