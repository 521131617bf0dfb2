//! Metro data models, types, and traits.

pub mod traits;
pub mod types;

// Re-exports for convenience
pub use traits::TransitProvider;
pub use types::{
    Coordinate, Line, LineKind, NearestStation, RawStation, Result, Station, TransitError,
};
