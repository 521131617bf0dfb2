//! Distance calculations, spatial indexing and nearest-station queries.

pub mod distance;
pub mod format;
pub mod index;
pub mod nearest;

pub use distance::{haversine_distance, walking_time_minutes, WalkingModel};
pub use format::{format_distance, format_walking_time};
pub use nearest::find_nearest;
