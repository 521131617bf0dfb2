//! Building the station set from line data.

pub mod merge;

pub use merge::{merge_lines, InterchangeMismatch, MergeOptions, MergedStations, NameCollision};
