//! Pluggable place search.
//!
//! External crates (or tests) implement [`Geocoder`] to provide lookups.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use metro_transit::Coordinate;

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid search endpoint {0}")]
    Endpoint(String),

    #[error("search service answered {0}")]
    Status(reqwest::StatusCode),

    #[error("unreadable search response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("result {place_id} has no usable coordinates")]
    Unselectable { place_id: Arc<str> },
}

/// One place returned by a search.
///
/// `location` is `None` when the service's coordinates could not be parsed;
/// such a candidate can be listed but not selected.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchCandidate {
    pub place_id: Arc<str>,
    pub display_name: Arc<str>,
    pub location: Option<Coordinate>,
}

impl SearchCandidate {
    pub fn is_selectable(&self) -> bool {
        self.location.is_some()
    }

    pub fn coordinate(&self) -> Result<Coordinate, SearchError> {
        self.location.ok_or_else(|| SearchError::Unselectable {
            place_id: self.place_id.clone(),
        })
    }
}

/// Look up places by free text
pub trait Geocoder: Send + Sync {
    /// Blank queries must resolve to an empty list without any I/O.
    fn search<'a>(
        &'a self,
        query: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<SearchCandidate>, SearchError>> + Send + 'a>>;
}

/// Parse a coordinate that the service sends as text (or, leniently, as a number)
pub(crate) fn parse_degrees(value: Option<&serde_json::Value>) -> Option<f64> {
    let degrees = match value? {
        serde_json::Value::String(text) => text.trim().parse::<f64>().ok()?,
        serde_json::Value::Number(number) => number.as_f64()?,
        _ => return None,
    };
    degrees.is_finite().then_some(degrees)
}
