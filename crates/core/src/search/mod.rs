//! Place search: the geocoder seam, the Nominatim client and the debounced
//! controller that feeds search selections into a session.

mod controller;
mod geocoder;
mod nominatim;

pub use controller::{SEARCH_FAILED_MESSAGE, SearchController, SearchState};
pub use geocoder::{Geocoder, SearchCandidate, SearchError};
pub use nominatim::{NominatimGeocoder, parse_response};
