//! Station identifiers.
//!
//! Ids come straight from the dataset (e.g. `"ew-01"`) and are the stable
//! unique key of a merged station. Backed by `Arc<str>`, so clones share the
//! text.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct StationIdentifier(Arc<str>);

impl StationIdentifier {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(id.as_ref().into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when two ids share one allocation
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Display for StationIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Lets maps keyed by id be queried with a plain &str
impl Borrow<str> for StationIdentifier {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for StationIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for StationIdentifier {
    fn from(id: String) -> Self {
        Self(id.into())
    }
}

impl From<&str> for StationIdentifier {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}
