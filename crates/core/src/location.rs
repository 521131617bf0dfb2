//! Choosing which coordinate drives the nearest-station lookup.
//!
//! Precedence is strict: a search selection beats device geolocation, which
//! beats the configured fallback. The fallback is only used while neither
//! higher source has ever produced a coordinate.

use std::sync::Arc;

use metro_transit::Coordinate;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LocationSource {
    Search,
    Device,
    Fallback,
}

impl LocationSource {
    pub fn label(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Device => "device location",
            Self::Fallback => "default location",
        }
    }
}

/// The coordinate currently in effect and where it came from
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActiveLocation {
    pub coordinate: Coordinate,
    pub source: LocationSource,
}

/// Last report from the device geolocation provider
#[derive(Clone, Debug, PartialEq)]
pub enum GeolocationStatus {
    /// No reading yet
    Pending,
    Available(Coordinate),
    /// Denied, timed out or otherwise failed
    Unavailable(Arc<str>),
}

#[derive(Clone, Debug)]
pub struct LocationArbiter {
    search: Option<Coordinate>,
    device: GeolocationStatus,
    last_device_fix: Option<Coordinate>,
    fallback: Coordinate,
}

impl LocationArbiter {
    pub fn new(fallback: Coordinate) -> Self {
        Self {
            search: None,
            device: GeolocationStatus::Pending,
            last_device_fix: None,
            fallback,
        }
    }

    pub fn set_search(&mut self, coordinate: Coordinate) {
        self.search = Some(coordinate);
    }

    /// Drop the search selection; the device fix (if any) takes over.
    pub fn clear_search(&mut self) {
        self.search = None;
    }

    pub fn update_device(&mut self, coordinate: Coordinate) {
        self.device = GeolocationStatus::Available(coordinate);
        self.last_device_fix = Some(coordinate);
    }

    /// Record a geolocation failure.
    ///
    /// A fix received earlier stays in effect; only the status changes.
    pub fn device_unavailable(&mut self, reason: &str) {
        self.device = GeolocationStatus::Unavailable(reason.into());
    }

    pub fn search(&self) -> Option<Coordinate> {
        self.search
    }

    pub fn device_status(&self) -> &GeolocationStatus {
        &self.device
    }

    pub fn fallback(&self) -> Coordinate {
        self.fallback
    }

    /// Resolve the active coordinate. Evaluated fresh on every call.
    pub fn active(&self) -> ActiveLocation {
        if let Some(coordinate) = self.search {
            return ActiveLocation {
                coordinate,
                source: LocationSource::Search,
            };
        }

        if let Some(coordinate) = self.last_device_fix {
            return ActiveLocation {
                coordinate,
                source: LocationSource::Device,
            };
        }

        ActiveLocation {
            coordinate: self.fallback,
            source: LocationSource::Fallback,
        }
    }
}
