//! Keeps the nearest station in step with the active location.
//!
//! Every input change re-runs arbitration and the nearest-station scan and
//! publishes a fresh [`SessionSnapshot`]. Nothing is cached between changes.

use std::sync::Arc;

use metro_transit::{Coordinate, NearestStation, TransitProvider};
use tokio::sync::watch;

use crate::location::{ActiveLocation, GeolocationStatus, LocationArbiter};

#[derive(Clone, Debug, PartialEq)]
pub struct SessionSnapshot {
    pub active: ActiveLocation,
    /// `None` when the network has no stations
    pub nearest: Option<NearestStation>,
}

pub struct NearestStationSession {
    network: Arc<dyn TransitProvider>,
    arbiter: LocationArbiter,
    snapshot: watch::Sender<SessionSnapshot>,
}

impl NearestStationSession {
    pub fn new(network: Arc<dyn TransitProvider>, fallback: Coordinate) -> Self {
        let arbiter = LocationArbiter::new(fallback);
        let initial = resolve(network.as_ref(), &arbiter);
        let (snapshot, _) = watch::channel(initial);

        Self {
            network,
            arbiter,
            snapshot,
        }
    }

    /// Receive every snapshot published from now on
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn network(&self) -> &Arc<dyn TransitProvider> {
        &self.network
    }

    pub fn geolocation_status(&self) -> &GeolocationStatus {
        self.arbiter.device_status()
    }

    pub fn set_search_location(&mut self, coordinate: Coordinate) -> SessionSnapshot {
        self.arbiter.set_search(coordinate);
        self.publish()
    }

    pub fn clear_search_location(&mut self) -> SessionSnapshot {
        self.arbiter.clear_search();
        self.publish()
    }

    pub fn update_device_location(&mut self, coordinate: Coordinate) -> SessionSnapshot {
        self.arbiter.update_device(coordinate);
        self.publish()
    }

    pub fn device_unavailable(&mut self, reason: &str) -> SessionSnapshot {
        tracing::info!("geolocation unavailable: {reason}");
        self.arbiter.device_unavailable(reason);
        self.publish()
    }

    fn publish(&mut self) -> SessionSnapshot {
        let snapshot = resolve(self.network.as_ref(), &self.arbiter);
        tracing::debug!(
            "active location {:?} from {}, nearest {:?}",
            snapshot.active.coordinate,
            snapshot.active.source.label(),
            snapshot.nearest.as_ref().map(|n| n.station.name()),
        );
        self.snapshot.send_replace(snapshot.clone());
        snapshot
    }
}

fn resolve(network: &dyn TransitProvider, arbiter: &LocationArbiter) -> SessionSnapshot {
    let active = arbiter.active();
    SessionSnapshot {
        active,
        nearest: network.find_nearest(active.coordinate),
    }
}
