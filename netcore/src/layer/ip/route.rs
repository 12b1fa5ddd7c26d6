use crate::managed::Slots;
use crate::time::Instant;
use crate::wire::Ipv4Address;

/// A learned first hop towards one destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Route {
    /// The host the route applies to.
    pub destination: Ipv4Address,
    /// The on-link router to send through.
    pub gateway: Ipv4Address,
    /// Last time the route was used for sending.
    pub last_used: Instant,
}

/// A cache of host routes learned from redirects.
///
/// Routes are never removed, a full cache replaces the route that was used least recently.
#[derive(Debug)]
pub struct Routes {
    routes: Slots<Route>,
}

impl Routes {
    /// Create a cache holding at most `capacity` routes.
    pub fn new(capacity: usize) -> Self {
        Routes { routes: Slots::new(capacity) }
    }

    /// Insert a route or replace the gateway of an existing one.
    pub fn add_route(&mut self, destination: Ipv4Address, gateway: Ipv4Address, now: Instant) {
        let existing = self.routes.iter_mut()
            .find(|(_, route)| route.destination == destination);
        if let Some((_, route)) = existing {
            route.gateway = gateway;
            route.last_used = now;
            return;
        }

        if self.routes.is_full() {
            let oldest = self.routes.iter()
                .min_by_key(|(_, route)| route.last_used)
                .map(|(key, _)| key);
            if let Some(route) = oldest.and_then(|key| self.routes.remove(key)) {
                net_debug!("ip: forgetting route to {} via {}", route.destination, route.gateway);
            }
        }

        let route = Route { destination, gateway, last_used: now };
        if self.routes.insert(route).is_err() {
            net_warn!("ip: no room for route to {}", destination);
        }
    }

    /// Look up the gateway for a destination and mark the route as used.
    pub fn get_route(&mut self, destination: Ipv4Address, now: Instant) -> Option<Ipv4Address> {
        self.routes.iter_mut()
            .find(|(_, route)| route.destination == destination)
            .map(|(_, route)| {
                route.last_used = now;
                route.gateway
            })
    }

    /// Look up the gateway for a destination without touching the route.
    pub fn find(&self, destination: Ipv4Address) -> Option<Ipv4Address> {
        self.routes.iter()
            .find(|(_, route)| route.destination == destination)
            .map(|(_, route)| route.gateway)
    }

    /// Iterate over all cached routes.
    pub fn iter(&self) -> impl Iterator<Item=&Route> + '_ {
        self.routes.iter().map(|(_, route)| route)
    }

    /// The number of cached routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// If no route was learned.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
