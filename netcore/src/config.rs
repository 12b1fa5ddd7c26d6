//! Address configuration and table capacities of an interface.
//!
//! The address configuration is owned by whatever assigns addresses (static setup, DHCP, ...)
//! and only consumed by the stack. Before an address is assigned the interface runs with an
//! unset address and only accepts broadcast traffic.
use crate::wire::{Ipv4Address, Ipv4Cidr};

/// The ipv4 configuration of an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    cidr: Ipv4Cidr,
    gateway: Option<Ipv4Address>,
    broadcast: Ipv4Address,
}

/// Capacities of all tables and queues of an interface.
///
/// Everything the stack stores is bounded by one of these values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Number of address resolution entries.
    pub neighbors: usize,
    /// Number of frames that may wait for one pending resolution.
    pub pending_frames: usize,
    /// Number of redirect-learned routes.
    pub routes: usize,
    /// Number of link layer multicast addresses in the device filter.
    pub link_groups: usize,
    /// Number of joined ip host groups.
    pub host_groups: usize,
    /// Depth of each receive queue.
    pub rx_queue: usize,
    /// Depth of the control message notification queue.
    pub notifications: usize,
}

impl Config {
    /// Configure an interface address with an optional default gateway.
    ///
    /// The broadcast address is derived from the subnet of `cidr`. Subnets without a reserved
    /// broadcast address (prefix 31 and 32) use the limited broadcast instead.
    pub fn new(cidr: Ipv4Cidr, gateway: Option<Ipv4Address>) -> Self {
        Config {
            cidr,
            gateway,
            broadcast: cidr.broadcast().unwrap_or(Ipv4Address::BROADCAST),
        }
    }

    /// A configuration without an address, as used before one has been assigned.
    pub fn unset() -> Self {
        Config {
            cidr: Ipv4Cidr::UNSPECIFIED,
            gateway: None,
            broadcast: Ipv4Address::BROADCAST,
        }
    }

    /// The local address, `0.0.0.0` while unset.
    pub fn address(&self) -> Ipv4Address {
        self.cidr.address()
    }

    /// The local address with its subnet prefix.
    pub fn cidr(&self) -> Ipv4Cidr {
        self.cidr
    }

    /// The subnet mask.
    pub fn netmask(&self) -> Ipv4Address {
        self.cidr.netmask()
    }

    /// The default gateway, if any.
    pub fn gateway(&self) -> Option<Ipv4Address> {
        self.gateway
    }

    /// The directed broadcast address of the local subnet.
    pub fn broadcast(&self) -> Ipv4Address {
        self.broadcast
    }

    /// If no address has been assigned yet.
    pub fn is_unset(&self) -> bool {
        self.cidr.address() == Ipv4Address::UNSPECIFIED
    }

    /// Whether `address` can be reached without a router.
    ///
    /// Always false while the address is unset.
    pub fn on_link(&self, address: Ipv4Address) -> bool {
        !self.is_unset() && self.cidr.subnet().contains(address)
    }

    /// Whether `address` denotes a broadcast for this interface.
    pub fn is_broadcast(&self, address: Ipv4Address) -> bool {
        address.is_broadcast() || address == self.broadcast
    }

    /// Assign a new address, recomputing the broadcast address.
    pub fn set_address(&mut self, cidr: Ipv4Cidr) {
        self.cidr = cidr;
        self.broadcast = cidr.broadcast().unwrap_or(Ipv4Address::BROADCAST);
    }

    /// Replace the default gateway.
    pub fn set_gateway(&mut self, gateway: Option<Ipv4Address>) {
        self.gateway = gateway;
    }

    /// Override the broadcast address derived from the subnet.
    pub fn set_broadcast(&mut self, broadcast: Ipv4Address) {
        self.broadcast = broadcast;
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::unset()
    }
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            neighbors: 16,
            pending_frames: 8,
            routes: 16,
            link_groups: 8,
            host_groups: 8,
            rx_queue: 32,
            notifications: 16,
        }
    }
}
