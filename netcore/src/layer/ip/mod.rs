//! The IPv4 layer.
//!
//! Received packets are validated, filtered by their destination and dispatched by protocol:
//! control messages go to the [icmp] and [igmp] engines, everything else is queued as a
//! [`Datagram`] for the transport above. Fragments are dropped, they are never reassembled.
//!
//! Sending goes through a [`Sender`] which assembles the header, picks the next hop and hands the
//! packet to the [`eth::Link`]. The next hop of a destination is:
//!
//! 1. the destination itself for broadcast, multicast and on-link addresses,
//! 2. the gateway learned from a redirect, see [`Routes`],
//! 3. the default gateway of the configuration.
//!
//! [icmp]: ../icmp/index.html
//! [igmp]: ../igmp/index.html
//! [`Datagram`]: struct.Datagram.html
//! [`Sender`]: struct.Sender.html
//! [`eth::Link`]: ../eth/struct.Link.html
//! [`Routes`]: struct.Routes.html
use alloc::vec::Vec;

use crate::wire::{Ipv4Address, IpProtocol};

mod endpoint;
mod route;

pub use endpoint::{Endpoint, Sender};
pub use route::{Route, Routes};

/// The hop limit of unicast and broadcast datagrams.
pub const DEFAULT_TTL: u8 = 64;

/// The hop limit of multicast datagrams, they never leave the local network.
pub const MULTICAST_TTL: u8 = 1;

/// A received datagram with its addressing context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Datagram {
    /// The sender of the datagram.
    pub src_addr: Ipv4Address,
    /// The address the datagram was sent to, may be broadcast or multicast.
    pub dst_addr: Ipv4Address,
    /// The protocol of the payload.
    pub protocol: IpProtocol,
    /// The payload, with link padding removed.
    pub payload: Vec<u8>,
}
