//! Receiving and answering Icmp messages.
//!
//! Only supports Icmpv4.
//!
//! The engine automates the parts of the icmp procedures a host is required to take care of
//! itself:
//!
//! * Echo requests to the local address are answered by rewriting the received message into a
//!   reply, so the payload is sent back without being interpreted.
//! * Error messages that quote a datagram we sent are turned into a [`Notification`] for the
//!   transport layer. Errors about datagrams of other hosts are discarded.
//! * Redirects from the router we currently use for a destination install a host route, see
//!   [`ip::Routes`].
//!
//! A next hop that never answered address resolution produces the same kind of notification
//! locally, no message is put on the wire for it.
//!
//! [`Notification`]: struct.Notification.html
//! [`ip::Routes`]: ../ip/struct.Routes.html
use crate::wire::{Icmpv4Embedded, Icmpv4Message, IpProtocol, Ipv4Address};

mod endpoint;

pub use endpoint::Endpoint;

/// A remote error concerning a datagram sent by this host.
///
/// Addresses and ports are those of the connection as seen from here: the source is the remote
/// peer that the failed datagram was addressed to, the destination is the local end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Notification {
    /// The kind of error.
    pub message: Icmpv4Message,
    /// The raw code of the error, its meaning depends on `message`.
    pub code: u8,
    /// The protocol of the failed datagram.
    pub protocol: IpProtocol,
    /// The remote address.
    pub src_addr: Ipv4Address,
    /// The local address.
    pub dst_addr: Ipv4Address,
    /// The remote port, zero unless the datagram was tcp or udp.
    pub src_port: u16,
    /// The local port, zero unless the datagram was tcp or udp.
    pub dst_port: u16,
}

impl Notification {
    /// Describe an error about the quoted datagram.
    pub fn new(message: Icmpv4Message, code: u8, quoted: &Icmpv4Embedded) -> Self {
        Notification {
            message,
            code,
            protocol: quoted.protocol,
            src_addr: quoted.dst_addr,
            dst_addr: quoted.src_addr,
            src_port: quoted.dst_port,
            dst_port: quoted.src_port,
        }
    }
}
