//! The process logic of protocol layers.
//!
//! ## Layering
//!
//! Each protocol layer is split into two parts; the packet logic contained in `wire` and the
//! processing part in this module. An endpoint represents the local state of a protocol. This
//! state is used to process packets of that layer and is open to modifications by the user while
//! processing does not take place, similar to reconfiguration on the OS level with utilities such
//! as `arp`, `ip route`, etc.
//!
//! ## Receiving
//!
//! Received data flows upwards through queues. The eth layer drains the device and sorts frames
//! into the address resolution engine, the ip receive queue or the raw frame queue. The ip layer
//! drains its queue and hands datagrams to the control message engines or keeps them for the
//! transport above.
//!
//! ## Sending
//!
//! Layers that need to send while processing borrow the layers below them through a short lived
//! context: [`eth::Link`] bundles the eth endpoint, the device and the configuration, and
//! [`ip::Sender`] adds the route cache on top. Control message engines never own a reference to
//! another layer, so each endpoint can be owned by the interface without cycles.
//!
//! [`eth::Link`]: eth/struct.Link.html
//! [`ip::Sender`]: ip/struct.Sender.html
use core::fmt;

pub mod arp;
pub mod eth;
pub mod icmp;
pub mod igmp;
pub mod ip;

#[cfg(test)]
mod fixture;

/// The result type of layer operations.
pub type Result<T> = core::result::Result<T, Error>;

/// The error type of layer operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Error {
    /// The operation was not permitted.
    ///
    /// Returned when the device, endpoint, receiver or sender does not allow or implement an
    /// operation. Also returned for addresses that are not valid for the operation, e.g. joining
    /// a unicast address as a multicast group.
    Illegal,

    /// The packet does not fit.
    ///
    /// Either it is empty or larger than the link MTU permits.
    BadSize,

    /// Unable to find a route towards the destination address.
    Unreachable,

    /// The action could not be completed because there were not enough resources.
    ///
    /// The main difference towards `Illegal` is that implies that it would have been legal with
    /// more resources. Tables that can replace their least recently used entry never return it.
    Exhausted,

    /// The referenced group or entry does not exist.
    NotFound,
}

/// Can convert from a wire error.
///
/// This indicates some layer tried to operate on a packet but failed.
impl From<crate::wire::Error> for Error {
    fn from(_: crate::wire::Error) -> Self {
        Error::Illegal
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Illegal => write!(f, "operation not permitted"),
            Error::BadSize => write!(f, "bad packet size"),
            Error::Unreachable => write!(f, "destination unreachable"),
            Error::Exhausted => write!(f, "resources exhausted"),
            Error::NotFound => write!(f, "entry not found"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
