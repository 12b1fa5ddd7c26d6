//! Encapsulates a network interface card.
//!
//! Also permits software emulation of one, see [`External`].
//!
//! The stack copies every frame out of the device when receiving and hands complete frames to it
//! when sending. A device never sees partial frames and never owns stack buffers.
//!
//! [`External`]: external/struct.External.html
pub mod external;

use crate::wire::EthernetAddress;

pub use self::external::External;

/// The primitives of an Ethernet device driver.
pub trait Device {
    /// Copy the next received frame into `buffer`.
    ///
    /// Returns the length of the frame or `None` if no frame is pending. Frames longer than the
    /// buffer are truncated to its length.
    fn receive(&mut self, buffer: &mut [u8]) -> Option<usize>;

    /// Transmit a complete frame, including the link header.
    ///
    /// Returns `false` if the frame could not be queued for transmission.
    fn send(&mut self, frame: &[u8]) -> bool;

    /// Whether the physical link is up.
    fn is_link_up(&self) -> bool;

    /// Replace the set of multicast addresses accepted by the hardware filter.
    ///
    /// Returns `false` if the device can not filter on the given set.
    fn set_multicast_filter(&mut self, groups: &[EthernetAddress]) -> bool;

    /// The hardware address of the device.
    fn hardware_addr(&self) -> EthernetAddress;
}

impl<D: Device + ?Sized> Device for &'_ mut D {
    fn receive(&mut self, buffer: &mut [u8]) -> Option<usize> {
        (**self).receive(buffer)
    }

    fn send(&mut self, frame: &[u8]) -> bool {
        (**self).send(frame)
    }

    fn is_link_up(&self) -> bool {
        (**self).is_link_up()
    }

    fn set_multicast_filter(&mut self, groups: &[EthernetAddress]) -> bool {
        (**self).set_multicast_filter(groups)
    }

    fn hardware_addr(&self) -> EthernetAddress {
        (**self).hardware_addr()
    }
}
