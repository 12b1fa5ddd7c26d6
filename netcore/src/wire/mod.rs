/*! Packet formats of the link and internet layer.

Every format comes in two shapes:

 * A lowercase, unsized byte wrapper such as [`ethernet_frame`] or [`ipv4_packet`]. It reads and
   writes single header fields in place and knows nothing about their meaning.
 * A `Repr` such as [`ArpRepr`] or [`Ipv4Repr`], which holds the fields this stack cares about.
   `parse` validates a wrapper into one, `emit` writes one back.

[`ethernet_frame`]: struct.ethernet_frame.html
[`ipv4_packet`]: struct.ipv4_packet.html
[`ArpRepr`]: enum.ArpRepr.html
[`Ipv4Repr`]: struct.Ipv4Repr.html

Accessors index the buffer directly and panic when it is too short. Received octets go through
`new_checked`, which runs `check_len` first, and after that no accessor panics until a length
field is changed. `Repr::emit` needs a buffer of at least `Repr::buffer_len()` octets.

# Examples

Build an ipv4 header and read it back:

```rust
use netcore::wire::*;
let repr = Ipv4Repr {
    src_addr:     Ipv4Address::new(10, 0, 0, 1),
    dst_addr:     Ipv4Address::new(10, 0, 0, 2),
    protocol:     IpProtocol::Udp,
    payload_len:  10,
    hop_limit:    64,
    router_alert: false,
};
let mut buffer = vec![0; repr.total_len()];
repr.emit(ipv4_packet::new_unchecked_mut(&mut buffer), Checksum::Manual);

let packet = ipv4_packet::new_checked(&buffer).expect("length fields");
assert_eq!(Ipv4Repr::parse(packet, Checksum::Manual), Ok(repr));
assert_eq!(packet.payload_slice().len(), 10);
```
*/
mod field {
    pub(crate) type Field = ::core::ops::Range<usize>;
}

pub(crate) mod checksum;
mod error;

/// Address resolution packets for ethernet and ipv4.
pub mod arp;
/// Ethernet II frames and station addresses.
pub mod ethernet;
/// Control messages of RFC 792.
pub mod icmpv4;
/// Group membership messages of RFC 2236.
pub mod igmp;
/// Ipv4 headers, addresses and prefixes.
pub mod ipv4;

pub use self::error::{Error, Result};

/// Whether a checksum is verified and computed in software.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checksum {
    /// Computed and verified in software.
    Manual,

    /// Left to the device, the field is written as zero and never checked.
    Ignored,
}

impl Checksum {
    /// If the checksum is handled in software.
    pub fn manual(self) -> bool {
        self == Checksum::Manual
    }
}

pub use self::ethernet::{
    ethernet as ethernet_frame,
    EtherType as EthernetProtocol,
    Address as EthernetAddress,
    Repr as EthernetRepr,
    HEADER_LEN as ETHERNET_HEADER_LEN,
};

pub use self::arp::{
    arp as arp_packet,
    Hardware as ArpHardware,
    Operation as ArpOperation,
    Repr as ArpRepr,
};

pub use self::ipv4::{
    ipv4 as ipv4_packet,
    Address as Ipv4Address,
    Cidr as Ipv4Cidr,
    Subnet as Ipv4Subnet,
    Protocol as IpProtocol,
    Repr as Ipv4Repr,
};

pub use self::icmpv4::{
    icmpv4 as icmpv4_packet,
    Message as Icmpv4Message,
    DstUnreachable as Icmpv4DstUnreachable,
    Redirect as Icmpv4Redirect,
    TimeExceeded as Icmpv4TimeExceeded,
    Embedded as Icmpv4Embedded,
    Repr as Icmpv4Repr,
};

pub use self::igmp::{
    igmp as igmp_packet,
    Message as IgmpMessage,
    Repr as IgmpRepr,
};
