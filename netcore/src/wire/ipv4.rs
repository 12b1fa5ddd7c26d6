use core::fmt;
#[cfg(feature = "std")]
use core::str::FromStr;
use byteorder::{ByteOrder, NetworkEndian};

use super::{Checksum, Error, Result};
use super::checksum;
use super::field::Field;

/// Headers longer than the fixed part plus one option word are not handled.
pub const MAX_HEADER_LEN: usize = field::OPTIONS.end;

/// Router alert, RFC 2113. Group management messages carry it.
pub const ROUTER_ALERT: [u8; 4] = [0x94, 0x04, 0x00, 0x00];

enum_with_unknown! {
    /// Protocol numbers of the payload.
    pub enum Protocol(u8) {
        /// ICMP, RFC 792.
        Icmp = 0x01,
        /// IGMP, RFC 2236.
        Igmp = 0x02,
        /// TCP.
        Tcp  = 0x06,
        /// UDP.
        Udp  = 0x11,
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Protocol::Icmp => "icmp",
            Protocol::Igmp => "igmp",
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
            Protocol::Unknown(id) => return write!(f, "proto#{}", id),
        };
        f.write_str(name)
    }
}

/// An IPv4 address, octets in network order.
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default)]
pub struct Address(pub [u8; 4]);

/// The bits covered by a prefix of `len` bits.
fn prefix_bits(len: u8) -> u32 {
    assert!(len <= 32, "prefix of {} bits", len);
    match len {
        0 => 0,
        len => !0u32 << (32 - u32::from(len)),
    }
}

impl Address {
    /// 0.0.0.0, the address of a host that has none.
    pub const UNSPECIFIED: Address = Address([0; 4]);

    /// 255.255.255.255, the limited broadcast.
    pub const BROADCAST: Address = Address([255; 4]);

    /// 224.0.0.1, every multicast host on the link.
    pub const MULTICAST_ALL_SYSTEMS: Address = Address([224, 0, 0, 1]);

    /// 224.0.0.2, every multicast router on the link.
    pub const MULTICAST_ALL_ROUTERS: Address = Address([224, 0, 0, 2]);

    /// Address `a.b.c.d`.
    pub const fn new(a: u8, b: u8, c: u8, d: u8) -> Address {
        Address([a, b, c, d])
    }

    /// Read an address out of a packet field.
    ///
    /// Panics when `data` does not have exactly four octets.
    pub fn from_bytes(data: &[u8]) -> Address {
        let mut octets = [0; 4];
        octets.copy_from_slice(data);
        Address(octets)
    }

    /// The octets of the address.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0[..]
    }

    /// Neither broadcast, multicast nor unspecified.
    pub fn is_unicast(&self) -> bool {
        !self.is_broadcast() && !self.is_multicast() && !self.is_unspecified()
    }

    /// The limited broadcast address.
    pub fn is_broadcast(&self) -> bool {
        *self == Address::BROADCAST
    }

    /// Class D, 224.0.0.0/4.
    pub fn is_multicast(&self) -> bool {
        self.0[0] >> 4 == 0xe
    }

    /// Anything in 0.0.0.0/8.
    pub fn is_unspecified(&self) -> bool {
        self.0[0] == 0
    }

    /// Keep only the first `prefix` bits.
    ///
    /// ```rust
    /// # use netcore::wire::Ipv4Address;
    /// let host = Ipv4Address::new(10, 20, 30, 40);
    /// assert_eq!(host.mask(16), Ipv4Address::new(10, 20, 0, 0));
    /// ```
    ///
    /// Panics if `prefix` exceeds 32.
    pub fn mask(&self, prefix: u8) -> Address {
        Address::from(u32::from(*self) & prefix_bits(prefix))
    }
}

impl From<u32> for Address {
    fn from(bits: u32) -> Address {
        Address(bits.to_be_bytes())
    }
}

impl From<Address> for u32 {
    fn from(address: Address) -> u32 {
        u32::from_be_bytes(address.0)
    }
}

#[cfg(feature = "std")]
impl From<std::net::Ipv4Addr> for Address {
    fn from(address: std::net::Ipv4Addr) -> Address {
        Address(address.octets())
    }
}

#[cfg(feature = "std")]
impl From<Address> for std::net::Ipv4Addr {
    fn from(address: Address) -> std::net::Ipv4Addr {
        address.0.into()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let [a, b, c, d] = self.0;
        write!(f, "{}.{}.{}.{}", a, b, c, d)
    }
}

/// A host address together with the length of its network prefix.
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default)]
pub struct Cidr {
    address:    Address,
    prefix_len: u8,
}

/// The network part of a [`Cidr`], for membership tests.
///
/// [`Cidr`]: struct.Cidr.html
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default)]
pub struct Subnet {
    network: Address,
    prefix_len: u8,
}

impl Cidr {
    /// No address assigned yet.
    pub const UNSPECIFIED: Self = Cidr { address: Address::UNSPECIFIED, prefix_len: 0 };

    /// Pair `address` with a prefix length.
    ///
    /// Panics if `prefix_len` exceeds 32.
    pub fn new(address: Address, prefix_len: u8) -> Cidr {
        assert!(prefix_len <= 32, "prefix of {} bits", prefix_len);
        Cidr { address, prefix_len }
    }

    /// The host address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Length of the network prefix in bits.
    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// The prefix written as a mask, such as 255.255.255.0 for `/24`.
    pub fn netmask(&self) -> Address {
        Address::from(prefix_bits(self.prefix_len))
    }

    /// The directed broadcast of the network.
    ///
    /// Point-to-point prefixes, `/31` and `/32`, reserve no broadcast address (RFC 3021).
    pub fn broadcast(&self) -> Option<Address> {
        match self.prefix_len {
            31 | 32 => None,
            len => Some(Address::from(u32::from(self.address) | !prefix_bits(len))),
        }
    }

    /// The network this host is part of.
    pub fn subnet(self) -> Subnet {
        Subnet {
            network: self.address.mask(self.prefix_len),
            prefix_len: self.prefix_len,
        }
    }
}

impl Subnet {
    /// Whether `address` lies within the network.
    pub fn contains(&self, address: Address) -> bool {
        address.mask(self.prefix_len) == self.network
    }

    /// Length of the network prefix in bits.
    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }
}

impl fmt::Display for Cidr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix_len)
    }
}

/// Failure to read an `address/prefix` string.
#[cfg(feature = "std")]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CidrParseError {
    /// There was no `/`.
    MissingPrefix,
    /// The part before the `/` is not a dotted quad.
    BadAddress,
    /// The prefix is not a number up to 32.
    BadPrefix,
}

#[cfg(feature = "std")]
impl fmt::Display for CidrParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CidrParseError::MissingPrefix => write!(f, "expected address/prefix"),
            CidrParseError::BadAddress => write!(f, "not an ipv4 address"),
            CidrParseError::BadPrefix => write!(f, "prefix must be at most 32"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CidrParseError {}

#[cfg(feature = "std")]
impl FromStr for Cidr {
    type Err = CidrParseError;

    fn from_str(text: &str) -> core::result::Result<Cidr, CidrParseError> {
        let mut parts = text.splitn(2, '/');
        let address = parts.next().unwrap_or_default();
        let prefix = parts.next().ok_or(CidrParseError::MissingPrefix)?;

        let address = address.parse::<std::net::Ipv4Addr>()
            .map_err(|_| CidrParseError::BadAddress)?;
        match prefix.parse::<u8>() {
            Ok(prefix_len) if prefix_len <= 32 => Ok(Cidr::new(address.into(), prefix_len)),
            _ => Err(CidrParseError::BadPrefix),
        }
    }
}

byte_wrapper! {
    /// An IPv4 datagram, header first.
    #[derive(Debug, PartialEq, Eq)]
    pub struct ipv4([u8]);
}

mod field {
    use crate::wire::field::Field;

    pub(crate) const VERSION_IHL: usize = 0;
    pub(crate) const TOS:         usize = 1;
    pub(crate) const TOTAL_LEN:   Field = 2..4;
    pub(crate) const IDENT:       Field = 4..6;
    pub(crate) const FRAGMENT:    Field = 6..8;
    pub(crate) const TTL:         usize = 8;
    pub(crate) const PROTOCOL:    usize = 9;
    pub(crate) const CHECKSUM:    Field = 10..12;
    pub(crate) const SOURCE:      Field = 12..16;
    pub(crate) const DESTINATION: Field = 16..20;
    pub(crate) const OPTIONS:     Field = 20..24;

    /// Bits of the fragment word.
    pub(crate) const DONT_FRAG:  u16 = 0x4000;
    pub(crate) const MORE_FRAGS: u16 = 0x2000;
    pub(crate) const OFFSET:     u16 = 0x1fff;
}

const FIXED_HEADER_LEN: usize = field::DESTINATION.end;

impl ipv4 {
    /// Treat `buffer` as a datagram without looking at it.
    pub fn new_unchecked(buffer: &[u8]) -> &ipv4 {
        Self::__from_macro_new_unchecked(buffer)
    }

    /// Mutable variant of [`new_unchecked`](#method.new_unchecked).
    pub fn new_unchecked_mut(buffer: &mut [u8]) -> &mut ipv4 {
        Self::__from_macro_new_unchecked_mut(buffer)
    }

    /// Wrap `buffer` after [`check_len`](#method.check_len) succeeded on it.
    pub fn new_checked(buffer: &[u8]) -> Result<&ipv4> {
        let packet = Self::new_unchecked(buffer);
        packet.check_len()?;
        Ok(packet)
    }

    /// The whole buffer, including any octets behind the total length.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Validate the length fields against the buffer.
    ///
    /// Afterwards all accessors are in bounds. A buffer shorter than any of the fixed header,
    /// the header length or the total length is `Truncated`. Length fields that contradict each
    /// other are `Malformed`. Changing either length field voids the check.
    pub fn check_len(&self) -> Result<()> {
        let available = self.0.len();
        if available < FIXED_HEADER_LEN {
            return Err(Error::Truncated);
        }

        let header_len = usize::from(self.header_len());
        let total_len = usize::from(self.total_len());
        if header_len < FIXED_HEADER_LEN || total_len < header_len {
            Err(Error::Malformed)
        } else if available < total_len {
            Err(Error::Truncated)
        } else {
            Ok(())
        }
    }

    fn word(&self, at: Field) -> u16 {
        NetworkEndian::read_u16(&self.0[at])
    }

    fn set_word(&mut self, at: Field, value: u16) {
        NetworkEndian::write_u16(&mut self.0[at], value)
    }

    fn fragment_bit(&self, bit: u16) -> bool {
        self.word(field::FRAGMENT) & bit != 0
    }

    fn set_fragment_bit(&mut self, bit: u16, value: bool) {
        let word = self.word(field::FRAGMENT) & !bit;
        self.set_word(field::FRAGMENT, if value { word | bit } else { word });
    }

    /// The ip version, 4 for valid packets.
    pub fn version(&self) -> u8 {
        self.0[field::VERSION_IHL] >> 4
    }

    /// Header length in octets, options included.
    pub fn header_len(&self) -> u8 {
        (self.0[field::VERSION_IHL] & 0xf) << 2
    }

    /// Length of header and payload together.
    pub fn total_len(&self) -> u16 {
        self.word(field::TOTAL_LEN)
    }

    /// Fragment identification.
    pub fn ident(&self) -> u16 {
        self.word(field::IDENT)
    }

    /// Whether the sender forbids fragmentation.
    pub fn dont_frag(&self) -> bool {
        self.fragment_bit(field::DONT_FRAG)
    }

    /// Whether further fragments follow this one.
    pub fn more_frags(&self) -> bool {
        self.fragment_bit(field::MORE_FRAGS)
    }

    /// Position of the fragment in the original payload, in octets.
    pub fn frag_offset(&self) -> u16 {
        (self.word(field::FRAGMENT) & field::OFFSET) * 8
    }

    /// Time to live.
    pub fn hop_limit(&self) -> u8 {
        self.0[field::TTL]
    }

    /// Protocol of the payload.
    pub fn protocol(&self) -> Protocol {
        self.0[field::PROTOCOL].into()
    }

    /// The header checksum as transmitted.
    pub fn checksum(&self) -> u16 {
        self.word(field::CHECKSUM)
    }

    /// Sender.
    pub fn src_addr(&self) -> Address {
        Address::from_bytes(&self.0[field::SOURCE])
    }

    /// Receiver.
    pub fn dst_addr(&self) -> Address {
        Address::from_bytes(&self.0[field::DESTINATION])
    }

    /// Option octets behind the fixed header.
    pub fn options(&self) -> &[u8] {
        &self.0[FIXED_HEADER_LEN..usize::from(self.header_len())]
    }

    /// Whether the header, options included, sums up correctly.
    pub fn verify_checksum(&self) -> bool {
        checksum::verify(&self.0[..usize::from(self.header_len())])
    }

    /// Overwrite the version nibble.
    pub fn set_version(&mut self, version: u8) {
        let byte = &mut self.0[field::VERSION_IHL];
        *byte = (version << 4) | (*byte & 0xf);
    }

    /// Set the header length in octets. It is stored in words, the remainder is lost.
    pub fn set_header_len(&mut self, len: u8) {
        let byte = &mut self.0[field::VERSION_IHL];
        *byte = (*byte & 0xf0) | ((len >> 2) & 0xf);
    }

    /// Overwrite the total length.
    pub fn set_total_len(&mut self, len: u16) {
        self.set_word(field::TOTAL_LEN, len)
    }

    /// Overwrite the identification.
    pub fn set_ident(&mut self, ident: u16) {
        self.set_word(field::IDENT, ident)
    }

    /// Set or clear "don't fragment".
    pub fn set_dont_frag(&mut self, value: bool) {
        self.set_fragment_bit(field::DONT_FRAG, value)
    }

    /// Set or clear "more fragments".
    pub fn set_more_frags(&mut self, value: bool) {
        self.set_fragment_bit(field::MORE_FRAGS, value)
    }

    /// Set the fragment offset in octets, rounded down to a multiple of eight.
    pub fn set_frag_offset(&mut self, offset: u16) {
        let flags = self.word(field::FRAGMENT) & !field::OFFSET;
        self.set_word(field::FRAGMENT, flags | (offset / 8));
    }

    /// Overwrite the time to live.
    pub fn set_hop_limit(&mut self, ttl: u8) {
        self.0[field::TTL] = ttl
    }

    /// Overwrite the payload protocol.
    pub fn set_protocol(&mut self, protocol: Protocol) {
        self.0[field::PROTOCOL] = protocol.into()
    }

    /// Overwrite the checksum, see also [`fill_checksum`](#method.fill_checksum).
    pub fn set_checksum(&mut self, checksum: u16) {
        self.set_word(field::CHECKSUM, checksum)
    }

    /// Overwrite the sender.
    pub fn set_src_addr(&mut self, address: Address) {
        self.0[field::SOURCE].copy_from_slice(address.as_bytes())
    }

    /// Overwrite the receiver.
    pub fn set_dst_addr(&mut self, address: Address) {
        self.0[field::DESTINATION].copy_from_slice(address.as_bytes())
    }

    /// Recompute the header checksum from the current header.
    pub fn fill_checksum(&mut self) {
        self.set_checksum(0);
        let sum = checksum::compute(&self.0[..usize::from(self.header_len())]);
        self.set_checksum(sum)
    }

    /// Where the payload lies in the buffer.
    ///
    /// It ends at the total length so that link padding is cut off.
    pub fn payload_range(&self) -> Field {
        usize::from(self.header_len())..usize::from(self.total_len())
    }

    /// The payload, without link padding.
    pub fn payload_slice(&self) -> &[u8] {
        &self.0[self.payload_range()]
    }

    /// Mutable access to the payload.
    pub fn payload_mut_slice(&mut self) -> &mut [u8] {
        let payload = self.payload_range();
        &mut self.0[payload]
    }
}

/// The header fields this stack reads and writes.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Repr {
    /// Sending host.
    pub src_addr:     Address,
    /// Unicast, broadcast or group destination.
    pub dst_addr:     Address,
    /// Protocol of the payload.
    pub protocol:     Protocol,
    /// Octets after the header, up to the total length.
    pub payload_len:  usize,
    /// The time to live field.
    pub hop_limit:    u8,
    /// The only option ever sent, see [`ROUTER_ALERT`](constant.ROUTER_ALERT.html).
    pub router_alert: bool,
}

impl Repr {
    /// Validate a received header.
    ///
    /// Fragments and headers with more than a single option word are `Unsupported`. The type of
    /// service octet is ignored.
    pub fn parse(packet: &ipv4, checksum: Checksum) -> Result<Repr> {
        packet.check_len()?;
        if packet.version() != 4 {
            return Err(Error::Malformed);
        }
        if usize::from(packet.header_len()) > MAX_HEADER_LEN {
            return Err(Error::Unsupported);
        }
        if checksum.manual() && !packet.verify_checksum() {
            return Err(Error::WrongChecksum);
        }
        if packet.more_frags() || packet.frag_offset() > 0 {
            return Err(Error::Unsupported);
        }

        Ok(Repr {
            src_addr: packet.src_addr(),
            dst_addr: packet.dst_addr(),
            protocol: packet.protocol(),
            payload_len: packet.payload_range().len(),
            hop_limit: packet.hop_limit(),
            router_alert: packet.options() == ROUTER_ALERT,
        })
    }

    /// Octets taken by the header.
    pub fn buffer_len(&self) -> usize {
        match self.router_alert {
            true => MAX_HEADER_LEN,
            false => FIXED_HEADER_LEN,
        }
    }

    /// Header and payload.
    pub fn total_len(&self) -> usize {
        self.buffer_len() + self.payload_len
    }

    /// Write the header to the front of `packet`.
    ///
    /// Nothing is ever fragmented: identification is zero and only "don't fragment" is set.
    pub fn emit(&self, packet: &mut ipv4, checksum: Checksum) {
        let header_len = self.buffer_len();
        packet.set_version(4);
        packet.set_header_len(header_len as u8);
        packet.0[field::TOS] = 0;
        packet.set_total_len(self.total_len() as u16);
        packet.set_ident(0);
        packet.set_word(field::FRAGMENT, field::DONT_FRAG);
        packet.set_hop_limit(self.hop_limit);
        packet.set_protocol(self.protocol);
        packet.set_src_addr(self.src_addr);
        packet.set_dst_addr(self.dst_addr);
        if self.router_alert {
            packet.0[FIXED_HEADER_LEN..header_len].copy_from_slice(&ROUTER_ALERT);
        }

        match checksum {
            Checksum::Manual => packet.fill_checksum(),
            _ => packet.set_checksum(0),
        }
    }
}

impl fmt::Display for Repr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ipv4 {} -> {} {} ({} octets, ttl {})",
            self.src_addr, self.dst_addr, self.protocol, self.payload_len, self.hop_limit)
    }
}
