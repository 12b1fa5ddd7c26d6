use core::fmt;
#[cfg(feature = "std")]
use core::str::FromStr;
use byteorder::{ByteOrder, NetworkEndian};

use crate::wire::{Error, Result};
use crate::wire::ipv4::Address as Ipv4Address;

enum_with_unknown! {
    /// The EtherType naming the payload of a frame.
    pub enum EtherType(u16) {
        /// An ipv4 datagram.
        Ipv4 = 0x0800,
        /// An arp packet.
        Arp  = 0x0806,
        /// An ipv6 datagram. Recognized but never handled.
        Ipv6 = 0x86DD,
    }
}

impl fmt::Display for EtherType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            EtherType::Ipv4 => "ipv4",
            EtherType::Arp => "arp",
            EtherType::Ipv6 => "ipv6",
            EtherType::Unknown(other) => return write!(f, "type {:#06x}", other),
        };
        f.write_str(name)
    }
}

/// Octets in front of the payload: two addresses and the type.
pub const HEADER_LEN: usize = field::PAYLOAD;

/// A 48-bit station or group address.
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default)]
pub struct Address(pub [u8; 6]);

impl Address {
    /// ff:ff:ff:ff:ff:ff
    pub const BROADCAST: Address = Address([0xff; 6]);

    /// Read an address out of a frame field.
    ///
    /// Panics unless `data` has exactly six octets.
    pub fn from_bytes(data: &[u8]) -> Address {
        let mut octets = [0; 6];
        octets.copy_from_slice(data);
        Address(octets)
    }

    /// The group address a host group is received on.
    ///
    /// The low 23 bits of the group are placed behind the `01:00:5e` prefix (RFC 1112, 6.4).
    pub fn from_ipv4_multicast(group: Ipv4Address) -> Address {
        let [_, b, c, d] = group.0;
        Address([0x01, 0x00, 0x5e, b & 0x7f, c, d])
    }

    /// The octets of the address.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0[..]
    }

    /// An individual station, the group bit is clear.
    pub fn is_unicast(&self) -> bool {
        !self.is_multicast()
    }

    /// All stations.
    pub fn is_broadcast(&self) -> bool {
        self.0 == Address::BROADCAST.0
    }

    /// A group of stations, including the broadcast.
    pub fn is_multicast(&self) -> bool {
        self.0[0] & 1 == 1
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}", a, b, c, d, e, g)
    }
}

/// Failure to read a colon separated address.
#[cfg(feature = "std")]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressParseError {
    /// Not exactly six parts.
    PartCount,
    /// A part is not a hexadecimal octet.
    BadOctet,
}

#[cfg(feature = "std")]
impl fmt::Display for AddressParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AddressParseError::PartCount => write!(f, "expected six octets separated by ':'"),
            AddressParseError::BadOctet => write!(f, "octet is not two hex digits"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for AddressParseError {}

#[cfg(feature = "std")]
impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(text: &str) -> core::result::Result<Address, AddressParseError> {
        let mut octets = [0; 6];
        let mut parts = text.split(':');
        for octet in octets.iter_mut() {
            let part = parts.next().ok_or(AddressParseError::PartCount)?;
            if part.is_empty() || part.len() > 2 {
                return Err(AddressParseError::BadOctet);
            }
            *octet = u8::from_str_radix(part, 16).map_err(|_| AddressParseError::BadOctet)?;
        }

        match parts.next() {
            None => Ok(Address(octets)),
            Some(_) => Err(AddressParseError::PartCount),
        }
    }
}

byte_wrapper! {
    /// An Ethernet II frame, without preamble and frame check sequence.
    #[derive(Debug, PartialEq, Eq)]
    pub struct ethernet([u8]);
}

mod field {
    use crate::wire::field::Field;

    pub(crate) const DESTINATION: Field =  0..6;
    pub(crate) const SOURCE:      Field =  6..12;
    pub(crate) const ETHERTYPE:   Field = 12..14;
    pub(crate) const PAYLOAD:     usize = 14;
}

impl ethernet {
    /// Treat `data` as a frame without looking at it.
    pub fn new_unchecked(data: &[u8]) -> &Self {
        Self::__from_macro_new_unchecked(data)
    }

    /// Mutable variant of [`new_unchecked`](#method.new_unchecked).
    pub fn new_unchecked_mut(data: &mut [u8]) -> &mut Self {
        Self::__from_macro_new_unchecked_mut(data)
    }

    /// Wrap `data` if it holds at least a complete header.
    pub fn new_checked(data: &[u8]) -> Result<&Self> {
        let frame = Self::new_unchecked(data);
        frame.check_len()?;
        Ok(frame)
    }

    /// The complete frame.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// `Truncated` if the header does not fit, which makes the accessors panic.
    pub fn check_len(&self) -> Result<()> {
        match self.0.len() {
            len if len < HEADER_LEN => Err(Error::Truncated),
            _ => Ok(()),
        }
    }

    /// Frame size needed for `payload_len` octets of payload.
    pub fn buffer_len(payload_len: usize) -> usize {
        HEADER_LEN + payload_len
    }

    /// Receiving station or group.
    pub fn dst_addr(&self) -> Address {
        Address::from_bytes(&self.0[field::DESTINATION])
    }

    /// Sending station.
    pub fn src_addr(&self) -> Address {
        Address::from_bytes(&self.0[field::SOURCE])
    }

    /// Type of the payload. VLAN tags are not looked through.
    pub fn ethertype(&self) -> EtherType {
        NetworkEndian::read_u16(&self.0[field::ETHERTYPE]).into()
    }

    /// Overwrite the receiver.
    pub fn set_dst_addr(&mut self, address: Address) {
        self.0[field::DESTINATION].copy_from_slice(&address.0)
    }

    /// Overwrite the sender.
    pub fn set_src_addr(&mut self, address: Address) {
        self.0[field::SOURCE].copy_from_slice(&address.0)
    }

    /// Overwrite the payload type.
    pub fn set_ethertype(&mut self, ethertype: EtherType) {
        NetworkEndian::write_u16(&mut self.0[field::ETHERTYPE], ethertype.into())
    }

    /// Everything after the header, link padding included.
    pub fn payload_slice(&self) -> &[u8] {
        &self.0[HEADER_LEN..]
    }

    /// Mutable access to everything after the header.
    pub fn payload_mut_slice(&mut self) -> &mut [u8] {
        &mut self.0[HEADER_LEN..]
    }
}

/// The header of a frame.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Repr {
    /// The sending station.
    pub src_addr:  Address,
    /// The receiving station or group.
    pub dst_addr:  Address,
    /// The protocol of the payload.
    pub ethertype: EtherType,
}

impl Repr {
    /// Read the header of a frame.
    pub fn parse(frame: &ethernet) -> Result<Repr> {
        frame.check_len()?;
        Ok(Repr {
            src_addr: frame.src_addr(),
            dst_addr: frame.dst_addr(),
            ethertype: frame.ethertype(),
        })
    }

    /// Write the header to the front of `frame`.
    pub fn emit(&self, frame: &mut ethernet) {
        frame.set_dst_addr(self.dst_addr);
        frame.set_src_addr(self.src_addr);
        frame.set_ethertype(self.ethertype);
    }
}

impl fmt::Display for Repr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} -> {}", self.ethertype, self.src_addr, self.dst_addr)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// An arp payload from 02:00:00:00:00:05 to everyone, padded to the minimum frame size.
    static BROADCAST_ARP: [u8; 60] = {
        let mut frame = [0; 60];
        let mut i = 0;
        while i < 6 {
            frame[i] = 0xff;
            i += 1;
        }
        frame[6] = 0x02;
        frame[11] = 0x05;
        frame[12] = 0x08;
        frame[13] = 0x06;
        frame
    };

    #[test]
    fn header() {
        let frame = ethernet::new_checked(&BROADCAST_ARP[..]).unwrap();
        let repr = Repr::parse(frame).unwrap();
        assert_eq!(repr, Repr {
            src_addr: Address([0x02, 0, 0, 0, 0, 0x05]),
            dst_addr: Address::BROADCAST,
            ethertype: EtherType::Arp,
        });
        assert_eq!(frame.payload_slice().len(), 46);

        let mut bytes = [0; 60];
        repr.emit(ethernet::new_unchecked_mut(&mut bytes));
        assert_eq!(bytes[..], BROADCAST_ARP[..]);
    }

    #[test]
    fn runt() {
        assert_eq!(ethernet::new_checked(&BROADCAST_ARP[..13]), Err(Error::Truncated));
        assert!(ethernet::new_checked(&BROADCAST_ARP[..14]).unwrap().payload_slice().is_empty());
    }

    #[test]
    fn unknown_type() {
        let mut bytes = BROADCAST_ARP;
        bytes[12..14].copy_from_slice(&[0x88, 0xcc]);
        let frame = ethernet::new_checked(&bytes[..]).unwrap();
        assert_eq!(frame.ethertype(), EtherType::Unknown(0x88cc));
    }

    #[test]
    fn group_addresses() {
        let group = Ipv4Address::new(239, 255, 0, 250);
        let mapped = Address::from_ipv4_multicast(group);
        assert_eq!(mapped, Address([0x01, 0x00, 0x5e, 0x7f, 0x00, 0xfa]));
        assert!(mapped.is_multicast());
        assert!(!mapped.is_broadcast());

        // The high bit of the second octet is lost.
        assert_eq!(Address::from_ipv4_multicast(Ipv4Address::new(224, 128, 0, 250)),
            Address::from_ipv4_multicast(Ipv4Address::new(224, 0, 0, 250)));

        assert!(Address::BROADCAST.is_multicast());
        assert!(Address([0x02, 0, 0, 0, 0, 0x05]).is_unicast());
    }

    #[test]
    #[cfg(feature = "std")]
    fn address_text() {
        let address: Address = "02:00:5e:10:00:a1".parse().unwrap();
        assert_eq!(address, Address([0x02, 0x00, 0x5e, 0x10, 0x00, 0xa1]));
        assert_eq!(address.to_string(), "02:00:5e:10:00:a1");
        assert_eq!("02:00:5e".parse::<Address>(), Err(AddressParseError::PartCount));
        assert_eq!("02:00:5e:10:00:a1:ff".parse::<Address>(), Err(AddressParseError::PartCount));
        assert_eq!("02:00:5e:10:00:xx".parse::<Address>(), Err(AddressParseError::BadOctet));
    }
}
