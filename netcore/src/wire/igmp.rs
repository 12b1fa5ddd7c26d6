use core::fmt;
use byteorder::{ByteOrder, NetworkEndian};

use super::{Checksum, Error, Result};
use super::checksum;
use super::ipv4::Address as Ipv4Address;

enum_with_unknown! {
    /// Internet group management message type.
    pub enum Message(u8) {
        /// Membership query, general or for a specific group.
        MembershipQuery    = 0x11,
        /// Membership report of a version 1 host.
        MembershipReportV1 = 0x12,
        /// Membership report of a version 2 host.
        MembershipReportV2 = 0x16,
        /// Leave group.
        LeaveGroup         = 0x17,
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Message::MembershipQuery => write!(f, "membership query"),
            Message::MembershipReportV1 => write!(f, "version 1 membership report"),
            Message::MembershipReportV2 => write!(f, "version 2 membership report"),
            Message::LeaveGroup => write!(f, "leave group"),
            Message::Unknown(id) => write!(f, "0x{:02x}", id),
        }
    }
}

byte_wrapper! {
    /// An IGMP message in a byte buffer.
    #[derive(Debug, PartialEq, Eq)]
    pub struct igmp([u8]);
}

mod field {
    use crate::wire::field::Field;

    pub(crate) const TYPE:          usize = 0;
    pub(crate) const MAX_RESP_TIME: usize = 1;
    pub(crate) const CHECKSUM:      Field = 2..4;
    pub(crate) const GROUP_ADDRESS: Field = 4..8;
}

/// The length of every IGMP version 1 and 2 message.
pub const MESSAGE_LEN: usize = field::GROUP_ADDRESS.end;

impl igmp {
    /// View a buffer as IGMP without checking it.
    pub fn new_unchecked(buffer: &[u8]) -> &igmp {
        Self::__from_macro_new_unchecked(buffer)
    }

    /// Mutable variant of [`new_unchecked`](#method.new_unchecked).
    pub fn new_unchecked_mut(buffer: &mut [u8]) -> &mut igmp {
        Self::__from_macro_new_unchecked_mut(buffer)
    }

    /// View a buffer that passes [`check_len`](#method.check_len).
    pub fn new_checked(data: &[u8]) -> Result<&igmp> {
        let packet = Self::new_unchecked(data);
        packet.check_len()?;
        Ok(packet)
    }

    /// The underlying octets.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Check that every accessor stays in bounds.
    /// Returns `Err(Error::Truncated)` if the buffer is shorter than eight octets.
    pub fn check_len(&self) -> Result<()> {
        if self.0.len() < MESSAGE_LEN {
            Err(Error::Truncated)
        } else {
            Ok(())
        }
    }

    /// The message type.
    #[inline]
    pub fn msg_type(&self) -> Message {
        Message::from(self.0[field::TYPE])
    }

    /// Return the maximum response time, in tenths of a second.
    #[inline]
    pub fn max_resp_time(&self) -> u8 {
        self.0[field::MAX_RESP_TIME]
    }

    /// The checksum.
    #[inline]
    pub fn checksum(&self) -> u16 {
        NetworkEndian::read_u16(&self.0[field::CHECKSUM])
    }

    /// The group address.
    #[inline]
    pub fn group_addr(&self) -> Ipv4Address {
        Ipv4Address::from_bytes(&self.0[field::GROUP_ADDRESS])
    }

    /// Validate the checksum over the whole message.
    pub fn verify_checksum(&self) -> bool {
        checksum::verify(&self.0)
    }

    /// Overwrite the message type.
    #[inline]
    pub fn set_msg_type(&mut self, value: Message) {
        self.0[field::TYPE] = value.into()
    }

    /// Set the maximum response time, in tenths of a second.
    #[inline]
    pub fn set_max_resp_time(&mut self, value: u8) {
        self.0[field::MAX_RESP_TIME] = value
    }

    /// Overwrite the checksum.
    #[inline]
    pub fn set_checksum(&mut self, value: u16) {
        NetworkEndian::write_u16(&mut self.0[field::CHECKSUM], value)
    }

    /// Overwrite the group address.
    #[inline]
    pub fn set_group_addr(&mut self, value: Ipv4Address) {
        self.0[field::GROUP_ADDRESS].copy_from_slice(value.as_bytes())
    }

    /// Recompute the checksum over the message.
    pub fn fill_checksum(&mut self) {
        self.set_checksum(0);
        let checksum = checksum::compute(&self.0);
        self.set_checksum(checksum)
    }
}

/// The decoded fields of an IGMP message.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Repr {
    /// The message type.
    pub message: Message,
    /// The maximum response time in tenths of a second, zero when sent by a version 1 router.
    pub max_resp_time: u8,
    /// The group, unspecified for a general query.
    pub group_addr: Ipv4Address,
}

impl Repr {
    /// Decode an IGMP message.
    ///
    /// Octets after the eighth are ignored, as required of version 2 hosts.
    pub fn parse(packet: &igmp, checksum: Checksum) -> Result<Repr> {
        packet.check_len()?;
        if checksum.manual() && !packet.verify_checksum() { return Err(Error::WrongChecksum) }

        match packet.msg_type() {
            Message::Unknown(_) => Err(Error::Unrecognized),
            message => Ok(Repr {
                message,
                max_resp_time: packet.max_resp_time(),
                group_addr: packet.group_addr(),
            }),
        }
    }

    /// Octets needed to emit the message.
    pub fn buffer_len(&self) -> usize {
        MESSAGE_LEN
    }

    /// Write the fields into an IGMP message.
    pub fn emit(&self, packet: &mut igmp, checksum: Checksum) {
        packet.set_msg_type(self.message);
        packet.set_max_resp_time(self.max_resp_time);
        packet.set_group_addr(self.group_addr);
        if checksum.manual() {
            packet.fill_checksum()
        } else {
            packet.set_checksum(0)
        }
    }
}

impl fmt::Display for Repr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "IGMP {} group={} max_resp={}",
               self.message, self.group_addr, self.max_resp_time)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    static REPORT_BYTES: [u8; 8] =
        [0x16, 0x00, 0x09, 0x04,
         0xe0, 0x00, 0x00, 0xfb];

    #[test]
    fn deconstruct() {
        let packet = igmp::new_checked(&REPORT_BYTES[..]).unwrap();
        assert_eq!(packet.msg_type(), Message::MembershipReportV2);
        assert_eq!(packet.max_resp_time(), 0);
        assert_eq!(packet.group_addr(), Ipv4Address::new(224, 0, 0, 251));
        assert!(packet.verify_checksum());
    }

    #[test]
    fn emit() {
        let repr = Repr {
            message: Message::MembershipReportV2,
            max_resp_time: 0,
            group_addr: Ipv4Address::new(224, 0, 0, 251),
        };
        let mut bytes = [0xa5; MESSAGE_LEN];
        repr.emit(igmp::new_unchecked_mut(&mut bytes), Checksum::Manual);
        assert_eq!(bytes, REPORT_BYTES);
    }

    #[test]
    fn general_query() {
        let mut bytes = [0; MESSAGE_LEN];
        let packet = igmp::new_unchecked_mut(&mut bytes);
        packet.set_msg_type(Message::MembershipQuery);
        packet.set_max_resp_time(100);
        packet.fill_checksum();
        let repr = Repr::parse(packet, Checksum::Manual).unwrap();
        assert_eq!(repr.group_addr, Ipv4Address::UNSPECIFIED);
        assert_eq!(repr.max_resp_time, 100);
    }

    #[test]
    fn rejects() {
        assert_eq!(igmp::new_checked(&REPORT_BYTES[..7]), Err(Error::Truncated));

        let mut bytes = REPORT_BYTES;
        bytes[7] = 0xfc;
        assert_eq!(Repr::parse(igmp::new_unchecked(&bytes), Checksum::Manual),
                   Err(Error::WrongChecksum));

        let mut bytes = REPORT_BYTES;
        let packet = igmp::new_unchecked_mut(&mut bytes);
        packet.set_msg_type(Message::Unknown(0x22));
        packet.fill_checksum();
        assert_eq!(Repr::parse(packet, Checksum::Manual), Err(Error::Unrecognized));
    }
}
