use core::fmt;
use byteorder::{ByteOrder, NetworkEndian};

use super::{Checksum, Error, Result};
use super::checksum;
use super::field::Field;
use super::ipv4::{self, Address as Ipv4Address, Protocol};

enum_with_unknown! {
    /// The type octet of a control message, RFC 792.
    pub enum Message(u8) {
        /// Answer to an echo request.
        EchoReply      =  0,
        /// A datagram could not be delivered.
        DstUnreachable =  3,
        /// A better first hop exists.
        Redirect       =  5,
        /// Ping.
        EchoRequest    =  8,
        /// RFC 1256, ignored.
        RouterAdvert   =  9,
        /// RFC 1256, ignored.
        RouterSolicit  = 10,
        /// The time to live of a datagram ran out.
        TimeExceeded   = 11,
        /// A header could not be processed.
        ParamProblem   = 12,
        /// Ignored.
        Timestamp      = 13,
        /// Ignored.
        TimestampReply = 14,
    }
}

impl Message {
    /// Whether the message reports an error about a datagram it quotes.
    pub fn is_error(self) -> bool {
        match self {
            Message::DstUnreachable
            | Message::Redirect
            | Message::TimeExceeded
            | Message::ParamProblem => true,
            _ => false,
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Message::EchoReply => "echo reply",
            Message::DstUnreachable => "unreachable",
            Message::Redirect => "redirect",
            Message::EchoRequest => "echo request",
            Message::RouterAdvert => "router advertisement",
            Message::RouterSolicit => "router solicitation",
            Message::TimeExceeded => "time exceeded",
            Message::ParamProblem => "parameter problem",
            Message::Timestamp => "timestamp request",
            Message::TimestampReply => "timestamp reply",
            Message::Unknown(other) => return write!(f, "icmp type {}", other),
        };
        f.write_str(name)
    }
}

enum_with_unknown! {
    /// Codes of [`Message::DstUnreachable`](enum.Message.html).
    pub enum DstUnreachable(u8) {
        /// No route to the network, also sent locally while unconfigured.
        NetUnreachable   =  0,
        /// Address resolution for the host failed.
        HostUnreachable  =  1,
        /// The protocol has no handler at the destination.
        ProtoUnreachable =  2,
        /// Nobody listens on the port.
        PortUnreachable  =  3,
        /// Too large and fragmentation was forbidden.
        FragRequired     =  4,
        /// A source route could not be followed.
        SrcRouteFailed   =  5,
        /// RFC 1122.
        DstNetUnknown    =  6,
        /// RFC 1122.
        DstHostUnknown   =  7,
        /// RFC 1122.
        SrcHostIsolated  =  8,
        /// RFC 1122.
        NetProhibited    =  9,
        /// RFC 1122.
        HostProhibited   = 10,
        /// RFC 1122.
        NetUnreachToS    = 11,
        /// RFC 1122.
        HostUnreachToS   = 12,
        /// RFC 1812, filtered by a router.
        CommProhibited   = 13,
    }
}

enum_with_unknown! {
    /// Codes of [`Message::Redirect`](enum.Message.html).
    pub enum Redirect(u8) {
        /// For every host on the destination network.
        Net     = 0,
        /// For the destination host only.
        Host    = 1,
        /// Network, for one type of service.
        NetToS  = 2,
        /// Host, for one type of service.
        HostToS = 3,
    }
}

enum_with_unknown! {
    /// Codes of [`Message::TimeExceeded`](enum.Message.html).
    pub enum TimeExceeded(u8) {
        /// The time to live reached zero at a router.
        TtlExpired  = 0,
        /// Reassembly at the destination gave up.
        FragExpired = 1,
    }
}

byte_wrapper! {
    /// A control message, header and data.
    #[derive(Debug, PartialEq, Eq)]
    pub struct icmpv4([u8]);
}

mod field {
    use crate::wire::field::Field;

    pub(crate) const TYPE:     usize = 0;
    pub(crate) const CODE:     usize = 1;
    pub(crate) const CHECKSUM: Field = 2..4;

    /// The second header word. Its meaning depends on the type.
    pub(crate) const REST:     Field = 4..8;
    pub(crate) const IDENT:    Field = 4..6;
    pub(crate) const SEQ_NO:   Field = 6..8;
    pub(crate) const POINTER:  usize = 4;

    pub(crate) const DATA:     usize = 8;
}

impl icmpv4 {
    /// Treat `buffer` as a message without looking at it.
    pub fn new_unchecked(buffer: &[u8]) -> &icmpv4 {
        Self::__from_macro_new_unchecked(buffer)
    }

    /// Mutable variant of [`new_unchecked`](#method.new_unchecked).
    pub fn new_unchecked_mut(buffer: &mut [u8]) -> &mut icmpv4 {
        Self::__from_macro_new_unchecked_mut(buffer)
    }

    /// Wrap `buffer` if it holds the complete eight octet header.
    pub fn new_checked(buffer: &[u8]) -> Result<&icmpv4> {
        let message = Self::new_unchecked(buffer);
        message.check_len()?;
        Ok(message)
    }

    /// Header and data.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// `Truncated` when the header does not fit. Accessors would panic then.
    pub fn check_len(&self) -> Result<()> {
        match self.0.len() {
            len if len < field::DATA => Err(Error::Truncated),
            _ => Ok(()),
        }
    }

    fn word(&self, at: Field) -> u16 {
        NetworkEndian::read_u16(&self.0[at])
    }

    fn set_word(&mut self, at: Field, value: u16) {
        NetworkEndian::write_u16(&mut self.0[at], value)
    }

    /// The type octet.
    pub fn msg_type(&self) -> Message {
        self.0[field::TYPE].into()
    }

    /// The code octet, interpreted per type.
    pub fn msg_code(&self) -> u8 {
        self.0[field::CODE]
    }

    /// The checksum as transmitted.
    pub fn checksum(&self) -> u16 {
        self.word(field::CHECKSUM)
    }

    /// Echo identifier.
    pub fn echo_ident(&self) -> u16 {
        self.word(field::IDENT)
    }

    /// Echo sequence number.
    pub fn echo_seq_no(&self) -> u16 {
        self.word(field::SEQ_NO)
    }

    /// The router a redirect points to.
    pub fn gateway(&self) -> Ipv4Address {
        Ipv4Address::from_bytes(&self.0[field::REST])
    }

    /// Offset of the octet a parameter problem is about.
    pub fn pointer(&self) -> u8 {
        self.0[field::POINTER]
    }

    /// Whether the message, data included, sums up correctly.
    pub fn verify_checksum(&self) -> bool {
        checksum::verify(&self.0)
    }

    /// Overwrite the type.
    pub fn set_msg_type(&mut self, message: Message) {
        self.0[field::TYPE] = message.into();
    }

    /// Overwrite the code.
    pub fn set_msg_code(&mut self, code: u8) {
        self.0[field::CODE] = code;
    }

    /// Overwrite the checksum, see also [`fill_checksum`](#method.fill_checksum).
    pub fn set_checksum(&mut self, checksum: u16) {
        self.set_word(field::CHECKSUM, checksum)
    }

    /// Overwrite the echo identifier.
    pub fn set_echo_ident(&mut self, ident: u16) {
        self.set_word(field::IDENT, ident)
    }

    /// Overwrite the echo sequence number.
    pub fn set_echo_seq_no(&mut self, seq_no: u16) {
        self.set_word(field::SEQ_NO, seq_no)
    }

    /// Overwrite the redirect target.
    pub fn set_gateway(&mut self, gateway: Ipv4Address) {
        self.0[field::REST].copy_from_slice(gateway.as_bytes());
    }

    /// Zero the second header word.
    pub fn clear_rest_of_header(&mut self) {
        self.0[field::REST].iter_mut().for_each(|octet| *octet = 0);
    }

    /// Overwrite the parameter problem offset.
    pub fn set_pointer(&mut self, pointer: u8) {
        self.0[field::POINTER] = pointer;
    }

    /// Recompute the checksum over header and data.
    pub fn fill_checksum(&mut self) {
        self.set_checksum(0);
        let sum = checksum::compute(&self.0);
        self.set_checksum(sum);
    }

    /// Everything behind the header. Echo data, or the quote of an error.
    pub fn payload_slice(&self) -> &[u8] {
        &self.0[field::DATA..]
    }

    /// Mutable access to everything behind the header.
    pub fn payload_mut_slice(&mut self) -> &mut [u8] {
        &mut self.0[field::DATA..]
    }
}

/// The datagram quoted by an ICMP error message.
///
/// Error messages carry the IP header of the offending datagram and at least eight octets of its
/// payload. The total length of the quoted header refers to the original datagram and not to the
/// quote, so only the fixed part is validated here.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Embedded {
    /// Source of the offending datagram.
    pub src_addr: Ipv4Address,
    /// Destination of the offending datagram.
    pub dst_addr: Ipv4Address,
    /// Protocol of the offending datagram.
    pub protocol: Protocol,
    /// Source port, zero unless the datagram was TCP or UDP.
    pub src_port: u16,
    /// Destination port, zero unless the datagram was TCP or UDP.
    pub dst_port: u16,
}

impl Embedded {
    /// Parse the quote in the payload of an error message.
    pub fn parse(data: &[u8]) -> Result<Embedded> {
        if data.len() < 20 {
            return Err(Error::Truncated);
        }

        let packet = ipv4::ipv4::new_unchecked(data);
        if packet.version() != 4 {
            return Err(Error::Malformed);
        }

        let header_len = usize::from(packet.header_len());
        if header_len < 20 {
            return Err(Error::Malformed);
        }
        if header_len > data.len() {
            return Err(Error::Truncated);
        }

        let protocol = packet.protocol();
        let ports = &data[header_len..];
        let (src_port, dst_port) = match protocol {
            Protocol::Tcp | Protocol::Udp if ports.len() >= 4 => (
                NetworkEndian::read_u16(&ports[0..2]),
                NetworkEndian::read_u16(&ports[2..4]),
            ),
            _ => (0, 0),
        };

        Ok(Embedded {
            src_addr: packet.src_addr(),
            dst_addr: packet.dst_addr(),
            protocol,
            src_port,
            dst_port,
        })
    }
}

/// A high-level representation of an ICMPv4 message header.
///
/// The payload is not part of the representation. Echo messages carry arbitrary data and error
/// messages quote a datagram, see [`Embedded`].
///
/// [`Embedded`]: struct.Embedded.html
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Repr {
    /// An echo request.
    EchoRequest {
        /// The identifier chosen by the sender.
        ident:  u16,
        /// The sequence number chosen by the sender.
        seq_no: u16,
    },
    /// An echo reply.
    EchoReply {
        /// The identifier of the answered request.
        ident:  u16,
        /// The sequence number of the answered request.
        seq_no: u16,
    },
    /// A destination was not reachable.
    DstUnreachable {
        /// The reason.
        code: DstUnreachable,
    },
    /// A datagram was discarded in transit.
    TimeExceeded {
        /// The reason.
        code: TimeExceeded,
    },
    /// A header field of a datagram could not be processed.
    ParamProblem {
        /// Zero when `pointer` is valid, 1 for a missing option, 2 for a bad length.
        code: u8,
        /// Offset of the offending octet.
        pointer: u8,
    },
    /// A router suggests a better first hop.
    Redirect {
        /// The scope of the redirect.
        code: Redirect,
        /// The suggested first hop.
        gateway: Ipv4Address,
    },
}

impl Repr {
    /// Get the echo reply if this is an echo request.
    pub fn echo_reply(self) -> Option<Repr> {
        match self {
            Repr::EchoRequest { ident, seq_no } =>
                Some(Repr::EchoReply { ident, seq_no }),
            _ => None,
        }
    }

    /// Parse an ICMPv4 message and return a high-level representation.
    pub fn parse(packet: &icmpv4, checksum: Checksum) -> Result<Repr> {
        packet.check_len()?;
        if checksum.manual() && !packet.verify_checksum() {
            return Err(Error::WrongChecksum);
        }

        let code = packet.msg_code();
        match packet.msg_type() {
            Message::EchoRequest | Message::EchoReply if code != 0 => Err(Error::Malformed),
            Message::EchoRequest => Ok(Repr::EchoRequest {
                ident: packet.echo_ident(),
                seq_no: packet.echo_seq_no(),
            }),
            Message::EchoReply => Ok(Repr::EchoReply {
                ident: packet.echo_ident(),
                seq_no: packet.echo_seq_no(),
            }),
            Message::DstUnreachable => Ok(Repr::DstUnreachable { code: code.into() }),
            Message::TimeExceeded => Ok(Repr::TimeExceeded { code: code.into() }),
            Message::ParamProblem => Ok(Repr::ParamProblem { code, pointer: packet.pointer() }),
            Message::Redirect => Ok(Repr::Redirect {
                code: code.into(),
                gateway: packet.gateway(),
            }),
            Message::Unknown(_) => Err(Error::Unrecognized),
            _ => Err(Error::Unsupported),
        }
    }

    /// The message type of this representation.
    pub fn message(&self) -> Message {
        match self {
            Repr::EchoRequest { .. } => Message::EchoRequest,
            Repr::EchoReply { .. } => Message::EchoReply,
            Repr::DstUnreachable { .. } => Message::DstUnreachable,
            Repr::TimeExceeded { .. } => Message::TimeExceeded,
            Repr::ParamProblem { .. } => Message::ParamProblem,
            Repr::Redirect { .. } => Message::Redirect,
        }
    }

    /// The raw message code of this representation.
    pub fn code(&self) -> u8 {
        match *self {
            Repr::EchoRequest { .. } | Repr::EchoReply { .. } => 0,
            Repr::DstUnreachable { code } => code.into(),
            Repr::TimeExceeded { code } => code.into(),
            Repr::ParamProblem { code, .. } => code,
            Repr::Redirect { code, .. } => code.into(),
        }
    }

    /// Return the length of the header emitted from this representation.
    pub fn buffer_len(&self) -> usize {
        field::DATA
    }

    /// Emit a high-level representation into an ICMPv4 message.
    ///
    /// The payload must have been written before when the checksum is computed here.
    pub fn emit(&self, packet: &mut icmpv4, checksum: Checksum) {
        packet.set_msg_type(self.message());
        packet.set_msg_code(self.code());
        packet.clear_rest_of_header();
        match *self {
            Repr::EchoRequest { ident, seq_no } | Repr::EchoReply { ident, seq_no } => {
                packet.set_echo_ident(ident);
                packet.set_echo_seq_no(seq_no);
            },
            Repr::ParamProblem { pointer, .. } => packet.set_pointer(pointer),
            Repr::Redirect { gateway, .. } => packet.set_gateway(gateway),
            Repr::DstUnreachable { .. } | Repr::TimeExceeded { .. } => (),
        }

        match checksum {
            Checksum::Manual => packet.fill_checksum(),
            _ => packet.set_checksum(0),
        }
    }
}

impl fmt::Display for Repr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "icmp {}", self.message())?;
        match *self {
            Repr::EchoRequest { ident, seq_no } | Repr::EchoReply { ident, seq_no } =>
                write!(f, " {}#{}", ident, seq_no),
            Repr::DstUnreachable { code } => write!(f, " ({:?})", code),
            Repr::TimeExceeded { code } => write!(f, " ({:?})", code),
            Repr::ParamProblem { code, pointer } => write!(f, " ({}) at octet {}", code, pointer),
            Repr::Redirect { gateway, .. } => write!(f, " to {}", gateway),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::wire::ipv4::Repr as Ipv4Repr;

    /// Ping 2989#42 carrying `netcore!`.
    static PING: [u8; 16] = [
        0x08, 0x00, 0x34, 0xcc, 0x0b, 0xad, 0x00, 0x2a,
        b'n', b'e', b't', b'c', b'o', b'r', b'e', b'!',
    ];

    const PING_DATA: &[u8] = b"netcore!";

    #[test]
    fn echo_fields() {
        let packet = icmpv4::new_checked(&PING[..]).unwrap();
        assert_eq!(packet.msg_type(), Message::EchoRequest);
        assert_eq!(packet.msg_code(), 0);
        assert_eq!(packet.checksum(), 0x34cc);
        assert!(packet.verify_checksum());
        assert_eq!(packet.echo_ident(), 2989);
        assert_eq!(packet.echo_seq_no(), 42);
        assert_eq!(packet.payload_slice(), PING_DATA);
        assert!(!packet.msg_type().is_error());
    }

    #[test]
    fn echo_emit() {
        let repr = Repr::EchoRequest { ident: 2989, seq_no: 42 };
        let mut bytes = [0xee; 16];
        let packet = icmpv4::new_unchecked_mut(&mut bytes);
        packet.payload_mut_slice().copy_from_slice(PING_DATA);
        repr.emit(packet, Checksum::Manual);
        assert_eq!(packet.as_bytes(), &PING[..]);
    }

    #[test]
    fn echo_reply_in_place() {
        let mut bytes = PING;
        let packet = icmpv4::new_unchecked_mut(&mut bytes);
        let reply = Repr::parse(packet, Checksum::Manual).unwrap()
            .echo_reply().unwrap();
        reply.emit(packet, Checksum::Manual);
        assert_eq!(Repr::parse(packet, Checksum::Manual),
                   Ok(Repr::EchoReply { ident: 2989, seq_no: 42 }));
        assert_eq!(packet.payload_slice(), PING_DATA);
        assert_eq!(reply.echo_reply(), None);
    }

    #[test]
    fn echo_with_code() {
        let mut bytes = PING;
        let packet = icmpv4::new_unchecked_mut(&mut bytes);
        packet.set_msg_code(1);
        packet.fill_checksum();
        assert_eq!(Repr::parse(packet, Checksum::Manual), Err(Error::Malformed));
    }

    #[test]
    fn bad_checksum() {
        let mut bytes = PING;
        bytes[12] = b'C';
        let packet = icmpv4::new_unchecked(&bytes[..]);
        assert_eq!(Repr::parse(packet, Checksum::Manual), Err(Error::WrongChecksum));
    }

    #[test]
    fn unknown_type() {
        let mut bytes = [0u8; 8];
        let packet = icmpv4::new_unchecked_mut(&mut bytes);
        packet.set_msg_type(Message::Unknown(200));
        packet.fill_checksum();
        assert_eq!(Repr::parse(packet, Checksum::Manual), Err(Error::Unrecognized));
    }

    fn quoted_udp() -> Vec<u8> {
        let ip = Ipv4Repr {
            src_addr: Ipv4Address::new(10, 0, 0, 5),
            dst_addr: Ipv4Address::new(192, 168, 7, 1),
            protocol: Protocol::Udp,
            payload_len: 100,
            hop_limit: 3,
            router_alert: false,
        };
        // Only the header and eight octets are quoted.
        let mut bytes = vec![0; ip.buffer_len() + 8];
        ip.emit(ipv4::ipv4::new_unchecked_mut(&mut bytes), Checksum::Manual);
        bytes[20..24].copy_from_slice(&[0x30, 0x39, 0x00, 0x35]);
        bytes
    }

    #[test]
    fn embedded_ports() {
        let quote = quoted_udp();
        let embedded = Embedded::parse(&quote).unwrap();
        assert_eq!(embedded, Embedded {
            src_addr: Ipv4Address::new(10, 0, 0, 5),
            dst_addr: Ipv4Address::new(192, 168, 7, 1),
            protocol: Protocol::Udp,
            src_port: 12345,
            dst_port: 53,
        });
    }

    #[test]
    fn embedded_without_ports() {
        let mut quote = quoted_udp();
        quote.truncate(22);
        let embedded = Embedded::parse(&quote).unwrap();
        assert_eq!((embedded.src_port, embedded.dst_port), (0, 0));

        assert_eq!(Embedded::parse(&quote[..19]), Err(Error::Truncated));
    }

    #[test]
    fn redirect() {
        let quote = quoted_udp();
        let repr = Repr::Redirect {
            code: Redirect::Host,
            gateway: Ipv4Address::new(10, 0, 0, 254),
        };
        let mut bytes = vec![0; repr.buffer_len() + quote.len()];
        let packet = icmpv4::new_unchecked_mut(&mut bytes);
        packet.payload_mut_slice().copy_from_slice(&quote);
        repr.emit(packet, Checksum::Manual);

        let packet = icmpv4::new_checked(&bytes).unwrap();
        assert_eq!(Repr::parse(packet, Checksum::Manual), Ok(repr));
        assert!(packet.msg_type().is_error());
        assert_eq!(Embedded::parse(packet.payload_slice()).unwrap().dst_addr,
                   Ipv4Address::new(192, 168, 7, 1));
    }

    #[test]
    fn param_problem_code() {
        let quote = quoted_udp();
        let repr = Repr::ParamProblem { code: 2, pointer: 0 };
        let mut bytes = vec![0; repr.buffer_len() + quote.len()];
        let packet = icmpv4::new_unchecked_mut(&mut bytes);
        packet.payload_mut_slice().copy_from_slice(&quote);
        repr.emit(packet, Checksum::Manual);

        let packet = icmpv4::new_checked(&bytes).unwrap();
        assert_eq!(packet.msg_code(), 2);
        let parsed = Repr::parse(packet, Checksum::Manual).unwrap();
        assert_eq!(parsed, repr);
        assert_eq!(parsed.code(), 2);
    }
}
