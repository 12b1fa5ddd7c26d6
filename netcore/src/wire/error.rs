use core::fmt;

/// The error type for parsing packets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An incoming packet could not be parsed because it was shorter than assumed.
    ///
    /// The packet may be shorter than the minimum length specified, or a length field claims
    /// more data than was received.
    Truncated,

    /// An incoming packet had an incorrect checksum and was dropped.
    WrongChecksum,

    /// An incoming packet could not be recognized and was dropped.
    ///
    /// E.g. an ARP packet for a hardware type other than Ethernet or an IGMP message of an
    /// unknown type.
    Unrecognized,

    /// An incoming packet was recognized but was self-contradictory.
    ///
    /// E.g. an IPv4 header whose header length exceeds its total length.
    Malformed,

    /// Parsing depends on a feature we do not implement.
    ///
    /// Fragmented datagrams and headers with options other than the router alert end up here.
    Unsupported,
}

/// The result type for packet parsing.
pub type Result<T> = core::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Truncated     => write!(f, "truncated packet"),
            Error::WrongChecksum => write!(f, "checksum error"),
            Error::Unrecognized  => write!(f, "unrecognized packet"),
            Error::Malformed     => write!(f, "malformed packet"),
            Error::Unsupported   => write!(f, "unsupported option"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
