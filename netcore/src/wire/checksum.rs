//! The ones-complement sum shared by ipv4, icmp and igmp.
use byteorder::{ByteOrder, NetworkEndian};

/// Fold the carries of a 32-bit accumulator back into 16 bits.
fn fold(mut sum: u32) -> u16 {
    while sum > 0xffff {
        sum = (sum & 0xffff) + (sum >> 16);
    }
    sum as u16
}

/// The ones-complement sum of `data` as big-endian words, RFC 1071.
///
/// An odd trailing octet is padded with zero. A region that carries a correct checksum sums to
/// `!0`.
pub(crate) fn data(data: &[u8]) -> u16 {
    let mut words = data.chunks_exact(2);
    let mut sum: u32 = words.by_ref()
        .map(|word| u32::from(NetworkEndian::read_u16(word)))
        .sum();
    if let [last] = words.remainder() {
        sum += u32::from(*last) << 8;
    }
    fold(sum)
}

/// The value to store in a zeroed checksum field covering `data`.
pub(crate) fn compute(data: &[u8]) -> u16 {
    !self::data(data)
}

/// Check a region that includes its own checksum field.
pub(crate) fn verify(data: &[u8]) -> bool {
    self::data(data) == !0
}
