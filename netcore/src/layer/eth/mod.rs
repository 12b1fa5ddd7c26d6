//! The Ethernet II layer.
//!
//! Received frames are filtered by their destination and sorted by EtherType: ipv4 packets are
//! queued for the ip layer, arp packets go to the [resolution engine] and a single further
//! EtherType may be passed through as raw frames. Frames to a multicast address are only accepted
//! for groups that were joined.
//!
//! Sending happens through a [`Link`], which finds the link destination of an ipv4 packet and
//! parks it in the resolution engine while that is still unknown.
//!
//! [resolution engine]: ../arp/index.html
//! [`Link`]: struct.Link.html
mod endpoint;
mod multicast;
#[cfg(test)]
mod tests;

pub use endpoint::{Endpoint, Link, RawFrame};

/// The largest ip packet carried in a frame.
pub const MTU: usize = 1500;

/// Size of the buffer frames are received into.
///
/// Leaves room for the link header and a little slack for devices that pass the frame check
/// sequence along.
pub const FRAME_BUFFER_LEN: usize = 1600;
