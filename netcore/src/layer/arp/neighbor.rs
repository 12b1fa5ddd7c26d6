// Heads up! Before working on this file you should read, at least,
// the parts of RFC 1122 that discuss ARP.
use alloc::vec::Vec;

use crate::managed::Queue;
use crate::time::{Expiration, Instant};
use crate::wire::{EthernetAddress, Ipv4Address};

/// The resolution state of a neighbor entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// A request is on the wire and the answer is awaited.
    RequestSent,
    /// The answer did not arrive in time.
    RetryRequest,
    /// The answer arrived, parked frames still need to go out.
    SendQueuedFrames,
    /// The mapping is known.
    Valid,
}

impl State {
    /// If frames would be parked instead of sent.
    pub fn is_pending(self) -> bool {
        self != State::Valid
    }
}

/// A cached neighbor.
#[derive(Debug, Clone)]
pub(crate) struct Neighbor {
    pub(crate) protocol_addr: Ipv4Address,
    /// Meaningless until the answer arrived.
    pub(crate) hardware_addr: EthernetAddress,
    pub(crate) state: State,
    pub(crate) last_used: Instant,
    /// Number of repeated requests.
    pub(crate) attempts: u8,
    pub(crate) deadline: Expiration,
    /// Complete frames waiting for their link destination.
    pub(crate) frames: Queue<Vec<u8>>,
}

impl Neighbor {
    /// An entry that is looking for its hardware address.
    pub(crate) fn looking(
        protocol_addr: Ipv4Address,
        frame_capacity: usize,
        now: Instant,
        deadline: Instant,
    ) -> Self {
        Neighbor {
            protocol_addr,
            hardware_addr: EthernetAddress::default(),
            state: State::RequestSent,
            last_used: now,
            attempts: 0,
            deadline: Expiration::When(deadline),
            frames: Queue::new(frame_capacity),
        }
    }

    /// An entry learned from a request of the neighbor itself.
    pub(crate) fn learned(
        protocol_addr: Ipv4Address,
        hardware_addr: EthernetAddress,
        now: Instant,
    ) -> Self {
        Neighbor {
            protocol_addr,
            hardware_addr,
            state: State::Valid,
            last_used: now,
            attempts: 0,
            deadline: Expiration::Never,
            frames: Queue::new(0),
        }
    }

    /// Record the hardware address.
    ///
    /// Pending entries still have to send their parked frames.
    pub(crate) fn answered(&mut self, hardware_addr: EthernetAddress) {
        self.hardware_addr = hardware_addr;
        self.deadline = Expiration::Never;
        if self.state.is_pending() {
            self.state = State::SendQueuedFrames;
        }
    }
}
