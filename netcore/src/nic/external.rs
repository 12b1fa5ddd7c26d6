//! A stub nic whose frames come from and go to memory.
use alloc::collections::VecDeque;
use alloc::vec::Vec;

use crate::wire::EthernetAddress;

/// An in-memory device.
///
/// Frames pushed with [`push_rx`] are received in order, transmitted frames are recorded and can
/// be inspected with [`sent`] or drained with [`take_sent`].
///
/// [`push_rx`]: #method.push_rx
/// [`sent`]: #method.sent
/// [`take_sent`]: #method.take_sent
#[derive(Debug, Clone)]
pub struct External {
    hardware_addr: EthernetAddress,

    /// Frames waiting to be received.
    inbound: VecDeque<Vec<u8>>,

    /// All transmitted frames, oldest first.
    sent: Vec<Vec<u8>>,

    link_up: bool,

    /// If the emulated hardware accepts multicast filters.
    filter_support: bool,

    /// Refuse all transmissions.
    send_failure: bool,

    /// The last accepted multicast filter.
    filter: Vec<EthernetAddress>,
}

impl External {
    /// A new device with the link up and multicast filters supported.
    pub fn new(hardware_addr: EthernetAddress) -> Self {
        External {
            hardware_addr,
            inbound: VecDeque::new(),
            sent: Vec::new(),
            link_up: true,
            filter_support: true,
            send_failure: false,
            filter: Vec::new(),
        }
    }

    /// Queue a frame to be received.
    pub fn push_rx(&mut self, frame: &[u8]) {
        self.inbound.push_back(frame.to_vec());
    }

    /// Number of frames that have not yet been received.
    pub fn to_recv(&self) -> usize {
        self.inbound.len()
    }

    /// All frames transmitted so far.
    pub fn sent(&self) -> &[Vec<u8>] {
        &self.sent
    }

    /// Remove and return all frames transmitted so far.
    pub fn take_sent(&mut self) -> Vec<Vec<u8>> {
        core::mem::replace(&mut self.sent, Vec::new())
    }

    /// Change the reported link state.
    pub fn set_link_up(&mut self, up: bool) {
        self.link_up = up;
    }

    /// Change whether multicast filters are accepted.
    pub fn set_filter_support(&mut self, support: bool) {
        self.filter_support = support;
    }

    /// Make every transmission fail, or succeed again.
    pub fn set_send_failure(&mut self, fail: bool) {
        self.send_failure = fail;
    }

    /// The currently programmed multicast filter.
    pub fn multicast_filter(&self) -> &[EthernetAddress] {
        &self.filter
    }
}

impl super::Device for External {
    fn receive(&mut self, buffer: &mut [u8]) -> Option<usize> {
        let frame = self.inbound.pop_front()?;
        let len = frame.len().min(buffer.len());
        buffer[..len].copy_from_slice(&frame[..len]);
        Some(len)
    }

    fn send(&mut self, frame: &[u8]) -> bool {
        if self.send_failure {
            return false;
        }

        self.sent.push(frame.to_vec());
        true
    }

    fn is_link_up(&self) -> bool {
        self.link_up
    }

    fn set_multicast_filter(&mut self, groups: &[EthernetAddress]) -> bool {
        if !self.filter_support {
            return false;
        }

        self.filter = groups.to_vec();
        true
    }

    fn hardware_addr(&self) -> EthernetAddress {
        self.hardware_addr
    }
}
