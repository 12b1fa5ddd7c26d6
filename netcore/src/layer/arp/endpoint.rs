use alloc::vec::Vec;

use crate::config::{Config, Limits};
use crate::layer::{Error, Result};
use crate::managed::{Key, Queue, Slots};
use crate::nic::Device;
use crate::time::{Duration, Expiration, Instant};
use crate::wire::{ArpOperation, ArpRepr, EthernetAddress, EthernetProtocol, EthernetRepr};
use crate::wire::{arp_packet, ethernet_frame, Ipv4Address, ETHERNET_HEADER_LEN};

use super::neighbor::{Neighbor, State};

/// The address resolution engine of an interface.
#[derive(Debug)]
pub struct Endpoint {
    neighbors: Slots<Neighbor>,

    /// Number of frames that may be parked on one entry.
    pending_frames: usize,

    /// Received arp packets, without link header.
    inbound: Queue<Vec<u8>>,

    /// Parked frames of entries that were never answered.
    failed: Queue<Vec<u8>>,
}

/// The outcome of resolving the next hop of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The link address is known, the frame can be sent right away.
    Resolved(EthernetAddress),

    /// A copy of the frame is parked until the address is known.
    Queued,
}

impl Endpoint {
    /// Time to wait for an answer before asking again.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_millis(800);

    /// How often an unanswered request is repeated.
    pub const MAX_RETRIES: u8 = 3;

    /// Valid entries unused for this long are forgotten.
    pub const ENTRY_LIFETIME: Duration = Duration::from_secs(600);

    /// Create an empty resolution table.
    pub fn new(limits: &Limits) -> Self {
        Endpoint {
            neighbors: Slots::new(limits.neighbors),
            pending_frames: limits.pending_frames,
            inbound: Queue::new(limits.rx_queue),
            failed: Queue::new(limits.neighbors * limits.pending_frames),
        }
    }

    /// Find the link address of `addr` for a complete ethernet `frame`.
    ///
    /// When the address is not yet known a copy of the frame is parked and a request is
    /// broadcast if none is outstanding. The destination of a parked frame is filled in when it
    /// is finally sent.
    pub fn resolve<D: Device>(
        &mut self,
        device: &mut D,
        config: &Config,
        addr: Ipv4Address,
        frame: &[u8],
        now: Instant,
    ) -> Result<Resolution> {
        let existing = self.neighbors.iter_mut()
            .find(|(_, neighbor)| neighbor.protocol_addr == addr);

        if let Some((_, neighbor)) = existing {
            neighbor.last_used = now;
            if neighbor.state == State::Valid {
                return Ok(Resolution::Resolved(neighbor.hardware_addr));
            }

            return match neighbor.frames.push(frame.to_vec()) {
                Ok(()) => Ok(Resolution::Queued),
                Err(_) => {
                    net_warn!("arp: too many frames waiting for {}", addr);
                    Err(Error::Exhausted)
                },
            };
        }

        let mut neighbor = Neighbor::looking(
            addr,
            self.pending_frames,
            now,
            now + Self::REQUEST_TIMEOUT);
        if neighbor.frames.push(frame.to_vec()).is_err() {
            return Err(Error::Exhausted);
        }

        if self.neighbors.is_full() {
            let key = self.least_recently_used().ok_or_else(|| {
                net_warn!("arp: no entry for {}, all lookups are pending", addr);
                Error::Exhausted
            })?;
            if let Some(evicted) = self.neighbors.remove(key) {
                net_debug!("arp: evicting {}", evicted.protocol_addr);
            }
        }

        if self.neighbors.insert(neighbor).is_err() {
            return Err(Error::Exhausted);
        }

        net_debug!("arp: looking for {}", addr);
        send_request(device, config, addr);
        Ok(Resolution::Queued)
    }

    /// Queue an arp packet that was received for later processing.
    pub fn receive(&mut self, packet: &[u8]) {
        if self.inbound.push(packet.to_vec()).is_err() {
            net_warn!("arp: receive queue full, dropping packet");
        }
    }

    /// Handle received packets and timers, then send frames whose destination became known.
    pub fn process<D: Device>(&mut self, device: &mut D, config: &Config, now: Instant) {
        while let Some(packet) = self.inbound.pop() {
            self.handle_packet(device, config, &packet, now);
        }

        self.handle_timeouts(device, config, now);
        self.send_queued_frames(device);
        self.expire(now);
    }

    /// Query a known mapping without refreshing it.
    pub fn lookup(&self, addr: Ipv4Address) -> Option<EthernetAddress> {
        self.neighbors.iter()
            .find(|(_, neighbor)| neighbor.protocol_addr == addr)
            .filter(|(_, neighbor)| neighbor.state == State::Valid)
            .map(|(_, neighbor)| neighbor.hardware_addr)
    }

    /// The state of the entry for an address, if there is one.
    pub fn state(&self, addr: Ipv4Address) -> Option<State> {
        self.neighbors.iter()
            .find(|(_, neighbor)| neighbor.protocol_addr == addr)
            .map(|(_, neighbor)| neighbor.state)
    }

    /// Take a frame whose destination could not be resolved.
    pub fn take_failed(&mut self) -> Option<Vec<u8>> {
        self.failed.pop()
    }

    /// The number of entries, pending or valid.
    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    /// If the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    fn least_recently_used(&self) -> Option<Key> {
        self.neighbors.iter()
            .filter(|(_, neighbor)| neighbor.state == State::Valid)
            .min_by_key(|(_, neighbor)| neighbor.last_used)
            .map(|(key, _)| key)
    }

    fn handle_packet<D: Device>(
        &mut self,
        device: &mut D,
        config: &Config,
        packet: &[u8],
        now: Instant,
    ) {
        let repr = match arp_packet::new_checked(packet).and_then(ArpRepr::parse) {
            Ok(repr) => repr,
            Err(err) => {
                net_trace!("arp: dropping packet: {}", err);
                return;
            },
        };

        let (operation, sender_hw, sender_ip, target_ip) = match repr {
            ArpRepr::EthernetIpv4 {
                operation,
                source_hardware_addr,
                source_protocol_addr,
                target_protocol_addr,
                ..
            } => (operation, source_hardware_addr, source_protocol_addr, target_protocol_addr),
        };

        if config.is_unset() || target_ip != config.address() {
            return;
        }

        match operation {
            ArpOperation::Request => {
                send_reply(device, config, sender_ip, sender_hw);
                self.learn(sender_ip, sender_hw, now);
            },
            ArpOperation::Reply => {
                let existing = self.neighbors.iter_mut()
                    .find(|(_, neighbor)| neighbor.protocol_addr == sender_ip);
                if let Some((_, neighbor)) = existing {
                    net_debug!("arp: {} is at {}", sender_ip, sender_hw);
                    neighbor.answered(sender_hw);
                }
            },
            ArpOperation::Unknown(_) => (),
        }
    }

    /// Remember the sender of a request.
    ///
    /// A new entry is only created in a free slot, a request never evicts another mapping.
    fn learn(&mut self, addr: Ipv4Address, hardware_addr: EthernetAddress, now: Instant) {
        if !addr.is_unicast() || !hardware_addr.is_unicast() {
            return;
        }

        let existing = self.neighbors.iter_mut()
            .find(|(_, neighbor)| neighbor.protocol_addr == addr);
        if let Some((_, neighbor)) = existing {
            if neighbor.state == State::Valid {
                neighbor.last_used = now;
            }
            neighbor.answered(hardware_addr);
            return;
        }

        if self.neighbors.insert(Neighbor::learned(addr, hardware_addr, now)).is_ok() {
            net_debug!("arp: learned {} is at {}", addr, hardware_addr);
        }
    }

    fn handle_timeouts<D: Device>(&mut self, device: &mut D, config: &Config, now: Instant) {
        let mut gave_up = Vec::new();

        for (key, neighbor) in self.neighbors.iter_mut() {
            if neighbor.state == State::RequestSent && neighbor.deadline.is_expired(now) {
                neighbor.state = State::RetryRequest;
            }

            if neighbor.state != State::RetryRequest {
                continue;
            }

            if neighbor.attempts < Self::MAX_RETRIES {
                neighbor.attempts += 1;
                neighbor.state = State::RequestSent;
                neighbor.deadline = Expiration::When(now + Self::REQUEST_TIMEOUT);
                net_trace!("arp: asking again for {}", neighbor.protocol_addr);
                send_request(device, config, neighbor.protocol_addr);
            } else {
                gave_up.push(key);
            }
        }

        for key in gave_up {
            let mut neighbor = match self.neighbors.remove(key) {
                Some(neighbor) => neighbor,
                None => continue,
            };

            net_debug!("arp: no answer from {}", neighbor.protocol_addr);
            while let Some(frame) = neighbor.frames.pop() {
                if self.failed.push(frame).is_err() {
                    net_warn!("arp: failed queue full, dropping frame");
                }
            }
        }
    }

    fn send_queued_frames<D: Device>(&mut self, device: &mut D) {
        for (_, neighbor) in self.neighbors.iter_mut() {
            if neighbor.state != State::SendQueuedFrames {
                continue;
            }

            while let Some(mut frame) = neighbor.frames.pop() {
                ethernet_frame::new_unchecked_mut(&mut frame)
                    .set_dst_addr(neighbor.hardware_addr);
                if !device.send(&frame) {
                    net_warn!("arp: device refused frame to {}", neighbor.protocol_addr);
                }
            }

            neighbor.state = State::Valid;
        }
    }

    fn expire(&mut self, now: Instant) {
        self.neighbors.retain(|neighbor| {
            neighbor.state != State::Valid
                || now.duration_since(neighbor.last_used) <= Self::ENTRY_LIFETIME
        });
    }
}

fn send_request<D: Device>(device: &mut D, config: &Config, target: Ipv4Address) {
    let repr = ArpRepr::EthernetIpv4 {
        operation: ArpOperation::Request,
        source_hardware_addr: device.hardware_addr(),
        source_protocol_addr: config.address(),
        target_hardware_addr: EthernetAddress::default(),
        target_protocol_addr: target,
    };
    send_packet(device, EthernetAddress::BROADCAST, repr);
}

fn send_reply<D: Device>(
    device: &mut D,
    config: &Config,
    target: Ipv4Address,
    target_hw: EthernetAddress,
) {
    let repr = ArpRepr::EthernetIpv4 {
        operation: ArpOperation::Reply,
        source_hardware_addr: device.hardware_addr(),
        source_protocol_addr: config.address(),
        target_hardware_addr: target_hw,
        target_protocol_addr: target,
    };
    send_packet(device, target_hw, repr);
}

fn send_packet<D: Device>(device: &mut D, dst_addr: EthernetAddress, repr: ArpRepr) {
    let eth = EthernetRepr {
        src_addr: device.hardware_addr(),
        dst_addr,
        ethertype: EthernetProtocol::Arp,
    };

    let mut frame = vec![0; ETHERNET_HEADER_LEN + repr.buffer_len()];
    let eth_frame = ethernet_frame::new_unchecked_mut(&mut frame);
    eth.emit(eth_frame);
    repr.emit(arp_packet::new_unchecked_mut(eth_frame.payload_mut_slice()));

    if !device.send(&frame) {
        net_warn!("arp: device refused packet to {}", dst_addr);
    }
}
