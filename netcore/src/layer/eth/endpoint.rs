use alloc::vec::Vec;

use crate::config::{Config, Limits};
use crate::layer::{arp, Error, Result};
use crate::managed::Queue;
use crate::nic::Device;
use crate::time::Instant;
use crate::wire::{ethernet_frame, EthernetAddress, EthernetProtocol, EthernetRepr};
use crate::wire::{Ipv4Address, ETHERNET_HEADER_LEN};

use super::multicast::Groups;
use super::{FRAME_BUFFER_LEN, MTU};

/// The link layer state of an interface.
#[derive(Debug)]
pub struct Endpoint {
    arp: arp::Endpoint,

    groups: Groups,

    /// Received ipv4 packets, without link header.
    ip_queue: Queue<Vec<u8>>,

    /// The EtherType passed through as raw frames.
    raw: Option<EthernetProtocol>,

    raw_queue: Queue<RawFrame>,
}

/// A received frame of the raw passthrough EtherType.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    /// The sending station.
    pub src_addr: EthernetAddress,
    /// The EtherType of the frame.
    pub ethertype: EthernetProtocol,
    /// The frame contents after the link header.
    pub payload: Vec<u8>,
}

/// The link layer borrowed for sending.
///
/// Bundles everything that is needed to put a frame on the wire: the endpoint with its
/// resolution engine, the device, the address configuration and the current time.
pub struct Link<'a, D> {
    endpoint: &'a mut Endpoint,
    device: &'a mut D,
    config: &'a Config,
    now: Instant,
}

impl Endpoint {
    /// Create an endpoint with the table sizes of `limits`.
    pub fn new(limits: &Limits) -> Self {
        Endpoint {
            arp: arp::Endpoint::new(limits),
            groups: Groups::new(limits.link_groups),
            ip_queue: Queue::new(limits.rx_queue),
            raw: None,
            raw_queue: Queue::new(limits.rx_queue),
        }
    }

    /// The resolution engine.
    pub fn arp(&self) -> &arp::Endpoint {
        &self.arp
    }

    /// Drain the device, then run the resolution engine.
    pub fn process<D: Device>(&mut self, device: &mut D, config: &Config, now: Instant) {
        let hardware_addr = device.hardware_addr();
        let mut buffer = [0; FRAME_BUFFER_LEN];
        while let Some(len) = device.receive(&mut buffer) {
            let len = len.min(buffer.len());
            self.handle_frame(hardware_addr, &buffer[..len]);
        }

        self.arp.process(device, config, now);
    }

    /// Take the next received ipv4 packet.
    pub fn receive(&mut self) -> Option<Vec<u8>> {
        self.ip_queue.pop()
    }

    /// Take the next ipv4 packet whose next hop could not be resolved.
    pub fn take_failed(&mut self) -> Option<Vec<u8>> {
        let frame = self.arp.take_failed()?;
        Some(ethernet_frame::new_unchecked(&frame).payload_slice().to_vec())
    }

    /// Pass frames of `ethertype` through to [`receive_raw`].
    ///
    /// Only one EtherType can be enabled at a time. The types handled by the stack itself can
    /// not be passed through.
    ///
    /// [`receive_raw`]: #method.receive_raw
    pub fn enable_receive_raw(&mut self, ethertype: EthernetProtocol) -> Result<()> {
        if self.raw.is_some() {
            return Err(Error::Illegal);
        }

        match ethertype {
            EthernetProtocol::Ipv4 | EthernetProtocol::Arp => Err(Error::Illegal),
            ethertype => {
                self.raw = Some(ethertype);
                Ok(())
            },
        }
    }

    /// Stop the raw passthrough, dropping frames that were not yet taken.
    pub fn disable_receive_raw(&mut self) {
        self.raw = None;
        while self.raw_queue.pop().is_some() {}
    }

    /// Take the next frame of the raw passthrough EtherType.
    pub fn receive_raw(&mut self) -> Option<RawFrame> {
        self.raw_queue.pop()
    }

    /// If frames to a link multicast address are accepted.
    pub fn is_group_member(&self, addr: EthernetAddress) -> bool {
        self.groups.contains(addr)
    }

    /// The number of link multicast addresses in the device filter.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    fn handle_frame(&mut self, hardware_addr: EthernetAddress, frame: &[u8]) {
        if frame.len() <= ETHERNET_HEADER_LEN {
            net_trace!("eth: dropping runt frame of {} bytes", frame.len());
            return;
        }

        let frame = ethernet_frame::new_unchecked(frame);
        let repr = match EthernetRepr::parse(frame) {
            Ok(repr) => repr,
            Err(err) => {
                net_trace!("eth: dropping frame: {}", err);
                return;
            },
        };

        let dst = repr.dst_addr;
        let accepted = dst == hardware_addr
            || dst.is_broadcast()
            || (dst.is_multicast() && self.groups.contains(dst));
        if !accepted {
            net_trace!("eth: dropping frame to {}", dst);
            return;
        }

        let payload = frame.payload_slice();
        match repr.ethertype {
            EthernetProtocol::Ipv4 => {
                if self.ip_queue.push(payload.to_vec()).is_err() {
                    net_warn!("eth: ip receive queue full, dropping packet");
                }
            },
            EthernetProtocol::Arp => self.arp.receive(payload),
            ethertype if Some(ethertype) == self.raw => {
                let raw = RawFrame {
                    src_addr: repr.src_addr,
                    ethertype,
                    payload: payload.to_vec(),
                };
                if self.raw_queue.push(raw).is_err() {
                    net_warn!("eth: raw receive queue full, dropping frame");
                }
            },
            ethertype => net_trace!("eth: dropping frame of type {}", ethertype),
        }
    }
}

impl<'a, D: Device> Link<'a, D> {
    /// Borrow the link for sending at `now`.
    pub fn new(
        endpoint: &'a mut Endpoint,
        device: &'a mut D,
        config: &'a Config,
        now: Instant,
    ) -> Self {
        Link { endpoint, device, config, now }
    }

    /// The address configuration.
    pub fn config(&self) -> &'a Config {
        self.config
    }

    /// The time of this processing step.
    pub fn now(&self) -> Instant {
        self.now
    }

    /// The hardware address of the device.
    pub fn hardware_addr(&self) -> EthernetAddress {
        self.device.hardware_addr()
    }

    /// Whether the physical link is up.
    pub fn is_link_up(&self) -> bool {
        self.device.is_link_up()
    }

    /// Send a complete ipv4 packet to `next_hop`.
    ///
    /// Packets to the local address are looped back into the receive queue. A packet parked
    /// until its next hop is resolved counts as sent.
    pub fn send(&mut self, next_hop: Ipv4Address, packet: &[u8]) -> Result<()> {
        if packet.is_empty() || packet.len() > MTU {
            return Err(Error::BadSize);
        }

        if next_hop.is_unspecified() {
            return Err(Error::Unreachable);
        }

        let config = self.config;
        if !config.is_unset() && next_hop == config.address() {
            net_trace!("eth: looping back packet to {}", next_hop);
            return self.endpoint.ip_queue.push(packet.to_vec()).map_err(|_| {
                net_warn!("eth: ip receive queue full, dropping looped packet");
                Error::Exhausted
            });
        }

        let mut frame = self.frame(EthernetAddress::BROADCAST, EthernetProtocol::Ipv4, packet);

        let dst_addr = if next_hop.is_broadcast() || config.is_broadcast(next_hop) {
            EthernetAddress::BROADCAST
        } else if next_hop.is_multicast() {
            EthernetAddress::from_ipv4_multicast(next_hop)
        } else {
            let resolution = self.endpoint.arp.resolve(
                self.device,
                config,
                next_hop,
                &frame,
                self.now)?;
            match resolution {
                arp::Resolution::Resolved(addr) => addr,
                arp::Resolution::Queued => return Ok(()),
            }
        };

        ethernet_frame::new_unchecked_mut(&mut frame).set_dst_addr(dst_addr);
        self.transmit(&frame)
    }

    /// Send a frame of any EtherType to a link address.
    pub fn send_raw(
        &mut self,
        dst_addr: EthernetAddress,
        ethertype: EthernetProtocol,
        payload: &[u8],
    ) -> Result<()> {
        if payload.is_empty() || payload.len() > MTU {
            return Err(Error::BadSize);
        }

        let frame = self.frame(dst_addr, ethertype, payload);
        self.transmit(&frame)
    }

    /// Accept frames to the link address of an ip multicast group.
    pub fn join_group(&mut self, group: Ipv4Address) -> Result<()> {
        if !group.is_multicast() {
            return Err(Error::Illegal);
        }

        let addr = EthernetAddress::from_ipv4_multicast(group);
        self.endpoint.groups.join(self.device, addr)
    }

    /// Stop accepting frames to the link address of an ip multicast group.
    pub fn leave_group(&mut self, group: Ipv4Address) -> Result<()> {
        if !group.is_multicast() {
            return Err(Error::Illegal);
        }

        let addr = EthernetAddress::from_ipv4_multicast(group);
        self.endpoint.groups.leave(self.device, addr)
    }

    /// Take the next received ipv4 packet.
    pub fn receive(&mut self) -> Option<Vec<u8>> {
        self.endpoint.receive()
    }

    /// Take the next ipv4 packet whose next hop could not be resolved.
    pub fn take_failed(&mut self) -> Option<Vec<u8>> {
        self.endpoint.take_failed()
    }

    fn frame(&self, dst_addr: EthernetAddress, ethertype: EthernetProtocol, payload: &[u8])
        -> Vec<u8>
    {
        let repr = EthernetRepr {
            src_addr: self.device.hardware_addr(),
            dst_addr,
            ethertype,
        };

        let mut frame = vec![0; ethernet_frame::buffer_len(payload.len())];
        let eth = ethernet_frame::new_unchecked_mut(&mut frame);
        repr.emit(eth);
        eth.payload_mut_slice().copy_from_slice(payload);
        frame
    }

    fn transmit(&mut self, frame: &[u8]) -> Result<()> {
        if self.device.send(frame) {
            Ok(())
        } else {
            net_warn!("eth: device refused frame");
            Err(Error::Exhausted)
        }
    }
}
