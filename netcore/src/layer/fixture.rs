//! Addresses and packet builders shared by the layer tests.
use alloc::vec::Vec;

use crate::config::{Config, Limits};
use crate::layer::{eth, ip, Result};
use crate::nic::External;
use crate::time::Instant;
use crate::wire::{arp_packet, ethernet_frame, icmpv4_packet, igmp_packet, ipv4_packet};
use crate::wire::{ArpOperation, ArpRepr, Checksum, EthernetAddress, EthernetProtocol, EthernetRepr};
use crate::wire::{Icmpv4Repr, IgmpMessage, IgmpRepr, IpProtocol, Ipv4Address, Ipv4Cidr, Ipv4Repr};

pub(crate) const HOST_MAC: EthernetAddress = EthernetAddress([0x02, 0x00, 0x00, 0x00, 0x00, 0x05]);
pub(crate) const HOST_IP: Ipv4Address = Ipv4Address::new(10, 0, 0, 5);

pub(crate) const PEER_MAC: EthernetAddress = EthernetAddress([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
pub(crate) const PEER_IP: Ipv4Address = Ipv4Address::new(10, 0, 0, 9);

pub(crate) const GATEWAY_MAC: EthernetAddress = EthernetAddress([0x02, 0x00, 0x00, 0x00, 0x00, 0x01]);
pub(crate) const GATEWAY_IP: Ipv4Address = Ipv4Address::new(10, 0, 0, 1);

/// A host off the local network.
pub(crate) const REMOTE_IP: Ipv4Address = Ipv4Address::new(192, 0, 2, 7);

/// `10.0.0.5/24` with the default gateway `10.0.0.1`.
pub(crate) fn config() -> Config {
    Config::new(Ipv4Cidr::new(HOST_IP, 24), Some(GATEWAY_IP))
}

pub(crate) fn nic() -> External {
    External::new(HOST_MAC)
}

pub(crate) fn frame(
    src_addr: EthernetAddress,
    dst_addr: EthernetAddress,
    ethertype: EthernetProtocol,
    payload: &[u8],
) -> Vec<u8> {
    let mut buffer = vec![0; ethernet_frame::buffer_len(payload.len())];
    let frame = ethernet_frame::new_unchecked_mut(&mut buffer);
    EthernetRepr { src_addr, dst_addr, ethertype }.emit(frame);
    frame.payload_mut_slice().copy_from_slice(payload);
    buffer
}

/// An arp packet in a frame from `src_hw`.
pub(crate) fn arp_frame(
    operation: ArpOperation,
    src_hw: EthernetAddress,
    src_ip: Ipv4Address,
    dst_hw: EthernetAddress,
    target_ip: Ipv4Address,
) -> Vec<u8> {
    let repr = ArpRepr::EthernetIpv4 {
        operation,
        source_hardware_addr: src_hw,
        source_protocol_addr: src_ip,
        target_hardware_addr: match operation {
            ArpOperation::Request => EthernetAddress::default(),
            _ => dst_hw,
        },
        target_protocol_addr: target_ip,
    };

    let mut packet = vec![0; repr.buffer_len()];
    repr.emit(arp_packet::new_unchecked_mut(&mut packet));
    frame(src_hw, dst_hw, EthernetProtocol::Arp, &packet)
}

/// A complete ipv4 packet with a valid checksum.
pub(crate) fn ip_packet(
    src_addr: Ipv4Address,
    dst_addr: Ipv4Address,
    protocol: IpProtocol,
    payload: &[u8],
) -> Vec<u8> {
    let repr = Ipv4Repr {
        src_addr,
        dst_addr,
        protocol,
        payload_len: payload.len(),
        hop_limit: 64,
        router_alert: false,
    };

    let mut packet = vec![0; repr.total_len()];
    let ip = ipv4_packet::new_unchecked_mut(&mut packet);
    repr.emit(ip, Checksum::Manual);
    ip.payload_mut_slice().copy_from_slice(payload);
    packet
}

/// An ipv4 packet from the peer, in a frame to the host.
pub(crate) fn ip_frame(
    src_addr: Ipv4Address,
    dst_addr: Ipv4Address,
    protocol: IpProtocol,
    payload: &[u8],
) -> Vec<u8> {
    let dst_hw = if dst_addr.is_broadcast() {
        EthernetAddress::BROADCAST
    } else if dst_addr.is_multicast() {
        EthernetAddress::from_ipv4_multicast(dst_addr)
    } else {
        HOST_MAC
    };

    let packet = ip_packet(src_addr, dst_addr, protocol, payload);
    frame(PEER_MAC, dst_hw, EthernetProtocol::Ipv4, &packet)
}

/// An icmp message with a valid checksum.
pub(crate) fn icmp_message(repr: Icmpv4Repr, payload: &[u8]) -> Vec<u8> {
    let mut message = vec![0; repr.buffer_len() + payload.len()];
    let icmp = icmpv4_packet::new_unchecked_mut(&mut message);
    icmp.payload_mut_slice().copy_from_slice(payload);
    repr.emit(icmp, Checksum::Manual);
    message
}

/// An igmp message with a valid checksum.
pub(crate) fn igmp_message(message: IgmpMessage, max_resp_time: u8, group: Ipv4Address) -> Vec<u8> {
    let repr = IgmpRepr { message, max_resp_time, group_addr: group };
    let mut buffer = vec![0; repr.buffer_len()];
    repr.emit(igmp_packet::new_unchecked_mut(&mut buffer), Checksum::Manual);
    buffer
}

/// Split a sent frame into its link header and payload.
pub(crate) fn parse_frame(frame: &[u8]) -> (EthernetRepr, &[u8]) {
    let frame = ethernet_frame::new_checked(frame).expect("valid frame");
    let repr = EthernetRepr::parse(frame).expect("valid frame");
    (repr, frame.payload_slice())
}

/// Split a sent frame containing an ipv4 packet into its ip header and payload.
pub(crate) fn parse_ip(frame: &[u8]) -> (Ipv4Repr, &[u8]) {
    let (eth, payload) = parse_frame(frame);
    assert_eq!(eth.ethertype, EthernetProtocol::Ipv4);
    let packet = ipv4_packet::new_checked(payload).expect("valid packet");
    let repr = Ipv4Repr::parse(packet, Checksum::Manual).expect("valid packet");
    (repr, packet.payload_slice())
}

/// Parse a sent frame containing an arp packet.
pub(crate) fn parse_arp(frame: &[u8]) -> (EthernetRepr, ArpRepr) {
    let (eth, payload) = parse_frame(frame);
    assert_eq!(eth.ethertype, EthernetProtocol::Arp);
    let packet = arp_packet::new_checked(payload).expect("valid packet");
    (eth, ArpRepr::parse(packet).expect("valid packet"))
}

/// An interface built from the layer endpoints, driven like `Interface` drives them.
pub(crate) struct Host {
    pub(crate) nic: External,
    pub(crate) config: Config,
    pub(crate) eth: eth::Endpoint,
    pub(crate) ip: ip::Endpoint,
}

impl Host {
    pub(crate) fn new(config: Config) -> Self {
        Host::with_limits(config, &Limits::default())
    }

    pub(crate) fn with_limits(config: Config, limits: &Limits) -> Self {
        Host {
            nic: nic(),
            config,
            eth: eth::Endpoint::new(limits),
            ip: ip::Endpoint::new(limits, HOST_MAC),
        }
    }

    pub(crate) fn process(&mut self, now: Instant) {
        self.eth.process(&mut self.nic, &self.config, now);
        let link = eth::Link::new(&mut self.eth, &mut self.nic, &self.config, now);
        self.ip.process(link);
    }

    /// Receive one frame and process it.
    pub(crate) fn deliver(&mut self, frame: &[u8], now: Instant) {
        self.nic.push_rx(frame);
        self.process(now);
    }

    pub(crate) fn send(
        &mut self,
        dst_addr: Ipv4Address,
        payload: &[u8],
        protocol: IpProtocol,
        now: Instant,
    ) -> Result<()> {
        let link = eth::Link::new(&mut self.eth, &mut self.nic, &self.config, now);
        self.ip.send(link, dst_addr, payload, protocol, false)
    }

    pub(crate) fn join(&mut self, group: Ipv4Address, now: Instant) -> Result<()> {
        let link = eth::Link::new(&mut self.eth, &mut self.nic, &self.config, now);
        self.ip.join_host_group(link, group)
    }

    pub(crate) fn leave(&mut self, group: Ipv4Address, now: Instant) -> Result<()> {
        let link = eth::Link::new(&mut self.eth, &mut self.nic, &self.config, now);
        self.ip.leave_host_group(link, group)
    }

    /// Learn the link address of the peer from a request it sent.
    pub(crate) fn know_peer(&mut self, now: Instant) {
        let request = arp_frame(
            ArpOperation::Request,
            PEER_MAC,
            PEER_IP,
            EthernetAddress::BROADCAST,
            HOST_IP);
        self.deliver(&request, now);
        self.nic.take_sent();
    }
}
