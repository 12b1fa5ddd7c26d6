use alloc::vec::Vec;
use byteorder::{ByteOrder, NetworkEndian};

use crate::config::{Config, Limits};
use crate::layer::{eth, icmp, igmp, Error, Result};
use crate::managed::Queue;
use crate::nic::Device;
use crate::time::Instant;
use crate::wire::{Checksum, EthernetAddress, IpProtocol, Ipv4Address, Ipv4Repr, ipv4_packet};
use crate::wire::{Icmpv4DstUnreachable, Icmpv4Embedded, Icmpv4Message};

use super::{Datagram, Route, Routes, DEFAULT_TTL, MULTICAST_TTL};

/// The ip layer state of an interface.
///
/// Owns the route cache and the control message engines, which only get to send through a
/// [`Sender`] that is handed to them for the duration of a call.
///
/// [`Sender`]: struct.Sender.html
#[derive(Debug)]
pub struct Endpoint {
    routes: Routes,

    /// Datagrams for the transport above.
    rx: Queue<Datagram>,

    /// If icmp datagrams are also copied to `raw_icmp_queue`.
    raw_icmp: bool,

    raw_icmp_queue: Queue<Datagram>,

    icmp: icmp::Endpoint,

    igmp: igmp::Endpoint,
}

/// The ip layer borrowed for sending.
///
/// Extends a [`eth::Link`] with the route cache, which is all that is needed to choose the next
/// hop of a datagram.
///
/// [`eth::Link`]: ../eth/struct.Link.html
pub struct Sender<'a, D> {
    routes: &'a mut Routes,
    link: eth::Link<'a, D>,
}

impl Endpoint {
    /// Create the endpoint with the table sizes of `limits`.
    ///
    /// The hardware address seeds the random report delays of group management.
    pub fn new(limits: &Limits, hardware_addr: EthernetAddress) -> Self {
        Endpoint {
            routes: Routes::new(limits.routes),
            rx: Queue::new(limits.rx_queue),
            raw_icmp: false,
            raw_icmp_queue: Queue::new(limits.rx_queue),
            icmp: icmp::Endpoint::new(limits),
            igmp: igmp::Endpoint::new(limits, hardware_addr),
        }
    }

    /// Handle all packets received by the link, then run the control message engines.
    pub fn process<D: Device>(&mut self, mut link: eth::Link<D>) {
        let config = link.config();

        while let Some(packet) = link.receive() {
            self.handle_packet(config, &packet);
        }

        while let Some(packet) = link.take_failed() {
            self.send_failed(&packet);
        }

        let Endpoint { routes, icmp, igmp, .. } = self;
        let mut sender = Sender::new(routes, link);
        icmp.process(&mut sender);
        igmp.process(&mut sender);
    }

    /// Send a datagram from the local address.
    ///
    /// While no local address is assigned, only broadcast and multicast destinations are
    /// reachable and any other destination also produces a network unreachable notification.
    pub fn send<D: Device>(
        &mut self,
        link: eth::Link<D>,
        dst_addr: Ipv4Address,
        payload: &[u8],
        protocol: IpProtocol,
        router_alert: bool,
    ) -> Result<()> {
        let config = link.config();
        let result = Sender::new(&mut self.routes, link)
            .send(dst_addr, payload, protocol, router_alert);

        if result == Err(Error::Unreachable) && config.is_unset() {
            let (src_port, dst_port) = transport_ports(protocol, payload);
            self.icmp.notify(
                Icmpv4Message::DstUnreachable,
                Icmpv4DstUnreachable::NetUnreachable.into(),
                Icmpv4Embedded {
                    src_addr: config.address(),
                    dst_addr,
                    protocol,
                    src_port,
                    dst_port,
                });
        }

        result
    }

    /// Report a packet whose next hop never answered.
    ///
    /// Only a local notification is produced, nothing is sent.
    pub fn send_failed(&mut self, packet: &[u8]) {
        self.icmp.destination_unreachable(Icmpv4DstUnreachable::HostUnreachable, packet);
    }

    /// Take the next datagram for the transport layer.
    pub fn receive(&mut self) -> Option<Datagram> {
        self.rx.pop()
    }

    /// Take the next control message notification.
    pub fn receive_notification(&mut self) -> Option<icmp::Notification> {
        self.icmp.receive_notification()
    }

    /// Copy received icmp datagrams to [`receive_icmp`].
    ///
    /// Disabling drops the copies that were not yet taken.
    ///
    /// [`receive_icmp`]: #method.receive_icmp
    pub fn enable_receive_icmp(&mut self, enable: bool) {
        self.raw_icmp = enable;
        if !enable {
            while self.raw_icmp_queue.pop().is_some() {}
        }
    }

    /// Take the next copy of a received icmp datagram.
    pub fn receive_icmp(&mut self) -> Option<Datagram> {
        self.raw_icmp_queue.pop()
    }

    /// Join a multicast host group.
    pub fn join_host_group<D: Device>(&mut self, link: eth::Link<D>, group: Ipv4Address)
        -> Result<()>
    {
        let Endpoint { routes, igmp, .. } = self;
        igmp.join_host_group(&mut Sender::new(routes, link), group)
    }

    /// Leave a multicast host group.
    pub fn leave_host_group<D: Device>(&mut self, link: eth::Link<D>, group: Ipv4Address)
        -> Result<()>
    {
        let Endpoint { routes, igmp, .. } = self;
        igmp.leave_host_group(&mut Sender::new(routes, link), group)
    }

    /// Route datagrams to `destination` through `gateway`.
    pub fn add_route(&mut self, destination: Ipv4Address, gateway: Ipv4Address, now: Instant) {
        self.routes.add_route(destination, gateway, now);
    }

    /// The gateway datagrams to `destination` are sent through, if any.
    pub fn gateway(&self, config: &Config, destination: Ipv4Address) -> Option<Ipv4Address> {
        self.routes.find(destination).or_else(|| config.gateway())
    }

    /// The learned routes.
    pub fn routes(&self) -> impl Iterator<Item=&Route> + '_ {
        self.routes.iter()
    }

    /// The control message engine.
    pub fn icmp(&self) -> &icmp::Endpoint {
        &self.icmp
    }

    /// The group management engine.
    pub fn igmp(&self) -> &igmp::Endpoint {
        &self.igmp
    }

    fn handle_packet(&mut self, config: &Config, packet: &[u8]) {
        let repr = match ipv4_packet::new_checked(packet)
            .and_then(|packet| Ipv4Repr::parse(packet, Checksum::Manual))
        {
            Ok(repr) => repr,
            Err(err) => {
                net_trace!("ip: dropping packet: {}", err);
                return;
            },
        };

        if !self.accepts(config, repr.dst_addr) {
            net_trace!("ip: dropping packet to {}", repr.dst_addr);
            return;
        }

        let payload = ipv4_packet::new_unchecked(packet).payload_slice();
        let datagram = Datagram {
            src_addr: repr.src_addr,
            dst_addr: repr.dst_addr,
            protocol: repr.protocol,
            payload: payload.to_vec(),
        };

        match repr.protocol {
            IpProtocol::Icmp => {
                if self.raw_icmp && self.raw_icmp_queue.push(datagram.clone()).is_err() {
                    net_warn!("ip: raw icmp queue full, dropping copy");
                }
                self.icmp.receive(datagram);
            },
            IpProtocol::Igmp => self.igmp.receive(datagram),
            _ => if self.rx.push(datagram).is_err() {
                net_warn!("ip: receive queue full, dropping datagram");
            },
        }
    }

    fn accepts(&self, config: &Config, dst_addr: Ipv4Address) -> bool {
        if dst_addr.is_broadcast() {
            return true;
        }

        if config.is_unset() {
            return false;
        }

        dst_addr == config.address()
            || config.is_broadcast(dst_addr)
            || (dst_addr.is_multicast() && (dst_addr == Ipv4Address::MULTICAST_ALL_SYSTEMS
                || self.igmp.is_member(dst_addr)))
    }
}

impl<'a, D: Device> Sender<'a, D> {
    /// Combine the route cache and a link.
    pub fn new(routes: &'a mut Routes, link: eth::Link<'a, D>) -> Self {
        Sender { routes, link }
    }

    /// The address configuration.
    pub fn config(&self) -> &'a Config {
        self.link.config()
    }

    /// The time of this processing step.
    pub fn now(&self) -> Instant {
        self.link.now()
    }

    /// Whether the physical link is up.
    pub fn is_link_up(&self) -> bool {
        self.link.is_link_up()
    }

    /// Assemble a datagram around `payload` and send it towards `dst_addr`.
    pub fn send(
        &mut self,
        dst_addr: Ipv4Address,
        payload: &[u8],
        protocol: IpProtocol,
        router_alert: bool,
    ) -> Result<()> {
        if payload.is_empty() {
            return Err(Error::BadSize);
        }

        if dst_addr.is_unspecified() {
            return Err(Error::Illegal);
        }

        let repr = Ipv4Repr {
            src_addr: self.config().address(),
            dst_addr,
            protocol,
            payload_len: payload.len(),
            hop_limit: if dst_addr.is_multicast() { MULTICAST_TTL } else { DEFAULT_TTL },
            router_alert,
        };

        if repr.total_len() > eth::MTU {
            return Err(Error::BadSize);
        }

        let next_hop = self.next_hop(dst_addr)?;

        let mut packet: Vec<u8> = vec![0; repr.total_len()];
        let ip = ipv4_packet::new_unchecked_mut(&mut packet);
        repr.emit(ip, Checksum::Manual);
        ip.payload_mut_slice().copy_from_slice(payload);

        self.link.send(next_hop, &packet)
    }

    /// Choose the address a datagram to `dst_addr` is handed to on the link.
    pub fn next_hop(&mut self, dst_addr: Ipv4Address) -> Result<Ipv4Address> {
        let config = self.config();

        if dst_addr.is_broadcast() || dst_addr.is_multicast() || config.is_broadcast(dst_addr) {
            return Ok(dst_addr);
        }

        if config.is_unset() {
            return Err(Error::Unreachable);
        }

        if dst_addr == config.address() || config.on_link(dst_addr) {
            return Ok(dst_addr);
        }

        let now = self.now();
        if let Some(gateway) = self.routes.get_route(dst_addr, now) {
            return Ok(gateway);
        }

        config.gateway().ok_or(Error::Unreachable)
    }

    /// Route datagrams to `destination` through `gateway`.
    pub fn add_route(&mut self, destination: Ipv4Address, gateway: Ipv4Address) {
        let now = self.now();
        self.routes.add_route(destination, gateway, now);
    }

    /// Accept frames to the link address of an ip multicast group.
    pub fn join_link_group(&mut self, group: Ipv4Address) -> Result<()> {
        self.link.join_group(group)
    }

    /// Stop accepting frames to the link address of an ip multicast group.
    pub fn leave_link_group(&mut self, group: Ipv4Address) -> Result<()> {
        self.link.leave_group(group)
    }
}

/// The ports of a tcp or udp payload, zero for other protocols.
fn transport_ports(protocol: IpProtocol, payload: &[u8]) -> (u16, u16) {
    match protocol {
        IpProtocol::Tcp | IpProtocol::Udp if payload.len() >= 4 => (
            NetworkEndian::read_u16(&payload[0..2]),
            NetworkEndian::read_u16(&payload[2..4]),
        ),
        _ => (0, 0),
    }
}
