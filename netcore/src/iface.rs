//! The interface context tying the layers to one device.
//!
//! An [`Interface`] owns the device, the address configuration and the endpoint of every layer.
//! It is driven by calling [`process`] with the current time, which moves received frames up
//! the layers, fires due timers and sends whatever became ready. Transport protocols use the
//! remaining methods between two calls.
//!
//! ```
//! use netcore::{Config, Interface};
//! use netcore::nic::External;
//! use netcore::time::Instant;
//! use netcore::wire::{EthernetAddress, Ipv4Address, Ipv4Cidr, IpProtocol};
//!
//! let device = External::new(EthernetAddress([0x02, 0, 0, 0, 0, 0x05]));
//! let config = Config::new(Ipv4Cidr::new(Ipv4Address::new(10, 0, 0, 5), 24), None);
//! let mut iface = Interface::new(device, config);
//!
//! iface.process(Instant::from_millis(0));
//! iface.send(Ipv4Address::BROADCAST, b"hello", IpProtocol::Udp, false).unwrap();
//! assert_eq!(iface.device().sent().len(), 1);
//! ```
//!
//! [`Interface`]: struct.Interface.html
//! [`process`]: struct.Interface.html#method.process
use crate::config::{Config, Limits};
use crate::layer::{arp, eth, icmp, ip, Result};
use crate::nic::Device;
use crate::time::Instant;
use crate::wire::{EthernetAddress, EthernetProtocol, IpProtocol, Ipv4Address};

/// One network device with its protocol state.
///
/// Only [`process`] reads the clock. Calls between two `process` calls, like sending or joining
/// a group, are stamped with the time passed to the latest one.
///
/// [`process`]: #method.process
#[derive(Debug)]
pub struct Interface<D> {
    device: D,
    config: Config,
    eth: eth::Endpoint,
    ip: ip::Endpoint,
    /// The time passed to the latest `process` call.
    now: Instant,
}

impl<D: Device> Interface<D> {
    /// Create an interface with the default table sizes.
    pub fn new(device: D, config: Config) -> Self {
        Self::with_limits(device, config, &Limits::default())
    }

    /// Create an interface with custom table sizes.
    pub fn with_limits(device: D, config: Config, limits: &Limits) -> Self {
        let hardware_addr = device.hardware_addr();
        Interface {
            device,
            config,
            eth: eth::Endpoint::new(limits),
            ip: ip::Endpoint::new(limits, hardware_addr),
            now: Instant::from_millis(0),
        }
    }

    /// Run all layers once.
    ///
    /// `now` must not go backwards between calls.
    pub fn process(&mut self, now: Instant) {
        self.now = now;
        self.eth.process(&mut self.device, &self.config, now);

        let link = eth::Link::new(&mut self.eth, &mut self.device, &self.config, now);
        self.ip.process(link);
    }

    /// Send a datagram to `dst_addr`.
    ///
    /// Succeeds once the datagram is handed to the device or parked until its next hop is
    /// resolved.
    pub fn send(
        &mut self,
        dst_addr: Ipv4Address,
        payload: &[u8],
        protocol: IpProtocol,
        router_alert: bool,
    ) -> Result<()> {
        let link = eth::Link::new(&mut self.eth, &mut self.device, &self.config, self.now);
        self.ip.send(link, dst_addr, payload, protocol, router_alert)
    }

    /// Take the next datagram for the transport layer.
    pub fn receive(&mut self) -> Option<ip::Datagram> {
        self.ip.receive()
    }

    /// Take the next control message notification.
    pub fn receive_notification(&mut self) -> Option<icmp::Notification> {
        self.ip.receive_notification()
    }

    /// Also deliver received icmp datagrams to [`receive_icmp`].
    ///
    /// [`receive_icmp`]: #method.receive_icmp
    pub fn enable_receive_icmp(&mut self, enable: bool) {
        self.ip.enable_receive_icmp(enable)
    }

    /// Take the next received icmp datagram.
    pub fn receive_icmp(&mut self) -> Option<ip::Datagram> {
        self.ip.receive_icmp()
    }

    /// Join a multicast host group.
    pub fn join_host_group(&mut self, group: Ipv4Address) -> Result<()> {
        let link = eth::Link::new(&mut self.eth, &mut self.device, &self.config, self.now);
        self.ip.join_host_group(link, group)
    }

    /// Leave a multicast host group.
    pub fn leave_host_group(&mut self, group: Ipv4Address) -> Result<()> {
        let link = eth::Link::new(&mut self.eth, &mut self.device, &self.config, self.now);
        self.ip.leave_host_group(link, group)
    }

    /// Route datagrams to `destination` through `gateway`.
    pub fn add_route(&mut self, destination: Ipv4Address, gateway: Ipv4Address) {
        self.ip.add_route(destination, gateway, self.now)
    }

    /// The gateway datagrams to `destination` would be sent through.
    pub fn gateway(&self, destination: Ipv4Address) -> Option<Ipv4Address> {
        self.ip.gateway(&self.config, destination)
    }

    /// Deliver frames of one further EtherType to [`receive_raw`].
    ///
    /// [`receive_raw`]: #method.receive_raw
    pub fn enable_receive_raw(&mut self, ethertype: EthernetProtocol) -> Result<()> {
        self.eth.enable_receive_raw(ethertype)
    }

    /// Stop delivering raw frames.
    pub fn disable_receive_raw(&mut self) {
        self.eth.disable_receive_raw()
    }

    /// Take the next received raw frame.
    pub fn receive_raw(&mut self) -> Option<eth::RawFrame> {
        self.eth.receive_raw()
    }

    /// Send a frame with a chosen EtherType.
    pub fn send_raw(
        &mut self,
        dst_addr: EthernetAddress,
        ethertype: EthernetProtocol,
        payload: &[u8],
    ) -> Result<()> {
        eth::Link::new(&mut self.eth, &mut self.device, &self.config, self.now)
            .send_raw(dst_addr, ethertype, payload)
    }

    /// Whether the physical link is up.
    pub fn is_running(&self) -> bool {
        self.device.is_link_up()
    }

    /// The hardware address of the device.
    pub fn hardware_addr(&self) -> EthernetAddress {
        self.device.hardware_addr()
    }

    /// The address configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Change the address configuration.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// The underlying device.
    pub fn device(&self) -> &D {
        &self.device
    }

    /// The underlying device, e.g. to feed an emulated one.
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// The address resolution table.
    pub fn arp(&self) -> &arp::Endpoint {
        self.eth.arp()
    }

    /// The learned routes.
    pub fn routes(&self) -> impl Iterator<Item=&ip::Route> + '_ {
        self.ip.routes()
    }

    /// The link multicast state.
    pub fn eth(&self) -> &eth::Endpoint {
        &self.eth
    }

    /// The ip layer state.
    pub fn ip(&self) -> &ip::Endpoint {
        &self.ip
    }
}
