use crate::config::Limits;
use crate::layer::ip::{Datagram, Sender};
use crate::managed::Queue;
use crate::nic::Device;
use crate::wire::{icmpv4_packet, Checksum, Icmpv4DstUnreachable, Icmpv4Embedded, Icmpv4Message};
use crate::wire::{Icmpv4Repr, IpProtocol};

use super::Notification;

/// The icmp engine of an interface.
#[derive(Debug)]
pub struct Endpoint {
    /// Received icmp datagrams.
    inbound: Queue<Datagram>,

    notifications: Queue<Notification>,
}

impl Endpoint {
    /// Create an engine with the queue depths of `limits`.
    pub fn new(limits: &Limits) -> Self {
        Endpoint {
            inbound: Queue::new(limits.rx_queue),
            notifications: Queue::new(limits.notifications),
        }
    }

    /// Queue a received icmp datagram for processing.
    pub fn receive(&mut self, datagram: Datagram) {
        if self.inbound.push(datagram).is_err() {
            net_warn!("icmp: receive queue full, dropping message");
        }
    }

    /// Handle all queued messages.
    pub fn process<D: Device>(&mut self, sender: &mut Sender<D>) {
        while let Some(datagram) = self.inbound.pop() {
            self.handle_datagram(sender, datagram);
        }
    }

    /// Notify the transport that a datagram sent from here could not be delivered.
    ///
    /// `packet` is the complete ip packet. Nothing is sent to the network.
    pub fn destination_unreachable(&mut self, code: Icmpv4DstUnreachable, packet: &[u8]) {
        match Icmpv4Embedded::parse(packet) {
            Ok(quoted) => self.notify(Icmpv4Message::DstUnreachable, code.into(), quoted),
            Err(err) => net_trace!("icmp: can not report undeliverable packet: {}", err),
        }
    }

    /// Queue a notification about the quoted datagram.
    pub fn notify(&mut self, message: Icmpv4Message, code: u8, quoted: Icmpv4Embedded) {
        let notification = Notification::new(message, code, &quoted);
        net_debug!("icmp: {} for datagram to {}", message, quoted.dst_addr);
        if self.notifications.push(notification).is_err() {
            net_warn!("icmp: notification queue full, dropping {}", message);
        }
    }

    /// Take the oldest notification.
    pub fn receive_notification(&mut self) -> Option<Notification> {
        self.notifications.pop()
    }

    fn handle_datagram<D: Device>(&mut self, sender: &mut Sender<D>, mut datagram: Datagram) {
        let repr = match icmpv4_packet::new_checked(&datagram.payload)
            .and_then(|packet| Icmpv4Repr::parse(packet, Checksum::Manual))
        {
            Ok(repr) => repr,
            Err(err) => {
                net_trace!("icmp: dropping message from {}: {}", datagram.src_addr, err);
                return;
            },
        };

        let config = sender.config();
        match repr {
            Icmpv4Repr::EchoRequest { .. } => {
                if config.is_unset() || datagram.dst_addr != config.address() {
                    return;
                }

                let reply = match repr.echo_reply() {
                    Some(reply) => reply,
                    None => return,
                };

                reply.emit(icmpv4_packet::new_unchecked_mut(&mut datagram.payload), Checksum::Manual);
                if let Err(err) = sender.send(
                    datagram.src_addr,
                    &datagram.payload,
                    IpProtocol::Icmp,
                    false)
                {
                    net_debug!("icmp: echo reply to {} failed: {}", datagram.src_addr, err);
                }
            },
            Icmpv4Repr::DstUnreachable { .. }
            | Icmpv4Repr::TimeExceeded { .. }
            | Icmpv4Repr::ParamProblem { .. } => {
                let quoted = match self.quoted(&datagram) {
                    Some(quoted) => quoted,
                    None => return,
                };

                if config.is_unset() || quoted.src_addr != config.address() {
                    net_trace!("icmp: ignoring error about datagram from {}", quoted.src_addr);
                    return;
                }

                self.notify(repr.message(), repr.code(), quoted);
            },
            Icmpv4Repr::Redirect { gateway, .. } => {
                let quoted = match self.quoted(&datagram) {
                    Some(quoted) => quoted,
                    None => return,
                };

                if !config.on_link(gateway) {
                    net_trace!("icmp: ignoring redirect to off-link {}", gateway);
                    return;
                }
                if gateway == config.address() || config.is_broadcast(gateway) {
                    net_trace!("icmp: ignoring redirect to {}", gateway);
                    return;
                }

                match sender.next_hop(quoted.dst_addr) {
                    Ok(router) if router == datagram.src_addr => {
                        net_debug!("icmp: redirected to {} via {}", quoted.dst_addr, gateway);
                        sender.add_route(quoted.dst_addr, gateway);
                    },
                    _ => net_trace!("icmp: ignoring redirect from {}", datagram.src_addr),
                }
            },
            Icmpv4Repr::EchoReply { .. } => (),
        }
    }

    fn quoted(&self, datagram: &Datagram) -> Option<Icmpv4Embedded> {
        let packet = icmpv4_packet::new_unchecked(&datagram.payload);
        match Icmpv4Embedded::parse(packet.payload_slice()) {
            Ok(quoted) => Some(quoted),
            Err(err) => {
                net_trace!("icmp: dropping error with bad quote: {}", err);
                None
            },
        }
    }
}
