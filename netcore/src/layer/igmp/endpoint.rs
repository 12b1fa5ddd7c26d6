use crate::config::Limits;
use crate::layer::ip::{Datagram, Sender};
use crate::layer::{Error, Result};
use crate::managed::{Queue, Slots};
use crate::nic::Device;
use crate::time::{Duration, Expiration, Instant};
use crate::wire::{igmp_packet, Checksum, EthernetAddress, IgmpMessage, IgmpRepr};
use crate::wire::{IpProtocol, Ipv4Address};
use crate::wire::igmp::MESSAGE_LEN;

use super::random::Xoroshiro256;

/// A joined host group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HostGroup {
    addr: Ipv4Address,
    refcount: usize,
    /// When our pending report is due.
    deadline: Expiration,
    /// If our report was the last one seen for the group.
    last_reporter: bool,
}

/// The group management engine of an interface.
#[derive(Debug)]
pub struct Endpoint {
    groups: Slots<HostGroup>,

    /// Received igmp datagrams.
    inbound: Queue<Datagram>,

    all_systems_joined: bool,

    /// Until when a version 1 router is assumed on the network.
    v1_router: Expiration,

    last_sweep: Instant,

    random: Xoroshiro256,
}

impl Endpoint {
    /// Delay of the repeated report after joining a group.
    pub const UNSOLICITED_REPORT_INTERVAL: Duration = Duration::from_secs(10);

    /// How long a version 1 router is assumed present after its last query.
    pub const V1_ROUTER_PRESENT_TIMEOUT: Duration = Duration::from_secs(400);

    /// Interval at which due reports are sent.
    pub const SWEEP_INTERVAL: Duration = Duration::from_millis(100);

    /// The response time assumed for queries of version 1 routers, in tenths of a second.
    const V1_MAX_RESP_TIME: u8 = 100;

    /// Create an engine with the table sizes of `limits`.
    ///
    /// Report delays are drawn from a generator seeded with the hardware address so that hosts
    /// on the same network answer a query at different times.
    pub fn new(limits: &Limits, hardware_addr: EthernetAddress) -> Self {
        let seed = hardware_addr.as_bytes().iter()
            .fold(0u64, |seed, &byte| seed << 8 | u64::from(byte));

        Endpoint {
            groups: Slots::new(limits.host_groups),
            inbound: Queue::new(limits.rx_queue),
            all_systems_joined: false,
            v1_router: Expiration::Never,
            last_sweep: Instant::from_millis(0),
            random: Xoroshiro256::new(seed),
        }
    }

    /// Queue a received igmp datagram for processing.
    pub fn receive(&mut self, datagram: Datagram) {
        if self.inbound.push(datagram).is_err() {
            net_warn!("igmp: receive queue full, dropping message");
        }
    }

    /// Join the all-systems group once possible, handle received messages and send due reports.
    pub fn process<D: Device>(&mut self, sender: &mut Sender<D>) {
        let now = sender.now();

        if !self.all_systems_joined && sender.is_link_up() {
            match sender.join_link_group(Ipv4Address::MULTICAST_ALL_SYSTEMS) {
                Ok(()) => self.all_systems_joined = true,
                Err(err) => net_warn!("igmp: can not receive all-systems group: {}", err),
            }
        }

        while let Some(datagram) = self.inbound.pop() {
            self.handle_datagram(&datagram, now);
        }

        if now.duration_since(self.last_sweep) >= Self::SWEEP_INTERVAL {
            self.last_sweep = now;
            self.sweep(sender, now);
        }
    }

    /// Join a host group or add another user to a joined one.
    ///
    /// The first join programs the link filter and sends a report.
    pub fn join_host_group<D: Device>(&mut self, sender: &mut Sender<D>, group: Ipv4Address)
        -> Result<()>
    {
        if !group.is_multicast() || group == Ipv4Address::MULTICAST_ALL_SYSTEMS {
            return Err(Error::Illegal);
        }

        let existing = self.groups.iter_mut()
            .find(|(_, host_group)| host_group.addr == group);
        if let Some((_, host_group)) = existing {
            host_group.refcount += 1;
            return Ok(());
        }

        if self.groups.is_full() {
            net_warn!("igmp: no room to join {}", group);
            return Err(Error::Exhausted);
        }

        sender.join_link_group(group)?;

        let now = sender.now();
        let host_group = HostGroup {
            addr: group,
            refcount: 1,
            deadline: Expiration::When(now + Self::UNSOLICITED_REPORT_INTERVAL),
            last_reporter: true,
        };

        if self.groups.insert(host_group).is_err() {
            let _ = sender.leave_link_group(group);
            return Err(Error::Exhausted);
        }

        net_debug!("igmp: joined {}", group);
        send_report(sender, self.v1_router_present(now), group);
        Ok(())
    }

    /// Remove one user of a host group.
    ///
    /// After the last user is gone the group is left, announced with a leave message if we sent
    /// the last report. A device that refuses to drop the group from its filter only gets a
    /// warning: the group is left regardless and its datagrams are no longer accepted.
    pub fn leave_host_group<D: Device>(&mut self, sender: &mut Sender<D>, group: Ipv4Address)
        -> Result<()>
    {
        if !group.is_multicast() || group == Ipv4Address::MULTICAST_ALL_SYSTEMS {
            return Err(Error::Illegal);
        }

        let key = self.groups.find(|host_group| host_group.addr == group)
            .ok_or(Error::NotFound)?;

        let last_user = match self.groups.get_mut(key) {
            Some(host_group) => {
                host_group.refcount -= 1;
                host_group.refcount == 0
            },
            None => return Err(Error::NotFound),
        };

        if !last_user {
            return Ok(());
        }

        let host_group = self.groups.remove(key).ok_or(Error::NotFound)?;
        net_debug!("igmp: left {}", group);

        if host_group.last_reporter && !self.v1_router_present(sender.now()) {
            send_leave(sender, group);
        }

        if let Err(err) = sender.leave_link_group(group) {
            net_warn!("igmp: link filter still holds {}: {}", group, err);
        }

        Ok(())
    }

    /// If datagrams to a group are accepted.
    pub fn is_member(&self, group: Ipv4Address) -> bool {
        self.groups.find(|host_group| host_group.addr == group).is_some()
    }

    /// The number of joined host groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// If no host group is joined.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// If a version 1 router queried recently.
    pub fn v1_router_present(&self, now: Instant) -> bool {
        self.v1_router.is_armed() && !self.v1_router.is_expired(now)
    }

    fn handle_datagram(&mut self, datagram: &Datagram, now: Instant) {
        if !datagram.dst_addr.is_multicast() {
            net_trace!("igmp: dropping message to {}", datagram.dst_addr);
            return;
        }

        let repr = match igmp_packet::new_checked(&datagram.payload)
            .and_then(|packet| IgmpRepr::parse(packet, Checksum::Manual))
        {
            Ok(repr) => repr,
            Err(err) => {
                net_trace!("igmp: dropping message from {}: {}", datagram.src_addr, err);
                return;
            },
        };

        match repr.message {
            IgmpMessage::MembershipQuery => self.handle_query(repr, now),
            IgmpMessage::MembershipReportV1 | IgmpMessage::MembershipReportV2 => {
                let existing = self.groups.iter_mut()
                    .find(|(_, host_group)| host_group.addr == repr.group_addr);
                if let Some((_, host_group)) = existing {
                    if host_group.deadline.is_armed() {
                        net_trace!("igmp: {} reported by {}", repr.group_addr, datagram.src_addr);
                        host_group.deadline = Expiration::Never;
                        host_group.last_reporter = false;
                    }
                }
            },
            IgmpMessage::LeaveGroup | IgmpMessage::Unknown(_) => (),
        }
    }

    fn handle_query(&mut self, repr: IgmpRepr, now: Instant) {
        let max_resp_time = match repr.max_resp_time {
            0 => {
                net_debug!("igmp: version 1 router present");
                self.v1_router = Expiration::When(now + Self::V1_ROUTER_PRESENT_TIMEOUT);
                Self::V1_MAX_RESP_TIME
            },
            time => time,
        };

        let bound = u64::from(max_resp_time) * 100;
        let random = &mut self.random;

        if repr.group_addr == Ipv4Address::UNSPECIFIED {
            for (_, host_group) in self.groups.iter_mut() {
                let delay = Duration::from_millis(random.below(bound));
                host_group.deadline = Expiration::When(now + delay);
            }
            return;
        }

        let existing = self.groups.iter_mut()
            .find(|(_, host_group)| host_group.addr == repr.group_addr);
        if let Some((_, host_group)) = existing {
            let deadline = Expiration::When(now + Duration::from_millis(random.below(bound)));
            if deadline < host_group.deadline {
                host_group.deadline = deadline;
            }
        }
    }

    fn sweep<D: Device>(&mut self, sender: &mut Sender<D>, now: Instant) {
        if self.v1_router.is_armed() && self.v1_router.is_expired(now) {
            net_debug!("igmp: version 1 router gone");
            self.v1_router = Expiration::Never;
        }

        let v1 = self.v1_router_present(now);
        for (_, host_group) in self.groups.iter_mut() {
            if !host_group.deadline.is_expired(now) {
                continue;
            }

            host_group.deadline = Expiration::Never;
            host_group.last_reporter = true;
            send_report(sender, v1, host_group.addr);
        }
    }
}

fn send_report<D: Device>(sender: &mut Sender<D>, v1: bool, group: Ipv4Address) {
    let message = if v1 {
        IgmpMessage::MembershipReportV1
    } else {
        IgmpMessage::MembershipReportV2
    };

    send_message(sender, message, group, group);
}

fn send_leave<D: Device>(sender: &mut Sender<D>, group: Ipv4Address) {
    send_message(sender, IgmpMessage::LeaveGroup, group, Ipv4Address::MULTICAST_ALL_ROUTERS);
}

fn send_message<D: Device>(
    sender: &mut Sender<D>,
    message: IgmpMessage,
    group: Ipv4Address,
    dst_addr: Ipv4Address,
) {
    let repr = IgmpRepr {
        message,
        max_resp_time: 0,
        group_addr: group,
    };

    let mut packet = [0; MESSAGE_LEN];
    repr.emit(igmp_packet::new_unchecked_mut(&mut packet), Checksum::Manual);

    if let Err(err) = sender.send(dst_addr, &packet, IpProtocol::Igmp, true) {
        net_debug!("igmp: sending {} for {} failed: {}", message, group, err);
    }
}
