use alloc::vec::Vec;

use crate::layer::fixture::*;
use crate::layer::Error;
use crate::time::Instant;
use crate::wire::{igmp_packet, Checksum, EthernetAddress, IgmpMessage, IgmpRepr, IpProtocol};
use crate::wire::{Ipv4Address, Ipv4Repr};

use super::Endpoint;

const MDNS_GROUP: Ipv4Address = Ipv4Address::new(224, 0, 0, 251);
const OTHER_GROUP: Ipv4Address = Ipv4Address::new(239, 1, 1, 1);

/// The igmp messages in sent frames.
fn messages(frames: &[Vec<u8>]) -> Vec<(Ipv4Repr, IgmpRepr)> {
    frames.iter()
        .map(|frame| {
            let (ip, payload) = parse_ip(frame);
            assert_eq!(ip.protocol, IpProtocol::Igmp);
            let packet = igmp_packet::new_checked(payload).unwrap();
            (ip, IgmpRepr::parse(packet, Checksum::Manual).unwrap())
        })
        .collect()
}

fn report(group: Ipv4Address) -> IgmpRepr {
    IgmpRepr {
        message: IgmpMessage::MembershipReportV2,
        max_resp_time: 0,
        group_addr: group,
    }
}

/// A host that is up and already receives the all-systems group.
fn running_host() -> Host {
    let mut host = Host::new(config());
    host.process(Instant::from_millis(0));
    host
}

#[test]
fn all_systems_at_link_up() {
    let mut host = Host::new(config());
    host.nic.set_link_up(false);
    host.process(Instant::from_millis(0));
    assert!(host.nic.multicast_filter().is_empty());

    host.nic.set_link_up(true);
    host.process(Instant::from_millis(10));
    let all_systems = EthernetAddress::from_ipv4_multicast(Ipv4Address::MULTICAST_ALL_SYSTEMS);
    assert_eq!(host.nic.multicast_filter(), &[all_systems]);

    // Never reported and not a host group.
    assert!(host.nic.sent().is_empty());
    assert!(host.ip.igmp().is_empty());
}

#[test]
fn join_reports_twice() {
    let mut host = running_host();
    host.join(MDNS_GROUP, Instant::from_millis(0)).unwrap();

    assert!(host.ip.igmp().is_member(MDNS_GROUP));
    assert!(host.nic.multicast_filter().contains(&EthernetAddress::from_ipv4_multicast(MDNS_GROUP)));

    let sent = messages(&host.nic.take_sent());
    assert_eq!(sent.len(), 1);
    let (ip, igmp) = sent[0];
    assert_eq!(ip.src_addr, HOST_IP);
    assert_eq!(ip.dst_addr, MDNS_GROUP);
    assert_eq!(ip.hop_limit, 1);
    assert!(ip.router_alert);
    assert_eq!(igmp, report(MDNS_GROUP));

    host.process(Instant::from_millis(9_900));
    assert!(host.nic.sent().is_empty());

    host.process(Instant::from_millis(0) + Endpoint::UNSOLICITED_REPORT_INTERVAL);
    let sent = messages(&host.nic.take_sent());
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].1, report(MDNS_GROUP));

    host.process(Instant::from_secs(30));
    assert!(host.nic.sent().is_empty());
}

#[test]
fn join_counts_users() {
    let mut host = running_host();
    let now = Instant::from_millis(0);

    host.join(MDNS_GROUP, now).unwrap();
    host.join(MDNS_GROUP, now).unwrap();
    assert_eq!(host.ip.igmp().len(), 1);
    assert_eq!(messages(&host.nic.take_sent()).len(), 1);

    host.leave(MDNS_GROUP, now).unwrap();
    assert!(host.ip.igmp().is_member(MDNS_GROUP));
    assert!(host.nic.sent().is_empty());

    host.leave(MDNS_GROUP, now).unwrap();
    assert!(!host.ip.igmp().is_member(MDNS_GROUP));
    assert!(!host.nic.multicast_filter().contains(&EthernetAddress::from_ipv4_multicast(MDNS_GROUP)));
    assert_eq!(host.leave(MDNS_GROUP, now), Err(Error::NotFound));
}

#[test]
fn join_rejects_non_groups() {
    let mut host = running_host();
    let now = Instant::from_millis(0);

    assert_eq!(host.join(PEER_IP, now), Err(Error::Illegal));
    assert_eq!(host.join(Ipv4Address::MULTICAST_ALL_SYSTEMS, now), Err(Error::Illegal));
    assert!(host.nic.sent().is_empty());
}

#[test]
fn leave_rejects_non_groups() {
    let mut host = running_host();
    let now = Instant::from_millis(0);
    let all_systems = EthernetAddress::from_ipv4_multicast(Ipv4Address::MULTICAST_ALL_SYSTEMS);

    assert_eq!(host.leave(PEER_IP, now), Err(Error::Illegal));
    assert_eq!(host.leave(Ipv4Address::MULTICAST_ALL_SYSTEMS, now), Err(Error::Illegal));
    assert_eq!(host.nic.multicast_filter(), &[all_systems]);
    assert!(host.nic.sent().is_empty());
}

#[test]
fn leave_announced() {
    let mut host = running_host();
    let now = Instant::from_millis(0);

    host.join(MDNS_GROUP, now).unwrap();
    host.leave(MDNS_GROUP, now).unwrap();

    let sent = host.nic.take_sent();
    assert_eq!(
        parse_frame(&sent[1]).0.dst_addr,
        EthernetAddress::from_ipv4_multicast(Ipv4Address::MULTICAST_ALL_ROUTERS));

    let sent = messages(&sent);
    assert_eq!(sent.len(), 2);
    let (ip, igmp) = sent[1];
    assert_eq!(ip.dst_addr, Ipv4Address::MULTICAST_ALL_ROUTERS);
    assert!(ip.router_alert);
    assert_eq!(igmp, IgmpRepr {
        message: IgmpMessage::LeaveGroup,
        max_resp_time: 0,
        group_addr: MDNS_GROUP,
    });
}

#[test]
fn leave_despite_filter_refusal() {
    let mut host = running_host();
    let now = Instant::from_millis(0);
    let mdns = EthernetAddress::from_ipv4_multicast(MDNS_GROUP);

    host.join(MDNS_GROUP, now).unwrap();
    host.nic.take_sent();
    host.nic.set_filter_support(false);

    assert_eq!(host.leave(MDNS_GROUP, now), Ok(()));
    assert!(!host.ip.igmp().is_member(MDNS_GROUP));
    assert!(host.nic.multicast_filter().contains(&mdns));

    let sent = messages(&host.nic.take_sent());
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].1.message, IgmpMessage::LeaveGroup);
}

#[test]
fn answer_general_query() {
    let mut host = running_host();
    host.join(MDNS_GROUP, Instant::from_millis(0)).unwrap();
    host.join(OTHER_GROUP, Instant::from_millis(0)).unwrap();
    host.nic.take_sent();

    // At most one second to answer.
    let query = igmp_message(IgmpMessage::MembershipQuery, 10, Ipv4Address::UNSPECIFIED);
    let frame = ip_frame(GATEWAY_IP, Ipv4Address::MULTICAST_ALL_SYSTEMS, IpProtocol::Igmp, &query);
    host.deliver(&frame, Instant::from_millis(1_000));
    host.process(Instant::from_millis(2_000));

    let mut groups: Vec<Ipv4Address> = messages(&host.nic.take_sent()).iter()
        .map(|(_, igmp)| igmp.group_addr)
        .collect();
    groups.sort();
    assert_eq!(groups, [MDNS_GROUP, OTHER_GROUP]);

    // Answering replaced the pending unsolicited reports.
    host.process(Instant::from_secs(20));
    assert!(host.nic.sent().is_empty());
}

#[test]
fn answer_group_query() {
    let mut host = running_host();
    host.join(MDNS_GROUP, Instant::from_millis(0)).unwrap();
    host.join(OTHER_GROUP, Instant::from_millis(0)).unwrap();
    host.nic.take_sent();

    let query = igmp_message(IgmpMessage::MembershipQuery, 10, MDNS_GROUP);
    host.deliver(&ip_frame(GATEWAY_IP, MDNS_GROUP, IpProtocol::Igmp, &query), Instant::from_millis(1_000));
    host.process(Instant::from_millis(2_000));

    let sent = messages(&host.nic.take_sent());
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].1, report(MDNS_GROUP));

    // The other group still reports on its own schedule.
    host.process(Instant::from_secs(10));
    let sent = messages(&host.nic.take_sent());
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].1, report(OTHER_GROUP));
}

#[test]
fn ignore_unicast_query() {
    let mut host = running_host();
    host.join(MDNS_GROUP, Instant::from_millis(0)).unwrap();
    host.nic.take_sent();

    let query = igmp_message(IgmpMessage::MembershipQuery, 10, Ipv4Address::UNSPECIFIED);
    host.deliver(&ip_frame(GATEWAY_IP, HOST_IP, IpProtocol::Igmp, &query), Instant::from_millis(1_000));
    host.process(Instant::from_millis(2_000));

    assert!(host.nic.sent().is_empty());
}

#[test]
fn ignore_bad_checksum_query() {
    let mut host = running_host();
    host.join(MDNS_GROUP, Instant::from_millis(0)).unwrap();
    host.nic.take_sent();

    let mut query = igmp_message(IgmpMessage::MembershipQuery, 10, Ipv4Address::UNSPECIFIED);
    query[2] ^= 0xff;
    let frame = ip_frame(GATEWAY_IP, Ipv4Address::MULTICAST_ALL_SYSTEMS, IpProtocol::Igmp, &query);
    host.deliver(&frame, Instant::from_millis(1_000));
    host.process(Instant::from_millis(2_000));

    assert!(host.nic.sent().is_empty());
}

#[test]
fn other_report_suppresses() {
    let mut host = running_host();
    host.join(MDNS_GROUP, Instant::from_millis(0)).unwrap();
    host.nic.take_sent();

    let other = igmp_message(IgmpMessage::MembershipReportV2, 0, MDNS_GROUP);
    host.deliver(&ip_frame(PEER_IP, MDNS_GROUP, IpProtocol::Igmp, &other), Instant::from_millis(1_000));

    // No repeated report.
    host.process(Instant::from_secs(11));
    assert!(host.nic.sent().is_empty());

    // And the other member is left to announce the leave.
    host.leave(MDNS_GROUP, Instant::from_secs(11)).unwrap();
    assert!(host.nic.sent().is_empty());
}

#[test]
fn version_one_router() {
    let mut host = running_host();
    host.join(MDNS_GROUP, Instant::from_millis(0)).unwrap();
    host.nic.take_sent();

    let query = igmp_message(IgmpMessage::MembershipQuery, 0, Ipv4Address::UNSPECIFIED);
    let frame = ip_frame(GATEWAY_IP, Ipv4Address::MULTICAST_ALL_SYSTEMS, IpProtocol::Igmp, &query);
    host.deliver(&frame, Instant::from_secs(1));
    assert!(host.ip.igmp().v1_router_present(Instant::from_secs(1)));

    // Version 1 queries allow ten seconds.
    host.process(Instant::from_secs(11));
    let sent = messages(&host.nic.take_sent());
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].1.message, IgmpMessage::MembershipReportV1);

    // Even though we reported last, no leave while the old router is around.
    host.leave(MDNS_GROUP, Instant::from_secs(11)).unwrap();
    assert!(host.nic.sent().is_empty());

    assert!(host.ip.igmp().v1_router_present(Instant::from_secs(400)));
    assert!(!host.ip.igmp().v1_router_present(Instant::from_secs(401)));
}

#[test]
fn version_one_router_times_out() {
    let mut host = running_host();

    let query = igmp_message(IgmpMessage::MembershipQuery, 0, Ipv4Address::UNSPECIFIED);
    let frame = ip_frame(GATEWAY_IP, Ipv4Address::MULTICAST_ALL_SYSTEMS, IpProtocol::Igmp, &query);
    host.deliver(&frame, Instant::from_secs(1));

    host.process(Instant::from_secs(402));
    host.join(MDNS_GROUP, Instant::from_secs(402)).unwrap();

    let sent = messages(&host.nic.take_sent());
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].1, report(MDNS_GROUP));
}
