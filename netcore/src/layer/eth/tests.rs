use crate::config::Limits;
use crate::layer::fixture::*;
use crate::layer::Error;
use crate::time::{Duration, Instant};
use crate::wire::{ArpOperation, EthernetAddress, EthernetProtocol, IpProtocol, Ipv4Address};
use crate::wire::ETHERNET_HEADER_LEN;

use super::{Endpoint, Link, RawFrame, MTU};

const MDNS_GROUP: Ipv4Address = Ipv4Address::new(224, 0, 0, 251);
const MDNS_MAC: EthernetAddress = EthernetAddress([0x01, 0x00, 0x5e, 0x00, 0x00, 0xfb]);
const EXPERIMENTAL: EthernetProtocol = EthernetProtocol::Unknown(0x88b5);

#[test]
fn drop_runt_frames() {
    let mut nic = nic();
    let config = config();
    let mut eth = Endpoint::new(&Limits::default());

    nic.push_rx(&[0xff; ETHERNET_HEADER_LEN]);
    nic.push_rx(&[0xff; 6]);
    eth.process(&mut nic, &config, Instant::from_millis(0));

    assert_eq!(nic.to_recv(), 0);
    assert!(eth.receive().is_none());
    assert!(eth.arp().is_empty());
}

#[test]
fn destination_filter() {
    let mut nic = nic();
    let config = config();
    let mut eth = Endpoint::new(&Limits::default());
    let packet = ip_packet(PEER_IP, HOST_IP, IpProtocol::Udp, &[0; 8]);

    nic.push_rx(&frame(PEER_MAC, HOST_MAC, EthernetProtocol::Ipv4, &packet));
    nic.push_rx(&frame(PEER_MAC, EthernetAddress::BROADCAST, EthernetProtocol::Ipv4, &packet));
    // For another station.
    nic.push_rx(&frame(PEER_MAC, GATEWAY_MAC, EthernetProtocol::Ipv4, &packet));
    // For a group we are not a member of.
    nic.push_rx(&frame(PEER_MAC, MDNS_MAC, EthernetProtocol::Ipv4, &packet));
    eth.process(&mut nic, &config, Instant::from_millis(0));

    assert_eq!(eth.receive(), Some(packet.clone()));
    assert_eq!(eth.receive(), Some(packet.clone()));
    assert_eq!(eth.receive(), None);

    Link::new(&mut eth, &mut nic, &config, Instant::from_millis(0))
        .join_group(MDNS_GROUP)
        .unwrap();
    nic.push_rx(&frame(PEER_MAC, MDNS_MAC, EthernetProtocol::Ipv4, &packet));
    eth.process(&mut nic, &config, Instant::from_millis(0));
    assert_eq!(eth.receive(), Some(packet));
}

#[test]
fn loopback() {
    let mut nic = nic();
    let config = config();
    let mut eth = Endpoint::new(&Limits::default());
    let packet = ip_packet(HOST_IP, HOST_IP, IpProtocol::Udp, &[1, 2, 3, 4]);

    Link::new(&mut eth, &mut nic, &config, Instant::from_millis(0))
        .send(HOST_IP, &packet)
        .unwrap();

    assert!(nic.sent().is_empty());
    assert_eq!(eth.receive(), Some(packet));
}

#[test]
fn broadcast_and_multicast_destinations() {
    let mut nic = nic();
    let config = config();
    let mut eth = Endpoint::new(&Limits::default());
    let packet = ip_packet(HOST_IP, Ipv4Address::BROADCAST, IpProtocol::Udp, &[0; 8]);

    {
        let mut link = Link::new(&mut eth, &mut nic, &config, Instant::from_millis(0));
        link.send(Ipv4Address::BROADCAST, &packet).unwrap();
        link.send(Ipv4Address::new(10, 0, 0, 255), &packet).unwrap();
        link.send(MDNS_GROUP, &packet).unwrap();
    }

    let destinations: Vec<EthernetAddress> = nic.sent().iter()
        .map(|frame| parse_frame(frame).0.dst_addr)
        .collect();
    assert_eq!(destinations, [EthernetAddress::BROADCAST, EthernetAddress::BROADCAST, MDNS_MAC]);

    // Nothing needed resolving.
    assert!(eth.arp().is_empty());
    let (_, payload) = parse_frame(&nic.sent()[0]);
    assert_eq!(payload, &packet[..]);
}

#[test]
fn unicast_waits_for_resolution() {
    let mut nic = nic();
    let config = config();
    let mut eth = Endpoint::new(&Limits::default());
    let packet = ip_packet(HOST_IP, PEER_IP, IpProtocol::Udp, &[9; 12]);
    let now = Instant::from_millis(0);

    Link::new(&mut eth, &mut nic, &config, now)
        .send(PEER_IP, &packet)
        .unwrap();

    let sent = nic.take_sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(parse_arp(&sent[0]).0.dst_addr, EthernetAddress::BROADCAST);

    nic.push_rx(&arp_frame(ArpOperation::Reply, PEER_MAC, PEER_IP, HOST_MAC, HOST_IP));
    eth.process(&mut nic, &config, now);

    let sent = nic.take_sent();
    assert_eq!(sent.len(), 1);
    let (repr, payload) = parse_frame(&sent[0]);
    assert_eq!(repr.dst_addr, PEER_MAC);
    assert_eq!(repr.src_addr, HOST_MAC);
    assert_eq!(repr.ethertype, EthernetProtocol::Ipv4);
    assert_eq!(payload, &packet[..]);

    // Now sent right away.
    Link::new(&mut eth, &mut nic, &config, now)
        .send(PEER_IP, &packet)
        .unwrap();
    assert_eq!(nic.take_sent().len(), 1);
}

#[test]
fn failed_resolution() {
    let mut nic = nic();
    let config = config();
    let mut eth = Endpoint::new(&Limits::default());
    let packet = ip_packet(HOST_IP, PEER_IP, IpProtocol::Udp, &[9; 12]);
    let start = Instant::from_millis(0);

    Link::new(&mut eth, &mut nic, &config, start)
        .send(PEER_IP, &packet)
        .unwrap();

    for step in 1..=4 {
        eth.process(&mut nic, &config, start + Duration::from_millis(800) * step);
    }

    assert_eq!(nic.sent().len(), 4);
    assert_eq!(eth.take_failed(), Some(packet));
    assert_eq!(eth.take_failed(), None);
}

#[test]
fn bad_sizes() {
    let mut nic = nic();
    let config = config();
    let mut eth = Endpoint::new(&Limits::default());
    let mut link = Link::new(&mut eth, &mut nic, &config, Instant::from_millis(0));

    assert_eq!(link.send(Ipv4Address::BROADCAST, &[]), Err(Error::BadSize));
    assert_eq!(link.send(Ipv4Address::BROADCAST, &[0; MTU + 1]), Err(Error::BadSize));
    assert_eq!(link.send(Ipv4Address::UNSPECIFIED, &[0; 20]), Err(Error::Unreachable));
    assert_eq!(link.send_raw(PEER_MAC, EXPERIMENTAL, &[]), Err(Error::BadSize));
}

#[test]
fn device_refuses() {
    let mut nic = nic();
    nic.set_send_failure(true);
    let config = config();
    let mut eth = Endpoint::new(&Limits::default());

    let result = Link::new(&mut eth, &mut nic, &config, Instant::from_millis(0))
        .send(Ipv4Address::BROADCAST, &[0; 20]);
    assert_eq!(result, Err(Error::Exhausted));
}

#[test]
fn group_reference_count() {
    let mut nic = nic();
    let config = config();
    let mut eth = Endpoint::new(&Limits::default());

    {
        let mut link = Link::new(&mut eth, &mut nic, &config, Instant::from_millis(0));
        link.join_group(MDNS_GROUP).unwrap();
        link.join_group(MDNS_GROUP).unwrap();
    }
    assert_eq!(nic.multicast_filter(), &[MDNS_MAC]);
    assert_eq!(eth.group_count(), 1);

    Link::new(&mut eth, &mut nic, &config, Instant::from_millis(0))
        .leave_group(MDNS_GROUP)
        .unwrap();
    assert!(eth.is_group_member(MDNS_MAC));
    assert_eq!(nic.multicast_filter(), &[MDNS_MAC]);

    let mut link = Link::new(&mut eth, &mut nic, &config, Instant::from_millis(0));
    link.leave_group(MDNS_GROUP).unwrap();
    assert_eq!(link.leave_group(MDNS_GROUP), Err(Error::NotFound));
    assert_eq!(link.join_group(PEER_IP), Err(Error::Illegal));
    drop(link);

    assert!(!eth.is_group_member(MDNS_MAC));
    assert!(nic.multicast_filter().is_empty());
}

#[test]
fn group_filter_rollback() {
    let mut nic = nic();
    nic.set_filter_support(false);
    let config = config();
    let mut eth = Endpoint::new(&Limits::default());

    let result = Link::new(&mut eth, &mut nic, &config, Instant::from_millis(0))
        .join_group(MDNS_GROUP);
    assert_eq!(result, Err(Error::Illegal));
    assert!(!eth.is_group_member(MDNS_MAC));
    assert_eq!(eth.group_count(), 0);
}

#[test]
fn group_table_full() {
    let mut nic = nic();
    let config = config();
    let limits = Limits { link_groups: 1, ..Limits::default() };
    let mut eth = Endpoint::new(&limits);
    let mut link = Link::new(&mut eth, &mut nic, &config, Instant::from_millis(0));

    link.join_group(MDNS_GROUP).unwrap();
    assert_eq!(link.join_group(Ipv4Address::MULTICAST_ALL_SYSTEMS), Err(Error::Exhausted));
}

#[test]
fn raw_passthrough() {
    let mut nic = nic();
    let config = config();
    let mut eth = Endpoint::new(&Limits::default());

    assert_eq!(eth.enable_receive_raw(EthernetProtocol::Ipv4), Err(Error::Illegal));
    assert_eq!(eth.enable_receive_raw(EthernetProtocol::Arp), Err(Error::Illegal));
    eth.enable_receive_raw(EXPERIMENTAL).unwrap();
    assert_eq!(eth.enable_receive_raw(EXPERIMENTAL), Err(Error::Illegal));

    nic.push_rx(&frame(PEER_MAC, HOST_MAC, EXPERIMENTAL, &[1, 2, 3]));
    // Other unknown types are dropped.
    nic.push_rx(&frame(PEER_MAC, HOST_MAC, EthernetProtocol::Ipv6, &[4, 5, 6]));
    eth.process(&mut nic, &config, Instant::from_millis(0));

    assert_eq!(eth.receive_raw(), Some(RawFrame {
        src_addr: PEER_MAC,
        ethertype: EXPERIMENTAL,
        payload: vec![1, 2, 3],
    }));
    assert_eq!(eth.receive_raw(), None);

    nic.push_rx(&frame(PEER_MAC, HOST_MAC, EXPERIMENTAL, &[1, 2, 3]));
    eth.process(&mut nic, &config, Instant::from_millis(0));
    eth.disable_receive_raw();
    assert_eq!(eth.receive_raw(), None);

    Link::new(&mut eth, &mut nic, &config, Instant::from_millis(0))
        .send_raw(PEER_MAC, EXPERIMENTAL, &[7, 7])
        .unwrap();
    let (repr, payload) = parse_frame(&nic.sent()[0]);
    assert_eq!(repr.dst_addr, PEER_MAC);
    assert_eq!(repr.ethertype, EXPERIMENTAL);
    assert_eq!(payload, &[7, 7][..]);
}
