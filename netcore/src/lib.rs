//! An IPv4 protocol engine for user-space networking and unikernels.
//!
//! ## Table of contents
//!
//! 1. [Design](#design)
//! 2. [The wire module](wire/index.html)
//! 3. [The layers](layer/index.html)
//!    1. [Address resolution](layer/arp/index.html)
//!    1. [The eth layer](layer/eth/index.html)
//!    1. [The ip layer](layer/ip/index.html)
//!    1. [Control messages](layer/icmp/index.html)
//!    1. [Group management](layer/igmp/index.html)
//! 4. [Network interfaces](nic/index.html)
//! 5. [The interface context](iface/index.html)
//!
//! ## Design
//!
//! The crate turns raw link-layer frames into IPv4 datagrams and back. It resolves link
//! addresses, answers echo requests, republishes remote control messages as notifications and
//! maintains multicast group memberships. Transport protocols sit above it and consume the
//! datagram queues, a network device sits below it behind the [`Device`] trait.
//!
//! All state is owned by one [`Interface`] per network device. There is no global state and no
//! background activity: every timer is an explicit deadline that is compared against the
//! timestamp handed to [`Interface::process`]. Calling it repeatedly from a single loop is all
//! the scheduling the stack needs.
//!
//! Every table has a fixed capacity chosen up front through [`Limits`]. Resolution entries and
//! cached routes are replaced by least recent use when a table fills up, everything else reports
//! [`layer::Error::Exhausted`] to the caller.
//!
//! Received bytes are untrusted. Each packet type in [`wire`] checks the buffer length before
//! any field is accessed and malformed packets are dropped without side effects.
//!
//! [`Device`]: nic/trait.Device.html
//! [`Interface`]: iface/struct.Interface.html
//! [`Interface::process`]: iface/struct.Interface.html#method.process
//! [`Limits`]: config/struct.Limits.html
//! [`layer::Error::Exhausted`]: layer/enum.Error.html#variant.Exhausted
//! [`wire`]: wire/index.html
#![warn(missing_docs)]
#![warn(unreachable_pub)]

// tests should be able to use `std`
#![cfg_attr(all(
    not(feature = "std"),
    not(test)),
no_std)]

#[macro_use] extern crate alloc;

#[macro_use] mod macros;
pub mod config;
pub mod iface;
pub mod layer;
pub mod managed;
pub mod nic;
pub mod time;
pub mod wire;

pub use config::{Config, Limits};
pub use iface::Interface;
