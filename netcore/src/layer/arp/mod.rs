//! Resolving ipv4 addresses to link addresses.
//!
//! As noted in RFC 826, arp assumes that at least the mapping and identities of the own host are
//! fully known to the resolver. We keep a small table of the hosts we are immediately talking to
//! and park outgoing frames on an entry while its address is still being looked for.
//!
//! An entry moves through the states of [`State`]:
//!
//! * `RequestSent` after a request has been broadcast, with a deadline for the answer.
//! * `RetryRequest` when the deadline passed. The next processing step either sends the request
//!   again or gives up, handing all parked frames back as failed.
//! * `SendQueuedFrames` once the answer arrived. The parked frames are sent in the order they were
//!   queued.
//! * `Valid` afterwards, until the entry was unused for [`Endpoint::ENTRY_LIFETIME`] or is
//!   replaced by a newer resolution.
//!
//! [`State`]: enum.State.html
//! [`Endpoint::ENTRY_LIFETIME`]: struct.Endpoint.html#associatedconstant.ENTRY_LIFETIME
mod endpoint;
mod neighbor;

pub use endpoint::{Endpoint, Resolution};
pub use neighbor::State;
