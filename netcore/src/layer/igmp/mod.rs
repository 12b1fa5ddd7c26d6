//! Host group management with IGMP.
//!
//! Implements the host side of version 2 (RFC 2236) with fallback to version 1 (RFC 1112).
//!
//! A joined group is announced with a report right away and once more after
//! [`Endpoint::UNSOLICITED_REPORT_INTERVAL`]. Queries of a router arm a random delay per group,
//! bounded by the maximum response time of the query. A report of another member for the same
//! group cancels our pending report, and then that member is the one to send the leave message.
//!
//! A query without maximum response time comes from a version 1 router. For the following
//! [`Endpoint::V1_ROUTER_PRESENT_TIMEOUT`] reports use the version 1 format and leave messages are
//! suppressed.
//!
//! The all-systems group is joined at the link as soon as the link is up. It is never reported.
//!
//! [`Endpoint::UNSOLICITED_REPORT_INTERVAL`]: struct.Endpoint.html#associatedconstant.UNSOLICITED_REPORT_INTERVAL
//! [`Endpoint::V1_ROUTER_PRESENT_TIMEOUT`]: struct.Endpoint.html#associatedconstant.V1_ROUTER_PRESENT_TIMEOUT
mod endpoint;
mod random;
#[cfg(test)]
mod tests;

pub use endpoint::Endpoint;
