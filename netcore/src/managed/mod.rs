//! Fixed capacity containers.
//!
//! The stack never grows a table after construction. Each container is allocated once with the
//! capacity configured in [`Limits`] and refuses further elements when it is full, leaving the
//! eviction policy to its owner.
//!
//! [`Limits`]: ../config/struct.Limits.html
mod queue;
mod slots;

pub use queue::Queue;
pub use slots::{Key, Slots};
