//! Peer Connection Module
//!
//! Everything a node needs to talk to its neighbors.
//!
//! - **`client`**: the `PeerClient` call-handle abstraction and its HTTP implementation.
//! - **`connector`**: builds the immutable `NodeContext` from the topology and probes
//!   neighbor reachability at startup.

pub mod client;
pub mod connector;


#[cfg(test)]
pub(crate) mod fake;
