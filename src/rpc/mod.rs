//! RPC Boundary
//!
//! The inbound HTTP surface of a node. Every node serves the same two endpoints;
//! what happens behind `/handle` depends on the node's role.
//!
//! - **`protocol`**: endpoint paths and request/result DTOs.
//! - **`handlers`**: Axum handlers and the router wiring them to the dispatch engine.

pub mod handlers;
pub mod protocol;

#[cfg(test)]
mod tests;
