//! Topology Model
//!
//! Static description of every node in the deployment: identity, address, role flags,
//! team membership, admission capacity and adjacency.
//!
//! The topology is loaded once at process start and never changes afterwards.
//! Everything downstream (peer connections, role dispatch) is derived from it.
//!
//! ## Submodules
//! - **`types`**: `Node`, `Team`, `Topology` and the resolved `Role`.
//! - **`loader`**: JSON file loading and invariant validation.

pub mod loader;
pub mod types;
