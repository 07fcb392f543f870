//! Dispatch Engine
//!
//! The request-handling state machine run by every node.
//!
//! ## Submodules
//! - **`handler`**: role dispatch (root leader, team leader, worker) and result merging.
//! - **`admission`**: the per-process inflight counter and its release-on-drop permit.
//! - **`work`**: the deterministic local work function.

pub mod admission;
pub mod handler;
pub mod work;
