//! Fixed-Topology Request Router
//!
//! A small tree of cooperating nodes that answer a "compute" request together. Every
//! node runs the same binary; what it does with a request depends on its role in a
//! static topology loaded at startup.
//!
//! ## Architecture Modules
//! - **`topology`**: The static node list (roles, teams, capacity, adjacency), loaded
//!   from a JSON file and validated once.
//! - **`peers`**: Resolves this node in the topology and installs one call handle per
//!   neighbor, probing reachability without making startup depend on it.
//! - **`dispatch`**: The request handler. The root leader fans out to team leaders and
//!   merges, team leaders apply admission control and forward within their team,
//!   workers only compute.
//! - **`rpc`**: The HTTP/JSON surface (`/handle`, `/health`) served by every node.
//! - **`error`**: Error kinds shared by all of the above and their wire mapping.

pub mod dispatch;
pub mod error;
pub mod peers;
pub mod rpc;
pub mod topology;
