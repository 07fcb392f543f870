//! Peer Connector
//!
//! Turns the global topology plus "this node's" name into a [`NodeContext`]: the node's
//! own record, its resolved role, its neighbor records and one call handle per neighbor.
//!
//! Reachability probing at startup is advisory. A neighbor that does not answer within
//! [`PROBE_WINDOW`] is logged as a warning and its handle is installed anyway, so nodes
//! can be started in any order.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use super::client::{HttpPeer, PeerClient, cluster_client};
use crate::error::{Error, Result};
use crate::topology::types::{Node, Role, Team, Topology};

/// How long startup waits for each neighbor's health endpoint.
pub const PROBE_WINDOW: Duration = Duration::from_secs(2);

/// Outcome of the startup reachability probe for one neighbor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reachability {
    Reachable,
    Unreachable(String),
}

/// Immutable runtime binding of one process to its place in the topology.
pub struct NodeContext {
    me: Node,
    role: Role,
    neighbors: BTreeMap<String, Node>,
    peers: BTreeMap<String, Arc<dyn PeerClient>>,
}

impl NodeContext {
    /// Resolves `self_name` in the topology and installs a call handle for every
    /// neighbor that exists in the topology. Neighbor names with no topology entry
    /// are skipped.
    pub fn build<F>(topology: &Topology, self_name: &str, mut make_peer: F) -> Result<Self>
    where
        F: FnMut(&Node) -> Arc<dyn PeerClient>,
    {
        let me = topology
            .node(self_name)
            .cloned()
            .ok_or_else(|| Error::Config(format!("node {} not found in topology", self_name)))?;
        let role = me.role()?;

        let mut neighbors = BTreeMap::new();
        let mut peers = BTreeMap::new();

        for name in &me.neighbors {
            let Some(neighbor) = topology.node(name) else {
                tracing::debug!("Neighbor {} of {} is not in the topology, skipping", name, me.name);
                continue;
            };

            peers.insert(name.clone(), make_peer(neighbor));
            neighbors.insert(name.clone(), neighbor.clone());
        }

        Ok(Self {
            me,
            role,
            neighbors,
            peers,
        })
    }

    pub fn me(&self) -> &Node {
        &self.me
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Neighbor records keyed by name, iterated in lexicographic order.
    pub fn neighbors(&self) -> &BTreeMap<String, Node> {
        &self.neighbors
    }

    pub fn peer(&self, name: &str) -> Option<&Arc<dyn PeerClient>> {
        self.peers.get(name)
    }

    /// The neighbor leading `team`, first by name if several qualify.
    pub fn team_leader_for(&self, team: Team) -> Option<&Node> {
        self.neighbors
            .values()
            .find(|node| node.is_team_leader && node.team == Some(team))
    }

    /// The first neighbor (by name) in `team`, other than this node.
    pub fn same_team_neighbor(&self, team: Team) -> Option<&Node> {
        self.neighbors
            .values()
            .find(|node| node.team == Some(team) && node.name != self.me.name)
    }

    /// Probes every neighbor once and logs one line per neighbor.
    ///
    /// Never fails: the outcome is returned for diagnostics only.
    pub async fn probe_peers(&self, window: Duration) -> BTreeMap<String, Reachability> {
        let mut report = BTreeMap::new();

        for (name, peer) in &self.peers {
            let addr = self
                .neighbors
                .get(name)
                .map(Node::addr)
                .unwrap_or_default();

            let outcome = match peer.probe(window).await {
                Ok(reply) => {
                    if reply.node != *name {
                        tracing::warn!(
                            "Neighbor {} at {} answered health as {}",
                            name,
                            addr,
                            reply.node
                        );
                    }
                    tracing::info!("Neighbor {} connected at {}", name, addr);
                    Reachability::Reachable
                }
                Err(e) => {
                    tracing::warn!(
                        "Neighbor {} at {} not reachable during startup: {}",
                        name,
                        addr,
                        e
                    );
                    Reachability::Unreachable(e.to_string())
                }
            };

            report.insert(name.clone(), outcome);
        }

        report
    }
}

/// Builds the context for `self_name` with HTTP call handles and probes each neighbor.
pub async fn connect(topology: &Topology, self_name: &str) -> Result<NodeContext> {
    let http_client = cluster_client()?;
    let ctx = NodeContext::build(topology, self_name, |node| {
        Arc::new(HttpPeer::new(http_client.clone(), node)) as Arc<dyn PeerClient>
    })?;

    ctx.probe_peers(PROBE_WINDOW).await;

    Ok(ctx)
}
