use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "UPPERCASE")]
pub enum Team {
    Green,
    Pink,
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::Green => write!(f, "GREEN"),
            Team::Pink => write!(f, "PINK"),
        }
    }
}

/// A single entry of the topology.
///
/// Role flags are kept exactly as they appear in the topology file; use
/// [`Node::role`] to get the resolved role.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Node {
    pub name: String,
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub is_leader: bool,
    #[serde(default)]
    pub is_team_leader: bool,
    #[serde(default)]
    pub team: Option<Team>,
    /// Maximum concurrent requests accepted as a team leader. `0` means unlimited.
    #[serde(default)]
    pub max_inflight: u32,
    /// Names this node may call, in topology order.
    #[serde(default)]
    pub neighbors: Vec<String>,
}

impl Node {
    /// Network address in `host:port` form.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Resolves the role flags into a single [`Role`].
    ///
    /// The leader flag wins over the team-leader flag. A team leader without a team
    /// is a configuration error.
    pub fn role(&self) -> Result<Role> {
        if self.is_leader {
            return Ok(Role::RootLeader);
        }

        if self.is_team_leader {
            return match self.team {
                Some(team) => Ok(Role::TeamLeader(team)),
                None => Err(Error::Config(format!(
                    "team leader {} has no team",
                    self.name
                ))),
            };
        }

        Ok(Role::Worker(self.team))
    }
}

/// What a node does with an inbound request. Resolved once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Fans out to team leaders and merges their results.
    RootLeader,
    /// Admission control, local work, then one optional in-team forward.
    TeamLeader(Team),
    /// Local work only.
    Worker(Option<Team>),
}

/// The complete static deployment description.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Topology {
    pub nodes: Vec<Node>,
}

impl Topology {
    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.name == name)
    }

    /// The unique root leader, if present.
    pub fn leader(&self) -> Option<&Node> {
        self.nodes.iter().find(|node| node.is_leader)
    }

    /// Checks the structural invariants of the topology.
    ///
    /// Unknown neighbor names are allowed; the peer connector skips them.
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for node in &self.nodes {
            if !seen.insert(node.name.as_str()) {
                return Err(Error::Config(format!("duplicate node name {}", node.name)));
            }
        }

        let leaders = self.nodes.iter().filter(|node| node.is_leader).count();
        if leaders != 1 {
            return Err(Error::Config(format!(
                "topology must have exactly one leader, found {}",
                leaders
            )));
        }

        for node in &self.nodes {
            if node.is_leader && node.is_team_leader {
                return Err(Error::Config(format!(
                    "node {} cannot be both leader and team leader",
                    node.name
                )));
            }

            if node.is_leader && node.team.is_some() {
                return Err(Error::Config(format!(
                    "leader {} cannot belong to a team",
                    node.name
                )));
            }

            node.role()?;

            if node.neighbors.iter().any(|name| name == &node.name) {
                return Err(Error::Config(format!(
                    "node {} lists itself as a neighbor",
                    node.name
                )));
            }
        }

        Ok(())
    }
}
