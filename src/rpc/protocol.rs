//! RPC Protocol
//!
//! Endpoints and Data Transfer Objects exchanged between nodes and with clients.
//! Bodies are JSON over HTTP.

use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;
use crate::topology::types::Team;

// --- API Endpoints ---

/// The compute operation. Accepted by every node regardless of role.
pub const ENDPOINT_HANDLE: &str = "/handle";
/// Liveness probe returning the serving node's name.
pub const ENDPOINT_HEALTH: &str = "/health";

// --- Limits ---

/// Largest payload a node accepts, matching a 4 MiB message cap.
pub const MAX_PAYLOAD_BYTES: usize = 4 * 1024 * 1024;

/// Largest `/handle` body. Bytes travel as JSON number arrays, so one payload byte
/// takes up to four characters (`255,`).
pub const MAX_BODY_BYTES: usize = 4 * MAX_PAYLOAD_BYTES + 64 * 1024;

// --- Data Transfer Objects ---

/// Selects which team subtree must contribute to a result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Target {
    Green,
    Pink,
    Both,
}

impl Target {
    pub fn includes(&self, team: Team) -> bool {
        matches!(
            (self, team),
            (Target::Both, _) | (Target::Green, Team::Green) | (Target::Pink, Team::Pink)
        )
    }
}

impl std::str::FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GREEN" => Ok(Target::Green),
            "PINK" => Ok(Target::Pink),
            "BOTH" => Ok(Target::Both),
            other => Err(format!("unknown target {}, expected GREEN, PINK or BOTH", other)),
        }
    }
}

/// A compute request. Forwarded unchanged through every hop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ComputeRequest {
    /// Caller-assigned identifier, echoed in the result.
    pub request_id: String,
    pub target: Target,
    /// Input for local work; otherwise opaque.
    pub payload: Vec<u8>,
}

/// The merged outcome of every node that contributed to a request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ComputeResult {
    pub request_id: String,
    /// Sum of all local-work durations that contributed, in milliseconds.
    pub compute_ms: u64,
    /// Concatenated tagged output of every contributor, in merge order.
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthReply {
    pub node: String,
}

/// Body returned with every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
}
