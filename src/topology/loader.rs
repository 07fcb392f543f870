use std::path::Path;

use super::types::Topology;
use crate::error::{Error, Result};

/// Reads, parses and validates a JSON topology file.
pub fn load_topology(path: impl AsRef<Path>) -> Result<Topology> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("cannot open topology {}: {}", path.display(), e))
    })?;

    let topology = parse_topology(&text)
        .map_err(|e| Error::Config(format!("{} ({})", e.message(), path.display())))?;

    tracing::info!(
        "Loaded topology from {} ({} nodes)",
        path.display(),
        topology.nodes.len()
    );

    Ok(topology)
}

/// Parses and validates a topology document.
pub fn parse_topology(text: &str) -> Result<Topology> {
    let topology: Topology = serde_json::from_str(text)
        .map_err(|e| Error::Config(format!("failed to parse topology: {}", e)))?;
    topology.validate()?;
    Ok(topology)
}
