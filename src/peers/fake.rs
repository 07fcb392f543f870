//! In-process call handles with scripted behavior, shared by the unit tests.

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::client::PeerClient;
use super::connector::NodeContext;
use crate::error::{Error, Result};
use crate::rpc::protocol::{ComputeRequest, ComputeResult, HealthReply};
use crate::topology::types::Topology;

pub(crate) enum Behavior {
    Succeed { compute_ms: u64, data: Vec<u8> },
    Fail(Error),
}

pub(crate) struct FakePeer {
    pub name: String,
    behavior: Behavior,
    delay: Duration,
    calls: AtomicUsize,
}

impl FakePeer {
    pub fn ok(name: &str, compute_ms: u64, data: &str) -> Self {
        Self {
            name: name.to_string(),
            behavior: Behavior::Succeed {
                compute_ms,
                data: data.as_bytes().to_vec(),
            },
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(name: &str, error: Error) -> Self {
        Self {
            name: name.to_string(),
            behavior: Behavior::Fail(error),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PeerClient for FakePeer {
    async fn call(&self, request: &ComputeRequest, _deadline: Duration) -> Result<ComputeResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match &self.behavior {
            Behavior::Succeed { compute_ms, data } => Ok(ComputeResult {
                request_id: request.request_id.clone(),
                compute_ms: *compute_ms,
                data: data.clone(),
            }),
            Behavior::Fail(e) => Err(e.clone()),
        }
    }

    async fn probe(&self, _window: Duration) -> Result<HealthReply> {
        match &self.behavior {
            Behavior::Succeed { .. } => Ok(HealthReply {
                node: self.name.clone(),
            }),
            Behavior::Fail(e) => Err(e.clone()),
        }
    }
}

/// Builds a context for `self_name` whose handles are the given fakes, matched by
/// name. Neighbors without a fake get one that is always unavailable.
pub(crate) fn context_with(
    topology: &Topology,
    self_name: &str,
    fakes: &[Arc<FakePeer>],
) -> NodeContext {
    NodeContext::build(topology, self_name, |node| {
        match fakes.iter().find(|fake| fake.name == node.name) {
            Some(fake) => fake.clone() as Arc<dyn PeerClient>,
            None => Arc::new(FakePeer::failing(
                &node.name,
                Error::Unavailable(format!("{} is not scripted", node.name)),
            )) as Arc<dyn PeerClient>,
        }
    })
    .expect("test topology should resolve")
}
