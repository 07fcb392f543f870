//! Role-driven request handler.
//!
//! Classifies every inbound request by the node's role (fixed at startup) and runs
//! exactly one of three behaviors:
//!
//! - **Root leader**: calls the GREEN and/or PINK team leader concurrently and merges
//!   whatever succeeded, GREEN first. Fails only if no requested team succeeded.
//! - **Team leader**: admission control, local work, then at most one forward to a
//!   same-team neighbor. Forwarding failures are absorbed.
//! - **Worker**: local work only.

use std::time::Duration;

use super::admission::InflightCounter;
use super::work::{LocalWork, do_local_work};
use crate::error::{Error, Result};
use crate::peers::connector::NodeContext;
use crate::rpc::protocol::{ComputeRequest, ComputeResult, HealthReply};
use crate::topology::types::{Role, Team};

/// Deadline applied to every outbound neighbor call.
pub const CALL_DEADLINE: Duration = Duration::from_secs(2);

/// Payloads above this size are worked on the blocking pool instead of the runtime.
pub const INLINE_WORK_LIMIT: usize = 64 * 1024;

/// Signature of the node-local computation.
pub type LocalWorkFn = fn(&[u8], &str) -> LocalWork;

/// One per process. Stateless across requests apart from the inflight counter.
pub struct Handler {
    ctx: NodeContext,
    inflight: InflightCounter,
    call_deadline: Duration,
    local_work: LocalWorkFn,
}

impl Handler {
    pub fn new(ctx: NodeContext) -> Self {
        Self {
            ctx,
            inflight: InflightCounter::new(),
            call_deadline: CALL_DEADLINE,
            local_work: do_local_work,
        }
    }

    /// Overrides the per-call deadline.
    pub fn with_call_deadline(mut self, deadline: Duration) -> Self {
        self.call_deadline = deadline;
        self
    }

    /// Replaces the local computation, e.g. with one that reports fixed durations.
    pub fn with_local_work(mut self, work: LocalWorkFn) -> Self {
        self.local_work = work;
        self
    }

    pub fn node_name(&self) -> &str {
        &self.ctx.me().name
    }

    pub fn context(&self) -> &NodeContext {
        &self.ctx
    }

    /// Requests currently holding an admission slot.
    pub fn inflight(&self) -> usize {
        self.inflight.current()
    }

    #[cfg(test)]
    pub(crate) fn admission(&self) -> &InflightCounter {
        &self.inflight
    }

    pub fn health(&self) -> HealthReply {
        HealthReply {
            node: self.node_name().to_string(),
        }
    }

    pub async fn handle(&self, request: ComputeRequest) -> Result<ComputeResult> {
        tracing::debug!(
            "{} handling request {} (target {:?}, {} payload bytes)",
            self.node_name(),
            request.request_id,
            request.target,
            request.payload.len()
        );

        match self.ctx.role() {
            Role::RootLeader => self.handle_as_root(&request).await,
            Role::TeamLeader(team) => self.handle_as_team_leader(team, &request).await,
            Role::Worker(_) => self.local_result(&request).await,
        }
    }

    async fn handle_as_root(&self, request: &ComputeRequest) -> Result<ComputeResult> {
        let need_green = request.target.includes(Team::Green);
        let need_pink = request.target.includes(Team::Pink);

        // `None` means the team was not requested, which is not a failure.
        let green = async {
            if need_green {
                Some(self.call_team(Team::Green, request).await)
            } else {
                None
            }
        };
        let pink = async {
            if need_pink {
                Some(self.call_team(Team::Pink, request).await)
            } else {
                None
            }
        };

        let (green, pink) = tokio::join!(green, pink);

        let contributions: Vec<ComputeResult> = [green, pink]
            .into_iter()
            .flatten()
            .filter_map(|outcome| outcome.ok())
            .collect();

        if contributions.is_empty() {
            tracing::error!(
                "Request {}: no requested team succeeded",
                request.request_id
            );
            return Err(Error::Unavailable("no team succeeded".to_string()));
        }

        let mut merged = ComputeResult {
            request_id: request.request_id.clone(),
            compute_ms: 0,
            data: Vec::new(),
        };
        for part in contributions {
            merged.compute_ms += part.compute_ms;
            merged.data.extend_from_slice(&part.data);
        }

        Ok(merged)
    }

    async fn handle_as_team_leader(
        &self,
        team: Team,
        request: &ComputeRequest,
    ) -> Result<ComputeResult> {
        let _permit = self
            .inflight
            .admit(self.ctx.me().max_inflight)
            .inspect_err(|_| {
                tracing::warn!(
                    "{} rejected request {}: overloaded (max_inflight={})",
                    self.node_name(),
                    request.request_id,
                    self.ctx.me().max_inflight
                );
            })?;

        let mut result = self.local_result(request).await?;

        let Some(peer) = self.ctx.same_team_neighbor(team) else {
            return Ok(result);
        };

        match self.call_neighbor(&peer.name, request).await {
            Ok(sub) => {
                result.compute_ms += sub.compute_ms;
                result.data.extend_from_slice(&sub.data);
            }
            Err(_) => {
                tracing::warn!(
                    "{} returning local-only result for {} after forward to {} failed",
                    self.node_name(),
                    request.request_id,
                    peer.name
                );
            }
        }

        Ok(result)
    }

    async fn local_result(&self, request: &ComputeRequest) -> Result<ComputeResult> {
        let work = if request.payload.len() <= INLINE_WORK_LIMIT {
            (self.local_work)(&request.payload, self.node_name())
        } else {
            let local_work = self.local_work;
            let payload = request.payload.clone();
            let name = self.node_name().to_string();
            tokio::task::spawn_blocking(move || local_work(&payload, &name))
                .await
                .map_err(|e| Error::Internal(format!("local work did not finish: {}", e)))?
        };

        Ok(ComputeResult {
            request_id: request.request_id.clone(),
            compute_ms: work.elapsed_ms,
            data: work.data,
        })
    }

    async fn call_team(&self, team: Team, request: &ComputeRequest) -> Result<ComputeResult> {
        let leader = self.ctx.team_leader_for(team).ok_or_else(|| {
            Error::Unavailable(format!("no {} team leader among neighbors", team))
        })?;

        self.call_neighbor(&leader.name, request).await
    }

    /// Calls one neighbor, bounded by the call deadline whatever the handle does.
    async fn call_neighbor(&self, name: &str, request: &ComputeRequest) -> Result<ComputeResult> {
        let peer = self
            .ctx
            .peer(name)
            .ok_or_else(|| Error::Unavailable(format!("neighbor {} has no call handle", name)))?;

        let outcome =
            match tokio::time::timeout(self.call_deadline, peer.call(request, self.call_deadline))
                .await
            {
                Ok(outcome) => outcome,
                Err(_) => Err(Error::DeadlineExceeded(format!(
                    "neighbor {} did not answer within {:?}",
                    name, self.call_deadline
                ))),
            };

        if let Err(e) = &outcome {
            tracing::warn!(
                "RPC to neighbor {} failed: code={:?} msg=\"{}\"",
                name,
                e.code(),
                e.message()
            );
        }

        outcome
    }
}
