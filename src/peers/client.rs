//! Call handles for neighbor nodes.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::rpc::protocol::{
    ComputeRequest, ComputeResult, ENDPOINT_HANDLE, ENDPOINT_HEALTH, ErrorResponse, HealthReply,
};
use crate::topology::types::Node;

/// A pre-established means of calling one neighbor with a bounded deadline.
#[async_trait]
pub trait PeerClient: Send + Sync {
    /// Forwards a compute request. Must not take longer than `deadline`.
    async fn call(&self, request: &ComputeRequest, deadline: Duration) -> Result<ComputeResult>;

    /// Checks that the neighbor answers its health endpoint within `window`.
    async fn probe(&self, window: Duration) -> Result<HealthReply>;
}

/// HTTP client shared by all call handles of a node. Cluster traffic never goes
/// through a proxy.
pub fn cluster_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .map_err(|e| Error::Config(format!("cannot build HTTP client: {}", e)))
}

/// [`PeerClient`] speaking the node's HTTP/JSON protocol.
pub struct HttpPeer {
    name: String,
    base_url: String,
    http_client: reqwest::Client,
}

impl HttpPeer {
    pub fn new(http_client: reqwest::Client, node: &Node) -> Self {
        Self {
            name: node.name.clone(),
            base_url: format!("http://{}", node.addr()),
            http_client,
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::DeadlineExceeded(format!("neighbor {} did not answer in time", self.name))
        } else if e.is_decode() {
            Error::Internal(format!("neighbor {} sent an invalid body: {}", self.name, e))
        } else {
            Error::Unavailable(format!("neighbor {} unreachable: {}", self.name, e))
        }
    }
}

#[async_trait]
impl PeerClient for HttpPeer {
    async fn call(&self, request: &ComputeRequest, deadline: Duration) -> Result<ComputeResult> {
        let response = self
            .http_client
            .post(format!("{}{}", self.base_url, ENDPOINT_HANDLE))
            .json(request)
            .timeout(deadline)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<ComputeResult>()
                .await
                .map_err(|e| self.transport_error(e));
        }

        match response.json::<ErrorResponse>().await {
            Ok(body) => Err(Error::from_wire(body.code, body.message)),
            Err(_) => Err(Error::Internal(format!(
                "neighbor {} answered {} without an error body",
                self.name, status
            ))),
        }
    }

    async fn probe(&self, window: Duration) -> Result<HealthReply> {
        let response = self
            .http_client
            .get(format!("{}{}", self.base_url, ENDPOINT_HEALTH))
            .timeout(window)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            return Err(Error::Unavailable(format!(
                "neighbor {} health check answered {}",
                self.name,
                response.status()
            )));
        }

        response
            .json::<HealthReply>()
            .await
            .map_err(|e| self.transport_error(e))
    }
}
