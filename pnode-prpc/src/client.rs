use crate::envelope::{
    RpcRequest, RpcResponse, GET_CLUSTER_STATS, GET_NETWORK_HEALTH, GET_PNODES,
};
use crate::error::{status_text, RpcError};
use pnode_common::pnode::{ClusterStats, NetworkHealth, PNode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// JSON-RPC 2.0 client for a pRPC endpoint.
pub struct PrpcClient {
    http: reqwest::Client,
    endpoint: String,
    next_id: AtomicU64,
}

impl PrpcClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, RpcError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RpcError::Client(e.to_string()))?;

        Ok(PrpcClient {
            http,
            endpoint: endpoint.into(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Calls `method` and hands back the `result` member untouched.
    pub async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let req = RpcRequest::new(id, method, params);

        debug!("pRPC {} id={} -> {}", method, id, self.endpoint);

        let res = self
            .http
            .post(self.endpoint.as_str())
            .header("Content-Type", "application/json")
            .json(&req)
            .send()
            .await?;

        if !res.status().is_success() {
            warn!("pRPC {} answered with {}", method, res.status());
            return Err(RpcError::Transport(status_text(res.status())));
        }

        let body = res.text().await?;
        let envelope: RpcResponse = serde_json::from_str(&body)?;

        if let Some(error) = envelope.error {
            let message = if error.message.is_empty() {
                "pRPC error".to_owned()
            } else {
                error.message
            };

            return Err(RpcError::Remote(message));
        }

        Ok(envelope.result.unwrap_or(Value::Null))
    }

    pub async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, RpcError> {
        let result = self.call(method, params).await?;

        Ok(serde_json::from_value(result)?)
    }

    pub async fn get_pnodes(&self) -> Result<Vec<PNode>, RpcError> {
        self.request(GET_PNODES, Vec::new()).await
    }

    pub async fn get_cluster_stats(&self) -> Result<ClusterStats, RpcError> {
        self.request(GET_CLUSTER_STATS, Vec::new()).await
    }

    pub async fn get_network_health(&self) -> Result<NetworkHealth, RpcError> {
        self.request(GET_NETWORK_HEALTH, Vec::new()).await
    }
}
