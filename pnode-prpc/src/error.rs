use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    /// The request never produced a 2xx response. Carries the HTTP status
    /// text, or the network failure when there was no response at all.
    #[error("pRPC request failed: {0}")]
    Transport(String),
    /// The endpoint answered with a JSON-RPC error envelope.
    #[error("{0}")]
    Remote(String),
    #[error("malformed pRPC payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("failed to build pRPC client: {0}")]
    Client(String),
}

impl From<reqwest::Error> for RpcError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => RpcError::Transport(status_text(status)),
            None => RpcError::Transport(e.to_string()),
        }
    }
}

pub(crate) fn status_text(status: reqwest::StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_owned)
        .unwrap_or_else(|| status.as_str().to_owned())
}
