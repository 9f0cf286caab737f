//! Error types: the low-level transport cause and the caller-facing failure.

use thiserror::Error;

use crate::request::JsonRpcError;

/// Something went wrong below the JSON-RPC layer.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed (connection refused, reset, TLS, etc.).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The endpoint answered with a non-success status code.
    #[error("HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    /// Request timed out after the configured duration.
    #[error("Request timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// Request could not be encoded or the response body could not be decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The per-call route could not be resolved against the base address.
    #[error("Invalid route: {0}")]
    InvalidRoute(#[from] url::ParseError),

    /// A transport handle could not be built.
    #[error("Failed to build transport: {0}")]
    Build(String),

    /// An unexpected error.
    #[error("{0}")]
    Other(String),
}

/// The failure a caller of [`RpcClient`](crate::client::RpcClient) sees.
///
/// Three outcomes are distinguishable: the node returned an error
/// ([`Rpc`](Self::Rpc)), the call could not be completed
/// ([`Unknown`](Self::Unknown)), or it succeeded.
#[derive(Debug, Error)]
pub enum RpcClientError {
    /// JSON-RPC protocol-level error returned by the node.
    #[error("RPC error {}: {}", .0.code, .0.message)]
    Rpc(JsonRpcError),

    /// Any transport-layer problem, wrapped exactly once.
    #[error("{message}: {source}")]
    Unknown {
        message: String,
        #[source]
        source: TransportError,
    },

    /// The base address given at construction is not a valid URL.
    #[error("Invalid base address: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    /// The call succeeded but `result` does not have the requested shape.
    #[error("Result conversion error: {0}")]
    ResultConversion(#[source] serde_json::Error),
}

impl RpcClientError {
    pub(crate) fn unknown(source: TransportError) -> Self {
        Self::Unknown {
            message: "error occurred when trying to send rpc request(s)".into(),
            source,
        }
    }

    /// Returns `true` if the node itself reported the error.
    pub fn is_rpc_error(&self) -> bool {
        matches!(self, Self::Rpc(_))
    }

    /// Returns `true` if the call never produced a usable response.
    pub fn is_transport_error(&self) -> bool {
        matches!(self, Self::Unknown { .. })
    }

    /// The node's error object, if any.
    pub fn rpc_error(&self) -> Option<&JsonRpcError> {
        match self {
            Self::Rpc(err) => Some(err),
            _ => None,
        }
    }
}
