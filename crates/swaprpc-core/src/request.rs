//! JSON-RPC 2.0 wire types.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC request ID: string, number or null.
///
/// Requests built by the client always carry a string id; responses from
/// lenient nodes may echo a number or null, so all three are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcId {
    String(String),
    Number(u64),
    Null,
}

impl RpcId {
    /// A fresh random id (UUID v4). Only used for in-flight correlation, so
    /// collisions across processes are acceptable.
    pub fn random() -> Self {
        Self::String(uuid::Uuid::new_v4().to_string())
    }
}

impl From<String> for RpcId {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for RpcId {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl std::fmt::Display for RpcId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Null => write!(f, "null"),
        }
    }
}

/// A single JSON-RPC parameter value.
pub type RpcParam = Value;

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: RpcId,
    pub method: String,
    pub params: Vec<RpcParam>,
}

impl JsonRpcRequest {
    /// Create a request with a caller-chosen id.
    pub fn new(id: impl Into<RpcId>, method: impl Into<String>, params: Vec<RpcParam>) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id: id.into(),
            method: method.into(),
            params,
        }
    }

    /// Create a request with a freshly generated random id.
    pub fn with_random_id(method: impl Into<String>, params: Vec<RpcParam>) -> Self {
        Self::new(RpcId::random(), method, params)
    }
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl std::fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JSON-RPC error {}: {}", self.code, self.message)
    }
}

/// A JSON-RPC 2.0 response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default = "null_id")]
    pub id: RpcId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

fn null_id() -> RpcId {
    RpcId::Null
}

impl JsonRpcResponse {
    /// Returns `true` if the node attached an error object.
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Convert `result` into `T`. An absent result reads as JSON `null`, so
    /// `Option<T>` and `()` targets accept it.
    pub fn result_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        match &self.result {
            Some(value) => T::deserialize(value),
            None => T::deserialize(&Value::Null),
        }
    }
}
