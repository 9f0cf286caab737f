//! Pluggable serialization policy for request/response envelopes.

use crate::request::{JsonRpcRequest, JsonRpcResponse};

/// Turns envelopes into bytes and back. Field naming, null handling and
/// custom converters all live behind this trait.
pub trait SerializationPolicy: Send + Sync + 'static {
    fn serialize_request(&self, req: &JsonRpcRequest) -> Result<Vec<u8>, serde_json::Error>;

    fn deserialize_response(&self, body: &[u8]) -> Result<JsonRpcResponse, serde_json::Error>;
}

/// Default policy: plain `serde_json` with the derive-based field names.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPolicy;

impl SerializationPolicy for JsonPolicy {
    fn serialize_request(&self, req: &JsonRpcRequest) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(req)
    }

    fn deserialize_response(&self, body: &[u8]) -> Result<JsonRpcResponse, serde_json::Error> {
        serde_json::from_slice(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_policy_encodes_request() {
        let req = JsonRpcRequest::new("1", "net_version", vec![json!(true)]);
        let bytes = JsonPolicy.serialize_request(&req).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            value,
            json!({"jsonrpc": "2.0", "id": "1", "method": "net_version", "params": [true]})
        );
    }

    #[test]
    fn json_policy_rejects_malformed_body() {
        assert!(JsonPolicy.deserialize_response(b"<html>bad gateway</html>").is_err());
    }
}
