//! The JSON-RPC client: one call in, one typed result or failure out.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{RpcClientError, TransportError};
use crate::pool::{TransportPool, DEFAULT_ROTATION_INTERVAL};
use crate::request::{JsonRpcRequest, JsonRpcResponse, RpcParam};
use crate::serialization::{JsonPolicy, SerializationPolicy};
use crate::transport::{TransportConfig, TransportFactory};

/// Error code that is not surfaced as a failure.
///
/// Geth and several other nodes answer lookups for unknown transactions
/// with -32000; the caller gets a `null` result instead.
pub const BENIGN_ERROR_CODE: i64 = -32000;

/// Configuration for [`RpcClient`].
#[derive(Debug, Clone)]
pub struct RpcClientConfig {
    /// Raw `Authorization` header value, e.g. `"Bearer abc"`.
    pub authorization: Option<String>,
    /// How long a transport handle stays active before it is rotated.
    pub rotation_interval: Duration,
    /// Optional deadline for the POST plus body read. `None` leaves timing
    /// entirely to the HTTP stack.
    pub request_timeout: Option<Duration>,
}

impl Default for RpcClientConfig {
    fn default() -> Self {
        Self {
            authorization: None,
            rotation_interval: DEFAULT_ROTATION_INTERVAL,
            request_timeout: None,
        }
    }
}

impl RpcClientConfig {
    /// Default config with a `Bearer` authorization header.
    pub fn bearer(token: &str) -> Self {
        Self {
            authorization: Some(format!("Bearer {token}")),
            ..Default::default()
        }
    }
}

/// JSON-RPC client over a rotating pool of HTTP transport handles.
///
/// Share it as `Arc<RpcClient>`; calls are independent and may complete in
/// any order.
pub struct RpcClient {
    base_url: Url,
    policy: Arc<dyn SerializationPolicy>,
    pool: TransportPool,
    request_timeout: Option<Duration>,
}

impl RpcClient {
    /// Create a client using the default JSON policy.
    pub fn new(
        base_url: Url,
        factory: Arc<dyn TransportFactory>,
        config: RpcClientConfig,
    ) -> Result<Self, RpcClientError> {
        Self::with_policy(base_url, factory, config, Arc::new(JsonPolicy))
    }

    /// Create a client with a custom serialization policy.
    pub fn with_policy(
        base_url: Url,
        factory: Arc<dyn TransportFactory>,
        config: RpcClientConfig,
        policy: Arc<dyn SerializationPolicy>,
    ) -> Result<Self, RpcClientError> {
        let transport_config = TransportConfig {
            base_url: base_url.clone(),
            authorization: config.authorization,
        };
        let pool = TransportPool::new(factory, transport_config, config.rotation_interval)
            .map_err(RpcClientError::unknown)?;
        Ok(Self {
            base_url,
            policy,
            pool,
            request_timeout: config.request_timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn pool(&self) -> &TransportPool {
        &self.pool
    }

    /// Call `method` with a fresh random id and convert the result into `T`.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        route: Option<&str>,
        params: Vec<RpcParam>,
    ) -> Result<T, RpcClientError> {
        self.call_request(JsonRpcRequest::with_random_id(method, params), route)
            .await
    }

    /// Send a pre-built request (caller-controlled id) and convert the result.
    pub async fn call_request<T: DeserializeOwned>(
        &self,
        req: JsonRpcRequest,
        route: Option<&str>,
    ) -> Result<T, RpcClientError> {
        let resp = self.send(&req, route).await?;
        handle_rpc_error(&resp)?;
        resp.result_as().map_err(RpcClientError::ResultConversion)
    }

    /// Call `method` and discard the result.
    pub async fn notify(
        &self,
        method: &str,
        route: Option<&str>,
        params: Vec<RpcParam>,
    ) -> Result<(), RpcClientError> {
        self.notify_request(JsonRpcRequest::with_random_id(method, params), route)
            .await
    }

    /// Send a pre-built request and discard the result.
    pub async fn notify_request(
        &self,
        req: JsonRpcRequest,
        route: Option<&str>,
    ) -> Result<(), RpcClientError> {
        let resp = self.send(&req, route).await?;
        handle_rpc_error(&resp)
    }

    /// Post one request and return the raw response envelope.
    ///
    /// Protocol errors are *not* mapped here; every transport-layer problem
    /// comes back as [`RpcClientError::Unknown`].
    pub async fn send(
        &self,
        req: &JsonRpcRequest,
        route: Option<&str>,
    ) -> Result<JsonRpcResponse, RpcClientError> {
        self.try_send(req, route).await.map_err(|e| {
            tracing::warn!(
                method = %req.method,
                id = %req.id,
                error = %e,
                url = %self.base_url,
                "rpc request failed"
            );
            RpcClientError::unknown(e)
        })
    }

    async fn try_send(
        &self,
        req: &JsonRpcRequest,
        route: Option<&str>,
    ) -> Result<JsonRpcResponse, TransportError> {
        let handle = self.pool.get_or_refresh()?;
        let body = self.policy.serialize_request(req)?;

        let post = handle.transport().post(route, body);
        let reply = match self.request_timeout {
            Some(timeout) => tokio::time::timeout(timeout, post)
                .await
                .map_err(|_| TransportError::Timeout {
                    ms: timeout.as_millis() as u64,
                })??,
            None => post.await?,
        };

        if !reply.is_success() {
            return Err(TransportError::Status {
                status: reply.status,
                body: String::from_utf8_lossy(&reply.body).into_owned(),
            });
        }

        Ok(self.policy.deserialize_response(&reply.body)?)
    }
}

impl std::fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcClient")
            .field("base_url", &self.base_url.as_str())
            .field("pool", &self.pool)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Map an embedded error object to a failure.
///
/// Every code except [`BENIGN_ERROR_CODE`] becomes [`RpcClientError::Rpc`].
pub fn handle_rpc_error(resp: &JsonRpcResponse) -> Result<(), RpcClientError> {
    match &resp.error {
        None => Ok(()),
        Some(err) if err.code == BENIGN_ERROR_CODE => {
            tracing::debug!(id = %resp.id, message = %err.message, "ignoring benign rpc error");
            Ok(())
        }
        Some(err) => {
            tracing::debug!(id = %resp.id, code = err.code, message = %err.message, "rpc error");
            Err(RpcClientError::Rpc(err.clone()))
        }
    }
}
