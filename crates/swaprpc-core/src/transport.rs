//! The `HttpTransport` and `TransportFactory` traits: the seam between the
//! RPC client and whatever HTTP stack actually moves the bytes.

use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use crate::error::TransportError;

/// Raw HTTP reply: status code plus the fully read body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpReply {
    /// Returns `true` for 2xx status codes.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Everything a factory needs to build one transport handle.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Endpoint every request is posted to (before route resolution).
    pub base_url: Url,
    /// Raw `Authorization` header value, sent on every request.
    pub authorization: Option<String>,
}

/// A configured, ready-to-use HTTP client context.
///
/// # Thread Safety
/// Implementations must be `Send + Sync`; one handle is shared by every
/// in-flight call until the pool rotates it.
#[async_trait]
pub trait HttpTransport: Send + Sync + 'static {
    /// POST `body` as `application/json` to the base address resolved with
    /// `route`, and read the whole response body.
    async fn post(&self, route: Option<&str>, body: Vec<u8>) -> Result<HttpReply, TransportError>;

    /// The base address this handle is bound to.
    fn base_url(&self) -> &Url;
}

/// Builds transport handles. Called once at pool construction and again
/// on each rotation.
pub trait TransportFactory: Send + Sync + 'static {
    fn create(&self, config: &TransportConfig) -> Result<Arc<dyn HttpTransport>, TransportError>;
}

/// Resolve the per-call route against the base address.
///
/// No route means the base address itself. Otherwise the route is resolved
/// as an RFC 3986 reference, so `http://host/` + `/custom` gives
/// `http://host/custom` and `http://host/rpc/` + `eth` gives
/// `http://host/rpc/eth`.
pub fn resolve_endpoint(base: &Url, route: Option<&str>) -> Result<Url, TransportError> {
    match route {
        None => Ok(base.clone()),
        Some(route) => Ok(base.join(route)?),
    }
}
