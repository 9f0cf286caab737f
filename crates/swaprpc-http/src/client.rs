//! HTTP transport handles backed by `reqwest`.
//!
//! Every handle owns its own `reqwest::Client`, and with it its own
//! connection pool and DNS cache. Rotating a handle in
//! [`TransportPool`](swaprpc_core::TransportPool) therefore drops stale
//! sockets and re-resolves the endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::ClientBuilder;
use url::Url;

use swaprpc_core::error::{RpcClientError, TransportError};
use swaprpc_core::transport::{
    resolve_endpoint, HttpReply, HttpTransport, TransportConfig, TransportFactory,
};
use swaprpc_core::{RpcClient, RpcClientConfig};

type Customizer = dyn Fn(ClientBuilder) -> ClientBuilder + Send + Sync;

/// Builds a fresh `reqwest::Client` per handle.
#[derive(Clone, Default)]
pub struct ReqwestFactory {
    customize: Option<Arc<Customizer>>,
}

impl ReqwestFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `f` to every `ClientBuilder` before it is built, e.g. to set a
    /// proxy, extra root certificates or a connect timeout.
    pub fn with_customizer<F>(f: F) -> Self
    where
        F: Fn(ClientBuilder) -> ClientBuilder + Send + Sync + 'static,
    {
        Self {
            customize: Some(Arc::new(f)),
        }
    }
}

impl std::fmt::Debug for ReqwestFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestFactory")
            .field("customized", &self.customize.is_some())
            .finish()
    }
}

impl TransportFactory for ReqwestFactory {
    fn create(&self, config: &TransportConfig) -> Result<Arc<dyn HttpTransport>, TransportError> {
        let mut headers = HeaderMap::new();
        if let Some(auth) = &config.authorization {
            let mut value = HeaderValue::from_str(auth)
                .map_err(|e| TransportError::Build(format!("invalid authorization header: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(customize) = &self.customize {
            builder = customize(builder);
        }
        let http = builder
            .build()
            .map_err(|e| TransportError::Build(e.to_string()))?;
        tracing::trace!(url = %config.base_url, "built reqwest client");

        Ok(Arc::new(ReqwestTransport {
            base_url: config.base_url.clone(),
            http,
        }))
    }
}

/// One immutable `reqwest` client bound to a base address.
#[derive(Debug)]
pub struct ReqwestTransport {
    base_url: Url,
    http: reqwest::Client,
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post(&self, route: Option<&str>, body: Vec<u8>) -> Result<HttpReply, TransportError> {
        let url = resolve_endpoint(&self.base_url, route)?;
        let resp = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| TransportError::Http(e.to_string()))?;

        let status = resp.status().as_u16();
        let body = resp
            .bytes()
            .await
            .map_err(|e| TransportError::Http(e.to_string()))?;

        Ok(HttpReply {
            status,
            body: body.to_vec(),
        })
    }

    fn base_url(&self) -> &Url {
        &self.base_url
    }
}

/// Create an [`RpcClient`] for `url` with default configuration.
pub fn default_for(url: &str) -> Result<RpcClient, RpcClientError> {
    with_config(url, RpcClientConfig::default())
}

/// Create an [`RpcClient`] for `url` with the given configuration.
pub fn with_config(url: &str, config: RpcClientConfig) -> Result<RpcClient, RpcClientError> {
    with_factory(url, config, ReqwestFactory::new())
}

/// Create an [`RpcClient`] with a customized `reqwest` factory.
pub fn with_factory(
    url: &str,
    config: RpcClientConfig,
    factory: ReqwestFactory,
) -> Result<RpcClient, RpcClientError> {
    let base_url = Url::parse(url)?;
    RpcClient::new(base_url, Arc::new(factory), config)
}
