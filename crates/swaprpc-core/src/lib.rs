//! swaprpc-core: JSON-RPC over HTTP with a rotating transport pool.
//!
//! # Overview
//!
//! The core crate defines everything except the HTTP stack itself:
//!
//! - [`RpcClient`]: sends one call, maps protocol errors, converts results
//! - [`TransportPool`]: two-slot pool that rotates transport handles on age
//! - [`HttpTransport`] / [`TransportFactory`]: the seam an HTTP stack implements
//! - [`JsonRpcRequest`] / [`JsonRpcResponse`]: wire types
//! - [`RpcClientError`] / [`TransportError`]: error taxonomy
//! - [`SerializationPolicy`]: pluggable envelope encoding

pub mod client;
pub mod error;
pub mod pool;
pub mod request;
pub mod serialization;
pub mod transport;

pub use client::{handle_rpc_error, RpcClient, RpcClientConfig, BENIGN_ERROR_CODE};
pub use error::{RpcClientError, TransportError};
pub use pool::{Slot, TransportHandle, TransportPool, DEFAULT_ROTATION_INTERVAL};
pub use request::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RpcId, RpcParam};
pub use serialization::{JsonPolicy, SerializationPolicy};
pub use transport::{resolve_endpoint, HttpReply, HttpTransport, TransportConfig, TransportFactory};

pub use url::Url;
