//! swaprpc-http: `reqwest` transport for swaprpc.
//!
//! # Quick start
//! ```rust,no_run
//! # async fn run() -> Result<(), swaprpc_core::RpcClientError> {
//! let client = swaprpc_http::default_for("https://rpc.example.com")?;
//! let block: String = client.call("eth_blockNumber", None, vec![]).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;

pub use client::{default_for, with_config, with_factory, ReqwestFactory, ReqwestTransport};
