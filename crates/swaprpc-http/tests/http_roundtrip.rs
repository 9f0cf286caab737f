//! End-to-end calls through `reqwest` against a throwaway local HTTP responder.

use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use swaprpc_core::{RpcClientConfig, RpcClientError, TransportError};

#[derive(Debug, Clone)]
struct Captured {
    /// Request line and headers, lowercased.
    head: String,
    body: Value,
}

type Handler = dyn Fn(&Value) -> (u16, String) + Send + Sync;

struct Responder {
    base: String,
    seen: Arc<Mutex<Vec<Captured>>>,
}

async fn spawn_responder<F>(handler: F) -> Responder
where
    F: Fn(&Value) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let handler: Arc<Handler> = Arc::new(handler);

    let seen_task = seen.clone();
    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            let seen = seen_task.clone();
            let handler = handler.clone();
            tokio::spawn(async move {
                let _ = handle_connection(stream, seen, handler).await;
            });
        }
    });

    Responder {
        base: format!("http://{addr}/"),
        seen,
    }
}

async fn handle_connection(
    mut stream: TcpStream,
    seen: Arc<Mutex<Vec<Captured>>>,
    handler: Arc<Handler>,
) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let head_end = loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_lowercase();
    let content_length = head
        .lines()
        .find_map(|l| l.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);
    while buf.len() < head_end + content_length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let body: Value = serde_json::from_slice(&buf[head_end..]).unwrap_or(Value::Null);
    let (status, payload) = handler(&body);
    seen.lock().unwrap().push(Captured { head, body });

    let response = format!(
        "HTTP/1.1 {status} X\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{payload}",
        payload.len()
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}

fn ok_result(result: Value) -> impl Fn(&Value) -> (u16, String) {
    move |req: &Value| {
        (
            200,
            json!({"jsonrpc": "2.0", "id": req["id"], "result": result}).to_string(),
        )
    }
}

#[tokio::test]
async fn call_posts_json_to_base_address() {
    let server = spawn_responder(ok_result(json!("0x2a"))).await;
    let client = swaprpc_http::default_for(&server.base).unwrap();

    let block: String = client
        .call("eth_blockNumber", None, vec![json!(false)])
        .await
        .unwrap();
    assert_eq!(block, "0x2a");

    let seen = server.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].head.starts_with("post / http/1.1"), "head: {}", seen[0].head);
    assert!(seen[0].head.contains("content-type: application/json"));
    assert!(!seen[0].head.contains("authorization:"));
    assert_eq!(seen[0].body["method"], "eth_blockNumber");
    assert_eq!(seen[0].body["params"], json!([false]));
    assert_eq!(seen[0].body["jsonrpc"], "2.0");
}

#[tokio::test]
async fn route_resolves_against_base() {
    let server = spawn_responder(ok_result(json!(true))).await;
    let client = swaprpc_http::default_for(&server.base).unwrap();

    let ok: bool = client.call("ping", Some("/custom"), vec![]).await.unwrap();
    assert!(ok);
    let head = server.seen.lock().unwrap()[0].head.clone();
    assert!(head.starts_with("post /custom http/1.1"), "head: {head}");
}

#[tokio::test]
async fn authorization_header_is_sent() {
    let server = spawn_responder(ok_result(json!(null))).await;
    let client =
        swaprpc_http::with_config(&server.base, RpcClientConfig::bearer("s3cret")).unwrap();

    client.notify("eth_syncing", None, vec![]).await.unwrap();
    let head = server.seen.lock().unwrap()[0].head.clone();
    assert!(head.contains("authorization: bearer s3cret"), "head: {head}");
}

#[tokio::test]
async fn benign_error_over_http_returns_null() {
    let server = spawn_responder(|req: &Value| {
        (
            200,
            json!({
                "jsonrpc": "2.0",
                "id": req["id"],
                "error": {"code": -32000, "message": "transaction not found"}
            })
            .to_string(),
        )
    })
    .await;
    let client = swaprpc_http::default_for(&server.base).unwrap();

    let tx: Option<Value> = client
        .call("eth_getTransactionByHash", None, vec![json!("0xabc")])
        .await
        .unwrap();
    assert!(tx.is_none());
}

#[tokio::test]
async fn server_error_status_is_transport_failure() {
    let server = spawn_responder(|_: &Value| (500, "{}".to_string())).await;
    let client = swaprpc_http::default_for(&server.base).unwrap();

    let err = client.call::<Value>("eth_chainId", None, vec![]).await.unwrap_err();
    assert!(matches!(
        err,
        RpcClientError::Unknown { source: TransportError::Status { status: 500, .. }, .. }
    ));
}

#[tokio::test]
async fn connection_refused_is_transport_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = swaprpc_http::default_for(&format!("http://{addr}/")).unwrap();
    let err = client.call::<Value>("eth_chainId", None, vec![]).await.unwrap_err();
    assert!(matches!(
        err,
        RpcClientError::Unknown { source: TransportError::Http(_), .. }
    ));
}

#[tokio::test]
async fn calls_keep_working_across_rotations() {
    let server = spawn_responder(ok_result(json!("0x1"))).await;
    let client = Arc::new(swaprpc_http::default_for(&server.base).unwrap());

    let before = client.pool().get_or_refresh().unwrap();
    client.pool().rotate().unwrap();

    let calls = (0..20).map(|i| {
        let client = client.clone();
        async move {
            if i == 10 {
                client.pool().rotate().unwrap();
            }
            client.call::<String>("eth_blockNumber", None, vec![]).await
        }
    });
    for result in futures::future::join_all(calls).await {
        assert_eq!(result.unwrap(), "0x1");
    }

    let after = client.pool().get_or_refresh().unwrap();
    assert!(!before.ptr_eq(&after));
    assert_eq!(client.pool().rotation_count(), 2);
    assert_eq!(server.seen.lock().unwrap().len(), 20);
}
