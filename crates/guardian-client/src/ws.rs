//! WebSocket transport — thin JSON-RPC 2.0 client over `tokio-tungstenite`.
//!
//! One background task owns the socket. Requests travel to it over an mpsc
//! channel and are matched to responses through a pending map keyed by
//! request id, so any number of calls can be in flight on the single
//! connection.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures::{Sink, SinkExt, Stream, StreamExt};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, warn};

use guardian_core::RpcError;

use crate::transport::{Connector, RpcFailure, Transport};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsError = tokio_tungstenite::tungstenite::Error;

/// Pending request waiting for its response.
type PendingTx = oneshot::Sender<Result<Value, RpcFailure>>;

/// Command sent to the socket task.
enum WsCommand {
    Request {
        id: u64,
        method: String,
        params: Value,
        response_tx: PendingTx,
    },
    /// Forget a request whose caller gave up waiting.
    Cancel {
        id: u64,
    },
    Close {
        reply: oneshot::Sender<bool>,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Connector
// ─────────────────────────────────────────────────────────────────────────────

/// Opens [`WsTransport`] connections.
#[derive(Clone, Copy, Debug, Default)]
pub struct WsConnector;

#[async_trait]
impl Connector for WsConnector {
    async fn open(
        &self,
        url: &str,
        request_timeout: Duration,
    ) -> Result<Arc<dyn Transport>, String> {
        let (ws, _) = connect_async(url).await.map_err(|e| e.to_string())?;
        debug!(%url, "websocket opened");
        Ok(Arc::new(WsTransport::new(ws, request_timeout)))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Transport
// ─────────────────────────────────────────────────────────────────────────────

/// A live WebSocket JSON-RPC connection.
#[derive(Debug)]
pub struct WsTransport {
    cmd_tx: mpsc::Sender<WsCommand>,
    request_timeout: Duration,
    next_id: AtomicU64,
    _handler: JoinHandle<()>,
}

impl WsTransport {
    /// Wrap an open socket and spawn its handler task.
    pub fn new(ws: WsStream, request_timeout: Duration) -> Self {
        Self::spawn(ws, request_timeout)
    }

    fn spawn<S>(ws: S, request_timeout: Duration) -> Self
    where
        S: Sink<Message, Error = WsError>
            + Stream<Item = Result<Message, WsError>>
            + Unpin
            + Send
            + 'static,
    {
        let (cmd_tx, cmd_rx) = mpsc::channel::<WsCommand>(64);
        let handler = tokio::spawn(socket_loop(ws, cmd_rx));
        Self {
            cmd_tx,
            request_timeout,
            next_id: AtomicU64::new(0),
            _handler: handler,
        }
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcFailure> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(WsCommand::Request {
                id,
                method: method.into(),
                params,
                response_tx: tx,
            })
            .await
            .map_err(|_| RpcFailure::Transport("connection closed".into()))?;

        match tokio::time::timeout(self.request_timeout, rx).await {
            Err(_) => {
                // Stop tracking the request so the pending map does not
                // accumulate senders nobody is waiting on.
                let _ = self.cmd_tx.send(WsCommand::Cancel { id }).await;
                Err(RpcFailure::Transport(format!(
                    "request timed out after {}s",
                    self.request_timeout.as_secs()
                )))
            }
            Ok(Err(_)) => Err(RpcFailure::Transport(
                "connection closed before response".into(),
            )),
            Ok(Ok(result)) => result,
        }
    }

    async fn close(&self) -> bool {
        let (tx, rx) = oneshot::channel();
        if self.cmd_tx.send(WsCommand::Close { reply: tx }).await.is_err() {
            // Socket task already gone, nothing closed cleanly here.
            return false;
        }
        rx.await.unwrap_or(false)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Socket task
// ─────────────────────────────────────────────────────────────────────────────

/// Response envelope as it appears on the wire. Exactly one of `result` /
/// `error` is populated by a conforming server.
#[derive(Debug, Deserialize)]
struct WireResponse {
    id: u64,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

/// Match a text frame to a pending request id and its tagged outcome.
///
/// Returns `None` for frames that are not responses (notifications,
/// unparseable payloads) so the loop can skip them.
fn route_frame(text: &str) -> Option<(u64, Result<Value, RpcFailure>)> {
    let response: WireResponse = serde_json::from_str(text).ok()?;
    let outcome = match response.error {
        Some(err) => Err(RpcFailure::Remote(err)),
        None => Ok(response.result.unwrap_or(Value::Null)),
    };
    Some((response.id, outcome))
}

/// Fail every pending request with the given reason.
fn fail_all(pending: &mut HashMap<u64, PendingTx>, reason: &str) {
    for (_, tx) in pending.drain() {
        let _ = tx.send(Err(RpcFailure::Transport(reason.into())));
    }
}

/// Owns the socket: sends requests, routes responses, handles close.
async fn socket_loop<S>(ws: S, mut cmd_rx: mpsc::Receiver<WsCommand>)
where
    S: Sink<Message, Error = WsError> + Stream<Item = Result<Message, WsError>> + Unpin,
{
    let (mut ws_tx, mut ws_rx) = ws.split();
    let mut pending: HashMap<u64, PendingTx> = HashMap::new();

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(WsCommand::Request { id, method, params, response_tx }) => {
                        let frame = json!({
                            "jsonrpc": "2.0",
                            "id": id,
                            "method": method,
                            "params": params,
                        });
                        let _ = pending.insert(id, response_tx);
                        if let Err(e) = ws_tx.send(Message::Text(frame.to_string().into())).await {
                            warn!(error = %e, "websocket send failed");
                            fail_all(&mut pending, "connection closed");
                            break;
                        }
                    }
                    Some(WsCommand::Cancel { id }) => {
                        if pending.remove(&id).is_some() {
                            debug!(id, "request cancelled after timeout");
                        }
                    }
                    Some(WsCommand::Close { reply }) => {
                        let closed = ws_tx.send(Message::Close(None)).await.is_ok();
                        let flushed = ws_tx.close().await.is_ok();
                        fail_all(&mut pending, "connection closed");
                        let _ = reply.send(closed && flushed);
                        break;
                    }
                    // All handles dropped; tear the socket down.
                    None => {
                        let _ = ws_tx.close().await;
                        break;
                    }
                }
            }
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Some((id, outcome)) = route_frame(&text) {
                            if let Some(tx) = pending.remove(&id) {
                                let _ = tx.send(outcome);
                            } else {
                                debug!(id, "response for unknown request id");
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        fail_all(&mut pending, "connection closed by server");
                        break;
                    }
                    Some(Ok(_)) => {} // ping/pong/binary: nothing to route
                    Some(Err(e)) => {
                        warn!(error = %e, "websocket read failed");
                        fail_all(&mut pending, "connection closed");
                        break;
                    }
                }
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_frame_result() {
        let (id, outcome) =
            route_frame(r#"{"jsonrpc":"2.0","id":7,"result":{"server":"consensus_running"}}"#)
                .unwrap();
        assert_eq!(id, 7);
        assert_eq!(outcome.unwrap()["server"], "consensus_running");
    }

    #[test]
    fn route_frame_error() {
        let (id, outcome) =
            route_frame(r#"{"jsonrpc":"2.0","id":3,"error":{"code":401,"message":"bad auth"}}"#)
                .unwrap();
        assert_eq!(id, 3);
        match outcome.unwrap_err() {
            RpcFailure::Remote(err) => {
                assert_eq!(err.code, 401);
                assert_eq!(err.message, "bad auth");
            }
            RpcFailure::Transport(r) => panic!("expected remote error, got transport: {r}"),
        }
    }

    #[test]
    fn route_frame_null_result() {
        let (_, outcome) = route_frame(r#"{"jsonrpc":"2.0","id":1,"result":null}"#).unwrap();
        assert_eq!(outcome.unwrap(), Value::Null);
    }

    #[test]
    fn route_frame_skips_notifications() {
        assert!(route_frame(r#"{"jsonrpc":"2.0","method":"note","params":[]}"#).is_none());
        assert!(route_frame("not json at all").is_none());
    }

    #[test]
    fn route_frame_prefers_error_over_result() {
        // A conforming server never sends both; if one does, the error wins
        // so the caller is not handed a result that the server disowned.
        let (_, outcome) = route_frame(
            r#"{"jsonrpc":"2.0","id":2,"result":true,"error":{"code":1,"message":"x"}}"#,
        )
        .unwrap();
        assert!(outcome.is_err());
    }

    // ─── Socket task over an in-memory pipe ──────────────────────────────

    use tokio::io::DuplexStream;
    use tokio_tungstenite::tungstenite::protocol::Role;

    fn text(value: Value) -> Message {
        Message::Text(value.to_string().into())
    }

    async fn pipe(request_timeout: Duration) -> (WsTransport, WebSocketStream<DuplexStream>) {
        let (client_io, server_io) = tokio::io::duplex(4096);
        let client = WebSocketStream::from_raw_socket(client_io, Role::Client, None).await;
        let server = WebSocketStream::from_raw_socket(server_io, Role::Server, None).await;
        (WsTransport::spawn(client, request_timeout), server)
    }

    async fn read_request(server: &mut WebSocketStream<DuplexStream>) -> Value {
        loop {
            match server.next().await {
                Some(Ok(Message::Text(frame))) => return serde_json::from_str(&frame).unwrap(),
                Some(Ok(_)) => {}
                other => panic!("expected request frame, got {other:?}"),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn request_gets_its_matching_response() {
        let (transport, mut server) = pipe(Duration::from_secs(1)).await;

        let (result, ()) = tokio::join!(transport.request("status", Value::Null), async {
            let request = read_request(&mut server).await;
            assert_eq!(request["method"], "status");
            server
                .send(text(json!({
                    "jsonrpc": "2.0",
                    "id": request["id"],
                    "result": { "server": "consensus_running" }
                })))
                .await
                .unwrap();
        });
        assert_eq!(result.unwrap()["server"], "consensus_running");
    }

    #[tokio::test(start_paused = true)]
    async fn timed_out_request_is_forgotten() {
        let (transport, mut server) = pipe(Duration::from_secs(1)).await;

        // The server never answers the first request.
        let err = transport.request("status", Value::Null).await.unwrap_err();
        assert!(matches!(err, RpcFailure::Transport(ref r) if r.contains("timed out")));
        let stale = read_request(&mut server).await;
        assert_eq!(stale["id"], 1);

        // A late answer to the dead request goes nowhere; the next request
        // on the same connection still gets its own response.
        let (result, ()) = tokio::join!(transport.request("version", Value::Null), async {
            let fresh = read_request(&mut server).await;
            assert_eq!(fresh["id"], 2);
            server
                .send(text(json!({ "jsonrpc": "2.0", "id": 1, "result": "stale" })))
                .await
                .unwrap();
            server
                .send(text(json!({ "jsonrpc": "2.0", "id": 2, "result": "fresh" })))
                .await
                .unwrap();
        });
        assert_eq!(result.unwrap(), json!("fresh"));
    }
}
