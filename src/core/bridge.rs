use futures::{SinkExt, StreamExt};
use std::borrow::Cow;
use std::future::{self, Future};
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio_tungstenite::{accept_async, connect_async, tungstenite::Message};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::{Result, StreamError};

/// Longest payload prefix echoed to the log
pub const PREVIEW_LIMIT: usize = 200;

const CHANNEL_CAPACITY: usize = 256;

/// Relays one upstream feed to every connected local WebSocket client.
///
/// Clone-able; clones share the same broadcast channel.
#[derive(Clone)]
pub struct Bridge {
    tx: broadcast::Sender<Message>,
}

impl Bridge {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Message> {
        self.tx.subscribe()
    }

    /// Send a message to all clients and return how many received it
    pub fn publish(&self, message: Message) -> usize {
        self.tx.send(message).unwrap_or(0)
    }

    pub fn client_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Connect upstream and republish every data frame until the upstream closes
    pub async fn relay_upstream(&self, url: &str) -> Result<()> {
        info!("Using DexScreener WS URL: {}", url);

        let (ws_stream, _) = connect_async(url)
            .await
            .map_err(|source| StreamError::Connect {
                url: url.to_string(),
                source,
            })?;

        info!("DexScreener WebSocket bridge is running");

        let (_write, mut read) = ws_stream.split();

        while let Some(frame) = read.next().await {
            match frame? {
                Message::Text(text) => {
                    info!("Dex WS message: {}", preview(&text));
                    self.publish(Message::Text(text));
                }
                Message::Binary(data) => {
                    info!("Dex WS message: <{} binary bytes>", data.len());
                    self.publish(Message::Binary(data));
                }
                Message::Close(_) => {
                    info!("DexScreener WS closed");
                    break;
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Serve local clients and relay `url` until `shutdown` resolves.
    ///
    /// Only a failed upstream connect is fatal. Once relaying, an upstream close
    /// or error is logged and the local server keeps its clients.
    pub async fn run<F>(&self, url: &str, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let cancel = CancellationToken::new();
        let server = tokio::spawn(self.clone().serve(listener, cancel.clone()));

        let relay = async {
            match self.relay_upstream(url).await {
                Err(e @ StreamError::Connect { .. }) => return Err(e),
                Err(e) => warn!("DexScreener WS error: {}", e),
                Ok(()) => {}
            }
            info!("Upstream finished, local WS server keeps running");
            future::pending::<Result<()>>().await
        };

        let result = tokio::select! {
            result = relay => result,
            _ = shutdown => Ok(()),
        };

        cancel.cancel();
        if let Err(e) = server.await {
            warn!("Local WS server task failed: {}", e);
        }

        result
    }

    /// Accept local clients until `cancel` fires
    pub async fn serve(self, listener: TcpListener, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        // Subscribe before the handshake so no message published after it is missed
                        let rx = self.subscribe();
                        tokio::spawn(handle_client(stream, peer, rx, cancel.clone()));
                    }
                    Err(e) => warn!("Local WS server error: {}", e),
                },
            }
        }

        info!("Local WS server stopped");
    }
}

impl Default for Bridge {
    fn default() -> Self {
        Self::new()
    }
}

/// Bind the local relay listener
pub async fn bind(addr: &str) -> Result<TcpListener> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| StreamError::Bind {
            addr: addr.to_string(),
            source,
        })
}

async fn handle_client(
    stream: TcpStream,
    peer: SocketAddr,
    mut rx: broadcast::Receiver<Message>,
    cancel: CancellationToken,
) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!("Handshake with {} failed: {}", peer, e);
            return;
        }
    };

    info!("Client connected: {}", peer);
    let (mut sink, mut incoming) = ws_stream.split();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                let _ = sink.send(Message::Close(None)).await;
                break;
            }
            relayed = rx.recv() => match relayed {
                Ok(message) => {
                    if let Err(e) = sink.send(message).await {
                        warn!("Client {} error: {}", peer, e);
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Client {} lagging, skipped {} message(s)", peer, skipped);
                }
                Err(RecvError::Closed) => break,
            },
            received = incoming.next() => match received {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Err(e)) => {
                    warn!("Client {} error: {}", peer, e);
                    break;
                }
                Some(Ok(_)) => {}
            },
        }
    }

    info!("Client disconnected: {}", peer);
}

/// Shorten a payload to `PREVIEW_LIMIT` characters for logging
pub fn preview(payload: &str) -> Cow<'_, str> {
    match payload.char_indices().nth(PREVIEW_LIMIT) {
        Some((cut, _)) => Cow::Owned(format!("{}...", &payload[..cut])),
        None => Cow::Borrowed(payload),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::oneshot;
    use tokio::time::timeout;

    #[test]
    fn preview_keeps_short_payloads() {
        let payload = "x".repeat(PREVIEW_LIMIT);
        assert_eq!(preview(&payload), payload);
    }

    #[test]
    fn preview_truncates_long_payloads() {
        let payload = "y".repeat(PREVIEW_LIMIT + 50);
        let shown = preview(&payload);

        assert_eq!(shown.len(), PREVIEW_LIMIT + 3);
        assert!(shown.ends_with("..."));
    }

    #[test]
    fn preview_cuts_on_char_boundary() {
        let payload = "ж".repeat(PREVIEW_LIMIT + 1);
        let shown = preview(&payload);

        assert_eq!(shown.chars().count(), PREVIEW_LIMIT + 3);
    }

    #[test]
    fn publish_without_clients_reaches_nobody() {
        let bridge = Bridge::new();
        assert_eq!(bridge.publish(Message::Text("hello".into())), 0);
        assert_eq!(bridge.client_count(), 0);
    }

    #[tokio::test]
    async fn relays_published_messages_to_clients() {
        let bridge = Bridge::new();
        let listener = bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let cancel = CancellationToken::new();
        let server = tokio::spawn(bridge.clone().serve(listener, cancel.clone()));

        let (mut client, _) = connect_async(format!("ws://{}", addr)).await.unwrap();

        let frame = r#"{"tokens": []}"#.to_string();
        assert_eq!(bridge.publish(Message::Text(frame.clone())), 1);

        let received = timeout(Duration::from_secs(5), client.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(received, Message::Text(frame));

        cancel.cancel();
        server.await.unwrap();
    }

    #[tokio::test]
    async fn clients_stay_connected_after_upstream_closes() {
        // Upstream sends one frame once the local client is ready, then closes
        let upstream = bind("127.0.0.1:0").await.unwrap();
        let upstream_url = format!("ws://{}", upstream.local_addr().unwrap());
        let (ready_tx, ready_rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            let (stream, _) = upstream.accept().await.unwrap();
            let mut ws = accept_async(stream).await.unwrap();
            ready_rx.await.unwrap();
            ws.send(Message::Text("first".into())).await.unwrap();
            ws.send(Message::Close(None)).await.unwrap();
            while ws.next().await.is_some() {}
        });

        let bridge = Bridge::new();
        let listener = bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let runner = bridge.clone();
        let handle = tokio::spawn(async move {
            runner
                .run(&upstream_url, listener, async {
                    let _ = stop_rx.await;
                })
                .await
        });

        let (mut client, _) = connect_async(format!("ws://{}", addr)).await.unwrap();
        ready_tx.send(()).unwrap();

        let first = timeout(Duration::from_secs(5), client.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(first, Message::Text("first".into()));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!handle.is_finished());
        assert_eq!(bridge.publish(Message::Text("still here".into())), 1);

        let second = timeout(Duration::from_secs(5), client.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(second, Message::Text("still here".into()));

        stop_tx.send(()).unwrap();
        assert!(handle.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn run_fails_when_upstream_is_unreachable() {
        let bridge = Bridge::new();
        let listener = bind("127.0.0.1:0").await.unwrap();

        let result = bridge
            .run("ws://127.0.0.1:1", listener, future::pending::<()>())
            .await;

        assert!(matches!(result, Err(StreamError::Connect { .. })));
    }

    #[tokio::test]
    async fn bind_reports_bad_address() {
        let result = bind("not-an-address").await;
        assert!(matches!(result, Err(StreamError::Bind { .. })));
    }
}
