//! Per-connection handler
//!
//! Upgrades the accepted socket to a WebSocket, then runs a reader loop that
//! feeds client events to the dispatcher in arrival order while a writer
//! task drains the connection's outbound channel. The disconnect path runs
//! exactly once per connection, whether the peer closed cleanly, errored, or
//! timed out.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::stream::SplitStream;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

use crate::dispatch::EventDispatcher;
use crate::error::{Error, Result};
use crate::gateway::ConnectionGateway;
use crate::protocol::codec;
use crate::protocol::ClientEvent;
use crate::server::config::ServerConfig;

/// One client connection
pub struct Connection {
    id: u64,
    peer_addr: SocketAddr,
    config: ServerConfig,
    gateway: Arc<ConnectionGateway>,
    dispatcher: Arc<EventDispatcher>,
}

impl Connection {
    /// Create a connection handler
    pub fn new(
        id: u64,
        peer_addr: SocketAddr,
        config: ServerConfig,
        gateway: Arc<ConnectionGateway>,
        dispatcher: Arc<EventDispatcher>,
    ) -> Self {
        Self {
            id,
            peer_addr,
            config,
            gateway,
            dispatcher,
        }
    }

    /// Run the connection until the peer disconnects
    pub async fn run(&mut self, socket: TcpStream) -> Result<()> {
        let ws = match timeout(
            self.config.handshake_timeout,
            tokio_tungstenite::accept_async(socket),
        )
        .await
        {
            Ok(Ok(ws)) => ws,
            Ok(Err(e)) => return Err(Error::WebSocket(e)),
            Err(_) => return Err(Error::HandshakeTimeout),
        };

        tracing::debug!(connection_id = self.id, peer = %self.peer_addr, "WebSocket established");

        let (mut sink, mut stream) = ws.split();
        let (tx, mut rx) = mpsc::unbounded_channel();
        self.gateway.register(self.id, tx).await;

        let connection_id = self.id;
        let mut writer = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                let message = match codec::encode(&event) {
                    Ok(message) => message,
                    Err(e) => {
                        tracing::error!(connection_id, error = %e, "Failed to encode outbound event");
                        continue;
                    }
                };
                if sink.send(message).await.is_err() {
                    break;
                }
            }
        });

        let result = self.read_loop(&mut stream).await;

        // Teardown: drop the outbound channel and remove the participant
        // from any session it joined. The dispatcher path is idempotent.
        self.dispatcher.handle_disconnect(self.id).await;
        writer.abort();
        let _ = (&mut writer).await;

        result
    }

    async fn read_loop(
        &self,
        stream: &mut SplitStream<WebSocketStream<TcpStream>>,
    ) -> Result<()> {
        loop {
            let frame = if self.config.idle_timeout.is_zero() {
                stream.next().await
            } else {
                match timeout(self.config.idle_timeout, stream.next()).await {
                    Ok(frame) => frame,
                    Err(_) => {
                        tracing::debug!(connection_id = self.id, "Idle timeout, closing");
                        return Ok(());
                    }
                }
            };

            match frame {
                Some(Ok(Message::Text(text))) => match codec::decode::<ClientEvent>(&text) {
                    Ok(event) => self.dispatcher.handle_event(self.id, event).await,
                    Err(e) => {
                        tracing::warn!(connection_id = self.id, error = %e, "Ignoring malformed frame");
                    }
                },
                Some(Ok(Message::Close(_))) | None => return Ok(()),
                Some(Ok(_)) => {} // Ignore binary, ping, pong
                Some(Err(e)) => {
                    tracing::debug!(connection_id = self.id, error = %e, "Read error");
                    return Err(Error::WebSocket(e));
                }
            }
        }
    }
}
