//! Platform websocket client
//!
//! The chat platform's gateway does the heavy lifting (connection
//! handling, command sync, rendering); we connect to it over a websocket,
//! identify with the auth token, and exchange the JSON envelope from
//! [`crate::event`]. Malformed frames are logged and skipped.

use futures::{SinkExt, StreamExt};
use serde_json::json;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::commands::CommandDescriptor;
use crate::event::{InboundEvent, OutboundAction};
use crate::Result;

/// Client for connecting to the platform gateway
pub struct PlatformClient {
    url: String,
    token: String,
}

impl PlatformClient {
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: token.into(),
        }
    }

    /// Connect, identify, and hand the platform our command descriptors
    /// for registration.
    pub async fn connect(&self, commands: Vec<CommandDescriptor>) -> Result<PlatformConnection> {
        let (mut ws, _) = tokio_tungstenite::connect_async(self.url.as_str()).await?;

        let identify = json!({
            "op": "identify",
            "token": self.token,
            "commands": commands,
        });
        ws.send(Message::Text(identify.to_string())).await?;

        tracing::info!(url = %self.url, "Connected to platform gateway");
        Ok(PlatformConnection { ws })
    }
}

/// An established platform connection
pub struct PlatformConnection {
    ws: WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>,
}

impl PlatformConnection {
    /// Pump frames between the socket and the bot's channels until the
    /// socket closes or the outbound side is dropped.
    pub async fn run(
        self,
        inbound_tx: mpsc::Sender<InboundEvent>,
        mut outbound_rx: mpsc::Receiver<OutboundAction>,
    ) -> Result<()> {
        let (mut sink, mut stream) = self.ws.split();

        // Writer: serialize actions out. Ends when the bot drops its
        // outbound sender.
        let writer = tokio::spawn(async move {
            while let Some(action) = outbound_rx.recv().await {
                let frame = match serde_json::to_string(&action) {
                    Ok(frame) => frame,
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to serialize outbound action");
                        continue;
                    }
                };
                if sink.send(Message::Text(frame)).await.is_err() {
                    break;
                }
            }
        });

        // Reader: parse events in.
        while let Some(msg) = stream.next().await {
            match msg {
                Ok(Message::Text(text)) => match serde_json::from_str::<InboundEvent>(&text) {
                    Ok(event) => {
                        if inbound_tx.send(event).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Skipping malformed platform frame");
                    }
                },
                Ok(Message::Close(_)) => {
                    tracing::info!("Platform gateway closed the connection");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(error = %e, "Platform connection error");
                    break;
                }
            }
        }

        writer.abort();
        Ok(())
    }
}
