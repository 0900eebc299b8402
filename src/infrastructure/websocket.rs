// Websocket transport - persistent connection to the data source
use crate::application::session::CommandSink;
use crate::domain::error::{ViewerError, ViewerResult};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

/// Connection lifecycle and inbound frames, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionEvent {
    Opened,
    Frame(String),
    Closed,
}

/// Outbound queue drained by the writer task.
#[derive(Debug, Clone)]
pub struct WsCommandSink {
    tx: mpsc::UnboundedSender<String>,
}

impl CommandSink for WsCommandSink {
    fn send_text(&mut self, text: String) -> ViewerResult<()> {
        self.tx
            .send(text)
            .map_err(|_| ViewerError::Transport("writer task has stopped".to_string()))
    }
}

/// Connect to `url` in the background. Events are delivered on `events`; a
/// failed connect, a close frame and a read error all end with one
/// [`ConnectionEvent::Closed`]. There is no reconnection.
pub fn spawn_connection(url: String, events: mpsc::Sender<ConnectionEvent>) -> WsCommandSink {
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    tokio::spawn(async move {
        tracing::info!("connecting to {}", url);
        let ws = match connect_async(url.as_str()).await {
            Ok((ws, _)) => ws,
            Err(e) => {
                tracing::warn!("connect to {} failed: {}", url, e);
                let _ = events.send(ConnectionEvent::Closed).await;
                return;
            }
        };
        let (mut write, mut read) = ws.split();
        let _ = events.send(ConnectionEvent::Opened).await;

        let writer = tokio::spawn(async move {
            while let Some(text) = rx.recv().await {
                if let Err(e) = write.send(Message::text(text)).await {
                    tracing::warn!("websocket write failed: {}", e);
                    break;
                }
            }
        });

        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    if events.send(ConnectionEvent::Frame(text.to_string())).await.is_err() {
                        break;
                    }
                }
                Ok(Message::Close(frame)) => {
                    tracing::debug!("close frame received: {:?}", frame);
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("websocket read failed: {}", e);
                    break;
                }
            }
        }

        writer.abort();
        let _ = events.send(ConnectionEvent::Closed).await;
    });

    WsCommandSink { tx }
}
