//! tokio-tungstenite implementation of the notification transport.
//!
//! Authentication rides on the ambient credential where the deployment has
//! one (cookies on the handshake request); the explicit `?token=` query
//! parameter is the fallback the server always honors.

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use opsboard_core::providers::{Frame, FrameSink, FrameStream, NotificationTransport};
use opsboard_core::{Result, SessionError};
use std::future::Future;
use std::pin::Pin;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::warn;

type WsConnection = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Websocket transport for the notification channel.
pub struct WsTransport {
    url: String,
}

impl WsTransport {
    /// Create a transport connecting to `url` (a `ws://` or `wss://`
    /// endpoint).
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    fn endpoint(&self, token: Option<&str>) -> String {
        match token {
            Some(token) => format!("{}?token={}", self.url, urlencoding::encode(token)),
            None => self.url.clone(),
        }
    }
}

impl NotificationTransport for WsTransport {
    fn connect(
        &self,
        token: Option<String>,
    ) -> Pin<
        Box<dyn Future<Output = Result<(Box<dyn FrameSink>, Box<dyn FrameStream>)>> + Send + '_>,
    > {
        let endpoint = self.endpoint(token.as_deref());
        Box::pin(async move {
            let request = endpoint
                .into_client_request()
                .map_err(|e| SessionError::ConnectFailed(e.to_string()))?;
            let (connection, _response) = connect_async(request)
                .await
                .map_err(|e| SessionError::ConnectFailed(e.to_string()))?;

            let (sink, stream) = connection.split();
            Ok((
                Box::new(WsSink { sink }) as Box<dyn FrameSink>,
                Box::new(WsStream { stream }) as Box<dyn FrameStream>,
            ))
        })
    }
}

struct WsSink {
    sink: SplitSink<WsConnection, Message>,
}

impl FrameSink for WsSink {
    fn send(&mut self, frame: Frame) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            let message = match frame {
                Frame::Text(text) => Message::Text(text),
                Frame::Close { code } => Message::Close(code.map(|code| CloseFrame {
                    code: CloseCode::from(code),
                    reason: "".into(),
                })),
            };
            self.sink
                .send(message)
                .await
                .map_err(|e| SessionError::Network(e.to_string()))
        })
    }
}

struct WsStream {
    stream: SplitStream<WsConnection>,
}

impl FrameStream for WsStream {
    fn next(&mut self) -> Pin<Box<dyn Future<Output = Option<Result<Frame>>> + Send + '_>> {
        Box::pin(async move {
            loop {
                match self.stream.next().await {
                    Some(Ok(Message::Text(text))) => return Some(Ok(Frame::Text(text))),
                    Some(Ok(Message::Close(frame))) => {
                        return Some(Ok(Frame::Close {
                            code: frame.map(|f| u16::from(f.code)),
                        }));
                    }
                    // Protocol-level ping/pong is handled by tungstenite;
                    // the literal text keepalive is what the layer above
                    // consumes.
                    Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => {}
                    Some(Ok(Message::Binary(_))) => {
                        warn!("discarding unexpected binary frame");
                    }
                    Some(Err(error)) => return Some(Err(SessionError::Network(error.to_string()))),
                    None => return None,
                }
            }
        })
    }
}
