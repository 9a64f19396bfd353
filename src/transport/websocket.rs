//! WebSocket transport
//!
//! Accepts TCP connections, performs the HTTP upgrade and hands every
//! accepted connection to `handle_connection` on its own task. The upgrade is
//! refused when:
//! - the request path is not the configured endpoint (404)
//! - the `Origin` header is missing or not on the allow-list (403)
//!
//! Frames larger than `max_message_bytes` fail the read and close that
//! connection only.

use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{WebSocketStream, accept_hdr_async_with_config};
use tracing::{info, warn};
use tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tungstenite::http::StatusCode;
use tungstenite::http::header::ORIGIN;
use tungstenite::protocol::WebSocketConfig;

use crate::broker::TopicRegistry;
use crate::config::Settings;
use crate::session::SessionIdGenerator;
use crate::transport::connection::handle_connection;
use crate::transport::origin::OriginPolicy;
use crate::utils::error::RelayError;

/// Binds the configured address and serves until the process stops.
pub async fn start_websocket_server(
    settings: Settings,
    registry: Arc<TopicRegistry>,
) -> Result<(), RelayError> {
    let listener = TcpListener::bind(settings.server.bind_addr()).await?;
    serve(listener, registry, settings).await
}

/// Runs the accept loop on an already bound listener.
pub async fn serve(
    listener: TcpListener,
    registry: Arc<TopicRegistry>,
    settings: Settings,
) -> Result<(), RelayError> {
    info!(
        "signaling relay listening on ws://{}{}",
        listener.local_addr()?,
        settings.server.path
    );

    let handshake = Arc::new(Handshake::new(&settings));
    let ids = Arc::new(SessionIdGenerator::new());
    let queue_capacity = settings.server.outbound_queue_capacity;

    loop {
        let (stream, peer_addr) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!("accept failed: {e}");
                continue;
            }
        };

        let registry = registry.clone();
        let handshake = handshake.clone();
        let ids = ids.clone();

        tokio::spawn(async move {
            let ws_stream = match handshake.accept(stream).await {
                Ok(ws) => ws,
                Err(e) => {
                    info!(%peer_addr, "WebSocket handshake error: {e}");
                    return;
                }
            };
            handle_connection(ws_stream, registry, ids.next_id(), queue_capacity).await;
        });
    }
}

#[derive(Debug)]
struct Handshake {
    path: String,
    origins: OriginPolicy,
    config: WebSocketConfig,
}

impl Handshake {
    fn new(settings: &Settings) -> Self {
        let max = settings.server.max_message_bytes;
        Self {
            path: settings.server.path.clone(),
            origins: OriginPolicy::from(&settings.origins),
            config: WebSocketConfig::default()
                .max_message_size(Some(max))
                .max_frame_size(Some(max)),
        }
    }

    async fn accept(
        &self,
        stream: TcpStream,
    ) -> Result<WebSocketStream<TcpStream>, tungstenite::Error> {
        let callback = |req: &Request, resp: Response| self.check(req, resp);
        accept_hdr_async_with_config(stream, callback, Some(self.config)).await
    }

    fn check(&self, req: &Request, resp: Response) -> Result<Response, ErrorResponse> {
        if req.uri().path() != self.path {
            return Err(reject(StatusCode::NOT_FOUND, "not found"));
        }

        let origin = req.headers().get(ORIGIN).and_then(|v| v.to_str().ok());
        if !self.origins.allows(origin) {
            return Err(reject(StatusCode::FORBIDDEN, "origin not allowed"));
        }

        Ok(resp)
    }
}

fn reject(status: StatusCode, reason: &str) -> ErrorResponse {
    let mut response = ErrorResponse::new(Some(reason.to_string()));
    *response.status_mut() = status;
    response
}
