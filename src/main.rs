//! CLI for signal-relay
//!
//! Subcommands:
//! - `server`: run the WebSocket signaling relay
//! - `ping`: connect to a relay, send a ping and print the reply

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use signal_relay::broker::TopicRegistry;
use signal_relay::config::{DEFAULT_CONFIG_PATH, load_config_from};
use signal_relay::transport::{Envelope, start_websocket_server};
use signal_relay::utils::logging;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::ORIGIN;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "signal-relay")]
enum Command {
    /// Start the signaling server
    Server {
        /// Configuration file, without extension
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: String,
    },
    /// Send a ping to a running relay and print the reply
    Ping {
        /// WebSocket URL of the relay endpoint
        #[arg(long, default_value = "ws://127.0.0.1:8080/signaling")]
        url: String,
        /// Origin header to present during the handshake
        #[arg(long, default_value = "https://gridunlockapp.com")]
        origin: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cmd = Command::parse();

    let result = match cmd {
        Command::Server { config } => run_server(&config).await.map_err(|e| {
            error!("Server failed: {e}");
        }),
        Command::Ping { url, origin } => {
            logging::init("info");
            run_ping(&url, &origin).await.map_err(|e| {
                error!("Ping failed: {e}");
            })
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(()) => ExitCode::FAILURE,
    }
}

async fn run_server(config_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let settings = match load_config_from(config_path) {
        Ok(settings) => settings,
        Err(e) => {
            logging::init("info");
            return Err(e.into());
        }
    };
    logging::init(&settings.log.level);
    info!(mode = ?settings.server.mode, "starting signaling relay");

    let registry = Arc::new(TopicRegistry::new());

    tokio::select! {
        result = start_websocket_server(settings, registry) => {
            result?;
            return Err("WebSocket server exited unexpectedly".into());
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received. Exiting gracefully.");
        }
    }

    Ok(())
}

async fn run_ping(url: &str, origin: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut request = url.into_client_request()?;
    request
        .headers_mut()
        .insert(ORIGIN, HeaderValue::from_str(origin)?);

    let (mut ws_stream, _response) = connect_async(request).await?;

    let ping = serde_json::to_string(&Envelope::ping())?;
    ws_stream.send(WsMessage::text(ping)).await?;

    match ws_stream.next().await {
        Some(Ok(WsMessage::Text(reply))) => println!("{}", reply.as_str()),
        Some(Ok(other)) => println!("unexpected frame: {other:?}"),
        Some(Err(e)) => return Err(e.into()),
        None => println!("connection closed without reply"),
    }

    ws_stream.close(None).await?;
    Ok(())
}
