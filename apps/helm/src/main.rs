use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use futures::{SinkExt, StreamExt};
use shared::{
    domain::{BoatState, Location},
    protocol::{ClientCommand, ServerEvent},
};
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info};
use url::Url;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Command-line controller for the boat relay.
///
/// The relay cuts power whenever a controller disconnects, so `power on`
/// only lasts while some client stays connected.
#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "http://localhost:5000")]
    server_url: String,
    #[arg(long, default_value_t = 5)]
    timeout_secs: u64,
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum PowerState {
    On,
    Off,
}

#[derive(Subcommand, Debug)]
enum Command {
    Power {
        #[arg(value_enum)]
        state: PowerState,
    },
    Stop,
    Forward,
    Backward,
    Left,
    Right,
    Speed {
        #[arg(allow_negative_numbers = true)]
        value: f64,
    },
    SaveLocation {
        #[arg(allow_negative_numbers = true)]
        latitude: f64,
        #[arg(allow_negative_numbers = true)]
        longitude: f64,
    },
    GetLocation,
    /// Print the size of every relayed video frame.
    WatchVideo {
        #[arg(long)]
        frames: Option<usize>,
    },
}

impl Command {
    fn to_client_command(&self) -> Option<ClientCommand> {
        let command = match self {
            Self::Power { state } => ClientCommand::PowerToggle(*state == PowerState::On),
            Self::Stop => ClientCommand::Stop,
            Self::Forward => ClientCommand::Forward,
            Self::Backward => ClientCommand::Backward,
            Self::Left => ClientCommand::Left,
            Self::Right => ClientCommand::Right,
            Self::Speed { value } => ClientCommand::ChangeSpeed(*value),
            Self::SaveLocation {
                latitude,
                longitude,
            } => ClientCommand::SaveLocation(Location {
                latitude: *latitude,
                longitude: *longitude,
            }),
            Self::GetLocation => ClientCommand::GetLocation,
            Self::WatchVideo { .. } => return None,
        };
        Some(command)
    }
}

fn ws_url(server_url: &str) -> Result<String> {
    let mut url = Url::parse(server_url)
        .with_context(|| format!("server_url '{server_url}' is not a valid URL"))?;
    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => bail!("unsupported scheme '{other}'; use http:// or https://"),
    };
    url.set_scheme(scheme)
        .map_err(|_| anyhow!("cannot use scheme '{scheme}' with '{server_url}'"))?;
    url.set_path("/ws");
    url.set_query(None);
    Ok(url.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();
    let cli = Cli::parse();

    let ws_url = ws_url(&cli.server_url)?;
    let (mut ws, _) = connect_async(ws_url.as_str())
        .await
        .with_context(|| format!("failed to connect websocket: {ws_url}"))?;
    info!(%ws_url, "connected");
    let wait = Duration::from_secs(cli.timeout_secs);

    if let Command::WatchVideo { frames } = cli.command {
        return watch_video(&mut ws, frames).await;
    }
    let command = cli
        .command
        .to_client_command()
        .ok_or_else(|| anyhow!("{:?} has no wire command", cli.command))?;
    let state = send_command(&mut ws, &command, wait).await?;
    println!("{}", serde_json::to_string_pretty(&state)?);

    let _ = ws.close(None).await;
    Ok(())
}

/// Sends one command and waits for the snapshot the relay replies with.
async fn send_command(
    ws: &mut Socket,
    command: &ClientCommand,
    wait: Duration,
) -> Result<BoatState> {
    ws.send(Message::Text(command.encode()))
        .await
        .context("failed to send command")?;
    debug!(event = command.event_name(), "command sent");

    loop {
        let msg = tokio::time::timeout(wait, ws.next())
            .await
            .map_err(|_| anyhow!("no reply within {}s", wait.as_secs()))?
            .ok_or_else(|| anyhow!("server closed the connection"))?
            .context("websocket read failed")?;
        let Message::Text(text) = msg else {
            continue;
        };
        match serde_json::from_str::<ServerEvent>(&text)? {
            ServerEvent::BoatState(state) => return Ok(state),
            ServerEvent::Error(message) => bail!("server rejected command: {message}"),
        }
    }
}

async fn watch_video(ws: &mut Socket, frames: Option<usize>) -> Result<()> {
    let mut seen = 0usize;
    while frames.map_or(true, |limit| seen < limit) {
        match ws.next().await {
            Some(Ok(Message::Binary(frame))) => {
                seen += 1;
                println!("frame {seen}: {} bytes", frame.len());
            }
            Some(Ok(other)) => debug!(?other, "ignoring non-frame message"),
            Some(Err(error)) => return Err(error).context("video stream failed"),
            None => break,
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
