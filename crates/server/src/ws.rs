use std::{sync::Arc, time::Duration};

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{Sink, SinkExt, StreamExt};
use shared::protocol::ServerEvent;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::{
    app_state::AppState,
    emission::{FrameSubscription, Outbox},
    session::{ConnectionSession, SessionError},
};

/// How long the writer gets to flush the final snapshot after the reader
/// has stopped.
const CLOSE_FLUSH_TIMEOUT: Duration = Duration::from_secs(1);

pub(crate) async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.max_message_size(state.max_frame_bytes)
        .on_upgrade(move |socket| ws_connection(state, socket))
}

async fn ws_connection(state: Arc<AppState>, socket: WebSocket) {
    let (sender, mut receiver) = socket.split();
    let (outbox, outbox_rx) = Outbox::channel(state.outbox_capacity);
    let (session, frames) =
        ConnectionSession::open(state.store.clone(), state.relay.clone(), outbox);

    let mut send_task = tokio::spawn(write_loop(sender, outbox_rx, frames));

    while let Some(msg) = receiver.next().await {
        let result = match msg {
            Ok(Message::Text(text)) => session.handle_text(&text).await,
            Ok(Message::Binary(frame)) => {
                session.handle_binary(frame.into());
                Ok(())
            }
            Ok(Message::Close(_)) => break,
            Ok(Message::Ping(_) | Message::Pong(_)) => Ok(()),
            Err(error) => Err(SessionError::from(error)),
        };

        if let Err(error) = result {
            session.report(&error);
            if !error.is_recoverable() {
                break;
            }
        }
    }

    let session_id = session.id();
    session.close().await;

    // Dropping the session closed the outbox, so the writer exits once the
    // final snapshot is flushed or the socket refuses it.
    if tokio::time::timeout(CLOSE_FLUSH_TIMEOUT, &mut send_task)
        .await
        .is_err()
    {
        debug!(%session_id, "writer did not finish in time; aborting");
        send_task.abort();
    }
}

async fn write_loop<S>(
    mut sender: S,
    mut outbox_rx: mpsc::Receiver<ServerEvent>,
    mut frames: FrameSubscription,
) where
    S: Sink<Message> + Unpin,
{
    loop {
        let message = tokio::select! {
            event = outbox_rx.recv() => {
                let Some(event) = event else { break };
                match serde_json::to_string(&event) {
                    Ok(text) => Message::Text(text),
                    Err(error) => {
                        warn!(%error, "failed to encode server event");
                        continue;
                    }
                }
            }
            frame = frames.recv() => {
                let Some(frame) = frame else { break };
                Message::Binary(frame.to_vec())
            }
        };

        if sender.send(message).await.is_err() {
            break;
        }
    }
}
