use axum::body::Bytes;
use shared::{
    domain::{BoatState, SessionId},
    error::{ErrorCode, ProtocolError, GENERIC_ERROR_MESSAGE, INVALID_COMMAND_MESSAGE},
    protocol::{ClientCommand, ServerEvent},
};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    emission::{FrameRelay, FrameSubscription, Outbox},
    interpreter,
    store::StateStore,
};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("rejected command: {0}")]
    Validation(#[from] ProtocolError),
    #[error("transport error: {0}")]
    Transport(#[from] axum::Error),
    #[error("session writer closed")]
    Closed,
}

impl SessionError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(e) => e.code(),
            Self::Transport(_) | Self::Closed => ErrorCode::Transport,
        }
    }

    /// Whether the session should keep reading after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// One connected client. Holds nothing of its own beyond identity; all
/// mutable state lives in the shared [`StateStore`].
pub struct ConnectionSession {
    id: SessionId,
    store: StateStore,
    relay: FrameRelay,
    outbox: Outbox,
}

impl ConnectionSession {
    /// Registers a new session for frame relay. Nothing is sent to the
    /// client until it issues its first command.
    pub fn open(
        store: StateStore,
        relay: FrameRelay,
        outbox: Outbox,
    ) -> (Self, FrameSubscription) {
        let id = SessionId::random();
        let frames = relay.subscribe(id);
        info!(session_id = %id, "client connected");
        (
            Self {
                id,
                store,
                relay,
                outbox,
            },
            frames,
        )
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub async fn handle_text(&self, text: &str) -> Result<(), SessionError> {
        let command = ClientCommand::decode(text)?;
        self.dispatch(command).await
    }

    pub fn handle_binary(&self, frame: Bytes) {
        self.relay.publish(self.id, frame);
    }

    /// Applies one command and replies to this session with the committed
    /// snapshot. Video frames are relayed instead and produce no reply.
    pub async fn dispatch(&self, command: ClientCommand) -> Result<(), SessionError> {
        if let ClientCommand::VideoFrame(frame) = command {
            self.handle_binary(Bytes::from(frame));
            return Ok(());
        }

        let snapshot = self.store.apply(&command).await;
        if let Some(line) = interpreter::describe(&command) {
            info!(
                session_id = %self.id,
                power = snapshot.power,
                speed = snapshot.speed,
                direction = snapshot.direction.as_str(),
                "{line}"
            );
        }
        self.emit_snapshot(snapshot).await
    }

    async fn emit_snapshot(&self, snapshot: BoatState) -> Result<(), SessionError> {
        self.outbox
            .send(ServerEvent::BoatState(snapshot))
            .await
            .map_err(|_| SessionError::Closed)
    }

    /// Logs `error` and tells this client, and only this client, that
    /// something went wrong. State is left as it was.
    pub fn report(&self, error: &SessionError) {
        let message = match error {
            SessionError::Validation(_) => INVALID_COMMAND_MESSAGE,
            SessionError::Transport(_) | SessionError::Closed => GENERIC_ERROR_MESSAGE,
        };
        warn!(session_id = %self.id, code = ?error.code(), %error, "session error");
        self.outbox
            .send_best_effort(ServerEvent::Error(message.to_string()));
    }

    /// Disconnect rule: a client going silent cuts power. The final snapshot
    /// is pushed best-effort since the channel may already be gone.
    pub async fn close(self) -> BoatState {
        let (was_powered, snapshot) = self.store.power_off().await;
        info!(session_id = %self.id, "client disconnected");
        if was_powered {
            info!(session_id = %self.id, "boat powered off");
        }
        self.outbox
            .send_best_effort(ServerEvent::BoatState(snapshot));
        snapshot
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
