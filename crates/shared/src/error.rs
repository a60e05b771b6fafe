use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Validation,
    Transport,
}

/// Text carried by the outbound `error` event. Clients never see more detail
/// than this.
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred";
pub const INVALID_COMMAND_MESSAGE: &str = "Invalid command";

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("event envelope is not valid JSON: {0}")]
    InvalidEnvelope(#[source] serde_json::Error),
    #[error("unknown event `{0}`")]
    UnknownEvent(String),
    #[error("invalid payload for `{event}`: {reason}")]
    InvalidPayload { event: String, reason: String },
}

impl ProtocolError {
    pub fn code(&self) -> ErrorCode {
        ErrorCode::Validation
    }

    pub(crate) fn invalid_payload(event: &str, reason: impl ToString) -> Self {
        Self::InvalidPayload {
            event: event.to_string(),
            reason: reason.to_string(),
        }
    }
}
