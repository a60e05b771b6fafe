use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    domain::{BoatState, Location},
    error::ProtocolError,
};

pub mod events {
    pub const POWER_TOGGLE: &str = "POWER_TOGGLE";
    pub const STOP: &str = "STOP";
    pub const FORWARD: &str = "FORWARD_MOVEMENT";
    pub const BACKWARD: &str = "BACKWARD_MOVEMENT";
    pub const LEFT: &str = "LEFT_MOVEMENT";
    pub const RIGHT: &str = "RIGHT_MOVEMENT";
    pub const CHANGE_SPEED: &str = "CHANGE_SPEED";
    pub const SAVE_LOCATION: &str = "SAVE_LOCATION";
    pub const GET_LOCATION: &str = "GET_LOCATION";
    pub const VIDEO_FRAME: &str = "VIDEO_FRAME";
}

/// A command sent by a controller. Payloads are already validated once a
/// value of this type exists.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientCommand {
    PowerToggle(bool),
    Stop,
    Forward,
    Backward,
    Left,
    Right,
    ChangeSpeed(f64),
    SaveLocation(Location),
    GetLocation,
    VideoFrame(Vec<u8>),
}

#[derive(Debug, Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: Value,
}

impl ClientCommand {
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::PowerToggle(_) => events::POWER_TOGGLE,
            Self::Stop => events::STOP,
            Self::Forward => events::FORWARD,
            Self::Backward => events::BACKWARD,
            Self::Left => events::LEFT,
            Self::Right => events::RIGHT,
            Self::ChangeSpeed(_) => events::CHANGE_SPEED,
            Self::SaveLocation(_) => events::SAVE_LOCATION,
            Self::GetLocation => events::GET_LOCATION,
            Self::VideoFrame(_) => events::VIDEO_FRAME,
        }
    }

    /// Parses a `{"event": ..., "data": ...}` text frame.
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        let envelope: Envelope =
            serde_json::from_str(text).map_err(ProtocolError::InvalidEnvelope)?;
        Self::from_parts(&envelope.event, envelope.data)
    }

    pub fn from_parts(event: &str, data: Value) -> Result<Self, ProtocolError> {
        let command = match event {
            events::POWER_TOGGLE => match data {
                Value::Bool(flag) => Self::PowerToggle(flag),
                other => {
                    return Err(ProtocolError::invalid_payload(
                        event,
                        format!("expected boolean, got {other}"),
                    ))
                }
            },
            events::STOP => Self::Stop,
            events::FORWARD => Self::Forward,
            events::BACKWARD => Self::Backward,
            events::LEFT => Self::Left,
            events::RIGHT => Self::Right,
            events::CHANGE_SPEED => match data.as_f64() {
                Some(speed) => Self::ChangeSpeed(speed),
                None => {
                    return Err(ProtocolError::invalid_payload(
                        event,
                        format!("expected number, got {data}"),
                    ))
                }
            },
            events::SAVE_LOCATION => {
                let location: Location = serde_json::from_value(data)
                    .map_err(|e| ProtocolError::invalid_payload(event, e))?;
                Self::SaveLocation(location)
            }
            events::GET_LOCATION => Self::GetLocation,
            events::VIDEO_FRAME => {
                let Value::String(encoded) = data else {
                    return Err(ProtocolError::invalid_payload(
                        event,
                        "expected base64 string",
                    ));
                };
                let frame = STANDARD
                    .decode(encoded.as_bytes())
                    .map_err(|e| ProtocolError::invalid_payload(event, e))?;
                Self::VideoFrame(frame)
            }
            other => return Err(ProtocolError::UnknownEvent(other.to_string())),
        };
        Ok(command)
    }

    /// Renders the command as a text frame understood by [`ClientCommand::decode`].
    pub fn encode(&self) -> String {
        let data = match self {
            Self::PowerToggle(flag) => Value::Bool(*flag),
            Self::ChangeSpeed(speed) => json!(speed),
            Self::SaveLocation(location) => json!(location),
            Self::VideoFrame(frame) => Value::String(STANDARD.encode(frame)),
            Self::Stop
            | Self::Forward
            | Self::Backward
            | Self::Left
            | Self::Right
            | Self::GetLocation => return json!({ "event": self.event_name() }).to_string(),
        };
        json!({ "event": self.event_name(), "data": data }).to_string()
    }
}

/// Text events pushed from the relay to a client. Relayed video frames travel
/// as binary messages and are not part of this enum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    #[serde(rename = "BOAT_STATE")]
    BoatState(BoatState),
    #[serde(rename = "error")]
    Error(String),
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
