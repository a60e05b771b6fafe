//! Command interpreter: maps the current boat state and one command to the
//! next state. No I/O, no locking, no validation beyond what the typed
//! command already guarantees.
//!
//! Commands are accepted regardless of `power`, and speed/location payloads
//! are stored as given, without clamping to `min_speed..=max_speed`.

use shared::{
    domain::{BoatState, Direction},
    protocol::ClientCommand,
};

pub fn next_state(current: BoatState, command: &ClientCommand) -> BoatState {
    let mut next = current;
    match command {
        ClientCommand::PowerToggle(flag) => next.power = *flag,
        ClientCommand::Stop => next.reset_motion(),
        ClientCommand::Forward => {
            next.direction = Direction::Cw;
            next.speed = next.min_speed;
            next.is_moving = true;
        }
        ClientCommand::Backward => {
            next.direction = Direction::Ccw;
            next.speed = next.min_speed;
            next.is_moving = true;
        }
        // Steering overwrites the rotational sense set by forward/backward.
        ClientCommand::Left => next.direction = Direction::Left,
        ClientCommand::Right => next.direction = Direction::Right,
        ClientCommand::ChangeSpeed(speed) => next.speed = *speed,
        ClientCommand::SaveLocation(location) => next.location = *location,
        // Snapshot-only; frames are relayed and never touch state.
        ClientCommand::GetLocation | ClientCommand::VideoFrame(_) => {}
    }
    next
}

/// Log line for a committed command, `None` for commands that change nothing.
pub fn describe(command: &ClientCommand) -> Option<&'static str> {
    let line = match command {
        ClientCommand::PowerToggle(true) => "boat powered on",
        ClientCommand::PowerToggle(false) => "boat powered off",
        ClientCommand::Stop => "boat state reset to defaults",
        ClientCommand::Forward => "boat moving forward",
        ClientCommand::Backward => "boat moving backward",
        ClientCommand::Left => "boat moving left",
        ClientCommand::Right => "boat moving right",
        ClientCommand::ChangeSpeed(_) => "speed changed",
        ClientCommand::SaveLocation(_) => "location saved",
        ClientCommand::GetLocation | ClientCommand::VideoFrame(_) => return None,
    };
    Some(line)
}

#[cfg(test)]
#[path = "tests/interpreter_tests.rs"]
mod tests;
