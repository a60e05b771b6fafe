use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

id_newtype!(SessionId);

pub const DEFAULT_MIN_SPEED: f64 = 30.0;
pub const DEFAULT_MAX_SPEED: f64 = 100.0;

/// Where the boat is parked when STOP resets it.
pub const DEFAULT_LOCATION: Location = Location {
    latitude: 23.8103,
    longitude: 90.4125,
};

/// Heading of the boat. `Cw`/`Ccw` come from forward/backward travel,
/// `Left`/`Right` from steering; the last command wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    #[serde(rename = "CW")]
    Cw,
    #[serde(rename = "CCW")]
    Ccw,
    #[serde(rename = "LEFT")]
    Left,
    #[serde(rename = "RIGHT")]
    Right,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cw => "CW",
            Self::Ccw => "CCW",
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for Location {
    fn default() -> Self {
        DEFAULT_LOCATION
    }
}

/// Full state of the controlled boat, sent to clients as the `BOAT_STATE`
/// snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoatState {
    pub power: bool,
    pub speed: f64,
    pub is_moving: bool,
    pub max_speed: f64,
    pub min_speed: f64,
    pub direction: Direction,
    pub location: Location,
}

impl BoatState {
    pub fn new(min_speed: f64, max_speed: f64) -> Self {
        Self {
            power: false,
            speed: 0.0,
            is_moving: false,
            max_speed,
            min_speed,
            direction: Direction::default(),
            location: DEFAULT_LOCATION,
        }
    }

    /// Restores the motion fields to their start-up values. Power and the
    /// speed limits are left alone.
    pub fn reset_motion(&mut self) {
        self.speed = 0.0;
        self.is_moving = false;
        self.direction = Direction::default();
        self.location = DEFAULT_LOCATION;
    }
}

impl Default for BoatState {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_SPEED, DEFAULT_MAX_SPEED)
    }
}
