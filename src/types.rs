use serde::{Deserialize, Serialize};

/// Upper bound of the normalized screenshot grid on both axes.
pub const GRID_MAX: u16 = 1000;

/// The next UI step the model asks the caller to perform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub plan: String,
    pub action: ActionKind,
    pub target: String,
    pub coords: Coords,
    pub text_input: String,
    pub status: Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    Click,
    Type,
    Scroll,
    Wait,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    InProgress,
    Success,
}

/// Position on the 0..=1000 grid, independent of the image's pixel size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coords {
    pub x: GridCoord,
    pub y: GridCoord,
}

/// A single axis value, checked against [`GRID_MAX`] on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u16")]
pub struct GridCoord(u16);

impl GridCoord {
    pub fn new(value: i64) -> Result<Self, String> {
        Self::try_from(value)
    }

    pub fn get(self) -> u16 {
        self.0
    }
}

impl TryFrom<i64> for GridCoord {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if (0..=i64::from(GRID_MAX)).contains(&value) {
            Ok(Self(value as u16))
        } else {
            Err(format!(
                "coordinate must be between 0 and {GRID_MAX}, got {value}"
            ))
        }
    }
}

impl From<GridCoord> for u16 {
    fn from(value: GridCoord) -> Self {
        value.0
    }
}

impl Action {
    /// `text_input` is only meaningful for TYPE; the model is told to leave it
    /// empty otherwise, but nothing enforces that.
    pub fn has_stray_text_input(&self) -> bool {
        self.action != ActionKind::Type && !self.text_input.is_empty()
    }
}
