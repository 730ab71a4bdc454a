pub mod brain;
pub mod config;
pub mod error;
pub mod face;
pub mod interpreter;
pub mod navigator;
pub mod prompt;
pub mod screenshot;
pub mod types;

pub use brain::{GeminiBrain, Generate};
pub use error::{NavError, NavResult};
pub use interpreter::interpret;
pub use navigator::{NavigationRequest, Navigator};
pub use types::{Action, ActionKind, Coords, GridCoord, Status};
