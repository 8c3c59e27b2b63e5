//! Game module: the clicker rules and the player's record.
//!
//! `state` holds the pure click/upgrade arithmetic, `player` loads or
//! creates the stored record, and `controller` ties the two together with
//! an explicit persist after every command.

pub mod card;
pub mod controller;
pub mod player;
pub mod state;

pub use controller::GameController;
pub use player::{DEFAULT_USERNAME, Player, needs_username};
pub use state::GameState;
