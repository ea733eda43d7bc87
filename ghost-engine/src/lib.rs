//! Ghost word game engine
//!
//! Rules engine for Ghost, a social-deduction word game. A game moves through
//! registration, word setup, a secret ghost vote, clue rounds, lynch votes and
//! a final guess. Every operation reports whether its round completed so the
//! caller (a chat bot, or the bundled CLI) knows what to announce next.

pub mod config;
pub mod dictionary;
pub mod error;
pub mod game;
pub mod player;
pub mod registry;
pub mod roles;
pub mod turn_order;
pub mod types;
pub mod vote;

pub use config::{GameSettings, RegistryConfig};
pub use dictionary::{AcceptAll, Dictionary, WordList};
pub use error::{DictionaryError, GameError, RegistryError, RegistryResult, Result};
pub use game::{
    evaluate_winner, Clue, ClueSubmission, GameInfo, GhostGame, GhostVote, GuessOutcome, Lynch,
    Registration, VoteOutcome,
};
pub use player::{Player, PlayerInfo};
pub use registry::{GameRegistry, SessionInfo, SharedGame};
pub use roles::{allocate_roles, role_counts, role_table, RoleCounts, MAX_PLAYERS, MIN_PLAYERS};
pub use turn_order::TurnOrder;
pub use types::{Ballot, Phase, PlayerId, Role, SessionId, Team};
pub use vote::{tally, NoElection, Tally, TallyResult};

use std::sync::Arc;

/// Create a game with default settings that accepts any alphabetic word.
pub fn create_game() -> GhostGame {
    GhostGame::new(Arc::new(AcceptAll))
}
