use crate::types::{Phase, PlayerId, SessionId};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GameError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid game state! Expected {expected} but got {actual}")]
    InvalidPhase { expected: Phase, actual: Phase },

    #[error("Player {0} is already registered")]
    PlayerAlreadyRegistered(PlayerId),

    #[error("Player capacity of {capacity} exceeded")]
    CapacityReached { capacity: usize },

    #[error("Not enough players joined (min {min}, have {actual})")]
    NotEnoughPlayers { min: usize, actual: usize },

    #[error("Unsupported player count: {0} (the game takes 3 to 10 players)")]
    UnsupportedPlayerCount(usize),

    #[error("Invalid player identity: {0:?}")]
    InvalidPlayerId(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("The word must be alphabetic (no numbers or symbols)")]
    WordNotAlphabetic,

    #[error("The word cannot be too short ({min} char min)")]
    WordTooShort { min: usize },

    #[error("The word cannot be too long ({max} char max)")]
    WordTooLong { max: usize },

    #[error("'{0}' is not a valid word")]
    WordNotInDictionary(String),

    #[error("Set the town word first")]
    TownWordNotSet,

    #[error("The fool word and town word must have the same length ({expected} chars)")]
    WordLengthMismatch { expected: usize, actual: usize },

    #[error("The fool word cannot be exactly the same as the town word")]
    DuplicateWord,

    #[error("Roles have not been allocated yet")]
    RolesNotAllocated,

    #[error("User @{0} is not registered in this game")]
    PlayerNotFound(PlayerId),

    #[error("User @{0} is currently not alive or not playing")]
    PlayerNotAlive(PlayerId),

    #[error("User @{0} has already given a clue this round")]
    ClueAlreadyGiven(PlayerId),

    #[error("It is currently user @{expected}'s turn")]
    OutOfTurn { expected: PlayerId },

    #[error("A clue cannot be empty")]
    EmptyClue,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GameError {
    pub fn invalid_phase(expected: Phase, actual: Phase) -> Self {
        Self::InvalidPhase { expected, actual }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn settings(msg: impl Into<String>) -> Self {
        Self::InvalidSettings(msg.into())
    }

    /// Phase errors are always recoverable by retrying later.
    pub fn is_invalid_phase(&self) -> bool {
        matches!(self, Self::InvalidPhase { .. })
    }
}

pub type RegistryResult<T> = std::result::Result<T, RegistryError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("There is already an ongoing game in session {0}")]
    GameAlreadyExists(SessionId),

    #[error("User @{0} is already hosting a game")]
    HostAlreadyHosting(PlayerId),

    #[error("Too many ongoing games (max {max}), please wait")]
    TooManyGames { max: usize },

    #[error("Game not found for session {0}")]
    GameNotFound(SessionId),

    #[error("User @{0} is not the host of any game")]
    NotAHost(PlayerId),

    #[error(transparent)]
    Game(#[from] GameError),
}

#[derive(Error, Debug)]
pub enum DictionaryError {
    #[error("Failed to read word list: {0}")]
    Io(#[from] std::io::Error),

    #[error("Word list is empty")]
    Empty,
}
