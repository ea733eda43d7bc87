use crate::error::{GameError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque player identity supplied by the caller (a chat username, usually).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl AsRef<str>) -> Result<Self> {
        let trimmed = id.as_ref().trim();
        if trimmed.is_empty() {
            return Err(GameError::InvalidPlayerId(id.as_ref().to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PlayerId {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for PlayerId {
    type Error = GameError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<PlayerId> for String {
    fn from(value: PlayerId) -> Self {
        value.0
    }
}

/// External session (chat group) a game is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Game phases, in the order a game moves through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    RegisterPlayers,
    SetParams,
    GhostVoteRound,
    ClueRound,
    VoteRound,
    GuessRound,
    WinnerTown,
    WinnerGhost,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::WinnerTown | Self::WinnerGhost)
    }

    pub fn winner(self) -> Option<Team> {
        match self {
            Self::WinnerTown => Some(Team::Town),
            Self::WinnerGhost => Some(Team::Ghost),
            _ => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::RegisterPlayers => "Register Players",
            Self::SetParams => "Set Parameters",
            Self::GhostVoteRound => "Ghost Vote Round",
            Self::ClueRound => "Clue Round",
            Self::VoteRound => "Vote Round",
            Self::GuessRound => "Guess Round",
            Self::WinnerTown => "Town won",
            Self::WinnerGhost => "Ghosts won",
        };
        f.write_str(repr)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Town,
    Ghost,
    Fool,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Town => write!(f, "Town"),
            Role::Ghost => write!(f, "Ghost"),
            Role::Fool => write!(f, "Fool"),
        }
    }
}

/// The two sides that can win a game. Fools play along with the Town.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    Town,
    Ghost,
}

impl Team {
    pub fn winning_phase(self) -> Phase {
        match self {
            Team::Town => Phase::WinnerTown,
            Team::Ghost => Phase::WinnerGhost,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::Town => write!(f, "Town"),
            Team::Ghost => write!(f, "Ghosts"),
        }
    }
}

/// A single vote: either a living player or an explicit abstention.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ballot {
    Player(PlayerId),
    Abstain,
}

impl Ballot {
    pub fn target(&self) -> Option<&PlayerId> {
        match self {
            Ballot::Player(id) => Some(id),
            Ballot::Abstain => None,
        }
    }
}

impl From<PlayerId> for Ballot {
    fn from(value: PlayerId) -> Self {
        Ballot::Player(value)
    }
}

impl fmt::Display for Ballot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ballot::Player(id) => write!(f, "@{}", id),
            Ballot::Abstain => write!(f, "(abstain)"),
        }
    }
}
