use crate::error::{GameError, Result};
use crate::roles::{MAX_PLAYERS, MIN_PLAYERS};
use serde::{Deserialize, Serialize};

pub const MIN_WORD_LENGTH: usize = 3;
pub const MAX_WORD_LENGTH: usize = 15;
pub const DEFAULT_MAX_GAMES: usize = 4;

/// Per-game parameters fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSettings {
    /// Registration closes once this many players have joined.
    pub max_players: usize,
    pub min_word_len: usize,
    pub max_word_len: usize,
    /// Count living Fools in the denominator of the ghost-majority check.
    /// Off by default: Fools are left out of majority accounting entirely.
    #[serde(default)]
    pub count_fools_in_majority: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            max_players: MAX_PLAYERS,
            min_word_len: MIN_WORD_LENGTH,
            max_word_len: MAX_WORD_LENGTH,
            count_fools_in_majority: false,
        }
    }
}

impl GameSettings {
    pub fn with_max_players(max_players: usize) -> Result<Self> {
        let settings = Self {
            max_players,
            ..Self::default()
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.max_players) {
            return Err(GameError::UnsupportedPlayerCount(self.max_players));
        }

        if self.min_word_len == 0 {
            return Err(GameError::settings("Minimum word length must be greater than 0"));
        }

        if self.min_word_len > self.max_word_len {
            return Err(GameError::settings(format!(
                "Minimum word length {} exceeds maximum {}",
                self.min_word_len, self.max_word_len
            )));
        }

        Ok(())
    }
}

/// Registry-wide parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    pub max_games: usize,
    pub game: GameSettings,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_games: DEFAULT_MAX_GAMES,
            game: GameSettings::default(),
        }
    }
}

impl RegistryConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_games == 0 {
            return Err(GameError::settings("Max games must be greater than 0"));
        }
        self.game.validate()
    }
}
