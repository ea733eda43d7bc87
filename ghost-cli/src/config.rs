use anyhow::Context;
use ghost_engine::config::DEFAULT_MAX_GAMES;
use ghost_engine::{
    AcceptAll, Dictionary, GameSettings, RegistryConfig, WordList, MAX_PLAYERS,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Word list used when `--word-list` is not given. Without one any
    /// alphabetic word is accepted.
    pub word_list: Option<PathBuf>,
    pub max_games: usize,
    pub max_players: usize,
    pub log_level: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            word_list: None,
            max_games: DEFAULT_MAX_GAMES,
            max_players: MAX_PLAYERS,
            log_level: "info".to_string(),
        }
    }
}

impl CliConfig {
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ghost")
            .join("config.json")
    }

    /// Load from `path`, or from the default location. Only a missing
    /// default file falls back to defaults.
    pub async fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let path = Self::default_path();
                if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
                    return Ok(Self::default());
                }
                path
            }
        };

        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn registry_config(&self, players: Option<usize>) -> anyhow::Result<RegistryConfig> {
        let game = GameSettings::with_max_players(players.unwrap_or(self.max_players))?;
        let config = RegistryConfig {
            max_games: self.max_games,
            game,
        };
        config.validate()?;
        Ok(config)
    }

    /// The dictionary for a game; a command-line path wins over the config.
    pub fn dictionary(&self, word_list: Option<&Path>) -> anyhow::Result<Arc<dyn Dictionary>> {
        match word_list.or(self.word_list.as_deref()) {
            Some(path) => {
                let words = WordList::from_file(path)
                    .with_context(|| format!("Failed to load word list {}", path.display()))?;
                Ok(Arc::new(words))
            }
            None => Ok(Arc::new(AcceptAll)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: CliConfig = serde_json::from_str(r#"{"max_players": 6}"#).unwrap();
        assert_eq!(config.max_players, 6);
        assert_eq!(config.max_games, DEFAULT_MAX_GAMES);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.word_list, None);
    }

    #[test]
    fn test_registry_config_override() {
        let config = CliConfig::default();
        assert_eq!(config.registry_config(None).unwrap().game.max_players, 10);
        assert_eq!(config.registry_config(Some(4)).unwrap().game.max_players, 4);
        assert!(config.registry_config(Some(12)).is_err());
    }

    #[test]
    fn test_dictionary_from_word_list() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "egg\npea").unwrap();

        let config = CliConfig::default();
        let dictionary = config.dictionary(Some(file.path())).unwrap();
        assert!(dictionary.contains("egg"));
        assert!(!dictionary.contains("ham"));

        assert!(config.dictionary(None).unwrap().contains("ham"));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"max_games": 2, "log_level": "debug"}}"#).unwrap();

        let config = CliConfig::load(Some(file.path())).await.unwrap();
        assert_eq!(config.max_games, 2);
        assert_eq!(config.log_level, "debug");

        let missing = file.path().with_extension("missing");
        assert!(CliConfig::load(Some(&missing)).await.is_err());
    }
}
