use crate::config::RegistryConfig;
use crate::dictionary::Dictionary;
use crate::error::{RegistryError, RegistryResult};
use crate::game::GhostGame;
use crate::types::{Phase, PlayerId, SessionId};
use chrono::{DateTime, Duration, Utc};
use parking_lot::{Mutex, RwLock};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

pub type SharedGame = Arc<Mutex<GhostGame>>;

#[derive(Clone)]
struct Entry {
    game: SharedGame,
    host: PlayerId,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct Tables {
    games: HashMap<SessionId, Entry>,
    // kept in sync with `Entry::host`
    hosts: HashMap<PlayerId, SessionId>,
}

/// Summary of a running game for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session: SessionId,
    pub host: PlayerId,
    /// `None` while another caller holds the game.
    pub phase: Option<Phase>,
    pub player_count: Option<usize>,
    pub created_at: DateTime<Utc>,
}

/// Maps sessions and hosts to running games and caps how many run at once.
///
/// Each game sits behind its own lock: calls for one session are serialized,
/// calls for different sessions never touch each other's state.
pub struct GameRegistry {
    config: RegistryConfig,
    tables: Arc<RwLock<Tables>>,
}

impl GameRegistry {
    pub fn new(config: RegistryConfig) -> RegistryResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            tables: Arc::new(RwLock::new(Tables::default())),
        })
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn create_game(
        &self,
        session: SessionId,
        host: PlayerId,
        dictionary: Arc<dyn Dictionary>,
    ) -> RegistryResult<SharedGame> {
        let game = GhostGame::with_settings(self.config.game.clone(), dictionary)?;
        self.insert(session, host, game)
    }

    /// Create a game whose role allocation uses `rng`.
    pub fn create_game_with_rng<R>(
        &self,
        session: SessionId,
        host: PlayerId,
        dictionary: Arc<dyn Dictionary>,
        rng: R,
    ) -> RegistryResult<SharedGame>
    where
        R: RngCore + Send + 'static,
    {
        let game = GhostGame::with_rng(self.config.game.clone(), dictionary, rng)?;
        self.insert(session, host, game)
    }

    fn insert(&self, session: SessionId, host: PlayerId, game: GhostGame) -> RegistryResult<SharedGame> {
        let mut tables = self.tables.write();

        if tables.games.contains_key(&session) {
            return Err(RegistryError::GameAlreadyExists(session));
        }
        if tables.hosts.contains_key(&host) {
            return Err(RegistryError::HostAlreadyHosting(host));
        }
        if tables.games.len() >= self.config.max_games {
            return Err(RegistryError::TooManyGames {
                max: self.config.max_games,
            });
        }

        let game = Arc::new(Mutex::new(game));
        tables.hosts.insert(host.clone(), session.clone());
        tables.games.insert(
            session.clone(),
            Entry {
                game: game.clone(),
                host: host.clone(),
                created_at: Utc::now(),
            },
        );

        tracing::info!("Created game for session {} hosted by @{}", session, host);
        Ok(game)
    }

    pub fn delete_game(&self, session: &SessionId) -> RegistryResult<()> {
        let mut tables = self.tables.write();

        let entry = tables
            .games
            .remove(session)
            .ok_or_else(|| RegistryError::GameNotFound(session.clone()))?;
        tables.hosts.remove(&entry.host);

        tracing::info!("Deleted game for session {}", session);
        Ok(())
    }

    pub fn game(&self, session: &SessionId) -> RegistryResult<SharedGame> {
        let tables = self.tables.read();
        tables
            .games
            .get(session)
            .map(|entry| entry.game.clone())
            .ok_or_else(|| RegistryError::GameNotFound(session.clone()))
    }

    pub fn session_for_host(&self, host: &PlayerId) -> RegistryResult<SessionId> {
        let tables = self.tables.read();
        tables
            .hosts
            .get(host)
            .cloned()
            .ok_or_else(|| RegistryError::NotAHost(host.clone()))
    }

    pub fn game_for_host(&self, host: &PlayerId) -> RegistryResult<SharedGame> {
        let session = self.session_for_host(host)?;
        self.game(&session)
    }

    pub fn host_of(&self, session: &SessionId) -> RegistryResult<PlayerId> {
        let tables = self.tables.read();
        tables
            .games
            .get(session)
            .map(|entry| entry.host.clone())
            .ok_or_else(|| RegistryError::GameNotFound(session.clone()))
    }

    /// Run `f` with exclusive access to the session's game.
    pub fn with_game<T, F>(&self, session: &SessionId, f: F) -> RegistryResult<T>
    where
        F: FnOnce(&mut GhostGame) -> crate::Result<T>,
    {
        let game = self.game(session)?;
        let mut guard = game.lock();
        Ok(f(&mut *guard)?)
    }

    /// Run `f` on the game `host` is hosting. Word setting goes through here
    /// so only the host can choose the words.
    pub fn with_host_game<T, F>(&self, host: &PlayerId, f: F) -> RegistryResult<T>
    where
        F: FnOnce(&mut GhostGame) -> crate::Result<T>,
    {
        let game = self.game_for_host(host)?;
        let mut guard = game.lock();
        Ok(f(&mut *guard)?)
    }

    pub fn len(&self) -> usize {
        self.tables.read().games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.read().games.is_empty()
    }

    pub fn sessions(&self) -> Vec<SessionId> {
        let mut sessions: Vec<_> = self.tables.read().games.keys().cloned().collect();
        sessions.sort();
        sessions
    }

    /// Copy the entries out so no game is ever locked while `tables` is held.
    fn snapshot(&self) -> Vec<(SessionId, Entry)> {
        self.tables
            .read()
            .games
            .iter()
            .map(|(session, entry)| (session.clone(), entry.clone()))
            .collect()
    }

    /// One summary per game, oldest first. A game busy with another caller
    /// is listed without its phase and player count.
    pub fn list(&self) -> Vec<SessionInfo> {
        let mut infos: Vec<SessionInfo> = self
            .snapshot()
            .into_iter()
            .map(|(session, entry)| {
                let game = entry.game.try_lock();
                SessionInfo {
                    session,
                    host: entry.host,
                    phase: game.as_ref().map(|game| game.phase()),
                    player_count: game.as_ref().map(|game| game.player_count()),
                    created_at: entry.created_at,
                }
            })
            .collect();
        infos.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.session.cmp(&b.session)));
        infos
    }

    /// Drop every game that has reached a winner. Games busy with another
    /// caller are left for the next sweep.
    pub fn reap_finished(&self) -> Vec<SessionId> {
        let doomed = self
            .snapshot()
            .into_iter()
            .filter(|(_, entry)| entry.game.try_lock().is_some_and(|game| game.is_finished()))
            .collect();
        self.remove_unchanged(doomed)
    }

    /// Drop every game created more than `max_age` ago, finished or not.
    pub fn reap_stale(&self, max_age: Duration) -> Vec<SessionId> {
        let cutoff = Utc::now() - max_age;
        let doomed = self
            .snapshot()
            .into_iter()
            .filter(|(_, entry)| entry.created_at < cutoff)
            .collect();
        self.remove_unchanged(doomed)
    }

    /// Remove the given sessions unless they were replaced since the snapshot.
    fn remove_unchanged(&self, doomed: Vec<(SessionId, Entry)>) -> Vec<SessionId> {
        let mut tables = self.tables.write();
        let mut removed = Vec::with_capacity(doomed.len());

        for (session, seen) in doomed {
            let unchanged = tables
                .games
                .get(&session)
                .is_some_and(|entry| Arc::ptr_eq(&entry.game, &seen.game));
            if !unchanged {
                continue;
            }
            if let Some(entry) = tables.games.remove(&session) {
                tables.hosts.remove(&entry.host);
            }
            tracing::info!("Reaped game for session {}", session);
            removed.push(session);
        }

        removed.sort();
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameSettings;
    use crate::dictionary::AcceptAll;
    use crate::error::GameError;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration as StdDuration;

    const TIMEOUT: StdDuration = StdDuration::from_secs(5);

    /// Run `f` on its own thread and wait for the result.
    fn within_timeout<T, F>(f: F) -> T
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let _ = tx.send(f());
        });
        rx.recv_timeout(TIMEOUT).expect("registry call blocked")
    }

    fn user(name: &str) -> PlayerId {
        PlayerId::new(name).unwrap()
    }

    fn dictionary() -> Arc<dyn Dictionary> {
        Arc::new(AcceptAll)
    }

    /// Three players; the ghost is caught and guesses the town word.
    fn play_to_ghost_win(game: &mut GhostGame) {
        for name in ["x", "y", "z"] {
            game.register_player(user(name)).unwrap();
        }
        game.start_game().unwrap();
        game.set_town_word("egg").unwrap();
        game.set_fool_word("pea").unwrap();

        let ghost = game.living_ghosts()[0].clone();
        let leader = game.players()[0].clone();
        game.cast_ghost_vote(&ghost, leader).unwrap();
        while let Some(next) = game.next_clue_giver().cloned() {
            game.submit_clue(&next, "hint").unwrap();
        }
        for voter in game.living_players() {
            game.cast_vote(&voter, ghost.clone().into()).unwrap();
        }
        game.make_guess(&ghost, "egg").unwrap();
        assert!(game.is_finished());
    }

    fn registry(max_games: usize) -> GameRegistry {
        GameRegistry::new(RegistryConfig {
            max_games,
            game: GameSettings::default(),
        })
        .unwrap()
    }

    #[test]
    fn test_create_and_lookup() {
        let registry = registry(4);
        registry
            .create_game("group-1".into(), user("host"), dictionary())
            .unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.session_for_host(&user("host")).unwrap(),
            SessionId::from("group-1")
        );
        assert_eq!(registry.host_of(&"group-1".into()).unwrap(), user("host"));

        let game = registry.game_for_host(&user("host")).unwrap();
        assert_eq!(game.lock().phase(), Phase::RegisterPlayers);
    }

    #[test]
    fn test_duplicate_session_and_host() {
        let registry = registry(4);
        registry
            .create_game("group-1".into(), user("host"), dictionary())
            .unwrap();

        assert!(matches!(
            registry.create_game("group-1".into(), user("other"), dictionary()),
            Err(RegistryError::GameAlreadyExists(_))
        ));
        assert!(matches!(
            registry.create_game("group-2".into(), user("host"), dictionary()),
            Err(RegistryError::HostAlreadyHosting(_))
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_max_games() {
        let registry = registry(2);
        registry.create_game("a".into(), user("h1"), dictionary()).unwrap();
        registry.create_game("b".into(), user("h2"), dictionary()).unwrap();

        assert_eq!(
            registry
                .create_game("c".into(), user("h3"), dictionary())
                .err(),
            Some(RegistryError::TooManyGames { max: 2 })
        );
    }

    #[test]
    fn test_delete_clears_both_mappings() {
        let registry = registry(4);
        registry.create_game("a".into(), user("h1"), dictionary()).unwrap();
        registry.delete_game(&"a".into()).unwrap();

        assert!(registry.is_empty());
        assert_eq!(
            registry.session_for_host(&user("h1")),
            Err(RegistryError::NotAHost(user("h1")))
        );
        assert_eq!(
            registry.delete_game(&"a".into()),
            Err(RegistryError::GameNotFound("a".into()))
        );

        // host is free to start a new game
        registry.create_game("b".into(), user("h1"), dictionary()).unwrap();
    }

    #[test]
    fn test_with_game_surfaces_game_errors() {
        let registry = registry(4);
        registry.create_game("a".into(), user("h1"), dictionary()).unwrap();

        let err = registry
            .with_host_game(&user("h1"), |game| game.set_town_word("egg"))
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Game(GameError::InvalidPhase { .. })
        ));

        let count = registry
            .with_game(&"a".into(), |game| {
                game.register_player(user("bacon"))
                    .map(|r| r.player_count)
            })
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_reap_finished() {
        let registry = registry(4);
        let game = registry
            .create_game_with_rng("a".into(), user("h1"), dictionary(), StdRng::seed_from_u64(3))
            .unwrap();
        registry.create_game("b".into(), user("h2"), dictionary()).unwrap();

        play_to_ghost_win(&mut game.lock());

        assert_eq!(registry.reap_finished(), vec![SessionId::from("a")]);
        assert_eq!(registry.sessions(), vec![SessionId::from("b")]);
        assert!(registry.session_for_host(&user("h1")).is_err());
    }

    #[test]
    fn test_reap_stale_and_list() {
        let registry = registry(4);
        registry.create_game("a".into(), user("h1"), dictionary()).unwrap();

        let infos = registry.list();
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].host, user("h1"));
        assert_eq!(infos[0].phase, Some(Phase::RegisterPlayers));
        assert_eq!(infos[0].player_count, Some(0));

        assert!(registry.reap_stale(Duration::hours(1)).is_empty());
        assert_eq!(registry.reap_stale(Duration::zero() - Duration::seconds(1)).len(), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_held_game_does_not_block_registry() {
        let registry = Arc::new(registry(4));
        let game = registry
            .create_game_with_rng("a".into(), user("h1"), dictionary(), StdRng::seed_from_u64(3))
            .unwrap();
        registry.create_game("b".into(), user("h2"), dictionary()).unwrap();

        let mut guard = game.lock();
        play_to_ghost_win(&mut guard);

        // a caller holding game "a" keeps using the registry while another
        // thread sweeps it
        let reaper = registry.clone();
        let reaped = within_timeout(move || reaper.reap_finished());
        assert!(reaped.is_empty());

        let lookups = registry.clone();
        let host = within_timeout(move || {
            (lookups.host_of(&"a".into()), lookups.len(), lookups.game_for_host(&user("h2")).is_ok())
        });
        assert_eq!(host, (Ok(user("h1")), 2, true));

        drop(guard);
        assert_eq!(registry.reap_finished(), vec![SessionId::from("a")]);
        assert_eq!(registry.sessions(), vec![SessionId::from("b")]);
    }

    #[test]
    fn test_list_skips_busy_games() {
        let registry = Arc::new(registry(4));
        let game = registry.create_game("a".into(), user("h1"), dictionary()).unwrap();
        registry.create_game("b".into(), user("h2"), dictionary()).unwrap();

        let guard = game.lock();
        let lister = registry.clone();
        let mut infos = within_timeout(move || lister.list());
        infos.sort_by(|x, y| x.session.cmp(&y.session));

        assert_eq!(infos.len(), 2);
        assert_eq!(infos[0].phase, None);
        assert_eq!(infos[0].player_count, None);
        assert_eq!(infos[1].phase, Some(Phase::RegisterPlayers));
        drop(guard);

        assert!(registry.list().iter().all(|info| info.phase.is_some()));
    }

    #[test]
    fn test_reap_keeps_replaced_session() {
        let registry = registry(4);
        registry.create_game("a".into(), user("h1"), dictionary()).unwrap();
        let (session, stale) = registry.snapshot().remove(0);

        registry.delete_game(&session).unwrap();
        registry.create_game("a".into(), user("h2"), dictionary()).unwrap();

        assert!(registry.remove_unchanged(vec![(session, stale)]).is_empty());
        assert_eq!(registry.host_of(&"a".into()).unwrap(), user("h2"));
    }
}
