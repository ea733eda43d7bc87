use crate::config::GameSettings;
use crate::dictionary::Dictionary;
use crate::error::{GameError, Result};
use crate::player::{Player, PlayerInfo};
use crate::roles::{allocate_roles, role_counts, RoleCounts, MIN_PLAYERS};
use crate::turn_order::TurnOrder;
use crate::types::{Ballot, Phase, PlayerId, Role, Team};
use crate::vote::{NoElection, Tally, TallyResult};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// What a player has handed in during the current round.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Response {
    GhostVote(PlayerId),
    Clue(String),
    Vote(Ballot),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub player_count: usize,
    pub is_full: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GhostVote {
    /// The voter is not a living ghost; nothing changed.
    Ignored,
    Recorded { remaining: usize },
    /// Ghosts did not agree on one player. Ballots are cleared and the ghosts
    /// vote again.
    Tied,
    /// `leader` opens the first clue round.
    Complete { leader: PlayerId },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clue {
    pub player: PlayerId,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClueSubmission {
    Accepted { next: PlayerId },
    /// Every living player has given a clue; voting is open.
    RoundComplete { clues: Vec<Clue> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lynch {
    /// Nobody was elected; another clue round follows.
    NoElimination(NoElection),
    /// A ghost was caught and gets one guess at the town word.
    GhostCaught(PlayerId),
    Eliminated {
        player: PlayerId,
        role: Role,
        winner: Option<Team>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteOutcome {
    Recorded { remaining: usize },
    Resolved { tally: Tally, lynch: Lynch },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuessOutcome {
    /// Someone other than the caught ghost guessed; nothing changed.
    Ignored,
    /// The town word was guessed. Ghosts win.
    Correct,
    /// The guesser is eliminated. Without a winner the vote reopens.
    Wrong { winner: Option<Team> },
}

/// Decide the game after an elimination.
///
/// No ghosts left means the Town wins; otherwise ghosts win once they make up
/// at least half (rounded down) of the players counted for the majority.
pub fn evaluate_winner(living_ghosts: usize, majority_base: usize) -> Option<Team> {
    if living_ghosts == 0 {
        Some(Team::Town)
    } else if living_ghosts >= majority_base / 2 {
        Some(Team::Ghost)
    } else {
        None
    }
}

/// A single Ghost game, driven by one caller at a time.
pub struct GhostGame {
    settings: GameSettings,
    phase: Phase,
    town_word: Option<String>,
    fool_word: Option<String>,
    registration_order: Vec<PlayerId>,
    players: HashMap<PlayerId, Player>,
    turn_order: TurnOrder,
    responses: HashMap<PlayerId, Response>,
    last_clues: Vec<Clue>,
    last_eliminated: Option<PlayerId>,
    round: usize,
    dictionary: Arc<dyn Dictionary>,
    rng: Box<dyn RngCore + Send>,
}

impl GhostGame {
    pub fn new(dictionary: Arc<dyn Dictionary>) -> Self {
        Self::build(GameSettings::default(), dictionary, Box::new(StdRng::from_entropy()))
    }

    pub fn with_settings(settings: GameSettings, dictionary: Arc<dyn Dictionary>) -> Result<Self> {
        settings.validate()?;
        Ok(Self::build(settings, dictionary, Box::new(StdRng::from_entropy())))
    }

    /// Like [`GhostGame::with_settings`] but with a caller-supplied random
    /// source, so role allocation can be reproduced.
    pub fn with_rng<R>(
        settings: GameSettings,
        dictionary: Arc<dyn Dictionary>,
        rng: R,
    ) -> Result<Self>
    where
        R: RngCore + Send + 'static,
    {
        settings.validate()?;
        Ok(Self::build(settings, dictionary, Box::new(rng)))
    }

    fn build(
        settings: GameSettings,
        dictionary: Arc<dyn Dictionary>,
        rng: Box<dyn RngCore + Send>,
    ) -> Self {
        Self {
            registration_order: Vec::with_capacity(settings.max_players),
            players: HashMap::with_capacity(settings.max_players),
            settings,
            phase: Phase::RegisterPlayers,
            town_word: None,
            fool_word: None,
            turn_order: TurnOrder::default(),
            responses: HashMap::new(),
            last_clues: Vec::new(),
            last_eliminated: None,
            round: 0,
            dictionary,
            rng,
        }
    }

    fn expect_phase(&self, expected: Phase) -> Result<()> {
        if self.phase != expected {
            return Err(GameError::invalid_phase(expected, self.phase));
        }
        Ok(())
    }

    fn player(&self, id: &PlayerId) -> Result<&Player> {
        self.players
            .get(id)
            .ok_or_else(|| GameError::PlayerNotFound(id.clone()))
    }

    fn ensure_alive(&self, id: &PlayerId) -> Result<&Player> {
        let player = self.player(id)?;
        if !player.is_alive() {
            return Err(GameError::PlayerNotAlive(id.clone()));
        }
        Ok(player)
    }

    // PHASE: REGISTER PLAYERS

    /// Add a player to the game
    pub fn register_player(&mut self, id: PlayerId) -> Result<Registration> {
        self.expect_phase(Phase::RegisterPlayers)?;

        if self.players.contains_key(&id) {
            return Err(GameError::PlayerAlreadyRegistered(id));
        }

        if self.is_full() {
            return Err(GameError::CapacityReached {
                capacity: self.settings.max_players,
            });
        }

        tracing::info!("Registered player @{}", id);
        self.registration_order.push(id.clone());
        self.players.insert(id.clone(), Player::new(id));

        Ok(Registration {
            player_count: self.players.len(),
            is_full: self.is_full(),
        })
    }

    /// Remove a player before the game starts
    pub fn unregister_player(&mut self, id: &PlayerId) -> Result<usize> {
        self.expect_phase(Phase::RegisterPlayers)?;
        self.player(id)?;

        self.players.remove(id);
        self.registration_order.retain(|p| p != id);

        tracing::info!("Unregistered player @{}", id);
        Ok(self.players.len())
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= self.settings.max_players
    }

    /// Close registration and move on to choosing the words.
    pub fn start_game(&mut self) -> Result<()> {
        self.expect_phase(Phase::RegisterPlayers)?;

        let count = self.players.len();
        if count < MIN_PLAYERS {
            return Err(GameError::NotEnoughPlayers {
                min: MIN_PLAYERS,
                actual: count,
            });
        }

        self.turn_order = TurnOrder::new(self.registration_order.iter().cloned());
        self.phase = Phase::SetParams;

        tracing::info!("Started game with {} players", count);
        Ok(())
    }

    // PHASE: SET PARAMS

    fn check_alphabetic(word: &str) -> Result<()> {
        if word.is_empty() || !word.chars().all(char::is_alphabetic) {
            return Err(GameError::WordNotAlphabetic);
        }
        Ok(())
    }

    fn check_dictionary(&self, word: &str) -> Result<()> {
        if !self.dictionary.contains(word) {
            return Err(GameError::WordNotInDictionary(word.to_string()));
        }
        Ok(())
    }

    /// Set (or replace) the town word.
    pub fn set_town_word(&mut self, word: &str) -> Result<()> {
        self.expect_phase(Phase::SetParams)?;

        let word = word.trim().to_lowercase();
        Self::check_alphabetic(&word)?;

        let len = word.chars().count();
        if len < self.settings.min_word_len {
            return Err(GameError::WordTooShort {
                min: self.settings.min_word_len,
            });
        }
        if len > self.settings.max_word_len {
            return Err(GameError::WordTooLong {
                max: self.settings.max_word_len,
            });
        }
        self.check_dictionary(&word)?;

        self.town_word = Some(word);
        tracing::info!("Town word set");
        Ok(())
    }

    /// Set the fool word. On success roles are handed out and the ghosts vote
    /// on who opens the clue rounds.
    pub fn set_fool_word(&mut self, word: &str) -> Result<Vec<(PlayerId, Role)>> {
        self.expect_phase(Phase::SetParams)?;

        let town_word = self.town_word.as_deref().ok_or(GameError::TownWordNotSet)?;
        let word = word.trim().to_lowercase();
        Self::check_alphabetic(&word)?;

        let expected = town_word.chars().count();
        let actual = word.chars().count();
        if actual != expected {
            return Err(GameError::WordLengthMismatch { expected, actual });
        }
        if word == town_word {
            return Err(GameError::DuplicateWord);
        }
        self.check_dictionary(&word)?;

        let roles = allocate_roles(self.registration_order.len(), &mut *self.rng)?;
        let assignment: Vec<(PlayerId, Role)> = self
            .registration_order
            .iter()
            .cloned()
            .zip(roles)
            .collect();

        for (id, role) in &assignment {
            self.players
                .get_mut(id)
                .ok_or_else(|| GameError::internal(format!("Unknown player {} in order", id)))?
                .assign_role(*role)?;
        }

        self.fool_word = Some(word);
        self.responses.clear();
        self.phase = Phase::GhostVoteRound;

        let counts = self.role_counts()?;
        tracing::info!(
            "Roles allocated: {} town, {} ghost, {} fool",
            counts.town,
            counts.ghost,
            counts.fool
        );
        Ok(assignment)
    }

    // PHASE: GHOST VOTE

    /// A ghost picks who gives the first clue. Votes from anyone other than a
    /// living ghost are ignored.
    pub fn cast_ghost_vote(&mut self, voter: &PlayerId, choice: PlayerId) -> Result<GhostVote> {
        self.expect_phase(Phase::GhostVoteRound)?;

        let is_ghost = self
            .players
            .get(voter)
            .is_some_and(|p| p.is_alive() && p.is_ghost());
        if !is_ghost {
            tracing::debug!("Ignoring ghost vote from @{}", voter);
            return Ok(GhostVote::Ignored);
        }

        self.ensure_alive(&choice)?;
        self.responses
            .insert(voter.clone(), Response::GhostVote(choice));

        let ghosts = self.living_ghosts();
        let ballots: Vec<Ballot> = ghosts
            .iter()
            .filter_map(|g| match self.responses.get(g) {
                Some(Response::GhostVote(choice)) => Some(Ballot::Player(choice.clone())),
                _ => None,
            })
            .collect();

        let remaining = ghosts.len() - ballots.len();
        if remaining > 0 {
            return Ok(GhostVote::Recorded { remaining });
        }

        match Tally::count(&ballots).result() {
            TallyResult::Elected(leader) => {
                self.turn_order.rotate_to(&leader)?;
                tracing::info!("Ghosts chose @{} to give the first clue", leader);
                self.start_clue_round();
                Ok(GhostVote::Complete { leader })
            }
            TallyResult::NoElection(reason) => {
                tracing::info!("Ghost vote failed ({:?}), voting again", reason);
                self.responses.clear();
                Ok(GhostVote::Tied)
            }
        }
    }

    // PHASE: CLUES

    fn start_clue_round(&mut self) {
        self.responses.clear();
        self.round += 1;
        self.phase = Phase::ClueRound;
        tracing::info!("Clue round {} started", self.round);
    }

    /// Whose turn it is to give a clue, if a clue round is running.
    pub fn next_clue_giver(&self) -> Option<&PlayerId> {
        if self.phase != Phase::ClueRound {
            return None;
        }
        self.turn_order
            .iter()
            .find(|id| !matches!(self.responses.get(*id), Some(Response::Clue(_))))
    }

    /// Give a clue when it is the player's turn
    pub fn submit_clue(&mut self, player: &PlayerId, clue: &str) -> Result<ClueSubmission> {
        self.expect_phase(Phase::ClueRound)?;
        self.ensure_alive(player)?;

        if matches!(self.responses.get(player), Some(Response::Clue(_))) {
            return Err(GameError::ClueAlreadyGiven(player.clone()));
        }

        let expected = self
            .next_clue_giver()
            .ok_or_else(|| GameError::internal("Clue round has no pending player"))?;
        if expected != player {
            return Err(GameError::OutOfTurn {
                expected: expected.clone(),
            });
        }

        let text = clue.trim();
        if text.is_empty() {
            return Err(GameError::EmptyClue);
        }

        self.responses
            .insert(player.clone(), Response::Clue(text.to_string()));
        tracing::debug!("@{} gave a clue", player);

        if let Some(next) = self.next_clue_giver() {
            return Ok(ClueSubmission::Accepted { next: next.clone() });
        }

        let clues: Vec<Clue> = self
            .turn_order
            .iter()
            .filter_map(|id| match self.responses.get(id) {
                Some(Response::Clue(text)) => Some(Clue {
                    player: id.clone(),
                    text: text.clone(),
                }),
                _ => None,
            })
            .collect();
        self.last_clues = clues.clone();
        self.start_vote_round();

        Ok(ClueSubmission::RoundComplete { clues })
    }

    // PHASE: VOTE

    fn start_vote_round(&mut self) {
        self.responses.clear();
        self.phase = Phase::VoteRound;
        tracing::info!("Vote round started");
    }

    /// Cast (or replace) a lynch vote. Once every living player has voted the
    /// round is resolved.
    pub fn cast_vote(&mut self, voter: &PlayerId, ballot: Ballot) -> Result<VoteOutcome> {
        self.expect_phase(Phase::VoteRound)?;
        self.ensure_alive(voter)?;
        if let Ballot::Player(target) = &ballot {
            self.ensure_alive(target)?;
        }

        tracing::debug!("@{} voted", voter);
        self.responses.insert(voter.clone(), Response::Vote(ballot));

        let ballots: Vec<Ballot> = self
            .turn_order
            .iter()
            .filter_map(|id| match self.responses.get(id) {
                Some(Response::Vote(ballot)) => Some(ballot.clone()),
                _ => None,
            })
            .collect();

        let remaining = self.turn_order.len() - ballots.len();
        if remaining > 0 {
            return Ok(VoteOutcome::Recorded { remaining });
        }

        let tally = Tally::count(&ballots);
        let lynch = self.resolve_lynch(tally.result())?;
        Ok(VoteOutcome::Resolved { tally, lynch })
    }

    fn resolve_lynch(&mut self, result: TallyResult) -> Result<Lynch> {
        let target = match result {
            TallyResult::Elected(target) => target,
            TallyResult::NoElection(reason) => {
                tracing::info!("Nobody lynched ({:?})", reason);
                self.start_clue_round();
                return Ok(Lynch::NoElimination(reason));
            }
        };

        let role = self
            .player(&target)?
            .role()
            .ok_or(GameError::RolesNotAllocated)?;
        self.last_eliminated = Some(target.clone());
        tracing::info!("Lynching player @{}", target);

        if role == Role::Ghost {
            self.responses.clear();
            self.phase = Phase::GuessRound;
            return Ok(Lynch::GhostCaught(target));
        }

        let winner = self.eliminate(&target)?;
        if winner.is_none() {
            self.start_clue_round();
        }

        Ok(Lynch::Eliminated {
            player: target,
            role,
            winner,
        })
    }

    /// Remove a living player and settle the game if that decides it.
    fn eliminate(&mut self, id: &PlayerId) -> Result<Option<Team>> {
        self.ensure_alive(id)?;
        if let Some(player) = self.players.get_mut(id) {
            player.eliminate();
        }
        self.turn_order.remove(id);

        let winner = self.evaluate_winner();
        if let Some(team) = winner {
            self.responses.clear();
            self.phase = team.winning_phase();
            tracing::info!("Congratulations to the {}!", team);
        }
        Ok(winner)
    }

    fn evaluate_winner(&self) -> Option<Team> {
        let living = self.players.values().filter(|p| p.is_alive());
        let mut ghosts = 0;
        let mut base = 0;
        for player in living {
            if player.is_ghost() {
                ghosts += 1;
            }
            if self.settings.count_fools_in_majority || !player.is_fool() {
                base += 1;
            }
        }
        evaluate_winner(ghosts, base)
    }

    // PHASE: GUESS

    /// The caught ghost guesses the town word. Guesses from anyone else are
    /// ignored.
    pub fn make_guess(&mut self, player: &PlayerId, guess: &str) -> Result<GuessOutcome> {
        self.expect_phase(Phase::GuessRound)?;

        if self.last_eliminated.as_ref() != Some(player) {
            tracing::debug!("Ignoring guess from @{}", player);
            return Ok(GuessOutcome::Ignored);
        }

        let town_word = self
            .town_word
            .as_deref()
            .ok_or_else(|| GameError::internal("Town word missing during guess round"))?;

        tracing::info!("Player @{} has guessed", player);
        if guess.trim().to_lowercase() == town_word {
            self.responses.clear();
            self.phase = Phase::WinnerGhost;
            tracing::info!("Congratulations to the {}!", Team::Ghost);
            return Ok(GuessOutcome::Correct);
        }

        let winner = self.eliminate(player)?;
        if winner.is_none() {
            self.start_vote_round();
        }
        Ok(GuessOutcome::Wrong { winner })
    }

    // QUERIES

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn round(&self) -> usize {
        self.round
    }

    pub fn winner(&self) -> Option<Team> {
        self.phase.winner()
    }

    pub fn is_finished(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Registered players in registration order.
    pub fn players(&self) -> &[PlayerId] {
        &self.registration_order
    }

    pub fn is_alive(&self, id: &PlayerId) -> bool {
        self.players.get(id).is_some_and(Player::is_alive)
    }

    /// Living players, in clue order once the game has started.
    pub fn living_players(&self) -> Vec<PlayerId> {
        if self.phase == Phase::RegisterPlayers {
            return self.registration_order.clone();
        }
        self.turn_order.to_vec()
    }

    pub fn living_ghosts(&self) -> Vec<PlayerId> {
        self.turn_order
            .iter()
            .filter(|id| self.players.get(*id).is_some_and(Player::is_ghost))
            .cloned()
            .collect()
    }

    pub fn turn_order(&self) -> &TurnOrder {
        &self.turn_order
    }

    /// Get a player's role
    pub fn role_of(&self, id: &PlayerId) -> Result<Role> {
        self.player(id)?.role().ok_or(GameError::RolesNotAllocated)
    }

    /// Every player's role, in registration order.
    pub fn roles(&self) -> Result<Vec<(PlayerId, Role)>> {
        self.registration_order
            .iter()
            .map(|id| Ok((id.clone(), self.role_of(id)?)))
            .collect()
    }

    pub fn role_counts(&self) -> Result<RoleCounts> {
        if self.fool_word.is_none() {
            return Err(GameError::RolesNotAllocated);
        }
        role_counts(self.registration_order.len())
    }

    pub fn words(&self) -> (Option<&str>, Option<&str>) {
        (self.town_word.as_deref(), self.fool_word.as_deref())
    }

    /// The word a player is told: Town gets the town word, Fools the fool
    /// word, ghosts nothing.
    pub fn word_for(&self, id: &PlayerId) -> Result<Option<&str>> {
        Ok(match self.role_of(id)? {
            Role::Town => self.town_word.as_deref(),
            Role::Fool => self.fool_word.as_deref(),
            Role::Ghost => None,
        })
    }

    /// Clues from the most recent completed clue round, in turn order.
    pub fn last_clues(&self) -> &[Clue] {
        &self.last_clues
    }

    pub fn last_eliminated(&self) -> Option<&PlayerId> {
        self.last_eliminated.as_ref()
    }

    /// Players the game is waiting on in the current phase.
    pub fn awaiting(&self) -> Vec<PlayerId> {
        match self.phase {
            Phase::GhostVoteRound => self
                .living_ghosts()
                .into_iter()
                .filter(|id| !self.responses.contains_key(id))
                .collect(),
            Phase::ClueRound => self.next_clue_giver().cloned().into_iter().collect(),
            Phase::VoteRound => self
                .turn_order
                .iter()
                .filter(|id| !self.responses.contains_key(*id))
                .cloned()
                .collect(),
            Phase::GuessRound => self.last_eliminated.iter().cloned().collect(),
            _ => Vec::new(),
        }
    }

    pub fn info(&self) -> GameInfo {
        GameInfo {
            phase: self.phase,
            round: self.round,
            players: self
                .registration_order
                .iter()
                .filter_map(|id| self.players.get(id))
                .map(PlayerInfo::from)
                .collect(),
            turn_order: self.turn_order.to_vec(),
            last_eliminated: self.last_eliminated.clone(),
            winner: self.winner(),
            revealed_roles: if self.is_finished() {
                self.roles().ok()
            } else {
                None
            },
        }
    }
}

impl fmt::Debug for GhostGame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GhostGame")
            .field("phase", &self.phase)
            .field("round", &self.round)
            .field("players", &self.registration_order)
            .field("turn_order", &self.turn_order)
            .field("responses", &self.responses.len())
            .field("last_eliminated", &self.last_eliminated)
            .finish()
    }
}

/// Game info for display. Words are never included; roles only once the
/// game is over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameInfo {
    pub phase: Phase,
    pub round: usize,
    pub players: Vec<PlayerInfo>,
    pub turn_order: Vec<PlayerId>,
    pub last_eliminated: Option<PlayerId>,
    pub winner: Option<Team>,
    pub revealed_roles: Option<Vec<(PlayerId, Role)>>,
}
