use super::{describe_lynch, summary_table};
use ghost_engine::{
    AcceptAll, Ballot, ClueSubmission, GameSettings, GhostGame, GuessOutcome, Phase, PlayerId,
    VoteOutcome,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

const NAMES: [&str; 10] = [
    "bacon", "peanut", "tomato", "lettuce", "avocado", "pickle", "mustard", "onion", "radish",
    "celery",
];

const WORD_PAIRS: [(&str, &str); 4] = [
    ("egg", "pea"),
    ("apple", "lemon"),
    ("carrot", "potato"),
    ("pumpkin", "cabbage"),
];

const CLUES: [&str; 8] = [
    "round", "kitchen", "green", "breakfast", "crunchy", "garden", "soup", "market",
];

/// Give up on games that never settle.
const MAX_STEPS: usize = 500;

/// Scripted players that decide everything with one seeded random source.
struct Autopilot {
    rng: StdRng,
}

impl Autopilot {
    fn pick<'a>(&mut self, players: &'a [PlayerId]) -> anyhow::Result<&'a PlayerId> {
        players
            .choose(&mut self.rng)
            .ok_or_else(|| anyhow::anyhow!("No players to choose from"))
    }

    fn ballot(&mut self, voter: &PlayerId, players: &[PlayerId]) -> anyhow::Result<Ballot> {
        if self.rng.gen_ratio(1, 6) {
            return Ok(Ballot::Abstain);
        }
        let others: Vec<PlayerId> = players.iter().filter(|p| *p != voter).cloned().collect();
        Ok(Ballot::Player(self.pick(&others)?.clone()))
    }

    fn guess(&mut self, town_word: &str) -> String {
        if self.rng.gen_ratio(1, 3) {
            town_word.to_string()
        } else {
            "ghost".to_string()
        }
    }
}

/// Run a scripted game to the end and return it with its event log.
pub(crate) fn run_simulation(players: usize, seed: u64) -> anyhow::Result<(GhostGame, Vec<String>)> {
    let mut autopilot = Autopilot {
        rng: StdRng::seed_from_u64(seed),
    };
    let mut game = GhostGame::with_rng(
        GameSettings::with_max_players(players)?,
        Arc::new(AcceptAll),
        StdRng::seed_from_u64(seed),
    )?;
    let mut log = Vec::new();

    let names = NAMES
        .iter()
        .take(players)
        .map(PlayerId::new)
        .collect::<Result<Vec<_>, _>>()?;
    for name in names {
        game.register_player(name)?;
    }
    game.start_game()?;

    let &(town_word, fool_word) = WORD_PAIRS
        .choose(&mut autopilot.rng)
        .ok_or_else(|| anyhow::anyhow!("No words to choose from"))?;
    game.set_town_word(town_word)?;
    game.set_fool_word(fool_word)?;
    log.push(format!(
        "{} players, town word '{}', fool word '{}'",
        players, town_word, fool_word
    ));

    for _ in 0..MAX_STEPS {
        match game.phase() {
            Phase::GhostVoteRound => {
                let living = game.living_players();
                let leader = autopilot.pick(&living)?.clone();
                for ghost in game.living_ghosts() {
                    game.cast_ghost_vote(&ghost, leader.clone())?;
                }
                log.push(format!("Ghosts picked @{} to open", leader));
            }
            Phase::ClueRound => {
                log.push(format!("Clue round {}", game.round()));
                while let Some(next) = game.next_clue_giver().cloned() {
                    let clue = CLUES
                        .choose(&mut autopilot.rng)
                        .copied()
                        .unwrap_or("hmm");
                    if let ClueSubmission::RoundComplete { clues } = game.submit_clue(&next, clue)? {
                        for clue in clues {
                            log.push(format!("  @{}: {}", clue.player, clue.text));
                        }
                    }
                }
            }
            Phase::VoteRound => {
                let living = game.living_players();
                for voter in &living {
                    let ballot = autopilot.ballot(voter, &living)?;
                    if let VoteOutcome::Resolved { lynch, .. } = game.cast_vote(voter, ballot)? {
                        log.push(describe_lynch(&lynch));
                    }
                }
            }
            Phase::GuessRound => {
                let ghost = game
                    .last_eliminated()
                    .cloned()
                    .ok_or_else(|| anyhow::anyhow!("No ghost to guess"))?;
                let guess = autopilot.guess(town_word);
                let outcome = game.make_guess(&ghost, &guess)?;
                let verdict = match outcome {
                    GuessOutcome::Correct => "right",
                    _ => "wrong",
                };
                log.push(format!("@{} guessed '{}' and was {}", ghost, guess, verdict));
            }
            Phase::WinnerTown | Phase::WinnerGhost => {
                log.push(format!("{}!", game.phase()));
                return Ok((game, log));
            }
            phase => anyhow::bail!("Unexpected phase {}", phase),
        }
    }

    anyhow::bail!("Game did not finish within {} steps", MAX_STEPS)
}

pub fn simulate_game(players: usize, seed: Option<u64>, json: bool) -> anyhow::Result<()> {
    let seed = seed.unwrap_or_else(rand::random);
    tracing::debug!("Simulating {} players with seed {}", players, seed);

    let (game, log) = run_simulation(players, seed)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&game.info())?);
        return Ok(());
    }

    println!("Seed: {}", seed);
    for line in &log {
        println!("{}", line);
    }
    println!("{}", summary_table(&game));
    Ok(())
}
