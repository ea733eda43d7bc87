use super::{describe_lynch, summary_table};
use crate::config::CliConfig;
use anyhow::Context;
use dialoguer::{Confirm, Input, Password, Select};
use ghost_engine::{
    Ballot, ClueSubmission, GameRegistry, GhostVote, GuessOutcome, Phase, PlayerId, SessionId,
    VoteOutcome, MIN_PLAYERS,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use uuid::Uuid;

/// Hot-seat game: every player takes the keyboard in turn.
pub async fn play_game(
    config: &CliConfig,
    players: Option<usize>,
    seed: Option<u64>,
    word_list: Option<PathBuf>,
) -> anyhow::Result<()> {
    let registry = GameRegistry::new(config.registry_config(players)?)?;
    let dictionary = config.dictionary(word_list.as_deref())?;
    let session = SessionId::from(Uuid::new_v4().to_string());

    let host = prompt_player_id("Host name (picks the words)")?;
    match seed {
        Some(seed) => registry.create_game_with_rng(
            session.clone(),
            host.clone(),
            dictionary,
            StdRng::seed_from_u64(seed),
        )?,
        None => registry.create_game(session.clone(), host.clone(), dictionary)?,
    };

    println!("New game {} hosted by @{}", session, host);
    let result = run_game(&registry, &session, &host);
    registry.delete_game(&session)?;
    result
}

fn run_game(registry: &GameRegistry, session: &SessionId, host: &PlayerId) -> anyhow::Result<()> {
    register_players(registry, session)?;
    registry.with_game(session, |game| game.start_game())?;
    set_words(registry, host)?;
    reveal_roles(registry, session)?;

    loop {
        let phase = registry.with_game(session, |game| Ok(game.phase()))?;
        match phase {
            Phase::GhostVoteRound => ghost_vote(registry, session)?,
            Phase::ClueRound => clue_round(registry, session)?,
            Phase::VoteRound => vote_round(registry, session)?,
            Phase::GuessRound => guess_round(registry, session)?,
            Phase::WinnerTown | Phase::WinnerGhost => break,
            phase => anyhow::bail!("Game stuck in phase {}", phase),
        }
    }

    let game = registry.game(session)?;
    let game = game.lock();
    let (town_word, fool_word) = game.words();
    println!();
    println!("{}!", game.phase());
    println!(
        "Town word: {}  Fool word: {}",
        town_word.unwrap_or("-"),
        fool_word.unwrap_or("-")
    );
    println!("{}", summary_table(&game));
    Ok(())
}

fn prompt_player_id(prompt: &str) -> anyhow::Result<PlayerId> {
    loop {
        let name: String = Input::new().with_prompt(prompt).interact_text()?;
        match PlayerId::new(&name) {
            Ok(id) => return Ok(id),
            Err(e) => println!("{}", e),
        }
    }
}

fn register_players(registry: &GameRegistry, session: &SessionId) -> anyhow::Result<()> {
    println!("Register players. Leave the name empty to start the game.");
    loop {
        let count = registry.with_game(session, |game| Ok(game.player_count()))?;
        let name: String = Input::new()
            .with_prompt(format!("Player {}", count + 1))
            .allow_empty(true)
            .interact_text()?;

        if name.trim().is_empty() {
            if count >= MIN_PLAYERS {
                return Ok(());
            }
            println!("At least {} players are needed.", MIN_PLAYERS);
            continue;
        }

        let id = match PlayerId::new(&name) {
            Ok(id) => id,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        match registry.with_game(session, |game| game.register_player(id)) {
            Ok(registration) if registration.is_full => {
                println!("The game is full.");
                return Ok(());
            }
            Ok(_) => {}
            Err(e) => println!("{}", e),
        }
    }
}

fn set_words(registry: &GameRegistry, host: &PlayerId) -> anyhow::Result<()> {
    println!("@{}, choose the words. Nobody else should look.", host);
    loop {
        let word = Password::new().with_prompt("Town word").interact()?;
        match registry.with_host_game(host, |game| game.set_town_word(&word)) {
            Ok(()) => break,
            Err(e) => println!("{}", e),
        }
    }
    loop {
        let word = Password::new().with_prompt("Fool word").interact()?;
        match registry.with_host_game(host, |game| game.set_fool_word(&word)) {
            Ok(_) => return Ok(()),
            Err(e) => println!("{}", e),
        }
    }
}

/// Show each player their role and word, one at a time.
fn reveal_roles(registry: &GameRegistry, session: &SessionId) -> anyhow::Result<()> {
    let players = registry.with_game(session, |game| Ok(game.players().to_vec()))?;
    for player in players {
        Confirm::new()
            .with_prompt(format!("Pass the keyboard to @{}. Ready?", player))
            .default(true)
            .interact()?;

        let (role, word) = registry.with_game(session, |game| {
            Ok((game.role_of(&player)?, game.word_for(&player)?.map(str::to_string)))
        })?;
        println!("You are {}.", role);
        match word {
            Some(word) => println!("Your word is: {}", word),
            None => println!("You have no word. Blend in!"),
        }

        Confirm::new()
            .with_prompt("Done? This hides your role")
            .default(true)
            .interact()?;
        clear_screen();
    }
    Ok(())
}

fn clear_screen() {
    print!("\x1B[2J\x1B[1;1H");
}

fn living_names(registry: &GameRegistry, session: &SessionId) -> anyhow::Result<Vec<PlayerId>> {
    Ok(registry.with_game(session, |game| Ok(game.living_players()))?)
}

fn ghost_vote(registry: &GameRegistry, session: &SessionId) -> anyhow::Result<()> {
    let ghosts = registry.with_game(session, |game| Ok(game.awaiting()))?;
    let candidates = living_names(registry, session)?;

    for ghost in ghosts {
        let choice = Select::new()
            .with_prompt(format!("@{}, who gives the first clue?", ghost))
            .items(&candidates)
            .default(0)
            .interact()?;
        let target = candidates
            .get(choice)
            .cloned()
            .context("No such player")?;

        let outcome = registry.with_game(session, |game| game.cast_ghost_vote(&ghost, target))?;
        clear_screen();
        match outcome {
            GhostVote::Tied => println!("The ghosts disagree. Vote again."),
            GhostVote::Complete { leader } => println!("@{} starts the clues.", leader),
            GhostVote::Recorded { .. } | GhostVote::Ignored => {}
        }
    }
    Ok(())
}

fn clue_round(registry: &GameRegistry, session: &SessionId) -> anyhow::Result<()> {
    let round = registry.with_game(session, |game| Ok(game.round()))?;
    println!();
    println!("Clue round {}", round);

    loop {
        let Some(next) = registry.with_game(session, |game| Ok(game.next_clue_giver().cloned()))?
        else {
            return Ok(());
        };

        let clue: String = Input::new()
            .with_prompt(format!("@{}, your clue", next))
            .interact_text()?;
        match registry.with_game(session, |game| game.submit_clue(&next, &clue)) {
            Ok(ClueSubmission::Accepted { .. }) => {}
            Ok(ClueSubmission::RoundComplete { clues }) => {
                println!();
                for clue in clues {
                    println!("  @{}: {}", clue.player, clue.text);
                }
                return Ok(());
            }
            Err(e) => println!("{}", e),
        }
    }
}

fn vote_round(registry: &GameRegistry, session: &SessionId) -> anyhow::Result<()> {
    println!();
    println!("Time to vote. Who is a Ghost?");

    let voters = registry.with_game(session, |game| Ok(game.awaiting()))?;
    let candidates = living_names(registry, session)?;
    let mut options: Vec<Ballot> = candidates.into_iter().map(Ballot::Player).collect();
    options.push(Ballot::Abstain);

    for voter in voters {
        let choice = Select::new()
            .with_prompt(format!("@{}, your vote", voter))
            .items(&options)
            .default(0)
            .interact()?;
        let ballot = options.get(choice).cloned().context("No such option")?;

        match registry.with_game(session, |game| game.cast_vote(&voter, ballot))? {
            VoteOutcome::Recorded { .. } => {}
            VoteOutcome::Resolved { tally, lynch } => {
                for (player, votes) in tally.ranking() {
                    println!("  @{}: {}", player, votes);
                }
                println!("  abstained: {}", tally.abstains());
                println!("{}", describe_lynch(&lynch));
            }
        }
    }
    Ok(())
}

fn guess_round(registry: &GameRegistry, session: &SessionId) -> anyhow::Result<()> {
    let ghost = registry
        .with_game(session, |game| Ok(game.last_eliminated().cloned()))?
        .context("No ghost to guess")?;

    let guess: String = Input::new()
        .with_prompt(format!("@{}, guess the town word", ghost))
        .interact_text()?;
    match registry.with_game(session, |game| game.make_guess(&ghost, &guess))? {
        GuessOutcome::Correct => println!("Correct!"),
        GuessOutcome::Wrong { winner: None } => {
            println!("Wrong! @{} is out. Vote again.", ghost)
        }
        GuessOutcome::Wrong { .. } => println!("Wrong! @{} is out.", ghost),
        GuessOutcome::Ignored => {}
    }
    Ok(())
}
