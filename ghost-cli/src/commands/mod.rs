mod play;
mod roles;
mod simulate;

pub use play::play_game;
pub use roles::show_roles;
pub use simulate::simulate_game;

use comfy_table::{presets::UTF8_FULL, Table};
use ghost_engine::{GhostGame, Lynch, NoElection};

fn describe_lynch(lynch: &Lynch) -> String {
    match lynch {
        Lynch::NoElimination(NoElection::Skipped) => {
            "Too many players abstained. Nobody is lynched.".to_string()
        }
        Lynch::NoElimination(NoElection::Tied) => "The vote is tied. Nobody is lynched.".to_string(),
        Lynch::NoElimination(NoElection::NoVotes) => "Nobody voted. Nobody is lynched.".to_string(),
        Lynch::GhostCaught(player) => {
            format!("@{} was a Ghost! They get one guess at the town word.", player)
        }
        Lynch::Eliminated { player, role, .. } => {
            format!("@{} was lynched. They were {}.", player, role)
        }
    }
}

/// Final standings with every role revealed.
fn summary_table(game: &GhostGame) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Player", "Role", "Status"]);

    for (player, role) in game.roles().unwrap_or_default() {
        let status = if game.is_alive(&player) {
            "Alive"
        } else {
            "Lynched"
        };
        table.add_row(vec![format!("@{}", player), role.to_string(), status.to_string()]);
    }
    table
}
