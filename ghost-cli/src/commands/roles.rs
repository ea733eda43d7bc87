use comfy_table::{presets::UTF8_FULL, Table};
use ghost_engine::role_table;

pub fn show_roles() {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Players", "Town", "Ghosts", "Fools"]);

    for (players, counts) in role_table() {
        table.add_row(vec![
            players.to_string(),
            counts.town.to_string(),
            counts.ghost.to_string(),
            counts.fool.to_string(),
        ]);
    }

    println!("{}", table);
    println!();
    println!("Town players get the town word, Fools get a different word of the same");
    println!("length and Ghosts get nothing. Ghosts win by outnumbering the town or by");
    println!("guessing the town word once caught.");
}
