//! `astar [board.json]`: the grid editor on its own.

use std::path::PathBuf;

fn main() {
    env_logger::init();

    let config = std::env::args().nth(1).map(PathBuf::from);
    if let Err(err) = stepviz_demos::run_astar(config.as_deref()) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
