//! Terminal front ends for the stepviz machines.
//!
//! [`run`] dispatches a parsed command line to its view; every view owns the
//! terminal for as long as it plays.

pub mod args;
pub mod config;
pub mod error;
pub mod player;
pub mod views;

use std::path::Path;
use std::time::Duration;

use stepviz_algos::{AnnealConfig, ClimbConfig, GeneticConfig, SwarmConfig};
use stepviz_paths::{Board, BoardConfig};
use stepviz_term::Terminal;

pub use args::{Args, Command, Method, USAGE};
pub use error::DemoError;

use crate::config::{example_json, load_json};
use crate::views::cluster::ClusterConfig;
use crate::views::optimize::Overrides;

/// Default configuration for `name`, as printed by `stepviz example`.
pub fn example(name: &str) -> Result<String, DemoError> {
    match name {
        "astar" => example_json::<BoardConfig>(),
        "climb" => example_json::<ClimbConfig>(),
        "anneal" => example_json::<AnnealConfig>(),
        "genetic" => example_json::<GeneticConfig>(),
        "swarm" => example_json::<SwarmConfig>(),
        "kmeans" => example_json::<ClusterConfig>(),
        other => Err(DemoError::usage(format!("no example named `{other}`"))),
    }
}

/// Loads a board file and opens the grid editor on it.
pub fn run_astar(config: Option<&Path>) -> Result<(), DemoError> {
    let cfg: BoardConfig = load_json(config)?;
    let board = Board::from_config(&cfg)?;
    with_terminal(true, |term| views::pathfind::run(term, board))
}

fn with_terminal<F>(mouse: bool, f: F) -> Result<(), DemoError>
where
    F: FnOnce(&mut Terminal) -> Result<(), DemoError>,
{
    let mut term = Terminal::new().with_mouse(mouse);
    term.init()?;
    let result = f(&mut term);
    term.close();
    result
}

pub fn run(args: Args) -> Result<(), DemoError> {
    match args.command {
        Command::Help => {
            println!("{USAGE}");
            Ok(())
        }
        Command::Example { name } => {
            println!("{}", example(&name)?);
            Ok(())
        }
        Command::Astar { config } => run_astar(config.as_deref()),
        Command::Sort { kind, opts } => {
            with_terminal(false, |term| views::arrays::sort(term, kind, opts))
        }
        Command::Search {
            binary,
            target,
            opts,
        } => with_terminal(false, |term| {
            views::arrays::search(term, binary, target, opts)
        }),
        Command::Optimize {
            method,
            config,
            objective,
            seed,
            delay_ms,
        } => with_terminal(false, |term| {
            views::optimize::run(
                term,
                method,
                config.as_deref(),
                Overrides { objective, seed },
                Duration::from_millis(delay_ms),
            )
        }),
        Command::KMeans {
            config,
            seed,
            delay_ms,
        } => with_terminal(false, |term| {
            views::cluster::run(
                term,
                config.as_deref(),
                seed,
                Duration::from_millis(delay_ms),
            )
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_example_exists() {
        for name in ["astar", "climb", "anneal", "genetic", "swarm", "kmeans"] {
            let json = example(name).unwrap();
            assert!(json.starts_with('{'), "{name}");
        }
        assert!(matches!(example("sort"), Err(DemoError::Usage(_))));
    }

    #[test]
    fn examples_load_back() {
        let json = example("genetic").unwrap();
        let cfg: GeneticConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, GeneticConfig::default());
    }
}
