//! Step-by-step grid pathfinding.
//!
//! [`AstarMachine`] runs A* over a [`Board`] as a [`stepviz_core::Machine`]:
//! every `advance` finalizes one frontier cell, so a
//! [`Stepper`](stepviz_core::Stepper) can render the search as it spreads.
//!
//! - 4-directional, unit-cost movement with the Manhattan heuristic
//! - frontier ties resolved first-queued-first ([`Frontier`])
//! - unreachable goals end in [`SearchState::Exhausted`], not an error
//! - [`PathReveal`] replays a found path cell by cell
//! - BFS helpers ([`shortest_path_len`], [`reachable_count`]) as a reference

mod astar;
mod bfs;
mod board;
mod field;
mod frontier;
mod reveal;
mod snapshot;
mod traits;

pub use astar::AstarMachine;
pub use bfs::{bfs_distances, reachable_count, shortest_path_len};
pub use board::{
    Board, BoardConfig, DEFAULT_GRID_SIZE, DEFAULT_STEP_DELAY_MS, MAX_GRID_SIZE, MIN_GRID_SIZE,
};
pub use field::{Cell, Field, UNKNOWN};
pub use frontier::Frontier;
pub use reveal::{DEFAULT_REVEAL_DELAY_MS, PathReveal};
pub use snapshot::{GridSnapshot, PathOutcome, RunStats, SearchState};
pub use traits::{AstarPather, Pather, manhattan};
