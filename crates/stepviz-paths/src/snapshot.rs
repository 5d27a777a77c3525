use std::fmt;

use stepviz_core::{Point, RunReport};

use crate::field::Cell;

/// Lifecycle of an A* run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchState {
    Ready,
    Running,
    Found,
    Exhausted,
}

impl SearchState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Found | Self::Exhausted)
    }
}

/// Everything a renderer needs to redraw the grid at one step boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridSnapshot {
    pub size: i32,
    /// Row-major, `size * size` entries.
    pub cells: Vec<Cell>,
    pub walls: Vec<Point>,
    pub start: Point,
    pub end: Point,
    pub state: SearchState,
    pub finalized: usize,
}

impl GridSnapshot {
    pub fn cell(&self, p: Point) -> Option<&Cell> {
        if p.x < 0 || p.y < 0 || p.x >= self.size || p.y >= self.size {
            return None;
        }
        self.cells.get((p.y * self.size + p.x) as usize)
    }

    pub fn visited(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.cells.iter().filter(|c| c.visited)
    }

    pub fn on_path(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.cells.iter().filter(|c| c.on_path)
    }
}

/// Result of a finished A* run. The path is empty when the goal is
/// unreachable.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathOutcome {
    /// Start to goal, both included.
    pub path: Vec<Point>,
    /// Number of cells finalized during the search.
    pub finalized: usize,
}

impl PathOutcome {
    pub fn is_found(&self) -> bool {
        !self.path.is_empty()
    }

    /// Number of cells on the path (0 if none).
    pub fn path_len(&self) -> usize {
        self.path.len()
    }
}

/// Figures shown next to the grid once a run ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunStats {
    pub finalized: usize,
    pub path_len: usize,
    pub elapsed_ms: f64,
}

impl RunStats {
    pub fn from_report(report: &RunReport<PathOutcome>) -> Self {
        Self {
            finalized: report.output.finalized,
            path_len: report.output.path_len(),
            elapsed_ms: report.elapsed.as_secs_f64() * 1000.0,
        }
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "visited {}  path {}  time {:.2}ms",
            self.finalized, self.path_len, self.elapsed_ms
        )
    }
}
