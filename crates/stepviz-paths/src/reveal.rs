use stepviz_core::{Machine, Point, Step};

use crate::snapshot::GridSnapshot;

/// Pause between path cells when replaying a found path.
pub const DEFAULT_REVEAL_DELAY_MS: u64 = 30;

/// Replays a path over a finished search, marking one cell per step.
///
/// Runs on its own copy of the final snapshot with every path mark cleared,
/// so the renderer sees the path grow from start to goal.
#[derive(Debug, Clone)]
pub struct PathReveal {
    snapshot: GridSnapshot,
    path: Vec<Point>,
    next: usize,
}

impl PathReveal {
    pub fn new(mut snapshot: GridSnapshot, path: Vec<Point>) -> Self {
        for c in &mut snapshot.cells {
            c.on_path = false;
        }
        Self {
            snapshot,
            path,
            next: 0,
        }
    }

    /// Cells revealed so far.
    pub fn revealed(&self) -> usize {
        self.next
    }
}

impl Machine for PathReveal {
    type Snapshot = GridSnapshot;
    /// Number of cells revealed.
    type Output = usize;

    fn advance(&mut self) -> Step<usize> {
        let Some(&p) = self.path.get(self.next) else {
            return Step::Done(self.next);
        };
        let size = self.snapshot.size;
        if let Some(c) = self.snapshot.cells.get_mut((p.y * size + p.x) as usize) {
            c.on_path = true;
        }
        self.next += 1;
        if self.next == self.path.len() {
            Step::Done(self.next)
        } else {
            Step::Progress
        }
    }

    fn snapshot(&self) -> GridSnapshot {
        self.snapshot.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astar::AstarMachine;
    use crate::board::Board;

    #[test]
    fn reveal_marks_path_in_order() {
        let b = Board::new(5).unwrap();
        let mut search = AstarMachine::new(&b).unwrap();
        while !matches!(search.advance(), Step::Done(_)) {}

        let mut reveal = search.reveal();
        assert_eq!(reveal.snapshot().on_path().count(), 0);
        let path = search.path().to_vec();
        for (i, p) in path.iter().enumerate() {
            let step = reveal.advance();
            let snap = reveal.snapshot();
            assert!(snap.cell(*p).unwrap().on_path);
            assert_eq!(snap.on_path().count(), i + 1);
            if i + 1 == path.len() {
                assert_eq!(step, Step::Done(path.len()));
            } else {
                assert_eq!(step, Step::Progress);
            }
        }
        assert_eq!(reveal.revealed(), 9);
    }

    #[test]
    fn empty_path_finishes_at_once() {
        let b = Board::new(5).unwrap();
        let search = AstarMachine::new(&b).unwrap();
        let mut reveal = search.reveal();
        assert_eq!(reveal.advance(), Step::Done(0));
    }
}
