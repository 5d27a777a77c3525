use stepviz_core::{ConfigError, Machine, Point, Step, StepError};

use crate::board::Board;
use crate::field::Field;
use crate::frontier::Frontier;
use crate::reveal::PathReveal;
use crate::snapshot::{GridSnapshot, PathOutcome, SearchState};
use crate::traits::{AstarPather, Pather};

/// A* search over a [`Board`], one finalized cell per step.
///
/// The board is copied at construction, so later edits do not reach an
/// in-flight search. Ties on `f` go to the cell that joined the frontier
/// first; neighbors are expanded up, right, down, left.
#[derive(Debug, Clone)]
pub struct AstarMachine {
    board: Board,
    field: Field,
    frontier: Frontier,
    start_idx: usize,
    goal_idx: usize,
    state: SearchState,
    finalized: usize,
    path: Vec<Point>,
    nbuf: Vec<Point>,
}

impl AstarMachine {
    /// Validate `board` and prepare a search in the `Ready` state.
    pub fn new(board: &Board) -> Result<Self, ConfigError> {
        board.validate()?;
        let board = board.clone();
        let mut field = Field::new(board.size());
        let rng = field.range();
        let start = board.start();
        let goal = board.end();
        // Both endpoints are in bounds after validation.
        let (Some(start_idx), Some(goal_idx)) = (rng.index(start), rng.index(goal)) else {
            return Err(ConfigError::OutOfBounds {
                role: "start",
                point: start,
                size: board.size(),
            });
        };

        let h = board.estimate(start, goal);
        let cell = field.at_mut(start_idx);
        cell.g = 0;
        cell.h = h;
        cell.f = h;

        let mut frontier = Frontier::new(field.len());
        frontier.insert_if_absent(start_idx, h);

        log::debug!(
            "A* ready on {0}x{0} grid: {start} -> {goal}, {1} walls",
            board.size(),
            board.wall_count()
        );

        Ok(Self {
            board,
            field,
            frontier,
            start_idx,
            goal_idx,
            state: SearchState::Ready,
            finalized: 0,
            path: Vec::new(),
            nbuf: Vec::with_capacity(4),
        })
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    /// Cells finalized so far.
    pub fn finalized(&self) -> usize {
        self.finalized
    }

    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    /// The board captured at construction.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The reconstructed path; empty until the goal is found.
    pub fn path(&self) -> &[Point] {
        &self.path
    }

    /// A machine replaying the found path one cell at a time.
    pub fn reveal(&self) -> PathReveal {
        PathReveal::new(self.snapshot(), self.path.clone())
    }

    fn outcome(&self) -> PathOutcome {
        PathOutcome {
            path: self.path.clone(),
            finalized: self.finalized,
        }
    }

    /// Walk parent links back from the goal and return start → goal.
    fn reconstruct(&self) -> Result<Vec<Point>, StepError> {
        let rng = self.field.range();
        let goal = rng.point(self.goal_idx);
        let limit = self.field.len();
        let mut path = Vec::new();
        let mut cur = Some(goal);
        while let Some(p) = cur {
            if path.len() >= limit {
                return Err(StepError::PredecessorCycle { from: goal, limit });
            }
            path.push(p);
            cur = self.field.get(p).and_then(|c| c.parent);
        }
        path.reverse();
        if path.first() != Some(&rng.point(self.start_idx)) {
            return Err(StepError::Invariant(format!(
                "path from {goal} does not lead back to the start"
            )));
        }
        Ok(path)
    }
}

impl Machine for AstarMachine {
    type Snapshot = GridSnapshot;
    type Output = PathOutcome;

    fn advance(&mut self) -> Step<PathOutcome> {
        match self.state {
            SearchState::Found | SearchState::Exhausted => return Step::Failed(StepError::Finished),
            SearchState::Ready => self.state = SearchState::Running,
            SearchState::Running => {}
        }

        let Some(ci) = self.frontier.pop_min() else {
            self.state = SearchState::Exhausted;
            log::debug!("A* exhausted after finalizing {} cells", self.finalized);
            return Step::Done(self.outcome());
        };

        let cell = self.field.at_mut(ci);
        if cell.visited {
            return Step::Failed(StepError::Invariant(format!(
                "finalized cell {} was queued again",
                cell.pos
            )));
        }
        cell.visited = true;
        let current = cell.pos;
        let current_g = cell.g;
        self.finalized += 1;

        if ci == self.goal_idx {
            self.state = SearchState::Found;
            let path = match self.reconstruct() {
                Ok(path) => path,
                Err(err) => return Step::Failed(err),
            };
            for &p in &path {
                if let Some(c) = self.field.get_mut(p) {
                    c.on_path = true;
                }
            }
            log::debug!(
                "A* found a path of {} cells after finalizing {}",
                path.len(),
                self.finalized
            );
            self.path = path;
            return Step::Done(self.outcome());
        }

        let goal = self.board.end();
        self.nbuf.clear();
        self.board.neighbors(current, &mut self.nbuf);

        for &np in &self.nbuf {
            let Some(ni) = self.field.index(np) else {
                continue;
            };
            if self.field.at(ni).visited {
                continue;
            }
            let cost = self.board.cost(current, np);
            if cost <= 0 {
                return Step::Failed(StepError::Invariant(format!(
                    "edge {current} -> {np} has non-positive cost {cost}"
                )));
            }
            let tentative_g = current_g + cost;

            let n = self.field.at_mut(ni);
            if tentative_g < n.g {
                n.parent = Some(current);
                n.g = tentative_g;
                n.h = self.board.estimate(np, goal);
                n.f = n.g + n.h;
                let f = n.f;
                if !self.frontier.insert_if_absent(ni, f) {
                    self.frontier.rescore(ni, f);
                }
            }
        }

        Step::Progress
    }

    fn snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            size: self.board.size(),
            cells: self.field.cells().to_vec(),
            walls: self.board.walls().collect(),
            start: self.board.start(),
            end: self.board.end(),
            state: self.state,
            finalized: self.finalized,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use proptest::prelude::*;
    use stepviz_core::{ManualClock, RunOutcome, Stepper};

    use super::*;
    use crate::bfs::{reachable_count, shortest_path_len};
    use crate::traits::manhattan;

    fn board(size: i32, start: (i32, i32), end: (i32, i32), walls: &[(i32, i32)]) -> Board {
        let mut b = Board::new(size).unwrap();
        b.set_start(Point::new(start.0, start.1)).unwrap();
        b.set_end(Point::new(end.0, end.1)).unwrap();
        for &(x, y) in walls {
            b.set_wall(Point::new(x, y), true);
        }
        b
    }

    /// Advance to completion, collecting every post-step snapshot.
    fn drive(m: &mut AstarMachine) -> (Vec<GridSnapshot>, PathOutcome) {
        let mut snaps = Vec::new();
        loop {
            match m.advance() {
                Step::Progress => snaps.push(m.snapshot()),
                Step::Done(out) => {
                    snaps.push(m.snapshot());
                    return (snaps, out);
                }
                Step::Failed(err) => panic!("search failed: {err}"),
            }
        }
    }

    #[test]
    fn open_grid_corner_to_corner() {
        let b = board(5, (0, 0), (4, 4), &[]);
        let mut m = AstarMachine::new(&b).unwrap();
        let (_, out) = drive(&mut m);
        assert_eq!(m.state(), SearchState::Found);
        assert_eq!(out.path_len(), 9);
        assert!(out.finalized <= 25);
        assert_eq!(out.path.first(), Some(&Point::new(0, 0)));
        assert_eq!(out.path.last(), Some(&Point::new(4, 4)));
        let goal = Point::new(4, 4);
        for pair in out.path.windows(2) {
            assert_eq!(manhattan(pair[0], pair[1]), 1);
            assert!(manhattan(pair[1], goal) < manhattan(pair[0], goal));
        }
        let marked: Vec<Point> = m.field().cells().iter().filter(|c| c.on_path).map(|c| c.pos).collect();
        assert_eq!(marked.len(), 9);
    }

    #[test]
    fn wall_row_blocks_everything() {
        let row: Vec<(i32, i32)> = (0..5).map(|x| (x, 2)).collect();
        let b = board(5, (0, 0), (4, 4), &row);
        let mut m = AstarMachine::new(&b).unwrap();
        let (_, out) = drive(&mut m);
        assert_eq!(m.state(), SearchState::Exhausted);
        assert!(out.path.is_empty());
        assert_eq!(out.finalized, 10);
        assert_eq!(out.finalized, reachable_count(&b, b.range(), b.start()));
    }

    #[test]
    fn start_equals_end_is_found_immediately() {
        let b = board(5, (2, 2), (2, 2), &[]);
        let mut m = AstarMachine::new(&b).unwrap();
        assert_eq!(m.state(), SearchState::Ready);
        match m.advance() {
            Step::Done(out) => {
                assert_eq!(out.path, vec![Point::new(2, 2)]);
                assert_eq!(out.finalized, 1);
            }
            other => panic!("expected immediate finish, got {other:?}"),
        }
        assert_eq!(m.state(), SearchState::Found);
    }

    #[test]
    fn advancing_a_finished_search_fails() {
        let b = board(5, (1, 1), (1, 1), &[]);
        let mut m = AstarMachine::new(&b).unwrap();
        assert!(matches!(m.advance(), Step::Done(_)));
        assert_eq!(m.advance(), Step::Failed(StepError::Finished));
    }

    #[test]
    fn ready_state_seeds_start() {
        let b = board(5, (0, 0), (4, 4), &[]);
        let m = AstarMachine::new(&b).unwrap();
        let s = m.snapshot();
        assert_eq!(s.state, SearchState::Ready);
        let c = s.cell(Point::new(0, 0)).unwrap();
        assert_eq!((c.g, c.h, c.f), (0, 8, 8));
        assert_eq!(m.frontier_len(), 1);
        assert_eq!(s.finalized, 0);
    }

    #[test]
    fn ties_expand_the_first_queued_neighbor() {
        // From (0,0) both (1,0) and (0,1) score f = 8; right is queued
        // before down, so it is finalized first.
        let b = board(5, (0, 0), (4, 4), &[]);
        let mut m = AstarMachine::new(&b).unwrap();
        assert_eq!(m.advance(), Step::Progress);
        assert_eq!(m.advance(), Step::Progress);
        let s = m.snapshot();
        assert!(s.cell(Point::new(1, 0)).unwrap().visited);
        assert!(!s.cell(Point::new(0, 1)).unwrap().visited);
    }

    #[test]
    fn bad_configuration_is_rejected() {
        let mut b = board(5, (0, 0), (4, 4), &[(2, 2)]);
        b.set_end(Point::new(2, 2)).unwrap();
        assert_eq!(
            AstarMachine::new(&b).unwrap_err(),
            ConfigError::OnWall {
                role: "end",
                point: Point::new(2, 2)
            }
        );

        let cfg = crate::BoardConfig {
            grid_size: 5,
            start: Point::new(0, 7),
            ..Default::default()
        };
        assert!(matches!(
            crate::Board::from_config(&cfg),
            Err(ConfigError::OutOfBounds { role: "start", .. })
        ));
    }

    /// Point the parent links of `a` and `b` at each other.
    fn link_in_a_loop(m: &mut AstarMachine, a: Point, b: Point) {
        m.field.get_mut(a).unwrap().parent = Some(b);
        m.field.get_mut(b).unwrap().parent = Some(a);
    }

    #[test]
    fn looping_parents_are_reported() {
        let b = board(5, (0, 0), (2, 0), &[]);
        let mut m = AstarMachine::new(&b).unwrap();
        link_in_a_loop(&mut m, Point::new(2, 0), Point::new(3, 0));
        assert_eq!(
            m.reconstruct(),
            Err(StepError::PredecessorCycle {
                from: Point::new(2, 0),
                limit: 25
            })
        );
    }

    #[test]
    fn looping_parents_abort_the_run() {
        let b = board(5, (2, 0), (2, 0), &[]);
        let mut m = AstarMachine::new(&b).unwrap();
        link_in_a_loop(&mut m, Point::new(2, 0), Point::new(3, 0));
        let mut stepper = Stepper::new(m, Duration::ZERO);
        let mut seen = Vec::new();
        let err = stepper
            .run(&mut ManualClock::new(), |s| seen.push(s))
            .unwrap_err();
        assert!(matches!(err, StepError::PredecessorCycle { .. }));
        assert!(seen.is_empty());
        assert!(stepper.is_finished());
    }

    #[test]
    fn requeued_finalized_cell_aborts() {
        let b = board(5, (0, 0), (4, 4), &[]);
        let mut m = AstarMachine::new(&b).unwrap();
        assert_eq!(m.advance(), Step::Progress);
        m.frontier.insert_if_absent(m.start_idx, 0);
        assert!(matches!(m.advance(), Step::Failed(StepError::Invariant(_))));
    }

    #[test]
    fn board_edits_do_not_reach_a_running_search() {
        let mut b = board(5, (0, 0), (4, 0), &[]);
        let mut m = AstarMachine::new(&b).unwrap();
        m.advance();
        for y in 0..5 {
            b.set_wall(Point::new(2, y), true);
        }
        let (_, out) = drive(&mut m);
        assert_eq!(out.path_len(), 5);
        assert!(m.board().wall_count() == 0);
    }

    #[test]
    fn finalized_count_grows_by_one_and_visited_cells_freeze() {
        let b = board(8, (0, 0), (7, 5), &[(3, 0), (3, 1), (3, 2), (3, 3), (5, 5), (5, 6), (5, 7)]);
        let mut m = AstarMachine::new(&b).unwrap();
        let (snaps, _) = drive(&mut m);
        for pair in snaps.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            assert_eq!(next.finalized, prev.finalized + 1);
            for (a, c) in prev.cells.iter().zip(&next.cells) {
                if a.visited {
                    assert!(c.visited);
                    assert_eq!((a.g, a.h, a.f, a.parent), (c.g, c.h, c.f, c.parent));
                }
                if let (Some(g), Some(f)) = (c.g_score(), c.f_score()) {
                    assert_eq!(f, g + c.h);
                }
            }
        }
    }

    #[test]
    fn snapshots_do_not_depend_on_delay() {
        let b = board(10, (1, 1), (8, 7), &[(4, 2), (4, 3), (4, 4), (4, 5), (4, 6)]);
        let run = |delay_ms: u64| {
            let m = AstarMachine::new(&b).unwrap();
            let mut stepper = Stepper::new(m, Duration::from_millis(delay_ms));
            let mut snaps = Vec::new();
            let outcome = stepper.run(&mut ManualClock::new(), |s| snaps.push(s)).unwrap();
            let RunOutcome::Completed(report) = outcome else {
                panic!("run was cancelled");
            };
            (snaps, report.output)
        };
        let (fast, fast_out) = run(0);
        let (slow, slow_out) = run(500);
        assert_eq!(fast, slow);
        assert_eq!(fast_out, slow_out);
        // Repeated runs are identical too.
        assert_eq!(run(0).0, fast);
    }

    fn arb_board() -> impl Strategy<Value = Board> {
        (5..=8i32).prop_flat_map(|size| {
            let n = (size * size) as usize;
            (
                Just(size),
                proptest::collection::vec(proptest::bool::weighted(0.3), n),
                0..n,
                0..n,
            )
                .prop_map(|(size, wall_mask, s, e)| {
                    let mut b = Board::new(size).unwrap();
                    let rng = b.range();
                    b.set_start(rng.point(s)).unwrap();
                    b.set_end(rng.point(e)).unwrap();
                    for (i, wall) in wall_mask.into_iter().enumerate() {
                        if wall {
                            b.set_wall(rng.point(i), true);
                        }
                    }
                    b
                })
        })
    }

    proptest! {
        #[test]
        fn path_length_matches_bfs(b in arb_board()) {
            let mut m = AstarMachine::new(&b).unwrap();
            let (_, out) = drive(&mut m);
            match shortest_path_len(&b, b.range(), b.start(), b.end()) {
                Some(len) => {
                    prop_assert_eq!(out.path_len(), len);
                    for pair in out.path.windows(2) {
                        prop_assert_eq!(manhattan(pair[0], pair[1]), 1);
                        prop_assert!(!b.is_wall(pair[1]));
                    }
                }
                None => {
                    prop_assert!(out.path.is_empty());
                    prop_assert_eq!(out.finalized, reachable_count(&b, b.range(), b.start()));
                }
            }
        }
    }
}
