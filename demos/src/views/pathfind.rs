//! Grid editor with an animated A* search.

use std::time::Duration;

use stepviz_core::{Machine, Point, Session};
use stepviz_paths::{
    AstarMachine, Board, DEFAULT_REVEAL_DELAY_MS, GridSnapshot, PathReveal, RunStats, SearchState,
};
use stepviz_term::draw::{draw_grid, draw_status};
use stepviz_term::{Canvas, Input, Terminal, palette};

use crate::error::DemoError;
use crate::player::{Control, FRAME, Played, play, status_row};

/// Screen position of the top-left grid cell.
const ORIGIN: Point = Point::new(1, 2);

const HELP: &str = "drag walls or endpoints  +/- size  c clear  enter run  q quit";

/// Grid cell under screen position `p`; cells are two columns wide.
fn cell_at(p: Point) -> Point {
    let dx = p.x - ORIGIN.x;
    let dy = p.y - ORIGIN.y;
    Point::new(dx.div_euclid(2), dy)
}

fn state_label(s: SearchState) -> &'static str {
    match s {
        SearchState::Ready => "ready",
        SearchState::Running => "searching",
        SearchState::Found => "path found",
        SearchState::Exhausted => "no path",
    }
}

fn draw_board(c: &mut Canvas, snap: &GridSnapshot, stats: Option<RunStats>) {
    let title = format!(
        "A* {n}x{n}  {}  finalized {}",
        state_label(snap.state),
        snap.finalized,
        n = snap.size
    );
    c.text(Point::ZERO, &title, palette::STATUS);
    draw_grid(c, ORIGIN, snap);
    let y = status_row(c);
    match stats {
        Some(s) => draw_status(c, y, &format!("{s}   {HELP}")),
        None => draw_status(c, y, HELP),
    }
}

/// What the pointer is holding since the last click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Held {
    /// Wall state painted over every cell the drag crosses.
    Paint(bool),
    Start,
    End,
}

/// Mouse edits shared by the idle editor and a running search.
///
/// A click on an endpoint picks it up and dragging moves it. A click
/// anywhere else flips a cell and dragging paints the new state.
#[derive(Debug)]
struct Brush {
    held: Held,
}

impl Default for Brush {
    fn default() -> Self {
        Self {
            held: Held::Paint(true),
        }
    }
}

impl Brush {
    fn apply(&mut self, board: &mut Board, input: Input) -> bool {
        match input {
            Input::Click(p) => {
                let cell = cell_at(p);
                if cell == board.start() {
                    self.held = Held::Start;
                    false
                } else if cell == board.end() {
                    self.held = Held::End;
                    false
                } else {
                    let on = !board.is_wall(cell);
                    self.held = Held::Paint(on);
                    board.set_wall(cell, on)
                }
            }
            Input::Drag(p) => {
                let cell = cell_at(p);
                match self.held {
                    Held::Paint(on) => board.set_wall(cell, on),
                    Held::Start => move_endpoint(board, cell, true),
                    Held::End => move_endpoint(board, cell, false),
                }
            }
            _ => false,
        }
    }
}

/// Moves the start (or the end) onto `cell` if it is open and not the
/// other endpoint.
fn move_endpoint(board: &mut Board, cell: Point, start: bool) -> bool {
    let (current, other) = if start {
        (board.start(), board.end())
    } else {
        (board.end(), board.start())
    };
    if cell == current || cell == other || !board.is_open(cell) {
        return false;
    }
    let moved = if start {
        board.set_start(cell)
    } else {
        board.set_end(cell)
    };
    moved.is_ok()
}

/// Plays a search, then replays its path if one was found.
fn search(
    term: &mut Terminal,
    session: &mut Session,
    board: &mut Board,
    brush: &mut Brush,
) -> Result<(GridSnapshot, Option<RunStats>), DemoError> {
    loop {
        let machine = AstarMachine::new(board)?;
        let delay = board.step_delay();
        // Edits made during the run land on the board, not on the machine.
        let played = play(
            term,
            session,
            machine,
            delay,
            |c, s| draw_board(c, s, None),
            |input| {
                brush.apply(board, input);
                Control::Continue
            },
        )?;
        let (snapshot, report) = match played {
            Played::Finished { snapshot, report } => (snapshot, report),
            Played::Restart => continue,
            Played::Quit => return Ok((AstarMachine::new(board)?.snapshot(), None)),
        };
        let stats = RunStats::from_report(&report);
        log::info!("search done: {stats}");
        if !report.output.is_found() {
            return Ok((snapshot, Some(stats)));
        }

        let reveal = PathReveal::new(snapshot.clone(), report.output.path);
        let played = play(
            term,
            session,
            reveal,
            Duration::from_millis(DEFAULT_REVEAL_DELAY_MS),
            |c, s| draw_board(c, s, Some(stats)),
            |_| Control::Continue,
        )?;
        match played {
            Played::Finished { snapshot, .. } => return Ok((snapshot, Some(stats))),
            Played::Quit => return Ok((snapshot, Some(stats))),
            Played::Restart => {}
        }
    }
}

/// Runs the editor until the user quits.
pub fn run(term: &mut Terminal, mut board: Board) -> Result<(), DemoError> {
    board.validate()?;
    let mut session = Session::new();
    let mut brush = Brush::default();
    let mut shown = AstarMachine::new(&board)?.snapshot();
    let mut stats = None;
    let mut dirty = true;

    loop {
        if dirty {
            let mut c = term.canvas()?;
            draw_board(&mut c, &shown, stats);
            term.present(&c)?;
            dirty = false;
        }
        let Some(input) = term.poll_input(FRAME * 4)? else {
            continue;
        };
        let mut edited = false;
        match input {
            i if i.is_quit() => return Ok(()),
            Input::Click(_) | Input::Drag(_) => edited = brush.apply(&mut board, input),
            Input::Char('+') | Input::Char('=') => {
                let size = board.size() + 1;
                edited = resize(&mut board, size);
            }
            Input::Char('-') => {
                let size = board.size() - 1;
                edited = resize(&mut board, size);
            }
            Input::Char('c') => {
                board.clear_walls();
                edited = true;
            }
            Input::Enter | Input::Char('s') => {
                let (snap, s) = search(term, &mut session, &mut board, &mut brush)?;
                shown = snap;
                stats = s;
                dirty = true;
            }
            Input::Resize { .. } => dirty = true,
            _ => {}
        }
        if edited {
            shown = AstarMachine::new(&board)?.snapshot();
            stats = None;
            dirty = true;
        }
    }
}

fn resize(board: &mut Board, size: i32) -> bool {
    match board.set_size(size) {
        Ok(()) => true,
        Err(err) => {
            log::debug!("resize refused: {err}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_columns_pair_up_into_cells() {
        assert_eq!(cell_at(ORIGIN), Point::ZERO);
        assert_eq!(cell_at(ORIGIN.shift(1, 0)), Point::ZERO);
        assert_eq!(cell_at(ORIGIN.shift(2, 3)), Point::new(1, 3));
        assert_eq!(cell_at(Point::ZERO), Point::new(-1, -2));
    }

    #[test]
    fn drag_paints_the_clicked_state() {
        let mut b = Board::new(6).unwrap();
        let mut brush = Brush::default();
        let at = |x: i32, y: i32| ORIGIN.shift(2 * x, y);

        assert!(brush.apply(&mut b, Input::Click(at(2, 1))));
        assert!(brush.apply(&mut b, Input::Drag(at(2, 2))));
        assert!(!brush.apply(&mut b, Input::Drag(at(2, 2))));
        assert_eq!(b.wall_count(), 2);

        assert!(brush.apply(&mut b, Input::Click(at(2, 1))));
        assert!(brush.apply(&mut b, Input::Drag(at(2, 2))));
        assert_eq!(b.wall_count(), 0);
    }

    #[test]
    fn dragging_an_endpoint_moves_it() {
        let mut b = Board::new(6).unwrap();
        let mut brush = Brush::default();
        let at = |x: i32, y: i32| ORIGIN.shift(2 * x, y);

        assert!(!brush.apply(&mut b, Input::Click(at(0, 0))));
        assert!(brush.apply(&mut b, Input::Drag(at(1, 0))));
        assert!(brush.apply(&mut b, Input::Drag(at(1, 1))));
        assert_eq!(b.start(), Point::new(1, 1));

        assert!(!brush.apply(&mut b, Input::Click(at(5, 5))));
        assert!(brush.apply(&mut b, Input::Drag(at(4, 5))));
        assert_eq!(b.end(), Point::new(4, 5));
        assert_eq!(b.start(), Point::new(1, 1));
        assert_eq!(b.wall_count(), 0);
    }

    #[test]
    fn endpoints_avoid_walls_and_each_other() {
        let mut b = Board::new(6).unwrap();
        b.set_wall(Point::new(1, 0), true);
        let mut brush = Brush::default();
        let at = |x: i32, y: i32| ORIGIN.shift(2 * x, y);

        brush.apply(&mut b, Input::Click(at(0, 0)));
        assert!(!brush.apply(&mut b, Input::Drag(at(1, 0))));
        assert!(!brush.apply(&mut b, Input::Drag(at(5, 5))));
        assert!(!brush.apply(&mut b, Input::Drag(at(9, 0))));
        assert_eq!(b.start(), Point::ZERO);
        assert_eq!(b.end(), Point::new(5, 5));
        assert!(b.is_wall(Point::new(1, 0)));
    }

    #[test]
    fn endpoints_and_outside_cells_stay_open() {
        let mut b = Board::new(6).unwrap();
        let mut brush = Brush::default();
        assert!(!brush.apply(&mut b, Input::Click(ORIGIN)));
        assert!(!brush.apply(&mut b, Input::Click(Point::ZERO)));
        assert_eq!(b.wall_count(), 0);
    }

    #[test]
    fn resize_respects_limits() {
        let mut b = Board::new(5).unwrap();
        assert!(!resize(&mut b, 4));
        assert!(resize(&mut b, 6));
        assert_eq!(b.size(), 6);
    }

    #[test]
    fn board_shows_state_and_help() {
        let b = Board::new(5).unwrap();
        let snap = AstarMachine::new(&b).unwrap().snapshot();
        let mut c = Canvas::new(64, 10);
        draw_board(&mut c, &snap, None);
        assert!(c.row_text(0).starts_with("A* 5x5  ready"));
        assert!(c.row_text(9).starts_with(HELP));
    }
}
