//! The user-editable pathfinding setup: grid size, endpoints, walls.
//!
//! A [`Board`] outlives runs. Each run captures a copy at construction, so
//! edits made while a search is in flight only affect the next one.

use std::collections::BTreeSet;
use std::time::Duration;

use stepviz_core::{ConfigError, Point, Range};

use crate::traits::{AstarPather, Pather, manhattan};

pub const MIN_GRID_SIZE: i32 = 5;
pub const MAX_GRID_SIZE: i32 = 50;
pub const DEFAULT_GRID_SIZE: i32 = 20;
pub const DEFAULT_STEP_DELAY_MS: u64 = 50;

/// Serializable form of a [`Board`].
///
/// Missing fields come from the default 20×20 board, so a smaller
/// `grid_size` must also give `start` and `end`; [`Board::from_config`]
/// rejects endpoints left outside the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BoardConfig {
    pub grid_size: i32,
    pub start: Point,
    pub end: Point,
    pub walls: Vec<Point>,
    pub step_delay_ms: u64,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Board::default().to_config()
    }
}

/// Grid dimensions, start/end and the wall set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    size: i32,
    start: Point,
    end: Point,
    walls: BTreeSet<Point>,
    step_delay_ms: u64,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            size: DEFAULT_GRID_SIZE,
            start: Point::new(2, 2),
            end: Point::new(DEFAULT_GRID_SIZE - 3, DEFAULT_GRID_SIZE - 3),
            walls: BTreeSet::new(),
            step_delay_ms: DEFAULT_STEP_DELAY_MS,
        }
    }
}

impl Board {
    /// An empty `size × size` board with start at the top-left corner and
    /// end at the bottom-right corner.
    pub fn new(size: i32) -> Result<Self, ConfigError> {
        check_size(size)?;
        Ok(Self {
            size,
            start: Point::ZERO,
            end: Point::new(size - 1, size - 1),
            ..Self::default()
        })
    }

    /// Build a board from its serialized form, rejecting anything invalid.
    pub fn from_config(cfg: &BoardConfig) -> Result<Self, ConfigError> {
        let board = Self {
            size: cfg.grid_size,
            start: cfg.start,
            end: cfg.end,
            walls: cfg.walls.iter().copied().collect(),
            step_delay_ms: cfg.step_delay_ms,
        };
        board.validate()?;
        Ok(board)
    }

    pub fn to_config(&self) -> BoardConfig {
        BoardConfig {
            grid_size: self.size,
            start: self.start,
            end: self.end,
            walls: self.walls.iter().copied().collect(),
            step_delay_ms: self.step_delay_ms,
        }
    }

    #[inline]
    pub fn size(&self) -> i32 {
        self.size
    }

    #[inline]
    pub fn range(&self) -> Range {
        Range::square(self.size)
    }

    #[inline]
    pub fn start(&self) -> Point {
        self.start
    }

    #[inline]
    pub fn end(&self) -> Point {
        self.end
    }

    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    pub fn set_step_delay_ms(&mut self, ms: u64) {
        self.step_delay_ms = ms;
    }

    /// Resize the grid. Walls are cleared and the endpoints pulled inside
    /// the new bounds.
    pub fn set_size(&mut self, size: i32) -> Result<(), ConfigError> {
        check_size(size)?;
        self.size = size;
        self.walls.clear();
        let rng = self.range();
        self.start = rng.clamp(self.start);
        self.end = rng.clamp(self.end);
        log::debug!("board resized to {size}x{size}");
        Ok(())
    }

    pub fn set_start(&mut self, p: Point) -> Result<(), ConfigError> {
        self.check_bounds("start", p)?;
        self.start = p;
        Ok(())
    }

    pub fn set_end(&mut self, p: Point) -> Result<(), ConfigError> {
        self.check_bounds("end", p)?;
        self.end = p;
        Ok(())
    }

    #[inline]
    pub fn in_bounds(&self, p: Point) -> bool {
        self.range().contains(p)
    }

    #[inline]
    pub fn is_wall(&self, p: Point) -> bool {
        self.walls.contains(&p)
    }

    /// In bounds and not a wall.
    #[inline]
    pub fn is_open(&self, p: Point) -> bool {
        self.in_bounds(p) && !self.is_wall(p)
    }

    /// Flip the wall state of `p`. Endpoints and out-of-bounds points are
    /// left alone. Returns whether anything changed.
    pub fn toggle_wall(&mut self, p: Point) -> bool {
        let on = !self.is_wall(p);
        self.set_wall(p, on)
    }

    /// Place or remove a wall at `p`, with the same restrictions as
    /// [`toggle_wall`](Board::toggle_wall).
    pub fn set_wall(&mut self, p: Point, on: bool) -> bool {
        if !self.in_bounds(p) || p == self.start || p == self.end {
            return false;
        }
        if on {
            self.walls.insert(p)
        } else {
            self.walls.remove(&p)
        }
    }

    pub fn clear_walls(&mut self) {
        self.walls.clear();
    }

    /// Walls in row-major order.
    pub fn walls(&self) -> impl Iterator<Item = Point> + '_ {
        self.walls.iter().copied()
    }

    pub fn wall_count(&self) -> usize {
        self.walls.len()
    }

    /// Check everything a run relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_size(self.size)?;
        self.check_bounds("start", self.start)?;
        self.check_bounds("end", self.end)?;
        if let Some(&w) = self.walls.iter().find(|w| !self.in_bounds(**w)) {
            return Err(self.out_of_bounds("wall", w));
        }
        for (role, p) in [("start", self.start), ("end", self.end)] {
            if self.is_wall(p) {
                return Err(ConfigError::OnWall { role, point: p });
            }
        }
        Ok(())
    }

    fn check_bounds(&self, role: &'static str, p: Point) -> Result<(), ConfigError> {
        if self.in_bounds(p) {
            Ok(())
        } else {
            Err(self.out_of_bounds(role, p))
        }
    }

    fn out_of_bounds(&self, role: &'static str, point: Point) -> ConfigError {
        ConfigError::OutOfBounds {
            role,
            point,
            size: self.size,
        }
    }
}

fn check_size(size: i32) -> Result<(), ConfigError> {
    if (MIN_GRID_SIZE..=MAX_GRID_SIZE).contains(&size) {
        Ok(())
    } else {
        Err(ConfigError::GridSize {
            size,
            min: MIN_GRID_SIZE,
            max: MAX_GRID_SIZE,
        })
    }
}

impl Pather for Board {
    fn neighbors(&self, p: Point, buf: &mut Vec<Point>) {
        for n in p.neighbors_4() {
            if self.is_open(n) {
                buf.push(n);
            }
        }
    }
}

impl AstarPather for Board {
    fn cost(&self, _from: Point, _to: Point) -> i32 {
        1
    }

    fn estimate(&self, from: Point, to: Point) -> i32 {
        manhattan(from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_board_matches_visualizer_layout() {
        let b = Board::default();
        assert_eq!(b.size(), 20);
        assert_eq!(b.start(), Point::new(2, 2));
        assert_eq!(b.end(), Point::new(17, 17));
        assert_eq!(b.step_delay(), Duration::from_millis(50));
        assert!(b.validate().is_ok());
    }

    #[test]
    fn toggle_wall_skips_endpoints_and_outside() {
        let mut b = Board::new(5).unwrap();
        assert!(!b.toggle_wall(b.start()));
        assert!(!b.toggle_wall(b.end()));
        assert!(!b.toggle_wall(Point::new(5, 0)));
        assert!(b.toggle_wall(Point::new(2, 2)));
        assert!(b.is_wall(Point::new(2, 2)));
        assert!(b.toggle_wall(Point::new(2, 2)));
        assert!(!b.is_wall(Point::new(2, 2)));
    }

    #[test]
    fn resize_clears_walls_and_clamps_endpoints() {
        let mut b = Board::default();
        b.toggle_wall(Point::new(5, 5));
        b.set_size(10).unwrap();
        assert_eq!(b.wall_count(), 0);
        assert_eq!(b.start(), Point::new(2, 2));
        assert_eq!(b.end(), Point::new(9, 9));
        assert!(matches!(b.set_size(4), Err(ConfigError::GridSize { size: 4, .. })));
        assert!(matches!(b.set_size(51), Err(ConfigError::GridSize { .. })));
    }

    #[test]
    fn endpoints_outside_are_rejected() {
        let mut b = Board::new(5).unwrap();
        let err = b.set_start(Point::new(-1, 0)).unwrap_err();
        assert_eq!(
            err,
            ConfigError::OutOfBounds {
                role: "start",
                point: Point::new(-1, 0),
                size: 5
            }
        );
        assert!(b.set_end(Point::new(3, 3)).is_ok());
        assert_eq!(b.end(), Point::new(3, 3));
    }

    #[test]
    fn validate_catches_endpoint_on_wall() {
        let mut b = Board::new(5).unwrap();
        b.toggle_wall(Point::new(1, 1));
        // Moving an endpoint onto a wall is allowed while editing ...
        b.set_start(Point::new(1, 1)).unwrap();
        // ... but refused when a run is prepared.
        assert_eq!(
            b.validate(),
            Err(ConfigError::OnWall {
                role: "start",
                point: Point::new(1, 1)
            })
        );
    }

    #[test]
    fn from_config_rejects_walls_outside() {
        let cfg = BoardConfig {
            grid_size: 6,
            start: Point::new(0, 0),
            end: Point::new(5, 5),
            walls: vec![Point::new(6, 1)],
            step_delay_ms: 0,
        };
        assert!(matches!(
            Board::from_config(&cfg),
            Err(ConfigError::OutOfBounds { role: "wall", .. })
        ));
    }

    #[test]
    fn neighbors_follow_up_right_down_left() {
        let mut b = Board::new(5).unwrap();
        b.toggle_wall(Point::new(2, 3));
        let mut buf = Vec::new();
        b.neighbors(Point::new(2, 2), &mut buf);
        assert_eq!(buf, vec![Point::new(2, 1), Point::new(3, 2), Point::new(1, 2)]);
        buf.clear();
        b.neighbors(Point::new(0, 0), &mut buf);
        assert_eq!(buf, vec![Point::new(1, 0), Point::new(0, 1)]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn config_json_roundtrip() {
        let mut b = Board::new(8).unwrap();
        b.toggle_wall(Point::new(3, 4));
        let json = serde_json::to_string(&b.to_config()).unwrap();
        let cfg: BoardConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(Board::from_config(&cfg).unwrap(), b);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_json_uses_defaults() {
        let cfg: BoardConfig = serde_json::from_str(r#"{"grid_size": 12}"#).unwrap();
        assert_eq!(cfg.grid_size, 12);
        assert_eq!(cfg.start, Point::new(2, 2));
        assert_eq!(cfg.step_delay_ms, DEFAULT_STEP_DELAY_MS);
        assert_eq!(
            Board::from_config(&cfg),
            Err(ConfigError::OutOfBounds {
                role: "end",
                point: Point::new(17, 17),
                size: 12
            })
        );

        let cfg: BoardConfig =
            serde_json::from_str(r#"{"grid_size": 12, "end": {"x": 11, "y": 11}}"#).unwrap();
        let b = Board::from_config(&cfg).unwrap();
        assert_eq!((b.start(), b.end()), (Point::new(2, 2), Point::new(11, 11)));
    }
}
