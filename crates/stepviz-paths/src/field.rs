use stepviz_core::{Point, Range};

/// Sentinel for a score that is not known yet ("infinite").
pub const UNKNOWN: i32 = i32::MAX;

/// Search state of one grid position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub pos: Point,
    /// Cost of the best known path from the start, or [`UNKNOWN`].
    pub g: i32,
    /// Heuristic estimate of the remaining cost to the goal.
    pub h: i32,
    /// `g + h`, or [`UNKNOWN`] while `g` is.
    pub f: i32,
    /// The cell the best known path arrives from.
    pub parent: Option<Point>,
    /// Finalized: removed from the frontier, never re-scored.
    pub visited: bool,
    /// Part of the reconstructed path.
    pub on_path: bool,
}

impl Cell {
    pub fn new(pos: Point) -> Self {
        Self {
            pos,
            g: UNKNOWN,
            h: 0,
            f: UNKNOWN,
            parent: None,
            visited: false,
            on_path: false,
        }
    }

    #[inline]
    pub fn g_score(&self) -> Option<i32> {
        (self.g != UNKNOWN).then_some(self.g)
    }

    #[inline]
    pub fn f_score(&self) -> Option<i32> {
        (self.f != UNKNOWN).then_some(self.f)
    }
}

/// Row-major storage of every [`Cell`] of a square grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    range: Range,
    cells: Vec<Cell>,
}

impl Field {
    /// A fresh `size × size` field with every score unknown.
    pub fn new(size: i32) -> Self {
        let range = Range::square(size);
        Self {
            range,
            cells: range.iter().map(Cell::new).collect(),
        }
    }

    #[inline]
    pub fn range(&self) -> Range {
        self.range
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn index(&self, p: Point) -> Option<usize> {
        self.range.index(p)
    }

    pub fn get(&self, p: Point) -> Option<&Cell> {
        self.index(p).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, p: Point) -> Option<&mut Cell> {
        self.index(p).map(|i| &mut self.cells[i])
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub(crate) fn at(&self, idx: usize) -> &Cell {
        &self.cells[idx]
    }

    pub(crate) fn at_mut(&mut self, idx: usize) -> &mut Cell {
        &mut self.cells[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_field_is_unscored() {
        let f = Field::new(5);
        assert_eq!(f.len(), 25);
        assert!(f.cells().iter().all(|c| c.g_score().is_none() && !c.visited));
        assert_eq!(f.get(Point::new(3, 1)).map(|c| c.pos), Some(Point::new(3, 1)));
        assert!(f.get(Point::new(5, 0)).is_none());
    }

    #[test]
    fn scores_expose_sentinel_as_none() {
        let mut c = Cell::new(Point::ZERO);
        assert_eq!(c.f_score(), None);
        c.g = 3;
        c.h = 4;
        c.f = 7;
        assert_eq!(c.g_score(), Some(3));
        assert_eq!(c.f_score(), Some(7));
    }
}
