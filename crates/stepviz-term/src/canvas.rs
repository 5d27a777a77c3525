//! An off-screen character buffer and the diff sent to the terminal.

use stepviz_core::{Point, Range};

use crate::style::Style;

/// A styled character.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Glyph {
    pub ch: char,
    pub style: Style,
}

impl Glyph {
    #[inline]
    pub const fn new(ch: char, style: Style) -> Self {
        Self { ch, style }
    }
}

impl Default for Glyph {
    #[inline]
    fn default() -> Self {
        Self {
            ch: ' ',
            style: Style::default(),
        }
    }
}

/// A full screen of glyphs, drawn into before each present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    bounds: Range,
    cells: Vec<Glyph>,
}

impl Canvas {
    pub fn new(width: i32, height: i32) -> Self {
        let bounds = Range::new(0, 0, width.max(0), height.max(0));
        Self {
            bounds,
            cells: vec![Glyph::default(); bounds.len()],
        }
    }

    #[inline]
    pub fn bounds(&self) -> Range {
        self.bounds
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.bounds.width()
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.bounds.height()
    }

    /// Glyph at `p`, or a blank one outside the canvas.
    pub fn at(&self, p: Point) -> Glyph {
        self.bounds
            .index(p)
            .map(|i| self.cells[i])
            .unwrap_or_default()
    }

    /// Writes are clipped to the canvas.
    pub fn set(&mut self, p: Point, g: Glyph) {
        if let Some(i) = self.bounds.index(p) {
            self.cells[i] = g;
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(Glyph::default());
    }

    /// Writes `text` left to right from `p`, returning the column after the
    /// last character.
    pub fn text(&mut self, p: Point, text: &str, style: Style) -> i32 {
        let mut x = p.x;
        for ch in text.chars() {
            self.set(Point::new(x, p.y), Glyph::new(ch, style));
            x += 1;
        }
        x
    }

    /// The characters of row `y`, trailing blanks trimmed.
    pub fn row_text(&self, y: i32) -> String {
        let s: String = (0..self.width())
            .map(|x| self.at(Point::new(x, y)).ch)
            .collect();
        s.trim_end().to_string()
    }
}

/// A single glyph that changed between two canvases.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameCell {
    pub pos: Point,
    pub glyph: Glyph,
}

/// The glyphs to repaint, in row-major order.
#[derive(Clone, Debug, Default)]
pub struct Frame {
    pub cells: Vec<FrameCell>,
    pub width: i32,
    pub height: i32,
}

impl Frame {
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Cells of `curr` that differ from `prev`. A size change repaints
/// everything.
pub fn compute_frame(prev: &Canvas, curr: &Canvas) -> Frame {
    let bounds = curr.bounds();
    let full = prev.bounds() != bounds;
    let mut cells = Vec::new();
    for p in bounds.iter() {
        let cc = curr.at(p);
        if full || prev.at(p) != cc {
            cells.push(FrameCell { pos: p, glyph: cc });
        }
    }
    Frame {
        cells,
        width: bounds.width(),
        height: bounds.height(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::palette;

    #[test]
    fn writes_are_clipped() {
        let mut c = Canvas::new(4, 2);
        c.set(Point::new(9, 9), Glyph::new('x', Style::default()));
        let end = c.text(Point::new(2, 1), "abc", Style::default());
        assert_eq!(end, 5);
        assert_eq!(c.row_text(1), "  ab");
        assert_eq!(c.at(Point::new(-1, 0)), Glyph::default());
    }

    #[test]
    fn frame_holds_only_changes() {
        let prev = Canvas::new(3, 3);
        let mut curr = prev.clone();
        curr.set(Point::new(1, 1), Glyph::new('#', palette::WALL));
        let f = compute_frame(&prev, &curr);
        assert_eq!(f.cells.len(), 1);
        assert_eq!(f.cells[0].pos, Point::new(1, 1));
        assert!(compute_frame(&curr, &curr).is_empty());
    }

    #[test]
    fn resize_repaints_everything() {
        let prev = Canvas::new(2, 2);
        let curr = Canvas::new(3, 2);
        assert_eq!(compute_frame(&prev, &curr).cells.len(), 6);
    }
}
