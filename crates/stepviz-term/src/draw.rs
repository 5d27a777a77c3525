//! Drawing routines that turn snapshots into glyphs on a [`Canvas`].
//!
//! Every routine draws inside the area it is given and leaves the rest of
//! the canvas alone.

use std::collections::BTreeSet;

use stepviz_algos::{
    AnnealSnapshot, ArraySnapshot, CurveSnapshot, DOMAIN, KMeansSnapshot, Mark, Objective,
    PopulationSnapshot, Vec2,
};
use stepviz_core::{Point, Range};
use stepviz_paths::{GridSnapshot, UNKNOWN};

use crate::canvas::{Canvas, Glyph};
use crate::style::{AttrMask, Style, palette};

/// Vertical range used when plotting objective values.
pub const PLOT_Y: (f64, f64) = (-10.0, 30.0);

/// Draws the grid with its top-left corner at `origin`. Each grid cell
/// takes two columns so that cells come out roughly square.
pub fn draw_grid(c: &mut Canvas, origin: Point, snap: &GridSnapshot) {
    let walls: BTreeSet<Point> = snap.walls.iter().copied().collect();
    for cell in &snap.cells {
        let p = cell.pos;
        let (ch, style) = if p == snap.start {
            ('S', palette::START)
        } else if p == snap.end {
            ('E', palette::END)
        } else if walls.contains(&p) {
            ('█', palette::WALL)
        } else if cell.on_path {
            ('●', palette::PATH)
        } else if cell.visited {
            ('░', palette::VISITED)
        } else if cell.g != UNKNOWN {
            ('○', palette::OPEN)
        } else {
            ('·', palette::FLOOR)
        };
        let at = Point::new(origin.x + 2 * p.x, origin.y + p.y);
        c.set(at, Glyph::new(ch, style));
        let second = if ch == '█' || ch == '░' { ch } else { ' ' };
        c.set(at.shift(1, 0), Glyph::new(second, style));
    }
}

fn mark_style(m: Mark) -> Style {
    match m {
        Mark::Idle => palette::BAR,
        Mark::Compare => palette::COMPARE,
        Mark::Swap => palette::SWAP,
        Mark::Pivot => palette::PIVOT,
        Mark::Sorted | Mark::Found => palette::SORTED,
        Mark::Discarded => palette::DISCARDED,
    }
}

/// Draws the array as vertical bars rising from the bottom of `area`.
pub fn draw_bars(c: &mut Canvas, area: Range, snap: &ArraySnapshot) {
    let n = snap.values.len() as i32;
    if n == 0 || area.is_empty() {
        return;
    }
    let bar_w = (area.width() / n).max(1);
    let top = snap.values.iter().copied().max().unwrap_or(0).max(1) as i64;
    let h = area.height() as i64;
    for (i, (&v, &m)) in snap.values.iter().zip(&snap.marks).enumerate() {
        let v = v.max(0) as i64;
        let rows = ((v * h + top - 1) / top) as i32;
        let style = mark_style(m);
        let x0 = area.min.x + i as i32 * bar_w;
        for dx in 0..(bar_w - 1).max(1) {
            for dy in 0..rows {
                c.set(
                    Point::new(x0 + dx, area.max.y - 1 - dy),
                    Glyph::new('█', style),
                );
            }
        }
    }
}

/// Maps plot coordinates onto a canvas area.
#[derive(Debug, Clone, Copy)]
struct Plot {
    area: Range,
    x: (f64, f64),
    y: (f64, f64),
}

impl Plot {
    fn objective(area: Range) -> Self {
        Self {
            area,
            x: DOMAIN,
            y: PLOT_Y,
        }
    }

    fn to_cell(self, x: f64, y: f64) -> Option<Point> {
        let w = (self.area.width() - 1).max(1) as f64;
        let h = (self.area.height() - 1).max(1) as f64;
        let fx = (x - self.x.0) / (self.x.1 - self.x.0);
        let fy = (y - self.y.0) / (self.y.1 - self.y.0);
        if !(0.0..=1.0).contains(&fx) || !(0.0..=1.0).contains(&fy) {
            return None;
        }
        let px = self.area.min.x + (fx * w).round() as i32;
        let py = self.area.max.y - 1 - (fy * h).round() as i32;
        Some(Point::new(px, py))
    }

    fn put(self, c: &mut Canvas, x: f64, y: f64, g: Glyph) {
        if let Some(p) = self.to_cell(x, y) {
            c.set(p, g);
        }
    }

    fn axes(self, c: &mut Canvas) {
        let a = self.area;
        for y in a.min.y..a.max.y {
            c.set(Point::new(a.min.x, y), Glyph::new('│', palette::AXIS));
        }
        for x in a.min.x..a.max.x {
            c.set(Point::new(x, a.max.y - 1), Glyph::new('─', palette::AXIS));
        }
        c.set(Point::new(a.min.x, a.max.y - 1), Glyph::new('└', palette::AXIS));
    }

    fn curve(self, c: &mut Canvas, f: Objective) {
        let w = self.area.width().max(1);
        for col in 0..w {
            let x = self.x.0 + (self.x.1 - self.x.0) * col as f64 / (w - 1).max(1) as f64;
            self.put(c, x, f.eval(x), Glyph::new('·', palette::CURVE));
        }
    }
}

/// Objective curve with the climber's trail, position and best point.
pub fn draw_curve(c: &mut Canvas, area: Range, snap: &CurveSnapshot) {
    let plot = Plot::objective(area);
    plot.axes(c);
    plot.curve(c, snap.objective);
    for s in &snap.trail {
        plot.put(c, s.x, s.y, Glyph::new('•', palette::TRAIL));
    }
    plot.put(c, snap.best.x, snap.best.y, Glyph::new('*', palette::BEST));
    plot.put(c, snap.current.x, snap.current.y, Glyph::new('◆', palette::CURRENT));
}

/// Like [`draw_curve`], with rejected trials dimmed and the last proposal
/// shown.
pub fn draw_anneal(c: &mut Canvas, area: Range, snap: &AnnealSnapshot) {
    let plot = Plot::objective(area);
    plot.axes(c);
    plot.curve(c, snap.objective);
    for t in &snap.trail {
        let style = if t.accepted {
            palette::TRAIL
        } else {
            palette::REJECTED
        };
        plot.put(c, t.at.x, t.at.y, Glyph::new('•', style));
    }
    if let Some(p) = snap.proposal {
        plot.put(c, p.x, p.y, Glyph::new('?', palette::REJECTED));
    }
    plot.put(c, snap.best.x, snap.best.y, Glyph::new('*', palette::BEST));
    plot.put(c, snap.current.x, snap.current.y, Glyph::new('◆', palette::CURRENT));
}

/// Objective curve with every member of a population.
pub fn draw_population(c: &mut Canvas, area: Range, snap: &PopulationSnapshot) {
    let plot = Plot::objective(area);
    plot.axes(c);
    plot.curve(c, snap.objective);
    for m in &snap.members {
        plot.put(c, m.x, m.y, Glyph::new('o', palette::TRAIL));
    }
    plot.put(c, snap.best.x, snap.best.y, Glyph::new('*', palette::BEST));
}

fn bounds_of(points: &[Vec2]) -> ((f64, f64), (f64, f64)) {
    let mut x = (f64::INFINITY, f64::NEG_INFINITY);
    let mut y = (f64::INFINITY, f64::NEG_INFINITY);
    for p in points {
        x = (x.0.min(p.x), x.1.max(p.x));
        y = (y.0.min(p.y), y.1.max(p.y));
    }
    let pad = |r: (f64, f64)| {
        if r.0.is_finite() && r.1 > r.0 {
            let m = (r.1 - r.0) * 0.05;
            (r.0 - m, r.1 + m)
        } else if r.0.is_finite() {
            (r.0 - 1.0, r.0 + 1.0)
        } else {
            (0.0, 1.0)
        }
    };
    (pad(x), pad(y))
}

/// Points coloured by cluster, with each centroid drawn as `X`.
pub fn draw_clusters(c: &mut Canvas, area: Range, snap: &KMeansSnapshot) {
    let (x, y) = bounds_of(&snap.points);
    let plot = Plot { area, x, y };
    plot.axes(c);
    let color = |k: usize| palette::CLUSTERS[k % palette::CLUSTERS.len()];
    for (p, a) in snap.points.iter().zip(&snap.assignments) {
        let g = match a {
            Some(k) => Glyph::new('o', Style::fg(color(*k))),
            None => Glyph::new('o', palette::FLOOR),
        };
        plot.put(c, p.x, p.y, g);
    }
    for (k, m) in snap.centroids.iter().enumerate() {
        let style = Style::fg(color(k)).with_attrs(AttrMask::BOLD | AttrMask::REVERSE);
        plot.put(c, m.x, m.y, Glyph::new('X', style));
    }
}

/// A horizontal gauge filled to `ratio` (clamped to `0..=1`).
pub fn draw_gauge(c: &mut Canvas, at: Point, width: i32, ratio: f64) {
    let filled = (ratio.clamp(0.0, 1.0) * width as f64).round() as i32;
    for i in 0..width {
        let (ch, style) = if i < filled {
            ('█', palette::SWAP)
        } else {
            ('░', palette::FLOOR)
        };
        c.set(at.shift(i, 0), Glyph::new(ch, style));
    }
}

/// Clears row `y` and writes `text` on it.
pub fn draw_status(c: &mut Canvas, y: i32, text: &str) {
    for x in 0..c.width() {
        c.set(Point::new(x, y), Glyph::default());
    }
    c.text(Point::new(0, y), text, palette::STATUS);
}
