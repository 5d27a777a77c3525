//! Terminal front end for stepviz machines.
//!
//! Snapshots are drawn onto an off-screen [`Canvas`]; [`Terminal::present`]
//! diffs it against the previous one and writes only the changed glyphs
//! through crossterm.

pub mod canvas;
pub mod draw;
pub mod style;
pub mod term;

pub use canvas::{Canvas, Frame, FrameCell, Glyph, compute_frame};
pub use style::{AttrMask, Color, Style, palette};
pub use term::{Input, Terminal};
