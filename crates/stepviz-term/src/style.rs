//! Colors, attributes and the palette used by the drawing routines.

use std::ops::BitOr;

/// An RGB colour packed into a `u32` (0x00RRGGBB).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Color(pub u32);

impl Color {
    /// The terminal's own colour.
    pub const DEFAULT: Self = Self(0);

    #[inline]
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | (b as u32))
    }

    #[inline]
    pub const fn r(self) -> u8 {
        ((self.0 >> 16) & 0xFF) as u8
    }

    #[inline]
    pub const fn g(self) -> u8 {
        ((self.0 >> 8) & 0xFF) as u8
    }

    #[inline]
    pub const fn b(self) -> u8 {
        (self.0 & 0xFF) as u8
    }
}

/// Bitmask of text attributes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct AttrMask(pub u32);

impl AttrMask {
    pub const NONE: Self = Self(0);
    pub const BOLD: Self = Self(1 << 0);
    pub const REVERSE: Self = Self(1 << 1);
    pub const DIM: Self = Self(1 << 2);

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for AttrMask {
    type Output = Self;
    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Style {
    pub fg: Color,
    pub bg: Color,
    pub attrs: AttrMask,
}

impl Style {
    #[inline]
    pub const fn fg(fg: Color) -> Self {
        Self {
            fg,
            bg: Color::DEFAULT,
            attrs: AttrMask::NONE,
        }
    }

    #[inline]
    pub const fn with_bg(mut self, bg: Color) -> Self {
        self.bg = bg;
        self
    }

    #[inline]
    pub const fn with_attrs(mut self, attrs: AttrMask) -> Self {
        self.attrs = attrs;
        self
    }
}

/// Palette shared by every view.
pub mod palette {
    use super::{AttrMask, Color, Style};

    pub const WALL: Style = Style::fg(Color::from_rgb(0x70, 0x70, 0x80));
    pub const START: Style =
        Style::fg(Color::from_rgb(0x10, 0x10, 0x10)).with_bg(Color::from_rgb(0x43, 0xe9, 0x7b));
    pub const END: Style =
        Style::fg(Color::from_rgb(0x10, 0x10, 0x10)).with_bg(Color::from_rgb(0xf5, 0x57, 0x6c));
    pub const VISITED: Style = Style::fg(Color::from_rgb(0x66, 0x7e, 0xea));
    pub const OPEN: Style = Style::fg(Color::from_rgb(0x4f, 0xc3, 0xf7));
    pub const PATH: Style = Style::fg(Color::from_rgb(0xfe, 0xe1, 0x40)).with_attrs(AttrMask::BOLD);
    pub const FLOOR: Style = Style::fg(Color::from_rgb(0x3a, 0x3a, 0x46));

    pub const BAR: Style = Style::fg(Color::from_rgb(0x66, 0x7e, 0xea));
    pub const COMPARE: Style = Style::fg(Color::from_rgb(0xfe, 0xe1, 0x40));
    pub const SWAP: Style = Style::fg(Color::from_rgb(0xf5, 0x57, 0x6c));
    pub const PIVOT: Style = Style::fg(Color::from_rgb(0xc0, 0x7b, 0xff));
    pub const SORTED: Style = Style::fg(Color::from_rgb(0x43, 0xe9, 0x7b));
    pub const DISCARDED: Style = Style::fg(Color::from_rgb(0x3a, 0x3a, 0x46));

    pub const AXIS: Style = Style::fg(Color::from_rgb(0x55, 0x55, 0x60)).with_attrs(AttrMask::DIM);
    pub const CURVE: Style = Style::fg(Color::from_rgb(0x66, 0x7e, 0xea));
    pub const TRAIL: Style = Style::fg(Color::from_rgb(0x43, 0xe9, 0x7b));
    pub const REJECTED: Style = Style::fg(Color::from_rgb(0xf5, 0x57, 0x6c)).with_attrs(AttrMask::DIM);
    pub const CURRENT: Style = Style::fg(Color::from_rgb(0xf5, 0x57, 0x6c)).with_attrs(AttrMask::BOLD);
    pub const BEST: Style = Style::fg(Color::from_rgb(0xfe, 0xe1, 0x40)).with_attrs(AttrMask::BOLD);

    pub const STATUS: Style = Style::fg(Color::from_rgb(0xd0, 0xd0, 0xd8));

    /// Colours cycled through for cluster labels.
    pub const CLUSTERS: [Color; 6] = [
        Color::from_rgb(0x43, 0xe9, 0x7b),
        Color::from_rgb(0xf5, 0x57, 0x6c),
        Color::from_rgb(0x66, 0x7e, 0xea),
        Color::from_rgb(0xfe, 0xe1, 0x40),
        Color::from_rgb(0xc0, 0x7b, 0xff),
        Color::from_rgb(0x4f, 0xc3, 0xf7),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_round_trip() {
        let c = Color::from_rgb(0xAB, 0xCD, 0xEF);
        assert_eq!((c.r(), c.g(), c.b()), (0xAB, 0xCD, 0xEF));
    }

    #[test]
    fn attrs_combine() {
        let m = AttrMask::BOLD | AttrMask::DIM;
        assert!(m.contains(AttrMask::BOLD));
        assert!(!m.contains(AttrMask::REVERSE));
        assert!(AttrMask::NONE.is_empty());
        assert!(palette::PATH.attrs.contains(AttrMask::BOLD));
    }
}
