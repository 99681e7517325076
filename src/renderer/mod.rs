pub mod zone;

use crate::host::FontHandle;
use crate::layout::Rect;
use crate::time_utils::Period;

/// The screen is monochrome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
}

impl Color {
    pub fn rgba(self) -> [u8; 4] {
        match self {
            Color::Black => [0x00, 0x00, 0x00, 0xFF],
            Color::White => [0xFF, 0xFF, 0xFF, 0xFF],
        }
    }

    pub fn inverse(self) -> Self {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextOverflow {
    /// Replace the tail with "..." so the text fits.
    TrailingEllipsis,
}

/// Background/foreground pair for a period of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorScheme {
    pub background: Color,
    pub text: Color,
}

impl ColorScheme {
    pub fn for_period(period: Period) -> Self {
        let background = match period {
            Period::Night => Color::Black,
            Period::Day => Color::White,
        };
        Self { background, text: background.inverse() }
    }
}

/// Thin font for labels, thick font for the time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontPair {
    pub thin: FontHandle,
    pub thick: FontHandle,
}

/// One instruction for the host drawing surface.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    FillRect {
        rect: Rect,
        color: Color,
    },
    Text {
        rect: Rect,
        text: String,
        font: FontHandle,
        align: TextAlign,
        overflow: TextOverflow,
        color: Color,
    },
}
