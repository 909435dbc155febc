//! Terminal styling for rendered output
//!
//! Every styled token is wrapped as `ESC[<code>m<text>ESC[0m`, so a single
//! pattern ([`ANSI_PATTERN`]) removes all styling from any output.

use colored::Color;
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// Pattern matching every escape sequence this crate emits
pub const ANSI_PATTERN: &str = "\x1b\\[[0-9;]*m";

static ANSI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(ANSI_PATTERN).expect("ANSI pattern is a valid regex"));

/// Fixed colour table
pub struct Palette;

impl Palette {
    pub const GREEN: Color = Color::TrueColor { r: 120, g: 180, b: 1 };
    pub const RED: Color = Color::TrueColor { r: 255, g: 0, b: 0 };
    pub const BLUE: Color = Color::TrueColor { r: 10, g: 130, b: 160 };
    pub const YELLOW: Color = Color::TrueColor { r: 200, g: 154, b: 10 };
    pub const PINK: Color = Color::TrueColor { r: 180, g: 0, b: 90 };
    pub const CYAN: Color = Color::TrueColor { r: 50, g: 180, b: 190 };
    pub const GRAY: Color = Color::TrueColor { r: 128, g: 128, b: 128 };
    pub const PURPLE: Color = Color::TrueColor { r: 155, g: 0, b: 155 };
}

/// Token categories that receive a colour when styling is enabled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Str,
    Number,
    Boolean,
    Key,
    Null,
    Undefined,
    Circular,
    Pattern,
    Function,
    /// Alternating non-object `%args%` entries
    Label,
    /// Whole fatal line
    Fatal,
}

impl Category {
    pub fn color(self) -> Color {
        match self {
            Category::Str => Palette::GREEN,
            Category::Number => Palette::BLUE,
            Category::Boolean | Category::Pattern => Palette::PURPLE,
            Category::Key | Category::Label => Palette::YELLOW,
            Category::Null => Palette::PINK,
            Category::Undefined => Palette::GRAY,
            Category::Circular | Category::Function => Palette::CYAN,
            Category::Fatal => Palette::RED,
        }
    }
}

/// Wrap `text` in the escape sequence for `color` when `enabled`.
///
/// Uses the colour's code directly rather than `colored`'s `Colorize`,
/// whose output depends on the environment and the terminal.
pub fn paint(text: &str, color: Option<Color>, enabled: bool) -> String {
    match color {
        Some(color) if enabled => format!("\x1b[{}m{}\x1b[0m", color.to_fg_str(), text),
        _ => text.to_string(),
    }
}

/// Paint a token of the given category
#[inline]
pub fn paint_as(text: &str, category: Category, enabled: bool) -> String {
    paint(text, Some(category.color()), enabled)
}

/// Remove every escape sequence matching [`ANSI_PATTERN`]
pub fn strip_ansi(text: &str) -> Cow<'_, str> {
    ANSI_RE.replace_all(text, "")
}

/// Whether `text` contains any escape byte
pub fn has_escape(text: &str) -> bool {
    text.contains('\x1b')
}
