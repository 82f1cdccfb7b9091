//! Rendering of traced error chains.
//!
//! The full layout, one item per line:
//!
//! ```text
//! <message>
//!  --- at <file>:<line> (<function>) ---
//! Caused by: <cause message>
//!  --- at <file>:<line> (<function>) ---
//! Caused by: <foreign error>
//! ```
//!
//! A traced layer with an empty message contributes only its frame line, so
//! pass-through propagations stack their frames under the last message.
//! [`FormatMode::Brief`] drops every frame line and keeps the rest.

use std::fmt::{self, Write};
use std::sync::atomic::{AtomicU8, Ordering};

use crate::cause::Cause;
use crate::frame::Frame;
use crate::record::TracedError;

/// How much detail a rendered chain carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[repr(u8)]
pub enum FormatMode {
    /// Every message, every `Caused by:` line, every frame line.
    #[default]
    Full = 0,
    /// Messages and `Caused by:` lines, no frame lines.
    Brief = 1,
}

impl FormatMode {
    /// Lowercase name, as accepted by `FromStr`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Brief => "brief",
        }
    }

    const fn shows_frames(self) -> bool {
        matches!(self, Self::Full)
    }

    const fn from_repr(raw: u8) -> Self {
        match raw {
            1 => Self::Brief,
            _ => Self::Full,
        }
    }
}

impl fmt::Display for FormatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Process-wide default ──────────────────────────────────────────

static DEFAULT_FORMAT: AtomicU8 = AtomicU8::new(FormatMode::Full as u8);

/// The mode used by `Display` on [`TracedError`].
///
/// [`FormatMode::Full`] until changed.
pub fn default_format() -> FormatMode {
    FormatMode::from_repr(DEFAULT_FORMAT.load(Ordering::Relaxed))
}

/// Change the mode used by `Display` on [`TracedError`].
///
/// Meant to be called once at startup; records already built render with
/// the new mode from then on.
pub fn set_default_format(mode: FormatMode) {
    DEFAULT_FORMAT.store(mode as u8, Ordering::Relaxed);
}

/// Render `err` under `mode`.
pub fn render(err: &TracedError, mode: FormatMode) -> String {
    Rendered::new(err, mode).to_string()
}

/// Render `err` under the process-wide default mode.
pub fn render_default(err: &TracedError) -> String {
    render(err, default_format())
}

/// A chain bound to an explicit format mode; see [`TracedError::display`].
#[derive(Debug, Clone, Copy)]
pub struct Rendered<'a> {
    error: &'a TracedError,
    mode: FormatMode,
}

impl<'a> Rendered<'a> {
    pub(crate) fn new(error: &'a TracedError, mode: FormatMode) -> Self {
        Self { error, mode }
    }
}

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_chain(f, self.error, self.mode)
    }
}

// ── Writer ────────────────────────────────────────────────────────

/// Tracks just enough state to join items with single newlines.
struct Lines<'w, W: Write> {
    out: &'w mut W,
    written: bool,
    at_line_start: bool,
}

impl<'w, W: Write> Lines<'w, W> {
    fn new(out: &'w mut W) -> Self {
        Self {
            out,
            written: false,
            at_line_start: true,
        }
    }

    fn text(&mut self, text: &str) -> fmt::Result {
        if text.is_empty() {
            return Ok(());
        }
        self.out.write_str(text)?;
        self.written = true;
        self.at_line_start = text.ends_with('\n');
        Ok(())
    }

    fn newline(&mut self) -> fmt::Result {
        if self.written && !self.at_line_start {
            self.out.write_char('\n')?;
            self.at_line_start = true;
        }
        Ok(())
    }

    fn frame(&mut self, frame: &Frame) -> fmt::Result {
        self.newline()?;
        write!(self.out, " --- at {frame} ---")?;
        self.written = true;
        self.at_line_start = false;
        Ok(())
    }

    fn foreign(&mut self, err: &dyn fmt::Display) -> fmt::Result {
        self.newline()?;
        write!(self.out, "Caused by: {err}")?;
        self.written = true;
        self.at_line_start = false;
        Ok(())
    }
}

pub(crate) fn write_chain<W: Write>(out: &mut W, top: &TracedError, mode: FormatMode) -> fmt::Result {
    let mut lines = Lines::new(out);
    let mut current = top;
    loop {
        lines.text(current.message())?;
        if mode.shows_frames() {
            lines.frame(current.frame())?;
        }
        match current.cause() {
            Cause::None => return Ok(()),
            Cause::Foreign(err) => return lines.foreign(err),
            Cause::Traced(next) => {
                lines.newline()?;
                if !next.message().is_empty() {
                    lines.text("Caused by: ")?;
                }
                current = &**next;
            }
        }
    }
}
