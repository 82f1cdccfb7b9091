//! Call-site capture.
//!
//! A [`Frame`] records where a traced error was created: source file, line,
//! and a short qualified function name. Frames are resolved from the live
//! call stack with the `backtrace` crate. The walk starts at the capturing
//! function, located by address, so depth 0 always names the code that
//! called into the library.

use std::fmt;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const UNKNOWN: &str = "<unknown>";

/// Symbol prefix shared by every item of this crate.
const CRATE_PREFIX: &str = concat!(env!("CARGO_CRATE_NAME"), "::");

/// Source root of this crate as recorded in debug info.
const SOURCE_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/src");

/// The file holding every propagation entry point.
const ENTRY_SOURCE: &str = "src/propagation.rs";

/// A captured call-site location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Frame {
    file: String,
    line: u32,
    function: String,
}

impl Frame {
    /// Build a frame by hand.
    pub fn new(file: impl Into<String>, line: u32, function: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line,
            function: function.into(),
        }
    }

    /// Placeholder used when the stack cannot be resolved at the requested depth.
    pub fn unknown() -> Self {
        Self {
            file: UNKNOWN.to_owned(),
            line: 0,
            function: String::new(),
        }
    }

    /// Source path, relative to the working directory when it lies under it.
    #[inline]
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Line number, `0` for a placeholder.
    #[inline]
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Qualified function name such as `Parser::parse` or `load::{closure}`.
    ///
    /// Empty when the function could not be resolved.
    #[inline]
    pub fn function(&self) -> &str {
        &self.function
    }

    /// `true` for the [`Frame::unknown`] placeholder.
    pub fn is_unknown(&self) -> bool {
        self.line == 0 && self.file == UNKNOWN
    }

    /// Capture the frame `depth` levels above the caller of this function.
    ///
    /// Depth 0 is the function calling `capture`. Helpers that capture on
    /// behalf of their own caller pass 1, and so on. A depth past the bottom
    /// of the stack yields [`Frame::unknown`].
    ///
    /// ```
    /// use stacktrace::Frame;
    ///
    /// #[inline(never)]
    /// fn locate() -> Frame {
    ///     Frame::capture(0)
    /// }
    ///
    /// assert_eq!(locate().function(), "locate");
    /// ```
    #[inline(never)]
    pub fn capture(depth: usize) -> Self {
        let anchor: fn(usize) -> Self = Self::capture;
        resolve(anchor as usize, false, depth).unwrap_or_else(|| {
            tracing::debug!(depth, "stack frame unavailable, using placeholder");
            Self::unknown()
        })
    }

    /// Capture for a propagation entry point calling this directly.
    ///
    /// Depth counts from the entry point's caller. Falls back to `location`
    /// when depth 0 cannot be symbolized.
    #[inline(never)]
    pub(crate) fn capture_or(depth: usize, location: &'static Location<'static>) -> Self {
        let anchor: fn(usize, &'static Location<'static>) -> Self = Self::capture_or;
        if let Some(frame) = resolve(anchor as usize, true, depth) {
            return frame;
        }
        tracing::debug!(
            depth,
            file = location.file(),
            line = location.line(),
            "stack frame unavailable, using fallback location"
        );
        if depth == 0 {
            Self::from_location(location)
        } else {
            Self::unknown()
        }
    }

    fn from_location(location: &Location<'_>) -> Self {
        Self {
            file: location.file().to_owned(),
            line: location.line(),
            function: String::new(),
        }
    }

    fn from_symbol(name: Option<&str>, file: Option<&Path>, line: Option<u32>) -> Self {
        Self {
            file: file.map_or_else(|| UNKNOWN.to_owned(), display_path),
            line: line.unwrap_or(0),
            function: name.map(qualified_name).unwrap_or_default(),
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)?;
        if !self.function.is_empty() {
            write!(f, " ({})", self.function)?;
        }
        Ok(())
    }
}

// ── Stack walk ────────────────────────────────────────────────────

/// Position of the walk relative to the capturing function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scan {
    /// Unwinder and `backtrace` frames below the anchor.
    Seeking { depth: usize, entry: bool },
    /// Right above the anchor, where a propagation entry point sits unless
    /// it was inlined without debug info.
    Entry { depth: usize },
    /// In caller frames, still skipping `remaining`.
    Outside { remaining: usize },
}

impl Scan {
    const fn new(depth: usize, entry: bool) -> Self {
        Self::Seeking { depth, entry }
    }

    const fn is_seeking(self) -> bool {
        matches!(self, Self::Seeking { .. })
    }

    /// Feed a physical frame while seeking the anchor.
    fn enter(&mut self, is_anchor: bool) {
        if let Self::Seeking { depth, entry } = *self
            && is_anchor
        {
            *self = if entry {
                Self::Entry { depth }
            } else {
                Self::Outside { remaining: depth }
            };
        }
    }

    /// Feed the next logical frame above the anchor, innermost first.
    /// Returns `true` for the frame to record.
    fn advance(&mut self, ours: bool) -> bool {
        match *self {
            Self::Seeking { .. } => false,
            Self::Entry { depth } if ours => {
                *self = Self::Outside { remaining: depth };
                false
            }
            Self::Entry { depth: 0 } | Self::Outside { remaining: 0 } => true,
            Self::Entry { depth: n } | Self::Outside { remaining: n } => {
                *self = Self::Outside { remaining: n - 1 };
                false
            }
        }
    }
}

/// Walk the stack from the physical frame of the function at `anchor`.
///
/// With `entry` set, one logical frame of this crate right above the anchor
/// is skipped first.
fn resolve(anchor: usize, entry: bool, depth: usize) -> Option<Frame> {
    let mut scan = Scan::new(depth, entry);
    let mut found = None;

    backtrace::trace(|raw| {
        if scan.is_seeking() {
            scan.enter(raw.symbol_address() as usize == anchor);
            return true;
        }
        let mut symbolized = false;
        // Inlined calls resolve to several symbols, innermost first; each one
        // counts as its own logical frame.
        backtrace::resolve_frame(raw, |symbol| {
            symbolized = true;
            if found.is_some() {
                return;
            }
            let name = symbol.name().map(|name| format!("{name:#}"));
            let ours = is_own_frame(name.as_deref(), symbol.filename());
            if scan.advance(ours) {
                found = Some(Frame::from_symbol(
                    name.as_deref(),
                    symbol.filename(),
                    symbol.lineno(),
                ));
            }
        });
        if !symbolized && found.is_none() && scan.advance(false) {
            found = Some(Frame::unknown());
        }
        found.is_none()
    });

    found
}

fn working_dir() -> Option<&'static Path> {
    static WORKING_DIR: OnceLock<Option<PathBuf>> = OnceLock::new();
    WORKING_DIR
        .get_or_init(|| std::env::current_dir().ok())
        .as_deref()
}

fn display_path(path: &Path) -> String {
    working_dir()
        .and_then(|cwd| path.strip_prefix(cwd).ok())
        .unwrap_or(path)
        .display()
        .to_string()
}

// ── Symbol names ──────────────────────────────────────────────────

/// Split `s` on `::` separators that are not nested inside `<...>`.
fn split_path(s: &str) -> Vec<&str> {
    let bytes = s.as_bytes();
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'<' => depth += 1,
            // `->` inside fn-pointer types is not a closing bracket.
            b'>' if i > 0 && bytes[i - 1] == b'-' => {}
            b'>' => depth = depth.saturating_sub(1),
            b':' if depth == 0 && bytes.get(i + 1) == Some(&b':') => {
                segments.push(&s[start..i]);
                i += 2;
                start = i;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    segments.push(&s[start..]);
    segments
}

/// Index of the `>` closing the `<` at position 0.
fn closing_bracket(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'<' => depth += 1,
            b'>' if i > 0 && bytes[i - 1] == b'-' => {}
            b'>' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Find ` as ` at bracket depth 0.
fn split_as(s: &str) -> (&str, Option<&str>) {
    let bytes = s.as_bytes();
    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'<' => depth += 1,
            b'>' if i > 0 && bytes[i - 1] == b'-' => {}
            b'>' => depth = depth.saturating_sub(1),
            b' ' if depth == 0 && s[i..].starts_with(" as ") => {
                return (&s[..i], Some(&s[i + 4..]));
            }
            _ => {}
        }
    }
    (s, None)
}

/// A symbol decomposed into its owning item and the trailing path.
struct Qualified<'a> {
    self_ty: Option<&'a str>,
    trait_path: Option<&'a str>,
    rest: &'a str,
}

fn decompose(symbol: &str) -> Qualified<'_> {
    if symbol.starts_with('<')
        && let Some(close) = closing_bracket(symbol)
    {
        let (self_ty, trait_path) = split_as(&symbol[1..close]);
        let rest = symbol[close + 1..].trim_start_matches("::");
        return Qualified {
            self_ty: Some(self_ty),
            trait_path,
            rest,
        };
    }
    Qualified {
        self_ty: None,
        trait_path: None,
        rest: symbol,
    }
}

fn strip_generics(segment: &str) -> &str {
    segment.find('<').map_or(segment, |i| &segment[..i])
}

fn strip_reference(ty: &str) -> &str {
    ty.trim_start_matches('&')
        .trim_start_matches("mut ")
        .trim_start_matches("dyn ")
}

fn is_ours(path: &str) -> bool {
    let path = strip_reference(path);
    path.starts_with(CRATE_PREFIX) && !path.contains("::tests::")
}

/// Whether a demangled symbol belongs to this crate's propagation layer.
///
/// Unit-test modules are treated as application code.
fn is_internal(symbol: &str) -> bool {
    let qualified = decompose(symbol);
    match qualified.self_ty {
        Some(self_ty) => is_ours(self_ty) || qualified.trait_path.is_some_and(is_ours),
        None => is_ours(symbol),
    }
}

/// Whether a logical frame comes from this crate.
///
/// Inlined frames carry bare names such as `new_error<&str>`, so the source
/// file decides when it is known and the qualified symbol otherwise.
fn is_own_frame(name: Option<&str>, file: Option<&Path>) -> bool {
    match file {
        Some(file) => file.starts_with(SOURCE_DIR) || file.ends_with(ENTRY_SOURCE),
        None => name.is_some_and(is_internal),
    }
}

fn is_marker(segment: &str) -> bool {
    segment.starts_with('{')
}

fn normalize_marker(segment: &str) -> &str {
    if segment == "{{closure}}" {
        "{closure}"
    } else {
        segment
    }
}

fn is_type_name(segment: &str) -> bool {
    segment.chars().next().is_some_and(char::is_uppercase)
}

fn last_segment(path: &str) -> &str {
    let path = strip_reference(path);
    split_path(path)
        .into_iter()
        .rev()
        .map(strip_generics)
        .find(|segment| !segment.is_empty())
        .unwrap_or(path)
}

/// Shorten a demangled symbol to `function`, `Type::method`, or
/// `function::{closure}`.
fn qualified_name(symbol: &str) -> String {
    let qualified = decompose(symbol);
    let segments: Vec<&str> = split_path(qualified.rest)
        .into_iter()
        .filter(|segment| !segment.is_empty() && !segment.starts_with('<'))
        .map(strip_generics)
        .collect();

    let Some(fn_index) = segments.iter().rposition(|segment| !is_marker(segment)) else {
        // Only markers remain: a closure directly inside a qualified impl.
        let mut parts: Vec<&str> = qualified.self_ty.map(last_segment).into_iter().collect();
        parts.extend(segments.iter().copied().map(normalize_marker));
        return parts.join("::");
    };

    let mut parts = Vec::with_capacity(segments.len() - fn_index + 1);
    match qualified.self_ty {
        Some(self_ty) if fn_index == 0 => parts.push(last_segment(self_ty)),
        _ if fn_index > 0 && is_type_name(segments[fn_index - 1]) => {
            parts.push(segments[fn_index - 1]);
        }
        _ => {}
    }
    parts.push(segments[fn_index]);
    parts.extend(segments[fn_index + 1..].iter().copied().map(normalize_marker));
    parts.join("::")
}
