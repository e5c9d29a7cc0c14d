//! Cached indentation strings.
//!
//! Indentation is emitted in chunks of at most [`MAX_CACHED_INDENT`] spaces, so
//! deep nesting costs `ceil(total / 16)` appends rather than one per space.

/// Longest indentation string held in the cache.
pub const MAX_CACHED_INDENT: usize = 16;

const INDENT_LEVELS: [&str; MAX_CACHED_INDENT + 1] = [
    "",
    " ",
    "  ",
    "   ",
    "    ",
    "     ",
    "      ",
    "       ",
    "        ",
    "         ",
    "          ",
    "           ",
    "            ",
    "             ",
    "              ",
    "               ",
    "                ",
];

/// Returns the cached string of `n` spaces, for `n <= MAX_CACHED_INDENT`.
#[inline]
#[must_use]
pub fn cached_indent(n: usize) -> Option<&'static str> {
    INDENT_LEVELS.get(n).copied()
}

/// Appends `depth * indent_width` spaces to `buf`.
///
/// The product saturates at `usize::MAX`; a total that large cannot be
/// allocated and aborts like any other oversized `String`.
///
/// # Examples
///
/// ```rust
/// use refjson::append_indent;
///
/// let mut buf = String::new();
/// append_indent(3, 2, &mut buf);
/// assert_eq!(buf, "      ");
/// ```
pub fn append_indent(depth: usize, indent_width: usize, buf: &mut String) {
    let mut remaining = indent_total(depth, indent_width);
    while remaining > 0 {
        let n = remaining.min(MAX_CACHED_INDENT);
        buf.push_str(INDENT_LEVELS[n]);
        remaining -= n;
    }
}

/// Returns `depth * indent_width` spaces as a new string.
#[must_use]
pub fn indent_string(depth: usize, indent_width: usize) -> String {
    let mut buf = String::with_capacity(indent_total(depth, indent_width));
    append_indent(depth, indent_width, &mut buf);
    buf
}

#[inline]
fn indent_total(depth: usize, indent_width: usize) -> usize {
    depth.saturating_mul(indent_width)
}
