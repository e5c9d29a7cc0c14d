//! Table-driven JSON string escaping.
//!
//! The [`EscapeTable`] maps every 8-bit character code to its JSON replacement,
//! or to nothing when the character may be emitted verbatim. It is built once,
//! on first use, and shared read-only afterwards.
//!
//! | Input | Output |
//! |-------|--------|
//! | `"` | `\"` |
//! | `\` | `\\` |
//! | newline | `\n` |
//! | carriage return | `\r` |
//! | tab | `\t` |
//! | backspace | `\b` |
//! | form feed | `\f` |
//! | other codes `0x00..=0x1F`, `0x7F..=0xFF` | `\u00XX` |
//! | code points `>= 0x100` | `\uXXXX` per UTF-16 code unit |
//! | printable ASCII | verbatim |
//!
//! Hex digits are always uppercase. Characters outside the Basic Multilingual
//! Plane are written as a surrogate pair, so U+1F600 becomes `\uD83D\uDE00`.
//!
//! The escaper never writes the surrounding quotes; that is the caller's job.
//!
//! ## Examples
//!
//! ```rust
//! use refjson::escape_json_string;
//!
//! assert_eq!(escape_json_string("He said \"hi\"\n"), "He said \\\"hi\\\"\\n");
//! assert_eq!(escape_json_string("caf\u{e9}"), "caf\\u00E9");
//! assert_eq!(escape_json_string("plain"), "plain");
//! ```

use once_cell::sync::Lazy;
use std::borrow::Cow;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

static ESCAPE_TABLE: Lazy<EscapeTable> = Lazy::new(EscapeTable::build);

/// Replacement strings for the 256 single-byte character codes.
///
/// Slots for codes `0x00..=0x1F` and `0x7F..=0xFF` hold a `\u00XX` escape unless
/// one of the seven named escapes applies. Printable ASCII (`0x20..=0x7E`) holds
/// nothing, except for the quote and the backslash.
///
/// # Examples
///
/// ```rust
/// use refjson::EscapeTable;
///
/// let table = EscapeTable::get();
/// assert_eq!(table.replacement(b'"'), Some("\\\""));
/// assert_eq!(table.replacement(0x01), Some("\\u0001"));
/// assert_eq!(table.replacement(b'a'), None);
/// assert_eq!(table.replacement(b' '), None);
/// ```
#[derive(Debug)]
pub struct EscapeTable {
    replacements: [Option<Box<str>>; 256],
}

impl EscapeTable {
    /// Returns the process-wide table, building it on first access.
    #[inline]
    pub fn get() -> &'static EscapeTable {
        &ESCAPE_TABLE
    }

    fn build() -> Self {
        let mut replacements: [Option<Box<str>>; 256] = std::array::from_fn(|code| {
            let code = code as u8;
            if (0x20..0x7F).contains(&code) {
                None
            } else {
                Some(unicode_escape(u16::from(code)).into_boxed_str())
            }
        });

        for (code, named) in [
            (b'"', "\\\""),
            (b'\\', "\\\\"),
            (b'\n', "\\n"),
            (b'\r', "\\r"),
            (b'\t', "\\t"),
            (0x08, "\\b"),
            (0x0C, "\\f"),
        ] {
            replacements[usize::from(code)] = Some(named.into());
        }

        EscapeTable { replacements }
    }

    /// Returns the replacement for `code`, or `None` if it is emitted verbatim.
    #[inline]
    #[must_use]
    pub fn replacement(&self, code: u8) -> Option<&str> {
        self.replacements[usize::from(code)].as_deref()
    }

    /// Returns `true` if `code` has a replacement.
    #[inline]
    #[must_use]
    pub fn needs_escape(&self, code: u8) -> bool {
        self.replacements[usize::from(code)].is_some()
    }

    /// Iterates over `(code, replacement)` for every slot in ascending code order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, Option<&str>)> + '_ {
        self.replacements
            .iter()
            .enumerate()
            .map(|(code, replacement)| (code as u8, replacement.as_deref()))
    }
}

/// Formats a UTF-16 code unit as `\uXXXX` with uppercase hex digits.
fn unicode_escape(unit: u16) -> String {
    let mut out = String::with_capacity(6);
    push_unicode_escape(unit, &mut out);
    out
}

#[inline]
fn push_unicode_escape(unit: u16, buf: &mut String) {
    buf.push_str("\\u");
    for shift in [12, 8, 4, 0] {
        buf.push(char::from(HEX_DIGITS[usize::from((unit >> shift) & 0xF)]));
    }
}

/// Returns `true` if any character of `s` has to be escaped.
///
/// Every byte of a multi-byte UTF-8 sequence is `>= 0x80`, and every such
/// character is at least U+0080, which is escaped; scanning bytes is therefore
/// equivalent to scanning characters.
#[inline]
#[must_use]
pub fn needs_escaping(s: &str) -> bool {
    let table = EscapeTable::get();
    s.bytes().any(|b| table.needs_escape(b))
}

/// Appends the escaped body of `unsafe_str` to `buf`.
///
/// Text that needs no escaping is appended in a single copy.
pub fn escape_json_string_into(unsafe_str: &str, buf: &mut String) {
    if !needs_escaping(unsafe_str) {
        buf.push_str(unsafe_str);
        return;
    }
    write_escaped(unsafe_str, buf);
}

/// Like [`escape_json_string_into`], but a missing string contributes nothing.
///
/// The caller is responsible for writing the `null` token for absent strings.
///
/// # Examples
///
/// ```rust
/// use refjson::escape_optional_into;
///
/// let mut buf = String::from("x");
/// escape_optional_into(None, &mut buf);
/// escape_optional_into(Some("\t"), &mut buf);
/// assert_eq!(buf, "x\\t");
/// ```
pub fn escape_optional_into(unsafe_str: Option<&str>, buf: &mut String) {
    if let Some(s) = unsafe_str {
        escape_json_string_into(s, buf);
    }
}

/// Escapes a string so it can be placed between double quotes in JSON.
#[must_use]
pub fn escape_json_string(unsafe_str: &str) -> String {
    let mut buf = String::with_capacity(unsafe_str.len() * 2);
    escape_json_string_into(unsafe_str, &mut buf);
    buf
}

/// Escapes a string, borrowing it unchanged when nothing needs escaping.
///
/// # Examples
///
/// ```rust
/// use refjson::escape_json_cow;
/// use std::borrow::Cow;
///
/// assert!(matches!(escape_json_cow("id"), Cow::Borrowed("id")));
/// assert_eq!(escape_json_cow("a\\b"), "a\\\\b");
/// ```
#[must_use]
pub fn escape_json_cow(unsafe_str: &str) -> Cow<'_, str> {
    if needs_escaping(unsafe_str) {
        let mut buf = String::with_capacity(unsafe_str.len() * 2);
        write_escaped(unsafe_str, &mut buf);
        Cow::Owned(buf)
    } else {
        Cow::Borrowed(unsafe_str)
    }
}

fn write_escaped(s: &str, buf: &mut String) {
    let table = EscapeTable::get();
    let mut units = [0u16; 2];
    for ch in s.chars() {
        match u8::try_from(u32::from(ch)) {
            Ok(code) => match table.replacement(code) {
                Some(replacement) => buf.push_str(replacement),
                None => buf.push(ch),
            },
            Err(_) => {
                for unit in ch.encode_utf16(&mut units).iter() {
                    push_unicode_escape(*unit, buf);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_escapes() {
        let table = EscapeTable::get();
        assert_eq!(table.replacement(b'"'), Some("\\\""));
        assert_eq!(table.replacement(b'\\'), Some("\\\\"));
        assert_eq!(table.replacement(b'\n'), Some("\\n"));
        assert_eq!(table.replacement(b'\r'), Some("\\r"));
        assert_eq!(table.replacement(b'\t'), Some("\\t"));
        assert_eq!(table.replacement(0x08), Some("\\b"));
        assert_eq!(table.replacement(0x0C), Some("\\f"));
    }

    #[test]
    fn test_space_and_delete_slots() {
        let table = EscapeTable::get();
        assert_eq!(table.replacement(b' '), None);
        assert_eq!(table.replacement(0x7F), Some("\\u007F"));
        assert_eq!(table.replacement(b'~'), None);
    }

    #[test]
    fn test_high_bytes_use_unicode_escape() {
        let table = EscapeTable::get();
        assert_eq!(table.replacement(0x80), Some("\\u0080"));
        assert_eq!(table.replacement(0xFF), Some("\\u00FF"));
        assert_eq!(escape_json_string("\u{ff}"), "\\u00FF");
    }

    #[test]
    fn test_escape_scenario() {
        assert_eq!(
            escape_json_string("He said \"hi\"\n"),
            "He said \\\"hi\\\"\\n"
        );
    }

    #[test]
    fn test_empty_and_nul() {
        assert_eq!(escape_json_string(""), "");
        assert_eq!(escape_json_string("\0"), "\\u0000");
    }

    #[test]
    fn test_code_points_above_latin1() {
        assert_eq!(escape_json_string("\u{100}"), "\\u0100");
        assert_eq!(escape_json_string("\u{20AC}"), "\\u20AC");
        assert_eq!(escape_json_string("\u{FFFF}"), "\\uFFFF");
    }

    #[test]
    fn test_supplementary_plane_uses_surrogate_pair() {
        assert_eq!(escape_json_string("\u{1F600}"), "\\uD83D\\uDE00");
    }

    #[test]
    fn test_optional_none_appends_nothing() {
        let mut buf = String::new();
        escape_optional_into(None, &mut buf);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_into_appends() {
        let mut buf = String::from("\"");
        escape_json_string_into("a\"b", &mut buf);
        buf.push('"');
        assert_eq!(buf, "\"a\\\"b\"");
    }

    #[test]
    fn test_cow_fast_path_borrows() {
        assert!(matches!(escape_json_cow("hello world"), Cow::Borrowed(_)));
        assert!(matches!(escape_json_cow("tab\there"), Cow::Owned(_)));
    }

    #[test]
    fn test_reescaping_is_not_identity() {
        let once = escape_json_string("\\");
        assert_eq!(once, "\\\\");
        assert_eq!(escape_json_string(&once), "\\\\\\\\");
    }
}
