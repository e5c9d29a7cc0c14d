//! Reference-marker vocabulary.
//!
//! An object reachable from more than one place is written in full once,
//! tagged with an [`ID_KEY`] entry, and every other occurrence is replaced by a
//! reference string `"[#<id>]"`:
//!
//! ```text
//! {"shared": {"__ID": "1", "name": "n"}, "again": "[#1]"}
//! ```

use crate::escape::escape_json_string_into;

/// Key of the synthesized identifier entry in a shared object.
pub const ID_KEY: &str = "__ID";

/// Prefix of a back-reference.
pub const ID_PREFIX: &str = "[#";

/// Suffix of a back-reference.
pub const ID_SUFFIX: &str = "]";

/// Returns the back-reference string for `id`, without quotes.
///
/// # Examples
///
/// ```rust
/// use refjson::reference_marker;
///
/// assert_eq!(reference_marker("12"), "[#12]");
/// ```
#[must_use]
pub fn reference_marker(id: &str) -> String {
    let mut marker = String::with_capacity(ID_PREFIX.len() + id.len() + ID_SUFFIX.len());
    marker.push_str(ID_PREFIX);
    marker.push_str(id);
    marker.push_str(ID_SUFFIX);
    marker
}

/// Appends the back-reference for `id` to `buf` as a quoted JSON string.
pub fn write_reference(id: &str, buf: &mut String) {
    buf.push('"');
    buf.push_str(ID_PREFIX);
    escape_json_string_into(id, buf);
    buf.push_str(ID_SUFFIX);
    buf.push('"');
}

/// Returns the id inside a back-reference string, or `None` if `s` is not one.
///
/// # Examples
///
/// ```rust
/// use refjson::parse_reference;
///
/// assert_eq!(parse_reference("[#7]"), Some("7"));
/// assert_eq!(parse_reference("[7]"), None);
/// ```
#[must_use]
pub fn parse_reference(s: &str) -> Option<&str> {
    s.strip_prefix(ID_PREFIX)?.strip_suffix(ID_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_reference_quotes_and_escapes() {
        let mut buf = String::new();
        write_reference("a\"b", &mut buf);
        assert_eq!(buf, r#""[#a\"b]""#);
    }

    #[test]
    fn test_parse_reference() {
        assert_eq!(parse_reference(&reference_marker("obj-3")), Some("obj-3"));
        assert_eq!(parse_reference("[#]"), Some(""));
        assert_eq!(parse_reference("#1]"), None);
        assert_eq!(parse_reference("[#1"), None);
    }
}
