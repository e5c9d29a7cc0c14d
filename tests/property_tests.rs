//! Property-based tests for escaping and indentation.

use proptest::prelude::*;
use refjson::{append_indent, escape_json_cow, escape_json_string, needs_escaping};
use std::borrow::Cow;

proptest! {
    // Printable ASCII without quote or backslash never needs escaping
    #[test]
    fn prop_fast_path_identity(s in "[ !#-\\[\\]-~]*") {
        prop_assert!(!needs_escaping(&s));
        prop_assert_eq!(escape_json_string(&s), s.clone());
        prop_assert!(matches!(escape_json_cow(&s), Cow::Borrowed(_)));
    }

    #[test]
    fn prop_escaped_output_is_ascii_without_raw_controls(s in any::<String>()) {
        let escaped = escape_json_string(&s);
        prop_assert!(escaped.bytes().all(|b| (0x20..0x7F).contains(&b)));
    }

    #[test]
    fn prop_escape_then_parse_roundtrips(s in any::<String>()) {
        let json = format!("\"{}\"", escape_json_string(&s));
        let parsed: String = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(parsed, s);
    }

    #[test]
    fn prop_cow_matches_owned(s in any::<String>()) {
        prop_assert_eq!(escape_json_cow(&s).into_owned(), escape_json_string(&s));
    }

    #[test]
    fn prop_indent_length(depth in 0usize..64, width in 0usize..12) {
        let mut buf = String::new();
        append_indent(depth, width, &mut buf);
        prop_assert_eq!(buf.len(), depth * width);
        prop_assert!(buf.bytes().all(|b| b == b' '));
    }
}
