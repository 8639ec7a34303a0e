//! Continuation marker blanking
//!
//! Source members exported from some editors carry `§|§` and `£|£` glyph
//! triples where a specification wrapped onto a continuation line. They carry
//! no meaning and would break fixed-column lookups, so each triple becomes a
//! run of three blanks before any column is inspected.

use std::borrow::Cow;

const CONTINUATION_MARKERS: [&str; 2] = ["§|§", "£|£"];
const MARKER_BLANKS: &str = "   ";

/// Returns `line` with every continuation marker replaced by blanks.
///
/// The character count of the result equals the character count of the input.
pub fn normalize_line(line: &str) -> Cow<'_, str> {
    if !CONTINUATION_MARKERS
        .iter()
        .any(|marker| line.contains(marker))
    {
        return Cow::Borrowed(line);
    }

    let mut normalized = line.to_string();
    for marker in CONTINUATION_MARKERS {
        normalized = normalized.replace(marker, MARKER_BLANKS);
    }
    Cow::Owned(normalized)
}
