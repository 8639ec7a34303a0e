//! Single-pass display file parser
//!
//! DDS is a fixed-column format. Only three columns matter for alias
//! navigation:
//!
//! ```text
//!      A          R REMARKS
//! 0    5 6        16 17
//!      |  |        |  `-- format name starts somewhere after here
//!      |  |        `----- record designator (R opens a format)
//!      |  `-------------- comment marker (* disables the line)
//!      `----------------- specification type (A = display file)
//! ```
//!
//! Each `R` line closes the previous format and opens a new one. Inside a
//! format every logical specification line is scanned for `DSPATR(&NAME)`
//! usages and for a `FIELD ... ALIAS(VALUE)` declaration. Lines before the
//! first format contribute nothing.

use crate::document::{char_column, LineSource, Range};
use crate::normalize::normalize_line;
use crate::symbols::{AliasDeclaration, AliasUsage, FormatSection};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::trace;

/// Column holding the specification type.
pub const SPEC_TYPE_COLUMN: usize = 5;
/// Specification type of display file source.
pub const SPEC_TYPE_MARKER: char = 'A';
/// Column holding the comment marker.
pub const COMMENT_COLUMN: usize = 6;
pub const COMMENT_MARKER: char = '*';
/// Column holding the name type; `R` marks a record format.
pub const RECORD_TYPE_COLUMN: usize = 16;
pub const RECORD_MARKER: char = 'R';
/// The format name is the first token at or after this column.
pub const FORMAT_NAME_COLUMN: usize = 17;

/// Text between the start of a usage match and its `&` sigil.
const USAGE_PREFIX: &str = "DSPATR(";

// Keywords and identifiers are ASCII only: without `-u`, `(?i)` would let
// `K` match KELVIN SIGN and `S` match LONG S, and `\b` would treat accented
// letters as part of an identifier.
static USAGE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i-u)DSPATR\(&([A-Z0-9_]+)\)").unwrap());

static ALIAS_KEYWORD_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i-u)ALIAS\(").unwrap());

static DECLARATION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*A\s+((?-u:[A-Z0-9_#@])+)(?-u:\b).*?(?-u:ALIAS)\(([^)]+)\)").unwrap()
});

/// All format sections of one document snapshot, ordered by start line.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ParsedDocument {
    pub line_count: usize,
    pub sections: Vec<FormatSection>,
}

impl ParsedDocument {
    pub fn section_at_line(&self, line: usize) -> Option<&FormatSection> {
        self.sections
            .iter()
            .find(|section| section.contains_line(line))
    }
}

pub fn parse_document<S>(source: &S) -> ParsedDocument
where
    S: LineSource + ?Sized,
{
    let line_count = source.line_count();
    let last_line = line_count.saturating_sub(1);
    let mut sections: Vec<FormatSection> = Vec::new();

    for index in 0..line_count {
        let Some(raw) = source.line(index) else {
            continue;
        };
        let normalized = normalize_line(raw);

        if is_format_header(&normalized) {
            if let Some(open) = sections.last_mut() {
                open.end_line = index.saturating_sub(1);
            }
            let name = format_name(&normalized);
            trace!(line = index, format = %name, "opened format section");
            sections.push(FormatSection::new(name, index, last_line));
        }

        // The most recently opened section stays open until the next header.
        let Some(section) = sections.last_mut() else {
            continue;
        };
        if !is_logical_specification_line(&normalized) {
            continue;
        }

        collect_alias_usages(section, index, raw);
        collect_alias_declaration(section, index, raw, &normalized);
    }

    ParsedDocument {
        line_count,
        sections,
    }
}

fn column(line: &str, index: usize) -> Option<char> {
    line.chars().nth(index)
}

/// An `A` specification that is not commented out.
pub fn is_logical_specification_line(line: &str) -> bool {
    if line.chars().count() <= COMMENT_COLUMN {
        return false;
    }
    column(line, SPEC_TYPE_COLUMN) == Some(SPEC_TYPE_MARKER)
        && column(line, COMMENT_COLUMN) != Some(COMMENT_MARKER)
}

pub fn is_format_header(line: &str) -> bool {
    is_logical_specification_line(line)
        && column(line, RECORD_TYPE_COLUMN) == Some(RECORD_MARKER)
}

/// Name of the format a header line opens; empty for non-headers and
/// headers without a name.
pub fn format_name(line: &str) -> String {
    if !is_format_header(line) {
        return String::new();
    }
    let remainder: String = line.chars().skip(FORMAT_NAME_COLUMN).collect();
    remainder
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_string()
}

fn collect_alias_usages(section: &mut FormatSection, line: usize, raw: &str) {
    let prefix_width = USAGE_PREFIX.chars().count();
    for captures in USAGE_REGEX.captures_iter(raw) {
        let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        let sigil_start = char_column(raw, whole.start()) + prefix_width;
        let name_start = sigil_start + 1;
        let name_end = name_start + name.as_str().chars().count();

        let usage = AliasUsage {
            name: name.as_str().to_uppercase(),
            range: Range::on_line(line, name_start, name_end),
            range_with_sigil: Range::on_line(line, sigil_start, name_end),
        };
        trace!(line, alias = %usage.name, "recorded alias usage");
        section.add_usage(usage);
    }
}

fn collect_alias_declaration(section: &mut FormatSection, line: usize, raw: &str, normalized: &str) {
    if !ALIAS_KEYWORD_REGEX.is_match(normalized) {
        return;
    }
    let Some(captures) = DECLARATION_REGEX.captures(normalized) else {
        return;
    };
    let (Some(identifier), Some(value)) = (captures.get(1), captures.get(2)) else {
        return;
    };
    let identifier = identifier.as_str();
    let value = value.as_str();

    let Some(name_byte) = raw.find(identifier) else {
        return;
    };
    let name_start = char_column(raw, name_byte);
    let name_end = name_start + identifier.chars().count();

    // Search after the identifier so a value that repeats the field name
    // does not land on the name itself.
    let name_end_byte = name_byte + identifier.len();
    let value_range = raw[name_end_byte..].find(value).map(|offset| {
        let value_start = char_column(raw, name_end_byte + offset);
        Range::on_line(line, value_start, value_start + value.chars().count())
    });

    let alias = value.trim();
    let declaration = AliasDeclaration {
        name: identifier.to_uppercase(),
        name_range: Range::on_line(line, name_start, name_end),
        value_range,
        alias: (!alias.is_empty()).then(|| alias.to_uppercase()),
    };
    trace!(line, alias = %declaration.name, "recorded alias declaration");
    section.declare(declaration);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::SourceText;
    use rstest::rstest;

    /// Builds a specification line with `content` starting at column 6.
    fn spec(content: &str) -> String {
        format!("     A{content}")
    }

    fn header(name: &str) -> String {
        format!("     A          R {name}")
    }

    fn parse(lines: &[String]) -> ParsedDocument {
        parse_document(lines)
    }

    #[rstest]
    #[case("     A", false)]
    #[case("     A ", true)]
    #[case("     A*  comment", false)]
    #[case("     B  FIELD", false)]
    #[case("     a  FIELD", false)]
    #[case("", false)]
    #[case("§|§  A  FIELD", true)]
    fn classifies_logical_lines(#[case] line: &str, #[case] expected: bool) {
        assert_eq!(is_logical_specification_line(&normalize_line(line)), expected);
    }

    #[rstest]
    #[case("     A          R REMARKS", true)]
    #[case("     A          R", true)]
    #[case("     A          ", false)]
    #[case("     A*         R REMARKS", false)]
    #[case("     A           R REMARKS", false)]
    fn classifies_headers(#[case] line: &str, #[case] expected: bool) {
        assert_eq!(is_format_header(line), expected);
    }

    #[test]
    fn header_at_first_line_opens_named_section() {
        let document = parse(&[header("REMARKS")]);
        assert_eq!(document.sections.len(), 1);
        let section = &document.sections[0];
        assert_eq!(section.name, "REMARKS");
        assert_eq!(section.start_line, 0);
        assert_eq!(section.end_line, 0);
    }

    #[test]
    fn header_without_name_yields_empty_name() {
        let document = parse(&["     A          R".to_string()]);
        assert_eq!(document.sections[0].name, "");
    }

    #[test]
    fn sections_close_at_next_header() {
        let lines = vec![
            "     A                                      DSPSIZ(24 80)".to_string(),
            header("FIRST"),
            spec("  FLD1          10A  B  3  2"),
            header("SECOND"),
            spec("  FLD2          10A  B  4  2"),
            String::new(),
        ];
        let document = parse(&lines);
        let bounds: Vec<(&str, usize, usize)> = document
            .sections
            .iter()
            .map(|section| (section.name.as_str(), section.start_line, section.end_line))
            .collect();
        assert_eq!(bounds, vec![("FIRST", 1, 2), ("SECOND", 3, 5)]);
        assert!(document.section_at_line(0).is_none());
        assert_eq!(document.section_at_line(4).unwrap().name, "SECOND");
    }

    #[test]
    fn lines_before_first_header_are_ignored() {
        let lines = vec![
            spec("  EARLY         10A  ALIAS(EARLY_ALIAS) DSPATR(&EARLY)"),
            header("FMT"),
        ];
        let document = parse(&lines);
        let section = &document.sections[0];
        assert!(section.declarations.is_empty());
        assert!(section.usages.is_empty());
    }

    #[test]
    fn usage_ranges_follow_match_offset() {
        let mut line = " ".repeat(30);
        line.replace_range(5..6, "A");
        line.push_str("DSPATR(&HIGH)");
        let document = parse(&[header("FMT"), line]);
        let usages = document.sections[0].usages_of("HIGH");
        assert_eq!(usages.len(), 1);
        assert_eq!(usages[0].range, Range::on_line(1, 38, 42));
        assert_eq!(usages[0].range_with_sigil, Range::on_line(1, 37, 42));
    }

    #[test]
    fn usages_are_case_insensitive_and_global() {
        let lines = vec![
            header("FMT"),
            spec("  FLD1          10A  B  3  2dspatr(&high) DSPATR(&Low)"),
            spec("                                  DSPATR(&HIGH)"),
        ];
        let document = parse(&lines);
        let section = &document.sections[0];
        assert_eq!(section.usages_of("HIGH").len(), 2);
        assert_eq!(section.usages_of("LOW").len(), 1);
        let order: Vec<usize> = section
            .usages_of("HIGH")
            .iter()
            .map(|usage| usage.range.start.line)
            .collect();
        assert_eq!(order, vec![1, 2]);
    }

    #[test]
    fn commented_lines_contribute_nothing() {
        let lines = vec![
            header("FMT"),
            "     A*  FLD1          10A  ALIAS(X) DSPATR(&FLD1)".to_string(),
        ];
        let section = &parse(&lines).sections[0];
        assert!(section.declarations.is_empty());
        assert!(section.usages.is_empty());
    }

    #[test]
    fn declaration_records_name_and_value_ranges() {
        let line = "     A  FLDNAME    10A  ALIAS(FLDALIAS1)".to_string();
        let document = parse(&[header("FMT"), line]);
        let declaration = document.sections[0].declaration("FLDNAME").unwrap();
        assert_eq!(declaration.name_range, Range::on_line(1, 8, 15));
        assert_eq!(declaration.value_range, Some(Range::on_line(1, 30, 39)));
        assert_eq!(declaration.alias.as_deref(), Some("FLDALIAS1"));
    }

    #[test]
    fn declaration_identifier_is_upper_cased() {
        let line = "     A  FldName    10A  alias(Other)".to_string();
        let document = parse(&[header("FMT"), line]);
        let declaration = document.sections[0].declaration("FLDNAME").unwrap();
        assert_eq!(declaration.name, "FLDNAME");
        assert_eq!(declaration.alias.as_deref(), Some("OTHER"));
    }

    #[test]
    fn value_search_starts_after_identifier() {
        let line = "     A  CUST       10A  ALIAS(CUST)".to_string();
        let document = parse(&[header("FMT"), line]);
        let declaration = document.sections[0].declaration("CUST").unwrap();
        assert_eq!(declaration.name_range, Range::on_line(1, 8, 12));
        assert_eq!(declaration.value_range, Some(Range::on_line(1, 30, 34)));
    }

    #[test]
    fn continuation_markers_do_not_shift_columns() {
        let line = "§|§  A  FLDNAME    10A  ALIAS(FLDALIAS1)".to_string();
        let document = parse(&[header("FMT"), line]);
        let declaration = document.sections[0].declaration("FLDNAME").unwrap();
        assert_eq!(declaration.name_range, Range::on_line(1, 8, 15));
        assert_eq!(declaration.value_range, Some(Range::on_line(1, 30, 39)));
    }

    #[test]
    fn declaration_needs_field_identifier() {
        let line = "     A                 ALIAS(LONELY)".to_string();
        let document = parse(&[header("FMT"), line]);
        assert!(document.sections[0].declarations.is_empty());
    }

    #[test]
    fn last_declaration_wins() {
        let lines = vec![
            header("FMT"),
            "     A  DUP        10A  ALIAS(FIRST)".to_string(),
            "     A  DUP        10A  ALIAS(SECOND)".to_string(),
        ];
        let section = &parse(&lines).sections[0];
        assert_eq!(section.declarations.len(), 1);
        let kept = section.declaration("DUP").unwrap();
        assert_eq!(kept.name_range.start.line, 2);
        assert_eq!(kept.alias.as_deref(), Some("SECOND"));
        assert_eq!(section.redeclarations.len(), 1);
        assert_eq!(section.redeclarations[0].name_range.start.line, 1);
    }

    #[test]
    fn usage_and_declaration_on_same_line() {
        let line = "     A  FLD        10A  ALIAS(FLD_LONG) DSPATR(&FLD)".to_string();
        let section = &parse(&[header("FMT"), line]).sections[0];
        assert!(section.declaration("FLD").is_some());
        assert_eq!(section.usages_of("FLD").len(), 1);
    }

    #[test]
    fn header_line_itself_is_scanned() {
        let line = "     A          R FMT                       DSPATR(&HDR)";
        let section = &parse(&[line.to_string()]).sections[0];
        assert_eq!(section.name, "FMT");
        assert_eq!(section.usages_of("HDR").len(), 1);
    }

    #[test]
    fn parses_source_text() {
        let text = SourceText::new("     A          R ONE\n     A  FLD        10A  ALIAS(X)\n");
        let document = parse_document(&text);
        assert_eq!(document.line_count, 3);
        assert_eq!(document.sections[0].end_line, 2);
        assert!(document.sections[0].declaration("FLD").is_some());
    }

    #[test]
    fn keywords_and_names_match_ascii_letters_only() {
        let lines = vec![
            header("FMT"),
            spec("  OUT1           1A  B  3  2DSPATR(&\u{212A}EY)"),
            spec("  OUT2           1A  B  4  2D\u{17F}PATR(&KEY)"),
            spec("  FLD2          10A  ALIA\u{17F}(X)"),
        ];
        let section = &parse(&lines).sections[0];
        assert!(section.usages.is_empty());
        assert!(section.declarations.is_empty());
    }

    #[test]
    fn identifier_stops_before_non_ascii_letter() {
        let line = "     A  FLD\u{c9}      10A  ALIAS(X)".to_string();
        let document = parse(&[header("FMT"), line]);
        let declaration = document.sections[0].declaration("FLD").unwrap();
        assert_eq!(declaration.name_range, Range::on_line(1, 8, 11));
        assert_eq!(declaration.alias.as_deref(), Some("X"));
    }
}
