use crate::document::Range;
use indexmap::IndexMap;
use serde::Serialize;

/// Alias names are stored upper-cased; DDS keywords and names are case-insensitive.
pub type AliasName = String;

/// The defining occurrence of an alias: `FLDNAME ... ALIAS(VALUE)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AliasDeclaration {
    pub name: AliasName,
    pub name_range: Range,
    /// Absent when the value text could not be found again in the raw line.
    pub value_range: Option<Range>,
    /// Upper-cased `ALIAS(...)` value.
    pub alias: Option<AliasName>,
}

impl AliasDeclaration {
    /// Location a usage jumps to.
    pub fn target(&self) -> Range {
        self.name_range
    }

    pub fn contains(&self, position: crate::document::Position) -> bool {
        self.name_range.contains(position)
            || self
                .value_range
                .is_some_and(|range| range.contains(position))
    }
}

/// A `DSPATR(&NAME)` reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AliasUsage {
    pub name: AliasName,
    /// The name without its `&` sigil.
    pub range: Range,
    pub range_with_sigil: Range,
}

impl AliasUsage {
    /// Location a declaration jumps to; includes the sigil.
    pub fn target(&self) -> Range {
        self.range_with_sigil
    }

    pub fn contains(&self, position: crate::document::Position) -> bool {
        self.range_with_sigil.contains(position) || self.range.contains(position)
    }
}

/// One record format (`R` specification) and the aliases it declares and uses.
///
/// Both maps iterate in insertion order. A later declaration of the same name
/// replaces the earlier one in `declarations`, which is moved to
/// `redeclarations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatSection {
    pub name: String,
    pub start_line: usize,
    pub end_line: usize,
    pub declarations: IndexMap<AliasName, AliasDeclaration>,
    pub usages: IndexMap<AliasName, Vec<AliasUsage>>,
    pub redeclarations: Vec<AliasDeclaration>,
}

impl FormatSection {
    pub fn new(name: String, start_line: usize, end_line: usize) -> Self {
        Self {
            name,
            start_line,
            end_line,
            declarations: IndexMap::new(),
            usages: IndexMap::new(),
            redeclarations: Vec::new(),
        }
    }

    pub fn contains_line(&self, line: usize) -> bool {
        self.start_line <= line && line <= self.end_line
    }

    pub fn declaration(&self, name: &str) -> Option<&AliasDeclaration> {
        self.declarations.get(name)
    }

    /// Usages of `name` in document order; empty when there are none.
    pub fn usages_of(&self, name: &str) -> &[AliasUsage] {
        self.usages.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn declare(&mut self, declaration: AliasDeclaration) {
        if let Some(previous) = self
            .declarations
            .insert(declaration.name.clone(), declaration)
        {
            self.redeclarations.push(previous);
        }
    }

    pub fn add_usage(&mut self, usage: AliasUsage) {
        self.usages.entry(usage.name.clone()).or_default().push(usage);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Position;

    fn declaration(name: &str, line: usize) -> AliasDeclaration {
        AliasDeclaration {
            name: name.to_string(),
            name_range: Range::on_line(line, 8, 8 + name.len()),
            value_range: None,
            alias: None,
        }
    }

    #[test]
    fn redeclaration_replaces_and_keeps_shadowed_entry() {
        let mut section = FormatSection::new("FMT".into(), 0, 10);
        section.declare(declaration("FLD", 2));
        section.declare(declaration("FLD", 5));

        assert_eq!(section.declarations.len(), 1);
        assert_eq!(section.declaration("FLD").unwrap().name_range.start.line, 5);
        assert_eq!(section.redeclarations.len(), 1);
        assert_eq!(section.redeclarations[0].name_range.start.line, 2);
    }

    #[test]
    fn usages_accumulate_in_order() {
        let mut section = FormatSection::new("FMT".into(), 0, 10);
        for line in [3, 1, 7] {
            section.add_usage(AliasUsage {
                name: "HIGH".into(),
                range: Range::on_line(line, 5, 9),
                range_with_sigil: Range::on_line(line, 4, 9),
            });
        }
        let lines: Vec<usize> = section
            .usages_of("HIGH")
            .iter()
            .map(|usage| usage.range.start.line)
            .collect();
        assert_eq!(lines, vec![3, 1, 7]);
        assert!(section.usages_of("LOW").is_empty());
    }

    #[test]
    fn usage_contains_sigil_and_name() {
        let usage = AliasUsage {
            name: "HIGH".into(),
            range: Range::on_line(0, 38, 42),
            range_with_sigil: Range::on_line(0, 37, 42),
        };
        assert!(usage.contains(Position::new(0, 37)));
        assert!(usage.contains(Position::new(0, 41)));
        assert!(!usage.contains(Position::new(0, 42)));
    }

    #[test]
    fn section_line_bounds_are_inclusive() {
        let section = FormatSection::new("FMT".into(), 4, 9);
        assert!(!section.contains_line(3));
        assert!(section.contains_line(4));
        assert!(section.contains_line(9));
        assert!(!section.contains_line(10));
    }
}
