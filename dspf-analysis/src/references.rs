use crate::document::{Position, Range};
use crate::go_to_definition::{
    alias_at_position, declaration_for_usage, usages_for_declaration, AliasHit,
};
use crate::parser::ParsedDocument;
use crate::symbols::AliasUsage;

/// Every usage of the alias under `position`, optionally preceded by its declaration.
pub fn find_references(
    document: &ParsedDocument,
    position: Position,
    include_declaration: bool,
) -> Vec<Range> {
    let Some(section) = document.section_at_line(position.line) else {
        return Vec::new();
    };
    let declaration = match alias_at_position(section, position) {
        Some(AliasHit::Declaration(declaration)) => Some(declaration),
        Some(AliasHit::Usage(usage)) => match declaration_for_usage(section, usage) {
            Some(declaration) => Some(declaration),
            None => {
                return usage_targets(section.usages_of(&usage.name));
            }
        },
        None => None,
    };
    let Some(declaration) = declaration else {
        return Vec::new();
    };

    let mut ranges = Vec::new();
    if include_declaration {
        ranges.push(declaration.target());
    }
    ranges.extend(usage_targets(usages_for_declaration(section, declaration)));
    ranges
}

fn usage_targets<'a>(usages: impl IntoIterator<Item = &'a AliasUsage>) -> Vec<Range> {
    usages.into_iter().map(AliasUsage::target).collect()
}
