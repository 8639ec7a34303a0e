//! Alias cross-reference resolution at a cursor position
//!
//! A usage resolves to the declaration of the same alias in its format; a
//! declaration resolves to every usage of that alias. Usages are checked
//! first, so a point covered by both only ever answers as a usage.

use crate::document::{Position, Range};
use crate::parser::ParsedDocument;
use crate::symbols::{AliasDeclaration, AliasUsage, FormatSection};
use tracing::debug;

/// Where a position leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The position was on a usage: jump to its declaration.
    Declaration(Range),
    /// The position was on a declaration: every usage, in document order.
    Usages(Vec<Range>),
}

impl Resolution {
    pub fn into_ranges(self) -> Vec<Range> {
        match self {
            Resolution::Declaration(range) => vec![range],
            Resolution::Usages(ranges) => ranges,
        }
    }
}

/// The alias occurrence found under a position.
#[derive(Debug, Clone, Copy)]
pub enum AliasHit<'a> {
    Usage(&'a AliasUsage),
    Declaration(&'a AliasDeclaration),
}

pub fn goto_definition(document: &ParsedDocument, position: Position) -> Vec<Range> {
    resolve_at(document, position)
        .map(Resolution::into_ranges)
        .unwrap_or_default()
}

pub fn resolve_at(document: &ParsedDocument, position: Position) -> Option<Resolution> {
    let section = document.section_at_line(position.line)?;
    let resolution = match alias_at_position(section, position)? {
        AliasHit::Usage(usage) => {
            let declaration = declaration_for_usage(section, usage)?;
            Resolution::Declaration(declaration.target())
        }
        AliasHit::Declaration(declaration) => {
            let usages = usages_for_declaration(section, declaration);
            if usages.is_empty() {
                return None;
            }
            Resolution::Usages(usages.iter().map(|usage| usage.target()).collect())
        }
    };
    debug!(%position, format = %section.name, ?resolution, "resolved alias");
    Some(resolution)
}

pub fn alias_at_position(section: &FormatSection, position: Position) -> Option<AliasHit<'_>> {
    if let Some(usage) = find_usage_at(section, position) {
        return Some(AliasHit::Usage(usage));
    }
    find_declaration_at(section, position).map(AliasHit::Declaration)
}

pub fn find_usage_at(section: &FormatSection, position: Position) -> Option<&AliasUsage> {
    section
        .usages
        .values()
        .flatten()
        .find(|usage| usage.contains(position))
}

pub fn find_declaration_at(section: &FormatSection, position: Position) -> Option<&AliasDeclaration> {
    section
        .declarations
        .values()
        .find(|declaration| declaration.contains(position))
}

/// The declaration a usage refers to.
///
/// Usages normally name the field itself. A usage that names an `ALIAS`
/// value instead still resolves when no field has that name; if several
/// fields share the value, the last one in the format owns it.
pub fn declaration_for_usage<'a>(
    section: &'a FormatSection,
    usage: &AliasUsage,
) -> Option<&'a AliasDeclaration> {
    section.declaration(&usage.name).or_else(|| {
        section
            .declarations
            .values()
            .filter(|declaration| declaration.alias.as_deref() == Some(usage.name.as_str()))
            .max_by_key(|declaration| declaration.name_range.start)
    })
}

/// Every usage that resolves to `declaration`, in document order.
///
/// Exactly the usages for which [`declaration_for_usage`] answers with this
/// declaration: those naming the field, plus those naming its `ALIAS` value
/// when the value falls back to it.
pub fn usages_for_declaration<'a>(
    section: &'a FormatSection,
    declaration: &AliasDeclaration,
) -> Vec<&'a AliasUsage> {
    let mut usages: Vec<&AliasUsage> = section.usages_of(&declaration.name).iter().collect();
    let Some(alias) = declaration.alias.as_deref() else {
        return usages;
    };
    if alias == declaration.name {
        return usages;
    }
    let by_value = section.usages_of(alias).iter().filter(|usage| {
        declaration_for_usage(section, usage)
            .is_some_and(|owner| owner.name_range == declaration.name_range)
    });
    usages.extend(by_value);
    usages.sort_by_key(|usage| usage.range.start);
    usages
}
