use crate::document::Range;
use crate::parser::ParsedDocument;

/// A declaration that a later declaration of the same alias in the same
/// format replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasWarning {
    pub range: Range,
    pub message: String,
}

pub fn duplicate_alias_warnings(document: &ParsedDocument) -> Vec<AliasWarning> {
    let mut warnings = Vec::new();
    for section in &document.sections {
        for shadowed in &section.redeclarations {
            let Some(winner) = section.declaration(&shadowed.name) else {
                continue;
            };
            warnings.push(AliasWarning {
                range: shadowed.name_range,
                message: format!(
                    "'{}' is declared again in format '{}' on line {}; this declaration is ignored",
                    shadowed.name,
                    section.name,
                    winner.name_range.start.line + 1
                ),
            });
        }
    }
    warnings
}
