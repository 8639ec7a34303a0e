use crate::document::{LineSource, Position, Range};
use crate::parser::ParsedDocument;
use crate::symbols::{AliasDeclaration, FormatSection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DspfSymbolKind {
    Format,
    Alias,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DspfDocumentSymbol {
    pub name: String,
    pub detail: Option<String>,
    pub kind: DspfSymbolKind,
    pub range: Range,
    pub selection_range: Range,
    pub children: Vec<DspfDocumentSymbol>,
}

/// Outline of the document: one entry per record format, aliases nested below.
pub fn collect_document_symbols<S>(document: &ParsedDocument, source: &S) -> Vec<DspfDocumentSymbol>
where
    S: LineSource + ?Sized,
{
    document
        .sections
        .iter()
        .map(|section| format_symbol(section, source))
        .collect()
}

fn format_symbol<S>(section: &FormatSection, source: &S) -> DspfDocumentSymbol
where
    S: LineSource + ?Sized,
{
    let header_width = line_width(source, section.start_line);
    let range = Range::new(
        Position::new(section.start_line, 0),
        Position::new(section.end_line, line_width(source, section.end_line)),
    );
    let name = if section.name.is_empty() {
        "Record format".to_string()
    } else {
        section.name.clone()
    };
    DspfDocumentSymbol {
        name,
        detail: Some(format!("{} alias(es)", section.declarations.len())),
        kind: DspfSymbolKind::Format,
        range,
        selection_range: Range::on_line(section.start_line, 0, header_width),
        children: section.declarations.values().map(alias_symbol).collect(),
    }
}

fn alias_symbol(declaration: &AliasDeclaration) -> DspfDocumentSymbol {
    let range = match declaration.value_range {
        Some(value) => Range::new(declaration.name_range.start, value.end),
        None => declaration.name_range,
    };
    DspfDocumentSymbol {
        name: declaration.name.clone(),
        detail: declaration.alias.clone(),
        kind: DspfSymbolKind::Alias,
        range,
        selection_range: declaration.name_range,
        children: Vec::new(),
    }
}

fn line_width<S>(source: &S, line: usize) -> usize
where
    S: LineSource + ?Sized,
{
    source
        .line(line)
        .map(|text| text.chars().count())
        .unwrap_or(0)
}
