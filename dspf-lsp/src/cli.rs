//! Command line surface of the `dspf-lsp` binary
//!
//! Without a subcommand the binary speaks LSP on stdin/stdout. The `definition`
//! and `index` subcommands run the same analysis once over a file and print
//! JSON, which is handy for scripting and for checking what the server sees.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use dspf_analysis::document::{LineSource, Position, Range, SourceText};
use dspf_analysis::go_to_definition::{
    declaration_for_usage, resolve_at, usages_for_declaration, Resolution,
};
use dspf_analysis::parser::{parse_document, ParsedDocument};
use dspf_analysis::symbols::AliasUsage;
use serde::Serialize;
use tracing::debug;

use crate::error::CliError;

#[derive(Debug, Parser)]
#[command(name = "dspf-lsp", version, about = "Alias navigation for DDS display files")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the language server on stdin/stdout (the default)
    Serve,
    /// Resolve the alias at a zero-based LINE and COLUMN
    Definition {
        file: PathBuf,
        line: usize,
        column: usize,
    },
    /// Print the record formats with their declarations and usages
    Index { file: PathBuf },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum TargetKind {
    Declaration,
    Usages,
}

#[derive(Debug, Serialize)]
struct DefinitionOutput {
    position: Position,
    kind: Option<TargetKind>,
    targets: Vec<Range>,
}

#[derive(Debug, Serialize)]
struct DeclarationOutput<'a> {
    name: &'a str,
    alias: Option<&'a str>,
    range: Range,
    usages: Vec<Range>,
}

#[derive(Debug, Serialize)]
struct FormatOutput<'a> {
    name: &'a str,
    start_line: usize,
    end_line: usize,
    declarations: Vec<DeclarationOutput<'a>>,
    unresolved: Vec<UsageOutput<'a>>,
}

#[derive(Debug, Serialize)]
struct UsageOutput<'a> {
    name: &'a str,
    range: Range,
}

fn load(path: &Path) -> Result<(SourceText, ParsedDocument), CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let source = SourceText::new(&text);
    let document = parse_document(&source);
    debug!(path = %path.display(), formats = document.sections.len(), "loaded display file");
    Ok((source, document))
}

/// Resolves the position and renders the targets as pretty JSON.
pub fn definition_json(path: &Path, line: usize, column: usize) -> Result<String, CliError> {
    let (source, document) = load(path)?;
    if line >= source.line_count() {
        return Err(CliError::PositionOutOfRange {
            line,
            line_count: source.line_count(),
        });
    }
    let position = Position::new(line, column);
    let (kind, targets) = match resolve_at(&document, position) {
        Some(Resolution::Declaration(range)) => (Some(TargetKind::Declaration), vec![range]),
        Some(Resolution::Usages(ranges)) => (Some(TargetKind::Usages), ranges),
        None => (None, Vec::new()),
    };
    let output = DefinitionOutput {
        position,
        kind,
        targets,
    };
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Renders every format section as pretty JSON.
pub fn index_json(path: &Path) -> Result<String, CliError> {
    let (_, document) = load(path)?;
    let formats: Vec<FormatOutput<'_>> = document
        .sections
        .iter()
        .map(|section| FormatOutput {
            name: &section.name,
            start_line: section.start_line,
            end_line: section.end_line,
            declarations: section
                .declarations
                .values()
                .map(|declaration| DeclarationOutput {
                    name: &declaration.name,
                    alias: declaration.alias.as_deref(),
                    range: declaration.target(),
                    usages: usages_for_declaration(section, declaration)
                        .into_iter()
                        .map(AliasUsage::target)
                        .collect(),
                })
                .collect(),
            unresolved: section
                .usages
                .values()
                .flatten()
                .filter(|usage| declaration_for_usage(section, usage).is_none())
                .map(|usage| UsageOutput {
                    name: &usage.name,
                    range: usage.target(),
                })
                .collect(),
        })
        .collect();
    Ok(serde_json::to_string_pretty(&formats)?)
}
