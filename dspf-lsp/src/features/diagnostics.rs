//! Converts analysis warnings into LSP diagnostics

use dspf_analysis::diagnostics::AliasWarning;
use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity, NumberOrString, Position, Range};

pub const DIAGNOSTIC_SOURCE: &str = "dspf";
pub const DUPLICATE_ALIAS_CODE: &str = "duplicate-alias";

pub fn alias_diagnostics(warnings: &[AliasWarning]) -> Vec<Diagnostic> {
    warnings.iter().map(to_diagnostic).collect()
}

fn to_diagnostic(warning: &AliasWarning) -> Diagnostic {
    let range = Range {
        start: Position::new(
            warning.range.start.line as u32,
            warning.range.start.column as u32,
        ),
        end: Position::new(warning.range.end.line as u32, warning.range.end.column as u32),
    };
    Diagnostic {
        range,
        severity: Some(DiagnosticSeverity::WARNING),
        code: Some(NumberOrString::String(DUPLICATE_ALIAS_CODE.to_string())),
        source: Some(DIAGNOSTIC_SOURCE.to_string()),
        message: warning.message.clone(),
        ..Default::default()
    }
}
