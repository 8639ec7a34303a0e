use std::path::PathBuf;
use thiserror::Error;

/// Failures of the command line queries. The language server itself never
/// fails on document content.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize result: {0}")]
    Json(#[from] serde_json::Error),

    #[error("line {line} is outside the document ({line_count} lines)")]
    PositionOutOfRange { line: usize, line_count: usize },
}
