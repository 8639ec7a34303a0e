// LSP-specific features
pub mod diagnostics;

// Re-export analysis features from dspf-analysis
pub use dspf_analysis::{document_symbols, go_to_definition, references};
