//! Alias navigation for DDS display files
//!
//! A display file (DSPF) describes screens as record formats written in a
//! fixed-column layout. Fields can carry an `ALIAS(...)` keyword and other
//! specifications can refer to them through program-to-system references such
//! as `DSPATR(&FIELD)`. This crate indexes both sides per record format and
//! answers "where does this lead" for a cursor position.
//!
//! # Architecture
//!
//! - `normalize`: blanks continuation markers so columns line up
//! - `document`: positions, ranges and the line source the parser reads
//! - `parser`: one pass over the lines producing format sections
//! - `symbols`: the per-format alias index
//! - `go_to_definition`: usage to declaration and declaration to usages
//! - `references`: every occurrence of the alias under the cursor
//! - `document_symbols`: format and alias outline
//! - `diagnostics`: aliases declared more than once in a format
//!
//! # Design Principles
//!
//! - **Stateless**: parsing builds a fresh index from an immutable snapshot
//! - **Reusable**: not tied to LSP; the server and the CLI both sit on top
//! - **Best effort**: malformed lines are skipped, nothing here returns an error
//!
//! # Usage
//!
//! ```rust,ignore
//! use dspf_analysis::document::{Position, SourceText};
//! use dspf_analysis::parser::parse_document;
//! use dspf_analysis::go_to_definition::goto_definition;
//!
//! let text = SourceText::new(source);
//! let document = parse_document(&text);
//! let targets = goto_definition(&document, Position::new(12, 40));
//! ```

// Core
pub mod document;
pub mod normalize;
pub mod parser;
pub mod symbols;

// Navigation features
pub mod diagnostics;
pub mod document_symbols;
pub mod go_to_definition;
pub mod references;

// Test support (available in tests and as dev-dependency)
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
