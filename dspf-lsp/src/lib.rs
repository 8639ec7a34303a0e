//! Language Server Protocol (LSP) implementation for DDS display files
//!
//!     This crate puts the alias index from `dspf-analysis` behind tower-lsp so that any
//!     LSP-capable editor gets go-to-definition between `DSPATR(&FIELD)` references and the
//!     fields that declare `ALIAS(...)`.
//!
//! Feature Set
//!
//!     1. Go to Definition (textDocument/definition):
//!         - From a usage to the field declared in the same record format (a single location)
//!         - From a declaration to every usage in the format, in document order
//!     2. Find References (textDocument/references):
//!         - Every usage of the alias under the cursor, optionally with its declaration
//!     3. Document Symbols (textDocument/documentSymbol):
//!         - Record formats with their alias declarations as children
//!     4. Diagnostics (opt-in through `diagnostics.duplicateAliases`):
//!         - Fields declared more than once in a format; the last declaration wins
//!
//! Architecture
//!
//!     LSP Layer (tower-lsp):
//!         - JSON-RPC, capability negotiation, request routing
//!
//!     Server Layer (this crate):
//!         - Implements the LanguageServer trait
//!         - Keeps one parsed revision per open document and reuses it for every query
//!         - Thin tests asserting the right features are called and returned
//!
//!     Feature Layer (dspf-analysis):
//!         - Stateless functions over the parsed document, with the dense unit tests
//!
//! Error Handling
//!
//!     Document content never produces an error. Unknown documents and positions outside
//!     any alias answer with `None`. Only the command line queries can fail, on IO, and
//!     they report a `CliError`.
//!
//! Usage
//!
//!     Binary:
//!         $ dspf-lsp
//!         Starts the language server on stdin/stdout for editor integration.
//!
//!         $ dspf-lsp definition screen.dspf 12 40
//!         $ dspf-lsp index screen.dspf
//!         One-shot queries printing JSON.
//!
//!     Logging goes to stderr and is controlled by `DSPF_LSP_LOG` (e.g. `DSPF_LSP_LOG=debug`).

pub mod cli;
pub mod error;
pub mod features;
pub mod server;

pub use server::DspfLanguageServer;
