//! # tree-sitter-sea
//!
//! Sea language support for the [tree-sitter] parsing library.
//!
//! The crate provides:
//! - The compiled Sea grammar as a [`LanguageFn`] ([`LANGUAGE`])
//! - Load verification for the built-in grammar and for separately built
//!   grammar libraries
//! - Highlight and tag queries
//! - A parser wrapper that reports syntax diagnostics, and a tag-query
//!   driven outline of top-level definitions
//!
//! ```
//! let mut parser = tree_sitter::Parser::new();
//! parser
//!     .set_language(&tree_sitter_sea::LANGUAGE.into())
//!     .expect("Error loading Sea grammar");
//! ```
//!
//! [tree-sitter]: https://tree-sitter.github.io/

pub mod batch;
pub mod config;
pub mod ignore;
pub mod loader;
pub mod outline;
pub mod output;
pub mod parse;
pub mod symbol;
pub mod ui;

use tree_sitter_language::LanguageFn;

unsafe extern "C" {
    fn tree_sitter_sea() -> *const ();
}

/// The tree-sitter [`LanguageFn`] for the Sea grammar.
pub const LANGUAGE: LanguageFn = unsafe { LanguageFn::from_raw(tree_sitter_sea) };

/// The syntax highlighting query.
pub const HIGHLIGHTS_QUERY: &str = include_str!("../queries/highlights.scm");

/// The tags query, used to build outlines of top-level definitions.
pub const TAGS_QUERY: &str = include_str!("../queries/tags.scm");

/// Diagnostic reported whenever the grammar cannot be loaded.
pub const LOAD_ERROR_MESSAGE: &str = "Error loading Sea grammar";

// Re-exports for convenient access
pub use config::SeaConfig;
pub use loader::{LoadedGrammar, load_language, load_language_from_library, verify_language};
pub use outline::Outline;
pub use parse::{Diagnostic, DiagnosticKind, ParsedSource, SeaParser};
pub use symbol::{Symbol, SymbolKind};

/// Returns the tree-sitter [`Language`](tree_sitter::Language) for Sea.
///
/// This does not verify the handle; use [`load_language`] for that.
pub fn language() -> tree_sitter::Language {
    LANGUAGE.into()
}

/// Result type alias for Sea grammar operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Sea grammar operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Error loading Sea grammar: {0}")]
    GrammarLoad(String),

    #[error("Error loading Sea grammar: ABI version {version} is outside the supported range {min}..={max}")]
    AbiVersion { version: usize, min: usize, max: usize },

    #[error("Error loading Sea grammar library: {0}")]
    Library(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error means the grammar itself could not be loaded.
    pub fn is_load_failure(&self) -> bool {
        matches!(self, Error::GrammarLoad(_) | Error::AbiVersion { .. } | Error::Library(_))
    }
}

/// Message sent from batch parse workers to the coordinator
#[derive(Debug)]
pub enum ParseMessage {
    Parsed(batch::FileReport),
    Error(String, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_load_grammar() {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&LANGUAGE.into())
            .expect("Error loading Sea grammar");
    }

    #[test]
    fn test_load_errors_carry_fixed_message() {
        let err = Error::GrammarLoad("null language handle".to_string());
        assert!(err.to_string().starts_with(LOAD_ERROR_MESSAGE));
        assert!(err.is_load_failure());

        let err = Error::AbiVersion { version: 99, min: 13, max: 14 };
        assert!(err.to_string().starts_with(LOAD_ERROR_MESSAGE));

        assert!(!Error::Query("bad".to_string()).is_load_failure());
    }
}
