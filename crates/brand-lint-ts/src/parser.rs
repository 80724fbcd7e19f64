//! Parser abstraction.
//!
//! `SourceParser` is the extension point for feeding the engine from a
//! new grammar. Implementations lower their concrete tree into the
//! engine's [`SyntaxTree`].

use brand_lint_core::SyntaxTree;

/// Errors raised while parsing a source file.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The grammar could not be loaded.
    #[error("failed to load the {dialect} grammar: {reason}")]
    Language {
        /// Grammar name.
        dialect: &'static str,
        /// Loader message.
        reason: String,
    },

    /// The parser returned no tree.
    #[error("the {dialect} parser produced no tree")]
    NoTree {
        /// Grammar name.
        dialect: &'static str,
    },

    /// The source contains a syntax error.
    #[error("syntax error at {line}:{column}")]
    Syntax {
        /// Line (1-indexed).
        line: usize,
        /// Column (1-indexed).
        column: usize,
    },
}

/// A grammar-specific parser.
pub trait SourceParser: Send + Sync {
    /// Grammar identifier (e.g. `"tsx"`).
    fn language_id(&self) -> &'static str;

    /// File extensions this parser handles, without the dot.
    fn extensions(&self) -> &'static [&'static str];

    /// Parses `source` into a syntax tree.
    ///
    /// Recoverable syntax errors do not fail the parse; erroneous regions
    /// are lowered as `Other` nodes.
    ///
    /// # Errors
    ///
    /// Returns an error if the grammar cannot be loaded or no tree is produced.
    fn parse(&self, source: &str) -> Result<SyntaxTree, ParseError>;

    /// Checks that `source` parses without syntax errors.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Syntax`] at the first error or missing node.
    fn check_syntax(&self, source: &str) -> Result<(), ParseError>;
}
