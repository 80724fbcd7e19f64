//! # brand-lint-ts
//!
//! Tree-sitter parser adapter for brand-lint.
//!
//! The engine consumes an already-parsed, parser-neutral syntax tree. This
//! crate produces one from TSX, JSX and TypeScript sources:
//!
//! - [`SourceParser`] trait for pluggable grammars
//! - [`TsxParser`] lowering Tree-sitter TSX/TypeScript trees
//! - [`ParseError`] for grammar and syntax failures
//!
//! [`SourceParser::check_syntax`] is also how fixed sources are verified
//! before they are written back.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod parser;
pub mod tsx;

pub use parser::{ParseError, SourceParser};
pub use tsx::{Dialect, TsxParser};
