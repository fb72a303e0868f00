//! madr-parser: Parser for MADR architectural decision records
//!
//! This crate provides:
//! - MADR line lexer (tokenizer)
//! - Recursive descent parser producing a concrete syntax tree
//! - Tree walker with enter/exit listener callbacks
//!
//! # Example
//!
//! ```
//! use madr_parser::{parse, Rule};
//!
//! let source = "# Use Postgres\n\n## Considered Options\n\n* Postgres\n* MySQL\n";
//!
//! let tree = parse(source).unwrap();
//! let options = tree.child(Rule::ConsideredOptions).unwrap();
//! assert_eq!(options.text_lines(), vec!["Postgres", "MySQL"]);
//! ```

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod walker;

// Re-export main types for convenient access
pub use ast::{Rule, SyntaxNode};
pub use lexer::{Lexer, Span, Token, TokenKind};
pub use parser::{ParseError, ParseResult, Parser, parse};
pub use walker::{Listener, walk};

/// Dump a syntax tree as pretty-printed JSON
#[cfg(feature = "json")]
pub fn to_json(tree: &SyntaxNode) -> serde_json::Result<String> {
    serde_json::to_string_pretty(tree)
}
