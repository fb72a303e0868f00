//! madr-core: Core library for converting MADR documents to records and back
//!
//! This crate provides:
//! - The architectural decision record model
//! - Option title matching across document sections
//! - Syntax tree to record conversion
//! - Record to canonical MADR Markdown output
//!
//! ## Example
//!
//! ```rust
//! let md = "# Use Postgres\n\n## Considered Options\n\n* Postgres\n* MySQL\n\n## Decision Outcome\n\n\
//!           Chosen option: \"Postgres\", because of JSON support\n";
//!
//! let adr = madr_core::parse(md).unwrap();
//! assert_eq!(adr.decision_outcome.chosen_option, "Postgres");
//!
//! let out = madr_core::serialize(&adr);
//! assert!(out.contains("Chosen option: \"Postgres\", because of JSON support"));
//! ```

pub mod generator;
pub mod matcher;
pub mod record;
pub mod writer;

pub use generator::{
    ExplanationSplit, Generator, GeneratorOptions, Parsed, Warning, build_record,
    split_chosen_option,
};
pub use madr_parser::{ParseError, ParseResult, Rule, SyntaxNode};
pub use matcher::{TitleMatcher, TitleMatching, normalize_title};
pub use record::{ArchitecturalDecisionRecord, ConsideredOption, DecisionOutcome};
pub use writer::serialize;

/// Parse MADR Markdown into a record with default options
///
/// Malformed decision outcome lines are logged and leave the outcome empty;
/// use [`parse_with_options`] to inspect them.
pub fn parse(markdown: &str) -> ParseResult<ArchitecturalDecisionRecord> {
    parse_with_options(markdown, &GeneratorOptions::default()).map(|parsed| parsed.record)
}

/// Parse MADR Markdown into a record, keeping recoverable warnings
pub fn parse_with_options(markdown: &str, options: &GeneratorOptions) -> ParseResult<Parsed> {
    let tree = madr_parser::parse(markdown)?;
    Ok(build_record(&tree, options))
}
