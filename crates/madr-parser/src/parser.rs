//! MADR document parser
//!
//! Recursive descent parser that converts the line token stream into a
//! concrete syntax tree. Option blocks under "Pros and Cons of the Options"
//! are emitted as flat siblings (`optionTitle`, `optionDescription`,
//! `prolist`, `conlist`); the grammar never nests them under one rule.

use crate::ast::{Rule, SyntaxNode};
use crate::lexer::{Lexer, Span, Token, TokenKind, strip_comments};
use thiserror::Error;

/// Parser errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Missing title: expected a level-1 heading at line {line}")]
    MissingTitle { line: usize },

    #[error("Unexpected heading at line {line}: {heading}")]
    UnexpectedHeading { heading: String, line: usize },

    #[error("Section out of order at line {line}: {section}")]
    SectionOutOfOrder { section: String, line: usize },

    #[error("Unexpected content in {context} at line {line}: {found}")]
    UnexpectedContent {
        found: String,
        context: String,
        line: usize,
    },
}

/// Parse result type
pub type ParseResult<T> = Result<T, ParseError>;

/// Parse a MADR document into a syntax tree rooted at a `start` node
pub fn parse(source: &str) -> ParseResult<SyntaxNode> {
    Parser::new(source).parse()
}

/// Level-2 sections, in the order the template requires
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Section {
    Context,
    DecisionDrivers,
    ConsideredOptions,
    DecisionOutcome,
    ProsAndCons,
    Links,
}

impl Section {
    fn from_heading(text: &str) -> Option<Self> {
        match text.to_lowercase().as_str() {
            "context and problem statement" => Some(Self::Context),
            "decision drivers" => Some(Self::DecisionDrivers),
            "considered options" => Some(Self::ConsideredOptions),
            "decision outcome" => Some(Self::DecisionOutcome),
            "pros and cons of the options" => Some(Self::ProsAndCons),
            "links" => Some(Self::Links),
            _ => None,
        }
    }

    fn heading(self) -> &'static str {
        match self {
            Self::Context => "Context and Problem Statement",
            Self::DecisionDrivers => "Decision Drivers",
            Self::ConsideredOptions => "Considered Options",
            Self::DecisionOutcome => "Decision Outcome",
            Self::ProsAndCons => "Pros and Cons of the Options",
            Self::Links => "Links",
        }
    }

    fn rule(self) -> Rule {
        match self {
            Self::Context => Rule::ContextAndProblemStatement,
            Self::DecisionDrivers => Rule::DecisionDrivers,
            Self::ConsideredOptions => Rule::ConsideredOptions,
            Self::DecisionOutcome => Rule::DecisionOutcome,
            Self::ProsAndCons => Rule::ProsAndConsOfOptions,
            Self::Links => Rule::Links,
        }
    }
}

/// MADR document parser
pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    /// Span of the last consumed non-blank token
    last_content: Span,
}

impl<'a> Parser<'a> {
    /// Create a new parser from source text
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            tokens: Lexer::tokenize(source),
            pos: 0,
            last_content: Span::default(),
        }
    }

    /// Parse the entire document
    pub fn parse(&mut self) -> ParseResult<SyntaxNode> {
        self.skip_blank_lines();

        let title_span = self.current_span();
        let title = match self.peek_kind() {
            TokenKind::Heading { level: 1, text } => {
                self.advance();
                SyntaxNode::leaf(Rule::Title, text, title_span)
            }
            _ => {
                return Err(ParseError::MissingTitle {
                    line: title_span.line,
                });
            }
        };

        let mut children = vec![title];
        self.parse_preamble(&mut children)?;

        let mut previous: Option<Section> = None;
        loop {
            self.skip_blank_lines();
            let span = self.current_span();
            match self.peek_kind() {
                TokenKind::Eof => break,
                TokenKind::Heading { level: 2, text } => {
                    let section = Section::from_heading(&text).ok_or_else(|| {
                        ParseError::UnexpectedHeading {
                            heading: format!("## {text}"),
                            line: span.line,
                        }
                    })?;
                    if previous.is_some_and(|p| section <= p) {
                        return Err(ParseError::SectionOutOfOrder {
                            section: section.heading().to_string(),
                            line: span.line,
                        });
                    }
                    previous = Some(section);
                    self.advance();
                    children.push(self.parse_section(section, span)?);
                }
                TokenKind::Heading { level, text } => {
                    return Err(ParseError::UnexpectedHeading {
                        heading: format!("{} {}", "#".repeat(level as usize), text),
                        line: span.line,
                    });
                }
                _ => return Err(self.unexpected("document")),
            }
        }

        let span = title_span.to(self.last_content);
        Ok(SyntaxNode::with_children(
            Rule::Start,
            self.slice(span),
            span,
            children,
        ))
    }

    /// Parse the metadata lines between the title and the first section
    fn parse_preamble(&mut self, children: &mut Vec<SyntaxNode>) -> ParseResult<()> {
        loop {
            let span = self.current_span();
            let field = match self.peek_kind() {
                TokenKind::Blank => {
                    self.advance();
                    continue;
                }
                TokenKind::Heading { .. } | TokenKind::Eof => return Ok(()),
                TokenKind::ListItem(text) | TokenKind::Text(text) => preamble_field(text.trim()),
            };

            let Some((rule, value)) = field else {
                return Err(self.unexpected("preamble"));
            };
            // Each metadata field may appear only once
            if children.iter().any(|c| c.rule == rule) {
                return Err(self.unexpected("preamble"));
            }
            self.advance();
            children.push(SyntaxNode::leaf(rule, value, span));
        }
    }

    /// Parse the body of a level-2 section whose heading was just consumed
    fn parse_section(&mut self, section: Section, heading: Span) -> ParseResult<SyntaxNode> {
        let children = match section {
            Section::Context => {
                let (text, span) = match self.collect_text(false) {
                    Some((text, body)) => (text, heading.to(body)),
                    None => (String::new(), heading),
                };
                return Ok(SyntaxNode::leaf(section.rule(), text, span));
            }
            Section::DecisionDrivers | Section::ConsideredOptions | Section::Links => {
                vec![self.parse_list(section.heading())?]
            }
            Section::DecisionOutcome => self.parse_decision_outcome()?,
            Section::ProsAndCons => self.parse_pros_and_cons()?,
        };

        let span = heading.to(self.last_content);
        Ok(SyntaxNode::with_children(
            section.rule(),
            self.slice(span),
            span,
            children,
        ))
    }

    /// Parse a bulleted list into `list > textLine*`
    ///
    /// A text line directly below an item continues that item.
    fn parse_list(&mut self, context: &str) -> ParseResult<SyntaxNode> {
        let start = self.current_span();
        let mut items: Vec<SyntaxNode> = Vec::new();
        let mut after_item = false;

        loop {
            let span = self.current_span();
            match self.peek_kind() {
                TokenKind::Heading { .. } | TokenKind::Eof => break,
                TokenKind::Blank => after_item = false,
                TokenKind::ListItem(text) => {
                    items.push(SyntaxNode::leaf(Rule::TextLine, text, span));
                    after_item = true;
                }
                TokenKind::Text(text) if after_item => {
                    if let Some(last) = items.last_mut() {
                        continue_line(last, &text, span);
                    }
                }
                _ => return Err(self.unexpected(context)),
            }
            self.advance();
        }

        let span = match (items.first(), items.last()) {
            (Some(first), Some(last)) => first.span.to(last.span),
            _ => Span::new(start.start, start.start, start.line),
        };
        Ok(SyntaxNode::with_children(
            Rule::List,
            self.slice(span),
            span,
            items,
        ))
    }

    /// Parse the outcome paragraph and the optional consequence lists
    fn parse_decision_outcome(&mut self) -> ParseResult<Vec<SyntaxNode>> {
        let mut children = Vec::new();

        if let Some((text, span)) = self.collect_text(false) {
            let node = match bare_chosen_option(&text) {
                Some(title) => SyntaxNode::leaf(Rule::ChosenOption, title, span),
                None => SyntaxNode::leaf(Rule::ChosenOptionAndExplanation, text, span),
            };
            children.push(node);
        }

        let mut seen_positive = false;
        let mut seen_negative = false;
        loop {
            self.skip_blank_lines();
            let span = self.current_span();
            let TokenKind::Heading { level: 3, text } = self.peek_kind() else {
                break;
            };

            let rule = if text.eq_ignore_ascii_case("Positive Consequences") {
                if seen_positive || seen_negative {
                    return Err(ParseError::SectionOutOfOrder {
                        section: text,
                        line: span.line,
                    });
                }
                seen_positive = true;
                Rule::PositiveConsequences
            } else if text.eq_ignore_ascii_case("Negative Consequences") {
                if seen_negative {
                    return Err(ParseError::SectionOutOfOrder {
                        section: text,
                        line: span.line,
                    });
                }
                seen_negative = true;
                Rule::NegativeConsequences
            } else {
                return Err(ParseError::UnexpectedHeading {
                    heading: format!("### {text}"),
                    line: span.line,
                });
            };

            self.advance();
            let list = self.parse_list(&text)?;
            let span = span.to(self.last_content);
            children.push(SyntaxNode::with_children(
                rule,
                self.slice(span),
                span,
                vec![list],
            ));
        }

        Ok(children)
    }

    /// Parse the per-option blocks as flat siblings
    fn parse_pros_and_cons(&mut self) -> ParseResult<Vec<SyntaxNode>> {
        let mut children = Vec::new();

        loop {
            self.skip_blank_lines();
            let span = self.current_span();
            match self.peek_kind() {
                TokenKind::Heading { level: 3, text } => {
                    self.advance();
                    children.push(SyntaxNode::leaf(Rule::OptionTitle, text, span));
                    if let Some((description, span)) = self.collect_text(true) {
                        children.push(SyntaxNode::leaf(
                            Rule::OptionDescription,
                            description,
                            span,
                        ));
                    }
                    children.extend(self.parse_arguments()?);
                }
                TokenKind::Heading { .. } | TokenKind::Eof => break,
                _ => return Err(self.unexpected(Section::ProsAndCons.heading())),
            }
        }

        Ok(children)
    }

    /// Parse `* Good, because ...` and `* Bad, because ...` items
    ///
    /// Consecutive items of the same kind form one `prolist` or `conlist`.
    fn parse_arguments(&mut self) -> ParseResult<Vec<SyntaxNode>> {
        let mut groups: Vec<SyntaxNode> = Vec::new();
        let mut after_item = false;

        loop {
            let span = self.current_span();
            match self.peek_kind() {
                TokenKind::Heading { .. } | TokenKind::Eof => break,
                TokenKind::Blank => after_item = false,
                TokenKind::ListItem(text) if is_placeholder(&text) => after_item = false,
                TokenKind::ListItem(text) => {
                    let (rule, argument) = if let Some(argument) = strip_argument(&text, "Good") {
                        (Rule::Prolist, argument)
                    } else if let Some(argument) = strip_argument(&text, "Bad") {
                        (Rule::Conlist, argument)
                    } else {
                        return Err(self.unexpected("option arguments"));
                    };

                    let line = SyntaxNode::leaf(Rule::TextLine, argument, span);
                    match groups.last_mut() {
                        Some(group) if group.rule == rule => {
                            group.span = group.span.to(span);
                            group.children.push(line);
                        }
                        _ => groups.push(SyntaxNode::with_children(rule, "", span, vec![line])),
                    }
                    after_item = true;
                }
                TokenKind::Text(text) if after_item => {
                    if let Some(group) = groups.last_mut() {
                        group.span = group.span.to(span);
                        if let Some(last) = group.children.last_mut() {
                            continue_line(last, &text, span);
                        }
                    }
                }
                _ => return Err(self.unexpected("option arguments")),
            }
            self.advance();
        }

        for group in &mut groups {
            group.text = self.slice(group.span);
        }
        Ok(groups)
    }

    /// Collect free text up to the next heading (or list item, if requested)
    ///
    /// Outer blank lines are dropped; inner blank lines are kept so that
    /// multi-paragraph text survives.
    fn collect_text(&mut self, stop_at_items: bool) -> Option<(String, Span)> {
        let source = self.source;
        let mut lines: Vec<&str> = Vec::new();
        let mut span: Option<Span> = None;
        let mut pending_blank = 0;

        loop {
            let current = self.current_span();
            match self.peek_kind() {
                TokenKind::Heading { .. } | TokenKind::Eof => break,
                TokenKind::ListItem(_) if stop_at_items => break,
                TokenKind::Blank => {
                    if !lines.is_empty() {
                        pending_blank += 1;
                    }
                }
                TokenKind::ListItem(_) | TokenKind::Text(_) => {
                    lines.extend(std::iter::repeat_n("", pending_blank));
                    pending_blank = 0;
                    lines.push(source[current.start..current.end].trim_end());
                    span = Some(span.map_or(current, |s| s.to(current)));
                }
            }
            self.advance();
        }

        span.map(|span| (lines.join("\n").trim().to_string(), span))
    }

    /// Build an error for the current token
    fn unexpected(&self, context: &str) -> ParseError {
        let span = self.current_span();
        ParseError::UnexpectedContent {
            found: self.slice(span),
            context: context.to_string(),
            line: span.line,
        }
    }

    /// Source text covered by a span, trimmed
    fn slice(&self, span: Span) -> String {
        self.source
            .get(span.start..span.end)
            .unwrap_or_default()
            .trim()
            .to_string()
    }

    // Helper methods

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek()
            .map(|t| t.kind.clone())
            .unwrap_or(TokenKind::Eof)
    }

    fn current_span(&self) -> Span {
        self.peek().map(|t| t.span).unwrap_or_default()
    }

    fn advance(&mut self) {
        if let Some(token) = self.tokens.get(self.pos) {
            if !matches!(token.kind, TokenKind::Blank | TokenKind::Eof) {
                self.last_content = token.span;
            }
            self.pos += 1;
        }
    }

    fn skip_blank_lines(&mut self) {
        while matches!(self.peek_kind(), TokenKind::Blank) {
            self.advance();
        }
    }
}

/// Append a continuation line to a list item
fn continue_line(item: &mut SyntaxNode, text: &str, span: Span) {
    if !item.text.is_empty() {
        item.text.push(' ');
    }
    item.text.push_str(text.trim());
    item.span = item.span.to(span);
}

/// Recognize `Status: x`, `Deciders: x`, `Date: x` and `Technical Story: x`
fn preamble_field(line: &str) -> Option<(Rule, String)> {
    [
        (Rule::Status, "Status"),
        (Rule::Deciders, "Deciders"),
        (Rule::Date, "Date"),
        (Rule::TechnicalStory, "Technical Story"),
    ]
    .into_iter()
    .find_map(|(rule, label)| strip_field(line, label).map(|value| (rule, value)))
}

/// Strip a case-insensitive `label:` prefix and return the trimmed value
fn strip_field(line: &str, label: &str) -> Option<String> {
    let head = line.get(..label.len())?;
    if !head.eq_ignore_ascii_case(label) {
        return None;
    }
    let value = line[label.len()..].strip_prefix(':')?;
    Some(strip_comments(value).trim().to_string())
}

/// Strip a `Good, because` / `Bad, because` prefix
fn strip_argument(text: &str, verdict: &str) -> Option<String> {
    let prefix = format!("{verdict}, because");
    let head = text.get(..prefix.len())?;
    if !head.eq_ignore_ascii_case(&prefix) {
        return None;
    }
    let rest = &text[prefix.len()..];
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(rest.trim().to_string())
}

/// A single quoted line without the `Chosen option:` prefix is the bare form
///
/// A title containing `, because` is not bare: written back with the prefix
/// it would split into a title and an explanation.
fn bare_chosen_option(text: &str) -> Option<&str> {
    if text.contains('\n') || text.starts_with("Chosen option:") {
        return None;
    }
    let mut chars = text.chars();
    let first = chars.next()?;
    let last = chars.next_back()?;
    if first != last || !matches!(first, '"' | '\'' | '`') {
        return None;
    }
    let title = &text[first.len_utf8()..text.len() - last.len_utf8()];
    if title.contains(", because") {
        return None;
    }
    Some(title)
}

/// Template placeholder bullet (`* …`) standing in for more arguments
fn is_placeholder(text: &str) -> bool {
    matches!(text, "…" | "...")
}

#[cfg(test)]
mod tests;
