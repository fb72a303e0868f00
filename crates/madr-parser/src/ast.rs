//! MADR concrete syntax tree types
//!
//! The tree keeps the grammar's rule nesting: every node is tagged with the
//! rule that matched it and carries the matched source text.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::lexer::Span;

/// Grammar rules of the MADR dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Rule {
    /// Root of every tree
    Start,

    // Heading and preamble
    Title,
    Status,
    Deciders,
    Date,
    TechnicalStory,

    // Level-2 sections
    ContextAndProblemStatement,
    DecisionDrivers,
    ConsideredOptions,
    DecisionOutcome,
    ProsAndConsOfOptions,
    Links,

    // Decision outcome parts
    ChosenOption,
    ChosenOptionAndExplanation,
    PositiveConsequences,
    NegativeConsequences,

    // Per-option block (flattened siblings)
    OptionTitle,
    OptionDescription,
    Prolist,
    Conlist,

    /// Bulleted list wrapper
    List,
    /// One line of free text, the atom of every list
    TextLine,
}

impl Rule {
    /// Rule name as written in the grammar
    pub fn name(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Title => "title",
            Self::Status => "status",
            Self::Deciders => "deciders",
            Self::Date => "date",
            Self::TechnicalStory => "technicalStory",
            Self::ContextAndProblemStatement => "contextAndProblemStatement",
            Self::DecisionDrivers => "decisionDrivers",
            Self::ConsideredOptions => "consideredOptions",
            Self::DecisionOutcome => "decisionOutcome",
            Self::ProsAndConsOfOptions => "prosAndConsOfOptions",
            Self::Links => "links",
            Self::ChosenOption => "chosenOption",
            Self::ChosenOptionAndExplanation => "chosenOptionAndExplanation",
            Self::PositiveConsequences => "positiveConsequences",
            Self::NegativeConsequences => "negativeConsequences",
            Self::OptionTitle => "optionTitle",
            Self::OptionDescription => "optionDescription",
            Self::Prolist => "prolist",
            Self::Conlist => "conlist",
            Self::List => "list",
            Self::TextLine => "textLine",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A node in the concrete syntax tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntaxNode {
    /// Rule that produced this node
    pub rule: Rule,
    /// Matched text, with markers (`* `, `Status:`, `### `) removed
    pub text: String,
    /// Source location of the match
    #[serde(skip)]
    pub span: Span,
    /// Child nodes in document order
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    /// Create a leaf node
    pub fn leaf(rule: Rule, text: impl Into<String>, span: Span) -> Self {
        Self {
            rule,
            text: text.into(),
            span,
            children: Vec::new(),
        }
    }

    /// Create a node with children
    pub fn with_children(
        rule: Rule,
        text: impl Into<String>,
        span: Span,
        children: Vec<SyntaxNode>,
    ) -> Self {
        Self {
            rule,
            text: text.into(),
            span,
            children,
        }
    }

    /// First direct child matching `rule`
    pub fn child(&self, rule: Rule) -> Option<&SyntaxNode> {
        self.children.iter().find(|c| c.rule == rule)
    }

    /// Direct children matching `rule`
    pub fn children_of(&self, rule: Rule) -> impl Iterator<Item = &SyntaxNode> {
        self.children.iter().filter(move |c| c.rule == rule)
    }

    /// Text of every `textLine` directly below this node or below its list
    pub fn text_lines(&self) -> Vec<&str> {
        let list = self.child(Rule::List).unwrap_or(self);
        list.children_of(Rule::TextLine)
            .map(|c| c.text.as_str())
            .collect()
    }

    /// Render the tree as an indented outline, one node per line
    pub fn outline(&self) -> String {
        let mut out = String::new();
        self.write_outline(&mut out, 0);
        out
    }

    fn write_outline(&self, out: &mut String, depth: usize) {
        for _ in 0..depth {
            out.push_str("  ");
        }
        out.push_str(self.rule.name());
        if self.children.is_empty() {
            out.push_str(&format!(" {:?}", self.text));
        }
        out.push('\n');
        for child in &self.children {
            child.write_outline(out, depth + 1);
        }
    }
}
