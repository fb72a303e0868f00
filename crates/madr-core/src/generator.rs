//! Syntax tree to record conversion
//!
//! The generator listens to a depth-first walk of the MADR syntax tree and
//! fills an [`ArchitecturalDecisionRecord`] as rules are entered. Option
//! titles, descriptions and pro/con lists arrive as siblings, so the
//! generator remembers the option named by the last `optionTitle` and
//! attaches the following description and lists to it.

use madr_parser::{Listener, Rule, SyntaxNode, walk};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::matcher::{TitleMatcher, TitleMatching};
use crate::record::{ArchitecturalDecisionRecord, ConsideredOption};

/// Literal prefix of the decision outcome line
pub const CHOSEN_OPTION_PREFIX: &str = "Chosen option: ";

const BECAUSE: &str = ", because";

/// How the explanation is cut out of the decision outcome line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExplanationSplit {
    /// Split at the first `, because`; later occurrences stay in the explanation
    #[default]
    First,
    /// Split at every `, because` and rejoin the tail with `,`
    ///
    /// Drops the repeated `because` words, so it is lossy.
    Legacy,
}

/// Options for building a record from a syntax tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeneratorOptions {
    pub explanation_split: ExplanationSplit,
    pub title_matching: TitleMatching,
}

/// A recoverable problem found while building a record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Warning {
    #[error("line {line}: couldn't find chosen option, expected \"Chosen option: \" in: {text}")]
    MissingChosenOptionPrefix { text: String, line: usize },
}

/// A record together with the recoverable problems found while building it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parsed {
    pub record: ArchitecturalDecisionRecord,
    pub warnings: Vec<Warning>,
}

/// Build a record from a syntax tree rooted at a `start` node
pub fn build_record(tree: &SyntaxNode, options: &GeneratorOptions) -> Parsed {
    let mut generator = Generator::new(*options);
    walk(&mut generator, tree);
    generator.finish()
}

/// Split a decision outcome line into the chosen option and its explanation
///
/// Returns `None` when the line does not start with [`CHOSEN_OPTION_PREFIX`].
pub fn split_chosen_option(text: &str, split: ExplanationSplit) -> Option<(String, String)> {
    let rest = text.strip_prefix(CHOSEN_OPTION_PREFIX)?;

    let (head, explanation) = match split {
        ExplanationSplit::First => match rest.find(BECAUSE) {
            Some(i) => (&rest[..i], rest[i + BECAUSE.len()..].trim_start().to_string()),
            None => (rest, String::new()),
        },
        ExplanationSplit::Legacy => {
            let mut fragments = rest.split(BECAUSE);
            let head = fragments.next().unwrap_or_default();
            let tail: Vec<&str> = fragments.map(|f| f.trim_start_matches(' ')).collect();
            (head, tail.join(","))
        }
    };

    Some((unquote(head.trim()).to_string(), explanation))
}

/// Remove one layer of matching delimiters, e.g. `"Postgres"` → `Postgres`
fn unquote(title: &str) -> &str {
    let mut chars = title.chars();
    match (chars.next(), chars.next_back()) {
        (Some(first), Some(last)) if first == last && !first.is_alphanumeric() => {
            &title[first.len_utf8()..title.len() - last.len_utf8()]
        }
        _ => title,
    }
}

/// Listener that fills a record while the tree is walked
pub struct Generator {
    record: ArchitecturalDecisionRecord,
    /// Option named by the most recent `optionTitle`
    current_option: Option<usize>,
    matcher: TitleMatcher,
    explanation_split: ExplanationSplit,
    warnings: Vec<Warning>,
}

impl Generator {
    pub fn new(options: GeneratorOptions) -> Self {
        Self {
            record: ArchitecturalDecisionRecord::default(),
            current_option: None,
            matcher: TitleMatcher::new(options.title_matching),
            explanation_split: options.explanation_split,
            warnings: Vec::new(),
        }
    }

    /// Consume the generator, returning the record and any warnings
    pub fn finish(self) -> Parsed {
        Parsed {
            record: self.record,
            warnings: self.warnings,
        }
    }

    fn enter_chosen_option_and_explanation(&mut self, node: &SyntaxNode) {
        match split_chosen_option(&node.text, self.explanation_split) {
            Some((chosen_option, explanation)) => {
                let outcome = &mut self.record.decision_outcome;
                outcome.chosen_option = chosen_option;
                outcome.explanation = explanation;
            }
            None => {
                warn!(line = node.span.line, "couldn't find chosen option");
                self.warnings.push(Warning::MissingChosenOptionPrefix {
                    text: node.text.clone(),
                    line: node.span.line,
                });
            }
        }
    }

    fn current_option_mut(&mut self, node: &SyntaxNode) -> Option<&mut ConsideredOption> {
        let option = self
            .current_option
            .and_then(|i| self.record.considered_options.get_mut(i));
        if option.is_none() {
            debug!(
                rule = node.rule.name(),
                line = node.span.line,
                "no option heading in scope, skipping"
            );
        }
        option
    }
}

impl Listener for Generator {
    fn enter(&mut self, node: &SyntaxNode) {
        match node.rule {
            Rule::Title => self.record.title = node.text.clone(),
            Rule::Status => self.record.status = node.text.clone(),
            Rule::Deciders => self.record.deciders = node.text.clone(),
            Rule::Date => self.record.date = node.text.clone(),
            Rule::TechnicalStory => self.record.technical_story = node.text.clone(),
            Rule::ContextAndProblemStatement => {
                self.record.context_and_problem_statement = node.text.clone();
            }
            Rule::DecisionDrivers => extend(&mut self.record.decision_drivers, node),
            // First declaration always creates, without matching
            Rule::ConsideredOptions => {
                for title in node.text_lines() {
                    self.record.add_option(title);
                }
            }
            Rule::ChosenOption => {
                self.record.decision_outcome.chosen_option = node.text.clone();
            }
            Rule::ChosenOptionAndExplanation => self.enter_chosen_option_and_explanation(node),
            Rule::PositiveConsequences => extend(
                &mut self.record.decision_outcome.positive_consequences,
                node,
            ),
            Rule::NegativeConsequences => extend(
                &mut self.record.decision_outcome.negative_consequences,
                node,
            ),
            Rule::OptionTitle => {
                self.current_option = Some(self.matcher.resolve(&mut self.record, &node.text));
            }
            Rule::OptionDescription => {
                if let Some(option) = self.current_option_mut(node) {
                    option.description = node.text.clone();
                }
            }
            Rule::Prolist => {
                if let Some(option) = self.current_option_mut(node) {
                    extend(&mut option.pros, node);
                }
            }
            Rule::Conlist => {
                if let Some(option) = self.current_option_mut(node) {
                    extend(&mut option.cons, node);
                }
            }
            Rule::Links => extend(&mut self.record.links, node),
            Rule::Start
            | Rule::DecisionOutcome
            | Rule::ProsAndConsOfOptions
            | Rule::List
            | Rule::TextLine => {}
        }
    }
}

/// Append the node's `textLine` texts to `target`
fn extend(target: &mut Vec<String>, node: &SyntaxNode) {
    target.extend(node.text_lines().into_iter().map(str::to_string));
}
