//! Architectural decision record model
//!
//! A record owns its considered options. Later sections of a document refer
//! back to options by index so that pros and cons land on the entry created
//! by the "Considered Options" list.

use serde::{Deserialize, Serialize};

/// A structured architectural decision record
///
/// Empty strings stand for absent fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArchitecturalDecisionRecord {
    pub title: String,
    pub status: String,
    /// Raw deciders line, not split into names
    pub deciders: String,
    pub date: String,
    pub technical_story: String,
    pub context_and_problem_statement: String,
    pub decision_drivers: Vec<String>,
    pub considered_options: Vec<ConsideredOption>,
    pub decision_outcome: DecisionOutcome,
    pub links: Vec<String>,
}

/// One option that was considered for the decision
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsideredOption {
    pub title: String,
    pub description: String,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
}

/// The chosen option and its consequences
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DecisionOutcome {
    /// Title of the chosen option; not required to name a considered option
    pub chosen_option: String,
    pub explanation: String,
    pub positive_consequences: Vec<String>,
    pub negative_consequences: Vec<String>,
}

impl ArchitecturalDecisionRecord {
    /// Create an empty record with a title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Append a new option and return it
    ///
    /// Duplicates are not checked here; see [`crate::matcher::TitleMatcher`].
    pub fn add_option(&mut self, title: impl Into<String>) -> &mut ConsideredOption {
        let index = self.add_option_index(title);
        &mut self.considered_options[index]
    }

    /// Append a new option and return its index
    pub fn add_option_index(&mut self, title: impl Into<String>) -> usize {
        self.considered_options.push(ConsideredOption::new(title));
        self.considered_options.len() - 1
    }

    /// Look up an option by its exact title
    pub fn option(&self, title: &str) -> Option<&ConsideredOption> {
        self.considered_options.iter().find(|o| o.title == title)
    }

    /// Whether any option carries a description, pros or cons
    pub fn has_pros_and_cons(&self) -> bool {
        self.considered_options
            .iter()
            .any(ConsideredOption::has_details)
    }
}

impl ConsideredOption {
    /// Create an option with only a title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Whether the option has a description, pros or cons
    pub fn has_details(&self) -> bool {
        !self.description.is_empty() || !self.pros.is_empty() || !self.cons.is_empty()
    }
}
