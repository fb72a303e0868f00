//! Option title matching
//!
//! Headings under "Pros and Cons of the Options" repeat the titles listed
//! under "Considered Options", often with different spacing, casing or a
//! truncated or elaborated wording. Titles are compared after removing all
//! whitespace and lower-casing.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::record::{ArchitecturalDecisionRecord, ConsideredOption};

/// How normalized titles are compared
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TitleMatching {
    /// Equal, or either title is a prefix of the other
    #[default]
    Prefix,
    /// Equal only
    Exact,
}

/// Remove all whitespace and lower-case a title
pub fn normalize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Resolves option headings to existing options
#[derive(Debug, Clone, Copy, Default)]
pub struct TitleMatcher {
    mode: TitleMatching,
}

impl TitleMatcher {
    pub fn new(mode: TitleMatching) -> Self {
        Self { mode }
    }

    /// Whether two titles denote the same option
    pub fn matches(&self, a: &str, b: &str) -> bool {
        let a = normalize_title(a);
        let b = normalize_title(b);
        match self.mode {
            TitleMatching::Prefix => a == b || a.starts_with(&b) || b.starts_with(&a),
            TitleMatching::Exact => a == b,
        }
    }

    /// Index of the first option (in declaration order) matching `title`
    pub fn find(&self, options: &[ConsideredOption], title: &str) -> Option<usize> {
        options.iter().position(|o| self.matches(&o.title, title))
    }

    /// Index of the option matching `title`, created if none matches
    pub fn resolve(&self, record: &mut ArchitecturalDecisionRecord, title: &str) -> usize {
        match self.find(&record.considered_options, title) {
            Some(index) => {
                debug!(
                    heading = title,
                    option = record.considered_options[index].title.as_str(),
                    "matched option heading"
                );
                index
            }
            None => {
                debug!(heading = title, "no considered option matches, adding it");
                record.add_option_index(title)
            }
        }
    }

    /// Like [`TitleMatcher::resolve`], returning the option itself
    pub fn resolve_option<'r>(
        &self,
        record: &'r mut ArchitecturalDecisionRecord,
        title: &str,
    ) -> &'r mut ConsideredOption {
        let index = self.resolve(record, title);
        &mut record.considered_options[index]
    }
}
