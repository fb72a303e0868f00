//! Record to MADR Markdown writer
//!
//! Renders an [`ArchitecturalDecisionRecord`] in the canonical MADR layout.
//! Empty fields are omitted, except for the title heading and the decision
//! outcome line which are always written.

use crate::generator::CHOSEN_OPTION_PREFIX;
use crate::record::{ArchitecturalDecisionRecord, ConsideredOption, DecisionOutcome};

/// Render a record as MADR Markdown
pub fn serialize(record: &ArchitecturalDecisionRecord) -> String {
    let mut writer = Writer::new();
    writer.write_record(record);
    writer.output
}

/// Markdown writer state
struct Writer {
    output: String,
}

impl Writer {
    fn new() -> Self {
        Self {
            output: String::new(),
        }
    }

    fn write_record(&mut self, adr: &ArchitecturalDecisionRecord) {
        self.write_heading(1, &adr.title);
        self.write_metadata(adr);

        if !adr.technical_story.is_empty() {
            self.write_paragraph(&format!("Technical Story: {}", adr.technical_story));
        }

        if !adr.context_and_problem_statement.is_empty() {
            self.write_heading(2, "Context and Problem Statement");
            self.write_paragraph(&adr.context_and_problem_statement);
        }

        if !adr.decision_drivers.is_empty() {
            self.write_heading(2, "Decision Drivers");
            self.write_list(&adr.decision_drivers);
        }

        if !adr.considered_options.is_empty() {
            self.write_heading(2, "Considered Options");
            self.write_list(adr.considered_options.iter().map(|o| &o.title));
        }

        self.write_decision_outcome(&adr.decision_outcome);

        if adr.has_pros_and_cons() {
            self.write_heading(2, "Pros and Cons of the Options");
            for option in adr.considered_options.iter().filter(|o| o.has_details()) {
                self.write_option(option);
            }
        }

        if !adr.links.is_empty() {
            self.write_heading(2, "Links");
            self.write_list(&adr.links);
        }
    }

    /// Status, deciders and date as one list below the title
    fn write_metadata(&mut self, adr: &ArchitecturalDecisionRecord) {
        let mut lines = Vec::new();
        // "null" is what some editors store for an unset status
        if !adr.status.is_empty() && adr.status != "null" {
            lines.push(format!("Status: {}", adr.status));
        }
        if !adr.deciders.is_empty() {
            lines.push(format!("Deciders: {}", adr.deciders));
        }
        if !adr.date.is_empty() {
            lines.push(format!("Date: {}", adr.date));
        }
        self.write_list(&lines);
    }

    fn write_decision_outcome(&mut self, outcome: &DecisionOutcome) {
        self.write_heading(2, "Decision Outcome");

        let mut line = format!("{CHOSEN_OPTION_PREFIX}\"{}", outcome.chosen_option);
        if outcome.explanation.trim().is_empty() {
            line.push('"');
        } else {
            line.push_str("\", because ");
            line.push_str(&outcome.explanation);
        }
        self.write_paragraph(&line);

        if !outcome.positive_consequences.is_empty() {
            self.write_heading(3, "Positive Consequences");
            self.write_list(&outcome.positive_consequences);
        }
        if !outcome.negative_consequences.is_empty() {
            self.write_heading(3, "Negative Consequences");
            self.write_list(&outcome.negative_consequences);
        }
    }

    fn write_option(&mut self, option: &ConsideredOption) {
        self.write_heading(3, &option.title);
        if !option.description.is_empty() {
            self.write_paragraph(&option.description);
        }
        let arguments = option
            .pros
            .iter()
            .map(|p| format!("Good, because {p}"))
            .chain(option.cons.iter().map(|c| format!("Bad, because {c}")));
        self.write_list(arguments);
    }

    fn write_heading(&mut self, depth: usize, text: &str) {
        self.ensure_blank_line();
        self.output.push_str(&"#".repeat(depth));
        self.output.push(' ');
        self.output.push_str(text);
        self.output.push('\n');
    }

    fn write_paragraph(&mut self, text: &str) {
        self.ensure_blank_line();
        self.output.push_str(text);
        self.output.push('\n');
    }

    /// Write `* item` lines; nothing at all for an empty list
    fn write_list<I>(&mut self, items: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut items = items.into_iter().peekable();
        if items.peek().is_none() {
            return;
        }
        self.ensure_blank_line();
        for item in items {
            self.output.push_str("* ");
            self.output.push_str(item.as_ref());
            self.output.push('\n');
        }
    }

    /// Separate blocks by one blank line
    fn ensure_blank_line(&mut self) {
        if !self.output.is_empty() {
            self.output.push('\n');
        }
    }
}
