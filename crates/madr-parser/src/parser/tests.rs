use super::*;

fn rules(node: &SyntaxNode) -> Vec<Rule> {
    node.children.iter().map(|c| c.rule).collect()
}

// ==========================================================================
// Title and preamble
// ==========================================================================

#[test]
fn test_title_only() {
    let tree = parse("# Use Postgres\n").unwrap();
    assert_eq!(tree.rule, Rule::Start);
    assert_eq!(rules(&tree), vec![Rule::Title]);
    assert_eq!(tree.children[0].text, "Use Postgres");
}

#[test]
fn test_leading_blank_lines_before_title() {
    let tree = parse("\n\n# T").unwrap();
    assert_eq!(tree.children[0].text, "T");
    assert_eq!(tree.children[0].span.line, 3);
}

#[test]
fn test_missing_title() {
    let err = parse("## Links\n").unwrap_err();
    assert_eq!(err, ParseError::MissingTitle { line: 1 });
}

#[test]
fn test_empty_document_is_missing_title() {
    assert!(matches!(parse(""), Err(ParseError::MissingTitle { .. })));
}

#[test]
fn test_preamble_fields() {
    let tree = parse(
        "# T\n\n* Status: accepted\n* Deciders: Alice, Bob\n* Date: 2024-03-01\n\nTechnical Story: #42\n",
    )
    .unwrap();
    assert_eq!(
        rules(&tree),
        vec![
            Rule::Title,
            Rule::Status,
            Rule::Deciders,
            Rule::Date,
            Rule::TechnicalStory
        ]
    );
    assert_eq!(tree.children[1].text, "accepted");
    assert_eq!(tree.children[2].text, "Alice, Bob");
    assert_eq!(tree.children[3].text, "2024-03-01");
    assert_eq!(tree.children[4].text, "#42");
}

#[test]
fn test_preamble_template_comments_removed() {
    let tree = parse("# T\n\n* Status: proposed <!-- optional -->\n").unwrap();
    assert_eq!(tree.children[1].text, "proposed");
}

#[test]
fn test_preamble_labels_case_insensitive() {
    let tree = parse("# T\n* status: done\n").unwrap();
    assert_eq!(tree.children[1].rule, Rule::Status);
    assert_eq!(tree.children[1].text, "done");
}

#[test]
fn test_preamble_rejects_free_text() {
    let err = parse("# T\n\nSome prose\n").unwrap_err();
    assert_eq!(
        err,
        ParseError::UnexpectedContent {
            found: "Some prose".to_string(),
            context: "preamble".to_string(),
            line: 3,
        }
    );
}

#[test]
fn test_preamble_rejects_duplicate_field() {
    let err = parse("# T\n* Status: a\n* Status: b\n").unwrap_err();
    assert!(matches!(err, ParseError::UnexpectedContent { line: 3, .. }));
}

// ==========================================================================
// Section order
// ==========================================================================

#[test]
fn test_unknown_section_heading() {
    let err = parse("# T\n\n## Appendix\n").unwrap_err();
    assert_eq!(
        err,
        ParseError::UnexpectedHeading {
            heading: "## Appendix".to_string(),
            line: 3,
        }
    );
}

#[test]
fn test_sections_out_of_order() {
    let err = parse("# T\n\n## Links\n\n* a\n\n## Decision Drivers\n\n* b\n").unwrap_err();
    assert_eq!(
        err,
        ParseError::SectionOutOfOrder {
            section: "Decision Drivers".to_string(),
            line: 7,
        }
    );
}

#[test]
fn test_duplicate_section() {
    let err = parse("# T\n## Links\n* a\n## Links\n* b\n").unwrap_err();
    assert!(matches!(err, ParseError::SectionOutOfOrder { line: 4, .. }));
}

#[test]
fn test_second_title_rejected() {
    let err = parse("# T\n\n# Again\n").unwrap_err();
    assert!(matches!(err, ParseError::UnexpectedHeading { line: 3, .. }));
}

#[test]
fn test_section_headings_case_insensitive() {
    let tree = parse("# T\n\n## decision drivers\n\n* fast\n").unwrap();
    assert_eq!(tree.children[1].rule, Rule::DecisionDrivers);
}

// ==========================================================================
// Context and lists
// ==========================================================================

#[test]
fn test_context_keeps_paragraphs() {
    let tree =
        parse("# T\n\n## Context and Problem Statement\n\nFirst line\nsecond line\n\nNext paragraph\n\n")
            .unwrap();
    let context = &tree.children[1];
    assert_eq!(context.rule, Rule::ContextAndProblemStatement);
    assert_eq!(context.text, "First line\nsecond line\n\nNext paragraph");
}

#[test]
fn test_empty_context() {
    let tree = parse("# T\n\n## Context and Problem Statement\n\n## Links\n").unwrap();
    assert_eq!(tree.children[1].text, "");
    assert_eq!(tree.children[2].rule, Rule::Links);
}

#[test]
fn test_context_rejects_subheading() {
    let err = parse("# T\n\n## Context and Problem Statement\n\ntext\n\n### Detail\n").unwrap_err();
    assert!(matches!(err, ParseError::UnexpectedHeading { line: 7, .. }));
}

#[test]
fn test_list_section() {
    let tree = parse("# T\n\n## Decision Drivers\n\n* fast\n* cheap\n").unwrap();
    let drivers = &tree.children[1];
    assert_eq!(rules(drivers), vec![Rule::List]);
    assert_eq!(drivers.text_lines(), vec!["fast", "cheap"]);
}

#[test]
fn test_list_item_continuation() {
    let tree = parse("# T\n\n## Links\n\n* a long\n  link text\n* b\n").unwrap();
    assert_eq!(tree.children[1].text_lines(), vec!["a long link text", "b"]);
}

#[test]
fn test_list_rejects_paragraph() {
    let err = parse("# T\n\n## Considered Options\n\n* A\n\nStray paragraph\n").unwrap_err();
    assert_eq!(
        err,
        ParseError::UnexpectedContent {
            found: "Stray paragraph".to_string(),
            context: "Considered Options".to_string(),
            line: 7,
        }
    );
}

#[test]
fn test_empty_list_section() {
    let tree = parse("# T\n\n## Links\n").unwrap();
    let links = &tree.children[1];
    assert_eq!(rules(links), vec![Rule::List]);
    assert!(links.text_lines().is_empty());
}

// ==========================================================================
// Decision outcome
// ==========================================================================

#[test]
fn test_chosen_option_and_explanation() {
    let tree = parse(
        "# T\n\n## Decision Outcome\n\nChosen option: \"A\", because it is fast\n\n### Positive Consequences\n\n* speed\n\n### Negative Consequences\n\n* cost\n",
    )
    .unwrap();
    let outcome = &tree.children[1];
    assert_eq!(
        rules(outcome),
        vec![
            Rule::ChosenOptionAndExplanation,
            Rule::PositiveConsequences,
            Rule::NegativeConsequences
        ]
    );
    assert_eq!(
        outcome.children[0].text,
        "Chosen option: \"A\", because it is fast"
    );
    assert_eq!(outcome.children[1].text_lines(), vec!["speed"]);
    assert_eq!(outcome.children[2].text_lines(), vec!["cost"]);
}

#[test]
fn test_multi_line_explanation() {
    let tree =
        parse("# T\n\n## Decision Outcome\n\nChosen option: \"A\", because\nit is fast.\n").unwrap();
    assert_eq!(
        tree.children[1].children[0].text,
        "Chosen option: \"A\", because\nit is fast."
    );
}

#[test]
fn test_bare_chosen_option() {
    let tree = parse("# T\n\n## Decision Outcome\n\n\"Postgres\"\n").unwrap();
    let chosen = &tree.children[1].children[0];
    assert_eq!(chosen.rule, Rule::ChosenOption);
    assert_eq!(chosen.text, "Postgres");
}

#[test]
fn test_outcome_without_prefix_left_to_builder() {
    let tree = parse("# T\n\n## Decision Outcome\n\nWe picked A.\n").unwrap();
    let chosen = &tree.children[1].children[0];
    assert_eq!(chosen.rule, Rule::ChosenOptionAndExplanation);
    assert_eq!(chosen.text, "We picked A.");
}

#[test]
fn test_quoted_outcome_with_because_is_not_bare() {
    let tree = parse("# T\n\n## Decision Outcome\n\n\"A, because B\"\n").unwrap();
    let chosen = &tree.children[1].children[0];
    assert_eq!(chosen.rule, Rule::ChosenOptionAndExplanation);
    assert_eq!(chosen.text, "\"A, because B\"");
}

#[test]
fn test_placeholder_argument_skipped() {
    let tree = parse(
        "# T\n\n## Pros and Cons of the Options\n\n### A\n\n* Good, because x\n* … <!-- numbers of pros and cons can vary -->\n* Bad, because y\n\n### B\n\n* ...\n",
    )
    .unwrap();
    let section = &tree.children[1];
    assert_eq!(
        rules(section),
        vec![Rule::OptionTitle, Rule::Prolist, Rule::Conlist, Rule::OptionTitle]
    );
    assert_eq!(section.children[1].text_lines(), vec!["x"]);
    assert_eq!(section.children[2].text_lines(), vec!["y"]);
}

#[test]
fn test_consequences_out_of_order() {
    let err = parse(
        "# T\n\n## Decision Outcome\n\nChosen option: \"A\"\n\n### Negative Consequences\n\n* x\n\n### Positive Consequences\n\n* y\n",
    )
    .unwrap_err();
    assert!(matches!(err, ParseError::SectionOutOfOrder { line: 11, .. }));
}

#[test]
fn test_unknown_outcome_subheading() {
    let err =
        parse("# T\n\n## Decision Outcome\n\nChosen option: \"A\"\n\n### Confirmation\n").unwrap_err();
    assert_eq!(
        err,
        ParseError::UnexpectedHeading {
            heading: "### Confirmation".to_string(),
            line: 7,
        }
    );
}

// ==========================================================================
// Pros and cons
// ==========================================================================

#[test]
fn test_option_blocks_are_flat_siblings() {
    let tree = parse(
        "# T\n\n## Pros and Cons of the Options\n\n### A\n\nAbout A.\n\n* Good, because fast\n* Good, because cheap\n* Bad, because new\n\n### B\n\n* Bad, because slow\n",
    )
    .unwrap();
    let block = &tree.children[1];
    assert_eq!(block.rule, Rule::ProsAndConsOfOptions);
    assert_eq!(
        rules(block),
        vec![
            Rule::OptionTitle,
            Rule::OptionDescription,
            Rule::Prolist,
            Rule::Conlist,
            Rule::OptionTitle,
            Rule::Conlist
        ]
    );
    assert_eq!(block.children[0].text, "A");
    assert_eq!(block.children[1].text, "About A.");
    assert_eq!(block.children[2].text_lines(), vec!["fast", "cheap"]);
    assert_eq!(block.children[3].text_lines(), vec!["new"]);
    assert_eq!(block.children[5].text_lines(), vec!["slow"]);
}

#[test]
fn test_interleaved_arguments_make_separate_lists() {
    let tree = parse(
        "# T\n\n## Pros and Cons of the Options\n\n### A\n\n* Good, because a\n* Bad, because b\n* Good, because c\n",
    )
    .unwrap();
    assert_eq!(
        rules(&tree.children[1]),
        vec![
            Rule::OptionTitle,
            Rule::Prolist,
            Rule::Conlist,
            Rule::Prolist
        ]
    );
}

#[test]
fn test_argument_continuation_line() {
    let tree = parse(
        "# T\n\n## Pros and Cons of the Options\n\n### A\n\n* Good, because it is\n  really fast\n",
    )
    .unwrap();
    assert_eq!(
        tree.children[1].children[1].text_lines(),
        vec!["it is really fast"]
    );
}

#[test]
fn test_neutral_argument_rejected() {
    let err = parse(
        "# T\n\n## Pros and Cons of the Options\n\n### A\n\n* Neutral, because meh\n",
    )
    .unwrap_err();
    assert_eq!(
        err,
        ParseError::UnexpectedContent {
            found: "* Neutral, because meh".to_string(),
            context: "option arguments".to_string(),
            line: 7,
        }
    );
}

#[test]
fn test_paragraph_after_arguments_rejected() {
    let err = parse(
        "# T\n\n## Pros and Cons of the Options\n\n### A\n\n* Good, because x\n\nLate text\n",
    )
    .unwrap_err();
    assert!(matches!(err, ParseError::UnexpectedContent { line: 9, .. }));
}

#[test]
fn test_content_before_first_option_rejected() {
    let err = parse("# T\n\n## Pros and Cons of the Options\n\nIntro\n").unwrap_err();
    assert!(matches!(
        err,
        ParseError::UnexpectedContent { ref context, .. } if context == "Pros and Cons of the Options"
    ));
}

#[test]
fn test_option_without_details() {
    let tree = parse("# T\n\n## Pros and Cons of the Options\n\n### A\n\n### B\n").unwrap();
    assert_eq!(
        rules(&tree.children[1]),
        vec![Rule::OptionTitle, Rule::OptionTitle]
    );
}

#[test]
fn test_level_four_heading_rejected() {
    let err = parse("# T\n\n## Pros and Cons of the Options\n\n### A\n\n#### Deep\n").unwrap_err();
    assert!(matches!(err, ParseError::UnexpectedHeading { line: 7, .. }));
}

// ==========================================================================
// Whole document
// ==========================================================================

#[test]
fn test_outline_snapshot() {
    let source = "# Use Postgres\n\n* Status: accepted\n\n## Considered Options\n\n* Postgres\n* MySQL\n\n## Decision Outcome\n\nChosen option: \"Postgres\"\n\n## Pros and Cons of the Options\n\n### Postgres\n\n* Good, because of JSONB\n";
    let tree = parse(source).unwrap();
    insta::assert_snapshot!(tree.outline(), @r#"
    start
      title "Use Postgres"
      status "accepted"
      consideredOptions
        list
          textLine "Postgres"
          textLine "MySQL"
      decisionOutcome
        chosenOptionAndExplanation "Chosen option: \"Postgres\""
      prosAndConsOfOptions
        optionTitle "Postgres"
        prolist
          textLine "of JSONB"
    "#);
}

#[test]
fn test_container_text_is_source_slice() {
    let tree = parse("# T\n\n## Links\n\n* a\n* b\n").unwrap();
    assert_eq!(tree.children[1].text, "## Links\n\n* a\n* b");
    assert_eq!(tree.children[1].children[0].text, "* a\n* b");
    assert_eq!(tree.text, "# T\n\n## Links\n\n* a\n* b");
}
