//! Line Element Processor
//!
//! Turns one line of filter text into a [`LineElement`]. Malformed text never
//! fails: it produces an element carrying diagnostics. The only error is a
//! caller handing over more than one line.

use crate::core::diagnostics::{Messages, Severity, ValidationMessage};
use crate::core::position::Range;
use crate::error::ParseError;
use crate::parser::ast::{Block, ElementKind, Keyword, LineElement, Unknown};
use crate::parser::lexer::{Token, Tokenizer};
use crate::parser::rules;
use crate::vocabulary::Vocabulary;

/// Diagnostics collected while processing one line
#[derive(Debug)]
pub(crate) struct LineContext<'f> {
    file: Option<&'f str>,
    messages: Messages,
}

impl<'f> LineContext<'f> {
    fn new(file: Option<&'f str>) -> Self {
        Self {
            file,
            messages: Messages::new(),
        }
    }

    pub(crate) fn push(&mut self, message: ValidationMessage) {
        self.messages.push(message.with_file(self.file));
    }

    pub(crate) fn has_errors(&self) -> bool {
        self.messages.has_errors()
    }

    fn finish(self, range: Range, kind: ElementKind) -> LineElement {
        LineElement {
            range,
            invalid: self.messages.has_errors(),
            messages: self.messages,
            kind,
        }
    }
}

/// Process a single line at `row`.
pub fn process_line(
    line: &str,
    row: usize,
    vocabulary: &Vocabulary,
    file: Option<&str>,
) -> Result<LineElement, ParseError> {
    let mut tokenizer = Tokenizer::new(line, row)?;
    let mut context = LineContext::new(file);

    let kind = if tokenizer.is_empty() {
        ElementKind::Empty
    } else if tokenizer.is_commented() {
        ElementKind::Comment(tokenizer.parse_comment()?)
    } else {
        match tokenizer.next_word() {
            Some(keyword) => {
                process_keyword(keyword, &mut tokenizer, vocabulary, &mut context)?
            }
            None => {
                context.push(
                    ValidationMessage::error("Unreadable keyword", tokenizer.text_range())
                        .with_description("A line must start with Show, Hide or a rule keyword"),
                );
                ElementKind::Unknown(Unknown { keyword: None })
            }
        }
    };

    Ok(context.finish(tokenizer.line_range(), kind))
}

/// Process consecutive lines starting at `first_row`.
pub fn process_lines<'a, I>(
    lines: I,
    first_row: usize,
    vocabulary: &Vocabulary,
    file: Option<&str>,
) -> Result<Vec<LineElement>, ParseError>
where
    I: IntoIterator<Item = &'a str>,
{
    lines
        .into_iter()
        .enumerate()
        .map(|(offset, line)| process_line(line, first_row + offset, vocabulary, file))
        .collect()
}

fn process_keyword(
    keyword: Token<String>,
    tokenizer: &mut Tokenizer<'_>,
    vocabulary: &Vocabulary,
    context: &mut LineContext<'_>,
) -> Result<ElementKind, ParseError> {
    match Keyword::parse(&keyword.value) {
        Some(Keyword::Block(block_type)) => {
            let trailing_comment = check_trailing(
                tokenizer,
                context,
                Severity::Warning,
                format!("Text after {} is ignored", block_type.keyword()),
            )?;
            Ok(ElementKind::Block(Block {
                block_type,
                keyword: keyword.range,
                trailing_comment,
            }))
        }
        Some(Keyword::Rule(name)) => {
            let mut rule = rules::parse_rule(name, keyword.range, tokenizer, vocabulary, context);
            if !context.has_errors() {
                rule.trailing_comment = check_trailing(
                    tokenizer,
                    context,
                    Severity::Error,
                    format!("{} does not accept any further values", name.keyword()),
                )?;
            }
            Ok(ElementKind::Rule(rule))
        }
        None => {
            let mut message = ValidationMessage::error("Unknown filter keyword", keyword.range)
                .with_description(format!(
                    "\"{}\" is not Show, Hide or a rule keyword",
                    keyword.value
                ));
            if let Some(suggestion) = Keyword::suggest(&keyword.value) {
                message = message.with_solution(keyword.value.clone(), suggestion.text());
            }
            context.push(message);
            Ok(ElementKind::Unknown(Unknown {
                keyword: Some(keyword),
            }))
        }
    }
}

/// Report text left after a complete line and pick up a trailing comment.
fn check_trailing(
    tokenizer: &mut Tokenizer<'_>,
    context: &mut LineContext<'_>,
    severity: Severity,
    description: String,
) -> Result<Option<Token<String>>, ParseError> {
    if let Some(text) = tokenizer.next_trailing_text() {
        context.push(
            ValidationMessage::new(severity, "Unexpected trailing text", text.range)
                .with_description(description)
                .with_solution(text.value, ""),
        );
    }

    if tokenizer.is_commented() {
        return tokenizer.parse_comment().map(Some);
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::{BlockType, RuleName, RuleValue};

    fn process(line: &str) -> LineElement {
        process_line(line, 0, &Vocabulary::new(), None).expect("single line")
    }

    #[test]
    fn test_empty_and_comment_lines() {
        let empty = process("   \t");
        assert!(empty.is_empty());
        assert!(!empty.invalid);
        assert_eq!(empty.range, Range::on_row(0, 0, 4));

        let comment = process("  # Section: currency");
        assert!(comment.is_comment());
        assert!(comment.messages.is_empty());
    }

    #[test]
    fn test_unreadable_keyword() {
        let element = process("  \"Show\" ");
        assert!(element.is_unknown());
        assert!(element.invalid);
        assert_eq!(element.messages.errors.len(), 1);
        assert_eq!(element.messages.errors[0].excerpt, "Unreadable keyword");
        assert_eq!(element.messages.errors[0].range, Range::on_row(0, 2, 8));
    }

    #[test]
    fn test_unknown_keyword_suggests_casing() {
        let element = process("itemlevel 5");
        assert!(element.invalid);
        let error = &element.messages.errors[0];
        assert_eq!(error.excerpt, "Unknown filter keyword");
        assert_eq!(error.range, Range::on_row(0, 0, 9));
        let solution = error.solution.as_ref().expect("solution");
        assert_eq!(solution.replace_with, "ItemLevel");

        let element = process("Glow 5");
        assert!(element.messages.errors[0].solution.is_none());
    }

    #[test]
    fn test_block_trailing_text_is_a_warning() {
        let element = process("Show extra # comment");
        assert!(!element.invalid);
        assert_eq!(element.messages.warnings.len(), 1);
        assert_eq!(element.messages.warnings[0].range, Range::on_row(0, 5, 10));
        let block = element.block().expect("block");
        assert_eq!(block.block_type, BlockType::Show);
        assert_eq!(
            block.trailing_comment.as_ref().map(|c| c.value.as_str()),
            Some(" comment")
        );
    }

    #[test]
    fn test_rule_trailing_text_is_an_error() {
        let element = process("ItemLevel 5 extra");
        assert!(element.invalid);
        assert_eq!(element.messages.errors.len(), 1);
        assert_eq!(element.messages.errors[0].excerpt, "Unexpected trailing text");
        assert_eq!(element.messages.errors[0].range, Range::on_row(0, 12, 17));
    }

    #[test]
    fn test_trailing_check_skipped_on_invalid_line() {
        let element = process("ItemLevel 500 extra");
        assert_eq!(element.messages.errors.len(), 1);
        assert!(element.messages.errors[0].excerpt.contains("out of range"));
    }

    #[test]
    fn test_rule_with_trailing_comment() {
        let element = process("Quality >= 10 # gems");
        assert!(!element.invalid);
        let rule = element.rule().expect("rule");
        assert_eq!(rule.name, RuleName::Quality);
        assert!(matches!(rule.value, RuleValue::Number(ref n) if n.value == 10));
        assert!(rule.trailing_comment.is_some());
    }

    #[test]
    fn test_file_is_stamped_on_messages() {
        let element = process_line("Hide x", 3, &Vocabulary::new(), Some("a.filter")).expect("line");
        assert_eq!(element.messages.warnings[0].file.as_deref(), Some("a.filter"));
        assert_eq!(element.row(), 3);
    }

    #[test]
    fn test_multi_line_input_is_rejected() {
        assert!(process_line("Show\nHide", 0, &Vocabulary::new(), None).is_err());
    }

    #[test]
    fn test_process_lines_numbers_rows() {
        let elements =
            process_lines(["Show", "", "# c"], 4, &Vocabulary::new(), None).expect("lines");
        let rows: Vec<_> = elements.iter().map(|e| e.row()).collect();
        assert_eq!(rows, vec![4, 5, 6]);
    }
}
