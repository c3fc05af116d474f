//! Filter Line Tokenizer
//!
//! On-demand tokenization of a single filter line. Each `next_*` call tries to
//! match one token kind at the front of the remaining text; a miss returns
//! `None` and leaves the tokenizer untouched, so callers can try several token
//! shapes against the same text without backtracking.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::position::{Range, ShiftRanges};
use crate::error::ParseError;

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-+]?[0-9]+").expect("valid number pattern"));

static BOOLEAN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(?i:"(true|false)"|(true|false))"#).expect("valid boolean pattern")
});

static OPERATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:<=|>=|=|<|>)").expect("valid operator pattern"));

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\p{Alphabetic}+").expect("valid word pattern"));

static STRING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r##"^(?:"([^"]*)"|([^\s"#]+))"##).expect("valid string pattern")
});

/// A matched token and where it was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<T> {
    pub value: T,
    pub range: Range,
}

impl<T> Token<T> {
    pub fn new(value: T, range: Range) -> Self {
        Self { value, range }
    }
}

impl<T> ShiftRanges for Token<T> {
    fn shift_rows(&mut self, delta: isize) {
        self.range.shift_rows(delta);
    }
}

/// Comparison operators accepted by filter rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Equal,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

impl Operator {
    fn from_text(text: &str) -> Option<Self> {
        match text {
            "=" => Some(Operator::Equal),
            "<" => Some(Operator::Less),
            "<=" => Some(Operator::LessOrEqual),
            ">" => Some(Operator::Greater),
            ">=" => Some(Operator::GreaterOrEqual),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equal => "=",
            Operator::Less => "<",
            Operator::LessOrEqual => "<=",
            Operator::Greater => ">",
            Operator::GreaterOrEqual => ">=",
        }
    }
}

/// Cursor over the remaining text of one line.
///
/// Columns are counted in `char`s; `offset` is the matching byte offset into
/// `line` and only ever lands on char boundaries.
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    line: &'a str,
    row: usize,
    offset: usize,
    current_index: usize,
    original_length: usize,
    text_start_index: usize,
    text_end_index: usize,
    empty: bool,
}

impl<'a> Tokenizer<'a> {
    /// Create a tokenizer for `line` at `row`. Fails if `line` holds a line
    /// break: splitting lines is the caller's job.
    pub fn new(line: &'a str, row: usize) -> Result<Self, ParseError> {
        if line.contains(['\n', '\r']) {
            return Err(ParseError::MultiLineInput { row });
        }

        let original_length = line.chars().count();
        let mut non_whitespace = line
            .chars()
            .enumerate()
            .filter(|(_, c)| !c.is_whitespace())
            .map(|(index, _)| index);
        let first = non_whitespace.next();
        let last = non_whitespace.last().or(first);

        let (text_start_index, text_end_index) = match (first, last) {
            (Some(first), Some(last)) => (first, last + 1),
            _ => (0, 0),
        };

        Ok(Self {
            line,
            row,
            offset: 0,
            current_index: 0,
            original_length,
            text_start_index,
            text_end_index,
            empty: first.is_none(),
        })
    }

    pub fn row(&self) -> usize {
        self.row
    }

    /// Column of the first unconsumed character.
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Length of the whole line in characters.
    pub fn original_length(&self) -> usize {
        self.original_length
    }

    /// Column of the first non-whitespace character (0 for a blank line).
    pub fn text_start_index(&self) -> usize {
        self.text_start_index
    }

    /// Column one past the last non-whitespace character (0 for a blank line).
    pub fn text_end_index(&self) -> usize {
        self.text_end_index
    }

    /// The unconsumed part of the line.
    pub fn remaining(&self) -> &'a str {
        &self.line[self.offset..]
    }

    /// Range of the whole line.
    pub fn line_range(&self) -> Range {
        Range::on_row(self.row, 0, self.original_length)
    }

    /// Range from the first to the last non-whitespace character.
    pub fn text_range(&self) -> Range {
        Range::on_row(self.row, self.text_start_index, self.text_end_index)
    }

    /// Source text covered by `range` on this line.
    pub fn text_of(&self, range: Range) -> String {
        self.line
            .chars()
            .skip(range.start.column)
            .take(range.len())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn is_commented(&self) -> bool {
        self.remaining().trim_start().starts_with('#')
    }

    pub fn is_ignored(&self) -> bool {
        self.is_empty() || self.is_commented()
    }

    pub fn next_number(&mut self) -> Option<Token<i64>> {
        let (leading, text) = self.split_leading();
        let matched = NUMBER_RE.find(text)?.as_str();
        if !at_value_boundary(&text[matched.len()..]) {
            return None;
        }

        let value = matched.parse::<i64>().unwrap_or(if matched.starts_with('-') {
            i64::MIN
        } else {
            i64::MAX
        });
        let range = self.consume(leading, matched);
        Some(Token::new(value, range))
    }

    pub fn next_boolean(&mut self) -> Option<Token<bool>> {
        let (leading, text) = self.split_leading();
        let captures = BOOLEAN_RE.captures(text)?;
        let matched = captures.get(0)?.as_str();
        if !at_value_boundary(&text[matched.len()..]) {
            return None;
        }

        let word = captures.get(1).or_else(|| captures.get(2))?.as_str();
        let value = word.eq_ignore_ascii_case("true");
        let range = self.consume(leading, matched);
        Some(Token::new(value, range))
    }

    pub fn next_operator(&mut self) -> Option<Token<Operator>> {
        let (leading, text) = self.split_leading();
        // Operators must stand alone: `ItemLevel>=5` or `>=5` is not an operator.
        if leading.is_empty() && self.current_index > 0 {
            return None;
        }
        let matched = OPERATOR_RE.find(text)?.as_str();
        let after = &text[matched.len()..];
        if !(after.is_empty() || after.starts_with(char::is_whitespace)) {
            return None;
        }

        let operator = Operator::from_text(matched)?;
        let range = self.consume(leading, matched);
        Some(Token::new(operator, range))
    }

    pub fn next_word(&mut self) -> Option<Token<String>> {
        let (leading, text) = self.split_leading();
        let matched = WORD_RE.find(text)?.as_str();
        let range = self.consume(leading, matched);
        Some(Token::new(matched.to_string(), range))
    }

    /// A double-quoted string (quotes stripped) or a bare token without
    /// quotes, whitespace or `#`.
    pub fn next_string(&mut self) -> Option<Token<String>> {
        let (leading, text) = self.split_leading();
        let captures = STRING_RE.captures(text)?;
        let matched = captures.get(0)?.as_str();
        let value = captures.get(1).or_else(|| captures.get(2))?.as_str();
        let value = value.to_string();
        let range = self.consume(leading, matched);
        Some(Token::new(value, range))
    }

    /// Consume a comment running to the end of the line. The value is the
    /// text after `#`; the range starts at the `#` and stops before any
    /// trailing whitespace.
    pub fn parse_comment(&mut self) -> Result<Token<String>, ParseError> {
        if !self.is_commented() {
            return Err(ParseError::NoComment {
                row: self.row,
                column: self.current_index,
            });
        }

        let (leading, text) = self.split_leading();
        let matched = text.trim_end();
        let value = matched[1..].to_string();
        let range = self.consume(leading, matched);
        Ok(Token::new(value, range))
    }

    /// Consume whatever non-whitespace text remains before a trailing comment
    /// or the end of the line.
    pub fn next_trailing_text(&mut self) -> Option<Token<String>> {
        let (leading, text) = self.split_leading();
        let before_comment = match text.find('#') {
            Some(index) => &text[..index],
            None => text,
        };
        let matched = before_comment.trim_end();
        if matched.is_empty() {
            return None;
        }

        let range = self.consume(leading, matched);
        Some(Token::new(matched.to_string(), range))
    }

    fn split_leading(&self) -> (&'a str, &'a str) {
        let rest = self.remaining();
        let text = rest.trim_start();
        (&rest[..rest.len() - text.len()], text)
    }

    fn consume(&mut self, leading: &str, matched: &str) -> Range {
        let start = self.current_index + leading.chars().count();
        let end = start + matched.chars().count();

        self.offset += leading.len() + matched.len();
        self.current_index = end;
        self.empty = self.remaining().trim_start().is_empty();

        Range::on_row(self.row, start, end)
    }
}

/// Numbers and booleans must be followed by whitespace, a comment or the end
/// of the line.
fn at_value_boundary(after: &str) -> bool {
    after.is_empty() || after.starts_with(char::is_whitespace) || after.starts_with('#')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenizer(line: &str) -> Tokenizer<'_> {
        Tokenizer::new(line, 0).expect("single line")
    }

    #[test]
    fn test_rejects_line_breaks() {
        assert_eq!(
            Tokenizer::new("Show\nHide", 4).unwrap_err(),
            ParseError::MultiLineInput { row: 4 }
        );
        assert!(Tokenizer::new("Show\r", 0).is_err());
    }

    #[test]
    fn test_text_bounds() {
        let t = tokenizer("\tItemLevel 5  ");
        assert_eq!(t.original_length(), 14);
        assert_eq!(t.text_start_index(), 1);
        assert_eq!(t.text_end_index(), 12);
        assert!(!t.is_empty());

        let blank = tokenizer("   ");
        assert_eq!(blank.text_start_index(), 0);
        assert_eq!(blank.text_end_index(), 0);
        assert!(blank.is_empty());
        assert!(blank.is_ignored());
        assert!(!blank.is_commented());

        assert!(tokenizer("").is_empty());
    }

    #[test]
    fn test_next_number_advances_past_whitespace_and_digits() {
        let mut t = tokenizer("  -12 \"Boots\"");
        let number = t.next_number().expect("number");
        assert_eq!(number.value, -12);
        assert_eq!(number.range, Range::on_row(0, 2, 5));
        assert_eq!(t.current_index(), 5);

        // The following string is untouched by the number match.
        let string = t.next_string().expect("string");
        assert_eq!(string.value, "Boots");
        assert_eq!(string.range, Range::on_row(0, 6, 13));
        assert!(t.is_empty());
    }

    #[test]
    fn test_number_requires_boundary() {
        let mut t = tokenizer("12abc");
        assert!(t.next_number().is_none());
        assert_eq!(t.current_index(), 0);

        let mut t = tokenizer("12#comment");
        assert_eq!(t.next_number().map(|n| n.value), Some(12));
        assert!(t.is_commented());
    }

    #[test]
    fn test_number_overflow_saturates() {
        let mut t = tokenizer("99999999999999999999999");
        assert_eq!(t.next_number().map(|n| n.value), Some(i64::MAX));
    }

    #[test]
    fn test_mismatch_does_not_mutate() {
        let mut t = tokenizer("  \"Rings\"");
        assert!(t.next_number().is_none());
        assert!(t.next_operator().is_none());
        assert!(t.next_word().is_none());
        assert!(t.next_boolean().is_none());
        assert_eq!(t.current_index(), 0);
        assert_eq!(t.remaining(), "  \"Rings\"");
        assert_eq!(t.next_string().map(|s| s.value), Some("Rings".to_string()));
    }

    #[test]
    fn test_next_boolean() {
        let mut t = tokenizer("TRUE \"false\" \"True");
        assert_eq!(t.next_boolean().map(|b| b.value), Some(true));
        let quoted = t.next_boolean().expect("quoted boolean");
        assert!(!quoted.value);
        assert_eq!(quoted.range, Range::on_row(0, 5, 12));
        // Unbalanced quote is not a boolean.
        assert!(t.next_boolean().is_none());
    }

    #[test]
    fn test_next_operator_must_stand_alone() {
        let mut t = tokenizer(">= 5");
        let op = t.next_operator().expect("operator");
        assert_eq!(op.value, Operator::GreaterOrEqual);
        assert_eq!(op.range, Range::on_row(0, 0, 2));

        assert!(tokenizer(">=5").next_operator().is_none());
        assert!(tokenizer("<== 5").next_operator().is_none());

        let mut t = tokenizer("ItemLevel>= 5");
        t.next_word().expect("keyword");
        assert!(t.next_operator().is_none());

        let mut t = tokenizer("ItemLevel < 5");
        t.next_word().expect("keyword");
        assert_eq!(t.next_operator().map(|o| o.value), Some(Operator::Less));
    }

    #[test]
    fn test_next_word_accepts_non_ascii_letters() {
        let mut t = tokenizer("Größe 5");
        let word = t.next_word().expect("word");
        assert_eq!(word.value, "Größe");
        assert_eq!(word.range, Range::on_row(0, 0, 5));
        assert_eq!(t.current_index(), 5);
    }

    #[test]
    fn test_next_word_stops_at_digits_and_quotes() {
        let mut t = tokenizer("Sockets5");
        assert_eq!(t.next_word().map(|w| w.value), Some("Sockets".to_string()));
        let mut t = tokenizer("Class\"Boots\"");
        assert_eq!(t.next_word().map(|w| w.value), Some("Class".to_string()));
        assert!(tokenizer("\"Show\"").next_word().is_none());
        assert!(tokenizer("5").next_word().is_none());
    }

    #[test]
    fn test_next_string_forms() {
        let mut t = tokenizer(r#""Two Hand Swords" Rings 'Amulets'"#);
        let quoted = t.next_string().expect("quoted");
        assert_eq!(quoted.value, "Two Hand Swords");
        assert_eq!(quoted.range, Range::on_row(0, 0, 17));

        assert_eq!(t.next_string().map(|s| s.value), Some("Rings".to_string()));
        // Single quotes are just part of a bare token.
        assert_eq!(t.next_string().map(|s| s.value), Some("'Amulets'".to_string()));
        assert!(t.next_string().is_none());

        let mut t = tokenizer("\"unterminated");
        assert!(t.next_string().is_none());
        assert_eq!(t.current_index(), 0);

        let mut t = tokenizer(r#""a >= 5""#);
        assert_eq!(t.next_string().map(|s| s.value), Some("a >= 5".to_string()));
    }

    #[test]
    fn test_bare_string_stops_at_comment_marker() {
        let mut t = tokenizer("Boots#c");
        let bare = t.next_string().expect("bare token");
        assert_eq!(bare.value, "Boots");
        assert_eq!(bare.range, Range::on_row(0, 0, 5));
        assert!(t.is_commented());

        let mut t = tokenizer("\"Boots#c\"");
        assert_eq!(t.next_string().map(|s| s.value), Some("Boots#c".to_string()));
    }

    #[test]
    fn test_comment_detection_and_parse() {
        let mut t = tokenizer("   # Currency  ");
        assert!(t.is_commented());
        assert!(t.is_ignored());
        assert!(!t.is_empty());

        let comment = t.parse_comment().expect("comment");
        assert_eq!(comment.value, " Currency");
        assert_eq!(comment.range, Range::on_row(0, 3, 13));
        assert!(t.is_empty());

        assert!(tokenizer("#").is_commented());
        assert!(tokenizer("#text").is_commented());
    }

    #[test]
    fn test_parse_comment_without_comment_is_an_error() {
        let mut t = tokenizer("Show");
        assert_eq!(
            t.parse_comment().unwrap_err(),
            ParseError::NoComment { row: 0, column: 0 }
        );
    }

    #[test]
    fn test_trailing_text_stops_at_comment() {
        let mut t = tokenizer("Show  extra words  # note");
        t.next_word().expect("keyword");
        let trailing = t.next_trailing_text().expect("trailing text");
        assert_eq!(trailing.value, "extra words");
        assert_eq!(trailing.range, Range::on_row(0, 6, 17));
        assert!(t.is_commented());
        assert!(t.next_trailing_text().is_none());
    }

    #[test]
    fn test_empty_reevaluated_after_each_consumption() {
        let mut t = tokenizer("SetFontSize 40   ");
        t.next_word().expect("keyword");
        assert!(!t.is_empty());
        t.next_number().expect("number");
        assert!(t.is_empty());
        assert!(t.is_ignored());
    }

    #[test]
    fn test_text_of_uses_char_columns() {
        let mut t = tokenizer("Class \"Größe\" +07");
        t.next_word().expect("keyword");
        let string = t.next_string().expect("string");
        assert_eq!(t.text_of(string.range), "\"Größe\"");
        let number = t.next_number().expect("number");
        assert_eq!(number.value, 7);
        assert_eq!(t.text_of(number.range), "+07");
    }

    #[test]
    fn test_ranges_use_row() {
        let mut t = Tokenizer::new("Hide", 7).expect("single line");
        let word = t.next_word().expect("word");
        assert_eq!(word.range, Range::on_row(7, 0, 4));
        assert_eq!(t.line_range(), Range::on_row(7, 0, 4));
    }
}
