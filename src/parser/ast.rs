//! Line Elements
//!
//! Typed representation of one processed filter line. Lines are independent:
//! there is no document tree, only an array of these elements aligned with the
//! text buffer's lines.

use crate::core::diagnostics::Messages;
use crate::core::position::{Range, ShiftRanges};
use crate::parser::lexer::{Operator, Token};

/// One processed line with its diagnostics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineElement {
    /// Span of the whole line
    pub range: Range,
    /// Set iff `messages` holds at least one error
    pub invalid: bool,
    pub messages: Messages,
    pub kind: ElementKind,
}

/// What a line turned out to be
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementKind {
    Block(Block),
    Rule(Rule),
    /// A comment-only line; the token value excludes the leading `#`
    Comment(Token<String>),
    Empty,
    Unknown(Unknown),
}

/// `Show` or `Hide`, opening a group of rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub block_type: BlockType,
    pub keyword: Range,
    pub trailing_comment: Option<Token<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockType {
    Show,
    Hide,
}

impl BlockType {
    pub fn keyword(&self) -> &'static str {
        match self {
            BlockType::Show => "Show",
            BlockType::Hide => "Hide",
        }
    }
}

/// A line whose keyword could not be read or is not part of the language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unknown {
    /// `None` when the line does not start with a word at all
    pub keyword: Option<Token<String>>,
}

/// Whether a rule is a condition or an effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleType {
    Filter,
    Action,
}

/// Every rule keyword of the language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleName {
    ItemLevel,
    DropLevel,
    Quality,
    Rarity,
    Class,
    BaseType,
    Sockets,
    LinkedSockets,
    SocketGroup,
    Height,
    Width,
    Identified,
    Corrupted,
    SetBorderColor,
    SetTextColor,
    SetBackgroundColor,
    PlayAlertSound,
    SetFontSize,
}

impl RuleName {
    pub const ALL: [RuleName; 18] = [
        RuleName::ItemLevel,
        RuleName::DropLevel,
        RuleName::Quality,
        RuleName::Rarity,
        RuleName::Class,
        RuleName::BaseType,
        RuleName::Sockets,
        RuleName::LinkedSockets,
        RuleName::SocketGroup,
        RuleName::Height,
        RuleName::Width,
        RuleName::Identified,
        RuleName::Corrupted,
        RuleName::SetBorderColor,
        RuleName::SetTextColor,
        RuleName::SetBackgroundColor,
        RuleName::PlayAlertSound,
        RuleName::SetFontSize,
    ];

    pub fn keyword(&self) -> &'static str {
        match self {
            RuleName::ItemLevel => "ItemLevel",
            RuleName::DropLevel => "DropLevel",
            RuleName::Quality => "Quality",
            RuleName::Rarity => "Rarity",
            RuleName::Class => "Class",
            RuleName::BaseType => "BaseType",
            RuleName::Sockets => "Sockets",
            RuleName::LinkedSockets => "LinkedSockets",
            RuleName::SocketGroup => "SocketGroup",
            RuleName::Height => "Height",
            RuleName::Width => "Width",
            RuleName::Identified => "Identified",
            RuleName::Corrupted => "Corrupted",
            RuleName::SetBorderColor => "SetBorderColor",
            RuleName::SetTextColor => "SetTextColor",
            RuleName::SetBackgroundColor => "SetBackgroundColor",
            RuleName::PlayAlertSound => "PlayAlertSound",
            RuleName::SetFontSize => "SetFontSize",
        }
    }

    pub fn rule_type(&self) -> RuleType {
        match self {
            RuleName::SetBorderColor
            | RuleName::SetTextColor
            | RuleName::SetBackgroundColor
            | RuleName::PlayAlertSound
            | RuleName::SetFontSize => RuleType::Action,
            _ => RuleType::Filter,
        }
    }

    /// Short description of the values a rule takes, used for hover text
    pub fn value_summary(&self) -> &'static str {
        match self {
            RuleName::ItemLevel => "[operator] level (0-100)",
            RuleName::DropLevel => "[operator] level (0-100)",
            RuleName::Quality => "[operator] quality (0-20)",
            RuleName::Rarity => "[operator] Normal | Magic | Rare | Unique",
            RuleName::Class => "one or more item classes",
            RuleName::BaseType => "one or more base types",
            RuleName::Sockets => "[operator] socket count (0-6)",
            RuleName::LinkedSockets => "[operator] link count (0 or 2-6)",
            RuleName::SocketGroup => "socket colors R, G, B, W (1-6 letters)",
            RuleName::Height => "[operator] height (1-4)",
            RuleName::Width => "[operator] width (1-2)",
            RuleName::Identified => "True | False",
            RuleName::Corrupted => "True | False",
            RuleName::SetBorderColor
            | RuleName::SetTextColor
            | RuleName::SetBackgroundColor => "red green blue [alpha] (0-255 each)",
            RuleName::PlayAlertSound => "sound id (1-16) or orb, [volume] (0-300)",
            RuleName::SetFontSize => "font size (18-45)",
        }
    }
}

/// The first word of a line, once recognized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Block(BlockType),
    Rule(RuleName),
}

impl Keyword {
    /// Case-sensitive lookup, as the game itself performs it.
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "Show" => Some(Keyword::Block(BlockType::Show)),
            "Hide" => Some(Keyword::Block(BlockType::Hide)),
            _ => RuleName::ALL
                .iter()
                .find(|name| name.keyword() == text)
                .map(|name| Keyword::Rule(*name)),
        }
    }

    /// Keyword that differs from `text` only by case, if any.
    pub fn suggest(text: &str) -> Option<Self> {
        [BlockType::Show, BlockType::Hide]
            .iter()
            .map(|block| Keyword::Block(*block))
            .chain(RuleName::ALL.iter().map(|name| Keyword::Rule(*name)))
            .find(|keyword| keyword.text().eq_ignore_ascii_case(text))
    }

    pub fn text(&self) -> &'static str {
        match self {
            Keyword::Block(block) => block.keyword(),
            Keyword::Rule(name) => name.keyword(),
        }
    }
}

/// A filter or action rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub name: RuleName,
    pub keyword: Range,
    pub operator: Option<Token<Operator>>,
    pub value: RuleValue,
    pub trailing_comment: Option<Token<String>>,
}

impl Rule {
    pub fn rule_type(&self) -> RuleType {
        self.name.rule_type()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rarity {
    Normal,
    Magic,
    Rare,
    Unique,
}

impl Rarity {
    pub fn from_text(text: &str) -> Option<Self> {
        match text {
            "Normal" => Some(Rarity::Normal),
            "Magic" => Some(Rarity::Magic),
            "Rare" => Some(Rarity::Rare),
            "Unique" => Some(Rarity::Unique),
            _ => None,
        }
    }
}

/// RGBA color of a `Set*Color` action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Color {
    pub red: Token<u8>,
    pub green: Token<u8>,
    pub blue: Token<u8>,
    pub alpha: Option<Token<u8>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundId {
    Orb,
    Numbered(u8),
}

impl SoundId {
    /// Key of the sound in the vocabulary's sound list
    pub fn vocabulary_key(&self) -> String {
        match self {
            SoundId::Orb => "orb".to_string(),
            SoundId::Numbered(id) => id.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertSound {
    pub id: Token<SoundId>,
    pub volume: Option<Token<u16>>,
}

/// The typed value of a rule. `Missing` is used whenever the value could not
/// be read completely; such rules always carry an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleValue {
    Missing,
    Number(Token<i64>),
    Rarity(Token<Rarity>),
    Strings(Vec<Token<String>>),
    SocketGroup(Token<String>),
    Boolean(Token<bool>),
    Color(Color),
    Sound(AlertSound),
}

impl LineElement {
    pub fn block(&self) -> Option<&Block> {
        match &self.kind {
            ElementKind::Block(block) => Some(block),
            _ => None,
        }
    }

    pub fn rule(&self) -> Option<&Rule> {
        match &self.kind {
            ElementKind::Rule(rule) => Some(rule),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.kind, ElementKind::Empty)
    }

    pub fn is_comment(&self) -> bool {
        matches!(self.kind, ElementKind::Comment(_))
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self.kind, ElementKind::Unknown(_))
    }

    pub fn row(&self) -> usize {
        self.range.start.row
    }
}

impl ShiftRanges for LineElement {
    fn shift_rows(&mut self, delta: isize) {
        self.range.shift_rows(delta);
        self.messages.shift_rows(delta);
        self.kind.shift_rows(delta);
    }
}

impl ShiftRanges for ElementKind {
    fn shift_rows(&mut self, delta: isize) {
        match self {
            ElementKind::Block(block) => block.shift_rows(delta),
            ElementKind::Rule(rule) => rule.shift_rows(delta),
            ElementKind::Comment(comment) => comment.shift_rows(delta),
            ElementKind::Empty => {}
            ElementKind::Unknown(unknown) => unknown.keyword.shift_rows(delta),
        }
    }
}

impl ShiftRanges for Block {
    fn shift_rows(&mut self, delta: isize) {
        self.keyword.shift_rows(delta);
        self.trailing_comment.shift_rows(delta);
    }
}

impl ShiftRanges for Rule {
    fn shift_rows(&mut self, delta: isize) {
        self.keyword.shift_rows(delta);
        self.operator.shift_rows(delta);
        self.value.shift_rows(delta);
        self.trailing_comment.shift_rows(delta);
    }
}

impl ShiftRanges for RuleValue {
    fn shift_rows(&mut self, delta: isize) {
        match self {
            RuleValue::Missing => {}
            RuleValue::Number(token) => token.shift_rows(delta),
            RuleValue::Rarity(token) => token.shift_rows(delta),
            RuleValue::Strings(tokens) => tokens.shift_rows(delta),
            RuleValue::SocketGroup(token) => token.shift_rows(delta),
            RuleValue::Boolean(token) => token.shift_rows(delta),
            RuleValue::Color(color) => color.shift_rows(delta),
            RuleValue::Sound(sound) => sound.shift_rows(delta),
        }
    }
}

impl ShiftRanges for Color {
    fn shift_rows(&mut self, delta: isize) {
        self.red.shift_rows(delta);
        self.green.shift_rows(delta);
        self.blue.shift_rows(delta);
        self.alpha.shift_rows(delta);
    }
}

impl ShiftRanges for AlertSound {
    fn shift_rows(&mut self, delta: isize) {
        self.id.shift_rows(delta);
        self.volume.shift_rows(delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::diagnostics::ValidationMessage;

    #[test]
    fn test_keyword_lookup_is_case_sensitive() {
        assert_eq!(Keyword::parse("Show"), Some(Keyword::Block(BlockType::Show)));
        assert_eq!(
            Keyword::parse("SetTextColor"),
            Some(Keyword::Rule(RuleName::SetTextColor))
        );
        assert_eq!(Keyword::parse("show"), None);
        assert_eq!(Keyword::suggest("itemlevel"), Some(Keyword::Rule(RuleName::ItemLevel)));
        assert_eq!(Keyword::suggest("Nonsense"), None);
    }

    #[test]
    fn test_rule_types() {
        assert_eq!(RuleName::Class.rule_type(), RuleType::Filter);
        assert_eq!(RuleName::SetFontSize.rule_type(), RuleType::Action);
        assert_eq!(RuleName::PlayAlertSound.rule_type(), RuleType::Action);
        assert_eq!(
            RuleName::ALL
                .iter()
                .filter(|name| name.rule_type() == RuleType::Action)
                .count(),
            5
        );
    }

    #[test]
    fn test_shift_reaches_every_nested_range() {
        let mut messages = Messages::new();
        messages.push(ValidationMessage::info("partial match", Range::on_row(2, 6, 10)));

        let mut element = LineElement {
            range: Range::on_row(2, 0, 30),
            invalid: false,
            messages,
            kind: ElementKind::Rule(Rule {
                name: RuleName::Class,
                keyword: Range::on_row(2, 0, 5),
                operator: Some(Token::new(Operator::Equal, Range::on_row(2, 6, 7))),
                value: RuleValue::Strings(vec![
                    Token::new("Boots".to_string(), Range::on_row(2, 8, 15)),
                    Token::new("Rings".to_string(), Range::on_row(2, 16, 23)),
                ]),
                trailing_comment: Some(Token::new(" x".to_string(), Range::on_row(2, 24, 27))),
            }),
        };

        element.shift_rows(3);

        assert_eq!(element.row(), 5);
        assert_eq!(element.messages.info[0].range.start.row, 5);
        let rule = element.rule().expect("rule");
        assert_eq!(rule.keyword.end.row, 5);
        assert_eq!(rule.operator.as_ref().map(|o| o.range.start.row), Some(5));
        assert_eq!(rule.trailing_comment.as_ref().map(|c| c.range.end.row), Some(5));
        match &rule.value {
            RuleValue::Strings(values) => {
                assert!(values.iter().all(|v| v.range.start.row == 5 && v.range.end.row == 5))
            }
            other => panic!("Expected strings, got {:?}", other),
        }
    }
}
