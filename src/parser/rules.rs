//! Rule Parsers
//!
//! One parse routine per value shape. Each consumes what it can from the
//! tokenizer and records errors in the line context; the caller decides about
//! trailing text afterwards.

use std::ops::RangeInclusive;
use std::sync::LazyLock;

use regex::Regex;

use crate::core::diagnostics::ValidationMessage;
use crate::core::position::Range;
use crate::parser::ast::{AlertSound, Color, Rarity, Rule, RuleName, RuleValue, SoundId};
use crate::parser::lexer::{Operator, Token, Tokenizer};
use crate::parser::processor::LineContext;
use crate::vocabulary::{ValueMatch, Vocabulary};

static SOCKET_GROUP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i)[RGBW]{1,6}$").expect("valid socket group pattern"));

const LEVEL: &[RangeInclusive<i64>] = &[0..=100];
const QUALITY: &[RangeInclusive<i64>] = &[0..=20];
const SOCKETS: &[RangeInclusive<i64>] = &[0..=6];
const LINKED_SOCKETS: &[RangeInclusive<i64>] = &[0..=0, 2..=6];
const HEIGHT: &[RangeInclusive<i64>] = &[1..=4];
const WIDTH: &[RangeInclusive<i64>] = &[1..=2];
const FONT_SIZE: &[RangeInclusive<i64>] = &[18..=45];
const COLOR_CHANNEL: &[RangeInclusive<i64>] = &[0..=255];
const SOUND_ID: &[RangeInclusive<i64>] = &[1..=16];
const SOUND_VOLUME: &[RangeInclusive<i64>] = &[0..=300];

/// Parse everything after the keyword of a rule.
pub(crate) fn parse_rule(
    name: RuleName,
    keyword: Range,
    tokenizer: &mut Tokenizer<'_>,
    vocabulary: &Vocabulary,
    context: &mut LineContext<'_>,
) -> Rule {
    let mut parser = RuleParser {
        name,
        keyword,
        tokenizer,
        context,
    };

    let (operator, value) = match name {
        RuleName::ItemLevel | RuleName::DropLevel => parser.comparison(LEVEL),
        RuleName::Quality => parser.comparison(QUALITY),
        RuleName::Sockets => parser.comparison(SOCKETS),
        RuleName::LinkedSockets => parser.comparison(LINKED_SOCKETS),
        RuleName::Height => parser.comparison(HEIGHT),
        RuleName::Width => parser.comparison(WIDTH),
        RuleName::Rarity => {
            let operator = parser.tokenizer.next_operator();
            (operator, parser.rarity())
        }
        RuleName::Class => {
            let operator = parser.equality_operator();
            (operator, parser.string_list(|value| vocabulary.match_class(value), "item class"))
        }
        RuleName::BaseType => {
            let operator = parser.equality_operator();
            (operator, parser.string_list(|value| vocabulary.match_base(value), "base type"))
        }
        RuleName::SocketGroup => {
            let operator = parser.equality_operator();
            (operator, parser.socket_group())
        }
        RuleName::Identified | RuleName::Corrupted => {
            let operator = parser.equality_operator();
            (operator, parser.boolean())
        }
        RuleName::SetBorderColor | RuleName::SetTextColor | RuleName::SetBackgroundColor => {
            let operator = parser.equality_operator();
            (operator, parser.color())
        }
        RuleName::PlayAlertSound => {
            let operator = parser.equality_operator();
            (operator, parser.alert_sound())
        }
        RuleName::SetFontSize => {
            let operator = parser.equality_operator();
            let value = match parser.bounded_number(FONT_SIZE, "font size") {
                Some(number) => RuleValue::Number(number),
                None => RuleValue::Missing,
            };
            (operator, value)
        }
    };

    Rule {
        name,
        keyword,
        operator,
        value,
        trailing_comment: None,
    }
}

struct RuleParser<'t, 'a, 'c, 'f> {
    name: RuleName,
    keyword: Range,
    tokenizer: &'t mut Tokenizer<'a>,
    context: &'c mut LineContext<'f>,
}

impl RuleParser<'_, '_, '_, '_> {
    /// Any comparison operator followed by one bounded number.
    fn comparison(&mut self, bounds: &[RangeInclusive<i64>]) -> (Option<Token<Operator>>, RuleValue) {
        let operator = self.tokenizer.next_operator();
        let value = match self.bounded_number(bounds, "value") {
            Some(number) => RuleValue::Number(number),
            None => RuleValue::Missing,
        };
        (operator, value)
    }

    /// An optional operator that, when present, must be `=`.
    fn equality_operator(&mut self) -> Option<Token<Operator>> {
        let operator = self.tokenizer.next_operator()?;
        if operator.value != Operator::Equal {
            self.context.push(
                ValidationMessage::error("Invalid operator", operator.range)
                    .with_description(format!(
                        "{} only supports the = operator",
                        self.name.keyword()
                    ))
                    .with_solution(operator.value.as_str(), "="),
            );
        }
        Some(operator)
    }

    /// A required number within `bounds`. Returns the token even when out of
    /// range (an error is recorded), `None` when no number is present.
    fn bounded_number(&mut self, bounds: &[RangeInclusive<i64>], what: &str) -> Option<Token<i64>> {
        let Some(number) = self.tokenizer.next_number() else {
            self.missing(what);
            return None;
        };
        self.check_bounds(&number, bounds);
        Some(number)
    }

    /// An optional trailing number within `bounds`.
    fn optional_number(&mut self, bounds: &[RangeInclusive<i64>]) -> Option<Token<i64>> {
        let number = self.tokenizer.next_number()?;
        self.check_bounds(&number, bounds);
        Some(number)
    }

    fn check_bounds(&mut self, number: &Token<i64>, bounds: &[RangeInclusive<i64>]) -> bool {
        if bounds.iter().any(|range| range.contains(&number.value)) {
            return true;
        }

        let nearest = bounds
            .iter()
            .map(|range| number.value.clamp(*range.start(), *range.end()))
            .min_by_key(|candidate| candidate.abs_diff(number.value));

        let mut message = ValidationMessage::error(
            format!("Value {} is out of range", number.value),
            number.range,
        )
        .with_description(format!(
            "{} accepts {}",
            self.name.keyword(),
            describe_bounds(bounds)
        ));
        if let Some(nearest) = nearest {
            message = message.with_solution(self.tokenizer.text_of(number.range), nearest.to_string());
        }
        self.context.push(message);
        false
    }

    fn rarity(&mut self) -> RuleValue {
        let Some(text) = self.tokenizer.next_string() else {
            self.missing("rarity");
            return RuleValue::Missing;
        };

        match Rarity::from_text(&text.value) {
            Some(rarity) => RuleValue::Rarity(Token::new(rarity, text.range)),
            None => {
                let mut message =
                    ValidationMessage::error(format!("Invalid rarity \"{}\"", text.value), text.range)
                        .with_description("Rarity must be Normal, Magic, Rare or Unique");
                let corrected = ["Normal", "Magic", "Rare", "Unique"]
                    .into_iter()
                    .find(|rarity| rarity.eq_ignore_ascii_case(&text.value));
                if let Some(corrected) = corrected {
                    message = message.with_solution(self.tokenizer.text_of(text.range), corrected);
                }
                self.context.push(message);
                RuleValue::Missing
            }
        }
    }

    /// One or more strings, each checked against the vocabulary. Every
    /// unknown value gets its own error.
    fn string_list(
        &mut self,
        lookup: impl Fn(&str) -> ValueMatch,
        noun: &str,
    ) -> RuleValue {
        let mut values = Vec::new();
        while let Some(value) = self.tokenizer.next_string() {
            values.push(value);
        }

        if values.is_empty() {
            self.missing(noun);
            return RuleValue::Missing;
        }

        for value in &values {
            match lookup(&value.value) {
                ValueMatch::Exact => {}
                ValueMatch::Partial(count) => self.context.push(ValidationMessage::info(
                    format!("\"{}\" matches {} {} values by substring", value.value, count, noun),
                    value.range,
                )),
                ValueMatch::None => self.context.push(
                    ValidationMessage::error(format!("Invalid {} \"{}\"", noun, value.value), value.range)
                        .with_description(format!(
                            "\"{}\" is neither a known {} nor whitelisted",
                            value.value, noun
                        )),
                ),
            }
        }

        RuleValue::Strings(values)
    }

    fn socket_group(&mut self) -> RuleValue {
        let Some(group) = self.tokenizer.next_string() else {
            self.missing("socket group");
            return RuleValue::Missing;
        };

        if !SOCKET_GROUP_RE.is_match(&group.value) {
            self.context.push(
                ValidationMessage::error(format!("Invalid socket group \"{}\"", group.value), group.range)
                    .with_description("A socket group is 1 to 6 of the letters R, G, B and W"),
            );
            return RuleValue::Missing;
        }
        RuleValue::SocketGroup(group)
    }

    fn boolean(&mut self) -> RuleValue {
        match self.tokenizer.next_boolean() {
            Some(flag) => RuleValue::Boolean(flag),
            None => {
                self.missing("True or False");
                RuleValue::Missing
            }
        }
    }

    fn color(&mut self) -> RuleValue {
        let mut channels = Vec::with_capacity(3);
        for name in ["red", "green", "blue"] {
            match self.bounded_number(COLOR_CHANNEL, name) {
                Some(channel) => channels.push(channel),
                None => return RuleValue::Missing,
            }
        }
        let alpha = self.optional_number(COLOR_CHANNEL);

        // Channel bounds coincide with u8, so any out-of-range channel drops out here.
        let mut channels = channels.into_iter().filter_map(to_u8);
        match (channels.next(), channels.next(), channels.next()) {
            (Some(red), Some(green), Some(blue)) => RuleValue::Color(Color {
                red,
                green,
                blue,
                alpha: alpha.and_then(to_u8),
            }),
            _ => RuleValue::Missing,
        }
    }

    /// `orb` or a numbered sound, then an optional volume.
    fn alert_sound(&mut self) -> RuleValue {
        let id = if let Some(number) = self.tokenizer.next_number() {
            if !self.check_bounds(&number, SOUND_ID) {
                return RuleValue::Missing;
            }
            match u8::try_from(number.value) {
                Ok(id) => Token::new(SoundId::Numbered(id), number.range),
                Err(_) => return RuleValue::Missing,
            }
        } else if let Some(word) = self.tokenizer.next_word() {
            if !word.value.eq_ignore_ascii_case("orb") {
                self.context.push(
                    ValidationMessage::error(format!("Invalid alert sound \"{}\"", word.value), word.range)
                        .with_description("PlayAlertSound expects a sound id from 1 to 16 or orb"),
                );
                return RuleValue::Missing;
            }
            Token::new(SoundId::Orb, word.range)
        } else {
            self.missing("sound id");
            return RuleValue::Missing;
        };

        let volume = match self.tokenizer.next_number() {
            Some(volume) => {
                if !self.check_bounds(&volume, SOUND_VOLUME) {
                    return RuleValue::Missing;
                }
                u16::try_from(volume.value)
                    .ok()
                    .map(|level| Token::new(level, volume.range))
            }
            None => None,
        };

        RuleValue::Sound(AlertSound { id, volume })
    }

    /// Record a missing value over whatever unreadable text sits where the
    /// value should be, or over the keyword when nothing follows it.
    fn missing(&mut self, what: &str) {
        let mut probe = self.tokenizer.clone();
        let range = probe
            .next_trailing_text()
            .map(|text| text.range)
            .unwrap_or(self.keyword);

        self.context.push(
            ValidationMessage::error(format!("Missing {}", what), range).with_description(format!(
                "{} expects {}",
                self.name.keyword(),
                self.name.value_summary()
            )),
        );
    }
}

fn to_u8(token: Token<i64>) -> Option<Token<u8>> {
    u8::try_from(token.value)
        .ok()
        .map(|value| Token::new(value, token.range))
}

fn describe_bounds(bounds: &[RangeInclusive<i64>]) -> String {
    bounds
        .iter()
        .map(|range| {
            if range.start() == range.end() {
                range.start().to_string()
            } else {
                format!("{} to {}", range.start(), range.end())
            }
        })
        .collect::<Vec<_>>()
        .join(" or ")
}
