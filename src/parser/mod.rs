//! Filter Parser
//!
//! Single-line tokenization and line element construction. Every line is
//! processed on its own; nothing is carried from one line to the next.

pub mod ast;
pub mod lexer;
pub mod processor;
mod rules;

pub use ast::{
    AlertSound, Block, BlockType, Color, ElementKind, Keyword, LineElement, Rarity, Rule,
    RuleName, RuleType, RuleValue, SoundId, Unknown,
};
pub use lexer::{Operator, Token, Tokenizer};
pub use processor::{process_line, process_lines};
