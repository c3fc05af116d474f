//! Vocabulary
//!
//! Item classes, base types and alert sounds that filter values are
//! checked against.

pub mod manager;
pub mod registry;
pub mod schema;

pub use manager::VocabularyManager;
pub use registry::{ITEMS_FILE, SOUNDS_FILE, VocabularySource};
pub use schema::{ItemsFile, SoundsFile, ValueMatch, Vocabulary};
