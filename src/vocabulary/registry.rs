//! Vocabulary Loading
//!
//! Built-in data embedded in the binary, overridden per file by JSON files in
//! the data directory.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

use super::schema::{ItemsFile, SoundsFile, Vocabulary};
use crate::config::{Config, Whitelist};

pub const ITEMS_FILE: &str = "items.json";
pub const SOUNDS_FILE: &str = "sounds.json";

const BUILTIN_ITEMS: &str = include_str!("../../resources/data/items.json");
const BUILTIN_SOUNDS: &str = include_str!("../../resources/data/sounds.json");

/// Where a vocabulary comes from: the data directory and the whitelists
#[derive(Debug, Clone, Default)]
pub struct VocabularySource {
    pub data_dir: Option<PathBuf>,
    pub whitelist: Whitelist,
}

impl VocabularySource {
    pub fn new(data_dir: Option<PathBuf>, whitelist: Whitelist) -> Self {
        Self {
            data_dir,
            whitelist,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.data_dir.clone(), config.whitelist.clone())
    }

    /// Whether `path` is one of the files this source reads
    pub fn is_data_file(&self, path: &Path) -> bool {
        matches!(
            path.file_name().and_then(|name| name.to_str()),
            Some(ITEMS_FILE | SOUNDS_FILE)
        )
    }

    /// Build the vocabulary. Missing or malformed override files fall back
    /// to the built-in data.
    pub async fn load(&self) -> Vocabulary {
        let items: ItemsFile = self.load_file(ITEMS_FILE, BUILTIN_ITEMS).await;
        let sounds: SoundsFile = self.load_file(SOUNDS_FILE, BUILTIN_SOUNDS).await;

        let vocabulary = Vocabulary::from_files(&items, &sounds).with_whitelists(
            self.whitelist.classes.clone(),
            self.whitelist.bases.clone(),
        );
        log::info!(
            "Loaded vocabulary: {} classes, {} base types, {} sounds",
            vocabulary.valid_classes.len(),
            vocabulary.valid_bases.len(),
            vocabulary.valid_sounds.len()
        );
        vocabulary
    }

    async fn load_file<T>(&self, name: &str, builtin: &str) -> T
    where
        T: DeserializeOwned + Default,
    {
        if let Some(dir) = &self.data_dir {
            match read_override(&dir.join(name)).await {
                Ok(Some(value)) => return value,
                Ok(None) => {}
                Err(e) => log::warn!("{:#}; using built-in {}", e, name),
            }
        }

        match serde_json::from_str(builtin) {
            Ok(value) => value,
            Err(e) => {
                log::error!("Built-in {} is malformed: {}", name, e);
                T::default()
            }
        }
    }
}

/// Read and parse a data file, `None` if it does not exist
async fn read_override<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Ok(None);
    }

    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read data file: {}", path.display()))?;
    let value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse data file: {}", path.display()))?;
    log::debug!("Using data file {}", path.display());
    Ok(Some(value))
}
