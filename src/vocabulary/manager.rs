//! Vocabulary Manager
//!
//! Holds the current vocabulary and reloads it when the data directory
//! changes on disk.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{RwLock, mpsc};

use super::registry::VocabularySource;
use super::schema::Vocabulary;

/// Events from the file watcher
#[derive(Debug)]
enum WatcherEvent {
    DataFileChanged(PathBuf),
    WatcherError(notify::Error),
}

pub struct VocabularyManager {
    current: Arc<RwLock<Arc<Vocabulary>>>,
    source: VocabularySource,
    _watcher: Option<RecommendedWatcher>,
}

impl VocabularyManager {
    /// Start with an empty vocabulary; call [`initialize`](Self::initialize)
    /// to load it.
    pub fn new(source: VocabularySource) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(Vocabulary::new()))),
            source,
            _watcher: None,
        }
    }

    pub async fn initialize(&mut self) -> Result<()> {
        self.reload().await;
        Ok(())
    }

    /// Snapshot of the vocabulary for one validation pass
    pub async fn current(&self) -> Arc<Vocabulary> {
        self.current.read().await.clone()
    }

    pub async fn reload(&self) -> Arc<Vocabulary> {
        Self::reload_static(&self.current, &self.source).await
    }

    async fn reload_static(
        current: &RwLock<Arc<Vocabulary>>,
        source: &VocabularySource,
    ) -> Arc<Vocabulary> {
        let vocabulary = Arc::new(source.load().await);
        *current.write().await = vocabulary.clone();
        vocabulary
    }

    /// Watch the data directory. Every reload triggered by a change is sent
    /// to the returned receiver. `None` when there is no directory to watch.
    pub async fn watch(&mut self) -> Result<Option<mpsc::UnboundedReceiver<Arc<Vocabulary>>>> {
        let Some(dir) = self.source.data_dir.clone().filter(|dir| dir.is_dir()) else {
            log::debug!("No vocabulary data directory to watch");
            return Ok(None);
        };

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| match res {
                Ok(event) => {
                    if let EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) =
                        event.kind
                    {
                        for path in event.paths {
                            let _ = tx.send(WatcherEvent::DataFileChanged(path));
                        }
                    }
                }
                Err(e) => {
                    let _ = tx.send(WatcherEvent::WatcherError(e));
                }
            },
            Config::default().with_poll_interval(Duration::from_secs(1)),
        )?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        self._watcher = Some(watcher);
        log::info!("Watching vocabulary data in {}", dir.display());

        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        let current = self.current.clone();
        let source = self.source.clone();

        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                match event {
                    WatcherEvent::DataFileChanged(path) => {
                        if !source.is_data_file(&path) {
                            continue;
                        }
                        log::info!("Vocabulary file changed: {}", path.display());
                        let vocabulary = Self::reload_static(&current, &source).await;
                        if updates_tx.send(vocabulary).is_err() {
                            break;
                        }
                    }
                    WatcherEvent::WatcherError(e) => {
                        log::error!("Vocabulary watcher error: {}", e);
                    }
                }
            }
        });

        Ok(Some(updates_rx))
    }
}
