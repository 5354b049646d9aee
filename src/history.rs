use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

#[cfg(test)]
use mockall::automock;

use crate::config::HistoryConfig;
use crate::error::Result;
use crate::models::HistoryEntry;

/// Persistence seam for the history list.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait HistoryStore: Send + Sync + 'static {
    async fn load(&self) -> Result<Vec<HistoryEntry>>;
    async fn save(&self, entries: &[HistoryEntry]) -> Result<()>;
}

/// History persisted as a JSON array in a single file.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl HistoryStore for JsonFileStore {
    async fn load(&self) -> Result<Vec<HistoryEntry>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                tracing::warn!(
                    "History file {} is not a valid entry list ({}) - starting empty",
                    self.path.display(),
                    e
                );
                Ok(Vec::new())
            }
        }
    }

    async fn save(&self, entries: &[HistoryEntry]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

/// Volatile store, used when no file is wanted and in tests.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<Vec<HistoryEntry>>,
}

#[async_trait]
impl HistoryStore for MemoryStore {
    async fn load(&self) -> Result<Vec<HistoryEntry>> {
        Ok(self.entries.lock().await.clone())
    }

    async fn save(&self, entries: &[HistoryEntry]) -> Result<()> {
        *self.entries.lock().await = entries.to_vec();
        Ok(())
    }
}

/// Most-recent-first list of generations, capped at `max_entries`.
pub struct History {
    store: Arc<dyn HistoryStore>,
    max_entries: usize,
    // serializes load-modify-save cycles
    lock: Mutex<()>,
}

impl History {
    pub fn new(store: Arc<dyn HistoryStore>, max_entries: usize) -> Self {
        Self {
            store,
            max_entries,
            lock: Mutex::new(()),
        }
    }

    pub fn from_config(cfg: &HistoryConfig) -> Self {
        Self::new(Arc::new(JsonFileStore::new(&cfg.path)), cfg.max_entries)
    }

    /// Stored entries, newest first. The cap also applies here, so a file
    /// written under a larger limit is read back trimmed.
    pub async fn list(&self) -> Result<Vec<HistoryEntry>> {
        let mut all = self.store.load().await?;
        all.truncate(self.max_entries);
        Ok(all)
    }

    pub async fn record(&self, entry: HistoryEntry) -> Result<()> {
        self.record_many(vec![entry]).await
    }

    /// Prepends a batch, keeping the batch's own order at the top.
    pub async fn record_many(&self, entries: Vec<HistoryEntry>) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let _guard = self.lock.lock().await;
        let mut all = entries;
        all.extend(self.store.load().await?);
        all.truncate(self.max_entries);
        tracing::debug!(total = all.len(), "Saving history");
        self.store.save(&all).await
    }

    /// Marks an entry liked or disliked. Returns false if the id is unknown.
    pub async fn set_like(&self, id: &str, like: bool) -> Result<bool> {
        let _guard = self.lock.lock().await;
        let mut all = self.store.load().await?;
        let Some(entry) = all.iter_mut().find(|e| e.id == id) else {
            return Ok(false);
        };
        entry.like = Some(like);
        self.store.save(&all).await?;
        Ok(true)
    }

    pub async fn restore(&self, id: &str) -> Result<Option<HistoryEntry>> {
        Ok(self.store.load().await?.into_iter().find(|e| e.id == id))
    }

    pub async fn clear(&self) -> Result<()> {
        let _guard = self.lock.lock().await;
        self.store.save(&[]).await
    }
}
