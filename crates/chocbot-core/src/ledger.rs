//! Persistent reward ledger
//!
//! The ledger is a single JSON document mapping user ids to chocolate bar
//! counts, e.g. `{"1234": 7, "5678": 2}`. The store owns the on-disk
//! representation: every mutation rewrites the full document, and a write
//! guard serializes load-mutate-save so concurrent interactions cannot drop
//! an update.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;

use crate::error::Result;

/// In-memory ledger: user id → bar count.
///
/// BTreeMap keeps the serialized document and the leaderboard tiebreak
/// deterministic.
pub type Ledger = BTreeMap<String, i64>;

/// File-backed ledger store.
pub struct LedgerStore {
    /// Directory holding the data file (created on first access)
    dir: PathBuf,

    /// Path of the JSON document inside `dir`
    path: PathBuf,

    /// Serializes read-modify-write cycles
    write_guard: Mutex<()>,
}

impl LedgerStore {
    /// Create a store backed by `dir/file`. Nothing is touched on disk
    /// until the first operation.
    pub fn new(dir: impl AsRef<Path>, file: &str) -> Self {
        let dir = dir.as_ref().to_path_buf();
        let path = dir.join(file);
        Self {
            dir,
            path,
            write_guard: Mutex::new(()),
        }
    }

    /// Path of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the full ledger.
    ///
    /// A missing directory or file is bootstrapped to an empty `{}`
    /// document. A file that exists but does not parse is treated as empty:
    /// the corrupt content is logged and discarded, not repaired.
    pub async fn load(&self) -> Result<Ledger> {
        tokio::fs::create_dir_all(&self.dir).await?;

        if !self.path.exists() {
            self.write_document(&Ledger::new()).await?;
            return Ok(Ledger::new());
        }

        let content = tokio::fs::read_to_string(&self.path).await?;
        match serde_json::from_str(&content) {
            Ok(ledger) => Ok(ledger),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Ledger file is malformed, starting from an empty ledger"
                );
                Ok(Ledger::new())
            }
        }
    }

    /// Overwrite the backing document with the full mapping.
    ///
    /// The document is written to a temporary sibling and renamed into
    /// place, so a crash mid-write cannot truncate the previous ledger.
    pub async fn save(&self, ledger: &Ledger) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        self.write_document(ledger).await
    }

    /// Credit `delta` bars to `user_id`, inserting the entry if it is new.
    /// Returns the user's new total.
    ///
    /// The whole load-mutate-save cycle runs under the write guard.
    pub async fn add(&self, user_id: &str, delta: i64) -> Result<i64> {
        let _guard = self.write_guard.lock().await;

        let mut ledger = self.load().await?;
        let total = ledger
            .entry(user_id.to_string())
            .and_modify(|count| *count += delta)
            .or_insert(delta);
        let total = *total;
        self.save(&ledger).await?;

        tracing::debug!(user_id, delta, total, "Ledger updated");
        Ok(total)
    }

    /// All entries sorted by bar count descending; ties fall back to the
    /// map's key order so the output is stable. Empty ledger → empty vec.
    pub async fn leaderboard(&self) -> Result<Vec<(String, i64)>> {
        let ledger = self.load().await?;
        let mut entries: Vec<(String, i64)> = ledger.into_iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        Ok(entries)
    }

    async fn write_document(&self, ledger: &Ledger) -> Result<()> {
        let content = serde_json::to_string_pretty(ledger)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
