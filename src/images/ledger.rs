// src/images/ledger.rs
//! Recently-used image ledger: keeps curated images from repeating until the
//! pool cycles.

use anyhow::{Context, Result};
use metrics::counter;
use rand::seq::IndexedRandom;
use rand::Rng;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use super::{ImagePool, ImageRecord};
use crate::telemetry as m;

/// Durable storage for the used-URL list (oldest first).
pub trait LedgerStore: Send + Sync {
    fn load(&self) -> Result<Vec<String>>;
    fn save(&self, used: &[String]) -> Result<()>;
}

/// JSON array of URLs on disk. A missing file is an empty ledger.
#[derive(Debug, Clone)]
pub struct JsonFileLedger {
    path: PathBuf,
}

impl JsonFileLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl LedgerStore for JsonFileLedger {
    fn load(&self) -> Result<Vec<String>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let s = fs::read_to_string(&self.path)
            .with_context(|| format!("reading ledger {}", self.path.display()))?;
        serde_json::from_str(&s).with_context(|| format!("parsing ledger {}", self.path.display()))
    }

    fn save(&self, used: &[String]) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let json = serde_json::to_string(used)?;
        let mut f = fs::File::create(&tmp)
            .with_context(|| format!("creating {}", tmp.display()))?;
        f.write_all(json.as_bytes())?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing ledger {}", self.path.display()))?;
        Ok(())
    }
}

/// In-process ledger; clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    used: Arc<Mutex<Vec<String>>>,
    fail_saves: bool,
}

impl MemoryLedger {
    pub fn with_used<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            used: Arc::new(Mutex::new(urls.into_iter().map(Into::into).collect())),
            fail_saves: false,
        }
    }

    /// Every `save` fails; for exercising the non-fatal persistence path.
    pub fn failing_saves(mut self) -> Self {
        self.fail_saves = true;
        self
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.used.lock().expect("ledger mutex poisoned").clone()
    }
}

impl LedgerStore for MemoryLedger {
    fn load(&self) -> Result<Vec<String>> {
        Ok(self.snapshot())
    }

    fn save(&self, used: &[String]) -> Result<()> {
        if self.fail_saves {
            anyhow::bail!("ledger store is read-only");
        }
        *self.used.lock().expect("ledger mutex poisoned") = used.to_vec();
        Ok(())
    }
}

/// Ledger length bound for a pool: half the pool, never below 5.
pub fn ledger_bound(pool_size: usize) -> usize {
    (pool_size / 2).max(5)
}

pub struct ImageLedger {
    store: Box<dyn LedgerStore>,
}

impl ImageLedger {
    pub fn new(store: Box<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Pick a pool image not used recently and record it.
    ///
    /// Empty pool: `None`, ledger untouched. All images used: the ledger is
    /// reset and the whole pool is available again. Load and save errors are
    /// logged and never reach the caller.
    pub fn select_image<R: Rng + ?Sized>(
        &self,
        pool: &ImagePool,
        rng: &mut R,
    ) -> Option<ImageRecord> {
        if pool.is_empty() {
            return None;
        }

        let mut used = self.store.load().unwrap_or_else(|e| {
            tracing::warn!(error = ?e, "image ledger unreadable, treating as empty");
            Vec::new()
        });

        let mut available: Vec<&ImageRecord> = pool
            .images
            .iter()
            .filter(|img| !used.contains(&img.url))
            .collect();
        if available.is_empty() {
            tracing::info!(pool = pool.len(), "all images used, starting a new cycle");
            counter!(m::IMAGE_LEDGER_RESETS).increment(1);
            available = pool.images.iter().collect();
            used.clear();
        }

        let picked = (*available.choose(rng)?).clone();

        used.push(picked.url.clone());
        let bound = ledger_bound(pool.len());
        if used.len() > bound {
            let excess = used.len() - bound;
            used.drain(..excess);
        }

        if let Err(e) = self.store.save(&used) {
            tracing::warn!(error = ?e, "could not persist image ledger");
        }
        counter!(m::IMAGE_PICKS).increment(1);
        Some(picked)
    }
}
